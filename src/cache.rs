//! Generated output directory with change tracking.
//!
//! The bundler watches the cache directory, so rewriting a file whose
//! contents did not change triggers a pointless rebuild on its side. This
//! module writes outputs only when their content differs from the last build.
//!
//! # Design
//!
//! Each output is keyed by its file name and tracked by the SHA-256 of the
//! contents last written. An output is skipped when:
//!
//! 1. the manifest holds the same hash for that name, and
//! 2. the file still exists on disk.
//!
//! Writes go to a temporary file in the same directory and are renamed into
//! place, so a watcher never observes a half-written file.
//!
//! ## Storage
//!
//! The manifest is a JSON file at `<cache_dir>/.build-manifest.json`.
//!
//! ## Bypassing the manifest
//!
//! `aplos build --force` starts from an empty manifest, so every output is
//! rewritten.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

/// Name of the build manifest within the cache directory.
pub const MANIFEST_FILENAME: &str = ".build-manifest.json";

/// Version of the manifest format. Bump this to invalidate existing
/// manifests when the format changes.
const MANIFEST_VERSION: u32 = 1;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cannot create cache directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// On-disk manifest mapping output file names to content hashes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildManifest {
    pub version: u32,
    pub entries: BTreeMap<String, String>,
}

impl BuildManifest {
    /// Create an empty manifest (used for `--force` or first build).
    pub fn empty() -> Self {
        Self {
            version: MANIFEST_VERSION,
            entries: BTreeMap::new(),
        }
    }

    /// Load from the cache directory. Returns an empty manifest if the file
    /// doesn't exist or can't be parsed (version mismatch, corruption).
    pub fn load(cache_dir: &Path) -> Self {
        let content = match fs::read_to_string(manifest_path(cache_dir)) {
            Ok(c) => c,
            Err(_) => return Self::empty(),
        };
        let manifest: Self = match serde_json::from_str(&content) {
            Ok(m) => m,
            Err(_) => return Self::empty(),
        };
        if manifest.version != MANIFEST_VERSION {
            return Self::empty();
        }
        manifest
    }

    pub fn save(&self, cache_dir: &Path) -> Result<(), CacheError> {
        let json = serde_json::to_string_pretty(self)?;
        write_atomic(&manifest_path(cache_dir), json.as_bytes())
    }

    /// Whether `name` was last written with `hash` and is still on disk.
    pub fn is_current(&self, name: &str, hash: &str, cache_dir: &Path) -> bool {
        self.entries.get(name).is_some_and(|h| h == hash) && cache_dir.join(name).exists()
    }

    pub fn insert(&mut self, name: String, hash: String) {
        self.entries.insert(name, hash);
    }
}

/// SHA-256 of some bytes, returned as a hex string.
pub fn hash_bytes(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Resolve the manifest path for a cache directory.
pub fn manifest_path(cache_dir: &Path) -> PathBuf {
    cache_dir.join(MANIFEST_FILENAME)
}

/// Write `bytes` to `path` through a temporary file in the same directory.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), CacheError> {
    let write_err = |source| CacheError::Write {
        path: path.to_path_buf(),
        source,
    };
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(bytes).map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

/// What happened to one output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    Written,
    Unchanged,
}

impl fmt::Display for WriteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteStatus::Written => write!(f, "written"),
            WriteStatus::Unchanged => write!(f, "unchanged"),
        }
    }
}

/// The cache directory of one build.
#[derive(Debug)]
pub struct OutputDir {
    path: PathBuf,
    manifest: BuildManifest,
}

impl OutputDir {
    /// Create the directory if needed and load its manifest. With `force`
    /// the previous manifest is ignored.
    pub fn prepare(path: &Path, force: bool) -> Result<Self, CacheError> {
        fs::create_dir_all(path).map_err(|source| CacheError::CreateDir {
            path: path.to_path_buf(),
            source,
        })?;
        let manifest = if force {
            BuildManifest::empty()
        } else {
            BuildManifest::load(path)
        };
        Ok(Self {
            path: path.to_path_buf(),
            manifest,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `contents` to `name` unless it is already up to date.
    pub fn write(&mut self, name: &str, contents: &str) -> Result<WriteStatus, CacheError> {
        let hash = hash_bytes(contents.as_bytes());
        if self.manifest.is_current(name, &hash, &self.path) {
            debug!(file = name, "output unchanged");
            return Ok(WriteStatus::Unchanged);
        }
        write_atomic(&self.path.join(name), contents.as_bytes())?;
        debug!(file = name, "output written");
        self.manifest.insert(name.to_string(), hash);
        Ok(WriteStatus::Written)
    }

    /// Persist the manifest.
    pub fn finish(self) -> Result<(), CacheError> {
        self.manifest.save(&self.path)
    }
}
