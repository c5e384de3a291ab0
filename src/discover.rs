//! Page file discovery.
//!
//! Walks the pages directory and returns every page file as a path relative
//! to the pages root, always starting with `/` and using `/` as separator on
//! every platform:
//!
//! ```text
//! src/pages/                       discover(..) yields
//! ├── index.tsx                    /index.tsx
//! ├── _app.tsx                     (reserved, skipped)
//! ├── _components/                 (reserved, whole subtree skipped)
//! │   └── Header.tsx
//! ├── blog/
//! │   ├── _layout.tsx              (reserved, skipped)
//! │   └── [id].tsx                 /blog/[id].tsx
//! └── notes.md                     (extension not allowed)
//! ```
//!
//! The reserved-prefix rule lives in [`is_reserved`] and nowhere else; the
//! layout scanner walks the same tree through [`walk`] so both stages agree
//! on which directories exist.
//!
//! Entries are visited in file-name order, so the result is deterministic
//! for a given filesystem state. Unreadable entries are logged and skipped:
//! a subtree that cannot be read contributes nothing.

use std::path::Path;
use tracing::warn;
use walkdir::{DirEntry, WalkDir};

/// Names starting with this prefix are private helpers, never pages.
pub const RESERVED_PREFIX: char = '_';

/// Whether an entry is excluded from routing.
///
/// The walk root itself is never reserved, whatever its name.
pub fn is_reserved(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_string_lossy()
            .starts_with(RESERVED_PREFIX)
}

/// Walk every non-reserved entry under `root`, in file-name order.
pub fn walk(root: &Path) -> impl Iterator<Item = DirEntry> {
    WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_reserved(entry))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                let path = err
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                warn!(path = %path, error = %err, "skipping unreadable entry");
                None
            }
        })
}

/// Enumerate page files under `root` whose name ends with one of `extensions`.
pub fn discover(root: &Path, extensions: &[String]) -> Vec<String> {
    walk(root)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| has_extension(&entry.file_name().to_string_lossy(), extensions))
        .filter_map(|entry| relative_path(root, entry.path()))
        .collect()
}

/// Case-sensitive suffix match against the allowed extensions.
pub fn has_extension(file_name: &str, extensions: &[String]) -> bool {
    extensions.iter().any(|ext| file_name.ends_with(ext.as_str()))
}

/// Render `path` relative to `root` as `/a/b/c`. The root itself renders as
/// the empty string. Returns `None` if `path` is not under `root`.
pub fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let mut out = String::new();
    for component in rel.components() {
        out.push('/');
        out.push_str(&component.as_os_str().to_string_lossy());
    }
    Some(out)
}
