//! Route table construction.
//!
//! Turns discovered page files into an ordered, deduplicated route table:
//!
//! ```text
//! page file              path            component
//! /index.tsx             /               Index
//! /about.tsx             /about          About
//! /blog/index.tsx        /blog           BlogIndex
//! /blog/[id].tsx         /blog/:id       BlogId
//! /custom.tsx            /custom-page    Custom     (rewritten by config)
//! /index/index.tsx       /               Index
//! ```
//!
//! A page whose component name is exactly `Index` routes to `/`. This is
//! checked before the `index` file rule, so `/index/index.tsx` is a root
//! page, not `/index`.
//!
//! ## Table order
//!
//! User-declared entries from the config come first, verbatim and in
//! declaration order. Discovered pages follow in discovery order.
//!
//! ## Rewrites
//!
//! A user entry `{ source, destination }` remaps a discovered page whose
//! computed path equals `source`. The lookup happens *before* bracket tokens
//! are rewritten to `:param`, so a source that targets a dynamic page is
//! spelled with brackets (`/blog/[id]`). The remapped page inherits the
//! rewrite's `requirements`.
//!
//! ## Dedup
//!
//! At most one page per final path. The first entry registered wins and later
//! pages with the same path are dropped without error. User-declared pages
//! take part in this, so a declared page shadows a discovered one.

use crate::naming;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// File name whose route is its parent directory.
pub const INDEX_FILE: &str = "index";

/// Component name that always routes to `/`, whatever directory it sits in.
pub const INDEX_COMPONENT: &str = "Index";

/// Per-parameter regular expressions, e.g. `id → \d+`.
pub type Requirements = BTreeMap<String, String>;

/// One routable page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRecord {
    /// URL path with dynamic segments as `:name`.
    pub path: String,
    pub component: String,
    /// Source file relative to the pages root.
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub requirements: Requirements,
}

/// A user-declared remapping of a discovered path.
///
/// Both fields are optional so that malformed config entries still load;
/// an entry missing either side simply never applies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rewrite {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(default, skip_serializing_if = "Requirements::is_empty")]
    pub requirements: Requirements,
}

/// An entry of the route table: a page, or a rewrite carried through from
/// the config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RouteEntry {
    Page(RouteRecord),
    Rewrite(Rewrite),
}

impl RouteEntry {
    pub fn as_page(&self) -> Option<&RouteRecord> {
        match self {
            RouteEntry::Page(record) => Some(record),
            RouteEntry::Rewrite(_) => None,
        }
    }

    /// Destination of a rewrite that applies to `path`.
    fn rewrite_for(&self, path: &str) -> Option<&Rewrite> {
        match self {
            RouteEntry::Rewrite(rewrite)
                if rewrite.source.as_deref() == Some(path) && rewrite.destination.is_some() =>
            {
                Some(rewrite)
            }
            _ => None,
        }
    }
}

/// Ordered route table, serialized as a JSON array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    pub fn new(entries: Vec<RouteEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Page entries in table order.
    pub fn pages(&self) -> impl Iterator<Item = &RouteRecord> {
        self.entries.iter().filter_map(RouteEntry::as_page)
    }

    pub fn find_page(&self, path: &str) -> Option<&RouteRecord> {
        self.pages().find(|record| record.path == path)
    }

    /// Append a page unless its path is already taken. Returns whether it
    /// was added.
    pub fn push_page(&mut self, record: RouteRecord) -> bool {
        if self.find_page(&record.path).is_some() {
            return false;
        }
        self.entries.push(RouteEntry::Page(record));
        true
    }

    fn rewrite_for(&self, path: &str) -> Option<&Rewrite> {
        self.entries.iter().find_map(|entry| entry.rewrite_for(path))
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl From<Vec<RouteEntry>> for RouteTable {
    fn from(entries: Vec<RouteEntry>) -> Self {
        Self::new(entries)
    }
}

/// Build the route table from discovered page files and user entries.
///
/// `page_files` are paths relative to the pages root as produced by
/// [`crate::discover::discover`]; `extensions` is the allow-list used to
/// find them.
pub fn build_route_table(
    page_files: &[String],
    user_routes: &[RouteEntry],
    extensions: &[String],
) -> RouteTable {
    let seeds = RouteTable::new(user_routes.to_vec());
    let mut table = seeds.clone();

    for file in page_files {
        let record = page_record(file, extensions, &seeds);
        let path = record.path.clone();
        if table.push_page(record) {
            debug!(file = %file, path = %path, "route added");
        } else {
            debug!(file = %file, path = %path, "route already registered, dropping");
        }
    }

    table
}

fn page_record(file: &str, extensions: &[String], seeds: &RouteTable) -> RouteRecord {
    let name = strip_extension(&file.replacen('~', "", 1), extensions);
    let mut segments: Vec<&str> = name.split('/').filter(|s| !s.is_empty()).collect();
    let file_name = segments.pop().unwrap_or_default();
    let component = naming::component_name(&segments, file_name);

    let mut path = if component == INDEX_COMPONENT {
        "/".to_string()
    } else if file_name == INDEX_FILE {
        format!("/{}", segments.join("/"))
    } else {
        name.clone()
    };

    let mut requirements = Requirements::new();
    if let Some(rewrite) = seeds.rewrite_for(&path)
        && let Some(destination) = &rewrite.destination
    {
        debug!(from = %path, to = %destination, "rewrite applied");
        path = destination.clone();
        requirements = rewrite.requirements.clone();
    }

    RouteRecord {
        path: naming::param_syntax(&path),
        component,
        file: collapse_slashes(file),
        requirements,
    }
}

/// Remove the longest allowed extension that `name` ends with.
fn strip_extension(name: &str, extensions: &[String]) -> String {
    extensions
        .iter()
        .filter(|ext| name.ends_with(ext.as_str()))
        .max_by_key(|ext| ext.len())
        .map(|ext| name[..name.len() - ext.len()].to_string())
        .unwrap_or_else(|| name.to_string())
}

/// Collapse runs of `/` into a single separator.
pub fn collapse_slashes(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for c in path.chars() {
        if c == '/' && out.ends_with('/') {
            continue;
        }
        out.push(c);
    }
    out
}
