//! Shared test utilities for the aplos test suite.
//!
//! Provides fixture setup, throwaway page trees, and route table lookups
//! that panic with the available paths on a miss.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = page_tree(&["index.tsx", "blog/[id].tsx"]);
//! let files = discover(tmp.path(), &exts(&[".tsx"]));
//! let table = build_route_table(&files, &[], &exts(&[".tsx"]));
//!
//! assert_eq!(find_page(&table, "/blog/:id").component, "BlogId");
//! ```

use std::fs;
use std::path::Path;
use tempfile::TempDir;

use crate::routes::{RouteRecord, RouteTable};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/project/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/project");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Create a temp directory holding the given files (relative paths).
///
/// Each file contains a one-line default export so it looks like a page.
pub fn page_tree(files: &[&str]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    for file in files {
        let path = tmp.path().join(file);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, "export default function Page() { return null; }\n").unwrap();
    }
    tmp
}

pub fn exts(list: &[&str]) -> Vec<String> {
    list.iter().map(|e| e.to_string()).collect()
}

// =========================================================================
// Route table lookups
// =========================================================================

/// Find a page by path. Panics if not found.
pub fn find_page<'a>(table: &'a RouteTable, path: &str) -> &'a RouteRecord {
    table.find_page(path).unwrap_or_else(|| {
        let paths = page_paths(table);
        panic!("page '{path}' not found. Available: {paths:?}")
    })
}

/// All page paths in table order.
pub fn page_paths(table: &RouteTable) -> Vec<&str> {
    table.pages().map(|p| p.path.as_str()).collect()
}
