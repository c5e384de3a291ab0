//! Layout discovery.
//!
//! A directory may declare a layout by containing a `_layout.<ext>` file.
//! The layout wraps every page and nested layout whose path falls under the
//! directory's URL prefix (its *scope*):
//!
//! ```text
//! src/pages/
//! ├── _layout.tsx          scope "/"          RootLayout
//! ├── _app.tsx             application wrapper (not a layout)
//! ├── blog/
//! │   ├── _layout.tsx      scope "/blog"      BlogLayout
//! │   └── [id].tsx
//! └── shop/
//!     └── [category]/
//!         └── _layout.tsx  scope "/shop/:category"  ShopCategoryLayout
//! ```
//!
//! Scopes use the same `:param` syntax as route paths so that the assembler
//! can compare them segment by segment.

use crate::discover::{self, relative_path};
use crate::naming;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Base name of a directory layout file.
pub const LAYOUT_BASENAME: &str = "_layout";

/// Base name of the application wrapper file in the pages root.
pub const APP_BASENAME: &str = "_app";

/// Scope of the pages root.
pub const ROOT_SCOPE: &str = "/";

/// A layout found at one directory level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutDescriptor {
    /// URL prefix the layout applies to (`/` for the pages root).
    pub scope_path: String,
    pub component: String,
    /// Layout file relative to the pages root, e.g. `/blog/_layout.tsx`.
    pub file: String,
}

/// Layouts keyed by scope path. Ordered, so iteration is deterministic.
pub type LayoutMap = BTreeMap<String, LayoutDescriptor>;

/// Scan every non-reserved directory under `pages_dir` for a layout file.
pub fn scan_layouts(pages_dir: &Path, extensions: &[String]) -> LayoutMap {
    let mut layouts = LayoutMap::new();

    for dir in discover::walk(pages_dir).filter(|e| e.file_type().is_dir()) {
        let Some(file_name) = find_reserved_file(dir.path(), LAYOUT_BASENAME, extensions) else {
            continue;
        };
        let Some(rel_dir) = relative_path(pages_dir, dir.path()) else {
            continue;
        };

        let segments: Vec<&str> = rel_dir.split('/').filter(|s| !s.is_empty()).collect();
        let scope_path = scope_path(&segments);
        layouts
            .entry(scope_path.clone())
            .or_insert_with(|| LayoutDescriptor {
                scope_path,
                component: naming::layout_component_name(&segments),
                file: format!("{rel_dir}/{file_name}"),
            });
    }

    layouts
}

/// Locate the application wrapper (`_app.<ext>`) in the pages root.
///
/// Extensions are tried in configured order; returns the path relative to
/// the pages root, e.g. `/_app.tsx`.
pub fn find_app_file(pages_dir: &Path, extensions: &[String]) -> Option<String> {
    find_reserved_file(pages_dir, APP_BASENAME, extensions).map(|name| format!("/{name}"))
}

/// URL scope of a directory given its segments relative to the pages root.
pub fn scope_path(segments: &[&str]) -> String {
    naming::param_syntax(&format!("/{}", segments.join("/")))
}

fn find_reserved_file(dir: &Path, basename: &str, extensions: &[String]) -> Option<String> {
    extensions
        .iter()
        .map(|ext| format!("{basename}{ext}"))
        .find(|name| dir.join(name).is_file())
}
