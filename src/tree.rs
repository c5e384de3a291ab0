//! Nested route assembly.
//!
//! Combines the flat route table with the layout map into the structure the
//! generated router renders:
//!
//! ```text
//! App                                  application wrapper, always present
//! └── RootLayout (scope "/")           only if `_layout` exists in the root
//!     ├── /              Index
//!     ├── /about         About
//!     └── BlogLayout (scope "/blog")
//!         ├── /blog      BlogIndex
//!         └── /blog/:id  BlogId
//! └── *                  NoMatch       catch-all, outermost level
//! ```
//!
//! A route belongs to the deepest layout scope that is a prefix of its path,
//! found by walking [`ScopeHierarchy`] from the full path up to `/`. A layout
//! nests directly under the deepest *other* layout scope above it, so scopes
//! without a layout are transparent.
//!
//! The result is plain data. Turning it into source text is the job of
//! [`crate::render`].

use crate::layout::{LayoutDescriptor, LayoutMap, ROOT_SCOPE};
use crate::routes::{RouteRecord, RouteTable};
use serde::Serialize;
use std::collections::BTreeMap;

/// Component name of the catch-all route.
pub const NOT_FOUND_COMPONENT: &str = "NoMatch";

/// Path of the catch-all route.
pub const NOT_FOUND_PATH: &str = "*";

/// Iterator over a path and each of its ancestors.
///
/// `/a/b/c` yields `/a/b/c`, `/a/b`, `/a`, `/`. A trailing slash is treated
/// as its own level (`/a/` yields `/a/`, `/a`, `/`). Paths without a leading
/// slash stop at their first segment.
#[derive(Debug, Clone)]
pub struct ScopeHierarchy<'a> {
    current: Option<&'a str>,
}

impl<'a> ScopeHierarchy<'a> {
    pub fn new(path: &'a str) -> Self {
        Self {
            current: Some(path),
        }
    }
}

impl<'a> Iterator for ScopeHierarchy<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current?;
        self.current = match current.rfind('/') {
            _ if current == ROOT_SCOPE => None,
            Some(0) => Some(ROOT_SCOPE),
            Some(pos) => Some(&current[..pos]),
            None => None,
        };
        Some(current)
    }
}

/// Who wraps the whole application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "source", rename_all = "snake_case")]
pub enum AppWrapper {
    /// A user `_app.<ext>` file, relative to the pages root.
    File(String),
    /// The framework's pass-through wrapper, by import specifier.
    Default(String),
}

/// One layout scope and what renders inside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopeNode {
    pub scope_path: String,
    /// `None` only for the root scope when no root layout exists.
    pub layout: Option<LayoutDescriptor>,
    /// Routes owned by this scope, in table order.
    pub routes: Vec<RouteRecord>,
    /// Directly nested layout scopes, in scope order.
    pub children: Vec<ScopeNode>,
}

/// The complete nested routing structure of one build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteTree {
    pub app: AppWrapper,
    pub root: ScopeNode,
    pub not_found: RouteRecord,
}

impl RouteTree {
    /// Every layout in the tree, root first, then depth-first in scope order.
    pub fn layouts(&self) -> Vec<&LayoutDescriptor> {
        let mut out = Vec::new();
        collect_layouts(&self.root, &mut out);
        out
    }
}

fn collect_layouts<'a>(node: &'a ScopeNode, out: &mut Vec<&'a LayoutDescriptor>) {
    if let Some(layout) = &node.layout {
        out.push(layout);
    }
    for child in &node.children {
        collect_layouts(child, out);
    }
}

/// The deepest layout scope owning `path`, or `/` if none matches.
pub fn owning_scope<'a>(path: &str, layouts: &'a LayoutMap) -> &'a str {
    ScopeHierarchy::new(path)
        .find_map(|candidate| layouts.get_key_value(candidate).map(|(k, _)| k.as_str()))
        .unwrap_or(ROOT_SCOPE)
}

/// The scope a layout nests under: the deepest other layout scope above it,
/// or `/`.
pub fn parent_scope<'a>(scope: &str, layouts: &'a LayoutMap) -> &'a str {
    ScopeHierarchy::new(scope)
        .skip(1)
        .find_map(|candidate| layouts.get_key_value(candidate).map(|(k, _)| k.as_str()))
        .unwrap_or(ROOT_SCOPE)
}

/// Assemble the nested route tree.
pub fn assemble(table: &RouteTable, layouts: &LayoutMap, app: AppWrapper) -> RouteTree {
    let mut grouped: BTreeMap<&str, Vec<RouteRecord>> = BTreeMap::new();
    for record in table.pages() {
        grouped
            .entry(owning_scope(&record.path, layouts))
            .or_default()
            .push(record.clone());
    }

    RouteTree {
        app,
        root: build_scope(ROOT_SCOPE, layouts, &mut grouped),
        not_found: RouteRecord {
            path: NOT_FOUND_PATH.to_string(),
            component: NOT_FOUND_COMPONENT.to_string(),
            file: String::new(),
            requirements: Default::default(),
        },
    }
}

fn build_scope(
    scope: &str,
    layouts: &LayoutMap,
    grouped: &mut BTreeMap<&str, Vec<RouteRecord>>,
) -> ScopeNode {
    let children = layouts
        .keys()
        .filter(|key| key.as_str() != ROOT_SCOPE && parent_scope(key, layouts) == scope)
        .map(|key| build_scope(key, layouts, grouped))
        .collect();

    ScopeNode {
        scope_path: scope.to_string(),
        layout: layouts.get(scope).cloned(),
        routes: grouped.remove(scope).unwrap_or_default(),
        children,
    }
}
