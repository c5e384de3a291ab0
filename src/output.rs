//! CLI output formatting.
//!
//! Output is **route-centric**: the primary display for every page is its
//! component name and public path, with the source file shown as secondary
//! context on an indented `Source:` line.
//!
//! # Output Format
//!
//! ## Build
//!
//! ```text
//! Routes
//! Rewrite /custom → /custom-page
//! 001 Index → /
//!     Source: /index.tsx
//! 002 BlogId → /blog/:id
//!     Source: /blog/[id].tsx
//!     Requires: id = \d+
//!
//! Layouts
//! RootLayout → /
//!     Source: /_layout.tsx
//!
//! App
//!     Source: /_app.tsx
//!
//! Outputs → .aplos/cache
//!     router.json: written
//!     app.js: unchanged
//!
//! Built 2 routes, 1 layout
//! ```
//!
//! ## Routes
//!
//! ```text
//! Component  File            Path
//! (rewrite)                  /custom → /custom-page
//! Index      /index.tsx      /
//! BlogId     /blog/[id].tsx  /blog/:id
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::matcher::RouteMatch;
use crate::pipeline::BuildReport;
use crate::routes::{RouteEntry, RouteRecord, RouteTable};
use crate::tree::AppWrapper;
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

fn format_rewrite(source: Option<&str>, destination: Option<&str>) -> String {
    format!(
        "{} → {}",
        source.unwrap_or("?"),
        destination.unwrap_or("?")
    )
}

/// Indented context lines for a page: its source file and requirements.
fn page_context(record: &RouteRecord, depth: usize) -> Vec<String> {
    let mut lines = Vec::new();
    if !record.file.is_empty() {
        lines.push(format!("{}Source: {}", indent(depth), record.file));
    }
    for (name, pattern) in &record.requirements {
        lines.push(format!("{}Requires: {} = {}", indent(depth), name, pattern));
    }
    lines
}

// ============================================================================
// Build output
// ============================================================================

/// Format the result of `aplos build`.
pub fn format_build_output(report: &BuildReport, project_root: &Path) -> Vec<String> {
    let mut lines = vec!["Routes".to_string()];
    let mut pos = 0;
    for entry in report.routes.table.entries() {
        match entry {
            RouteEntry::Page(record) => {
                pos += 1;
                lines.push(format!(
                    "{} {} → {}",
                    format_index(pos),
                    record.component,
                    record.path
                ));
                lines.extend(page_context(record, 1));
            }
            RouteEntry::Rewrite(rewrite) => lines.push(format!(
                "Rewrite {}",
                format_rewrite(rewrite.source.as_deref(), rewrite.destination.as_deref())
            )),
        }
    }

    let layouts = report.routes.tree.layouts();
    if !layouts.is_empty() {
        lines.push(String::new());
        lines.push("Layouts".to_string());
        for layout in &layouts {
            lines.push(format!("{} → {}", layout.component, layout.scope_path));
            lines.push(format!("{}Source: {}", indent(1), layout.file));
        }
    }

    lines.push(String::new());
    lines.push("App".to_string());
    match &report.routes.tree.app {
        AppWrapper::File(file) => lines.push(format!("{}Source: {}", indent(1), file)),
        AppWrapper::Default(module) => lines.push(format!("{}Module: {}", indent(1), module)),
    }

    lines.push(String::new());
    let cache_dir = report
        .cache_dir
        .strip_prefix(project_root)
        .unwrap_or(&report.cache_dir);
    lines.push(format!("Outputs → {}", cache_dir.display()));
    for (name, status) in &report.outputs {
        lines.push(format!("{}{}: {}", indent(1), name, status));
    }

    lines.push(String::new());
    lines.push(format!(
        "Built {}, {}",
        plural(pos, "route"),
        plural(layouts.len(), "layout")
    ));
    lines
}

pub fn print_build_output(report: &BuildReport, project_root: &Path) {
    for line in format_build_output(report, project_root) {
        println!("{}", line);
    }
}

/// Diagnostic for a project without a pages directory.
pub fn format_missing_pages(pages_dir: &Path) -> Vec<String> {
    vec![
        format!("No pages directory at {}", pages_dir.display()),
        "Nothing to build.".to_string(),
    ]
}

pub fn print_missing_pages(pages_dir: &Path) {
    for line in format_missing_pages(pages_dir) {
        println!("{}", line);
    }
}

// ============================================================================
// Route table
// ============================================================================

/// Format the route table as aligned `Component | File | Path` columns.
pub fn format_route_table(table: &RouteTable) -> Vec<String> {
    let rows: Vec<[String; 3]> = table
        .entries()
        .iter()
        .map(|entry| match entry {
            RouteEntry::Page(record) => [
                record.component.clone(),
                record.file.clone(),
                record.path.clone(),
            ],
            RouteEntry::Rewrite(rewrite) => [
                "(rewrite)".to_string(),
                String::new(),
                format_rewrite(rewrite.source.as_deref(), rewrite.destination.as_deref()),
            ],
        })
        .collect();

    let header = ["Component".to_string(), "File".to_string(), "Path".to_string()];
    let width = |col: usize| {
        std::iter::once(&header)
            .chain(&rows)
            .map(|row| row[col].chars().count())
            .max()
            .unwrap_or(0)
    };
    let (w0, w1) = (width(0), width(1));

    std::iter::once(&header)
        .chain(&rows)
        .map(|[component, file, path]| {
            format!("{component:<w0$}  {file:<w1$}  {path}")
                .trim_end()
                .to_string()
        })
        .collect()
}

pub fn print_route_table(table: &RouteTable) {
    for line in format_route_table(table) {
        println!("{}", line);
    }
}

// ============================================================================
// Match
// ============================================================================

/// Format the answer to `aplos match <url>`.
///
/// Without a match, the full route table follows so the user can see what
/// was tried.
pub fn format_match(url: &str, found: Option<&RouteMatch<'_>>, table: &RouteTable) -> Vec<String> {
    match found {
        Some(m) => {
            let mut lines = vec![format!("{} → {}", m.route.component, m.route.path)];
            lines.extend(page_context(m.route, 1));
            for (name, value) in &m.params {
                lines.push(format!("{}{}: {}", indent(1), name, value));
            }
            lines
        }
        None => {
            let mut lines = vec![format!("No route matches {url}"), String::new()];
            lines.extend(format_route_table(table));
            lines
        }
    }
}

pub fn print_match(url: &str, found: Option<&RouteMatch<'_>>, table: &RouteTable) {
    for line in format_match(url, found, table) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
