//! Router source generation.
//!
//! Serializes a [`RouteTree`] into the routing source consumed by the
//! bundler. Rendering sits behind the [`Renderer`] trait so the resolution
//! logic in [`crate::tree`] never deals with text; [`JsxRenderer`] targets
//! `react-router-dom` and fills a template containing four placeholders:
//!
//! | Placeholder | Replaced with |
//! |-------------|---------------|
//! | `{components}` | one `import` per page, layout and the app wrapper |
//! | `{routes}` | the nested `<Route>` elements |
//! | `{strictMode}` / `{/strictMode}` | `<StrictMode>` tags, or nothing |
//!
//! The catch-all route renders `<NoMatch />`, so a custom template must
//! declare or import a `NoMatch` component. The default template defines one.
//! [`JsxRenderer::undeclared_components`] reports it when it is absent.
//!
//! ## Output
//!
//! ```text
//! <Route element={<App />}>
//!     <Route element={<RootLayout />}>
//!         <Route path="/" element={<Index />} />
//!         <Route element={<BlogLayout />}>
//!             <Route path="/blog/:id" element={<BlogId />} />
//!         </Route>
//!     </Route>
//!     <Route path="*" element={<NoMatch />} />
//! </Route>
//! ```
//!
//! ## Duplicate component names
//!
//! When two files derive the same component name, a single import is emitted
//! at the position of the first one, pointing at the *last* file. This is the
//! opposite of the route table, where the first path wins.
//!
//! ## Reserved names
//!
//! The generated module already binds the names in [`RESERVED_COMPONENTS`]:
//! the application wrapper is always imported as `App`, and the default
//! template imports or defines the rest. A page or layout deriving one of these
//! names (`app.tsx`, `no-match.tsx`, `router.tsx`) collides with it and is
//! logged at `warn`. For `App` the wrapper import wins.

use crate::routes::RouteTable;
use crate::tree::{AppWrapper, NOT_FOUND_COMPONENT, RouteTree, ScopeNode};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Template used when the config does not name one.
pub const DEFAULT_TEMPLATE: &str = include_str!("../templates/root.jsx");

/// Local name the application wrapper is imported under.
pub const APP_COMPONENT: &str = "App";

/// Names bound by the generated module itself, which pages and layouts
/// should not derive.
pub const RESERVED_COMPONENTS: &[&str] = &[
    APP_COMPONENT,
    NOT_FOUND_COMPONENT,
    "Router",
    "ErrorBoundary",
    "StrictMode",
    "React",
    "HelmetProvider",
    "BrowserRouter",
    "Routes",
    "Route",
];

/// Indentation depth of `{routes}` inside the default template.
const BASE_DEPTH: usize = 6;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("cannot read template {path}: {source}")]
    Template {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Everything a renderer needs for one build.
pub struct RenderInput<'a> {
    pub table: &'a RouteTable,
    pub tree: &'a RouteTree,
    /// Pages directory used as the base of every import specifier.
    pub pages_dir: &'a Path,
    pub strict_mode: bool,
}

/// Serializes a build's routes into source text.
pub trait Renderer {
    fn render(&self, input: &RenderInput<'_>) -> String;
}

/// A single `import Component from "specifier";` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    pub component: String,
    pub specifier: String,
}

/// Renders `react-router-dom` JSX into a placeholder template.
#[derive(Debug, Clone)]
pub struct JsxRenderer {
    template: String,
}

impl Default for JsxRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATE)
    }
}

impl JsxRenderer {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Load a template from disk, or fall back to [`DEFAULT_TEMPLATE`].
    pub fn load(template_path: Option<&Path>) -> Result<Self, RenderError> {
        match template_path {
            Some(path) => fs::read_to_string(path)
                .map(Self::new)
                .map_err(|source| RenderError::Template {
                    path: path.to_path_buf(),
                    source,
                }),
            None => Ok(Self::default()),
        }
    }

    /// Components the rendered routes reference that the template never
    /// mentions.
    pub fn undeclared_components(&self) -> Vec<&'static str> {
        [NOT_FOUND_COMPONENT]
            .into_iter()
            .filter(|name| !self.template.contains(name))
            .collect()
    }
}

impl Renderer for JsxRenderer {
    fn render(&self, input: &RenderInput<'_>) -> String {
        let (open, close) = if input.strict_mode {
            ("<StrictMode>", "</StrictMode>")
        } else {
            ("", "")
        };
        let imports = render_imports(&collect_imports(input), input.strict_mode);
        let routes = render_routes(input.tree);

        self.template
            .replace("{strictMode}", open)
            .replace("{/strictMode}", close)
            .replace("{components}", &imports)
            .replace("{routes}", &routes)
    }
}

/// Imports for pages (table order), layouts (root first) and the app wrapper.
pub fn collect_imports(input: &RenderInput<'_>) -> Vec<Import> {
    let mut imports: Vec<Import> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut register = |component: &str, specifier: String| match positions.get(component) {
        Some(&pos) => imports[pos].specifier = specifier,
        None => {
            positions.insert(component.to_string(), imports.len());
            imports.push(Import {
                component: component.to_string(),
                specifier,
            });
        }
    };

    for page in input.table.pages().filter(|p| !p.file.is_empty()) {
        warn_if_reserved(&page.component, &page.file);
        register(&page.component, import_specifier(input.pages_dir, &page.file));
    }
    for layout in input.tree.layouts() {
        warn_if_reserved(&layout.component, &layout.file);
        register(&layout.component, import_specifier(input.pages_dir, &layout.file));
    }
    let app = match &input.tree.app {
        AppWrapper::File(file) => import_specifier(input.pages_dir, file),
        AppWrapper::Default(module) => module.clone(),
    };
    register(APP_COMPONENT, app);

    imports
}

fn warn_if_reserved(component: &str, file: &str) {
    if RESERVED_COMPONENTS.contains(&component) {
        warn!(%component, %file, "component name is reserved by the generated module");
    }
}

fn render_imports(imports: &[Import], strict_mode: bool) -> String {
    let mut lines: Vec<String> = imports
        .iter()
        .map(|i| format!("import {} from {};", i.component, js_string(&i.specifier)))
        .collect();
    if strict_mode {
        lines.push("import { StrictMode } from \"react\";".to_string());
    }
    lines.join("\n")
}

/// Render the nested `<Route>` elements for a tree.
pub fn render_routes(tree: &RouteTree) -> String {
    let mut lines = Vec::new();
    lines.push(open_wrapper(BASE_DEPTH, APP_COMPONENT));
    render_scope(&tree.root, BASE_DEPTH + 1, &mut lines);
    lines.push(route_line(
        BASE_DEPTH + 1,
        &tree.not_found.path,
        &tree.not_found.component,
    ));
    lines.push(close_wrapper(BASE_DEPTH));
    lines.join("\n")
}

fn render_scope(node: &ScopeNode, depth: usize, lines: &mut Vec<String>) {
    match &node.layout {
        Some(layout) => {
            lines.push(open_wrapper(depth, &layout.component));
            render_scope_body(node, depth + 1, lines);
            lines.push(close_wrapper(depth));
        }
        None => render_scope_body(node, depth, lines),
    }
}

fn render_scope_body(node: &ScopeNode, depth: usize, lines: &mut Vec<String>) {
    for route in &node.routes {
        lines.push(route_line(depth, &route.path, &route.component));
    }
    for child in &node.children {
        render_scope(child, depth, lines);
    }
}

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn route_line(depth: usize, path: &str, component: &str) -> String {
    format!(
        "{}<Route path=\"{}\" element={{<{} />}} />",
        indent(depth),
        path.replace('"', "&quot;"),
        component
    )
}

fn open_wrapper(depth: usize, component: &str) -> String {
    format!("{}<Route element={{<{} />}}>", indent(depth), component)
}

fn close_wrapper(depth: usize) -> String {
    format!("{}</Route>", indent(depth))
}

/// Join the pages directory and a page-relative file into an import path.
pub fn import_specifier(pages_dir: &Path, file: &str) -> String {
    let base = pages_dir.to_string_lossy();
    format!(
        "{}/{}",
        base.trim_end_matches(['/', '\\']),
        file.trim_start_matches('/')
    )
}

/// Double-quoted JavaScript string literal.
///
/// A JSON string is a valid JS literal once the line separators U+2028 and
/// U+2029 are escaped too.
fn js_string(s: &str) -> String {
    serde_json::Value::from(s)
        .to_string()
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029")
}
