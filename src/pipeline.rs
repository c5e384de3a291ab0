//! End-to-end build.
//!
//! One call runs every stage in order and writes three files into the cache
//! directory:
//!
//! ```text
//! discover ─┬─> routes ──> tree ──> render ──> app.js
//! layouts ──┘     │                            router.json
//!                 └──────── config.with_routes ──> config.json
//! ```
//!
//! The build has no knowledge of file watching. A dev server calls
//! [`build`] again whenever the pages directory changes; unchanged inputs
//! produce byte-identical outputs, which [`crate::cache::OutputDir`] then
//! leaves untouched.

use crate::cache::{CacheError, OutputDir, WriteStatus};
use crate::config::{Config, ConfigError};
use crate::discover::discover;
use crate::layout::{find_app_file, scan_layouts};
use crate::render::{JsxRenderer, RenderError, RenderInput, Renderer};
use crate::routes::{RouteTable, build_route_table};
use crate::tree::{AppWrapper, RouteTree, assemble};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Serialized route table.
pub const ROUTE_TABLE_FILE: &str = "router.json";
/// Generated routing source.
pub const APP_SOURCE_FILE: &str = "app.js";
/// Effective config including the built routes.
pub const CONFIG_SNAPSHOT_FILE: &str = "config.json";

#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions {
    /// Rewrite every output even if unchanged.
    pub force: bool,
}

/// Routes resolved from the pages directory, before anything is written.
#[derive(Debug, Clone)]
pub struct ResolvedRoutes {
    pub table: RouteTable,
    pub tree: RouteTree,
    pub page_count: usize,
    pub layout_count: usize,
}

/// Result of a completed build.
#[derive(Debug)]
pub struct BuildReport {
    pub routes: ResolvedRoutes,
    pub cache_dir: PathBuf,
    /// Each output file name with what happened to it, in write order.
    pub outputs: Vec<(String, WriteStatus)>,
}

#[derive(Debug)]
pub enum BuildOutcome {
    Built(BuildReport),
    /// The configured pages directory does not exist. Nothing was written.
    NoPagesDirectory(PathBuf),
}

/// Discover pages and layouts under `pages_dir` and assemble the route tree.
pub fn resolve_routes(config: &Config, pages_dir: &Path) -> ResolvedRoutes {
    let page_files = discover(pages_dir, &config.extensions);
    let layouts = scan_layouts(pages_dir, &config.extensions);
    info!(
        pages = page_files.len(),
        layouts = layouts.len(),
        "discovered pages"
    );

    let table = build_route_table(&page_files, &config.routes, &config.extensions);
    let app = match find_app_file(pages_dir, &config.extensions) {
        Some(file) => AppWrapper::File(file),
        None => AppWrapper::Default(config.app_module.clone()),
    };
    let tree = assemble(&table, &layouts, app);

    ResolvedRoutes {
        table,
        tree,
        page_count: page_files.len(),
        layout_count: layouts.len(),
    }
}

/// Run the full build for the project at `project_root`.
pub fn build(
    config: &Config,
    project_root: &Path,
    options: BuildOptions,
) -> Result<BuildOutcome, BuildError> {
    let pages_dir = config.pages_path(project_root);
    if !pages_dir.is_dir() {
        return Ok(BuildOutcome::NoPagesDirectory(pages_dir));
    }

    let renderer = JsxRenderer::load(config.template_path(project_root).as_deref())?;
    for component in renderer.undeclared_components() {
        warn!(%component, "template never declares a component the routes render");
    }
    let routes = resolve_routes(config, &pages_dir);

    let source = renderer.render(&RenderInput {
        table: &routes.table,
        tree: &routes.tree,
        pages_dir: &pages_dir,
        strict_mode: config.react_strict_mode,
    });
    let table_json = routes.table.to_json()?;
    let config_json = serde_json::to_string_pretty(&config.with_routes(&routes.table))?;

    let cache_dir = config.cache_path(project_root);
    let mut out = OutputDir::prepare(&cache_dir, options.force)?;
    let mut outputs = Vec::new();
    for (name, contents) in [
        (ROUTE_TABLE_FILE, &table_json),
        (APP_SOURCE_FILE, &source),
        (CONFIG_SNAPSHOT_FILE, &config_json),
    ] {
        let status = out.write(name, contents)?;
        outputs.push((name.to_string(), status));
    }
    out.finish()?;

    let written = outputs
        .iter()
        .filter(|(_, s)| *s == WriteStatus::Written)
        .count();
    info!(
        cache_dir = %cache_dir.display(),
        written,
        unchanged = outputs.len() - written,
        "build complete"
    );

    Ok(BuildOutcome::Built(BuildReport {
        routes,
        cache_dir,
        outputs,
    }))
}

/// Read a previously written route table back from the cache directory.
pub fn load_route_table(cache_dir: &Path) -> Result<RouteTable, BuildError> {
    let content = fs::read_to_string(cache_dir.join(ROUTE_TABLE_FILE))?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config;
    use crate::test_helpers::{find_page, page_paths, page_tree, setup_fixtures};

    fn built(outcome: BuildOutcome) -> BuildReport {
        match outcome {
            BuildOutcome::Built(report) => report,
            BuildOutcome::NoPagesDirectory(path) => {
                panic!("expected a build, pages dir missing: {}", path.display())
            }
        }
    }

    #[test]
    fn missing_pages_dir_short_circuits() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = Config::default();

        let outcome = build(&config, tmp.path(), BuildOptions::default()).unwrap();

        assert!(matches!(outcome, BuildOutcome::NoPagesDirectory(p) if p.ends_with("src/pages")));
        assert!(!tmp.path().join(".aplos").exists());
    }

    #[test]
    fn fixture_project_builds_expected_routes() {
        let tmp = setup_fixtures();
        let config = load_config(tmp.path()).unwrap();

        let report = built(build(&config, tmp.path(), BuildOptions::default()).unwrap());
        let table = &report.routes.table;

        assert_eq!(find_page(table, "/").component, "Index");
        assert_eq!(find_page(table, "/custom-page").component, "Custom");
        assert_eq!(find_page(table, "/blog/:id").requirements["id"], r"\d+");
        assert!(table.find_page("/custom").is_none());
        assert!(!page_paths(table).iter().any(|p| p.contains("_components")));
    }

    #[test]
    fn writes_all_outputs() {
        let tmp = setup_fixtures();
        let config = load_config(tmp.path()).unwrap();

        let report = built(build(&config, tmp.path(), BuildOptions::default()).unwrap());

        for name in [ROUTE_TABLE_FILE, APP_SOURCE_FILE, CONFIG_SNAPSHOT_FILE] {
            assert!(report.cache_dir.join(name).is_file(), "missing {name}");
        }
        assert!(
            report
                .outputs
                .iter()
                .all(|(_, status)| *status == WriteStatus::Written)
        );
    }

    #[test]
    fn rebuild_without_changes_is_unchanged_and_identical() {
        let tmp = setup_fixtures();
        let config = load_config(tmp.path()).unwrap();

        let first = built(build(&config, tmp.path(), BuildOptions::default()).unwrap());
        let app_first = fs::read(first.cache_dir.join(APP_SOURCE_FILE)).unwrap();
        let second = built(build(&config, tmp.path(), BuildOptions::default()).unwrap());
        let app_second = fs::read(second.cache_dir.join(APP_SOURCE_FILE)).unwrap();

        assert_eq!(app_first, app_second);
        assert!(
            second
                .outputs
                .iter()
                .all(|(_, status)| *status == WriteStatus::Unchanged)
        );
    }

    #[test]
    fn force_rewrites_outputs() {
        let tmp = setup_fixtures();
        let config = load_config(tmp.path()).unwrap();
        build(&config, tmp.path(), BuildOptions::default()).unwrap();

        let report = built(build(&config, tmp.path(), BuildOptions { force: true }).unwrap());

        assert!(
            report
                .outputs
                .iter()
                .all(|(_, status)| *status == WriteStatus::Written)
        );
    }

    #[test]
    fn new_page_changes_only_affected_outputs() {
        let tmp = setup_fixtures();
        let config = load_config(tmp.path()).unwrap();
        build(&config, tmp.path(), BuildOptions::default()).unwrap();

        fs::write(tmp.path().join("src/pages/contact.tsx"), "export default 1;\n").unwrap();
        let report = built(build(&config, tmp.path(), BuildOptions::default()).unwrap());

        assert!(report.routes.table.find_page("/contact").is_some());
        assert!(
            report
                .outputs
                .iter()
                .any(|(name, status)| name == APP_SOURCE_FILE && *status == WriteStatus::Written)
        );
    }

    #[test]
    fn route_table_reloads_from_cache() {
        let tmp = setup_fixtures();
        let config = load_config(tmp.path()).unwrap();
        let report = built(build(&config, tmp.path(), BuildOptions::default()).unwrap());

        let loaded = load_route_table(&report.cache_dir).unwrap();

        assert_eq!(loaded, report.routes.table);
    }

    #[test]
    fn config_snapshot_carries_routes_and_runtime_values() {
        let tmp = setup_fixtures();
        let config = load_config(tmp.path()).unwrap();
        let report = built(build(&config, tmp.path(), BuildOptions::default()).unwrap());

        let snapshot: serde_json::Value = serde_json::from_str(
            &fs::read_to_string(report.cache_dir.join(CONFIG_SNAPSHOT_FILE)).unwrap(),
        )
        .unwrap();

        assert_eq!(
            snapshot["routes"].as_array().unwrap().len(),
            report.routes.table.len()
        );
        assert_eq!(snapshot["server"]["port"], 3000);
        assert_eq!(snapshot["public_runtime_config"]["site_name"], "Aplos Demo");
    }

    #[test]
    fn app_file_in_pages_root_wraps_application() {
        let tmp = setup_fixtures();
        let config = load_config(tmp.path()).unwrap();
        let report = built(build(&config, tmp.path(), BuildOptions::default()).unwrap());

        assert_eq!(report.routes.tree.app, AppWrapper::File("/_app.tsx".into()));
        let source = fs::read_to_string(report.cache_dir.join(APP_SOURCE_FILE)).unwrap();
        assert!(source.contains("/_app.tsx\";"));
    }

    #[test]
    fn default_app_module_without_app_file() {
        let tmp = page_tree(&["src/pages/index.jsx"]);
        let config = Config::default();

        let routes = resolve_routes(&config, &config.pages_path(tmp.path()));

        assert_eq!(routes.tree.app, AppWrapper::Default("aplos/app".into()));
        assert_eq!(routes.page_count, 1);
        assert_eq!(routes.layout_count, 0);
    }

    #[test]
    fn custom_template_is_used() {
        let tmp = page_tree(&["src/pages/index.jsx"]);
        fs::write(tmp.path().join("custom.jsx"), "// custom\n{routes}\n").unwrap();
        let config = Config {
            template: Some("custom.jsx".into()),
            ..Config::default()
        };

        let report = built(build(&config, tmp.path(), BuildOptions::default()).unwrap());

        let source = fs::read_to_string(report.cache_dir.join(APP_SOURCE_FILE)).unwrap();
        assert!(source.starts_with("// custom\n"));
        assert!(source.contains("element={<Index />}"));
    }

    #[test]
    fn missing_template_fails_build() {
        let tmp = page_tree(&["src/pages/index.jsx"]);
        let config = Config {
            template: Some("nope.jsx".into()),
            ..Config::default()
        };

        let result = build(&config, tmp.path(), BuildOptions::default());

        assert!(matches!(result, Err(BuildError::Render(_))));
    }

    #[test]
    fn unwritable_cache_dir_fails_build() {
        let tmp = page_tree(&["src/pages/index.jsx"]);
        fs::write(tmp.path().join("blocker"), "file").unwrap();
        let config = Config {
            cache_dir: "blocker/cache".into(),
            ..Config::default()
        };

        let result = build(&config, tmp.path(), BuildOptions::default());

        assert!(matches!(result, Err(BuildError::Cache(_))));
    }
}
