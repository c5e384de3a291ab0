//! Project configuration.
//!
//! Handles loading, validating, and merging `aplos.toml`. The effective
//! configuration is the stock defaults with the project file merged on top,
//! built once per process and passed down explicitly.
//!
//! ## Config File Location
//!
//! ```text
//! my-app/
//! ├── aplos.toml        # optional
//! └── src/
//!     └── pages/
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! pages_dir = "src/pages"
//! cache_dir = ".aplos/cache"
//! extensions = [".js", ".tsx", ".jsx"]
//! react_strict_mode = true
//! app_module = "aplos/app"
//! # template = "templates/root.jsx"
//!
//! [server]
//! port = 3000
//!
//! [public_runtime_config]
//! # api_base_url = "https://api.example.com"
//! # api_timeout = 30
//!
//! [[routes]]
//! source = "/custom"
//! destination = "/custom-page"
//! ```
//!
//! Unknown keys are rejected to catch typos early. `[[routes]]` entries are
//! the exception: they are loaded best-effort (see [`crate::routes::Rewrite`]).

use crate::routes::{RouteEntry, RouteTable};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the project config file.
pub const CONFIG_FILENAME: &str = "aplos.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Project configuration loaded from `aplos.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Pages directory, relative to the project root.
    pub pages_dir: String,
    /// Directory receiving generated outputs, relative to the project root.
    pub cache_dir: String,
    /// Page file extensions, matched case-sensitively as suffixes.
    pub extensions: Vec<String>,
    /// Wrap the rendered application in `<StrictMode>`.
    pub react_strict_mode: bool,
    /// Custom router template, relative to the project root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    /// Import specifier of the pass-through wrapper used without `_app`.
    pub app_module: String,
    pub server: ServerConfig,
    /// Free-form values exposed to the runtime via the config snapshot.
    pub public_runtime_config: toml::Table,
    /// User-declared pages and rewrites, in declaration order.
    pub routes: Vec<RouteEntry>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pages_dir: "src/pages".to_string(),
            cache_dir: ".aplos/cache".to_string(),
            extensions: vec![".js".to_string(), ".tsx".to_string(), ".jsx".to_string()],
            react_strict_mode: true,
            template: None,
            app_module: "aplos/app".to_string(),
            server: ServerConfig::default(),
            public_runtime_config: toml::Table::new(),
            routes: Vec::new(),
        }
    }
}

/// Dev server settings, carried through to the runtime untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 3000 }
    }
}

impl Config {
    /// Validate config values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "extensions must not be empty".into(),
            ));
        }
        if let Some(ext) = self.extensions.iter().find(|e| !e.starts_with('.') || e.len() < 2) {
            return Err(ConfigError::Validation(format!(
                "extension {ext:?} must start with '.' followed by a name"
            )));
        }
        if self.pages_dir.trim().is_empty() {
            return Err(ConfigError::Validation("pages_dir must not be empty".into()));
        }
        if self.cache_dir.trim().is_empty() {
            return Err(ConfigError::Validation("cache_dir must not be empty".into()));
        }
        Ok(())
    }

    pub fn pages_path(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.pages_dir)
    }

    pub fn cache_path(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.cache_dir)
    }

    pub fn template_path(&self, project_root: &Path) -> Option<PathBuf> {
        self.template.as_ref().map(|t| project_root.join(t))
    }

    /// A copy of this config whose routes are the built table.
    pub fn with_routes(&self, table: &RouteTable) -> Self {
        Self {
            routes: table.entries().to_vec(),
            ..self.clone()
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(Config::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely, so
///   `extensions` and `[[routes]]` are replaced, never concatenated.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `aplos.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no config file exists in the directory.
pub fn load_raw_config(project_root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = project_root.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<Config, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: Config = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the project config: stock defaults with `aplos.toml` merged on top.
pub fn load_config(project_root: &Path) -> Result<Config, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(project_root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `aplos.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Aplos Configuration
# ===================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# Directory scanned for pages, relative to the project root.
pages_dir = "src/pages"

# Directory receiving router.json, app.js and config.json.
cache_dir = ".aplos/cache"

# File suffixes treated as pages (case-sensitive).
extensions = [".js", ".tsx", ".jsx"]

# Wrap the application in <StrictMode>.
react_strict_mode = true

# Import used as the application wrapper when src/pages has no _app file.
app_module = "aplos/app"

# Custom router template with {components}, {routes}, {strictMode}
# and {/strictMode} placeholders. The catch-all route renders <NoMatch />,
# so the template must declare or import a NoMatch component.
# template = "templates/root.jsx"

# Page and layout component names are imported into the same module as the
# template, so these names are reserved: App, NoMatch, Router,
# ErrorBoundary, StrictMode, React, HelmetProvider, BrowserRouter, Routes
# and Route. A page such as app.tsx or no-match.tsx collides with them.

# ---------------------------------------------------------------------------
# Dev server (passed through to the runtime)
# ---------------------------------------------------------------------------
[server]
port = 3000

# ---------------------------------------------------------------------------
# Values exposed to the browser runtime
# ---------------------------------------------------------------------------
# Any TOML value is accepted, including numbers, booleans and nested tables,
# and is written to config.json unchanged.
[public_runtime_config]
# api_base_url = "https://api.example.com"
# api_timeout = 30

# ---------------------------------------------------------------------------
# Routes
# ---------------------------------------------------------------------------
# Rewrite a discovered page to another public path. Sources are matched
# before [param] segments become :param, so dynamic pages use brackets.
#
# [[routes]]
# source = "/custom"
# destination = "/custom-page"
#
# Constrain parameters of a page with regular expressions.
#
# [[routes]]
# source = "/blog/[id]"
# destination = "/blog/[id]"
# requirements = { id = "\\d+" }
#
# Declare a page by hand. It takes precedence over a discovered page with
# the same path.
#
# [[routes]]
# path = "/legacy/:id"
# component = "BlogId"
# file = "/blog/[id].tsx"
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::Rewrite;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = Config::default();
        assert_eq!(config.pages_dir, "src/pages");
        assert_eq!(config.cache_dir, ".aplos/cache");
        assert_eq!(config.extensions, vec![".js", ".tsx", ".jsx"]);
        assert!(config.react_strict_mode);
        assert!(config.routes.is_empty());
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILENAME),
            r#"
react_strict_mode = false

[server]
port = 3001
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();

        assert!(!config.react_strict_mode);
        assert_eq!(config.server.port, 3001);
        // Unspecified values stay at their defaults
        assert_eq!(config.pages_dir, "src/pages");
        assert_eq!(config.extensions.len(), 3);
    }

    #[test]
    fn runtime_config_accepts_any_toml_value() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILENAME),
            r#"
[public_runtime_config]
api_timeout = 30
site_name = "Demo"

[public_runtime_config.features]
search = true
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();

        let runtime = &config.public_runtime_config;
        assert_eq!(runtime["api_timeout"].as_integer(), Some(30));
        assert_eq!(runtime["site_name"].as_str(), Some("Demo"));
        assert_eq!(runtime["features"]["search"].as_bool(), Some(true));

        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["public_runtime_config"]["api_timeout"], 30);
        assert_eq!(json["public_runtime_config"]["features"]["search"], true);
    }

    #[test]
    fn routes_load_in_declaration_order() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILENAME),
            r#"
[[routes]]
source = "/custom"
destination = "/custom-page"

[[routes]]
path = "/blog/:id"
component = "BlogPost"
file = "/blog/[id].tsx"
requirements = { id = "\\d+" }
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();

        assert_eq!(config.routes.len(), 2);
        assert!(matches!(
            &config.routes[0],
            RouteEntry::Rewrite(Rewrite { source: Some(s), .. }) if s == "/custom"
        ));
        let page = config.routes[1].as_page().unwrap();
        assert_eq!(page.component, "BlogPost");
        assert_eq!(page.requirements["id"], r"\d+");
    }

    #[test]
    fn malformed_route_loads_as_inert_rewrite() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILENAME),
            r#"
[[routes]]
source = "/only-source"
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();

        assert_eq!(
            config.routes,
            vec![RouteEntry::Rewrite(Rewrite {
                source: Some("/only-source".into()),
                destination: None,
                requirements: Default::default(),
            })]
        );
    }

    #[test]
    fn unknown_keys_rejected() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), "pagse_dir = \"pages\"\n").unwrap();

        let result = load_config(tmp.path());

        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), "pages_dir = ").unwrap();

        assert!(matches!(load_config(tmp.path()), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn empty_extensions_rejected() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), "extensions = []\n").unwrap();

        assert!(matches!(
            load_config(tmp.path()),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn extension_without_dot_rejected() {
        let config = Config {
            extensions: vec!["tsx".into()],
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn merge_replaces_arrays() {
        let base = stock_defaults_value();
        let overlay: toml::Value = toml::from_str("extensions = [\".mdx\"]").unwrap();

        let config = resolve_config(base, Some(overlay)).unwrap();

        assert_eq!(config.extensions, vec![".mdx"]);
    }

    #[test]
    fn merge_preserves_unset_nested_keys() {
        let base: toml::Value = toml::from_str("[server]\nport = 1\n[other]\nx = 1").unwrap();
        let overlay: toml::Value = toml::from_str("[other]\ny = 2").unwrap();

        let merged = merge_toml(base, overlay);

        assert_eq!(merged["server"]["port"].as_integer(), Some(1));
        assert_eq!(merged["other"]["x"].as_integer(), Some(1));
        assert_eq!(merged["other"]["y"].as_integer(), Some(2));
    }

    #[test]
    fn with_routes_returns_new_config() {
        let config = Config::default();
        let table = RouteTable::new(vec![RouteEntry::Rewrite(Rewrite::default())]);

        let merged = config.with_routes(&table);

        assert!(config.routes.is_empty());
        assert_eq!(merged.routes.len(), 1);
        assert_eq!(merged.pages_dir, config.pages_dir);
    }

    #[test]
    fn stock_config_lists_every_reserved_component() {
        for name in crate::render::RESERVED_COMPONENTS {
            assert!(stock_config_toml().contains(name), "{name} not documented");
        }
    }

    #[test]
    fn stock_config_parses_to_defaults() {
        let config: Config = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn paths_resolve_against_project_root() {
        let config = Config::default();
        let root = Path::new("/work/app");
        assert_eq!(config.pages_path(root), Path::new("/work/app/src/pages"));
        assert_eq!(config.cache_path(root), Path::new("/work/app/.aplos/cache"));
        assert_eq!(config.template_path(root), None);
    }
}
