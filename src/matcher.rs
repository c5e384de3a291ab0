//! URL matching against a built route table.
//!
//! Used by `aplos match <url>` to answer "which page would serve this URL?".
//! Each page path is compiled into an anchored regular expression:
//!
//! - literal text is escaped,
//! - `:name` becomes a group using the route's requirement for `name`,
//!   or `[^/]+` when none is declared.
//!
//! ```text
//! /blog/:id   + { id: "\d+" }   →   ^/blog/(?P<p0>\d+)$
//! /:org/:repo                   →   ^/(?P<p0>[^/]+)/(?P<p1>[^/]+)$
//! ```
//!
//! Parameter names may contain `-` (`:post-id`), which regex group names
//! cannot, so groups are numbered and mapped back to the parameter names by
//! [`CompiledRoute`].
//!
//! Routes are tried in table order and the first match wins. A route whose
//! pattern fails to compile (bad requirement regex) is logged and treated as
//! never matching.

use crate::routes::{Requirements, RouteRecord, RouteTable};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::warn;

/// Pattern used for a parameter without a declared requirement.
pub const DEFAULT_REQUIREMENT: &str = "[^/]+";

static PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":([\w-]+)").expect("param pattern is valid"));

/// A page that matched a URL, with the extracted parameter values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    pub route: &'a RouteRecord,
    pub params: BTreeMap<String, String>,
}

/// A route path compiled into an anchored regex, with its parameter names
/// in group order.
#[derive(Debug, Clone)]
pub struct CompiledRoute {
    pub regex: Regex,
    pub params: Vec<String>,
}

impl CompiledRoute {
    /// Parameter values captured from `url`, or `None` if it does not match.
    pub fn captures(&self, url: &str) -> Option<BTreeMap<String, String>> {
        let caps = self.regex.captures(url)?;
        Some(
            self.params
                .iter()
                .enumerate()
                .filter_map(|(i, name)| {
                    caps.name(&group_name(i))
                        .map(|value| (name.clone(), value.as_str().to_string()))
                })
                .collect(),
        )
    }
}

fn group_name(index: usize) -> String {
    format!("p{index}")
}

/// Compile a route path into an anchored regular expression.
pub fn compile(path: &str, requirements: &Requirements) -> Result<CompiledRoute, regex::Error> {
    let mut pattern = String::from("^");
    let mut params = Vec::new();
    let mut last = 0;
    for caps in PARAM.captures_iter(path) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        pattern.push_str(&regex::escape(&path[last..whole.start()]));
        let requirement = requirements
            .get(name.as_str())
            .map(String::as_str)
            .unwrap_or(DEFAULT_REQUIREMENT);
        pattern.push_str(&format!("(?P<{}>{})", group_name(params.len()), requirement));
        params.push(name.as_str().to_string());
        last = whole.end();
    }
    pattern.push_str(&regex::escape(&path[last..]));
    pattern.push('$');
    Ok(CompiledRoute {
        regex: Regex::new(&pattern)?,
        params,
    })
}

/// Match a single route against `url`.
pub fn match_route<'a>(route: &'a RouteRecord, url: &str) -> Option<RouteMatch<'a>> {
    let compiled = match compile(&route.path, &route.requirements) {
        Ok(compiled) => compiled,
        Err(err) => {
            warn!(path = %route.path, error = %err, "route pattern does not compile");
            return None;
        }
    };
    let params = compiled.captures(url)?;
    Some(RouteMatch { route, params })
}

/// First page in the table whose pattern matches `url`.
pub fn match_url<'a>(table: &'a RouteTable, url: &str) -> Option<RouteMatch<'a>> {
    table.pages().find_map(|route| match_route(route, url))
}
