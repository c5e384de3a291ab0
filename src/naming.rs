//! Name derivation for page and layout components.
//!
//! Every page file becomes a JSX identifier built from its path segments.
//! Segments are cleaned with [`format_segment`] (brackets, underscores and
//! hyphens removed), capitalized, and concatenated:
//!
//! - `/about.tsx` → `About`
//! - `/blog/[id].tsx` → `BlogId`
//! - `/docs/getting-started.jsx` → `DocsGettingstarted`
//! - `/shop/[category]/list.tsx` → `ShopShopCategoryList`
//!
//! A dynamic directory segment (`[category]`) is prefixed with the segment
//! right before it, so `/shop/[category]/list` and `/blog/[category]/list`
//! stay distinct even though their dynamic parts are spelled alike.
//!
//! ## Collisions
//!
//! Names are not guaranteed unique: `/a-b.tsx` and `/ab.tsx` both become `Ab`.
//! Such collisions are a content error and are not repaired here. The route
//! table keeps the first path registered while the generated imports keep
//! the last file registered under a name (see [`crate::render`]).

use regex::Regex;
use std::sync::LazyLock;

/// Component name given to the layout found at the pages root.
pub const ROOT_LAYOUT: &str = "RootLayout";

/// Suffix appended to every non-root layout component name.
pub const LAYOUT_SUFFIX: &str = "Layout";

static DYNAMIC_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(.*?)\]").expect("dynamic token pattern is valid"));

/// Strip the characters used for dynamic segments and grouping.
///
/// Removes every `[`, `]`, `_` and `-`. Pure, total and idempotent.
pub fn format_segment(segment: &str) -> String {
    segment
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | '_' | '-'))
        .collect()
}

/// Uppercase the first character, leaving the rest untouched.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Whether a raw segment is a bracketed dynamic segment like `[id]`.
pub fn is_dynamic(segment: &str) -> bool {
    segment.len() >= 2 && segment.starts_with('[') && segment.ends_with(']')
}

/// Rewrite every `[param]` token to the `:param` URL syntax.
pub fn param_syntax(path: &str) -> String {
    DYNAMIC_TOKEN.replace_all(path, ":$1").into_owned()
}

fn pascal(segment: &str) -> String {
    capitalize(&format_segment(segment))
}

/// Derive the component name of a page from its directory segments and
/// its extension-less file name.
///
/// Empty segments and segments equal to `file_name` are ignored.
pub fn component_name(segments: &[&str], file_name: &str) -> String {
    let segments: Vec<&str> = segments
        .iter()
        .copied()
        .filter(|s| !s.is_empty() && *s != file_name)
        .collect();

    let mut name = String::new();
    for (i, segment) in segments.iter().enumerate() {
        if is_dynamic(segment)
            && let Some(previous) = i.checked_sub(1).map(|p| segments[p])
            && !is_dynamic(previous)
        {
            name.push_str(&pascal(previous));
        }
        name.push_str(&pascal(segment));
    }
    name.push_str(&pascal(file_name));
    name
}

/// Derive the component name of a layout from its directory segments.
///
/// The pages root (no segments) always yields [`ROOT_LAYOUT`].
pub fn layout_component_name(segments: &[&str]) -> String {
    let mut name: String = segments
        .iter()
        .filter(|s| !s.is_empty())
        .map(|s| pascal(s))
        .collect();
    if name.is_empty() {
        return ROOT_LAYOUT.to_string();
    }
    name.push_str(LAYOUT_SUFFIX);
    name
}
