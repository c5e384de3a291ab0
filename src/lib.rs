//! # Aplos
//!
//! A file-system page router generator for small React applications. The
//! pages directory is the routing table: files become routes, `[param]`
//! segments become dynamic parameters, and `_layout` files wrap everything
//! beneath them.
//!
//! # Architecture: One Pass, Three Outputs
//!
//! A build is a single synchronous pass over the pages directory:
//!
//! ```text
//! 1. Discover   src/pages/      →  page files + layouts   (filesystem → data)
//! 2. Route      page files      →  RouteTable             (naming, rewrites, dedup)
//! 3. Assemble   table + layouts →  RouteTree              (nesting under layouts)
//! 4. Render     tree            →  app.js                 (react-router JSX)
//! 5. Write      router.json, app.js, config.json → .aplos/cache/
//! ```
//!
//! Every stage except discovery and writing is a pure function over
//! in-memory data, so unit tests exercise routing logic without touching the
//! filesystem. File watching lives outside the crate: a dev server calls
//! [`pipeline::build`] again on change, and unchanged inputs produce
//! byte-identical outputs.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`naming`] | Segment formatting, `[param]` → `:param`, component names |
//! | [`discover`] | Walks the pages directory; the single reserved-prefix rule |
//! | [`layout`] | Finds `_layout` files per directory and the `_app` wrapper |
//! | [`routes`] | Route table data model and construction (rewrites, dedup) |
//! | [`tree`] | Nests routes under their deepest layout scope |
//! | [`render`] | `Renderer` trait and the react-router JSX renderer |
//! | [`matcher`] | Matches a URL against the table for `aplos match` |
//! | [`config`] | `aplos.toml` loading, merging onto stock defaults, validation |
//! | [`cache`] | Atomic output writes and the content-hash build manifest |
//! | [`pipeline`] | End-to-end `build` entry point |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Structured Tree, Text Last
//!
//! Route nesting is resolved into a [`tree::RouteTree`] before any text is
//! produced. The renderer only walks that structure, so a different router
//! target is a new [`render::Renderer`] implementation and the resolution
//! rules stay in one place.
//!
//! ## Explicit Configuration
//!
//! Configuration is a plain [`config::Config`] value built once from stock
//! defaults with `aplos.toml` merged on top, then passed down. The routes
//! snapshot written to `config.json` comes from [`config::Config::with_routes`],
//! which returns a new value instead of mutating the loaded one.
//!
//! ## Stable Outputs
//!
//! Bundlers rebuild whenever a watched file changes. Outputs whose content hash
//! matches the previous build are not rewritten, and changed outputs are
//! replaced atomically, so a watcher never sees a partial file.

pub mod cache;
pub mod config;
pub mod discover;
pub mod layout;
pub mod matcher;
pub mod naming;
pub mod output;
pub mod pipeline;
pub mod render;
pub mod routes;
pub mod tree;

#[cfg(test)]
pub(crate) mod test_helpers;
