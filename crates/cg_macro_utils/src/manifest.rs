use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;
use std::sync::{PoisonError, RwLock};
use std::time::SystemTime;

use toml_edit::{Document, Item, Table};

/// The facade crate re-exporting every `cg_*` crate under a short name.
const FACADE_NAME: &str = "cfgraph";
const CRATE_PREFIX: &str = "cg_";

/// The dependency tables searched, in order.
const DEPENDENCY_TABLES: [&str; 2] = ["dependencies", "dev-dependencies"];

/// The parsed `Cargo.toml` of the crate currently invoking a proc-macro.
///
/// Generated code must name `cg_graph` by a path that resolves from the
/// *caller's* crate, which is not known to the macro itself. The manifest
/// answers that question:
///
/// 1. a crate listing `cg_graph` directly gets `::cg_graph`;
/// 2. a crate depending only on the `cfgraph` facade gets `::cfgraph::graph`
///    (the `cg_` prefix is stripped);
/// 3. steps 1-2 are repeated for `dev-dependencies`;
/// 4. everything else falls back to `::cg_graph`.
///
/// Inside `cg_graph` itself the fallback is correct because the crate root
/// declares `extern crate self as cg_graph;`.
///
/// ```rust
/// # use cg_macro_utils::Manifest;
/// let path: syn::Path = Manifest::shared(|m| m.crate_path("cg_graph"));
/// ```
#[derive(Debug)]
pub struct Manifest {
    document: Option<Document<Box<str>>>,
    modified: Option<SystemTime>,
}

impl Manifest {
    fn manifest_path() -> Option<PathBuf> {
        let dir = env::var_os("CARGO_MANIFEST_DIR")?;
        let mut path = PathBuf::from(dir);
        path.push("Cargo.toml");
        Some(path)
    }

    fn load(path: &PathBuf, modified: Option<SystemTime>) -> Self {
        let document = std::fs::read_to_string(path)
            .ok()
            .and_then(|text| Document::parse(text.into_boxed_str()).ok());
        Self { document, modified }
    }

    fn parse_path(text: &str) -> Option<syn::Path> {
        syn::parse_str(text).ok()
    }

    fn fallback(name: &str) -> syn::Path {
        Self::parse_path(&format!("::{name}")).unwrap_or_else(|| syn::Path::from(
            syn::Ident::new(name, proc_macro2_span()),
        ))
    }

    fn lookup(table: &Table, name: &str) -> Option<syn::Path> {
        if table.contains_key(name) {
            return Self::parse_path(&format!("::{name}"));
        }
        let short = name.strip_prefix(CRATE_PREFIX)?;
        if table.contains_key(FACADE_NAME) {
            return Self::parse_path(&format!("::{FACADE_NAME}::{short}"));
        }
        None
    }

    /// Returns the path under which the crate `name` is reachable from the
    /// caller. See the type level documentation for the resolution order.
    pub fn crate_path(&self, name: &str) -> syn::Path {
        let Some(document) = &self.document else {
            return Self::fallback(name);
        };
        DEPENDENCY_TABLES
            .iter()
            .filter_map(|key| match document.get(key) {
                Some(Item::Table(table)) => Some(table),
                _ => None,
            })
            .find_map(|table| Self::lookup(table, name))
            .unwrap_or_else(|| Self::fallback(name))
    }

    /// Runs `func` with the caller's manifest.
    ///
    /// Manifests are cached per manifest path and re-read when the file's
    /// modification time changes, so one macro expansion should call this once
    /// and reuse the returned path.
    pub fn shared<R>(func: impl FnOnce(&Self) -> R) -> R {
        static CACHE: RwLock<BTreeMap<PathBuf, Manifest>> = RwLock::new(BTreeMap::new());

        let Some(path) = Self::manifest_path() else {
            return func(&Self {
                document: None,
                modified: None,
            });
        };
        let modified = std::fs::metadata(&path)
            .and_then(|meta| meta.modified())
            .ok();

        {
            let cache = CACHE.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(manifest) = cache.get(&path)
                && manifest.modified == modified
            {
                return func(manifest);
            }
        }

        let manifest = Self::load(&path, modified);
        let result = func(&manifest);
        CACHE
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path, manifest);
        result
    }
}

fn proc_macro2_span() -> proc_macro2::Span {
    proc_macro2::Span::call_site()
}
