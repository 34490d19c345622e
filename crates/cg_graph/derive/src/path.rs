//! Paths of the items generated code refers to.

use proc_macro2::TokenStream;
use quote::quote;

/// Get the correct access path to the `cg_graph` crate.
///
/// Resolved from the caller's `Cargo.toml`, see `cg_macro_utils::Manifest`.
/// The lookup is not free, so the path is computed once per expansion and
/// passed around.
pub(crate) fn cg_graph() -> syn::Path {
    cg_macro_utils::Manifest::shared(|manifest| manifest.crate_path("cg_graph"))
}

#[inline(always)]
pub(crate) fn object_(cg_graph_path: &syn::Path) -> TokenStream {
    quote! {
        #cg_graph_path::object
    }
}

#[inline(always)]
pub(crate) fn type_path_(cg_graph_path: &syn::Path) -> TokenStream {
    quote! {
        #cg_graph_path::path::TypePath
    }
}

#[inline(always)]
pub(crate) fn value_(cg_graph_path: &syn::Path) -> TokenStream {
    quote! {
        #cg_graph_path::value
    }
}

#[cfg(feature = "auto_register")]
#[inline(always)]
pub(crate) fn auto_register_(cg_graph_path: &syn::Path) -> TokenStream {
    quote! {
        #cg_graph_path::__macro_exports::auto_register
    }
}
