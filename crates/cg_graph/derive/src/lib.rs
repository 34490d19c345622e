//! See [`Configurable`].
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(clippy::std_instead_of_core, reason = "proc-macro lib")]
#![allow(clippy::std_instead_of_alloc, reason = "proc-macro lib")]

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

static CONFIG_ATTRIBUTE_NAME: &str = "config";

// -----------------------------------------------------------------------------
// Modules

mod attributes;
mod derive_data;
mod impls;
mod path;

// -----------------------------------------------------------------------------
// Macros

/// # Configurable Derivation
///
/// `#[derive(Configurable)]` implements the following traits for a struct
/// with named fields:
///
/// - `TypePath`
/// - `Configurable`
/// - `Construct`
///
/// Every field is a constructor parameter named after the field, read with
/// `ToAttr` when encoding and taken with `FromArgument` when decoding.
/// `class` and `_id` hold the record tags and cannot name a parameter.
///
/// ## Type Attributes
///
/// ```rust, ignore
/// #[derive(Configurable)]
/// #[config(type_path = "nn::Mlp")]
/// struct Mlp { /* ... */ }
/// ```
///
/// - `type_path = "..."`: overrides the default `module_path!()::Name`.
///   Pinning the path keeps old documents loadable after the type moves.
/// - `optimizer`: the type is an optimizer. Its `params` field is never
///   encoded and its `defaults` field is merged into the record.
/// - `scheduler`: the type is a learning-rate scheduler.
/// - `auto_register`: submits the type to `TypeRegistry::auto_register`.
///   A no-op when the `auto_register` feature is disabled.
///
/// ## Field Attributes
///
/// - `skip`: not a parameter; rebuilt with `Default::default()`.
/// - `default`: an absent argument falls back to `Default::default()`.
/// - `environment`: an `Rc<dyn Environment>` written as its type path and
///   recreated through the registry.
/// - `defaults`: the `Mapping` of default hyperparameters of an optimizer.
///   Receives every argument no other field took.
///
/// ## Example
///
/// ```rust, ignore
/// #[derive(Configurable)]
/// #[config(optimizer, auto_register)]
/// struct Sgd {
///     #[config(default)]
///     params: Vec<f64>,
///     lr: f64,
///     #[config(defaults)]
///     defaults: Mapping,
/// }
/// ```
#[proc_macro_derive(Configurable, attributes(config))]
pub fn derive_configurable(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);

    match derive_data::ConfigStruct::from_ast(&ast) {
        Ok(data) => impls::impl_configurable(&data).into(),
        Err(err) => err.into_compile_error().into(),
    }
}
