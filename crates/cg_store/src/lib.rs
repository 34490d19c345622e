#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(clippy::std_instead_of_alloc, reason = "std-only crate")]

// -----------------------------------------------------------------------------
// Modules

mod error;
mod handler;
mod store;

// -----------------------------------------------------------------------------
// Exports

pub use error::StoreError;
pub use handler::ConfigHandler;
pub use store::{CONFIG_EXTENSION, DocumentStore, YamlStore, with_config_extension};
