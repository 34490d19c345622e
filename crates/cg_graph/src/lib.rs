#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// Extern Self

// Generated code names this crate `::cg_graph`, which must also resolve
// inside the crate's own tests.
extern crate self as cg_graph;

// -----------------------------------------------------------------------------
// no_std support

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod decode;
mod encode;
mod error;

pub mod hash;
pub mod identity;
pub mod object;
pub mod path;
pub mod record;
pub mod registry;
pub mod value;

#[cfg(test)]
mod fixtures;

// -----------------------------------------------------------------------------
// Top-Level exports

#[doc(hidden)]
pub mod __macro_exports;

pub use cg_graph_derive as derive;

pub use decode::{DecodeOptions, Decoder, RewriteRule, config_to_object};
pub use encode::{EncodeOptions, Encoder, object_to_config};
pub use error::{ConvertError, MalformedKind, TypeResolutionError};

/// The nesting depth at which encoding and decoding give up.
pub const DEFAULT_MAX_DEPTH: usize = 512;
