//! The object side of a conversion.
//!
//! ## Menu
//!
//! - [`Configurable`]: the object-safe capability the encoder reads from:
//!   a parameter list and one readable attribute per parameter.
//! - [`Construct`]: the static capability the decoder calls to rebuild an
//!   object from named [`Arguments`].
//! - [`Attr`] / [`ToAttr`]: the closed set of attribute value kinds.
//! - [`Decoded`] / [`FromArgument`]: decoded values handed to constructors.
//! - Value kinds with special document forms: [`Device`], [`NumericArray`],
//!   [`ConfigEnum`] (see [`impl_config_enum`](crate::impl_config_enum)),
//!   [`Environment`] and [`BackRef`].

// -----------------------------------------------------------------------------
// Modules

mod args;
mod array;
mod attr;
mod back_ref;
mod configurable;
mod device;
mod enums;

// -----------------------------------------------------------------------------
// Exports

pub use args::{ArgumentMap, ArgumentMismatch, Arguments, ConstructError, Decoded, FromArgument};
pub use array::{NumericArray, ShapeError};
pub use attr::{Attr, ToAttr};
pub use back_ref::BackRef;
pub use configurable::{Configurable, Construct, Environment, ObjectFamily};
pub use device::{Device, ParseDeviceError};
pub use enums::ConfigEnum;

/// The parameter an optimizer's bound model parameters are passed through.
///
/// Never part of a config record.
pub const OPTIMIZER_PARAMS_KEY: &str = "params";
