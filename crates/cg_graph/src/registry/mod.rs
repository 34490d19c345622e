//! Resolve type tags to constructors.
//!
//! ## Menu
//!
//! - [`TypeEntry`]: the constructor of one registered type, with its path.
//! - [`EnvironmentEntry`]: the factory of one registered environment.
//! - [`TypeRegistry`]: the two-level `container -> name -> entry` lookup
//!   the decoder resolves type tags through.
//!
//! ## auto_register
//!
//! See [`TypeRegistry::auto_register`].
//!
//! Types derived with `#[config(auto_register)]` are collected through the
//! [`inventory`] crate. Platforms without link-time collection simply end
//! up with nothing collected.
//!
//! [`inventory`]: https://docs.rs/inventory

// -----------------------------------------------------------------------------
// Modules

mod type_entry;
mod type_registry;

// -----------------------------------------------------------------------------
// Exports

pub use type_entry::{ConstructFn, EnvironmentEntry, TypeEntry};
pub use type_registry::TypeRegistry;
