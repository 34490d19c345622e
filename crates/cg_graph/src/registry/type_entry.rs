use alloc::rc::Rc;
use core::fmt;

use crate::object::{Arguments, Configurable, Construct, ConstructError, Environment};
use crate::path::TypePath;

/// A type-erased constructor.
///
/// Fails if any argument is left unconsumed.
pub type ConstructFn = fn(&mut Arguments<'_>) -> Result<Rc<dyn Configurable>, ConstructError>;

// -----------------------------------------------------------------------------
// TypeEntry

/// A constructible type known to a [`TypeRegistry`](crate::registry::TypeRegistry).
#[derive(Clone, Copy)]
pub struct TypeEntry {
    type_path: &'static str,
    type_name: &'static str,
    construct: ConstructFn,
}

fn construct_erased<T: Construct>(args: &mut Arguments<'_>) -> Result<Rc<dyn Configurable>, ConstructError> {
    let object = T::construct(args)?;
    args.ensure_consumed()?;
    Ok(Rc::new(object))
}

impl TypeEntry {
    /// The entry of `T`.
    #[inline]
    pub fn of<T: Construct>() -> Self {
        Self {
            type_path: T::type_path(),
            type_name: T::type_name(),
            construct: construct_erased::<T>,
        }
    }

    /// An entry with a custom constructor.
    #[inline]
    pub const fn new(type_path: &'static str, type_name: &'static str, construct: ConstructFn) -> Self {
        Self {
            type_path,
            type_name,
            construct,
        }
    }

    #[inline]
    pub const fn type_path(&self) -> &'static str {
        self.type_path
    }

    #[inline]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Invokes the constructor.
    #[inline]
    pub fn construct(&self, args: &mut Arguments<'_>) -> Result<Rc<dyn Configurable>, ConstructError> {
        (self.construct)(args)
    }
}

impl fmt::Debug for TypeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeEntry")
            .field("type_path", &self.type_path)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// EnvironmentEntry

/// A named environment factory.
#[derive(Clone, Copy)]
pub struct EnvironmentEntry {
    type_path: &'static str,
    create: fn() -> Rc<dyn Environment>,
}

fn create_default<E: Environment + TypePath + Default>() -> Rc<dyn Environment> {
    Rc::new(E::default())
}

impl EnvironmentEntry {
    #[inline]
    pub fn of<E: Environment + TypePath + Default>() -> Self {
        Self {
            type_path: E::type_path(),
            create: create_default::<E>,
        }
    }

    #[inline]
    pub const fn type_path(&self) -> &'static str {
        self.type_path
    }

    #[inline]
    pub fn create(&self) -> Rc<dyn Environment> {
        (self.create)()
    }
}

impl fmt::Debug for EnvironmentEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EnvironmentEntry").field(&self.type_path).finish()
    }
}

