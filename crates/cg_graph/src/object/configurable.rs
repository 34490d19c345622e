use alloc::rc::Rc;
use core::any::Any;
use core::fmt;

use crate::object::{Arguments, Attr, ConstructError};
use crate::path::{DynamicTypePath, TypePath};
use crate::value::Mapping;

// -----------------------------------------------------------------------------
// ObjectFamily

/// The recognized families of configurable objects.
///
/// All families are encoded recursively; optimizers additionally drop their
/// bound parameters and merge their default hyperparameters.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ObjectFamily {
    #[default]
    Domain,
    Optimizer,
    LrScheduler,
}

// -----------------------------------------------------------------------------
// Configurable

/// An object whose constructor arguments can be read back.
///
/// `parameters` is the constructible type signature: the names accepted by
/// [`Construct::construct`], in declaration order. `attribute` must return a
/// value for every one of them.
///
/// Usually implemented through
/// [`#[derive(Configurable)]`](crate::derive::Configurable), which also
/// implements [`TypePath`] and [`Construct`].
///
/// ```
/// use cg_graph::object::{Attr, Configurable, ToAttr};
/// use cg_graph::path::TypePath;
///
/// struct Linear {
///     in_features: u32,
///     out_features: u32,
/// }
///
/// impl TypePath for Linear {
///     fn type_path() -> &'static str { "nn::Linear" }
///     fn type_name() -> &'static str { "Linear" }
/// }
///
/// impl Configurable for Linear {
///     fn parameters(&self) -> &'static [&'static str] {
///         &["in_features", "out_features"]
///     }
///
///     fn attribute(&self, name: &str) -> Option<Attr> {
///         match name {
///             "in_features" => Some(self.in_features.to_attr()),
///             "out_features" => Some(self.out_features.to_attr()),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait Configurable: DynamicTypePath + Any {
    /// The names accepted by the constructor.
    fn parameters(&self) -> &'static [&'static str];

    /// Reads the current value of parameter `name`.
    fn attribute(&self, name: &str) -> Option<Attr>;

    fn family(&self) -> ObjectFamily {
        ObjectFamily::Domain
    }

    /// Default hyperparameters of an optimizer.
    ///
    /// Only consulted for [`ObjectFamily::Optimizer`].
    fn optimizer_defaults(&self) -> Option<Mapping> {
        None
    }
}

impl dyn Configurable {
    /// Returns `true` if the object is a `T`.
    #[inline]
    pub fn is<T: Configurable>(&self) -> bool {
        let any: &dyn Any = self;
        any.is::<T>()
    }

    #[inline]
    pub fn downcast_ref<T: Configurable>(&self) -> Option<&T> {
        let any: &dyn Any = self;
        any.downcast_ref::<T>()
    }

    /// Attempts to downcast a shared object, returning it unchanged on failure.
    pub fn downcast_rc<T: Configurable>(self: Rc<Self>) -> Result<Rc<T>, Rc<Self>> {
        if !self.is::<T>() {
            return Err(self);
        }
        let any: Rc<dyn Any> = self;
        match any.downcast::<T>() {
            Ok(value) => Ok(value),
            Err(_) => unreachable!("type checked above"),
        }
    }
}

impl fmt::Debug for dyn Configurable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(self.reflect_type_path())
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// Construct

/// A type that can be rebuilt from named arguments.
///
/// Arguments left unconsumed after `construct` returns make the
/// construction fail with [`ConstructError::UnexpectedArgument`].
pub trait Construct: Configurable + TypePath + Sized {
    fn construct(args: &mut Arguments<'_>) -> Result<Self, ConstructError>;
}

// -----------------------------------------------------------------------------
// Environment

/// A simulation environment.
///
/// Environments are not encoded recursively; an attribute holding one is
/// written as the environment's type path and rebuilt by name through
/// [`TypeRegistry::register_environment`](crate::registry::TypeRegistry::register_environment).
pub trait Environment: DynamicTypePath + Any {}

impl fmt::Debug for dyn Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(self.reflect_type_path())
            .finish_non_exhaustive()
    }
}
