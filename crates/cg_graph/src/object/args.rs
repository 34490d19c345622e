use alloc::borrow::Cow;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::num::{NonZeroI32, NonZeroI64, NonZeroU8, NonZeroU16, NonZeroU32, NonZeroU64, NonZeroUsize};

use indexmap::IndexMap;
use thiserror::Error;

use crate::TypeResolutionError;
use crate::hash::FixedHashState;
use crate::object::{BackRef, Configurable, Device, Environment, NumericArray};
use crate::path::{DynamicTypePath, TypePath};
use crate::registry::TypeRegistry;
use crate::value::{Mapping, Value};

// -----------------------------------------------------------------------------
// Decoded

/// A decoded attribute value.
#[derive(Debug, Clone)]
pub enum Decoded {
    /// A plain document value.
    Value(Value),
    /// A reconstructed object.
    Object(Rc<dyn Configurable>),
    /// A reference to an object that is still under construction.
    ///
    /// Only [`BackRef`] parameters accept it.
    Pending(BackRef),
    /// A sequence that contained at least one record.
    Seq(Vec<Decoded>),
}

impl Decoded {
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Decoded::Value(value) => value.kind_name(),
            Decoded::Object(_) => "object",
            Decoded::Pending(_) => "unresolved back reference",
            Decoded::Seq(_) => "sequence",
        }
    }

    /// Returns the object if this is one.
    pub fn into_object(self) -> Option<Rc<dyn Configurable>> {
        match self {
            Decoded::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Converts back into a plain document value.
    ///
    /// Fails if an object is found anywhere inside.
    pub fn into_value(self) -> Result<Value, ArgumentMismatch> {
        match self {
            Decoded::Value(value) => Ok(value),
            Decoded::Seq(items) => items
                .into_iter()
                .map(Decoded::into_value)
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Seq),
            other => Err(ArgumentMismatch::new("a plain value", other.kind_name())),
        }
    }

    /// Splits a sequence into its elements.
    fn into_items(self) -> Result<Vec<Decoded>, ArgumentMismatch> {
        match self {
            Decoded::Seq(items) => Ok(items),
            Decoded::Value(Value::Seq(items)) => Ok(items.into_iter().map(Decoded::Value).collect()),
            other => Err(ArgumentMismatch::new("a sequence", other.kind_name())),
        }
    }
}

impl From<Value> for Decoded {
    #[inline]
    fn from(value: Value) -> Self {
        Decoded::Value(value)
    }
}

// -----------------------------------------------------------------------------
// Errors

/// A decoded value does not fit the requested parameter type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("expected {expected}, found {found}")]
pub struct ArgumentMismatch {
    pub expected: Cow<'static, str>,
    pub found: Cow<'static, str>,
}

impl ArgumentMismatch {
    pub fn new(expected: impl Into<Cow<'static, str>>, found: impl Into<Cow<'static, str>>) -> Self {
        Self {
            expected: expected.into(),
            found: found.into(),
        }
    }
}

/// A constructor rejected its arguments.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConstructError {
    #[error("missing argument `{0}`")]
    MissingArgument(String),

    #[error("unexpected argument `{0}`")]
    UnexpectedArgument(String),

    #[error("invalid argument `{name}`: {source}")]
    InvalidArgument {
        name: String,
        #[source]
        source: ArgumentMismatch,
    },

    #[error("environment argument `{name}`: {source}")]
    Environment {
        name: String,
        #[source]
        source: TypeResolutionError,
    },

    /// Validation performed by the constructor itself.
    #[error("{0}")]
    Custom(String),
}

impl ConstructError {
    #[inline]
    pub fn custom(message: impl Into<String>) -> Self {
        ConstructError::Custom(message.into())
    }
}

// -----------------------------------------------------------------------------
// Arguments

/// Decoded attributes of one record, keyed by parameter name.
pub type ArgumentMap = IndexMap<String, Decoded, FixedHashState>;

/// The named arguments handed to [`Construct::construct`].
///
/// Each parameter is taken out exactly once; the decoder rejects the
/// construction if any argument is left over.
///
/// [`Construct::construct`]: crate::object::Construct::construct
pub struct Arguments<'a> {
    registry: &'a TypeRegistry,
    entries: ArgumentMap,
}

impl<'a> Arguments<'a> {
    pub fn new(registry: &'a TypeRegistry, entries: ArgumentMap) -> Self {
        Self { registry, entries }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Removes the raw decoded value of `name`.
    #[inline]
    pub fn take_raw(&mut self, name: &str) -> Option<Decoded> {
        self.entries.shift_remove(name)
    }

    fn convert<T: FromArgument>(name: &str, value: Decoded) -> Result<T, ConstructError> {
        T::from_argument(value).map_err(|source| ConstructError::InvalidArgument {
            name: name.into(),
            source,
        })
    }

    /// Takes the argument `name`.
    ///
    /// A missing argument is an error unless `T` has a natural absent value
    /// (`Option<T>` becomes `None`).
    pub fn take<T: FromArgument>(&mut self, name: &str) -> Result<T, ConstructError> {
        match self.take_raw(name) {
            Some(value) => Self::convert(name, value),
            None => T::when_missing().ok_or_else(|| ConstructError::MissingArgument(name.into())),
        }
    }

    /// Takes the argument `name`, or `T::default()` if it is absent.
    pub fn take_or_default<T: FromArgument + Default>(&mut self, name: &str) -> Result<T, ConstructError> {
        self.take_or_else(name, T::default)
    }

    pub fn take_or_else<T: FromArgument>(
        &mut self,
        name: &str,
        default: impl FnOnce() -> T,
    ) -> Result<T, ConstructError> {
        match self.take_raw(name) {
            Some(value) => Self::convert(name, value),
            None => Ok(default()),
        }
    }

    /// Takes an environment argument and rebuilds it from its type path.
    pub fn take_environment(&mut self, name: &str) -> Result<Rc<dyn Environment>, ConstructError> {
        let path: String = self.take(name)?;
        self.registry
            .create_environment(&path)
            .map_err(|source| ConstructError::Environment {
                name: name.into(),
                source,
            })
    }

    /// Takes every remaining argument as a plain mapping.
    pub fn take_remaining(&mut self) -> Result<Mapping, ConstructError> {
        let mut remaining = Mapping::with_capacity_and_hasher(self.entries.len(), FixedHashState);
        for (name, value) in self.entries.drain(..) {
            let value = value
                .into_value()
                .map_err(|source| ConstructError::InvalidArgument {
                    name: name.clone(),
                    source,
                })?;
            remaining.insert(name, value);
        }
        Ok(remaining)
    }

    /// Fails on the first argument nobody took.
    pub fn ensure_consumed(&self) -> Result<(), ConstructError> {
        match self.entries.keys().next() {
            Some(name) => Err(ConstructError::UnexpectedArgument(name.clone())),
            None => Ok(()),
        }
    }
}

// -----------------------------------------------------------------------------
// FromArgument

/// Converts a decoded value into a constructor parameter.
pub trait FromArgument: Sized {
    fn from_argument(value: Decoded) -> Result<Self, ArgumentMismatch>;

    /// The value used when the argument is absent, if there is a natural one.
    #[inline]
    fn when_missing() -> Option<Self> {
        None
    }
}

fn plain(value: Decoded, expected: &'static str) -> Result<Value, ArgumentMismatch> {
    match value {
        Decoded::Value(value) => Ok(value),
        other => Err(ArgumentMismatch::new(expected, other.kind_name())),
    }
}

impl FromArgument for Decoded {
    #[inline]
    fn from_argument(value: Decoded) -> Result<Self, ArgumentMismatch> {
        Ok(value)
    }
}

impl FromArgument for Value {
    #[inline]
    fn from_argument(value: Decoded) -> Result<Self, ArgumentMismatch> {
        value.into_value()
    }
}

impl FromArgument for bool {
    fn from_argument(value: Decoded) -> Result<Self, ArgumentMismatch> {
        let value = plain(value, "a boolean")?;
        value
            .as_bool()
            .ok_or_else(|| ArgumentMismatch::new("a boolean", value.kind_name()))
    }
}

impl FromArgument for String {
    fn from_argument(value: Decoded) -> Result<Self, ArgumentMismatch> {
        match plain(value, "a string")? {
            Value::String(s) => Ok(s),
            other => Err(ArgumentMismatch::new("a string", other.kind_name())),
        }
    }
}

impl FromArgument for f64 {
    fn from_argument(value: Decoded) -> Result<Self, ArgumentMismatch> {
        let value = plain(value, "a number")?;
        value
            .as_float()
            .ok_or_else(|| ArgumentMismatch::new("a number", value.kind_name()))
    }
}

impl FromArgument for f32 {
    #[inline]
    fn from_argument(value: Decoded) -> Result<Self, ArgumentMismatch> {
        f64::from_argument(value).map(|v| v as f32)
    }
}

macro_rules! impl_from_argument_int {
    ($($ty:ty),*) => {
        $(
            impl FromArgument for $ty {
                fn from_argument(value: Decoded) -> Result<Self, ArgumentMismatch> {
                    let value = plain(value, "an integer")?;
                    let Some(int) = value.as_int() else {
                        return Err(ArgumentMismatch::new("an integer", value.kind_name()));
                    };
                    <$ty>::try_from(int).map_err(|_| {
                        ArgumentMismatch::new(
                            concat!("an integer within `", stringify!($ty), "`"),
                            alloc::format!("{int}"),
                        )
                    })
                }
            }
        )*
    };
}

impl_from_argument_int!(i8, i16, i32, i64, isize, i128, u8, u16, u32, u64, usize, u128);

macro_rules! impl_from_argument_non_zero {
    ($($ty:ty => $inner:ty),*) => {
        $(
            impl FromArgument for $ty {
                fn from_argument(value: Decoded) -> Result<Self, ArgumentMismatch> {
                    let inner = <$inner>::from_argument(value)?;
                    <$ty>::new(inner).ok_or_else(|| ArgumentMismatch::new("a non-zero integer", "0"))
                }
            }
        )*
    };
}

impl_from_argument_non_zero!(
    NonZeroU8 => u8,
    NonZeroU16 => u16,
    NonZeroU32 => u32,
    NonZeroU64 => u64,
    NonZeroUsize => usize,
    NonZeroI32 => i32,
    NonZeroI64 => i64
);

impl<T: FromArgument> FromArgument for Option<T> {
    fn from_argument(value: Decoded) -> Result<Self, ArgumentMismatch> {
        match value {
            Decoded::Value(Value::Null) => Ok(None),
            other => T::from_argument(other).map(Some),
        }
    }

    #[inline]
    fn when_missing() -> Option<Self> {
        Some(None)
    }
}

impl<T: FromArgument> FromArgument for Vec<T> {
    fn from_argument(value: Decoded) -> Result<Self, ArgumentMismatch> {
        value.into_items()?.into_iter().map(T::from_argument).collect()
    }
}

impl FromArgument for Mapping {
    fn from_argument(value: Decoded) -> Result<Self, ArgumentMismatch> {
        match plain(value, "a mapping")? {
            Value::Map(map) => Ok(map),
            other => Err(ArgumentMismatch::new("a mapping", other.kind_name())),
        }
    }
}

impl FromArgument for Rc<dyn Configurable> {
    fn from_argument(value: Decoded) -> Result<Self, ArgumentMismatch> {
        match value {
            Decoded::Object(object) => Ok(object),
            other => Err(ArgumentMismatch::new("an object", other.kind_name())),
        }
    }
}

impl<T: Configurable + TypePath> FromArgument for Rc<T> {
    fn from_argument(value: Decoded) -> Result<Self, ArgumentMismatch> {
        match value {
            Decoded::Object(object) => object
                .downcast_rc::<T>()
                .map_err(|object| ArgumentMismatch::new(T::type_path(), object.reflect_type_path())),
            other => Err(ArgumentMismatch::new(T::type_path(), other.kind_name())),
        }
    }
}

impl FromArgument for BackRef {
    fn from_argument(value: Decoded) -> Result<Self, ArgumentMismatch> {
        match value {
            Decoded::Object(object) => Ok(BackRef::from_dyn(&object)),
            Decoded::Pending(back) => Ok(back),
            Decoded::Value(Value::Null) => Ok(BackRef::empty()),
            other => Err(ArgumentMismatch::new("an object reference", other.kind_name())),
        }
    }

    #[inline]
    fn when_missing() -> Option<Self> {
        Some(BackRef::empty())
    }
}

impl FromArgument for Device {
    fn from_argument(value: Decoded) -> Result<Self, ArgumentMismatch> {
        let text = String::from_argument(value)?;
        text.parse()
            .map_err(|_| ArgumentMismatch::new("a device descriptor", text))
    }
}

impl FromArgument for NumericArray {
    fn from_argument(value: Decoded) -> Result<Self, ArgumentMismatch> {
        NumericArray::from_value(&plain(value, "a numeric array")?)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::vec;
    use alloc::vec::Vec;

    use super::{ArgumentMap, Arguments, ConstructError, Decoded};
    use crate::object::Device;
    use crate::registry::TypeRegistry;
    use crate::value::Value;

    fn arguments<'r>(registry: &'r TypeRegistry, entries: &[(&str, Value)]) -> Arguments<'r> {
        let mut map = ArgumentMap::default();
        for (name, value) in entries {
            map.insert((*name).into(), Decoded::Value(value.clone()));
        }
        Arguments::new(registry, map)
    }

    #[test]
    fn take_converts_and_consumes() {
        let registry = TypeRegistry::new();
        let mut args = arguments(
            &registry,
            &[("lr", Value::Int(1)), ("device", "cuda:0".into()), ("layers", Value::Seq(vec![64.into(), 64.into()]))],
        );

        assert_eq!(args.take::<f64>("lr"), Ok(1.0));
        assert_eq!(args.take::<Device>("device"), Ok(Device::Cuda(Some(0))));
        assert_eq!(args.take::<Vec<u32>>("layers"), Ok(vec![64, 64]));
        assert!(args.ensure_consumed().is_ok());
    }

    #[test]
    fn missing_and_leftover_arguments() {
        let registry = TypeRegistry::new();
        let mut args = arguments(&registry, &[("gamma", Value::Float(0.9))]);

        assert_eq!(
            args.take::<f64>("step_size"),
            Err(ConstructError::MissingArgument("step_size".into()))
        );
        assert_eq!(args.take::<Option<String>>("name"), Ok(None));
        assert_eq!(args.take_or_default::<u32>("warmup"), Ok(0));
        assert_eq!(
            args.ensure_consumed(),
            Err(ConstructError::UnexpectedArgument("gamma".into()))
        );
    }

    #[test]
    fn mismatched_argument_names_the_parameter() {
        let registry = TypeRegistry::new();
        let mut args = arguments(&registry, &[("batch_size", Value::Int(-1))]);

        let Err(ConstructError::InvalidArgument { name, source }) = args.take::<u32>("batch_size") else {
            panic!("expected an invalid argument");
        };
        assert_eq!(name, "batch_size");
        assert_eq!(source.found, "-1");
    }

    #[test]
    fn remaining_arguments_become_a_mapping() {
        let registry = TypeRegistry::new();
        let mut args = arguments(&registry, &[("lr", Value::Float(0.1)), ("amsgrad", Value::Bool(true))]);

        let _ = args.take::<f64>("lr");
        let rest = args.take_remaining().unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest.get("amsgrad"), Some(&Value::Bool(true)));
        assert_eq!(args.len(), 0);
    }
}
