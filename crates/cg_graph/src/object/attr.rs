use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::num::{NonZeroI32, NonZeroI64, NonZeroU8, NonZeroU16, NonZeroU32, NonZeroU64, NonZeroUsize};

use crate::object::{BackRef, Configurable, Device, Environment, NumericArray};
use crate::path::DynamicTypePath;
use crate::value::{Mapping, Value};

// -----------------------------------------------------------------------------
// Attr

/// The closed set of attribute value kinds the encoder understands.
///
/// Every variant except [`Attr::Foreign`] has a document form:
///
/// | variant       | document form                                  |
/// |---------------|------------------------------------------------|
/// | `Value`       | itself                                         |
/// | `Device`      | its string form, e.g. `"cuda:0"`               |
/// | `Enum`        | the member's underlying scalar                 |
/// | `Array`       | nested sequences following the array's shape   |
/// | `Environment` | the environment's type path                    |
/// | `Seq`         | element-wise conversion                        |
/// | `Object`      | a nested record (or a stub if seen before)     |
///
/// `Foreign` marks a value with type identity but no conversion rule and
/// aborts the encode with
/// [`ConvertError::UnsupportedValueKind`](crate::ConvertError::UnsupportedValueKind).
#[derive(Debug, Clone)]
pub enum Attr {
    Value(Value),
    Device(Device),
    Enum(Value),
    Array(NumericArray),
    Environment(&'static str),
    Seq(Vec<Attr>),
    Object(Rc<dyn Configurable>),
    Foreign(Cow<'static, str>),
}

impl Attr {
    /// An attribute of foreign type `T`.
    #[inline]
    pub fn foreign<T: ?Sized>() -> Self {
        Attr::Foreign(Cow::Borrowed(core::any::type_name::<T>()))
    }

    #[inline]
    pub fn object<T: Configurable>(object: &Rc<T>) -> Self {
        Attr::Object(object.clone())
    }
}

impl From<Value> for Attr {
    #[inline]
    fn from(value: Value) -> Self {
        Attr::Value(value)
    }
}

// -----------------------------------------------------------------------------
// ToAttr

/// Reads a field as an [`Attr`].
pub trait ToAttr {
    fn to_attr(&self) -> Attr;
}

impl<T: ToAttr + ?Sized> ToAttr for &T {
    #[inline]
    fn to_attr(&self) -> Attr {
        (**self).to_attr()
    }
}

macro_rules! impl_to_attr_lossless {
    ($($ty:ty),*) => {
        $(
            impl ToAttr for $ty {
                #[inline]
                fn to_attr(&self) -> Attr {
                    Attr::Value(Value::from(*self))
                }
            }
        )*
    };
}

impl_to_attr_lossless!(bool, i8, i16, i32, i64, u8, u16, u32, f32, f64);

macro_rules! impl_to_attr_wide {
    ($($ty:ty),*) => {
        $(
            impl ToAttr for $ty {
                fn to_attr(&self) -> Attr {
                    match i64::try_from(*self) {
                        Ok(v) => Attr::Value(Value::Int(v)),
                        Err(_) => Attr::foreign::<$ty>(),
                    }
                }
            }
        )*
    };
}

impl_to_attr_wide!(u64, usize, isize, i128, u128);

macro_rules! impl_to_attr_non_zero {
    ($($ty:ty),*) => {
        $(
            impl ToAttr for $ty {
                #[inline]
                fn to_attr(&self) -> Attr {
                    self.get().to_attr()
                }
            }
        )*
    };
}

impl_to_attr_non_zero!(NonZeroU8, NonZeroU16, NonZeroU32, NonZeroU64, NonZeroUsize, NonZeroI32, NonZeroI64);

impl ToAttr for str {
    #[inline]
    fn to_attr(&self) -> Attr {
        Attr::Value(Value::from(self))
    }
}

impl ToAttr for String {
    #[inline]
    fn to_attr(&self) -> Attr {
        self.as_str().to_attr()
    }
}

impl ToAttr for Cow<'static, str> {
    #[inline]
    fn to_attr(&self) -> Attr {
        self.as_ref().to_attr()
    }
}

impl ToAttr for Value {
    #[inline]
    fn to_attr(&self) -> Attr {
        Attr::Value(self.clone())
    }
}

impl ToAttr for Mapping {
    #[inline]
    fn to_attr(&self) -> Attr {
        Attr::Value(Value::Map(self.clone()))
    }
}

impl<T: ToAttr> ToAttr for Option<T> {
    fn to_attr(&self) -> Attr {
        match self {
            Some(value) => value.to_attr(),
            None => Attr::Value(Value::Null),
        }
    }
}

impl<T: ToAttr> ToAttr for [T] {
    fn to_attr(&self) -> Attr {
        Attr::Seq(self.iter().map(ToAttr::to_attr).collect())
    }
}

impl<T: ToAttr, const N: usize> ToAttr for [T; N] {
    #[inline]
    fn to_attr(&self) -> Attr {
        self.as_slice().to_attr()
    }
}

impl<T: ToAttr> ToAttr for Vec<T> {
    #[inline]
    fn to_attr(&self) -> Attr {
        self.as_slice().to_attr()
    }
}

impl<T: Configurable> ToAttr for Rc<T> {
    #[inline]
    fn to_attr(&self) -> Attr {
        Attr::Object(self.clone())
    }
}

impl ToAttr for Rc<dyn Configurable> {
    #[inline]
    fn to_attr(&self) -> Attr {
        Attr::Object(self.clone())
    }
}

impl ToAttr for Rc<dyn Environment> {
    #[inline]
    fn to_attr(&self) -> Attr {
        Attr::Environment(self.reflect_type_path())
    }
}

impl ToAttr for Box<dyn Environment> {
    #[inline]
    fn to_attr(&self) -> Attr {
        Attr::Environment(self.reflect_type_path())
    }
}

impl ToAttr for BackRef {
    /// A live target is an object reference; a dropped or unset one is null.
    fn to_attr(&self) -> Attr {
        match self.upgrade() {
            Some(target) => Attr::Object(target),
            None => Attr::Value(Value::Null),
        }
    }
}

impl ToAttr for Device {
    #[inline]
    fn to_attr(&self) -> Attr {
        Attr::Device(*self)
    }
}

impl ToAttr for NumericArray {
    #[inline]
    fn to_attr(&self) -> Attr {
        Attr::Array(self.clone())
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::vec;
    use core::num::NonZeroU32;

    use super::{Attr, ToAttr};
    use crate::value::Value;

    #[test]
    fn integral_wrappers_become_plain_integers() {
        assert!(matches!(7u8.to_attr(), Attr::Value(Value::Int(7))));
        assert!(matches!(NonZeroU32::new(9).unwrap().to_attr(), Attr::Value(Value::Int(9))));
        assert!(matches!(42usize.to_attr(), Attr::Value(Value::Int(42))));
    }

    #[test]
    fn out_of_range_integer_is_foreign() {
        let Attr::Foreign(path) = u64::MAX.to_attr() else {
            panic!("expected a foreign attribute");
        };
        assert_eq!(path, "u64");
    }

    #[test]
    fn options_and_sequences() {
        assert!(matches!(None::<String>.to_attr(), Attr::Value(Value::Null)));
        let Attr::Seq(items) = vec![1.5f64, 2.5].to_attr() else {
            panic!("expected a sequence");
        };
        assert_eq!(items.len(), 2);
        assert!(matches!(items[1], Attr::Value(Value::Float(v)) if v == 2.5));
    }
}
