use crate::value::Value;

/// An enumeration whose members are written as their underlying scalar.
///
/// Implemented with [`impl_config_enum!`](crate::impl_config_enum), which
/// also provides [`ToAttr`](crate::object::ToAttr) and
/// [`FromArgument`](crate::object::FromArgument).
pub trait ConfigEnum: Sized + 'static {
    /// The scalar written for this member.
    fn to_scalar(&self) -> Value;

    /// The member written as `value`, if any.
    fn from_scalar(value: &Value) -> Option<Self>;
}

/// Implements [`ConfigEnum`] for a fieldless enum by listing each member's
/// scalar.
///
/// ```
/// use cg_graph::impl_config_enum;
/// use cg_graph::object::{Attr, ConfigEnum, ToAttr};
/// use cg_graph::value::Value;
///
/// #[derive(Debug, PartialEq)]
/// enum Activation {
///     Relu,
///     Tanh,
/// }
///
/// impl_config_enum!(Activation {
///     Relu => "relu",
///     Tanh => "tanh",
/// });
///
/// assert!(matches!(Activation::Tanh.to_attr(), Attr::Enum(Value::String(s)) if s == "tanh"));
/// assert_eq!(Activation::from_scalar(&Value::from("relu")), Some(Activation::Relu));
/// ```
#[macro_export]
macro_rules! impl_config_enum {
    ($ty:ty { $($variant:ident => $scalar:expr),+ $(,)? }) => {
        impl $crate::object::ConfigEnum for $ty {
            fn to_scalar(&self) -> $crate::value::Value {
                match self {
                    $(Self::$variant => $crate::value::Value::from($scalar),)+
                }
            }

            fn from_scalar(value: &$crate::value::Value) -> ::core::option::Option<Self> {
                $(
                    if *value == $crate::value::Value::from($scalar) {
                        return ::core::option::Option::Some(Self::$variant);
                    }
                )+
                ::core::option::Option::None
            }
        }

        impl $crate::object::ToAttr for $ty {
            #[inline]
            fn to_attr(&self) -> $crate::object::Attr {
                $crate::object::Attr::Enum($crate::object::ConfigEnum::to_scalar(self))
            }
        }

        impl $crate::object::FromArgument for $ty {
            fn from_argument(
                value: $crate::object::Decoded,
            ) -> ::core::result::Result<Self, $crate::object::ArgumentMismatch> {
                match &value {
                    $crate::object::Decoded::Value(scalar) => {
                        <Self as $crate::object::ConfigEnum>::from_scalar(scalar).ok_or_else(|| {
                            $crate::object::ArgumentMismatch::new(
                                ::core::any::type_name::<Self>(),
                                scalar.kind_name(),
                            )
                        })
                    }
                    other => ::core::result::Result::Err($crate::object::ArgumentMismatch::new(
                        ::core::any::type_name::<Self>(),
                        other.kind_name(),
                    )),
                }
            }
        }
    };
}
