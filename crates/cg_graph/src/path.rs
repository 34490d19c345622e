//! Type paths, the type tags of config records.

// -----------------------------------------------------------------------------
// TypePath

/// A static accessor to type paths and names.
///
/// The type path is what a record stores as its type tag and what the
/// [`TypeRegistry`] resolves back to a constructor, so it must be unique
/// among registered types and should stay stable across releases.
///
/// # Methods
///
/// - [`type_path`]: The unique identifier of the type, e.g. `my_crate::optim::Adam`.
/// - [`type_name`]: Type name without module path, may be duplicated.
/// - [`module_path`]: Optional module path, the *container* of the type.
///
/// These names never start with `::`.
///
/// # Implementation
///
/// [`#[derive(Configurable)]`](crate::derive::Configurable) implements it from
/// `module_path!()`, or from an explicit `#[config(type_path = "...")]`,
/// which keeps documents loadable after the definition moves.
///
/// Manual implementations are short:
///
/// ```
/// use cg_graph::path::TypePath;
///
/// struct CartPole;
///
/// impl TypePath for CartPole {
///     fn type_path() -> &'static str { "envs::classic::CartPole" }
///     fn type_name() -> &'static str { "CartPole" }
///     fn module_path() -> Option<&'static str> { Some("envs::classic") }
/// }
/// ```
///
/// [`TypeRegistry`]: crate::registry::TypeRegistry
/// [`type_path`]: TypePath::type_path
/// [`type_name`]: TypePath::type_name
/// [`module_path`]: TypePath::module_path
pub trait TypePath: 'static {
    /// Returns the fully qualified path of the type.
    fn type_path() -> &'static str;

    /// Returns the bare name of the type.
    fn type_name() -> &'static str;

    /// Optional module path where the type is defined.
    fn module_path() -> Option<&'static str> {
        None
    }
}

// -----------------------------------------------------------------------------
// DynamicTypePath

/// Provide dynamic dispatch for types that implement [`TypePath`].
///
/// Auto impl for all types that implemented [`TypePath`].
pub trait DynamicTypePath {
    /// See [`TypePath::type_path`].
    fn reflect_type_path(&self) -> &'static str;

    /// See [`TypePath::type_name`].
    fn reflect_type_name(&self) -> &'static str;

    /// See [`TypePath::module_path`].
    fn reflect_module_path(&self) -> Option<&'static str>;
}

impl<T: TypePath> DynamicTypePath for T {
    #[inline]
    fn reflect_type_path(&self) -> &'static str {
        Self::type_path()
    }

    #[inline]
    fn reflect_type_name(&self) -> &'static str {
        Self::type_name()
    }

    #[inline]
    fn reflect_module_path(&self) -> Option<&'static str> {
        Self::module_path()
    }
}

// -----------------------------------------------------------------------------
// Splitting

/// Separator between path segments.
pub const PATH_SEPARATOR: &str = "::";

/// Splits a type path into its container path and bare type name.
///
/// Returns `None` when either side would be empty.
///
/// ```
/// use cg_graph::path::split_type_path;
///
/// assert_eq!(split_type_path("rl::optim::Adam"), Some(("rl::optim", "Adam")));
/// assert_eq!(split_type_path("Adam"), None);
/// assert_eq!(split_type_path("rl::optim::"), None);
/// ```
pub fn split_type_path(path: &str) -> Option<(&str, &str)> {
    path.rsplit_once(PATH_SEPARATOR)
        .filter(|(container, name)| !container.is_empty() && !name.is_empty())
}
