use alloc::rc::Rc;
use alloc::string::ToString;

use crate::TypeResolutionError;
use crate::hash::HashMap;
use crate::object::{Construct, Environment};
use crate::path::{TypePath, split_type_path};
use crate::registry::{EnvironmentEntry, TypeEntry};

// -----------------------------------------------------------------------------
// TypeRegistry

/// The lookup table from type tags to constructors.
///
/// Types are grouped by *container*, the part of the type path before the
/// last `::`, and looked up by their bare name inside it. Resolution fails
/// distinctly when the container is unknown and when the name is unknown
/// within a known container.
///
/// Environments live in a separate flat table keyed by their full type path.
///
/// # Example
///
/// ```
/// use cg_graph::TypeResolutionError;
/// use cg_graph::registry::TypeRegistry;
///
/// let registry = TypeRegistry::new();
/// assert_eq!(
///     registry.resolve("nn::Missing").unwrap_err(),
///     TypeResolutionError::ContainerNotFound { container: "nn".into() },
/// );
/// assert!(matches!(
///     registry.resolve("Missing"),
///     Err(TypeResolutionError::InvalidTypeTag(_)),
/// ));
/// ```
#[derive(Debug)]
pub struct TypeRegistry {
    containers: HashMap<&'static str, HashMap<&'static str, TypeEntry>>,
    environments: HashMap<&'static str, EnvironmentEntry>,
    len: usize,
    #[cfg_attr(not(feature = "auto_register"), allow(dead_code))]
    auto_registered: bool,
}

impl Default for TypeRegistry {
    /// See [`TypeRegistry::new`] .
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Create an empty [`TypeRegistry`].
    #[inline]
    pub const fn empty() -> Self {
        Self {
            containers: HashMap::with_hasher(crate::hash::FixedHashState),
            environments: HashMap::with_hasher(crate::hash::FixedHashState),
            len: 0,
            auto_registered: false,
        }
    }

    /// Create a registry holding every auto-registered type.
    ///
    /// Equivalent to [`empty`](Self::empty) followed by
    /// [`auto_register`](Self::auto_register).
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.auto_register();
        registry
    }

    /// Attempts to register `T`.
    ///
    /// Returns `false` if a type with the same path was already registered,
    /// or if the path has no container part. The existing entry is kept.
    #[inline]
    pub fn register<T: Construct>(&mut self) -> bool {
        self.insert(TypeEntry::of::<T>())
    }

    /// Attempts to add `entry`, see [`register`](Self::register).
    pub fn insert(&mut self, entry: TypeEntry) -> bool {
        let Some((container, name)) = split_type_path(entry.type_path()) else {
            log::warn!(
                "`{}` has no container part and cannot be registered",
                entry.type_path()
            );
            return false;
        };

        let types = self.containers.entry(container).or_default();
        if types.contains_key(name) {
            return false;
        }
        types.insert(name, entry);
        self.len += 1;
        true
    }

    /// Registers an environment, created through [`Default`] when decoded.
    pub fn register_environment<E: Environment + TypePath + Default>(&mut self) -> bool {
        let entry = EnvironmentEntry::of::<E>();
        if self.environments.contains_key(entry.type_path()) {
            return false;
        }
        self.environments.insert(entry.type_path(), entry);
        true
    }

    /// Whether `type_path` resolves.
    #[inline]
    pub fn contains(&self, type_path: &str) -> bool {
        self.get(type_path).is_some()
    }

    pub fn get(&self, type_path: &str) -> Option<&TypeEntry> {
        let (container, name) = split_type_path(type_path)?;
        self.containers.get(container)?.get(name)
    }

    /// Resolves a type tag to its entry.
    pub fn resolve(&self, type_tag: &str) -> Result<&TypeEntry, TypeResolutionError> {
        let Some((container, name)) = split_type_path(type_tag) else {
            return Err(TypeResolutionError::InvalidTypeTag(type_tag.to_string()));
        };
        let Some(types) = self.containers.get(container) else {
            return Err(TypeResolutionError::ContainerNotFound {
                container: container.to_string(),
            });
        };
        types.get(name).ok_or_else(|| TypeResolutionError::TypeNotFound {
            container: container.to_string(),
            name: name.to_string(),
        })
    }

    /// Creates the environment registered under `type_path`.
    pub fn create_environment(&self, type_path: &str) -> Result<Rc<dyn Environment>, TypeResolutionError> {
        self.environments
            .get(type_path)
            .map(EnvironmentEntry::create)
            .ok_or_else(|| TypeResolutionError::EnvironmentNotFound(type_path.to_string()))
    }

    /// Number of registered types, environments excluded.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterates over all registered types, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &TypeEntry> {
        self.containers.values().flat_map(|types| types.values())
    }

    /// Automatically registers all types derived with `#[config(auto_register)]`.
    ///
    /// Repeated calls are cheap and will not insert duplicates.
    ///
    /// ## Return Value
    ///
    /// Returns `true` if the `auto_register` feature is enabled. When
    /// disabled, it does nothing and returns `false`.
    ///
    /// ## Platform Support
    ///
    /// Supported platforms include Linux, macOS, Windows, iOS, Android, and
    /// Web, enabled by the `inventory` crate. On unsupported platforms
    /// nothing is collected.
    #[cfg_attr(not(feature = "auto_register"), inline(always))]
    pub fn auto_register(&mut self) -> bool {
        #[cfg(feature = "auto_register")]
        {
            if !self.auto_registered {
                crate::__macro_exports::auto_register::__register_types(self);
                self.auto_registered = true;
            }
            true
        }
        #[cfg(not(feature = "auto_register"))]
        {
            false
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
