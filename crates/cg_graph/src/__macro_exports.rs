//! Items used by `#[derive(Configurable)]` output.
//!
//! Not public API.

#[cfg(feature = "auto_register")]
pub mod auto_register {
    pub use inventory;

    use crate::object::Construct;
    use crate::registry::TypeRegistry;

    /// A registration function submitted by a derived type.
    pub struct __AutoRegisterFunc(pub fn(&mut TypeRegistry));

    inventory::collect!(__AutoRegisterFunc);

    #[inline]
    pub fn __register<T: Construct>(registry: &mut TypeRegistry) {
        registry.register::<T>();
    }

    /// Runs every submitted registration function.
    pub fn __register_types(registry: &mut TypeRegistry) {
        for func in inventory::iter::<__AutoRegisterFunc> {
            (func.0)(registry);
        }
    }
}
