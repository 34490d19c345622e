use alloc::rc::{Rc, Weak};
use core::cell::RefCell;
use core::fmt;

use crate::object::Configurable;
use crate::path::DynamicTypePath;

/// A non-owning reference to another object in the graph, used to close cycles.
///
/// A child pointing back at its parent cannot hold an `Rc` without leaking
/// the cycle, and cannot receive a strong reference while decoding either:
/// the parent is constructed only after all of its children. A `BackRef`
/// is a shared weak cell instead. When the decoder meets a reference to an
/// object that is still under construction, it hands out an empty
/// `BackRef` and fills every clone of it once the target exists.
///
/// ```
/// use std::rc::Rc;
/// use cg_graph::object::{Attr, BackRef, Configurable};
/// # use cg_graph::path::TypePath;
/// # struct Trainer;
/// # impl TypePath for Trainer {
/// #     fn type_path() -> &'static str { "demo::Trainer" }
/// #     fn type_name() -> &'static str { "Trainer" }
/// # }
/// # impl Configurable for Trainer {
/// #     fn parameters(&self) -> &'static [&'static str] { &[] }
/// #     fn attribute(&self, _: &str) -> Option<Attr> { None }
/// # }
///
/// let trainer = Rc::new(Trainer);
/// let back = BackRef::new(&trainer);
/// assert!(back.upgrade_as::<Trainer>().is_some());
///
/// drop(trainer);
/// assert!(back.upgrade().is_none());
/// ```
#[derive(Clone, Default)]
pub struct BackRef {
    cell: Rc<RefCell<Option<Weak<dyn Configurable>>>>,
}

impl BackRef {
    /// Creates a reference to `target`.
    pub fn new<T: Configurable>(target: &Rc<T>) -> Self {
        let target: Rc<dyn Configurable> = target.clone();
        Self::from_dyn(&target)
    }

    pub fn from_dyn(target: &Rc<dyn Configurable>) -> Self {
        Self {
            cell: Rc::new(RefCell::new(Some(Rc::downgrade(target)))),
        }
    }

    /// Creates an unset reference.
    #[inline]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Points this reference, and every clone of it, at `target`.
    pub fn set(&self, target: &Rc<dyn Configurable>) {
        *self.cell.borrow_mut() = Some(Rc::downgrade(target));
    }

    /// Whether a target has been set, alive or not.
    #[inline]
    pub fn is_set(&self) -> bool {
        self.cell.borrow().is_some()
    }

    pub fn upgrade(&self) -> Option<Rc<dyn Configurable>> {
        self.cell.borrow().as_ref().and_then(Weak::upgrade)
    }

    pub fn upgrade_as<T: Configurable>(&self) -> Option<Rc<T>> {
        self.upgrade()?.downcast_rc::<T>().ok()
    }
}

impl fmt::Debug for BackRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(target) => f
                .debug_tuple("BackRef")
                .field(&target.reflect_type_path())
                .finish(),
            None if self.is_set() => f.write_str("BackRef(<dropped>)"),
            None => f.write_str("BackRef(<unset>)"),
        }
    }
}
