//! Identity side tables, one per conversion pass.
//!
//! Identity is never derived from equality. On the encode side an object is
//! identified by the address of its data together with its concrete type,
//! and every object seen during the pass is pinned so that its address
//! cannot be handed to another object before the pass ends. Identity tags
//! are assigned from a counter starting at 1, in visiting order.
//!
//! On the decode side identity tags come from the document and map to the
//! live objects built for them.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::any::{Any, TypeId};

use crate::hash::HashMap;
use crate::object::{BackRef, Configurable};
use crate::record::IdentityTag;

// -----------------------------------------------------------------------------
// EncodeRegistry

type ObjectKey = (usize, TypeId);

fn object_key(object: &dyn Configurable) -> ObjectKey {
    let any: &dyn Any = object;
    let addr = core::ptr::from_ref(object).cast::<()>() as usize;
    (addr, any.type_id())
}

/// Identities assigned while encoding.
#[derive(Default)]
pub(crate) struct EncodeRegistry {
    tags: HashMap<ObjectKey, IdentityTag>,
    pins: Vec<Rc<dyn Configurable>>,
    next: i64,
}

impl EncodeRegistry {
    pub(crate) fn new() -> Self {
        Self {
            next: 1,
            ..Self::default()
        }
    }

    /// The tag already assigned to `object`, if it was visited before.
    pub(crate) fn lookup(&self, object: &dyn Configurable) -> Option<IdentityTag> {
        self.tags.get(&object_key(object)).copied()
    }

    /// Assigns the next tag to a first-visited object.
    ///
    /// `pin` keeps a shared object alive until the pass ends.
    pub(crate) fn assign(&mut self, object: &dyn Configurable, pin: Option<Rc<dyn Configurable>>) -> IdentityTag {
        let tag = IdentityTag::new(self.next);
        self.next += 1;
        self.tags.insert(object_key(object), tag);
        self.pins.extend(pin);
        tag
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.tags.len()
    }
}

// -----------------------------------------------------------------------------
// ObjectRegistry

/// The live objects of one decode pass, by identity tag.
///
/// [`config_to_object`](crate::config_to_object) uses a fresh registry
/// unless one is passed in. Passing one in continues a partially known
/// graph: pre-inserted objects are returned for their tags instead of
/// being constructed.
///
/// ```
/// use cg_graph::identity::ObjectRegistry;
///
/// let objects = ObjectRegistry::new();
/// assert!(objects.is_empty());
/// ```
#[derive(Default)]
pub struct ObjectRegistry {
    objects: HashMap<IdentityTag, Rc<dyn Configurable>>,
    in_progress: HashMap<IdentityTag, Option<BackRef>>,
}

impl ObjectRegistry {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a pre-existing object under `tag`, returning the one it replaced.
    pub fn insert(&mut self, tag: IdentityTag, object: Rc<dyn Configurable>) -> Option<Rc<dyn Configurable>> {
        self.objects.insert(tag, object)
    }

    pub fn get(&self, tag: IdentityTag) -> Option<&Rc<dyn Configurable>> {
        self.objects.get(&tag)
    }

    #[inline]
    pub fn contains(&self, tag: IdentityTag) -> bool {
        self.objects.contains_key(&tag)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Iterates over all registered objects, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (IdentityTag, &Rc<dyn Configurable>)> {
        self.objects.iter().map(|(tag, object)| (*tag, object))
    }

    /// Marks `tag` as under construction.
    pub(crate) fn begin(&mut self, tag: IdentityTag) {
        self.in_progress.insert(tag, None);
    }

    #[inline]
    pub(crate) fn is_in_progress(&self, tag: IdentityTag) -> bool {
        self.in_progress.contains_key(&tag)
    }

    /// A reference to the object under construction for `tag`, filled in
    /// by [`finish`](Self::finish).
    pub(crate) fn pending_ref(&mut self, tag: IdentityTag) -> BackRef {
        self.in_progress
            .entry(tag)
            .or_default()
            .get_or_insert_with(BackRef::empty)
            .clone()
    }

    /// Registers the constructed object and resolves its pending references.
    pub(crate) fn finish(&mut self, tag: IdentityTag, object: &Rc<dyn Configurable>) {
        if let Some(Some(pending)) = self.in_progress.remove(&tag) {
            pending.set(object);
        }
        self.objects.insert(tag, object.clone());
    }

    /// Forgets everything under construction after a failed pass.
    pub(crate) fn abandon(&mut self) {
        self.in_progress.clear();
    }
}

impl core::fmt::Debug for ObjectRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.objects.iter()).finish()
    }
}

// -----------------------------------------------------------------------------
// Tests
