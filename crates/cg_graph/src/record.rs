//! Tagged records, the document form of one object.
//!
//! A record is a [`Mapping`] whose first two entries are the type tag
//! (`class`) and the identity tag (`_id`):
//!
//! ```yaml
//! class: my_crate::agent::Agent
//! _id: 1
//! gamma: 0.99
//! policy:
//!   class: my_crate::model::Mlp
//!   _id: 2
//!   hidden_layers: [256, 256]
//! ```
//!
//! A record holding only the two tags is a *stub*: a reference to an object
//! written out earlier in the same document.

use alloc::string::String;
use core::fmt;

use crate::error::MalformedKind;
use crate::value::{Mapping, Value};

/// Document key holding the type tag.
pub const TYPE_TAG_KEY: &str = "class";

/// Document key holding the identity tag.
pub const IDENTITY_TAG_KEY: &str = "_id";

/// The tag key equal to `key`, if `key` cannot be used as an attribute name.
///
/// ```
/// use cg_graph::record::reserved_key;
///
/// assert_eq!(reserved_key("_id"), Some("_id"));
/// assert_eq!(reserved_key("classes"), None);
/// ```
pub fn reserved_key(key: &str) -> Option<&'static str> {
    [TYPE_TAG_KEY, IDENTITY_TAG_KEY].into_iter().find(|tag| *tag == key)
}

// -----------------------------------------------------------------------------
// IdentityTag

/// An opaque per-object identifier, stable within one conversion pass.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentityTag(i64);

impl IdentityTag {
    #[inline]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for IdentityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

// -----------------------------------------------------------------------------
// ConfigRecord

/// The tagged document representation of one object.
#[derive(Clone, Debug, PartialEq)]
pub struct ConfigRecord {
    pub type_tag: String,
    pub identity: IdentityTag,
    pub attributes: Mapping,
}

/// The result of [`ConfigRecord::classify`].
#[derive(Debug)]
pub enum RecordShape {
    /// A mapping without tags, passed through unchanged.
    Plain(Mapping),
    Record(ConfigRecord),
}

impl ConfigRecord {
    /// Creates a record without attributes.
    #[inline]
    pub fn new(type_tag: impl Into<String>, identity: IdentityTag) -> Self {
        Self {
            type_tag: type_tag.into(),
            identity,
            attributes: Mapping::default(),
        }
    }

    /// Whether this record only references an object written elsewhere.
    #[inline]
    pub fn is_stub(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Converts the record into a document mapping, tags first.
    pub fn into_value(self) -> Value {
        let mut map = Mapping::with_capacity_and_hasher(self.attributes.len() + 2, Default::default());
        map.insert(TYPE_TAG_KEY.into(), Value::String(self.type_tag));
        map.insert(IDENTITY_TAG_KEY.into(), Value::Int(self.identity.get()));
        map.extend(self.attributes);
        Value::Map(map)
    }

    /// Returns `true` if `map` carries either tag key.
    #[inline]
    pub fn has_tags(map: &Mapping) -> bool {
        map.contains_key(TYPE_TAG_KEY) || map.contains_key(IDENTITY_TAG_KEY)
    }

    /// Splits a document mapping into a record or a plain mapping.
    ///
    /// A mapping with neither tag is plain. A mapping with exactly one tag,
    /// or with tags of the wrong kind, is malformed.
    ///
    /// ```
    /// use cg_graph::record::{ConfigRecord, RecordShape};
    /// use cg_graph::value::{Mapping, Value};
    ///
    /// let mut map = Mapping::default();
    /// map.insert("class".into(), "demo::Mlp".into());
    /// map.insert("_id".into(), 3.into());
    /// map.insert("dropout".into(), 0.1.into());
    ///
    /// let RecordShape::Record(record) = ConfigRecord::classify(map).unwrap() else {
    ///     panic!("expected a record");
    /// };
    /// assert_eq!(record.type_tag, "demo::Mlp");
    /// assert_eq!(record.identity.get(), 3);
    /// assert_eq!(record.attributes.len(), 1);
    /// ```
    pub fn classify(mut map: Mapping) -> Result<RecordShape, MalformedKind> {
        let has_type = map.contains_key(TYPE_TAG_KEY);
        let has_identity = map.contains_key(IDENTITY_TAG_KEY);
        match (has_type, has_identity) {
            (false, false) => return Ok(RecordShape::Plain(map)),
            (true, false) => return Err(MalformedKind::MissingTag { key: IDENTITY_TAG_KEY }),
            (false, true) => return Err(MalformedKind::MissingTag { key: TYPE_TAG_KEY }),
            (true, true) => {}
        }

        let type_tag = match map.shift_remove(TYPE_TAG_KEY) {
            Some(Value::String(tag)) => tag,
            other => {
                return Err(MalformedKind::InvalidTag {
                    key: TYPE_TAG_KEY,
                    found: other.as_ref().map_or("nothing", Value::kind_name),
                });
            }
        };
        let identity = match map.shift_remove(IDENTITY_TAG_KEY) {
            Some(Value::Int(id)) => IdentityTag::new(id),
            other => {
                return Err(MalformedKind::InvalidTag {
                    key: IDENTITY_TAG_KEY,
                    found: other.as_ref().map_or("nothing", Value::kind_name),
                });
            }
        };

        Ok(RecordShape::Record(ConfigRecord {
            type_tag,
            identity,
            attributes: map,
        }))
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{ConfigRecord, IdentityTag, RecordShape};
    use crate::error::MalformedKind;
    use crate::value::{Mapping, Value};

    #[test]
    fn tags_come_first() {
        let mut record = ConfigRecord::new("demo::Adam", IdentityTag::new(4));
        record.attributes.insert("lr".into(), Value::Float(1e-3));

        let value = record.into_value();
        let keys: alloc::vec::Vec<&str> = value.as_map().unwrap().keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, ["class", "_id", "lr"]);
    }

    #[test]
    fn plain_mapping_passes() {
        let mut map = Mapping::default();
        map.insert("gamma".into(), Value::Float(0.99));
        assert!(matches!(ConfigRecord::classify(map), Ok(RecordShape::Plain(m)) if m.len() == 1));
    }

    #[test]
    fn one_tag_is_malformed() {
        let mut map = Mapping::default();
        map.insert("class".into(), "demo::Adam".into());
        assert!(matches!(
            ConfigRecord::classify(map),
            Err(MalformedKind::MissingTag { key: "_id" })
        ));
    }

    #[test]
    fn mistyped_identity_is_malformed() {
        let mut map = Mapping::default();
        map.insert("class".into(), "demo::Adam".into());
        map.insert("_id".into(), "seven".into());
        assert!(matches!(
            ConfigRecord::classify(map),
            Err(MalformedKind::InvalidTag { key: "_id", found: "string" })
        ));
    }

    #[test]
    fn stub_has_no_attributes() {
        let record = ConfigRecord::new("demo::Mlp", IdentityTag::new(2));
        assert!(record.is_stub());
        assert_eq!(record.into_value().as_map().map(Mapping::len), Some(2));
    }
}
