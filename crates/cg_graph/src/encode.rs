use alloc::rc::Rc;
use alloc::string::ToString;
use alloc::vec::Vec;

use crate::identity::EncodeRegistry;
use crate::object::{Attr, Configurable, OPTIMIZER_PARAMS_KEY, ObjectFamily};
use crate::path::DynamicTypePath;
use crate::error::MalformedKind;
use crate::record::{ConfigRecord, reserved_key};
use crate::value::Value;
use crate::{ConvertError, DEFAULT_MAX_DEPTH};

// -----------------------------------------------------------------------------
// EncodeOptions

/// Settings of an [`Encoder`].
#[derive(Clone, Debug)]
pub struct EncodeOptions {
    /// Nesting depth at which encoding fails with
    /// [`ConvertError::DepthExceeded`].
    pub max_depth: usize,
}

impl Default for EncodeOptions {
    #[inline]
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

// -----------------------------------------------------------------------------
// Encoder

/// Turns an object graph into a config document.
///
/// Each call walks the graph depth-first with a fresh identity table, so
/// identities never leak between calls. The first visit of an object writes
/// a full record; every later reference to the same instance, including a
/// reference back to an ancestor, writes a stub holding only the two tags.
///
/// ```
/// use std::rc::Rc;
/// use cg_graph::derive::Configurable;
/// use cg_graph::value::Value;
/// use cg_graph::object_to_config;
///
/// #[derive(Configurable)]
/// #[config(type_path = "demo::Leaf")]
/// struct Leaf {
///     y: i64,
/// }
///
/// #[derive(Configurable)]
/// #[config(type_path = "demo::Pair")]
/// struct Pair {
///     b1: Rc<Leaf>,
///     b2: Rc<Leaf>,
/// }
///
/// let leaf = Rc::new(Leaf { y: 2 });
/// let pair = Pair { b1: leaf.clone(), b2: leaf };
///
/// let document = object_to_config(&pair).unwrap();
/// let b1 = document.get("b1").unwrap();
/// let b2 = document.get("b2").unwrap();
/// assert_eq!(b1.get("_id"), b2.get("_id"));
/// assert_eq!(b1.get("y"), Some(&Value::Int(2)));
/// assert_eq!(b2.get("y"), None);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Encoder {
    options: EncodeOptions,
}

impl Encoder {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_options(options: EncodeOptions) -> Self {
        Self { options }
    }

    #[inline]
    pub fn options(&self) -> &EncodeOptions {
        &self.options
    }

    /// Encodes `root` and everything reachable from it.
    pub fn encode(&self, root: &dyn Configurable) -> Result<Value, ConvertError> {
        let mut pass = EncodePass {
            registry: EncodeRegistry::new(),
            max_depth: self.options.max_depth,
        };
        let document = pass.encode_object(root, None, 0)?;
        log::debug!(
            "encoded `{}` with {} distinct objects",
            root.reflect_type_path(),
            pass.registry.len()
        );
        Ok(document)
    }
}

/// Encodes `root` with the default [`Encoder`].
#[inline]
pub fn object_to_config(root: &dyn Configurable) -> Result<Value, ConvertError> {
    Encoder::new().encode(root)
}

// -----------------------------------------------------------------------------
// EncodePass

struct EncodePass {
    registry: EncodeRegistry,
    max_depth: usize,
}

impl EncodePass {
    fn check_depth(&self, depth: usize) -> Result<(), ConvertError> {
        if depth > self.max_depth {
            return Err(ConvertError::DepthExceeded {
                limit: self.max_depth,
            });
        }
        Ok(())
    }

    fn encode_object(
        &mut self,
        object: &dyn Configurable,
        pin: Option<Rc<dyn Configurable>>,
        depth: usize,
    ) -> Result<Value, ConvertError> {
        self.check_depth(depth)?;
        let type_path = object.reflect_type_path();

        if let Some(identity) = self.registry.lookup(object) {
            return Ok(ConfigRecord::new(type_path, identity).into_value());
        }

        let parameters = object.parameters();
        if let Some(key) = parameters.iter().find_map(|name| reserved_key(name)) {
            return Err(MalformedKind::ReservedKey { key }.into());
        }

        // Marked before the attributes are read, so references back to
        // this object terminate as stubs.
        let identity = self.registry.assign(object, pin);
        let mut record = ConfigRecord::new(type_path, identity);
        let optimizer = object.family() == ObjectFamily::Optimizer;

        if optimizer && let Some(defaults) = object.optimizer_defaults() {
            for (key, value) in defaults {
                if let Some(key) = reserved_key(&key) {
                    return Err(MalformedKind::ReservedKey { key }.into());
                }
                if !parameters.contains(&key.as_str()) {
                    record.attributes.insert(key, value);
                }
            }
        }

        for &name in parameters {
            if optimizer && name == OPTIMIZER_PARAMS_KEY {
                continue;
            }
            let attr = object
                .attribute(name)
                .ok_or(ConvertError::MissingAttribute { type_path, key: name })?;
            let value = self.encode_attr(name, attr, depth)?;
            record.attributes.insert(name.to_string(), value);
        }

        Ok(record.into_value())
    }

    fn encode_attr(&mut self, key: &str, attr: Attr, depth: usize) -> Result<Value, ConvertError> {
        Ok(match attr {
            Attr::Value(value) | Attr::Enum(value) => value,
            Attr::Device(device) => Value::String(device.to_string()),
            Attr::Array(array) => array.to_value(),
            Attr::Environment(type_path) => Value::String(type_path.to_string()),
            Attr::Seq(items) => self.encode_seq(key, items, depth + 1)?,
            Attr::Object(object) => self.encode_object(&*object, Some(object.clone()), depth + 1)?,
            Attr::Foreign(type_path) => {
                return Err(ConvertError::UnsupportedValueKind {
                    key: key.to_string(),
                    type_path,
                });
            }
        })
    }

    fn encode_seq(&mut self, key: &str, items: Vec<Attr>, depth: usize) -> Result<Value, ConvertError> {
        self.check_depth(depth)?;
        let mut encoded = Vec::with_capacity(items.len());
        for item in items {
            if let Attr::Foreign(type_path) = &item {
                log::warn!("dropping element of unsupported kind `{type_path}` from sequence `{key}`");
                continue;
            }
            encoded.push(self.encode_attr(key, item, depth)?);
        }
        Ok(Value::Seq(encoded))
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::vec;
    use alloc::vec::Vec;

    use super::{EncodeOptions, Encoder, object_to_config};
    use crate::fixtures::{self, Adam, Clock, Leaf, Mlp, Pair, Twin};
    use crate::object::{Attr, Configurable, ToAttr};
    use crate::path::TypePath;
    use crate::value::Value;
    use crate::{ConvertError, MalformedKind};

    struct Labeled;

    impl TypePath for Labeled {
        fn type_path() -> &'static str {
            "cg_graph::encode::tests::Labeled"
        }

        fn type_name() -> &'static str {
            "Labeled"
        }
    }

    impl Configurable for Labeled {
        fn parameters(&self) -> &'static [&'static str] {
            &["name", "class"]
        }

        fn attribute(&self, _: &str) -> Option<Attr> {
            Some("label".to_attr())
        }
    }

    fn keys(value: &Value) -> Vec<&str> {
        value.as_map().unwrap().keys().map(|k| k.as_str()).collect()
    }

    #[test]
    fn nested_object_becomes_nested_record() {
        let pair = Pair {
            x: 1,
            b: Rc::new(Leaf { y: 2 }),
        };
        let document = object_to_config(&pair).unwrap();

        assert_eq!(keys(&document), ["class", "_id", "x", "b"]);
        assert_eq!(document.get("class"), Some(&Value::from("cg_graph::fixtures::Pair")));
        assert_eq!(document.get("_id"), Some(&Value::Int(1)));
        assert_eq!(document.get("x"), Some(&Value::Int(1)));

        let b = document.get("b").unwrap();
        assert_eq!(keys(b), ["class", "_id", "y"]);
        assert_eq!(b.get("_id"), Some(&Value::Int(2)));
        assert_eq!(b.get("y"), Some(&Value::Int(2)));
    }

    #[test]
    fn shared_object_is_written_once() {
        let leaf = Rc::new(Leaf { y: 2 });
        let twin = Twin {
            b1: leaf.clone(),
            b2: leaf,
        };
        let document = object_to_config(&twin).unwrap();

        let b1 = document.get("b1").unwrap();
        let b2 = document.get("b2").unwrap();
        assert_eq!(keys(b1), ["class", "_id", "y"]);
        assert_eq!(keys(b2), ["class", "_id"]);
        assert_eq!(b1.get("_id"), b2.get("_id"));
    }

    #[test]
    fn equal_but_distinct_objects_are_not_merged() {
        let twin = Twin {
            b1: Rc::new(Leaf { y: 2 }),
            b2: Rc::new(Leaf { y: 2 }),
        };
        let document = object_to_config(&twin).unwrap();
        assert_ne!(document.get("b1").unwrap().get("_id"), document.get("b2").unwrap().get("_id"));
        assert_eq!(document.get("b2").unwrap().get("y"), Some(&Value::Int(2)));
    }

    #[test]
    fn cycle_terminates_with_a_stub() {
        let trainer = fixtures::trainer_with_callbacks(2);
        let document = object_to_config(&*trainer).unwrap();

        let callbacks = document.get("callbacks").unwrap().as_seq().unwrap();
        assert_eq!(callbacks.len(), 2);
        for callback in callbacks {
            let owner = callback.get("owner").unwrap();
            assert_eq!(keys(owner), ["class", "_id"]);
            assert_eq!(owner.get("_id"), Some(&Value::Int(1)));
        }
    }

    #[test]
    fn encoding_is_deterministic() {
        let agent = fixtures::agent();
        let first = object_to_config(&*agent).unwrap();
        let second = object_to_config(&*agent).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn value_kinds_are_converted() {
        let agent = fixtures::agent();
        let document = object_to_config(&*agent).unwrap();

        assert_eq!(document.get("env"), Some(&Value::from("cg_graph::fixtures::CartPole")));
        let policy = document.get("policy").unwrap();
        assert_eq!(policy.get("activation"), Some(&Value::from("tanh")));
        assert_eq!(policy.get("device"), Some(&Value::from("cuda:0")));
        assert_eq!(
            policy.get("hidden_layers"),
            Some(&Value::Seq(vec![64.into(), 64.into()]))
        );
        assert_eq!(
            document.get("scheduler").unwrap().get("optimizer").unwrap().get("_id"),
            document.get("optimizer").unwrap().get("_id"),
        );
        // The target network shares the policy instance.
        assert_eq!(keys(document.get("target").unwrap()), ["class", "_id"]);
    }

    #[test]
    fn optimizer_drops_params_and_promotes_defaults() {
        let adam = Adam::new(vec![0.5, 0.25], 0.01);
        let document = object_to_config(&adam).unwrap();

        // `lr` duplicates a parameter and is pruned from the defaults.
        assert_eq!(keys(&document), ["class", "_id", "eps", "amsgrad", "lr"]);
        assert_eq!(document.get("lr"), Some(&Value::Float(0.01)));
        assert_eq!(document.get("params"), None);
    }

    #[test]
    fn foreign_attribute_is_rejected() {
        let err = object_to_config(&Clock::default()).unwrap_err();
        let ConvertError::UnsupportedValueKind { key, type_path } = err else {
            panic!("expected an unsupported value kind");
        };
        assert_eq!(key, "started_at");
        assert_eq!(type_path, "core::time::Duration");
    }

    #[test]
    fn tag_keys_cannot_be_parameters() {
        assert!(matches!(
            object_to_config(&Labeled),
            Err(ConvertError::MalformedDocument(MalformedKind::ReservedKey { key: "class" }))
        ));
    }

    #[test]
    fn tag_keys_cannot_be_optimizer_defaults() {
        let mut adam = Adam::new(vec![], 0.1);
        adam.defaults.insert("_id".into(), Value::Int(9));
        assert!(matches!(
            object_to_config(&adam),
            Err(ConvertError::MalformedDocument(MalformedKind::ReservedKey { key: "_id" }))
        ));
    }

    #[test]
    fn foreign_sequence_elements_are_dropped() {
        let clock = Clock { skip_started_at: true };
        let document = object_to_config(&clock).unwrap();
        assert_eq!(document.get("laps"), Some(&Value::Seq(vec![Value::Int(3)])));
    }

    #[test]
    fn depth_is_bounded() {
        let chain = fixtures::chain(8);
        let encoder = Encoder::with_options(EncodeOptions { max_depth: 4 });
        assert!(matches!(
            encoder.encode(&*chain),
            Err(ConvertError::DepthExceeded { limit: 4 })
        ));
        assert!(Encoder::new().encode(&*chain).is_ok());
    }

    #[test]
    fn mlp_without_nesting() {
        let document = object_to_config(&Mlp::new(vec![32])).unwrap();
        assert_eq!(keys(&document), ["class", "_id", "hidden_layers", "activation", "device"]);
    }
}
