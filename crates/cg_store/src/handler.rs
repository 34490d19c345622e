use std::path::{Path, PathBuf};
use std::rc::Rc;

use cg_graph::identity::ObjectRegistry;
use cg_graph::object::{Configurable, Decoded};
use cg_graph::path::{DynamicTypePath, TypePath};
use cg_graph::registry::TypeRegistry;
use cg_graph::value::Value;
use cg_graph::{ConvertError, DecodeOptions, Decoder, Encoder, RewriteRule};

use crate::{DocumentStore, StoreError, YamlStore};

/// Saves object graphs to config files and loads them back.
///
/// Owns the [`TypeRegistry`] that loaded documents are resolved against.
/// Every call converts with fresh identity state; nothing is carried over
/// between calls except what a caller passes in explicitly.
///
/// ```no_run
/// use cg_graph::registry::TypeRegistry;
/// use cg_store::ConfigHandler;
///
/// let handler = ConfigHandler::new(TypeRegistry::new());
/// let agent = handler.load_config("runs/agent.yml").unwrap();
/// let path = handler.save_config(&*agent, "runs/agent_copy").unwrap();
/// assert!(path.ends_with("agent_copy.yml"));
/// ```
#[derive(Debug)]
pub struct ConfigHandler<S = YamlStore> {
    registry: TypeRegistry,
    store: S,
    encoder: Encoder,
    decode_options: DecodeOptions,
}

impl ConfigHandler {
    /// A handler writing YAML files.
    pub fn new(registry: TypeRegistry) -> Self {
        Self::with_store(registry, YamlStore)
    }
}

impl<S: DocumentStore> ConfigHandler<S> {
    pub fn with_store(registry: TypeRegistry, store: S) -> Self {
        Self {
            registry,
            store,
            encoder: Encoder::new(),
            decode_options: DecodeOptions::default(),
        }
    }

    /// Replaces the encoder used by every save.
    pub fn with_encoder(mut self, encoder: Encoder) -> Self {
        self.encoder = encoder;
        self
    }

    /// Replaces the options used by every load.
    pub fn with_decode_options(mut self, options: DecodeOptions) -> Self {
        self.decode_options = options;
        self
    }

    #[inline]
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    #[inline]
    pub fn registry_mut(&mut self) -> &mut TypeRegistry {
        &mut self.registry
    }

    #[inline]
    pub fn store(&self) -> &S {
        &self.store
    }

    fn decoder(&self) -> Decoder<'_> {
        Decoder::with_options(&self.registry, self.decode_options.clone())
    }

    /// Encodes `object` and writes it to `path`, appending `.yml` if missing.
    ///
    /// Nothing is written if encoding fails.
    pub fn save_config(&self, object: &dyn Configurable, path: impl AsRef<Path>) -> Result<PathBuf, StoreError> {
        let document = self.object_to_config(object)?;
        let path = self.save_config_dict(&document, path)?;
        log::info!("saved `{}` to `{}`", object.reflect_type_path(), path.display());
        Ok(path)
    }

    /// Reads and decodes the document at `path`.
    pub fn load_config(&self, path: impl AsRef<Path>) -> Result<Rc<dyn Configurable>, StoreError> {
        let path = path.as_ref();
        let document = self.load_config_dict(path)?;
        let object = self.decoder().decode_object(document)?;
        log::info!("loaded `{}` from `{}`", object.reflect_type_path(), path.display());
        Ok(object)
    }

    /// Like [`load_config`](Self::load_config), for a root of known type.
    pub fn load_config_as<T: Configurable + TypePath>(&self, path: impl AsRef<Path>) -> Result<Rc<T>, StoreError> {
        let document = self.load_config_dict(path)?;
        Ok(self.decoder().decode_as::<T>(document)?)
    }

    /// Encodes `object` without writing it.
    #[inline]
    pub fn object_to_config(&self, object: &dyn Configurable) -> Result<Value, ConvertError> {
        self.encoder.encode(object)
    }

    /// Decodes a document without reading it from disk.
    ///
    /// `objects` continues an existing graph, and `rewrites` are applied to
    /// type tags after the handler's own rules.
    pub fn config_to_object(
        &self,
        document: Value,
        objects: Option<&mut ObjectRegistry>,
        rewrites: &[RewriteRule],
    ) -> Result<Decoded, ConvertError> {
        let decoder = self.decoder().with_rewrites(rewrites.iter().cloned());
        match objects {
            Some(objects) => decoder.decode_with(document, objects),
            None => decoder.decode(document),
        }
    }

    /// Reads the raw document at `path`.
    #[inline]
    pub fn load_config_dict(&self, path: impl AsRef<Path>) -> Result<Value, StoreError> {
        self.store.load(path.as_ref())
    }

    /// Writes a raw document, returning the path actually written.
    #[inline]
    pub fn save_config_dict(&self, document: &Value, path: impl AsRef<Path>) -> Result<PathBuf, StoreError> {
        self.store.save(document, path.as_ref())
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use std::fs;
    use std::rc::Rc;

    use cg_graph::derive::Configurable;
    use cg_graph::identity::ObjectRegistry;
    use cg_graph::object::{Attr, Configurable, Device};
    use cg_graph::path::TypePath;
    use cg_graph::record::IdentityTag;
    use cg_graph::registry::TypeRegistry;
    use cg_graph::value::Value;
    use cg_graph::{ConvertError, RewriteRule};

    use super::ConfigHandler;
    use crate::StoreError;

    #[derive(Configurable, Debug)]
    #[config(type_path = "store_test::Encoder")]
    struct StateEncoder {
        widths: Vec<u32>,
        device: Device,
    }

    #[derive(Configurable, Debug)]
    #[config(type_path = "store_test::Agent")]
    struct Agent {
        actor: Rc<StateEncoder>,
        critic: Rc<StateEncoder>,
        #[config(default)]
        tau: f64,
    }

    struct Opaque;

    impl TypePath for Opaque {
        fn type_path() -> &'static str {
            "store_test::Opaque"
        }

        fn type_name() -> &'static str {
            "Opaque"
        }
    }

    impl Configurable for Opaque {
        fn parameters(&self) -> &'static [&'static str] {
            &["handle"]
        }

        fn attribute(&self, _: &str) -> Option<Attr> {
            Some(Attr::foreign::<std::fs::File>())
        }
    }

    fn handler() -> ConfigHandler {
        let mut registry = TypeRegistry::empty();
        registry.register::<StateEncoder>();
        registry.register::<Agent>();
        ConfigHandler::new(registry)
    }

    fn agent() -> Agent {
        let shared = Rc::new(StateEncoder {
            widths: vec![256, 256],
            device: Device::Cuda(None),
        });
        Agent {
            actor: shared.clone(),
            critic: shared,
            tau: 0.005,
        }
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let handler = handler();

        let path = handler.save_config(&agent(), dir.path().join("agent")).unwrap();
        assert_eq!(path, dir.path().join("agent.yml"));

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().take(2).collect();
        assert_eq!(lines, ["class: store_test::Agent", "_id: 1"]);

        let loaded = handler.load_config_as::<Agent>(&path).unwrap();
        assert!(Rc::ptr_eq(&loaded.actor, &loaded.critic));
        assert_eq!(loaded.actor.widths, [256, 256]);
        assert_eq!(loaded.actor.device, Device::Cuda(None));
        assert_eq!(loaded.tau, 0.005);

        let dyn_loaded = handler.load_config(&path).unwrap();
        assert!(dyn_loaded.is::<Agent>());
    }

    #[test]
    fn failed_encode_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("opaque");

        let err = handler().save_config(&Opaque, &target).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Convert(ConvertError::UnsupportedValueKind { ref key, .. }) if key == "handle"
        ));
        assert!(!dir.path().join("opaque.yml").exists());
    }

    #[test]
    fn unregistered_type_fails_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = handler().save_config(&agent(), dir.path().join("agent")).unwrap();

        let empty = ConfigHandler::new(TypeRegistry::empty());
        assert!(matches!(
            empty.load_config(&path),
            Err(StoreError::Convert(ConvertError::TypeResolution(_)))
        ));
    }

    #[test]
    fn rewrites_and_pre_seeded_objects() {
        let handler = handler();
        let mut document = handler.object_to_config(&agent()).unwrap();
        let Value::Map(root) = &mut document else {
            panic!("expected a mapping");
        };
        root.insert("class".into(), Value::from("old_layout::Agent"));

        let existing = Rc::new(StateEncoder {
            widths: vec![8],
            device: Device::Cpu,
        });
        let mut objects = ObjectRegistry::new();
        objects.insert(IdentityTag::new(2), existing.clone());

        let decoded = handler
            .config_to_object(
                document,
                Some(&mut objects),
                &[RewriteRule::new("old_layout::", "store_test::")],
            )
            .unwrap();
        let agent = decoded.into_object().unwrap().downcast_rc::<Agent>().unwrap();
        assert!(Rc::ptr_eq(&agent.actor, &existing));
        assert!(Rc::ptr_eq(&agent.critic, &existing));
    }

    #[test]
    fn raw_documents() {
        let dir = tempfile::tempdir().unwrap();
        let handler = handler();
        let path = handler
            .save_config_dict(&Value::Seq(vec![Value::Int(1)]), dir.path().join("list.yml"))
            .unwrap();
        assert_eq!(handler.load_config_dict(&path).unwrap(), Value::Seq(vec![Value::Int(1)]));

        assert!(matches!(
            handler.load_config(&path),
            Err(StoreError::Convert(ConvertError::MalformedDocument(_)))
        ));
    }
}
