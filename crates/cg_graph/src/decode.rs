use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;

use crate::identity::ObjectRegistry;
use crate::object::{ArgumentMap, Arguments, Configurable, Decoded};
use crate::path::{DynamicTypePath, TypePath};
use crate::record::{ConfigRecord, RecordShape};
use crate::registry::TypeRegistry;
use crate::value::Value;
use crate::{ConvertError, DEFAULT_MAX_DEPTH, MalformedKind};

// -----------------------------------------------------------------------------
// RewriteRule

/// A literal substring replacement applied to type tags before resolution.
///
/// Rules let documents written against an old type layout load after the
/// types moved. They never change the document itself.
///
/// ```
/// use cg_graph::RewriteRule;
///
/// let rule = RewriteRule::new("old_pkg::", "new_pkg::");
/// assert_eq!(rule.apply("old_pkg::nn::Mlp").as_deref(), Some("new_pkg::nn::Mlp"));
/// assert_eq!(rule.apply("other::Mlp"), None);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RewriteRule {
    pub from: String,
    pub to: String,
}

impl RewriteRule {
    #[inline]
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Returns the rewritten tag, or `None` if `from` does not occur in it.
    ///
    /// An empty `from` never matches.
    pub fn apply(&self, type_tag: &str) -> Option<String> {
        if self.from.is_empty() || !type_tag.contains(self.from.as_str()) {
            return None;
        }
        Some(type_tag.replace(self.from.as_str(), &self.to))
    }
}

impl<A: Into<String>, B: Into<String>> From<(A, B)> for RewriteRule {
    #[inline]
    fn from((from, to): (A, B)) -> Self {
        Self::new(from, to)
    }
}

// -----------------------------------------------------------------------------
// DecodeOptions

/// Settings of a [`Decoder`].
#[derive(Clone, Debug)]
pub struct DecodeOptions {
    /// Applied in order to every type tag.
    pub rewrites: Vec<RewriteRule>,
    /// Nesting depth at which decoding fails with
    /// [`ConvertError::DepthExceeded`].
    pub max_depth: usize,
}

impl Default for DecodeOptions {
    #[inline]
    fn default() -> Self {
        Self {
            rewrites: Vec::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

// -----------------------------------------------------------------------------
// Decoder

/// Rebuilds an object graph from a config document.
///
/// Records are decoded post-order: all attributes of a record are decoded
/// before its own type is resolved and constructed. A record whose identity
/// was already decoded yields the same `Rc`, so sharing survives the round
/// trip. A reference to a record that is still being decoded (a cycle)
/// yields a [`Decoded::Pending`] that only
/// [`BackRef`](crate::object::BackRef) parameters accept.
///
/// Decoding is fail-fast: the first error aborts the call.
#[derive(Debug)]
pub struct Decoder<'r> {
    registry: &'r TypeRegistry,
    options: DecodeOptions,
}

impl<'r> Decoder<'r> {
    #[inline]
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self::with_options(registry, DecodeOptions::default())
    }

    #[inline]
    pub fn with_options(registry: &'r TypeRegistry, options: DecodeOptions) -> Self {
        Self { registry, options }
    }

    /// Appends rewrite rules.
    pub fn with_rewrites<R: Into<RewriteRule>>(mut self, rules: impl IntoIterator<Item = R>) -> Self {
        self.options.rewrites.extend(rules.into_iter().map(Into::into));
        self
    }

    #[inline]
    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Decodes `document` with a fresh [`ObjectRegistry`].
    pub fn decode(&self, document: Value) -> Result<Decoded, ConvertError> {
        self.decode_with(document, &mut ObjectRegistry::new())
    }

    /// Decodes `document`, continuing the graph held by `objects`.
    ///
    /// On failure `objects` keeps every object that was fully constructed.
    pub fn decode_with(&self, document: Value, objects: &mut ObjectRegistry) -> Result<Decoded, ConvertError> {
        let result = DecodePass {
            registry: self.registry,
            options: &self.options,
            objects: &mut *objects,
        }
        .decode_value(document, 0);

        if result.is_err() {
            objects.abandon();
        }
        result
    }

    /// Decodes a document whose root must be a record.
    pub fn decode_object(&self, document: Value) -> Result<Rc<dyn Configurable>, ConvertError> {
        let found = match &document {
            Value::Map(map) if ConfigRecord::has_tags(map) => None,
            other => Some(other.kind_name()),
        };
        if let Some(found) = found {
            return Err(MalformedKind::NotARecord { found }.into());
        }

        match self.decode(document)? {
            Decoded::Object(object) => Ok(object),
            other => Err(ConvertError::UnexpectedType {
                expected: "object",
                found: other.kind_name(),
            }),
        }
    }

    /// Decodes a document whose root must be a `T`.
    pub fn decode_as<T: Configurable + TypePath>(&self, document: Value) -> Result<Rc<T>, ConvertError> {
        self.decode_object(document)?
            .downcast_rc::<T>()
            .map_err(|object| ConvertError::UnexpectedType {
                expected: T::type_path(),
                found: object.reflect_type_path(),
            })
    }
}

/// Decodes `document` against `registry`.
///
/// `objects` continues an existing graph when given; otherwise a fresh
/// registry is used and dropped afterwards. `rewrites` are applied in order
/// to every type tag.
pub fn config_to_object(
    document: Value,
    registry: &TypeRegistry,
    objects: Option<&mut ObjectRegistry>,
    rewrites: &[RewriteRule],
) -> Result<Decoded, ConvertError> {
    let decoder = Decoder::new(registry).with_rewrites(rewrites.iter().cloned());
    match objects {
        Some(objects) => decoder.decode_with(document, objects),
        None => decoder.decode(document),
    }
}

// -----------------------------------------------------------------------------
// DecodePass

fn contains_record(value: &Value) -> bool {
    match value {
        Value::Map(map) => ConfigRecord::has_tags(map),
        Value::Seq(items) => items.iter().any(contains_record),
        _ => false,
    }
}

struct DecodePass<'a> {
    registry: &'a TypeRegistry,
    options: &'a DecodeOptions,
    objects: &'a mut ObjectRegistry,
}

impl DecodePass<'_> {
    fn decode_value(&mut self, value: Value, depth: usize) -> Result<Decoded, ConvertError> {
        if depth > self.options.max_depth {
            return Err(ConvertError::DepthExceeded {
                limit: self.options.max_depth,
            });
        }

        match value {
            Value::Map(map) => match ConfigRecord::classify(map)? {
                RecordShape::Plain(map) => Ok(Decoded::Value(Value::Map(map))),
                RecordShape::Record(record) => self.decode_record(record, depth),
            },
            Value::Seq(items) if items.iter().any(contains_record) => items
                .into_iter()
                .map(|item| self.decode_value(item, depth + 1))
                .collect::<Result<Vec<_>, _>>()
                .map(Decoded::Seq),
            plain => Ok(Decoded::Value(plain)),
        }
    }

    fn rewrite(&self, mut type_tag: String) -> String {
        for rule in &self.options.rewrites {
            match rule.apply(&type_tag) {
                Some(rewritten) => {
                    log::debug!("rewrote type tag `{type_tag}` to `{rewritten}`");
                    type_tag = rewritten;
                }
                None => log::trace!("rewrite `{}` does not apply to `{type_tag}`", rule.from),
            }
        }
        type_tag
    }

    fn decode_record(&mut self, record: ConfigRecord, depth: usize) -> Result<Decoded, ConvertError> {
        let ConfigRecord {
            type_tag,
            identity,
            attributes,
        } = record;

        if let Some(object) = self.objects.get(identity) {
            return Ok(Decoded::Object(object.clone()));
        }
        if self.objects.is_in_progress(identity) {
            return Ok(Decoded::Pending(self.objects.pending_ref(identity)));
        }

        let type_tag = self.rewrite(type_tag);
        self.objects.begin(identity);

        let mut entries = ArgumentMap::with_capacity_and_hasher(attributes.len(), Default::default());
        for (name, value) in attributes {
            let decoded = self.decode_value(value, depth + 1)?;
            entries.insert(name, decoded);
        }

        let entry = self.registry.resolve(&type_tag)?;
        let mut args = Arguments::new(self.registry, entries);
        let object = entry
            .construct(&mut args)
            .map_err(|source| ConvertError::Construction {
                type_path: type_tag.clone(),
                source,
            })?;

        log::trace!("constructed `{type_tag}` as identity {identity}");
        self.objects.finish(identity, &object);
        Ok(Decoded::Object(object))
    }
}

// -----------------------------------------------------------------------------
// Tests
