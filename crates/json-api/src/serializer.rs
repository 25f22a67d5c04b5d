//! Serializer traits: per-type adapters and the polymorphic registry.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::Relationship;
use crate::error::{JsonApiError, Result};
use crate::value::{JsonMap, scalar_string};

/// Translates one domain type's model data into JSON:API fields.
///
/// Serializers are stateless; share them as `Arc<dyn Serializer>`. Only
/// [`resource_type`](Serializer::resource_type) is required — everything
/// else has a sensible default for types without attributes, links, meta,
/// or relationships.
///
/// Relationships use explicit name dispatch: match on `name` and return
/// `Ok(Some(..))` for the relationships the type has, `Ok(None)` for
/// everything else. A name that resolves to `None` is omitted from the
/// rendered document entirely.
pub trait Serializer {
    /// The resource type, e.g. `"posts"`. Must be non-empty.
    fn resource_type(&self, model: &Value) -> String;

    /// The resource id. Defaults to the string form of the model's `"id"`
    /// key.
    fn id(&self, model: &Value) -> String {
        scalar_string(model.get("id").unwrap_or(&Value::Null))
    }

    /// The attribute map. `fields` is the requested sparse fieldset for this
    /// type, when one is active — serializers may use it to skip expensive
    /// attributes, but the engine filters the result regardless.
    fn attributes(&self, _model: &Value, _fields: Option<&[String]>) -> JsonMap {
        JsonMap::new()
    }

    fn links(&self, _model: &Value) -> JsonMap {
        JsonMap::new()
    }

    fn meta(&self, _model: &Value) -> JsonMap {
        JsonMap::new()
    }

    /// The named relationship of `model`, or `Ok(None)` if the type has no
    /// relationship by that name.
    fn relationship(&self, _model: &Value, _name: &str) -> Result<Option<Relationship>> {
        Ok(None)
    }
}

/// Resolves a runtime model value to its serializer, for heterogeneous
/// collections.
pub trait SerializerRegistry {
    /// Fails with [`JsonApiError::UnregisteredType`] when no serializer is
    /// registered for the value.
    fn resolve(&self, model: &Value) -> Result<Arc<dyn Serializer>>;
}

/// A [`SerializerRegistry`] backed by a map from a discriminator string to
/// a serializer.
///
/// The discriminator function plays the role a class name plays in dynamic
/// languages: it names the runtime type of a model value. The common case —
/// models carrying their kind in a field — is covered by
/// [`TypeMapRegistry::by_field`].
///
/// ```
/// use std::sync::Arc;
/// use serde_json::json;
/// use json_api::{Serializer, SerializerRegistry, TypeMapRegistry};
///
/// struct CarSerializer;
///
/// impl Serializer for CarSerializer {
///     fn resource_type(&self, _model: &serde_json::Value) -> String {
///         "cars".to_string()
///     }
/// }
///
/// let registry = TypeMapRegistry::by_field("kind").register("car", Arc::new(CarSerializer));
///
/// let serializer = registry.resolve(&json!({"kind": "car", "id": 1})).unwrap();
/// assert_eq!(serializer.resource_type(&json!({})), "cars");
/// ```
pub struct TypeMapRegistry {
    discriminator: Box<dyn Fn(&Value) -> Option<String>>,
    serializers: HashMap<String, Arc<dyn Serializer>>,
}

impl TypeMapRegistry {
    pub fn new(discriminator: impl Fn(&Value) -> Option<String> + 'static) -> Self {
        Self {
            discriminator: Box::new(discriminator),
            serializers: HashMap::new(),
        }
    }

    /// A registry discriminating on the string value of the given field.
    pub fn by_field(field: &str) -> Self {
        let field = field.to_string();
        Self::new(move |model| model.get(&field)?.as_str().map(str::to_string))
    }

    pub fn register(mut self, key: impl Into<String>, serializer: Arc<dyn Serializer>) -> Self {
        self.serializers.insert(key.into(), serializer);
        self
    }
}

impl SerializerRegistry for TypeMapRegistry {
    fn resolve(&self, model: &Value) -> Result<Arc<dyn Serializer>> {
        let key = (self.discriminator)(model)
            .ok_or_else(|| JsonApiError::UnregisteredType(value_kind(model).to_string()))?;

        self.serializers
            .get(&key)
            .cloned()
            .ok_or(JsonApiError::UnregisteredType(key))
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
