//! Heterogeneous collections resolved through a serializer registry.

use serde_json::Value;

use crate::element::{Element, Fieldset};
use crate::error::Result;
use crate::resource::Resource;
use crate::serializer::SerializerRegistry;

/// An ordered sequence of resources of mixed types, each raw value resolved
/// to its serializer through the registry individually.
///
/// Construction is fallible: an unregistered value is a configuration
/// fault. Unlike [`Collection`](crate::Collection), the polymorphic path
/// always re-resolves raw values — there is no pass-through constructor for
/// mixed prebuilt resources.
#[derive(Clone, Default)]
pub struct PolymorphicCollection {
    resources: Vec<Resource>,
}

impl PolymorphicCollection {
    pub fn new(data: impl Into<Value>, serializers: &dyn SerializerRegistry) -> Result<Self> {
        let resources = match data.into() {
            Value::Array(items) => items
                .into_iter()
                .map(|item| Resource::polymorphic(item, serializers))
                .collect::<Result<Vec<_>>>()?,
            _ => Vec::new(),
        };

        Ok(Self { resources })
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }
}

impl Element for PolymorphicCollection {
    fn resources_mut(&mut self) -> Vec<&mut Resource> {
        self.resources.iter_mut().collect()
    }

    fn to_value(&mut self) -> Result<Value> {
        let mut rendered = Vec::with_capacity(self.resources.len());
        for resource in &mut self.resources {
            rendered.push(resource.to_value()?);
        }
        Ok(Value::Array(rendered))
    }

    fn to_identifier(&mut self) -> Result<Value> {
        let mut identifiers = Vec::with_capacity(self.resources.len());
        for resource in &mut self.resources {
            identifiers.push(resource.to_identifier()?);
        }
        Ok(Value::Array(identifiers))
    }

    fn with(&mut self, paths: &[String]) {
        for resource in &mut self.resources {
            resource.with(paths);
        }
    }

    fn fields(&mut self, fieldset: Option<Fieldset>) {
        for resource in &mut self.resources {
            resource.fields(fieldset.clone());
        }
    }

    fn boxed_clone(&self) -> Box<dyn Element> {
        Box::new(self.clone())
    }
}
