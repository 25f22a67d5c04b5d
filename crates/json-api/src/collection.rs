//! Homogeneous resource collections.

use std::sync::Arc;

use serde_json::Value;

use crate::element::{Element, Fieldset};
use crate::error::Result;
use crate::resource::Resource;
use crate::serializer::Serializer;

/// An ordered sequence of resources sharing one serializer.
///
/// Raw model values are lifted into [`Resource`]s on construction;
/// already-built resources pass through [`from_resources`](Collection::from_resources)
/// unchanged. An empty collection renders as `[]`, never as absent — that
/// is what makes an empty to-many relationship come out as `{"data": []}`.
#[derive(Clone, Default)]
pub struct Collection {
    resources: Vec<Resource>,
}

impl Collection {
    /// Lift an array of raw model values. Anything that is not an array
    /// (including null, for a model with no related records loaded) becomes
    /// an empty collection.
    pub fn new(data: impl Into<Value>, serializer: Arc<dyn Serializer>) -> Self {
        let resources = match data.into() {
            Value::Array(items) => items
                .into_iter()
                .map(|item| Resource::new(item, Arc::clone(&serializer)))
                .collect(),
            _ => Vec::new(),
        };

        Self { resources }
    }

    pub fn from_resources(resources: Vec<Resource>) -> Self {
        Self { resources }
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }
}

impl Element for Collection {
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
