//! A named edge from a resource to related data.

use serde_json::Value;

use crate::element::Element;
use crate::error::Result;
use crate::extra::Extra;
use crate::value::JsonMap;

/// A relationship produced by a serializer's
/// [`relationship`](crate::Serializer::relationship) accessor.
///
/// The element slot distinguishes two empty states: a relationship built
/// over a null resource renders `{"data": null}` (the relationship exists
/// but points at nothing), while [`Relationship::empty`] carries no `data`
/// key at all — only whatever links or meta are attached. A relationship
/// the serializer never returns is omitted from the document entirely; that
/// decision happens upstream in [`Resource`](crate::Resource).
#[derive(Clone, Default)]
pub struct Relationship {
    element: Option<Box<dyn Element>>,
    extra: Extra,
}

impl Relationship {
    pub fn new(element: impl Element + 'static) -> Self {
        Self {
            element: Some(Box::new(element)),
            extra: Extra::default(),
        }
    }

    /// A relationship with no element slot — links/meta only.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn element_mut(&mut self) -> Option<&mut (dyn Element + 'static)> {
        self.element.as_deref_mut()
    }

    pub fn set_element(&mut self, element: Option<Box<dyn Element>>) {
        self.element = element;
    }

    pub fn set_links(&mut self, links: JsonMap) {
        self.extra.set_links(links);
    }

    pub fn add_link(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.extra.add_link(key, value);
    }

    pub fn set_meta(&mut self, meta: JsonMap) {
        self.extra.set_meta(meta);
    }

    pub fn add_meta(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.extra.add_meta(key, value);
    }

    /// Render the relationship object: `data` (identifier, identifier
    /// array, or null) when an element is present, plus non-empty meta and
    /// links.
    pub fn to_value(&mut self) -> Result<Value> {
        let mut map = JsonMap::new();

        if let Some(element) = self.element.as_deref_mut() {
            map.insert("data".to_string(), element.to_identifier()?);
        }

        if !self.extra.meta.is_empty() {
            map.insert("meta".to_string(), Value::Object(self.extra.meta.clone()));
        }

        if !self.extra.links.is_empty() {
            map.insert("links".to_string(), Value::Object(self.extra.links.clone()));
        }

        Ok(Value::Object(map))
    }
}
