//! The element abstraction shared by resources and collections.

use std::collections::HashMap;

use serde_json::Value;

use crate::Resource;
use crate::error::Result;

/// A per-type restriction on which attributes and relationships to render,
/// keyed by resource type.
pub type Fieldset = HashMap<String, Vec<String>>;

/// Anything that can sit in a document's `data` slot or behind a
/// relationship: a single [`Resource`], a [`Collection`](crate::Collection),
/// or a [`PolymorphicCollection`](crate::PolymorphicCollection).
///
/// Rendering takes `&mut self`: resolving relationships caches the result on
/// each resource and pushes include paths and fieldsets down the graph.
pub trait Element {
    /// The resources contained in this element (one for a resource, any
    /// number for a collection).
    fn resources_mut(&mut self) -> Vec<&mut Resource>;

    /// Render the full resource-object form.
    fn to_value(&mut self) -> Result<Value>;

    /// Render the resource-identifier form: a `{type, id}` object or null
    /// for a single resource, an array of identifiers for a collection.
    fn to_identifier(&mut self) -> Result<Value>;

    /// Request dotted relationship paths to be included. Composites forward
    /// to every contained resource.
    fn with(&mut self, paths: &[String]);

    /// Restrict rendering to the given fieldset; `None` lifts the
    /// restriction. Composites forward to every contained resource.
    fn fields(&mut self, fieldset: Option<Fieldset>);

    fn boxed_clone(&self) -> Box<dyn Element>;
}

impl Clone for Box<dyn Element> {
    fn clone(&self) -> Self {
        self.boxed_clone()
    }
}
