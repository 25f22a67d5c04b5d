//! The top-level JSON:API document.

use indexmap::IndexMap;
use indexmap::map::Entry;
use serde_json::Value;

use crate::element::Element;
use crate::error::Result;
use crate::extra::Extra;
use crate::resource::Resource;
use crate::value::JsonMap;

/// A JSON:API document: an optional primary element plus independent
/// links, meta, errors, and protocol metadata.
///
/// Rendering walks the primary element twice — once for `data`, once to
/// harvest every uniquely-identified related resource into `included`.
/// The working set built during the second walk is discarded afterward;
/// documents are render-scoped, not long-lived.
///
/// Mutators are unguarded: a document with both `data` and `errors` set
/// renders both.
#[derive(Clone, Default)]
pub struct Document {
    data: Option<Box<dyn Element>>,
    extra: Extra,
    errors: Vec<Value>,
    jsonapi: JsonMap,
}

impl Document {
    /// The JSON:API media type.
    pub const MEDIA_TYPE: &'static str = "application/vnd.api+json";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_data(&mut self, element: impl Element + 'static) {
        self.data = Some(Box::new(element));
    }

    pub fn set_errors(&mut self, errors: Vec<Value>) {
        self.errors = errors;
    }

    /// Set the `jsonapi` protocol-metadata object.
    pub fn set_jsonapi(&mut self, jsonapi: JsonMap) {
        self.jsonapi = jsonapi;
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

    /// Add pagination links for the current page. See
    /// [`Extra::add_pagination_links`].
    pub fn add_pagination_links(
        &mut self,
        url: &str,
        query: &JsonMap,
        offset: u64,
        limit: u64,
        total: Option<u64>,
    ) {
        self.extra.add_pagination_links(url, query, offset, limit, total);
    }

    /// Render the document. Every empty top-level key is omitted; the key
    /// order is `links`, `data`, `included`, `meta`, `errors`, `jsonapi`.
    pub fn to_value(&mut self) -> Result<Value> {
        let mut document = JsonMap::new();

        if !self.extra.links.is_empty() {
            document.insert("links".to_string(), Value::Object(self.extra.links.clone()));
        }

        if let Some(element) = self.data.as_deref_mut() {
            document.insert("data".to_string(), element.to_value()?);

            let included = collect_included(element)?;
            if !included.is_empty() {
                document.insert("included".to_string(), Value::Array(included));
            }
        }

        if !self.extra.meta.is_empty() {
            document.insert("meta".to_string(), Value::Object(self.extra.meta.clone()));
        }

        if !self.errors.is_empty() {
            document.insert("errors".to_string(), Value::Array(self.errors.clone()));
        }

        if !self.jsonapi.is_empty() {
            document.insert("jsonapi".to_string(), Value::Object(self.jsonapi.clone()));
        }

        Ok(Value::Object(document))
    }

    /// Render to a compact JSON string.
    pub fn to_json(&mut self) -> Result<String> {
        let value = self.to_value()?;
        Ok(value.to_string())
    }

    /// Render to a pretty-printed JSON string.
    pub fn to_json_pretty(&mut self) -> Result<String> {
        let value = self.to_value()?;
        serde_json::to_string_pretty(&value).map_err(|e| anyhow::Error::from(e).into())
    }
}

/// Harvest every uniquely-identified resource reachable from the primary
/// element, rendered in first-discovery order.
///
/// The primary element's own resources are not folded in, but their
/// identifiers are remembered: a resource that is already the primary
/// `data` must never reappear in `included`, even when a cyclic
/// relationship path reaches it again. Discovery walks *unfiltered*
/// relationships — a sparse fieldset hides fields, not side-loaded
/// resources.
fn collect_included(element: &mut dyn Element) -> Result<Vec<Value>> {
    let mut included: IndexMap<(String, String), Resource> = IndexMap::new();
    let mut primary = Vec::new();

    for resource in element.resources_mut() {
        if resource.is_identifier() {
            continue;
        }

        primary.push((resource.resource_type()?, resource.id()));

        for relationship in resource.unfiltered_relationships()?.values_mut() {
            if let Some(related) = relationship.element_mut() {
                gather_resources(related, &mut included)?;
            }
        }
    }

    let mut rendered = Vec::new();
    for (key, resource) in included.iter_mut() {
        if primary.contains(key) {
            continue;
        }
        rendered.push(resource.to_value()?);
    }

    Ok(rendered)
}

/// Fold every non-identifier resource under `element` into the working
/// set, parent before children. A `(type, id)` collision merges the new
/// find into the existing entry, so a resource reached via two paths
/// renders the union of what each path exposed.
fn gather_resources(
    element: &mut dyn Element,
    included: &mut IndexMap<(String, String), Resource>,
) -> Result<()> {
    for resource in element.resources_mut() {
        if resource.is_identifier() {
            continue;
        }

        let key = (resource.resource_type()?, resource.id());
        match included.entry(key) {
            Entry::Occupied(mut entry) => entry.get_mut().merge(resource.clone()),
            Entry::Vacant(entry) => {
                entry.insert(resource.clone());
            }
        }

        for relationship in resource.unfiltered_relationships()?.values_mut() {
            if let Some(related) = relationship.element_mut() {
                gather_resources(related, included)?;
            }
        }
    }

    Ok(())
}
