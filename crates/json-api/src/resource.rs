//! The atomic unit of a document: one model value plus its serializer.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::element::{Element, Fieldset};
use crate::error::{JsonApiError, Result};
use crate::extra::Extra;
use crate::path::parse_relationship_paths;
use crate::relationship::Relationship;
use crate::serializer::{Serializer, SerializerRegistry};
use crate::value::{JsonMap, deep_merge_map, is_empty_value, scalar_string};

/// A single resource: model data, the serializer that interprets it, and
/// the render-time state pushed onto it (include paths, fieldset, merge
/// siblings).
///
/// `(type, id)` is derived solely from serializer + data and is stable for
/// the resource's lifetime. A resource wrapping a primitive (a bare id
/// rather than a model object) is *identifier-only*: its id is the
/// primitive's string form and it renders neither attributes nor
/// relationships.
///
/// Relationship resolution is lazy and cached; requesting more include
/// paths via [`with`](Element::with) invalidates the cache. Nothing else
/// does.
#[derive(Clone)]
pub struct Resource {
    data: Value,
    serializer: Arc<dyn Serializer>,
    includes: Vec<String>,
    fieldset: Option<Fieldset>,
    merged: Vec<Resource>,
    relationships: Option<IndexMap<String, Relationship>>,
    extra: Extra,
}

impl Resource {
    pub fn new(data: impl Into<Value>, serializer: Arc<dyn Serializer>) -> Self {
        Self {
            data: data.into(),
            serializer,
            includes: Vec::new(),
            fieldset: None,
            merged: Vec::new(),
            relationships: None,
            extra: Extra::default(),
        }
    }

    /// Build a resource by resolving the serializer through a registry.
    pub fn polymorphic(
        data: impl Into<Value>,
        serializers: &dyn SerializerRegistry,
    ) -> Result<Self> {
        let data = data.into();
        let serializer = serializers.resolve(&data)?;
        Ok(Self::new(data, serializer))
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn serializer(&self) -> &Arc<dyn Serializer> {
        &self.serializer
    }

    /// Whether this resource wraps a bare identifier rather than a model
    /// object.
    pub fn is_identifier(&self) -> bool {
        !self.data.is_object() && !self.data.is_array()
    }

    /// The resource type. An empty type from the serializer is a
    /// configuration fault.
    pub fn resource_type(&self) -> Result<String> {
        let resource_type = self.serializer.resource_type(&self.data);

        if resource_type.is_empty() {
            return Err(JsonApiError::EmptyType);
        }

        Ok(resource_type)
    }

    pub fn id(&self) -> String {
        if self.is_identifier() {
            scalar_string(&self.data)
        } else {
            self.serializer.id(&self.data)
        }
    }

    /// The attribute map: serializer attributes filtered by the active
    /// fieldset, deep-merged with each merge sibling's (equally filtered)
    /// attributes in merge-call order.
    pub fn attributes(&self) -> Result<JsonMap> {
        let own = self.own_fields()?;
        let mut attributes = self.serializer.attributes(&self.data, own.as_deref());

        filter_fields(&mut attributes, own.as_deref());

        for sibling in &self.merged {
            deep_merge_map(&mut attributes, sibling.attributes()?);
        }

        Ok(attributes)
    }

    /// The resolved relationship map, unfiltered by fieldsets. Resolution
    /// buckets the accumulated include paths one level deep, asks the
    /// serializer for each first segment, and pushes the remaining nested
    /// paths plus the active fieldset onto the returned element. Cached
    /// until new include paths arrive.
    pub fn unfiltered_relationships(&mut self) -> Result<&mut IndexMap<String, Relationship>> {
        if self.relationships.is_none() {
            let mut relationships = IndexMap::new();

            for (name, nested) in parse_relationship_paths(&self.includes) {
                let Some(mut relationship) = self.serializer.relationship(&self.data, &name)?
                else {
                    continue;
                };

                if let Some(element) = relationship.element_mut() {
                    element.with(&nested);
                    element.fields(self.fieldset.clone());
                }

                relationships.insert(name, relationship);
            }

            self.relationships = Some(relationships);
        }

        Ok(self.relationships.get_or_insert_with(IndexMap::new))
    }

    /// Record `other` as a render-time merge sibling. Multiple merges apply
    /// in call order, later siblings winning on conflicts.
    pub fn merge(&mut self, other: Resource) {
        self.merged.push(other);
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

    /// The requested fields for this resource's type, if a fieldset is
    /// active.
    fn own_fields(&self) -> Result<Option<Vec<String>>> {
        let Some(fieldset) = &self.fieldset else {
            return Ok(None);
        };

        Ok(fieldset.get(&self.resource_type()?).cloned())
    }

    /// Rendered relationships: fieldset-filtered by name, then deep-merged
    /// with each sibling's rendered relationships.
    fn relationships_value(&mut self) -> Result<JsonMap> {
        let own = self.own_fields()?;
        let mut rendered = JsonMap::new();

        let relationships = self.unfiltered_relationships()?;
        for (name, relationship) in relationships.iter_mut() {
            if let Some(requested) = own.as_deref()
                && !requested.is_empty()
                && !requested.iter().any(|field| field == name)
            {
                continue;
            }

            rendered.insert(name.clone(), relationship.to_value()?);
        }

        for sibling in &mut self.merged {
            deep_merge_map(&mut rendered, sibling.relationships_value()?);
        }

        Ok(rendered)
    }
}

impl Element for Resource {
    fn resources_mut(&mut self) -> Vec<&mut Resource> {
        vec![self]
    }

    fn to_value(&mut self) -> Result<Value> {
        let Value::Object(mut map) = self.to_identifier()? else {
            return Ok(Value::Null);
        };

        if !self.is_identifier() {
            let attributes = self.attributes()?;
            if !attributes.is_empty() {
                map.insert("attributes".to_string(), Value::Object(attributes));
            }

            let relationships = self.relationships_value()?;
            if !relationships.is_empty() {
                map.insert("relationships".to_string(), Value::Object(relationships));
            }
        }

        let mut links = self.serializer.links(&self.data);
        for (key, value) in self.extra.links.clone() {
            links.insert(key, value);
        }
        if !links.is_empty() {
            map.insert("links".to_string(), Value::Object(links));
        }

        let mut meta = self.serializer.meta(&self.data);
        for (key, value) in self.extra.meta.clone() {
            meta.insert(key, value);
        }
        if !meta.is_empty() {
            map.insert("meta".to_string(), Value::Object(meta));
        }

        Ok(Value::Object(map))
    }

    fn to_identifier(&mut self) -> Result<Value> {
        if is_empty_value(&self.data) {
            return Ok(Value::Null);
        }

        let mut map = JsonMap::new();
        map.insert("type".to_string(), Value::String(self.resource_type()?));
        map.insert("id".to_string(), Value::String(self.id()));

        if !self.extra.meta.is_empty() {
            map.insert("meta".to_string(), Value::Object(self.extra.meta.clone()));
        }

        Ok(Value::Object(map))
    }

    fn with(&mut self, paths: &[String]) {
        for path in paths {
            if !self.includes.contains(path) {
                self.includes.push(path.clone());
            }
        }

        self.relationships = None;
    }

    fn fields(&mut self, fieldset: Option<Fieldset>) {
        self.fieldset = fieldset;
    }

    fn boxed_clone(&self) -> Box<dyn Element> {
        Box::new(self.clone())
    }
}

/// Restrict a rendered map (attributes or relationships) to the requested
/// fields, preserving the original key order. An empty request list means
/// no restriction.
fn filter_fields(map: &mut JsonMap, requested: Option<&[String]>) {
    if let Some(requested) = requested
        && !requested.is_empty()
    {
        map.retain(|key, _| requested.iter().any(|field| field == key));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Collection;
    use serde_json::json;

    struct PostSerializer;

    impl Serializer for PostSerializer {
        fn resource_type(&self, _model: &Value) -> String {
            "posts".to_string()
        }

        fn attributes(&self, model: &Value, _fields: Option<&[String]>) -> JsonMap {
            let mut attributes = JsonMap::new();
            for key in ["foo", "baz"] {
                if let Some(value) = model.get(key) {
                    attributes.insert(key.to_string(), value.clone());
                }
            }
            attributes
        }

        fn relationship(&self, model: &Value, name: &str) -> Result<Option<Relationship>> {
            match name {
                "comments" => Ok(Some(Relationship::new(Collection::new(
                    model.get("comments").cloned().unwrap_or(Value::Null),
                    Arc::new(CommentSerializer),
                )))),
                "author" => Ok(Some(Relationship::new(Resource::new(
                    Value::Null,
                    Arc::new(CommentSerializer),
                )))),
                "likes" => Ok(Some(Relationship::new(Collection::new(
                    json!([]),
                    Arc::new(CommentSerializer),
                )))),
                _ => Ok(None),
            }
        }
    }

    struct PostSerializerWithLinksAndMeta;

    impl Serializer for PostSerializerWithLinksAndMeta {
        fn resource_type(&self, model: &Value) -> String {
            PostSerializer.resource_type(model)
        }

        fn attributes(&self, model: &Value, fields: Option<&[String]>) -> JsonMap {
            PostSerializer.attributes(model, fields)
        }

        fn links(&self, model: &Value) -> JsonMap {
            let mut links = JsonMap::new();
            links.insert(
                "self".to_string(),
                Value::String(format!("/posts/{}", scalar_string(&model["id"]))),
            );
            links
        }

        fn meta(&self, model: &Value) -> JsonMap {
            let mut meta = JsonMap::new();
            meta.insert(
                "some-meta".to_string(),
                Value::String(format!("from-serializer-for-{}", scalar_string(&model["id"]))),
            );
            meta
        }
    }

    struct CommentSerializer;

    impl Serializer for CommentSerializer {
        fn resource_type(&self, _model: &Value) -> String {
            "comments".to_string()
        }
    }

    struct EmptyTypeSerializer;

    impl Serializer for EmptyTypeSerializer {
        fn resource_type(&self, _model: &Value) -> String {
            String::new()
        }
    }

    fn paths(input: &[&str]) -> Vec<String> {
        input.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_to_value_includes_attributes_links_and_meta() {
        let mut resource = Resource::new(
            json!({"id": "123", "foo": "bar", "baz": "qux"}),
            Arc::new(PostSerializerWithLinksAndMeta),
        );

        assert_eq!(
            resource.to_value().unwrap(),
            json!({
                "type": "posts",
                "id": "123",
                "attributes": {"foo": "bar", "baz": "qux"},
                "links": {"self": "/posts/123"},
                "meta": {"some-meta": "from-serializer-for-123"}
            })
        );
    }

    #[test]
    fn test_to_identifier() {
        let mut resource = Resource::new(json!({"id": "123", "foo": "bar"}), Arc::new(PostSerializer));

        assert_eq!(
            resource.to_identifier().unwrap(),
            json!({"type": "posts", "id": "123"})
        );

        resource.add_meta("foo", "bar");

        assert_eq!(
            resource.to_identifier().unwrap(),
            json!({"type": "posts", "id": "123", "meta": {"foo": "bar"}})
        );
    }

    #[test]
    fn test_id_is_stringified() {
        let resource = Resource::new(json!({"id": 123}), Arc::new(PostSerializer));
        assert_eq!(resource.id(), "123");
    }

    #[test]
    fn test_scalar_data_is_identifier_only() {
        let mut resource = Resource::new(42, Arc::new(PostSerializer));

        assert!(resource.is_identifier());
        assert_eq!(resource.id(), "42");
        assert_eq!(
            resource.to_value().unwrap(),
            json!({"type": "posts", "id": "42"})
        );
    }

    #[test]
    fn test_null_data_has_no_identifier() {
        let mut resource = Resource::new(Value::Null, Arc::new(PostSerializer));

        assert_eq!(resource.to_identifier().unwrap(), Value::Null);
        assert_eq!(resource.to_value().unwrap(), Value::Null);
    }

    #[test]
    fn test_fieldset_filters_attributes() {
        let mut resource = Resource::new(
            json!({"id": "123", "foo": "bar", "baz": "qux"}),
            Arc::new(PostSerializer),
        );

        resource.fields(Some(Fieldset::from([(
            "posts".to_string(),
            vec!["baz".to_string()],
        )])));

        assert_eq!(
            resource.to_value().unwrap(),
            json!({"type": "posts", "id": "123", "attributes": {"baz": "qux"}})
        );
    }

    #[test]
    fn test_empty_fieldset_list_means_unrestricted() {
        let mut resource = Resource::new(
            json!({"id": "123", "foo": "bar"}),
            Arc::new(PostSerializer),
        );

        resource.fields(Some(Fieldset::from([("posts".to_string(), vec![])])));

        assert_eq!(
            resource.to_value().unwrap(),
            json!({"type": "posts", "id": "123", "attributes": {"foo": "bar"}})
        );
    }

    #[test]
    fn test_merge_combines_attributes_and_relationships() {
        let mut resource1 = Resource::new(
            json!({"id": "123", "foo": "bar", "comments": [1]}),
            Arc::new(PostSerializer),
        );
        let mut resource2 = Resource::new(
            json!({"id": "123", "baz": "qux", "comments": [1, 2]}),
            Arc::new(PostSerializer),
        );

        resource1.with(&paths(&["comments"]));
        resource2.with(&paths(&["comments"]));

        resource1.merge(resource2);

        assert_eq!(
            resource1.to_value().unwrap(),
            json!({
                "type": "posts",
                "id": "123",
                "attributes": {"foo": "bar", "baz": "qux"},
                "relationships": {
                    "comments": {
                        "data": [
                            {"type": "comments", "id": "1"},
                            {"type": "comments", "id": "2"}
                        ]
                    }
                }
            })
        );
    }

    #[test]
    fn test_fieldset_applies_to_merge_siblings() {
        let mut resource1 = Resource::new(json!({"id": "1", "baz": "qux"}), Arc::new(PostSerializer));
        let mut resource2 = Resource::new(json!({"id": "1", "foo": "bar"}), Arc::new(PostSerializer));

        let fieldset = Fieldset::from([("posts".to_string(), vec!["baz".to_string()])]);
        resource1.fields(Some(fieldset.clone()));
        resource2.fields(Some(fieldset));

        resource1.merge(resource2);

        assert_eq!(
            resource1.to_value().unwrap(),
            json!({"type": "posts", "id": "1", "attributes": {"baz": "qux"}})
        );
    }

    #[test]
    fn test_directly_set_links_override_serializer_links() {
        let mut resource = Resource::new(
            json!({"id": "123", "foo": "bar"}),
            Arc::new(PostSerializerWithLinksAndMeta),
        );
        resource.add_link("self", "overridden/by/resource");
        resource.add_link("related", "/some/other/comment");

        assert_eq!(
            resource.to_value().unwrap(),
            json!({
                "type": "posts",
                "id": "123",
                "attributes": {"foo": "bar"},
                "links": {
                    "self": "overridden/by/resource",
                    "related": "/some/other/comment"
                },
                "meta": {"some-meta": "from-serializer-for-123"}
            })
        );
    }

    #[test]
    fn test_directly_set_meta_overrides_serializer_meta() {
        let mut resource = Resource::new(
            json!({"id": "123", "foo": "bar"}),
            Arc::new(PostSerializerWithLinksAndMeta),
        );
        resource.add_meta("some-meta", "overridden-by-resource");

        assert_eq!(
            resource.to_value().unwrap(),
            json!({
                "type": "posts",
                "id": "123",
                "attributes": {"foo": "bar"},
                "links": {"self": "/posts/123"},
                "meta": {"some-meta": "overridden-by-resource"}
            })
        );
    }

    #[test]
    fn test_empty_to_one_relationship_renders_null_data() {
        let mut resource = Resource::new(json!({"id": "123", "foo": "bar"}), Arc::new(PostSerializer));
        resource.with(&paths(&["author"]));

        assert_eq!(
            resource.to_value().unwrap(),
            json!({
                "type": "posts",
                "id": "123",
                "attributes": {"foo": "bar"},
                "relationships": {"author": {"data": null}}
            })
        );
    }

    #[test]
    fn test_empty_to_many_relationship_renders_empty_array() {
        let mut resource = Resource::new(json!({"id": "123", "foo": "bar"}), Arc::new(PostSerializer));
        resource.with(&paths(&["likes"]));

        assert_eq!(
            resource.to_value().unwrap(),
            json!({
                "type": "posts",
                "id": "123",
                "attributes": {"foo": "bar"},
                "relationships": {"likes": {"data": []}}
            })
        );
    }

    #[test]
    fn test_unknown_relationship_name_is_omitted() {
        let mut resource = Resource::new(json!({"id": "123", "foo": "bar"}), Arc::new(PostSerializer));
        resource.with(&paths(&["nonexistent"]));

        assert_eq!(
            resource.to_value().unwrap(),
            json!({"type": "posts", "id": "123", "attributes": {"foo": "bar"}})
        );
    }

    #[test]
    fn test_with_deduplicates_and_invalidates_cache() {
        let mut resource = Resource::new(
            json!({"id": "1", "comments": [1]}),
            Arc::new(PostSerializer),
        );

        resource.with(&paths(&["comments"]));
        assert_eq!(resource.unfiltered_relationships().unwrap().len(), 1);

        // Same path again: still one relationship, resolved fresh.
        resource.with(&paths(&["comments", "author"]));
        let relationships = resource.unfiltered_relationships().unwrap();
        let names: Vec<&str> = relationships.keys().map(|k| k.as_str()).collect();
        assert_eq!(names, vec!["comments", "author"]);
    }

    #[test]
    fn test_repeated_render_is_identical() {
        let mut resource = Resource::new(
            json!({"id": "1", "foo": "bar", "comments": [1, 2]}),
            Arc::new(PostSerializer),
        );
        resource.with(&paths(&["comments"]));

        let first = resource.to_value().unwrap();
        let second = resource.to_value().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_type_is_a_fault() {
        let mut resource = Resource::new(json!({"id": "1"}), Arc::new(EmptyTypeSerializer));

        assert!(matches!(
            resource.to_value(),
            Err(JsonApiError::EmptyType)
        ));
    }
}
