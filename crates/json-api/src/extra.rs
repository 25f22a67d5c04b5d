//! Links and meta attached to documents, resources, and relationships.

use serde_json::Value;

use crate::value::JsonMap;

/// The links and meta maps carried by a [`Document`](crate::Document),
/// [`Resource`](crate::Resource), or [`Relationship`](crate::Relationship).
///
/// Held by value wherever it is used; merging against serializer-supplied
/// links/meta happens at render time, with directly-set entries winning.
#[derive(Clone, Default)]
pub struct Extra {
    pub links: JsonMap,
    pub meta: JsonMap,
}

impl Extra {
    pub fn set_links(&mut self, links: JsonMap) {
        self.links = links;
    }

    pub fn add_link(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.links.insert(key.into(), value.into());
    }

    pub fn set_meta(&mut self, meta: JsonMap) {
        self.meta = meta;
    }

    pub fn add_meta(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.meta.insert(key.into(), value.into());
    }

    /// Add pagination links (`first`, `prev`, `next`, and `last`).
    ///
    /// `query` is the decoded query of the incoming request; each link
    /// rebuilds it with the target page. When the incoming query paginated
    /// with `page[number]`, the links keep numbered pages; otherwise they use
    /// `page[offset]`. Zero-valued offsets and first-page numbers are dropped
    /// so the `first` link stays canonical.
    ///
    /// `prev` is only added when there is a previous page, `next` when the
    /// total is unknown or more results remain, and `last` when the total is
    /// known.
    pub fn add_pagination_links(
        &mut self,
        url: &str,
        query: &JsonMap,
        offset: u64,
        limit: u64,
        total: Option<u64>,
    ) {
        let mut offset = offset;
        if page_param(query, "number").is_some() {
            offset = offset / limit * limit;
        }

        self.add_pagination_link("first", url, query, 0, limit);

        if offset > 0 {
            self.add_pagination_link("prev", url, query, offset.saturating_sub(limit), limit);
        }

        if total.is_none_or(|total| offset + limit < total) {
            self.add_pagination_link("next", url, query, offset + limit, limit);
        }

        if let Some(total) = total
            && total > 0
        {
            self.add_pagination_link("last", url, query, (total - 1) / limit * limit, limit);
        }
    }

    fn add_pagination_link(
        &mut self,
        name: &str,
        url: &str,
        query: &JsonMap,
        offset: u64,
        limit: u64,
    ) {
        let mut query = query.clone();

        if !matches!(query.get("page"), Some(Value::Object(_))) {
            query.insert("page".to_string(), Value::Object(JsonMap::new()));
        }
        let Some(Value::Object(page)) = query.get_mut("page") else {
            return;
        };

        if page.contains_key("number") {
            let number = offset / limit + 1;
            if number <= 1 {
                page.shift_remove("number");
            } else {
                page.insert("number".to_string(), Value::from(number));
            }
        } else if offset > 0 {
            page.insert("offset".to_string(), Value::from(offset));
        } else {
            page.shift_remove("offset");
        }

        if page.contains_key("limit") {
            page.insert("limit".to_string(), Value::from(limit));
        }

        if page.is_empty() {
            query.shift_remove("page");
        }

        let query_string = build_query(&query);
        let href = if query_string.is_empty() {
            url.to_string()
        } else {
            format!("{url}?{query_string}")
        };

        self.add_link(name, href);
    }
}

fn page_param<'a>(query: &'a JsonMap, key: &str) -> Option<&'a Value> {
    query.get("page")?.get(key)
}

/// Flatten a decoded query map back into an urlencoded query string,
/// using bracket syntax (`page[offset]=10`) for nested maps.
fn build_query(query: &JsonMap) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in query {
        append_query_pairs(&mut serializer, key, value);
    }
    serializer.finish()
}

fn append_query_pairs(
    serializer: &mut url::form_urlencoded::Serializer<'_, String>,
    key: &str,
    value: &Value,
) {
    match value {
        Value::Object(map) => {
            for (sub, value) in map {
                append_query_pairs(serializer, &format!("{key}[{sub}]"), value);
            }
        }
        Value::Array(items) => {
            for (index, value) in items.iter().enumerate() {
                append_query_pairs(serializer, &format!("{key}[{index}]"), value);
            }
        }
        Value::String(s) => {
            serializer.append_pair(key, s);
        }
        other => {
            serializer.append_pair(key, &other.to_string());
        }
    }
}
