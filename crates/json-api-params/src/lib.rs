#![doc = include_str!("../README.md")]

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A request-shape fault: the client sent a parameter the endpoint cannot
/// honor.
///
/// Carries the offending parameter name plus an application-defined numeric
/// code, so an error-response layer can point back at the exact query
/// parameter (`source.parameter` in JSON:API error objects).
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct InvalidParameterError {
    message: String,
    code: u64,
    parameter: String,
}

impl InvalidParameterError {
    pub fn new(message: impl Into<String>, code: u64, parameter: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code,
            parameter: parameter.into(),
        }
    }

    pub fn code(&self) -> u64 {
        self.code
    }

    pub fn parameter(&self) -> &str {
        &self.parameter
    }
}

pub type Result<T> = std::result::Result<T, InvalidParameterError>;

/// A sort order for one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// The JSON:API query parameters of one request, decoded into a JSON map.
///
/// The input is the decoded query string — e.g.
/// `include=user.employer&fields[posts]=title&page[offset]=20` decodes to
///
/// ```json
/// {
///   "include": "user.employer",
///   "fields": {"posts": "title"},
///   "page": {"offset": "20"}
/// }
/// ```
///
/// Values may arrive as strings (straight from a query string) or as
/// numbers; both are accepted. Extraction validates against what the
/// endpoint supports and fails with [`InvalidParameterError`] on anything
/// outside it.
pub struct Parameters {
    input: Value,
}

impl Parameters {
    pub fn new(input: Value) -> Self {
        Self { input }
    }

    /// The requested include paths, validated against the paths the
    /// endpoint supports.
    pub fn include(&self, available: &[&str]) -> Result<Vec<String>> {
        let Some(include) = self.input_str("include") else {
            return Ok(Vec::new());
        };

        if include.is_empty() {
            return Ok(Vec::new());
        }

        let requested: Vec<String> = include.split(',').map(str::to_string).collect();

        let invalid: Vec<&str> = requested
            .iter()
            .map(String::as_str)
            .filter(|path| !available.contains(path))
            .collect();

        if !invalid.is_empty() {
            return Err(InvalidParameterError::new(
                format!("Invalid includes [{}]", invalid.join(",")),
                1,
                "include",
            ));
        }

        Ok(requested)
    }

    /// The result offset, from `page[number]` (when `per_page` is known) or
    /// `page[offset]`. A negative offset is a fault.
    pub fn offset(&self, per_page: Option<u64>) -> Result<u64> {
        if let Some(per_page) = per_page {
            let offset = self.offset_from_number(per_page);
            if offset > 0 {
                return Ok(offset);
            }
        }

        let offset = self.page_i64("offset");

        if offset < 0 {
            return Err(InvalidParameterError::new(
                "page[offset] must be >=0",
                2,
                "page[offset]",
            ));
        }

        Ok(offset as u64)
    }

    fn offset_from_number(&self, per_page: u64) -> u64 {
        let number = self.page_i64("number");

        if number <= 1 {
            return 0;
        }

        (number as u64 - 1) * per_page
    }

    /// The page size, from `page[limit]` or `page[size]`, clamped to `max`.
    pub fn limit(&self, max: Option<u64>) -> Option<u64> {
        let limit = match self.page_i64("limit") {
            0 => self.page_i64("size"),
            limit => limit,
        };

        if limit <= 0 {
            return None;
        }

        let limit = limit as u64;
        Some(match max {
            Some(max) => limit.min(max),
            None => limit,
        })
    }

    /// The requested sort, in request order. A leading `-` selects
    /// descending. Fields are validated against what the endpoint supports.
    pub fn sort(&self, available: &[&str]) -> Result<IndexMap<String, SortDirection>> {
        let mut sort = IndexMap::new();

        let Some(input) = self.input_str("sort") else {
            return Ok(sort);
        };

        if input.is_empty() {
            return Ok(sort);
        }

        for field in input.split(',') {
            let (field, direction) = match field.strip_prefix('-') {
                Some(field) => (field, SortDirection::Desc),
                None => (field, SortDirection::Asc),
            };

            sort.insert(field.to_string(), direction);
        }

        let invalid: Vec<&str> = sort
            .keys()
            .map(String::as_str)
            .filter(|field| !available.contains(field))
            .collect();

        if !invalid.is_empty() {
            return Err(InvalidParameterError::new(
                format!("Invalid sort fields [{}]", invalid.join(",")),
                3,
                "sort",
            ));
        }

        Ok(sort)
    }

    /// The sparse fieldsets, as a type → field-names map suitable for
    /// `Element::fields`.
    pub fn fields(&self) -> HashMap<String, Vec<String>> {
        let Some(Value::Object(fields)) = self.input.get("fields") else {
            return HashMap::new();
        };

        fields
            .iter()
            .filter_map(|(resource_type, list)| {
                let list = list.as_str()?;
                Some((
                    resource_type.clone(),
                    list.split(',').map(str::to_string).collect(),
                ))
            })
            .collect()
    }

    /// The raw filter payload, if any. Its shape is application-defined.
    pub fn filter(&self) -> Option<&Value> {
        self.input.get("filter")
    }

    fn input_str(&self, key: &str) -> Option<&str> {
        self.input.get(key)?.as_str()
    }

    /// A `page[..]` entry as an integer; strings are parsed, anything
    /// missing or malformed is 0.
    fn page_i64(&self, key: &str) -> i64 {
        let Some(value) = self.input.get("page").and_then(|page| page.get(key)) else {
            return 0;
        };

        match value {
            Value::Number(n) => n.as_i64().unwrap_or(0),
            Value::String(s) => s.parse().unwrap_or(0),
            _ => 0,
        }
    }
}
