#![doc = include_str!("../README.md")]

use anyhow::Error;
use json_api_params::InvalidParameterError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error as ThisError;

/// One entry of a JSON:API `errors` array. Absent members are omitted from
/// the rendered object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ErrorSource>,
}

/// A pointer back at the part of the request that caused the error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
}

/// The outcome of handling one fault: an HTTP status plus the error
/// entries to render.
#[derive(Debug, Clone)]
pub struct ResponseBag {
    status: u16,
    errors: Vec<ErrorObject>,
}

impl ResponseBag {
    pub fn new(status: u16, errors: Vec<ErrorObject>) -> Self {
        Self { status, errors }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn errors(&self) -> &[ErrorObject] {
        &self.errors
    }

    /// The error entries as JSON values, in the shape
    /// `json_api::Document::set_errors` expects.
    pub fn errors_values(&self) -> Vec<Value> {
        self.errors
            .iter()
            .map(|error| serde_json::to_value(error).unwrap_or(Value::Null))
            .collect()
    }
}

/// Formats a response for the faults it recognises.
pub trait ErrorHandler {
    fn accepts(&self, error: &Error) -> bool;

    fn handle(&self, error: &Error) -> ResponseBag;
}

/// Raised when no registered handler accepts a fault. Register a
/// [`FallbackHandler`] last to make the registry total.
#[derive(Debug, ThisError)]
#[error("no error handler registered for: {0}")]
pub struct UnhandledError(String);

/// An ordered chain of [`ErrorHandler`]s; the first handler that accepts a
/// fault formats the response.
#[derive(Default)]
pub struct ErrorHandlerRegistry {
    handlers: Vec<Box<dyn ErrorHandler>>,
}

impl ErrorHandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, handler: impl ErrorHandler + 'static) {
        self.handlers.push(Box::new(handler));
    }

    pub fn handle(&self, error: &Error) -> Result<ResponseBag, UnhandledError> {
        for handler in &self.handlers {
            if handler.accepts(error) {
                return Ok(handler.handle(error));
            }
        }

        Err(UnhandledError(error.to_string()))
    }
}

/// Maps [`InvalidParameterError`] to a 400 response carrying the
/// application error code and the offending parameter.
pub struct InvalidParameterHandler;

impl ErrorHandler for InvalidParameterHandler {
    fn accepts(&self, error: &Error) -> bool {
        error.downcast_ref::<InvalidParameterError>().is_some()
    }

    fn handle(&self, error: &Error) -> ResponseBag {
        let mut entry = ErrorObject::default();

        if let Some(invalid) = error.downcast_ref::<InvalidParameterError>() {
            if invalid.code() != 0 {
                entry.code = Some(invalid.code());
            }

            if !invalid.parameter().is_empty() {
                entry.source = Some(ErrorSource {
                    parameter: Some(invalid.parameter().to_string()),
                });
            }
        }

        ResponseBag::new(400, vec![entry])
    }
}

/// The catch-all: anything unrecognised becomes a 500. The full error
/// chain is attached as `detail` only in debug mode.
pub struct FallbackHandler {
    debug: bool,
}

impl FallbackHandler {
    pub fn new(debug: bool) -> Self {
        Self { debug }
    }
}

impl ErrorHandler for FallbackHandler {
    fn accepts(&self, _error: &Error) -> bool {
        true
    }

    fn handle(&self, error: &Error) -> ResponseBag {
        let status = 500;
        let mut entry = ErrorObject {
            code: Some(status as u64),
            title: Some("Internal server error".to_string()),
            ..Default::default()
        };

        if self.debug {
            entry.detail = Some(format!("{error:#}"));
        }

        ResponseBag::new(status, vec![entry])
    }
}
