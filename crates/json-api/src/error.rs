use thiserror::Error;

pub type Result<T> = std::result::Result<T, JsonApiError>;

/// Faults raised while assembling a document.
///
/// All variants are configuration faults — programmer errors in serializer
/// or registry wiring — and are surfaced immediately rather than caught
/// internally. The `Other` arm lets a custom [`Serializer`](crate::Serializer)
/// propagate its own failures through the render pipeline.
#[derive(Debug, Error)]
pub enum JsonApiError {
    #[error("resource type must not be empty")]
    EmptyType,

    #[error("no serializer registered for `{0}`")]
    UnregisteredType(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}
