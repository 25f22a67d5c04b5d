#![doc = include_str!("../README.md")]

mod collection;
mod document;
mod element;
mod error;
mod extra;
mod path;
mod polymorphic;
mod relationship;
mod resource;
mod serializer;
mod value;

pub use collection::Collection;
pub use document::Document;
pub use element::{Element, Fieldset};
pub use error::{JsonApiError, Result};
pub use extra::Extra;
pub use path::parse_relationship_paths;
pub use polymorphic::PolymorphicCollection;
pub use relationship::Relationship;
pub use resource::Resource;
pub use serializer::{Serializer, SerializerRegistry, TypeMapRegistry};
pub use value::{JsonMap, deep_merge, deep_merge_map};
