//! Configuration types
//!
//! This module contains the inputs the profile store is built from:
//! - `StoreConfig` - Where profiles live and how the store behaves
//! - `ConfigSchema` - Ordered table of field descriptors
//! - `FieldDescriptor` - Default, base transform, URL codec and validator of one field

mod schema;
mod terminal;
mod types;

pub use schema::{
    BaseTransform, ConfigSchema, FieldConstraints, FieldDescriptor, FieldType, UrlDecoder,
    UrlEncoder, UrlValidator,
};

pub use types::{DefaultEnvSource, EnvSource, StoreConfig, StoreConfigBuilder};
