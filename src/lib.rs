//! # termprofiles - Terminal profile store
//!
//! A process-wide store of named terminal profiles, persisted as a single
//! JSON document, with a schema-driven base profile and an `x-terminal://`
//! URI codec for sharing profiles.
//!
//! ## Features
//!
//! - **Profiles**: Named, sanitized profile records (`set`, `get`, `delete`, `rename`)
//! - **Base Profile**: Every profile is completed from a base profile derived from the schema
//! - **Load Gate**: Every read and write waits until the document has been loaded once
//! - **URI Codec**: Encode profiles to `x-terminal://<uuid>/?key=value` URIs and back
//! - **Notifications**: `did-reload-profiles` and `did-reset-base-profile` listeners
//! - **Environment Overrides**: `PREFIX_FIELD_NAME` variables replace base-profile values
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use termprofiles::{ProfileStore, StoreConfig};
//! use serde_json::json;
//!
//! # async fn example() -> termprofiles::Result<()> {
//! let store = ProfileStore::init(
//!     StoreConfig::builder("x-terminal")
//!         .data_dir("~/.x-terminal")
//!         .with_env_prefix("XTERM")
//!         .build(),
//! )?;
//!
//! store.set_profile("work", &json!({"cwd": "/srv/work", "fontSize": 16})).await?;
//! for name in store.profile_names().await? {
//!     println!("{name}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Defining a Schema
//!
//! The schema is an ordered table of field descriptors. Each descriptor
//! carries a default, a base-profile transform, a URL codec and a
//! validator; typed constructors supply sensible codecs.
//!
//! ```rust
//! use termprofiles::{ConfigSchema, FieldDescriptor, StoreConfig};
//! use serde_json::{json, Value};
//!
//! let schema = ConfigSchema::new(vec![
//!     FieldDescriptor::text("shellCommand", "/bin/bash"),
//!     FieldDescriptor::list("args", &["-l"]),
//!     FieldDescriptor::number("fontSize", 14).min(1.0).max(100.0),
//!     FieldDescriptor::toggle("copyOnSelect", false),
//!     FieldDescriptor::object("env", Value::Null),
//!     FieldDescriptor::text("userDataPath", "/tmp").not_in_profile(),
//! ]);
//! assert!(schema.validate().is_ok());
//! assert_eq!(schema.default_profile()["fontSize"], json!(14));
//!
//! let config = StoreConfig::builder("my-term").schema(schema).build();
//! assert!(config.profiles_path().ends_with("profiles.json"));
//! ```
//!
//! ## Persistence
//!
//! Profiles are stored as one JSON object keyed by profile name, sorted by
//! name. A missing document is created empty on first load; an unparseable
//! one is copied to `<file>.corrupt` and replaced with an empty document.
//! Writes go to a temp file that is renamed over the target.

mod error;
mod events;
mod gate;
pub mod profile;
pub mod storage;
mod store;
mod sync;

// Configuration
pub mod config;

pub use error::{Error, Result};
pub use events::{ProfileEvent, ReloadCallback, ResetCallback, Subscription};
pub use gate::LoadState;
pub use profile::{Profile, ProfileCollection};
pub use storage::{JsonStorage, StorageBackend};
pub use store::{ProfileStore, X_TERMINAL_BASE_URI};

pub use config::{
    ConfigSchema, DefaultEnvSource, EnvSource, FieldDescriptor, FieldType, StoreConfig,
    StoreConfigBuilder,
};
