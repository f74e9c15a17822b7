//! Store configuration and its builder

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use super::schema::ConfigSchema;
use crate::storage::{JsonStorage, StorageBackend};

/// Source of environment variables
///
/// The process environment by default; tests substitute a fixed map.
pub trait EnvSource: Send + Sync {
    fn var(&self, key: &str) -> Option<String>;
}

/// Reads from the process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultEnvSource;

impl EnvSource for DefaultEnvSource {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Configuration for the profile store
pub struct StoreConfig<S: StorageBackend = JsonStorage> {
    /// Directory holding the profiles document
    pub data_dir: PathBuf,

    /// File name of the profiles document (e.g., "profiles.json")
    pub profiles_file: String,

    /// Application name (used for the default data directory)
    pub app_name: String,

    /// Storage backend implementation
    pub storage: S,

    /// Field descriptors driving defaults, sanitization and the URI codec
    pub schema: ConfigSchema,

    /// Prefix for base-profile environment overrides (e.g., "XTERM" -> XTERM_FONT_SIZE)
    /// If None, env var overrides are disabled
    pub env_prefix: Option<String>,

    /// Where env overrides are read from
    pub env_source: Arc<dyn EnvSource>,

    /// Upper bound on waiting for profiles to load; None waits indefinitely
    pub load_timeout: Option<Duration>,
}

impl Default for StoreConfig<JsonStorage> {
    fn default() -> Self {
        StoreConfigBuilder::new("x-terminal").build()
    }
}

impl<S: StorageBackend> StoreConfig<S> {
    /// Get the full path to the profiles document
    pub fn profiles_path(&self) -> PathBuf {
        self.data_dir.join(&self.profiles_file)
    }

    /// Swap the storage backend, keeping every other setting
    pub fn with_storage<T: StorageBackend>(self, storage: T) -> StoreConfig<T> {
        StoreConfig {
            data_dir: self.data_dir,
            profiles_file: self.profiles_file,
            app_name: self.app_name,
            storage,
            schema: self.schema,
            env_prefix: self.env_prefix,
            env_source: self.env_source,
            load_timeout: self.load_timeout,
        }
    }
}

impl<S: StorageBackend> fmt::Debug for StoreConfig<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("data_dir", &self.data_dir)
            .field("profiles_file", &self.profiles_file)
            .field("app_name", &self.app_name)
            .field("schema", &self.schema)
            .field("env_prefix", &self.env_prefix)
            .field("load_timeout", &self.load_timeout)
            .finish_non_exhaustive()
    }
}

impl StoreConfig<JsonStorage> {
    /// Create a new builder for StoreConfig
    ///
    /// # Example
    /// ```rust
    /// use termprofiles::StoreConfig;
    ///
    /// let config = StoreConfig::builder("x-terminal")
    ///     .data_dir("/tmp/x-terminal")
    ///     .build();
    ///
    /// assert!(config.profiles_path().ends_with("profiles.json"));
    /// ```
    pub fn builder(app_name: impl Into<String>) -> StoreConfigBuilder {
        StoreConfigBuilder::new(app_name)
    }
}

/// Builder for creating StoreConfig with a fluent API
#[derive(Clone)]
pub struct StoreConfigBuilder {
    data_dir: Option<PathBuf>,
    profiles_file: Option<String>,
    app_name: String,
    pretty_json: bool,
    schema: ConfigSchema,
    env_prefix: Option<String>,
    env_source: Option<Arc<dyn EnvSource>>,
    load_timeout: Option<Duration>,
}

impl fmt::Debug for StoreConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfigBuilder")
            .field("data_dir", &self.data_dir)
            .field("profiles_file", &self.profiles_file)
            .field("app_name", &self.app_name)
            .field("pretty_json", &self.pretty_json)
            .field("env_prefix", &self.env_prefix)
            .field("env_source", &self.env_source.as_ref().map(|_| "Some(EnvSource)"))
            .field("load_timeout", &self.load_timeout)
            .finish_non_exhaustive()
    }
}

impl StoreConfigBuilder {
    /// Create a new builder with the built-in terminal schema
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            data_dir: None,
            profiles_file: None,
            app_name: app_name.into(),
            pretty_json: true,
            schema: ConfigSchema::terminal(),
            env_prefix: None,
            env_source: None,
            load_timeout: None,
        }
    }

    /// Set the data directory holding the profiles document
    ///
    /// Supports `~` expansion for home directory.
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        let path: PathBuf = path.into();
        let expanded = if path.starts_with("~") {
            match (dirs::home_dir(), path.strip_prefix("~")) {
                (Some(home), Ok(rest)) => home.join(rest),
                _ => path,
            }
        } else {
            path
        };
        self.data_dir = Some(expanded);
        self
    }

    /// Set the profiles filename (default: "profiles.json")
    pub fn profiles_file(mut self, filename: impl Into<String>) -> Self {
        self.profiles_file = Some(filename.into());
        self
    }

    /// Use compact JSON (no pretty printing)
    pub fn compact_json(mut self) -> Self {
        self.pretty_json = false;
        self
    }

    /// Replace the built-in terminal schema
    pub fn schema(mut self, schema: ConfigSchema) -> Self {
        self.schema = schema;
        self
    }

    /// Enable environment variable overrides of the base profile
    ///
    /// The format is `{PREFIX}_{KEY}` with the key upper-snake-cased, so
    /// with prefix `XTERM` the `fontSize` field reads `XTERM_FONT_SIZE`.
    /// Values are decoded with the field's URL codec.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Read env overrides from `source` instead of the process environment
    pub fn env_source(mut self, source: impl EnvSource + 'static) -> Self {
        self.env_source = Some(Arc::new(source));
        self
    }

    /// Fail gated calls with `LoadTimeout` if loading takes longer than `timeout`
    pub fn load_timeout(mut self, timeout: Duration) -> Self {
        self.load_timeout = Some(timeout);
        self
    }

    /// Build the StoreConfig
    ///
    /// If `data_dir` is not set, uses the system data directory for the app.
    pub fn build(self) -> StoreConfig<JsonStorage> {
        let data_dir = self.data_dir.unwrap_or_else(|| {
            dirs::data_dir()
                .map(|d| d.join(&self.app_name))
                .unwrap_or_else(|| PathBuf::from("."))
        });

        let storage = if self.pretty_json {
            JsonStorage::new()
        } else {
            JsonStorage::compact()
        };

        let profiles_file = self
            .profiles_file
            .unwrap_or_else(|| format!("profiles.{}", storage.extension()));

        StoreConfig {
            data_dir,
            profiles_file,
            app_name: self.app_name,
            storage,
            schema: self.schema,
            env_prefix: self.env_prefix,
            env_source: self
                .env_source
                .unwrap_or_else(|| Arc::new(DefaultEnvSource)),
            load_timeout: self.load_timeout,
        }
    }
}
