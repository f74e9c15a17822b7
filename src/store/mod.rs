//! The profile store
//!
//! This module contains [`ProfileStore`], the single in-memory source of
//! truth for terminal profiles. Its methods are spread over submodules:
//!
//! - `io` - loading, the load gate, persistence
//! - `operations` - profile CRUD, sanitization and diffing
//! - `base` - base-profile derivation and environment overrides
//! - `uri` - encoding profiles to and from `x-terminal://` URIs

mod base;
mod env;
mod io;
mod operations;
mod uri;


pub use uri::X_TERMINAL_BASE_URI;

use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::events::EventManager;
use crate::gate::LoadGate;
use crate::profile::{Profile, ProfileCollection};
use crate::storage::{JsonStorage, StorageBackend};

use env::EnvironmentHandler;
use log::debug;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, OnceLock, RwLock};

static INSTANCE: OnceLock<ProfileStore> = OnceLock::new();

/// Current and previous base profile
#[derive(Debug, Clone, Default)]
pub(crate) struct BaseProfiles {
    pub(crate) current: Profile,
    pub(crate) previous: Option<Profile>,
}

/// Process-wide store of named terminal profiles.
///
/// The store holds the profile collection read from `profiles.json`, the
/// base profile derived from the schema, and the load gate every profile
/// read or write waits on. Obtain it through [`ProfileStore::instance`] (default
/// configuration) or install a custom configuration once with
/// [`ProfileStore::init`]; there is no other way to construct one.
///
/// # Example
///
/// ```rust,no_run
/// use termprofiles::{ProfileStore, StoreConfig};
/// use serde_json::json;
///
/// # async fn example() -> termprofiles::Result<()> {
/// let store = ProfileStore::init(
///     StoreConfig::builder("x-terminal")
///         .data_dir("~/.x-terminal")
///         .build(),
/// )?;
///
/// store.set_profile("work", &json!({"shellCommand": "/bin/zsh"})).await?;
/// let work = store.get_profile("work").await?;
/// assert_eq!(work["shellCommand"], json!("/bin/zsh"));
///
/// let url = store.generate_new_url_from_profile_data(&json!(work))?;
/// let decoded = store.create_profile_data_from_uri(url.as_str())?;
/// assert_eq!(decoded["shellCommand"], json!("/bin/zsh"));
/// # Ok(())
/// # }
/// ```
pub struct ProfileStore<S: StorageBackend = JsonStorage> {
    /// Configuration
    pub(crate) config: StoreConfig<S>,

    /// Storage backend (defaults to `JsonStorage`)
    pub(crate) storage: S,

    /// Full path of the profiles document
    pub(crate) profiles_path: PathBuf,

    /// In-memory mirror of the document, replaced wholesale after each write
    pub(crate) profiles: RwLock<Arc<ProfileCollection>>,

    /// Base profile and the value it replaced
    pub(crate) base: RwLock<BaseProfiles>,

    /// Gate every profile read/write waits on
    pub(crate) gate: LoadGate,

    /// Serializes overlapping reloads
    pub(crate) reload_lock: tokio::sync::Mutex<()>,

    /// Serializes read-modify-write cycles on the collection
    pub(crate) write_lock: tokio::sync::Mutex<()>,

    /// Set while the document exists but could not be read; blocks writes
    pub(crate) read_failed: AtomicBool,

    /// Reload and reset listeners
    pub(crate) events: EventManager,

    /// Base-profile overrides from environment variables
    pub(crate) env_handler: EnvironmentHandler,
}

impl ProfileStore<JsonStorage> {
    /// The process-wide store.
    ///
    /// Constructed on first access from [`StoreConfig::default`] unless
    /// [`ProfileStore::init`] ran first. Profiles are read lazily, by the
    /// first call that needs them.
    pub fn instance() -> &'static ProfileStore {
        INSTANCE.get_or_init(|| ProfileStore::new(StoreConfig::default()))
    }

    /// Install the process-wide store with an explicit configuration.
    ///
    /// # Errors
    ///
    /// - [`Error::IllegalConstruction`] if the store already exists
    /// - [`Error::InvalidField`] if the schema is malformed
    pub fn init(config: StoreConfig) -> Result<&'static ProfileStore> {
        config.schema.validate()?;

        let mut installed = false;
        let store = INSTANCE.get_or_init(|| {
            installed = true;
            ProfileStore::new(config)
        });

        if installed {
            Ok(store)
        } else {
            Err(Error::IllegalConstruction)
        }
    }

    /// The process-wide store, if it has been constructed
    pub fn try_instance() -> Option<&'static ProfileStore> {
        INSTANCE.get()
    }
}

impl<S: StorageBackend> ProfileStore<S> {
    pub(crate) fn new(config: StoreConfig<S>) -> Self {
        let storage = config.storage.clone();
        let profiles_path = config.profiles_path();
        let env_handler =
            EnvironmentHandler::new(config.env_prefix.clone(), config.env_source.clone());
        let base = BaseProfiles {
            current: config.schema.default_profile(),
            previous: None,
        };

        let store = Self {
            config,
            storage,
            profiles_path,
            profiles: RwLock::new(Arc::new(ProfileCollection::new())),
            base: RwLock::new(base),
            gate: LoadGate::new(),
            reload_lock: tokio::sync::Mutex::new(()),
            write_lock: tokio::sync::Mutex::new(()),
            read_failed: AtomicBool::new(false),
            events: EventManager::new(),
            env_handler,
        };
        store.reset_base_profile();

        debug!(
            "Profile store created for '{}' at {}",
            store.config.app_name,
            store.profiles_path.display()
        );
        store
    }

    /// Path of the profiles document
    pub fn profiles_path(&self) -> &std::path::Path {
        &self.profiles_path
    }

    /// Schema the store was built with
    pub fn schema(&self) -> &crate::config::ConfigSchema {
        &self.config.schema
    }

    /// Current state of the load gate
    pub fn load_state(&self) -> crate::gate::LoadState {
        self.gate.state()
    }

    /// Number of listeners currently registered for `event`
    pub fn listener_count(&self, event: crate::events::ProfileEvent) -> usize {
        self.events.listener_count(event)
    }

    /// Register a `did-reload-profiles` listener
    ///
    /// The callback receives the sanitized collection after every reload.
    pub fn on_did_reload_profiles<F>(&self, callback: F) -> crate::events::Subscription
    where
        F: Fn(&ProfileCollection) + Send + Sync + 'static,
    {
        self.events.on_did_reload_profiles(callback)
    }

    /// Register a `did-reset-base-profile` listener
    ///
    /// The callback receives the new base profile after every reset.
    pub fn on_did_reset_base_profile<F>(&self, callback: F) -> crate::events::Subscription
    where
        F: Fn(&Profile) + Send + Sync + 'static,
    {
        self.events.on_did_reset_base_profile(callback)
    }
}
