//! Common test utilities for termprofiles integration tests
//!
//! Every integration test binary shares one process-wide store, rooted in a
//! temp directory that lives as long as the process.

#![allow(dead_code)]

use std::path::Path;
use std::sync::{Once, OnceLock};

use termprofiles::{ConfigSchema, ProfileStore, StoreConfig};
use tempfile::TempDir;

static LOGGER: Once = Once::new();
static DATA_DIR: OnceLock<TempDir> = OnceLock::new();

/// Route `log` output through env_logger (enable with `RUST_LOG=debug`)
pub fn init_logging() {
    LOGGER.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Directory holding the shared store's profiles document
pub fn data_dir() -> &'static Path {
    DATA_DIR
        .get_or_init(|| TempDir::new().expect("create temp data dir"))
        .path()
}

/// Configuration of the shared store
pub fn test_config() -> StoreConfig {
    StoreConfig::builder("termprofiles-test")
        .data_dir(data_dir())
        .schema(ConfigSchema::terminal())
        .build()
}

/// The process-wide store, installed on first use
pub fn store() -> &'static ProfileStore {
    init_logging();
    if let Some(store) = ProfileStore::try_instance() {
        return store;
    }
    // Another test may install it between the check and this call
    ProfileStore::init(test_config()).unwrap_or_else(|_| ProfileStore::instance())
}

/// Read the profiles document straight from disk
pub fn document_on_disk(store: &ProfileStore) -> serde_json::Value {
    let text = std::fs::read_to_string(store.profiles_path()).expect("read profiles document");
    serde_json::from_str(&text).expect("parse profiles document")
}
