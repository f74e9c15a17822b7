//! Error types for termprofiles

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for termprofiles operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the profile store
#[derive(Error, Debug)]
pub enum Error {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("Failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create directory '{path}': {source}")]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Profiles file '{path}' could not be read; refusing to overwrite it")]
    ProfilesUnreadable { path: PathBuf },

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Failed to serialize data: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to parse profiles: {0}")]
    Parse(String),

    // -------------------------------------------------------------------------
    // Store Errors
    // -------------------------------------------------------------------------
    #[error("Profile store already constructed; use ProfileStore::instance()")]
    IllegalConstruction,

    #[error("Timed out after {0:?} waiting for profiles to load")]
    LoadTimeout(Duration),

    // -------------------------------------------------------------------------
    // Profile Errors
    // -------------------------------------------------------------------------
    #[error("Profile '{0}' not found")]
    ProfileNotFound(String),

    #[error("Profile '{0}' already exists")]
    ProfileAlreadyExists(String),

    #[error("Invalid profile URI '{uri}': {reason}")]
    InvalidUri { uri: String, reason: String },

    // -------------------------------------------------------------------------
    // Schema Errors
    // -------------------------------------------------------------------------
    #[error("Invalid field descriptor for {key}: {reason}")]
    InvalidField { key: String, reason: String },
}

impl Error {
    /// Check if this is a "not found" type error
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::FileRead { source, .. } => source.kind() == std::io::ErrorKind::NotFound,
            Error::ProfileNotFound(_) => true,
            _ => false,
        }
    }

    /// Check if this error came from writing to the persistence backend
    #[must_use]
    pub fn is_persistence_error(&self) -> bool {
        matches!(
            self,
            Error::FileWrite { .. }
                | Error::DirectoryCreate { .. }
                | Error::ProfilesUnreadable { .. }
                | Error::Serialize(_)
        )
    }
}
