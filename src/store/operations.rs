//! Profile CRUD, sanitization and diffing

use crate::error::{Error, Result};
use crate::profile::{self, Profile, ProfileCollection};
use crate::storage::StorageBackend;

use super::ProfileStore;
use log::{debug, info};
use serde_json::Value;

impl<S: StorageBackend> ProfileStore<S> {
    /// All profiles, sanitized against the schema, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns an error only if waiting for the initial load fails.
    pub async fn get_profiles(&self) -> Result<ProfileCollection> {
        self.wait_until_loaded().await?;
        Ok(self.sanitized_profiles())
    }

    /// Sorted profile names
    ///
    /// # Errors
    ///
    /// Returns an error only if waiting for the initial load fails.
    pub async fn profile_names(&self) -> Result<Vec<String>> {
        self.wait_until_loaded().await?;
        Ok(self.current_profiles().keys().cloned().collect())
    }

    /// The named profile with the base profile filling absent fields.
    ///
    /// An unknown name yields the base profile itself.
    ///
    /// # Errors
    ///
    /// Returns an error only if waiting for the initial load fails.
    pub async fn get_profile(&self, name: &str) -> Result<Profile> {
        self.wait_until_loaded().await?;
        let stored = self
            .current_profiles()
            .get(name)
            .map(|p| profile::sanitize_profile(&self.config.schema, p))
            .unwrap_or_default();
        Ok(profile::merge_under(&self.get_base_profile(), stored))
    }

    /// Whether a profile named `name` is stored
    ///
    /// # Errors
    ///
    /// Returns an error only if waiting for the initial load fails.
    pub async fn profile_exists(&self, name: &str) -> Result<bool> {
        self.wait_until_loaded().await?;
        Ok(self.current_profiles().contains_key(name))
    }

    /// Store `data` as the profile `name`.
    ///
    /// The stored profile is the base profile with the sanitized `data`
    /// written over it. Any existing profile of that name is replaced in
    /// full; its previous values are not merged in.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be written.
    pub async fn set_profile(&self, name: &str, data: &Value) -> Result<()> {
        self.wait_until_loaded().await?;
        let profile = profile::merge_under(&self.get_base_profile(), self.sanitize_data(data));

        let _writing = self.write_lock.lock().await;
        let mut profiles = (*self.current_profiles()).clone();
        profiles.insert(name.to_string(), profile);
        self.persist(profiles).await?;

        info!("Saved profile '{name}'");
        Ok(())
    }

    /// Remove the profile `name`; nothing happens if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be written.
    pub async fn delete_profile(&self, name: &str) -> Result<()> {
        self.wait_until_loaded().await?;

        let _writing = self.write_lock.lock().await;
        let mut profiles = (*self.current_profiles()).clone();
        if profiles.remove(name).is_none() {
            debug!("Profile '{name}' does not exist, nothing to delete");
            return Ok(());
        }
        self.persist(profiles).await?;

        info!("Deleted profile '{name}'");
        Ok(())
    }

    /// Move the profile `from` to the name `to`
    ///
    /// # Errors
    ///
    /// - [`Error::ProfileNotFound`] if `from` does not exist
    /// - [`Error::ProfileAlreadyExists`] if `to` is taken
    /// - a write error if the document cannot be written
    pub async fn rename_profile(&self, from: &str, to: &str) -> Result<()> {
        self.wait_until_loaded().await?;

        let _writing = self.write_lock.lock().await;
        let mut profiles = (*self.current_profiles()).clone();
        if !profiles.contains_key(from) {
            return Err(Error::ProfileNotFound(from.to_string()));
        }
        if from == to {
            return Ok(());
        }
        if profiles.contains_key(to) {
            return Err(Error::ProfileAlreadyExists(to.to_string()));
        }

        if let Some(moved) = profiles.remove(from) {
            profiles.insert(to.to_string(), moved);
        }
        self.persist(profiles).await?;

        info!("Renamed profile '{from}' to '{to}'");
        Ok(())
    }

    /// Project `data` down to the schema's profile keys present in it
    pub fn sanitize_data(&self, data: &Value) -> Profile {
        profile::sanitize(&self.config.schema, data)
    }

    /// Keys added or changed between two profiles, with their new values
    pub fn diff_profiles(&self, old: &Profile, new: &Profile) -> Profile {
        profile::diff(old, new)
    }
}
