//! Base-profile derivation

use crate::profile::Profile;
use crate::storage::StorageBackend;
use crate::sync::RwLockExt;

use super::ProfileStore;
use log::debug;

impl<S: StorageBackend> ProfileStore<S> {
    /// Copy of the current base profile.
    ///
    /// Does not wait for profiles to load; the base profile depends only on
    /// the schema.
    pub fn get_base_profile(&self) -> Profile {
        self.base.read_recovered().current.clone()
    }

    /// Copy of the base profile the last reset replaced
    pub fn previous_base_profile(&self) -> Option<Profile> {
        self.base.read_recovered().previous.clone()
    }

    /// Recompute the base profile and notify `did-reset-base-profile` listeners.
    ///
    /// Each profile field's base transform is applied to the field's value in
    /// the current base profile, then any environment override replaces the
    /// result. Repeated calls are idempotent when the transforms are.
    pub fn reset_base_profile(&self) {
        let next = {
            let mut base = self.base.write_recovered();
            let previous = base.current.clone();

            let next: Profile = self
                .config
                .schema
                .profile_fields()
                .map(|field| {
                    let prior = previous.get(field.key()).unwrap_or(field.default_value());
                    let value = self
                        .env_handler
                        .get_env_override(field)
                        .unwrap_or_else(|| field.base_value(prior));
                    (field.key().to_string(), value)
                })
                .collect();

            base.previous = Some(previous);
            base.current = next.clone();
            next
        };

        debug!("Base profile reset ({} fields)", next.len());
        self.events.emit_reset(&next);
    }
}
