//! Loading, the load gate, and persistence

use crate::error::{Error, Result};
use crate::gate::{LoadState, PendingLoad};
use crate::profile::{ProfileCollection, collection_to_document, parse_collection, sanitize_collection};
use crate::storage::StorageBackend;
use crate::sync::RwLockExt;

use super::ProfileStore;
use log::{debug, error, info, warn};
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::Ordering;

/// What to do after the profiles document could not be read
enum ReadRecovery {
    /// Missing: write an empty document
    Create,
    /// Corrupt: keep a copy, then write an empty document
    Replace,
    /// Unreadable for another reason (e.g. permissions): leave the file alone
    LeaveUntouched,
}

impl ReadRecovery {
    fn classify(err: &Error) -> Self {
        match err {
            Error::FileRead { source, .. } => match source.kind() {
                ErrorKind::NotFound => ReadRecovery::Create,
                ErrorKind::InvalidData => ReadRecovery::Replace,
                _ => ReadRecovery::LeaveUntouched,
            },
            Error::Parse(_) => ReadRecovery::Replace,
            _ => ReadRecovery::LeaveUntouched,
        }
    }
}

impl<S: StorageBackend> ProfileStore<S> {
    /// Re-read the profiles document.
    ///
    /// Re-arms the load gate, swaps in the document's profiles, notifies
    /// `did-reload-profiles` listeners with the sanitized collection, then
    /// releases every caller waiting on the gate.
    ///
    /// A missing or corrupt document is treated as "no profiles yet": an
    /// empty collection is persisted in its place (a corrupt file is first
    /// copied to `<file>.corrupt`). Any other read error (such as permission
    /// denied) leaves the file untouched and continues with no profiles;
    /// writes then fail with [`Error::ProfilesUnreadable`] until a reload
    /// reads the document again.
    ///
    /// # Errors
    ///
    /// Returns the write error if persisting the empty collection fails. The
    /// gate is still released, with an empty in-memory collection.
    pub async fn reload_profiles(&self) -> Result<()> {
        self.load(self.gate.arm()).await
    }

    async fn load(&self, pending: PendingLoad<'_>) -> Result<()> {
        let _reloading = self.reload_lock.lock().await;

        debug!("Reloading profiles from {}", self.profiles_path.display());
        let outcome = match self
            .storage
            .read(&self.profiles_path)
            .await
            .and_then(parse_collection)
        {
            Ok(profiles) => {
                info!(
                    "Loaded {} profile(s) from {}",
                    profiles.len(),
                    self.profiles_path.display()
                );
                self.read_failed.store(false, Ordering::SeqCst);
                self.swap_profiles(profiles);
                Ok(())
            }
            Err(err) => self.recover_from_read_failure(err).await,
        };

        let snapshot = self.sanitized_profiles();
        self.events.emit_reload(&snapshot);
        pending.complete();
        outcome
    }

    async fn recover_from_read_failure(&self, err: Error) -> Result<()> {
        let path = self.profiles_path.display();
        match ReadRecovery::classify(&err) {
            ReadRecovery::LeaveUntouched => {
                error!(
                    "Cannot read profiles at {path}: {err}; continuing without profiles, \
                     writes are blocked until a reload succeeds"
                );
                self.read_failed.store(true, Ordering::SeqCst);
                self.swap_profiles(ProfileCollection::new());
                return Ok(());
            }
            ReadRecovery::Create => {
                info!("No profiles at {path}, creating an empty profiles file");
            }
            ReadRecovery::Replace => {
                warn!("Profiles at {path} are corrupt ({err}), replacing with an empty collection");
                self.preserve_corrupt_file().await;
            }
        }

        self.read_failed.store(false, Ordering::SeqCst);
        if let Err(write_err) = self.update_profiles(ProfileCollection::new()).await {
            self.swap_profiles(ProfileCollection::new());
            return Err(write_err);
        }
        Ok(())
    }

    /// Best-effort copy of an unparseable document before it is replaced
    async fn preserve_corrupt_file(&self) {
        let mut backup = self.profiles_path.clone().into_os_string();
        backup.push(".corrupt");
        let backup = PathBuf::from(backup);

        match tokio::fs::copy(&self.profiles_path, &backup).await {
            Ok(_) => info!("Kept corrupt profiles file as {}", backup.display()),
            Err(e) => warn!("Could not keep corrupt profiles file: {e}"),
        }
    }

    /// Sort, persist, then swap in a new collection.
    ///
    /// The in-memory collection is replaced only after the write succeeds,
    /// so readers observe either the old or the new collection. Does not
    /// wait on the load gate.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the document
    /// cannot be written, and [`Error::ProfilesUnreadable`] while the last
    /// reload could not read the existing document.
    pub async fn update_profiles(&self, profiles: ProfileCollection) -> Result<()> {
        let _writing = self.write_lock.lock().await;
        self.persist(profiles).await
    }

    /// Write and swap; callers must hold `write_lock`
    ///
    /// Refuses to write while the last reload could not read an existing
    /// document, so its profiles are not replaced by the in-memory stand-in.
    pub(crate) async fn persist(&self, profiles: ProfileCollection) -> Result<()> {
        if self.read_failed.load(Ordering::SeqCst) {
            return Err(Error::ProfilesUnreadable {
                path: self.profiles_path.clone(),
            });
        }

        if let Some(parent) = self.profiles_path.parent() {
            if !parent.as_os_str().is_empty() {
                self.storage.ensure_dir(parent).await?;
            }
        }

        let document = collection_to_document(&profiles);
        self.storage.write(&self.profiles_path, &document).await?;

        debug!(
            "Wrote {} profile(s) to {}",
            profiles.len(),
            self.profiles_path.display()
        );
        self.swap_profiles(profiles);
        Ok(())
    }

    /// Wait on the load gate, loading first if nothing has been loaded yet
    ///
    /// # Errors
    ///
    /// - [`Error::LoadTimeout`] if a load timeout is configured and elapses
    /// - the write error of an initial load this call had to perform
    pub(crate) async fn wait_until_loaded(&self) -> Result<()> {
        match self.config.load_timeout {
            Some(limit) => tokio::time::timeout(limit, self.wait_for_gate())
                .await
                .map_err(|_| Error::LoadTimeout(limit))?,
            None => self.wait_for_gate().await,
        }
    }

    async fn wait_for_gate(&self) -> Result<()> {
        loop {
            match self.gate.settled().await {
                LoadState::Ready => return Ok(()),
                LoadState::Uninitialized | LoadState::Loading => {
                    // Whoever arms the initial load performs it; the rest wait
                    if let Some(pending) = self.gate.arm_initial() {
                        debug!("Profiles not loaded yet, loading on first access");
                        self.load(pending).await?;
                    }
                }
            }
        }
    }

    pub(crate) fn swap_profiles(&self, profiles: ProfileCollection) {
        *self.profiles.write_recovered() = Arc::new(profiles);
    }

    pub(crate) fn current_profiles(&self) -> Arc<ProfileCollection> {
        self.profiles.read_recovered().clone()
    }

    pub(crate) fn sanitized_profiles(&self) -> ProfileCollection {
        sanitize_collection(&self.config.schema, &self.current_profiles())
    }
}
