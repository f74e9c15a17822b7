//! Change notifications for the profile store
//!
//! Two events are published: `did-reload-profiles` after every reload and
//! `did-reset-base-profile` after every base-profile reset. Registering a
//! callback returns a [`Subscription`]; dropping it keeps the callback
//! registered, calling [`Subscription::unsubscribe`] removes it.

use crate::profile::{Profile, ProfileCollection};
use crate::sync::RwLockExt;

use std::fmt;
use std::sync::{Arc, RwLock, Weak};

/// Callback receiving the sanitized profile collection
pub type ReloadCallback = Arc<dyn Fn(&ProfileCollection) + Send + Sync>;

/// Callback receiving the new base profile
pub type ResetCallback = Arc<dyn Fn(&Profile) + Send + Sync>;

/// Event names published by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileEvent {
    /// Profiles were (re)read from disk
    DidReloadProfiles,
    /// The base profile was recomputed
    DidResetBaseProfile,
}

impl ProfileEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            ProfileEvent::DidReloadProfiles => "did-reload-profiles",
            ProfileEvent::DidResetBaseProfile => "did-reset-base-profile",
        }
    }
}

impl fmt::Display for ProfileEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Default)]
struct Listeners {
    next_id: u64,
    reload: Vec<(u64, ReloadCallback)>,
    reset: Vec<(u64, ResetCallback)>,
}

impl Listeners {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Handle returned by a registration; removes the callback on `unsubscribe`
#[must_use = "dropping a Subscription keeps the callback registered; keep it to unsubscribe later"]
pub struct Subscription {
    id: u64,
    event: ProfileEvent,
    listeners: Weak<RwLock<Listeners>>,
}

impl Subscription {
    /// Event this subscription listens to
    pub fn event(&self) -> ProfileEvent {
        self.event
    }

    /// Remove the callback
    ///
    /// Returns false if it was already gone (or the store was dropped).
    pub fn unsubscribe(self) -> bool {
        let Some(listeners) = self.listeners.upgrade() else {
            return false;
        };
        let mut guard = listeners.write_recovered();
        let before = guard.reload.len() + guard.reset.len();
        match self.event {
            ProfileEvent::DidReloadProfiles => guard.reload.retain(|(id, _)| *id != self.id),
            ProfileEvent::DidResetBaseProfile => guard.reset.retain(|(id, _)| *id != self.id),
        }
        before != guard.reload.len() + guard.reset.len()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("event", &self.event)
            .finish()
    }
}

/// Registry of event listeners
pub(crate) struct EventManager {
    listeners: Arc<RwLock<Listeners>>,
}

impl EventManager {
    pub(crate) fn new() -> Self {
        Self {
            listeners: Arc::new(RwLock::new(Listeners::default())),
        }
    }

    /// Register a `did-reload-profiles` listener
    pub(crate) fn on_did_reload_profiles<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&ProfileCollection) + Send + Sync + 'static,
    {
        let mut guard = self.listeners.write_recovered();
        let id = guard.allocate_id();
        guard.reload.push((id, Arc::new(callback)));
        self.subscription(id, ProfileEvent::DidReloadProfiles)
    }

    /// Register a `did-reset-base-profile` listener
    pub(crate) fn on_did_reset_base_profile<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Profile) + Send + Sync + 'static,
    {
        let mut guard = self.listeners.write_recovered();
        let id = guard.allocate_id();
        guard.reset.push((id, Arc::new(callback)));
        self.subscription(id, ProfileEvent::DidResetBaseProfile)
    }

    fn subscription(&self, id: u64, event: ProfileEvent) -> Subscription {
        Subscription {
            id,
            event,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    /// Notify every reload listener, in registration order
    ///
    /// The listener list is snapshotted first, so callbacks may register or
    /// unsubscribe without deadlocking.
    pub(crate) fn emit_reload(&self, profiles: &ProfileCollection) {
        let callbacks: Vec<ReloadCallback> = {
            let guard = self.listeners.read_recovered();
            guard.reload.iter().map(|(_, cb)| cb.clone()).collect()
        };
        for callback in callbacks {
            callback(profiles);
        }
    }

    /// Notify every base-profile-reset listener, in registration order
    pub(crate) fn emit_reset(&self, base_profile: &Profile) {
        let callbacks: Vec<ResetCallback> = {
            let guard = self.listeners.read_recovered();
            guard.reset.iter().map(|(_, cb)| cb.clone()).collect()
        };
        for callback in callbacks {
            callback(base_profile);
        }
    }

    /// Number of listeners registered for `event`
    pub(crate) fn listener_count(&self, event: ProfileEvent) -> usize {
        let guard = self.listeners.read_recovered();
        match event {
            ProfileEvent::DidReloadProfiles => guard.reload.len(),
            ProfileEvent::DidResetBaseProfile => guard.reset.len(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
