//! Load gate: the point every profile read and write waits on
//!
//! The gate publishes a [`LoadState`] on a `tokio::sync::watch` channel.
//! Waiters park until the state leaves `Loading`; every waiter parked during
//! a load is released by the same state change. Each reload arms the gate
//! with a [`PendingLoad`] token, and the gate settles only once every armed
//! token is finished.

use crate::sync::RwLockExt;

use std::sync::RwLock;
use tokio::sync::watch;

/// Lifecycle of the store's profile collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// Nothing has been read yet
    Uninitialized,
    /// A reload is in flight
    Loading,
    /// Profiles have been read (or created) at least once
    Ready,
}

#[derive(Debug, Default)]
struct GateCounters {
    in_flight: usize,
    loaded_once: bool,
}

pub(crate) struct LoadGate {
    state: watch::Sender<LoadState>,
    counters: RwLock<GateCounters>,
}

impl LoadGate {
    pub(crate) fn new() -> Self {
        let (state, _) = watch::channel(LoadState::Uninitialized);
        Self {
            state,
            counters: RwLock::new(GateCounters::default()),
        }
    }

    pub(crate) fn state(&self) -> LoadState {
        *self.state.borrow()
    }

    /// Re-arm the gate for a new load
    pub(crate) fn arm(&self) -> PendingLoad<'_> {
        let mut counters = self.counters.write_recovered();
        self.arm_locked(&mut counters)
    }

    /// Arm the gate for the initial load, unless a load already happened or
    /// is in flight
    pub(crate) fn arm_initial(&self) -> Option<PendingLoad<'_>> {
        let mut counters = self.counters.write_recovered();
        if counters.loaded_once || counters.in_flight > 0 {
            return None;
        }
        Some(self.arm_locked(&mut counters))
    }

    fn arm_locked(&self, counters: &mut GateCounters) -> PendingLoad<'_> {
        counters.in_flight += 1;
        self.state.send_replace(LoadState::Loading);
        PendingLoad {
            gate: self,
            completed: false,
        }
    }

    fn finish(&self, completed: bool) {
        let mut counters = self.counters.write_recovered();
        counters.in_flight = counters.in_flight.saturating_sub(1);
        counters.loaded_once |= completed;
        if counters.in_flight == 0 {
            let settled = if counters.loaded_once {
                LoadState::Ready
            } else {
                LoadState::Uninitialized
            };
            self.state.send_replace(settled);
        }
    }

    /// Wait until no load is in flight and return the settled state
    pub(crate) async fn settled(&self) -> LoadState {
        let mut rx = self.state.subscribe();
        // The sender lives in `self`, so the channel stays open while we wait
        let settled = match rx.wait_for(|state| *state != LoadState::Loading).await {
            Ok(state) => *state,
            Err(_) => self.state(),
        };
        settled
    }
}

/// An armed load; settles the gate when completed or dropped
///
/// Dropping it without calling [`complete`](Self::complete) (for example
/// because the reload future was cancelled) settles the gate back to its
/// previous state: `Ready` if anything was ever loaded, `Uninitialized`
/// otherwise, so the next caller retries the load.
pub(crate) struct PendingLoad<'a> {
    gate: &'a LoadGate,
    completed: bool,
}

impl PendingLoad<'_> {
    pub(crate) fn complete(mut self) {
        self.completed = true;
    }
}

impl Drop for PendingLoad<'_> {
    fn drop(&mut self) {
        self.gate.finish(self.completed);
    }
}
