// Shared menu state
//
// RunningState is the one piece of state the menu writes. It is an explicit
// cell handed to both the controller and the view; the view re-renders from a
// watch subscription instead of being poked through a string-keyed setter.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// Whether program execution is currently in progress
#[derive(Debug, Clone)]
pub struct RunningState {
    tx: Arc<watch::Sender<bool>>,
}

impl RunningState {
    /// Create a new cell, initially not running
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Current value
    pub fn get(&self) -> bool {
        *self.tx.borrow()
    }

    /// Store a new value and notify subscribers
    ///
    /// Subscribers are notified on every write, including writes that store
    /// the value already held.
    pub fn set(&self, running: bool) {
        let previous = self.tx.send_replace(running);
        if previous != running {
            tracing::debug!(running, "running state changed");
        }
    }

    /// Subscribe to changes (used by views to re-render)
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

impl Default for RunningState {
    fn default() -> Self {
        Self::new()
    }
}

/// Liveness token for work scheduled by a mounted menu
///
/// Deferred callbacks hold a clone and check it before touching state, so a
/// reset scheduled just before unmount cannot land after it.
#[derive(Debug, Clone)]
pub struct Liveness(Arc<AtomicBool>);

impl Liveness {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_alive(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Mark every clone of this token dead
    pub fn revoke(&self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}
