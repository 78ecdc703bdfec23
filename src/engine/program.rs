// In-memory program engine
//
// Holds the crumb list (entry points) and simulates execution: a run takes
// `step_delay` on the tokio runtime and then resolves its completion. Every
// started run is recorded so the host and tests can inspect what the menu
// asked for.

use super::{completed, EntryPoint, ExecutionGraph, NodeId, RunCompletion};
use crate::config::ProgramConfig;
use futures::FutureExt;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::oneshot;

/// In-memory execution graph
#[derive(Debug)]
pub struct Program {
    crumbs: Mutex<Vec<EntryPoint>>,
    runs: Mutex<Vec<NodeId>>,
    step_delay: Duration,
}

impl Program {
    /// Create a program with the given crumbs
    pub fn new(crumbs: Vec<EntryPoint>, step_delay: Duration) -> Self {
        Self {
            crumbs: Mutex::new(crumbs),
            runs: Mutex::new(Vec::new()),
            step_delay,
        }
    }

    /// Create from the `[program]` config section
    pub fn from_config(config: &ProgramConfig) -> Self {
        let crumbs = config
            .entry_points
            .iter()
            .map(|id| EntryPoint::new(id.as_str()))
            .collect();
        Self::new(crumbs, Duration::from_millis(config.step_delay_ms))
    }

    /// Enqueue a crumb at the end of the list
    pub fn push_crumb(&self, id: impl Into<String>) {
        self.crumbs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(EntryPoint::new(id));
    }

    /// Drop every crumb
    pub fn clear_crumbs(&self) {
        self.crumbs.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }

    /// Nodes that runs were started from, oldest first
    pub fn runs(&self) -> Vec<NodeId> {
        self.runs.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl ExecutionGraph for Program {
    fn entry_points(&self) -> Vec<EntryPoint> {
        self.crumbs.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn run(&self, id: &NodeId) -> RunCompletion {
        self.runs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(id.clone());
        tracing::info!(node = %id, "program run started");

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(node = %id, "no async runtime; run completes immediately");
            return completed();
        };

        let (done_tx, done_rx) = oneshot::channel();
        let node = id.clone();
        let delay = self.step_delay;
        handle.spawn(async move {
            tokio::time::sleep(delay).await;
            tracing::info!(node = %node, elapsed_ms = delay.as_millis() as u64, "program run finished");
            let _ = done_tx.send(());
        });

        async move {
            // Sender dropped means the runtime shut down mid-run; treat as finished
            let _ = done_rx.await;
        }
        .boxed()
    }
}
