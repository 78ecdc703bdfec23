//! Execution graph seam
//!
//! The menu only needs two things from the program engine: the ordered
//! entry points ("crumbs") it could start from, and a way to start running
//! one of them. [`program::Program`] is the in-memory engine the binary uses.

pub mod program;

use futures::future::BoxFuture;
use futures::FutureExt;
use std::fmt;

pub use program::Program;

/// Identifier of a node in the execution graph
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A node execution can start from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPoint {
    pub id: NodeId,
}

impl EntryPoint {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: NodeId::new(id),
        }
    }
}

/// Resolves when a started run has finished
pub type RunCompletion = BoxFuture<'static, ()>;

/// A completion that is already resolved
pub fn completed() -> RunCompletion {
    futures::future::ready(()).boxed()
}

/// Program engine as seen by the menu
pub trait ExecutionGraph: Send + Sync {
    /// Entry points in execution order
    fn entry_points(&self) -> Vec<EntryPoint>;

    /// Start executing from `id`
    ///
    /// Starting is synchronous; the returned future tracks completion and may
    /// be dropped by callers that do not care.
    fn run(&self, id: &NodeId) -> RunCompletion;
}
