//! # Linchpin Core Registry Errors
//!
//! Defines error types specific to the dependency-graph registry.
//!
//! [`RegistryError`] covers the configuration errors surfaced synchronously
//! by graph mutation and registration: duplicate components, unknown ids,
//! duplicate edges, and edges that would close a dependency cycle.
//! [`CleanupError`] is the failure a cleanup action reports during
//! teardown; it is collected by the scheduler rather than propagated.
use serde::Serialize;
use thiserror::Error;

use crate::registry::component::ComponentId;

#[derive(Debug, Error)]
pub enum RegistryError {
    /// The component id is already present in the graph (alive or not).
    #[error("component '{0}' is already registered")]
    AlreadyRegistered(ComponentId),

    /// An operation referenced an id that is not in the graph.
    #[error("component '{0}' is not registered in the dependency graph")]
    UnknownComponent(ComponentId),

    /// At most one edge may exist between any ordered pair.
    #[error("dependency '{prerequisite}' -> '{dependent}' is already registered")]
    DuplicateEdge {
        prerequisite: ComponentId,
        dependent: ComponentId,
    },

    /// Inserting the edge would make the dependency relation cyclic.
    #[error("registering dependency '{prerequisite}' -> '{dependent}' would produce a cycle in the dependency graph")]
    CycleDetected {
        prerequisite: ComponentId,
        dependent: ComponentId,
    },

    /// An edge step of a registration failed. Names the offending pair;
    /// the underlying graph error is carried as the source.
    #[error("failed to register dependency '{prerequisite}' -> '{dependent}'")]
    EdgeRejected {
        prerequisite: ComponentId,
        dependent: ComponentId,
        #[source]
        source: Box<RegistryError>,
    },
}

/// Failure reported by a cleanup action during teardown.
#[derive(Debug, Clone, Error, Serialize)]
#[error("cleanup failed: {message}")]
pub struct CleanupError {
    message: String,
}

impl CleanupError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<String> for CleanupError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

impl From<&str> for CleanupError {
    fn from(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}
