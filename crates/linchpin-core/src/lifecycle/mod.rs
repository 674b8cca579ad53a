//! # Linchpin Core Lifecycle
//!
//! The `lifecycle` module is the externally visible get-or-create surface
//! over the registry.
//!
//! Callers declare each component once — its id, its ordered prerequisite
//! ids, and a constructor — and then [`LifecycleManager`](manager::LifecycleManager)
//! hands out shared instances on demand, forcing prerequisites into
//! existence first and recording every component and edge in the
//! dependency graph. Shutdown walks the graph back down in reverse
//! dependency order.
use std::any::Any;
use std::fmt::Debug;

use async_trait::async_trait;

use crate::error::Result;
use crate::registry::ComponentId;

pub mod error;
pub mod manager;

pub use error::LifecycleError;
pub use manager::{ComponentConstructor, LifecycleManager};

/// Lifecycle trait for all managed components.
///
/// Implementations are constructed at most once per process by the
/// [`LifecycleManager`](manager::LifecycleManager) and shared as
/// `Arc<dyn ManagedComponent>`; the `Any` bound allows downcast back to
/// the concrete type.
#[async_trait]
pub trait ManagedComponent: Any + Send + Sync + Debug {
    /// The component's stable id. Must match the id it was declared under.
    fn id(&self) -> ComponentId;

    /// Called once, after construction and before the component becomes
    /// visible to other callers. Prerequisites are already built and
    /// initialized at this point.
    async fn initialize(&self) -> Result<()> {
        Ok(())
    }

    /// Called exactly once at teardown, after every component that depends
    /// on this one has already been stopped.
    async fn stop(&self) -> Result<()>;
}

// Test module declaration
#[cfg(test)]
mod tests;
