//! Linchpin: dependency-ordered lifecycle for process-wide components.
//!
//! Components declare the components they depend on; the runtime builds
//! prerequisites before dependents, refuses any dependency that would
//! close a cycle, and tears everything down in reverse dependency order.

pub mod error;
pub mod lifecycle;
pub mod registry;

// Re-export key public types/traits for easier use by binaries and
// component implementations.
pub use error::{Error, Result};
pub use lifecycle::{ComponentConstructor, LifecycleError, LifecycleManager, ManagedComponent};
pub use registry::{
    CleanupAction, CleanupError, CleanupFailure, ComponentId, DependencyGraph, NoopCleanup,
    Registrar, RegistryError, TeardownReport, TeardownScheduler,
};
