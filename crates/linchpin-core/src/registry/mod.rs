//! # Linchpin Core Registry
//!
//! The `registry` module is the dependency-graph engine: component
//! registration, cycle-safe dependency-edge insertion, and order-correct
//! teardown scheduling.
//!
//! ## Key Responsibilities & Components:
//!
//! - **Component Records**: identity, liveness, and one-shot cleanup for
//!   each registered component, via [`ComponentRecord`](component::ComponentRecord)
//!   and the [`CleanupAction`](component::CleanupAction) trait in the
//!   `component` submodule.
//! - **Graph Storage & Cycle Detection**: the directed
//!   prerequisite -> dependent graph, with atomic check-then-insert edge
//!   validation ([`DependencyGraph`](graph::DependencyGraph) in `graph`).
//! - **Registration**: a component plus its declared edges registered as
//!   one logical unit ([`Registrar`](registrar::Registrar) in `registrar`).
//! - **Teardown Scheduling**: reverse-dependency-order deletion plans and
//!   failure-collecting execution ([`TeardownScheduler`](teardown::TeardownScheduler)
//!   in `teardown`).
//! - **Error Handling**: registry-specific error types in the `error`
//!   submodule.
//!
//! The graph is a single shared resource: callers serialize every mutation
//! (and the cycle check guarding it) behind one exclusive critical section,
//! which the `&mut self` APIs here make the borrow checker enforce.
pub mod component;
pub mod error;
pub mod graph;
pub mod registrar;
pub mod teardown;

pub use component::{CleanupAction, ComponentId, ComponentRecord, NoopCleanup};
pub use error::{CleanupError, RegistryError};
pub use graph::DependencyGraph;
pub use registrar::Registrar;
pub use teardown::{CleanupFailure, TeardownReport, TeardownScheduler};
