//! # Linchpin Core Lifecycle Errors
//!
//! Defines error types specific to the lifecycle facade: missing or
//! duplicate declarations, construction and initialization failures, and
//! use of a manager that has already been shut down.
use thiserror::Error;

use crate::registry::error::RegistryError;
use crate::registry::ComponentId;

#[derive(Debug, Error)]
pub enum LifecycleError {
    /// `access` named a component that was never declared.
    #[error("component '{0}' has not been declared")]
    NotDeclared(ComponentId),

    /// A component id may only be declared once.
    #[error("component '{0}' is already declared")]
    AlreadyDeclared(ComponentId),

    /// The component's constructor returned an error.
    #[error("construction of component '{id}' failed")]
    ConstructionFailed {
        id: ComponentId,
        #[source]
        source: Box<crate::error::Error>,
    },

    /// The constructed instance reported a different id than it was
    /// declared under.
    #[error("component declared as '{declared}' reported id '{reported}'")]
    IdMismatch {
        declared: ComponentId,
        reported: ComponentId,
    },

    /// The component's `initialize` hook returned an error.
    #[error("initialization of component '{id}' failed")]
    InitializationFailed {
        id: ComponentId,
        #[source]
        source: Box<crate::error::Error>,
    },

    /// The instance exists but is not of the requested concrete type.
    #[error("component '{0}' is not of the requested concrete type")]
    TypeMismatch(ComponentId),

    /// The manager has been shut down; cleared records are terminal and
    /// nothing can be declared, built, or re-registered afterwards.
    #[error("lifecycle manager has been shut down")]
    ShutDown,

    /// Specific, typed registry error
    #[error(transparent)]
    Registry(#[from] RegistryError),
}
