use std::fmt;

use async_trait::async_trait;
use serde::Serialize;

use crate::registry::error::CleanupError;

/// Stable, process-wide identifier for a registered component.
///
/// An explicit string key rather than a type-derived hash, so two distinct
/// components can never collide silently.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ComponentId(String);

impl ComponentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ComponentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ComponentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// One-shot action run when a component is torn down.
///
/// Implementations must tolerate whatever state their component is in at
/// shutdown; a failure is collected by the scheduler, never fatal to the
/// rest of the teardown plan.
#[async_trait]
pub trait CleanupAction: Send + Sync {
    async fn run(&self) -> Result<(), CleanupError>;
}

/// A cleanup action that does nothing. Components without resources to
/// release register this.
#[derive(Debug, Default)]
pub struct NoopCleanup;

#[async_trait]
impl CleanupAction for NoopCleanup {
    async fn run(&self) -> Result<(), CleanupError> {
        Ok(())
    }
}

/// Bookkeeping entry for a single registered component.
///
/// `alive` starts true at registration and flips to false exactly once,
/// during teardown. A dead record is terminal: it is never revived and its
/// cleanup is never run again.
pub struct ComponentRecord {
    id: ComponentId,
    alive: bool,
    cleanup: Box<dyn CleanupAction>,
}

impl ComponentRecord {
    pub fn new(id: ComponentId, cleanup: Box<dyn CleanupAction>) -> Self {
        Self {
            id,
            alive: true,
            cleanup,
        }
    }

    pub fn id(&self) -> &ComponentId {
        &self.id
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Terminal transition. There is deliberately no way back to `alive`.
    pub(crate) fn mark_dead(&mut self) {
        self.alive = false;
    }

    pub(crate) fn cleanup(&self) -> &dyn CleanupAction {
        self.cleanup.as_ref()
    }
}

impl fmt::Debug for ComponentRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentRecord")
            .field("id", &self.id)
            .field("alive", &self.alive)
            .finish_non_exhaustive()
    }
}
