use serde_json::Value;

use crate::registry::component::{CleanupAction, ComponentId};
use crate::registry::error::RegistryError;
use crate::registry::graph::DependencyGraph;

/// Orchestrates registration of a component and its declared dependency
/// edges as one logical unit.
///
/// The registrar owns the graph. Every prerequisite must already be
/// registered before `register` is called; the registrar does not create
/// missing prerequisites. A failed edge step is a fatal configuration
/// error: the partially added vertex is deliberately not rolled back (a
/// misconfigured dependency graph is a programming error to be fixed, not
/// a recoverable runtime condition), but the returned error names the
/// offending (prerequisite, dependent) pair.
#[derive(Debug, Default)]
pub struct Registrar {
    graph: DependencyGraph,
}

impl Registrar {
    pub fn new() -> Self {
        Self {
            graph: DependencyGraph::new(),
        }
    }

    /// Register `id` with its cleanup action, then one edge per
    /// prerequisite, in the given order. Each edge goes through the
    /// graph's validated check-then-insert.
    pub fn register(
        &mut self,
        id: ComponentId,
        cleanup: Box<dyn CleanupAction>,
        prerequisites: &[ComponentId],
    ) -> Result<(), RegistryError> {
        self.register_with_metadata(id, cleanup, prerequisites, |_| None)
    }

    /// As [`Registrar::register`], with a per-prerequisite opaque metadata
    /// payload attached to each edge.
    pub fn register_with_metadata(
        &mut self,
        id: ComponentId,
        cleanup: Box<dyn CleanupAction>,
        prerequisites: &[ComponentId],
        mut metadata: impl FnMut(&ComponentId) -> Option<Value>,
    ) -> Result<(), RegistryError> {
        self.graph.add_component(id.clone(), cleanup)?;
        log::debug!(
            "Registered component '{}' ({} prerequisite(s))",
            id,
            prerequisites.len()
        );

        for prerequisite in prerequisites {
            self.graph
                .add_edge(prerequisite, &id, metadata(prerequisite))
                .map_err(|source| {
                    log::error!(
                        "Rejected dependency '{}' -> '{}': {}",
                        prerequisite,
                        id,
                        source
                    );
                    RegistryError::EdgeRejected {
                        prerequisite: prerequisite.clone(),
                        dependent: id.clone(),
                        source: Box::new(source),
                    }
                })?;
            log::debug!("Registered dependency '{}' -> '{}'", prerequisite, id);
        }
        Ok(())
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut DependencyGraph {
        &mut self.graph
    }
}
