use std::collections::{HashSet, VecDeque};

use serde::Serialize;

use crate::registry::component::ComponentId;
use crate::registry::error::{CleanupError, RegistryError};
use crate::registry::graph::DependencyGraph;

/// A cleanup action that failed, paired with the component it belonged to.
#[derive(Debug, Clone, Serialize)]
pub struct CleanupFailure {
    pub id: ComponentId,
    pub error: CleanupError,
}

/// Outcome of a teardown run.
///
/// `invoked` lists the components whose cleanup actions actually ran, in
/// execution order; components that were already dead when the plan
/// reached them are not listed. `failures` collects every cleanup that
/// reported an error — teardown never aborts mid-plan, so a report can
/// carry failures alongside a fully executed remainder.
#[derive(Debug, Default, Serialize)]
pub struct TeardownReport {
    pub invoked: Vec<ComponentId>,
    pub failures: Vec<CleanupFailure>,
}

impl TeardownReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn merge(&mut self, other: TeardownReport) {
        self.invoked.extend(other.invoked);
        self.failures.extend(other.failures);
    }
}

/// Computes deletion plans and executes them against the graph.
///
/// Holds the graph's exclusive borrow for the whole traversal-and-invoke
/// sequence, so teardown cannot interleave with registration.
pub struct TeardownScheduler<'a> {
    graph: &'a mut DependencyGraph,
}

impl<'a> TeardownScheduler<'a> {
    pub fn new(graph: &'a mut DependencyGraph) -> Self {
        Self { graph }
    }

    /// The deletion plan for `root`: every component reachable through
    /// dependents, deepest dependents first, the root last.
    ///
    /// Breadth-first discovery over prerequisite -> dependent edges,
    /// reversed, so that when a component's cleanup runs every component
    /// depending on it has already been cleaned up.
    pub fn deletion_order(&self, root: &ComponentId) -> Result<Vec<ComponentId>, RegistryError> {
        if !self.graph.contains(root) {
            return Err(RegistryError::UnknownComponent(root.clone()));
        }

        let mut discovered: Vec<ComponentId> = Vec::new();
        let mut visited: HashSet<ComponentId> = HashSet::new();
        let mut queue: VecDeque<ComponentId> = VecDeque::new();
        visited.insert(root.clone());
        queue.push_back(root.clone());

        while let Some(current) = queue.pop_front() {
            for next in self.graph.out_neighbors(&current) {
                if visited.insert(next.clone()) {
                    queue.push_back(next.clone());
                }
            }
            discovered.push(current);
        }

        discovered.reverse();
        Ok(discovered)
    }

    /// Execute the deletion plan for `root`.
    ///
    /// Invokes each live record's cleanup exactly once, in plan order,
    /// flipping `alive` to false after each invocation before moving on.
    /// Records already dead are skipped, which makes overlapping roots
    /// reaching the same component through a diamond safe. A failing
    /// cleanup is recorded and the plan continues; the component is marked
    /// dead regardless, since its cleanup will never be retried.
    pub async fn teardown_from(
        &mut self,
        root: &ComponentId,
    ) -> Result<TeardownReport, RegistryError> {
        let plan = self.deletion_order(root)?;
        log::debug!(
            "Teardown from root '{}': plan covers {} component(s)",
            root,
            plan.len()
        );

        let mut report = TeardownReport::default();
        for id in plan {
            let Some(record) = self.graph.record_mut(&id) else {
                continue;
            };
            if !record.is_alive() {
                log::debug!("Skipping already-dead component '{}'", id);
                continue;
            }

            let outcome = record.cleanup().run().await;
            record.mark_dead();
            report.invoked.push(id.clone());
            if let Err(error) = outcome {
                log::warn!("Cleanup for component '{}' failed: {}", id, error);
                report.failures.push(CleanupFailure { id, error });
            } else {
                log::debug!("Cleaned up component '{}'", id);
            }
        }
        Ok(report)
    }

    /// Tear down the entire graph: one plan per root, executed in sorted
    /// root order. The skip-dead rule in [`TeardownScheduler::teardown_from`]
    /// keeps components reachable from more than one root from being
    /// visited twice.
    pub async fn teardown_all(&mut self) -> TeardownReport {
        let roots = self.graph.roots();
        log::info!(
            "Tearing down {} component(s) from {} root(s)",
            self.graph.len(),
            roots.len()
        );

        let mut report = TeardownReport::default();
        for root in roots {
            match self.teardown_from(&root).await {
                Ok(partial) => report.merge(partial),
                // Roots came from the graph itself; an unknown root here
                // would mean the graph changed underneath our borrow.
                Err(err) => log::error!("Teardown from root '{}' failed: {}", root, err),
            }
        }
        report
    }
}
