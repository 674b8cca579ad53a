use std::collections::{HashMap, HashSet, VecDeque};

use serde_json::Value;

use crate::registry::component::{CleanupAction, ComponentId, ComponentRecord};
use crate::registry::error::RegistryError;

/// Per-node adjacency. Neighbor lists preserve insertion order so that
/// traversal (and therefore deletion planning) is deterministic.
#[derive(Debug, Default)]
struct Adjacency {
    /// Prerequisites of this node (edges pointing at it).
    incoming: Vec<ComponentId>,
    /// Dependents of this node (edges leaving it).
    outgoing: Vec<ComponentId>,
}

/// Directed graph of component records connected by dependency edges.
///
/// Edges run prerequisite -> dependent: the dependent requires the
/// prerequisite to exist first and must be destroyed before it. The edge
/// relation is acyclic at all times; [`DependencyGraph::add_edge`] performs
/// the cycle check and the insertion as one check-then-insert, so callers
/// holding exclusive access to the graph cannot race it into a cycle.
///
/// The graph exclusively owns all records and edge data.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    records: HashMap<ComponentId, ComponentRecord>,
    adjacency: HashMap<ComponentId, Adjacency>,
    /// Opaque per-edge payload, keyed by (prerequisite, dependent). Passed
    /// through untouched by the algorithms.
    edge_metadata: HashMap<(ComponentId, ComponentId), Value>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a component record with `alive = true`. Fails if the id is
    /// already present, whether the existing record is alive or not.
    pub fn add_component(
        &mut self,
        id: ComponentId,
        cleanup: Box<dyn CleanupAction>,
    ) -> Result<(), RegistryError> {
        if self.records.contains_key(&id) {
            return Err(RegistryError::AlreadyRegistered(id));
        }
        self.adjacency.insert(id.clone(), Adjacency::default());
        self.records
            .insert(id.clone(), ComponentRecord::new(id, cleanup));
        Ok(())
    }

    /// Insert the edge `prerequisite -> dependent` with an optional opaque
    /// metadata payload.
    ///
    /// Validates both endpoints, uniqueness, and acyclicity before touching
    /// the adjacency lists; a rejected edge leaves the graph unchanged.
    pub fn add_edge(
        &mut self,
        prerequisite: &ComponentId,
        dependent: &ComponentId,
        metadata: Option<Value>,
    ) -> Result<(), RegistryError> {
        if !self.records.contains_key(prerequisite) {
            return Err(RegistryError::UnknownComponent(prerequisite.clone()));
        }
        if !self.records.contains_key(dependent) {
            return Err(RegistryError::UnknownComponent(dependent.clone()));
        }
        if self.has_edge(prerequisite, dependent) {
            return Err(RegistryError::DuplicateEdge {
                prerequisite: prerequisite.clone(),
                dependent: dependent.clone(),
            });
        }
        if self.would_cycle(prerequisite, dependent) {
            return Err(RegistryError::CycleDetected {
                prerequisite: prerequisite.clone(),
                dependent: dependent.clone(),
            });
        }

        self.adjacency
            .get_mut(prerequisite)
            .expect("endpoint checked above")
            .outgoing
            .push(dependent.clone());
        self.adjacency
            .get_mut(dependent)
            .expect("endpoint checked above")
            .incoming
            .push(prerequisite.clone());
        if let Some(payload) = metadata {
            self.edge_metadata
                .insert((prerequisite.clone(), dependent.clone()), payload);
        }
        Ok(())
    }

    /// Would inserting `prerequisite -> dependent` close a loop?
    ///
    /// True iff a directed path already exists from `dependent` to
    /// `prerequisite`. Breadth-first over the existing edges, starting at
    /// the dependent; returns as soon as the prerequisite is reached.
    /// Read-only, linear in the vertex count (visited set, no revisits).
    pub fn would_cycle(&self, prerequisite: &ComponentId, dependent: &ComponentId) -> bool {
        let mut visited: HashSet<&ComponentId> = HashSet::new();
        let mut queue: VecDeque<&ComponentId> = VecDeque::new();
        visited.insert(dependent);
        queue.push_back(dependent);

        while let Some(current) = queue.pop_front() {
            if current == prerequisite {
                return true;
            }
            for next in self.out_neighbors(current) {
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        false
    }

    /// True if the edge `prerequisite -> dependent` exists.
    pub fn has_edge(&self, prerequisite: &ComponentId, dependent: &ComponentId) -> bool {
        self.adjacency
            .get(prerequisite)
            .is_some_and(|adj| adj.outgoing.contains(dependent))
    }

    /// Components that depend on nothing: zero incoming prerequisite
    /// edges. These are the valid starting points for teardown. Sorted so
    /// the whole-graph teardown order is deterministic.
    pub fn roots(&self) -> Vec<ComponentId> {
        let mut roots: Vec<ComponentId> = self
            .adjacency
            .iter()
            .filter(|(_, adj)| adj.incoming.is_empty())
            .map(|(id, _)| id.clone())
            .collect();
        roots.sort();
        roots
    }

    /// Dependents one edge away from `id`, in edge-insertion order.
    /// Unknown ids have no neighbors.
    pub fn out_neighbors(&self, id: &ComponentId) -> &[ComponentId] {
        self.adjacency
            .get(id)
            .map(|adj| adj.outgoing.as_slice())
            .unwrap_or(&[])
    }

    pub fn contains(&self, id: &ComponentId) -> bool {
        self.records.contains_key(id)
    }

    pub fn record(&self, id: &ComponentId) -> Option<&ComponentRecord> {
        self.records.get(id)
    }

    pub(crate) fn record_mut(&mut self, id: &ComponentId) -> Option<&mut ComponentRecord> {
        self.records.get_mut(id)
    }

    /// Metadata attached to the edge `prerequisite -> dependent`, if any.
    pub fn edge_metadata(&self, prerequisite: &ComponentId, dependent: &ComponentId) -> Option<&Value> {
        self.edge_metadata
            .get(&(prerequisite.clone(), dependent.clone()))
    }

    /// Number of registered components, dead ones included.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
