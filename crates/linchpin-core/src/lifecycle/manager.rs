use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::lifecycle::error::LifecycleError;
use crate::lifecycle::ManagedComponent;
use crate::registry::error::{CleanupError, RegistryError};
use crate::registry::graph::DependencyGraph;
use crate::registry::{CleanupAction, ComponentId, Registrar, TeardownReport, TeardownScheduler};

/// Constructor stored with a declaration; called at most once, on first
/// access of the component.
pub type ComponentConstructor =
    Box<dyn Fn() -> crate::error::Result<Arc<dyn ManagedComponent>> + Send + Sync>;

/// A declared-but-not-necessarily-built component: its ordered
/// prerequisite ids plus the constructor that will produce the instance.
struct Blueprint {
    prerequisites: Vec<ComponentId>,
    constructor: ComponentConstructor,
}

/// Cleanup action bound to a built instance: teardown calls the
/// component's `stop` hook.
struct InstanceCleanup {
    instance: Arc<dyn ManagedComponent>,
}

#[async_trait]
impl CleanupAction for InstanceCleanup {
    async fn run(&self) -> Result<(), CleanupError> {
        self.instance
            .stop()
            .await
            .map_err(|err| CleanupError::new(err.to_string()))
    }
}

/// The get-or-create entry point over the registry.
///
/// Components are declared up front (id, ordered prerequisites,
/// constructor); [`LifecycleManager::access`] then builds on demand,
/// forcing prerequisites into existence first and registering every
/// component and edge in the dependency graph as it goes.
///
/// All state sits behind a single `tokio::sync::Mutex`, held across the
/// whole recursive build of a first access. That one critical section is
/// what makes construction exactly-once under concurrency: competing
/// first-callers block on the lock and then find the cached instance.
/// Registration and the cycle checks guarding it execute under the same
/// lock, and so does teardown, so the two phases can never interleave.
#[derive(Clone)]
pub struct LifecycleManager {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    blueprints: HashMap<ComponentId, Blueprint>,
    instances: HashMap<ComponentId, Arc<dyn ManagedComponent>>,
    registrar: Registrar,
    shut_down: bool,
}

impl LifecycleManager {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
        }
    }

    /// Declare a component: its id, the ids it depends on (in the order
    /// their edges should be registered), and its constructor. Declaring
    /// does not build anything; prerequisites may be declared in any
    /// order, as long as all of them exist by the time the component is
    /// first accessed.
    pub async fn declare(
        &self,
        id: ComponentId,
        prerequisites: Vec<ComponentId>,
        constructor: ComponentConstructor,
    ) -> Result<(), LifecycleError> {
        let mut inner = self.inner.lock().await;
        if inner.shut_down {
            return Err(LifecycleError::ShutDown);
        }
        if inner.blueprints.contains_key(&id) {
            return Err(LifecycleError::AlreadyDeclared(id));
        }
        log::debug!(
            "Declared component '{}' with {} prerequisite(s)",
            id,
            prerequisites.len()
        );
        inner.blueprints.insert(
            id,
            Blueprint {
                prerequisites,
                constructor,
            },
        );
        Ok(())
    }

    /// Convenience wrapper over [`LifecycleManager::declare`] for
    /// constructors returning a concrete component type.
    pub async fn declare_component<T, F>(
        &self,
        id: ComponentId,
        prerequisites: Vec<ComponentId>,
        build: F,
    ) -> Result<(), LifecycleError>
    where
        T: ManagedComponent,
        F: Fn() -> crate::error::Result<T> + Send + Sync + 'static,
    {
        self.declare(
            id,
            prerequisites,
            Box::new(move || build().map(|component| Arc::new(component) as Arc<dyn ManagedComponent>)),
        )
        .await
    }

    /// Get the component's shared instance, building it first if this is
    /// the first access.
    ///
    /// A first access constructs every not-yet-built prerequisite before
    /// the component itself, depth-first in declaration order, and
    /// registers each newly built component (with a cleanup bound to its
    /// `stop` hook) in the dependency graph.
    pub async fn access(
        &self,
        id: &ComponentId,
    ) -> Result<Arc<dyn ManagedComponent>, LifecycleError> {
        let mut inner = self.inner.lock().await;
        if inner.shut_down {
            return Err(LifecycleError::ShutDown);
        }
        if let Some(instance) = inner.instances.get(id) {
            return Ok(Arc::clone(instance));
        }

        let order = inner.build_order(id)?;
        for pending in order {
            inner.construct_and_register(&pending).await?;
        }
        Ok(Arc::clone(
            inner
                .instances
                .get(id)
                .expect("build order always ends with the accessed component"),
        ))
    }

    /// As [`LifecycleManager::access`], downcast to the concrete type.
    pub async fn access_concrete<T: ManagedComponent + 'static>(
        &self,
        id: &ComponentId,
    ) -> Result<Arc<T>, LifecycleError> {
        let instance = self.access(id).await?;
        // ManagedComponent has Any as a supertrait, so the trait object
        // can be upcast and then downcast to the concrete type.
        let arc_any: Arc<dyn Any + Send + Sync> = instance;
        Arc::downcast::<T>(arc_any).map_err(|_| LifecycleError::TypeMismatch(id.clone()))
    }

    /// Whether the component has been constructed already. Never triggers
    /// a build.
    pub async fn is_built(&self, id: &ComponentId) -> bool {
        self.inner.lock().await.instances.contains_key(id)
    }

    /// Run a read-only closure against the dependency graph.
    pub async fn with_graph<R>(&self, f: impl FnOnce(&DependencyGraph) -> R) -> R {
        let inner = self.inner.lock().await;
        f(inner.registrar.graph())
    }

    /// Tear down every built component in reverse dependency order and
    /// put the manager into its terminal state: afterwards all
    /// declarations and accesses are rejected with
    /// [`LifecycleError::ShutDown`].
    ///
    /// Cleanup failures are collected into the returned report, not
    /// propagated; a failing component never prevents the components it
    /// depends on from being cleaned up.
    pub async fn shutdown(&self) -> Result<TeardownReport, LifecycleError> {
        let mut inner = self.inner.lock().await;
        if inner.shut_down {
            return Err(LifecycleError::ShutDown);
        }
        inner.shut_down = true;

        log::info!("Shutting down managed components");
        let report = TeardownScheduler::new(inner.registrar.graph_mut())
            .teardown_all()
            .await;
        for failure in &report.failures {
            log::error!(
                "Cleanup for component '{}' failed: {}",
                failure.id,
                failure.error
            );
        }
        inner.instances.clear();
        log::info!(
            "Shutdown complete: {} component(s) cleaned up, {} failure(s)",
            report.invoked.len(),
            report.failures.len()
        );
        Ok(report)
    }
}

impl Default for LifecycleManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Inner {
    /// The ordered list of components that must be constructed to satisfy
    /// an access of `target`: missing prerequisites first, depth-first in
    /// declaration order, `target` last. Already-built components are
    /// omitted.
    fn build_order(&self, target: &ComponentId) -> Result<Vec<ComponentId>, LifecycleError> {
        let mut order = Vec::new();
        let mut planned = HashSet::new();
        let mut in_progress = HashSet::new();
        self.plan(target, &mut planned, &mut in_progress, &mut order)?;
        Ok(order)
    }

    fn plan(
        &self,
        id: &ComponentId,
        planned: &mut HashSet<ComponentId>,
        in_progress: &mut HashSet<ComponentId>,
        order: &mut Vec<ComponentId>,
    ) -> Result<(), LifecycleError> {
        if self.instances.contains_key(id) || planned.contains(id) {
            return Ok(());
        }
        let blueprint = self
            .blueprints
            .get(id)
            .ok_or_else(|| LifecycleError::NotDeclared(id.clone()))?;

        in_progress.insert(id.clone());
        for prerequisite in &blueprint.prerequisites {
            // A declaration-level cycle would loop this walk before any
            // graph edge exists; report it as the graph would have one
            // step later.
            if in_progress.contains(prerequisite) {
                return Err(RegistryError::CycleDetected {
                    prerequisite: prerequisite.clone(),
                    dependent: id.clone(),
                }
                .into());
            }
            self.plan(prerequisite, planned, in_progress, order)?;
        }
        in_progress.remove(id);

        planned.insert(id.clone());
        order.push(id.clone());
        Ok(())
    }

    async fn construct_and_register(&mut self, id: &ComponentId) -> Result<(), LifecycleError> {
        let (constructed, prerequisites) = {
            let blueprint = self
                .blueprints
                .get(id)
                .ok_or_else(|| LifecycleError::NotDeclared(id.clone()))?;
            ((blueprint.constructor)(), blueprint.prerequisites.clone())
        };
        let instance = constructed.map_err(|source| LifecycleError::ConstructionFailed {
            id: id.clone(),
            source: Box::new(source),
        })?;

        let reported = instance.id();
        if reported != *id {
            return Err(LifecycleError::IdMismatch {
                declared: id.clone(),
                reported,
            });
        }

        log::info!("Constructed component '{}'", id);
        instance
            .initialize()
            .await
            .map_err(|source| LifecycleError::InitializationFailed {
                id: id.clone(),
                source: Box::new(source),
            })?;

        let cleanup = Box::new(InstanceCleanup {
            instance: Arc::clone(&instance),
        });
        self.registrar.register(id.clone(), cleanup, &prerequisites)?;
        self.instances.insert(id.clone(), instance);
        Ok(())
    }
}
