use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::Result;
use crate::lifecycle::error::LifecycleError;
use crate::lifecycle::manager::LifecycleManager;
use crate::lifecycle::ManagedComponent;
use crate::registry::error::RegistryError;
use crate::registry::ComponentId;

fn id(s: &str) -> ComponentId {
    ComponentId::from(s)
}

/// Shared log of lifecycle events, in the order they happened.
#[derive(Debug)]
struct EventLog {
    events: Mutex<Vec<String>>,
}

impl EventLog {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            events: Mutex::new(Vec::new()),
        })
    }

    async fn push(&self, event: String) {
        self.events.lock().await.push(event);
    }

    async fn snapshot(&self) -> Vec<String> {
        self.events.lock().await.clone()
    }
}

#[derive(Debug)]
struct TestComponent {
    id: ComponentId,
    events: Arc<EventLog>,
    fail_stop: bool,
}

impl TestComponent {
    fn new(name: &str, events: &Arc<EventLog>) -> Self {
        Self {
            id: id(name),
            events: Arc::clone(events),
            fail_stop: false,
        }
    }

    fn failing_stop(name: &str, events: &Arc<EventLog>) -> Self {
        Self {
            id: id(name),
            events: Arc::clone(events),
            fail_stop: true,
        }
    }
}

#[async_trait]
impl ManagedComponent for TestComponent {
    fn id(&self) -> ComponentId {
        self.id.clone()
    }

    async fn initialize(&self) -> Result<()> {
        self.events.push(format!("init:{}", self.id)).await;
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        self.events.push(format!("stop:{}", self.id)).await;
        if self.fail_stop {
            Err("simulated stop failure".into())
        } else {
            Ok(())
        }
    }
}

/// Declare a linear storage -> cache -> server stack and return the
/// manager plus the shared event log.
async fn declare_stack() -> (LifecycleManager, Arc<EventLog>) {
    let manager = LifecycleManager::new();
    let events = EventLog::new();

    for (name, prerequisites) in [
        ("storage", vec![]),
        ("cache", vec![id("storage")]),
        ("server", vec![id("cache")]),
    ] {
        let events = Arc::clone(&events);
        manager
            .declare_component(id(name), prerequisites, move || {
                Ok(TestComponent::new(name, &events))
            })
            .await
            .unwrap();
    }
    (manager, events)
}

#[tokio::test]
async fn test_access_builds_prerequisites_first() {
    let (manager, events) = declare_stack().await;

    manager.access(&id("server")).await.unwrap();

    assert_eq!(
        events.snapshot().await,
        vec!["init:storage", "init:cache", "init:server"]
    );
    for name in ["storage", "cache", "server"] {
        assert!(manager.is_built(&id(name)).await);
    }
    // Every component and edge landed in the graph.
    manager
        .with_graph(|graph| {
            assert_eq!(graph.len(), 3);
            assert!(graph.has_edge(&id("storage"), &id("cache")));
            assert!(graph.has_edge(&id("cache"), &id("server")));
            assert_eq!(graph.roots(), vec![id("storage")]);
        })
        .await;
}

#[tokio::test]
async fn test_access_returns_the_same_instance() {
    let (manager, _events) = declare_stack().await;

    let first = manager.access(&id("cache")).await.unwrap();
    let second = manager.access(&id("cache")).await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}

#[tokio::test]
async fn test_access_concrete_downcasts() {
    let (manager, _events) = declare_stack().await;

    let component = manager
        .access_concrete::<TestComponent>(&id("storage"))
        .await
        .unwrap();
    assert_eq!(component.id, id("storage"));
}

#[tokio::test]
async fn test_access_concrete_rejects_wrong_type() {
    #[derive(Debug)]
    struct OtherComponent;

    #[async_trait]
    impl ManagedComponent for OtherComponent {
        fn id(&self) -> ComponentId {
            id("other")
        }
        async fn stop(&self) -> Result<()> {
            Ok(())
        }
    }

    let (manager, _events) = declare_stack().await;
    let result = manager.access_concrete::<OtherComponent>(&id("storage")).await;
    assert!(matches!(result, Err(LifecycleError::TypeMismatch(ref c)) if *c == id("storage")));
}

#[tokio::test]
async fn test_concurrent_access_constructs_once() {
    let manager = LifecycleManager::new();
    let events = EventLog::new();
    let constructions = Arc::new(AtomicU32::new(0));

    {
        let events = Arc::clone(&events);
        let constructions = Arc::clone(&constructions);
        manager
            .declare_component(id("shared"), vec![], move || {
                constructions.fetch_add(1, Ordering::SeqCst);
                Ok(TestComponent::new("shared", &events))
            })
            .await
            .unwrap();
    }

    let mut handles = Vec::new();
    for _ in 0..8 {
        let manager = manager.clone();
        handles.push(tokio::spawn(async move {
            manager.access(&id("shared")).await.unwrap()
        }));
    }

    let mut instances = Vec::new();
    for handle in handles {
        instances.push(handle.await.unwrap());
    }

    assert_eq!(constructions.load(Ordering::SeqCst), 1);
    for instance in &instances[1..] {
        assert!(Arc::ptr_eq(&instances[0], instance));
    }
    manager.with_graph(|graph| assert_eq!(graph.len(), 1)).await;
}

#[tokio::test]
async fn test_access_undeclared_component() {
    let manager = LifecycleManager::new();
    let result = manager.access(&id("ghost")).await;
    assert!(matches!(result, Err(LifecycleError::NotDeclared(ref c)) if *c == id("ghost")));
}

#[tokio::test]
async fn test_access_with_undeclared_prerequisite() {
    let manager = LifecycleManager::new();
    let events = EventLog::new();
    manager
        .declare_component(id("a"), vec![id("ghost")], move || {
            Ok(TestComponent::new("a", &events))
        })
        .await
        .unwrap();

    let result = manager.access(&id("a")).await;
    assert!(matches!(result, Err(LifecycleError::NotDeclared(ref c)) if *c == id("ghost")));
}

#[tokio::test]
async fn test_duplicate_declaration_rejected() {
    let manager = LifecycleManager::new();
    let events = EventLog::new();

    let first = {
        let events = Arc::clone(&events);
        manager
            .declare_component(id("a"), vec![], move || Ok(TestComponent::new("a", &events)))
            .await
    };
    assert!(first.is_ok());

    let second = manager
        .declare_component(id("a"), vec![], move || Ok(TestComponent::new("a", &events)))
        .await;
    assert!(matches!(second, Err(LifecycleError::AlreadyDeclared(ref c)) if *c == id("a")));
}

#[tokio::test]
async fn test_declaration_cycle_detected() {
    let manager = LifecycleManager::new();
    let events = EventLog::new();

    for (name, prerequisites) in [("a", vec![id("b")]), ("b", vec![id("a")])] {
        let events = Arc::clone(&events);
        manager
            .declare_component(id(name), prerequisites, move || {
                Ok(TestComponent::new(name, &events))
            })
            .await
            .unwrap();
    }

    let result = manager.access(&id("a")).await;
    assert!(matches!(
        result,
        Err(LifecycleError::Registry(RegistryError::CycleDetected { .. }))
    ));
    // Nothing was constructed.
    assert!(events.snapshot().await.is_empty());
}

#[tokio::test]
async fn test_id_mismatch_rejected() {
    let manager = LifecycleManager::new();
    let events = EventLog::new();
    manager
        .declare_component(id("declared"), vec![], move || {
            Ok(TestComponent::new("impostor", &events))
        })
        .await
        .unwrap();

    let result = manager.access(&id("declared")).await;
    assert!(matches!(
        result,
        Err(LifecycleError::IdMismatch { ref declared, ref reported })
            if *declared == id("declared") && *reported == id("impostor")
    ));
}

#[tokio::test]
async fn test_shutdown_stops_in_reverse_dependency_order() {
    let (manager, events) = declare_stack().await;
    manager.access(&id("server")).await.unwrap();

    let report = manager.shutdown().await.unwrap();
    assert!(report.is_clean());
    assert_eq!(report.invoked, vec![id("server"), id("cache"), id("storage")]);

    assert_eq!(
        events.snapshot().await,
        vec![
            "init:storage",
            "init:cache",
            "init:server",
            "stop:server",
            "stop:cache",
            "stop:storage",
        ]
    );
}

#[tokio::test]
async fn test_shutdown_is_terminal() {
    let (manager, events) = declare_stack().await;
    manager.access(&id("server")).await.unwrap();
    manager.shutdown().await.unwrap();

    assert!(matches!(
        manager.access(&id("server")).await,
        Err(LifecycleError::ShutDown)
    ));
    assert!(matches!(
        manager
            .declare_component(id("late"), vec![], move || {
                Ok(TestComponent::new("late", &events))
            })
            .await,
        Err(LifecycleError::ShutDown)
    ));
    assert!(matches!(
        manager.shutdown().await,
        Err(LifecycleError::ShutDown)
    ));
}

#[tokio::test]
async fn test_stop_failure_is_collected_not_fatal() {
    let manager = LifecycleManager::new();
    let events = EventLog::new();

    {
        let events = Arc::clone(&events);
        manager
            .declare_component(id("storage"), vec![], move || {
                Ok(TestComponent::new("storage", &events))
            })
            .await
            .unwrap();
    }
    {
        let events = Arc::clone(&events);
        manager
            .declare_component(id("cache"), vec![id("storage")], move || {
                Ok(TestComponent::failing_stop("cache", &events))
            })
            .await
            .unwrap();
    }

    manager.access(&id("cache")).await.unwrap();
    let report = manager.shutdown().await.unwrap();

    // cache's failure is reported, and storage's cleanup still ran after it.
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].id, id("cache"));
    assert_eq!(report.invoked, vec![id("cache"), id("storage")]);
    assert_eq!(
        events.snapshot().await,
        vec!["init:storage", "init:cache", "stop:cache", "stop:storage"]
    );
}
