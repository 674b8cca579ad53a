use std::process::ExitCode;

use async_trait::async_trait;
use clap::Parser; // Use clap for argument parsing
use linchpin_core::{ComponentId, LifecycleManager, ManagedComponent, Result};
use log::{error, info};

/// Linchpin: dependency-ordered component lifecycle
///
/// Boots a small demonstration stack (storage -> cache/metrics -> server),
/// accesses the requested component so its prerequisites come up first,
/// then shuts everything down in reverse dependency order.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Component to access; its prerequisites are built first
    #[arg(long, default_value = "server")]
    access: String,

    /// Make the named component's cleanup fail at shutdown, to show
    /// failure collection
    #[arg(long)]
    fail_stop: Option<String>,

    /// Enable debug-level logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug)]
struct DemoComponent {
    id: ComponentId,
    fail_stop: bool,
}

#[async_trait]
impl ManagedComponent for DemoComponent {
    fn id(&self) -> ComponentId {
        self.id.clone()
    }

    async fn initialize(&self) -> Result<()> {
        info!("[{}] ready", self.id);
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        if self.fail_stop {
            Err(format!("[{}] refused to stop", self.id).into())
        } else {
            info!("[{}] stopped", self.id);
            Ok(())
        }
    }
}

/// Declare the demo diamond: storage at the root, cache and metrics on
/// top of it, the server on top of both.
async fn declare_demo_stack(manager: &LifecycleManager, fail_stop: Option<&str>) -> Result<()> {
    let stack: [(&str, Vec<&str>); 4] = [
        ("storage", vec![]),
        ("cache", vec!["storage"]),
        ("metrics", vec!["storage"]),
        ("server", vec!["cache", "metrics"]),
    ];

    for (name, prerequisites) in stack {
        let fail = fail_stop == Some(name);
        manager
            .declare_component(
                ComponentId::from(name),
                prerequisites.into_iter().map(ComponentId::from).collect(),
                move || {
                    Ok(DemoComponent {
                        id: ComponentId::from(name),
                        fail_stop: fail,
                    })
                },
            )
            .await?;
    }
    Ok(())
}

async fn run(args: &CliArgs) -> Result<()> {
    let manager = LifecycleManager::new();
    declare_demo_stack(&manager, args.fail_stop.as_deref()).await?;

    let target = ComponentId::from(args.access.as_str());
    manager.access(&target).await?;
    info!("Component '{}' and its prerequisites are up", target);

    let report = manager.shutdown().await?;
    if report.is_clean() {
        info!(
            "Shutdown clean: {} component(s) cleaned up",
            report.invoked.len()
        );
        Ok(())
    } else {
        for failure in &report.failures {
            error!("Cleanup for '{}' failed: {}", failure.id, failure.error);
        }
        Err(format!(
            "shutdown completed with {} cleanup failure(s)",
            report.failures.len()
        )
        .into())
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
