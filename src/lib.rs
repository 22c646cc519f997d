// src/lib.rs

pub mod cli;
pub mod config;
pub mod context;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod package;
pub mod pipeline;
pub mod sources;
pub mod task;
pub mod transform;
pub mod watch;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::cli::{CliArgs, EntryPoint};
use crate::config::load_or_default;
use crate::context::BuildContext;
use crate::engine::{CoreRuntime, Runtime, RuntimeEvent, RuntimeOptions};
use crate::exec::RealExecutorBackend;
use crate::fs::{FileSystem, RealFileSystem};
use crate::pipeline::Pipeline;
use crate::transform::TransformRegistry;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and the capability registry
/// - the pipeline and its named entry points
/// - for `watch`: initial build, file watcher, runtime, Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_or_default(&config_path)?;
    info!(root = %cfg.root().display(), task = args.task.as_str(), "sitepipe starting");

    let registry = TransformRegistry::resolve(&cfg);
    let pipeline = Pipeline::new(&cfg);

    if args.dry_run {
        print_dry_run(&pipeline, &registry, args.task);
        return Ok(());
    }

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let ctx = Arc::new(BuildContext::new(cfg, Arc::clone(&fs), registry));

    match pipeline.task(args.task) {
        Some(task) => {
            task.run(ctx).await?;
            Ok(())
        }
        None => run_watch(&pipeline, ctx, fs).await,
    }
}

/// Build once, then re-run the affected part of the pipeline on changes
/// until Ctrl-C.
async fn run_watch(
    pipeline: &Pipeline,
    ctx: Arc<BuildContext>,
    fs: Arc<dyn FileSystem>,
) -> Result<()> {
    if let Err(err) = pipeline.build().run(Arc::clone(&ctx)).await {
        error!(error = %err, "initial build failed; watching anyway");
    }

    let bindings = pipeline.watch_bindings();
    let profiles = watch::build_binding_profiles(bindings, ctx.config().watch())?;

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

    let executor = RealExecutorBackend::new(
        bindings.iter().map(|b| (b.name.clone(), b.task.clone())),
        Arc::clone(&ctx),
        rt_tx.clone(),
    );

    let _watcher_handle = watch::spawn_watcher(ctx.root(), profiles, rt_tx.clone(), fs)?;

    // Ctrl-C → graceful shutdown.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "failed to listen for Ctrl+C");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    let core = CoreRuntime::new(
        bindings.iter().map(|b| b.name.clone()),
        RuntimeOptions::default(),
    );
    let runtime = Runtime::new(core, rt_rx, executor);
    runtime.run().await?;
    Ok(())
}

/// Print the task tree, bindings and capabilities without running anything.
fn print_dry_run(pipeline: &Pipeline, registry: &TransformRegistry, entry: EntryPoint) {
    println!("sitepipe dry-run: {}", entry.as_str());
    println!();
    for line in pipeline.describe(entry) {
        println!("  {line}");
    }
    println!();
    println!("capabilities:");
    for line in registry.describe() {
        println!("  {line}");
    }

    debug!("dry-run complete (no execution)");
}
