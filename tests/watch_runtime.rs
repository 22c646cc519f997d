// tests/watch_runtime.rs

mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use common::{init_tracing, with_timeout};
use sitepipe::context::BuildContext;
use sitepipe::engine::{CoreRuntime, Runtime, RuntimeEvent, RuntimeOptions, TriggerReason};
use sitepipe::exec::RealExecutorBackend;
use sitepipe::fs::mock::MockFileSystem;
use sitepipe::task::Task;
use sitepipe_test_utils::fake_executor::FakeExecutor;
use tokio::sync::mpsc;

fn trigger(binding: &str) -> RuntimeEvent {
    RuntimeEvent::BindingTriggered {
        binding: binding.to_string(),
        reason: TriggerReason::FileWatch,
    }
}

fn exit_when_idle() -> RuntimeOptions {
    RuntimeOptions {
        exit_when_idle: true,
    }
}

#[tokio::test]
async fn burst_of_triggers_runs_twice() {
    init_tracing();
    let (tx, rx) = mpsc::channel(16);
    let executed = Arc::new(Mutex::new(Vec::new()));
    let executor = FakeExecutor::new(tx.clone(), Arc::clone(&executed))
        .with_run_duration(Duration::from_millis(50));

    for _ in 0..3 {
        tx.send(trigger("styles")).await.unwrap();
    }

    let core = CoreRuntime::new(["styles", "scripts"], exit_when_idle());
    with_timeout(Runtime::new(core, rx, executor).run()).await.unwrap();

    assert_eq!(*executed.lock().unwrap(), vec!["styles", "styles"]);
}

#[tokio::test]
async fn bindings_run_independently() {
    let (tx, rx) = mpsc::channel(16);
    let executed = Arc::new(Mutex::new(Vec::new()));
    let executor = FakeExecutor::new(tx.clone(), Arc::clone(&executed))
        .with_run_duration(Duration::from_millis(20));

    tx.send(trigger("styles")).await.unwrap();
    tx.send(trigger("scripts")).await.unwrap();
    tx.send(trigger("styles")).await.unwrap();

    let core = CoreRuntime::new(["styles", "scripts"], exit_when_idle());
    with_timeout(Runtime::new(core, rx, executor).run()).await.unwrap();

    let mut runs = executed.lock().unwrap().clone();
    runs.sort();
    assert_eq!(runs, ["scripts", "styles", "styles"]);
}

#[tokio::test]
async fn shutdown_stops_the_loop() {
    let (tx, rx) = mpsc::channel(16);
    let executed = Arc::new(Mutex::new(Vec::new()));
    let executor = FakeExecutor::new(tx.clone(), Arc::clone(&executed));

    tx.send(RuntimeEvent::ShutdownRequested).await.unwrap();

    let core = CoreRuntime::new(["html"], RuntimeOptions::default());
    with_timeout(Runtime::new(core, rx, executor).run()).await.unwrap();

    assert!(executed.lock().unwrap().is_empty());
}

#[tokio::test]
async fn real_backend_reruns_once_after_busy_run() {
    init_tracing();
    let runs = Arc::new(Mutex::new(0u32));
    let counter = Arc::clone(&runs);
    let task = Task::from_fn("html", move |_ctx| {
        let counter = Arc::clone(&counter);
        async move {
            *counter.lock().unwrap() += 1;
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(())
        }
    });

    let (tx, rx) = mpsc::channel(16);
    let ctx = Arc::new(BuildContext::with_defaults(Arc::new(MockFileSystem::new())));
    let executor = RealExecutorBackend::new([("html".to_string(), task)], ctx, tx.clone());

    for _ in 0..4 {
        tx.send(trigger("html")).await.unwrap();
    }

    let core = CoreRuntime::new(["html"], exit_when_idle());
    with_timeout(Runtime::new(core, rx, executor).run()).await.unwrap();

    assert_eq!(*runs.lock().unwrap(), 2);
}

#[tokio::test]
async fn failed_run_does_not_stop_watching() {
    let attempts = Arc::new(Mutex::new(0u32));
    let counter = Arc::clone(&attempts);
    let task = Task::from_fn("scripts", move |_ctx| {
        let counter = Arc::clone(&counter);
        async move {
            *counter.lock().unwrap() += 1;
            tokio::time::sleep(Duration::from_millis(20)).await;
            Err(anyhow::anyhow!("syntax error"))
        }
    });

    let (tx, rx) = mpsc::channel(16);
    let ctx = Arc::new(BuildContext::with_defaults(Arc::new(MockFileSystem::new())));
    let executor = RealExecutorBackend::new([("scripts".to_string(), task)], ctx, tx.clone());

    tx.send(trigger("scripts")).await.unwrap();
    tx.send(trigger("scripts")).await.unwrap();

    let core = CoreRuntime::new(["scripts"], exit_when_idle());
    with_timeout(Runtime::new(core, rx, executor).run()).await.unwrap();

    assert_eq!(*attempts.lock().unwrap(), 2);
}

#[tokio::test]
async fn panicking_run_returns_binding_to_idle() {
    init_tracing();
    let attempts = Arc::new(Mutex::new(0u32));
    let counter = Arc::clone(&attempts);
    let task = Task::from_fn("html", move |_ctx| {
        let counter = Arc::clone(&counter);
        async move {
            let attempt = {
                let mut n = counter.lock().unwrap();
                *n += 1;
                *n
            };
            tokio::time::sleep(Duration::from_millis(20)).await;
            if attempt == 1 {
                panic!("include expander blew up");
            }
            Ok(())
        }
    });

    let (tx, rx) = mpsc::channel(16);
    let ctx = Arc::new(BuildContext::with_defaults(Arc::new(MockFileSystem::new())));
    let executor = RealExecutorBackend::new([("html".to_string(), task)], ctx, tx.clone());

    // The second trigger lands while the first run is in flight.
    tx.send(trigger("html")).await.unwrap();
    tx.send(trigger("html")).await.unwrap();

    let core = CoreRuntime::new(["html"], exit_when_idle());
    with_timeout(Runtime::new(core, rx, executor).run()).await.unwrap();

    assert_eq!(*attempts.lock().unwrap(), 2);
}
