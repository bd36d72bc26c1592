//! Command-line demo for the todo store.
//!
//! Runs a short scripted session against a freshly seeded store and prints
//! the final state as JSON. Configure with the `TODO_*` variables documented
//! in [`todo::config`] and the log level with `RUST_LOG`.

use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use todo::config::DEFAULT_LOG_FILTER;
use todo::{store, TodoAction, TodoConfig, TodoEnvironment, TodoId};
use todo_store_core::environment::{SystemClock, UuidGenerator};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = TodoConfig::from_env().context("reading TODO_* configuration")?;
    tracing::info!(?config, "starting todo demo");

    let metrics = if config.metrics {
        Some(todo_store_runtime::metrics::install_prometheus()?)
    } else {
        None
    };

    let env = TodoEnvironment::new(Arc::new(UuidGenerator));
    let store = store::build(&config, env, Arc::new(SystemClock));

    let _subscription = store.subscribe(|state: &todo::AppState| {
        tracing::info!(
            todos = state.todos.len(),
            completed = state.todos.completed_count(),
            counter = state.counter,
            "state changed"
        );
    });

    println!("=== Todo Demo ===\n");
    print_todos(&store.snapshot().await);

    store
        .send(TodoAction::Create {
            desc: "Write the release notes".to_string(),
        })
        .await?;

    let created = store
        .state(|s| s.todos.last().map(|t| t.id.clone()))
        .await
        .context("created todo missing from state")?;

    store
        .send(TodoAction::Edit {
            id: created.clone(),
            desc: "Write and publish the release notes".to_string(),
        })
        .await?;
    store
        .send(TodoAction::Toggle {
            id: created.clone(),
            is_complete: true,
        })
        .await?;
    store.send(TodoAction::Select { id: created }).await?;

    let first = store
        .state(|s| s.todos.iter().next().map(|t| t.id.clone()))
        .await
        .context("seeded todos missing from state")?;
    store.send(TodoAction::Remove { id: first }).await?;

    // Unknown ids leave the list alone but still count.
    store
        .send(TodoAction::Toggle {
            id: TodoId::new("does-not-exist"),
            is_complete: true,
        })
        .await?;

    let state = store.snapshot().await;
    println!();
    print_todos(&state);
    if let Some(selected) = state.selected() {
        println!("\nSelected: {}", selected.desc);
    }
    println!("Counter: {}", state.counter);

    println!("\nFinal state:");
    println!("{}", serde_json::to_string_pretty(&state)?);

    if let Some(handle) = metrics {
        println!("\n{}", handle.render());
    }

    store.shutdown(Duration::from_secs(1)).await?;
    Ok(())
}

fn print_todos(state: &todo::AppState) {
    println!("Todos ({}):", state.todos.len());
    for todo in &state.todos {
        let status = if todo.is_complete { "✓" } else { " " };
        println!("  [{status}] {} ({})", todo.desc, todo.id);
    }
}
