//! Store construction
//!
//! Both variants start from [`AppState::seeded`] and run the same
//! [`app_reducer`]; they differ only in whether middleware is attached.

use crate::config::TodoConfig;
use crate::reducer::{app_reducer, AppReducer, TodoEnvironment};
use crate::types::{AppState, TodoAction};
use std::sync::Arc;
use todo_store_core::environment::Clock;
use todo_store_runtime::middleware::{default_middleware, LoggingMiddleware};
use todo_store_runtime::{Store, StoreConfig};

/// The todo app's store
pub type TodoStore = Store<AppState, TodoAction, TodoEnvironment, AppReducer>;

fn base_config(config: &TodoConfig) -> StoreConfig<AppState, TodoAction> {
    StoreConfig::default().with_broadcast_capacity(config.broadcast_capacity)
}

/// A store without middleware
#[must_use]
pub fn plain(config: &TodoConfig, env: TodoEnvironment) -> TodoStore {
    let initial = AppState::seeded(env.ids.as_ref());
    Store::with_config(
        initial,
        app_reducer(config.remove_behavior),
        env,
        base_config(config),
    )
}

/// A store with the logging middleware followed by [`default_middleware`]
#[must_use]
pub fn with_middleware(
    config: &TodoConfig,
    env: TodoEnvironment,
    clock: Arc<dyn Clock>,
) -> TodoStore {
    let initial = AppState::seeded(env.ids.as_ref());
    let store_config = base_config(config)
        .with_middleware(LoggingMiddleware::new(clock))
        .with_middlewares(default_middleware());

    Store::with_config(
        initial,
        app_reducer(config.remove_behavior),
        env,
        store_config,
    )
}

/// Pick [`plain`] or [`with_middleware`] according to `config.middleware`
#[must_use]
pub fn build(config: &TodoConfig, env: TodoEnvironment, clock: Arc<dyn Clock>) -> TodoStore {
    if config.middleware {
        tracing::debug!("building todo store with middleware");
        with_middleware(config, env, clock)
    } else {
        tracing::debug!("building plain todo store");
        plain(config, env)
    }
}
