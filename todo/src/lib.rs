//! Todo list state container.
//!
//! State is an ordered list of todos, the id of the selected todo, and a
//! counter of list mutations. Every change goes through a [`TodoAction`]
//! sent to a [`TodoStore`]:
//!
//! - `Create` appends an incomplete todo with a fresh id
//! - `Edit` and `Toggle` update the todo with the given id
//! - `Remove` drops it (or does nothing, see [`RemoveBehavior`])
//! - `Select` stores the id as the selection
//!
//! Edits aimed at an id that does not exist leave the list as it was.
//! Create, edit, toggle and remove each add one to the counter.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use todo::{store, TodoAction, TodoConfig, TodoEnvironment};
//! use todo_store_core::environment::UuidGenerator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let env = TodoEnvironment::new(Arc::new(UuidGenerator));
//! let store = store::plain(&TodoConfig::default(), env);
//!
//! store.send(TodoAction::Create { desc: "Buy milk".to_string() }).await?;
//!
//! let state = store.snapshot().await;
//! println!("{} todos, counter {}", state.todos.len(), state.counter);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod reducer;
pub mod store;
pub mod types;

pub use config::{ConfigError, TodoConfig};
pub use reducer::{
    app_reducer, AppReducer, CounterReducer, ParseRemoveBehaviorError, RemoveBehavior,
    SelectionReducer, TodoEnvironment, TodosReducer,
};
pub use store::TodoStore;
pub use types::{AppState, Outcome, Todo, TodoAction, TodoId, TodoList, SEED_TODOS};
