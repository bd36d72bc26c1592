//! Reducers for the todo app.
//!
//! Each slice of [`AppState`] has its own reducer; [`app_reducer`] scopes
//! them onto their slice and combines them. Every slice sees every action.

use crate::types::{AppState, Outcome, TodoAction, TodoId, TodoList};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use todo_store_core::{
    composition::{combine_reducers, scope_reducer, BoxedReducer, CombinedReducer},
    effect::Effect,
    environment::IdGenerator,
    reducer::Reducer,
    SmallVec,
};

/// Environment dependencies for the todo reducers
#[derive(Clone)]
pub struct TodoEnvironment {
    /// Source of ids for new todos
    pub ids: Arc<dyn IdGenerator>,
}

impl TodoEnvironment {
    /// Creates a new `TodoEnvironment`
    #[must_use]
    pub fn new(ids: Arc<dyn IdGenerator>) -> Self {
        Self { ids }
    }
}

impl std::fmt::Debug for TodoEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoEnvironment").finish_non_exhaustive()
    }
}

/// What a `Remove` action does to the todo list
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoveBehavior {
    /// Drop the todo with the id
    #[default]
    Delete,
    /// Leave the list untouched; only the counter moves
    Inert,
}

/// A string that names no [`RemoveBehavior`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown remove behavior {0:?}, expected delete or inert")]
pub struct ParseRemoveBehaviorError(pub String);

impl std::str::FromStr for RemoveBehavior {
    type Err = ParseRemoveBehaviorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "delete" => Ok(Self::Delete),
            "inert" => Ok(Self::Inert),
            _ => Err(ParseRemoveBehaviorError(s.to_string())),
        }
    }
}

/// Reducer for the todo list slice
#[derive(Clone, Copy, Debug, Default)]
pub struct TodosReducer {
    remove: RemoveBehavior,
}

impl TodosReducer {
    /// Creates a `TodosReducer` that deletes on `Remove`
    #[must_use]
    pub const fn new() -> Self {
        Self {
            remove: RemoveBehavior::Delete,
        }
    }

    /// Creates a `TodosReducer` with the given `Remove` handling
    #[must_use]
    pub const fn with_remove_behavior(remove: RemoveBehavior) -> Self {
        Self { remove }
    }

    /// The configured `Remove` handling
    #[must_use]
    pub const fn remove_behavior(&self) -> RemoveBehavior {
        self.remove
    }

    fn trace_outcome(kind: &'static str, id: &TodoId, outcome: Outcome) {
        match outcome {
            Outcome::Applied => tracing::trace!(action = kind, %id, "todo updated"),
            Outcome::NotFound => {
                tracing::debug!(action = kind, %id, "no todo with this id, list unchanged");
            },
        }
    }
}

impl Reducer for TodosReducer {
    type State = TodoList;
    type Action = TodoAction;
    type Environment = TodoEnvironment;

    fn reduce(
        &self,
        todos: &mut TodoList,
        action: TodoAction,
        env: &TodoEnvironment,
    ) -> SmallVec<[Effect<TodoAction>; 4]> {
        let kind = action.kind();
        match action {
            TodoAction::Create { desc } => {
                let id = TodoId::new(env.ids.next_id());
                let created = todos.create(id, desc);
                tracing::trace!(action = kind, id = %created.id, "todo created");
            },
            TodoAction::Edit { id, desc } => {
                Self::trace_outcome(kind, &id, todos.edit(&id, desc));
            },
            TodoAction::Toggle { id, is_complete } => {
                Self::trace_outcome(kind, &id, todos.toggle(&id, is_complete));
            },
            TodoAction::Remove { id } => match self.remove {
                RemoveBehavior::Delete => Self::trace_outcome(kind, &id, todos.remove(&id)),
                RemoveBehavior::Inert => {
                    tracing::debug!(action = kind, %id, "remove is inert, list unchanged");
                },
            },
            TodoAction::Select { .. } => {},
        }

        SmallVec::new()
    }
}

/// Reducer for the selected todo id
///
/// Stores whatever id it is given. It never checks that the todo exists.
#[derive(Clone, Copy, Debug, Default)]
pub struct SelectionReducer;

impl Reducer for SelectionReducer {
    type State = Option<TodoId>;
    type Action = TodoAction;
    type Environment = TodoEnvironment;

    fn reduce(
        &self,
        selected: &mut Option<TodoId>,
        action: TodoAction,
        _env: &TodoEnvironment,
    ) -> SmallVec<[Effect<TodoAction>; 4]> {
        if let TodoAction::Select { id } = action {
            *selected = Some(id);
        }

        SmallVec::new()
    }
}

/// Reducer counting mutating actions
///
/// Counts every create, edit, toggle and remove, whether or not it found its
/// todo.
#[derive(Clone, Copy, Debug, Default)]
pub struct CounterReducer;

impl Reducer for CounterReducer {
    type State = u64;
    type Action = TodoAction;
    type Environment = TodoEnvironment;

    fn reduce(
        &self,
        count: &mut u64,
        action: TodoAction,
        _env: &TodoEnvironment,
    ) -> SmallVec<[Effect<TodoAction>; 4]> {
        if action.is_mutation() {
            *count = count.saturating_add(1);
        }

        SmallVec::new()
    }
}

/// The combined reducer over [`AppState`]
pub type AppReducer = CombinedReducer<AppState, TodoAction, TodoEnvironment>;

/// Build the root reducer from the three slice reducers
#[must_use]
pub fn app_reducer(remove: RemoveBehavior) -> AppReducer {
    let slices: Vec<BoxedReducer<AppState, TodoAction, TodoEnvironment>> = vec![
        Box::new(scope_reducer(
            TodosReducer::with_remove_behavior(remove),
            |state: &AppState| &state.todos,
            |state: &mut AppState, todos| state.todos = todos,
        )),
        Box::new(scope_reducer(
            SelectionReducer,
            |state: &AppState| &state.selected_todo,
            |state: &mut AppState, selected| state.selected_todo = selected,
        )),
        Box::new(scope_reducer(
            CounterReducer,
            |state: &AppState| &state.counter,
            |state: &mut AppState, counter| state.counter = counter,
        )),
    ];

    combine_reducers(slices)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code can unwrap
mod tests {
    use super::*;
    use crate::types::Todo;
    use todo_store_testing::{assertions, ReducerTest, SequentialIdGenerator};

    fn test_env() -> TodoEnvironment {
        TodoEnvironment::new(Arc::new(SequentialIdGenerator::new("todo")))
    }

    fn seeded() -> AppState {
        AppState::seeded(&SequentialIdGenerator::new("seed"))
    }

    fn descs(todos: &TodoList) -> Vec<String> {
        todos.iter().map(|t| t.desc.clone()).collect()
    }

    #[test]
    fn create_uses_environment_id() {
        ReducerTest::new(TodosReducer::new())
            .with_env(test_env())
            .given_state(TodoList::new())
            .when_action(TodoAction::Create {
                desc: "Buy milk".to_string(),
            })
            .when_action(TodoAction::Create {
                desc: "Walk dog".to_string(),
            })
            .then_state(|todos| {
                let expected: TodoList = [
                    Todo::new(TodoId::from("todo-1"), "Buy milk".to_string()),
                    Todo::new(TodoId::from("todo-2"), "Walk dog".to_string()),
                ]
                .into_iter()
                .collect();
                assert_eq!(*todos, expected);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn edit_unknown_id_leaves_list() {
        ReducerTest::new(TodosReducer::new())
            .with_env(test_env())
            .given_state(seeded().todos)
            .when_action(TodoAction::Edit {
                id: TodoId::from("nope"),
                desc: "x".to_string(),
            })
            .then_state(|todos| assert_eq!(*todos, seeded().todos))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn toggle_sets_rather_than_flips() {
        ReducerTest::new(TodosReducer::new())
            .with_env(test_env())
            .given_state(seeded().todos)
            .when_action(TodoAction::Toggle {
                id: TodoId::from("seed-1"),
                is_complete: true,
            })
            .then_state(|todos| {
                assert!(todos.get(&TodoId::from("seed-1")).is_some_and(|t| t.is_complete));
                assert_eq!(todos.completed_count(), 2);
            })
            .run();
    }

    #[test]
    fn remove_deletes_by_default() {
        ReducerTest::new(TodosReducer::default())
            .with_env(test_env())
            .given_state(seeded().todos)
            .when_action(TodoAction::Remove {
                id: TodoId::from("seed-2"),
            })
            .then_state(|todos| {
                assert_eq!(descs(todos), vec!["Learn React", "Learn Redux-ToolKit"]);
            })
            .run();
    }

    #[test]
    fn inert_remove_keeps_list() {
        ReducerTest::new(TodosReducer::with_remove_behavior(RemoveBehavior::Inert))
            .with_env(test_env())
            .given_state(seeded().todos)
            .when_action(TodoAction::Remove {
                id: TodoId::from("seed-2"),
            })
            .then_state(|todos| assert_eq!(*todos, seeded().todos))
            .run();
    }

    #[test]
    fn selection_accepts_any_id() {
        ReducerTest::new(SelectionReducer)
            .with_env(test_env())
            .given_state(None)
            .when_action(TodoAction::Select {
                id: TodoId::from("ghost"),
            })
            .when_action(TodoAction::Create {
                desc: "ignored".to_string(),
            })
            .then_state(|selected| assert_eq!(*selected, Some(TodoId::from("ghost"))))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn counter_skips_select() {
        ReducerTest::new(CounterReducer)
            .with_env(test_env())
            .given_state(7)
            .when_action(TodoAction::Remove {
                id: TodoId::from("nope"),
            })
            .when_action(TodoAction::Select {
                id: TodoId::from("nope"),
            })
            .then_state(|count| assert_eq!(*count, 8))
            .run();
    }

    #[test]
    fn app_reducer_routes_each_slice() {
        let reducer = app_reducer(RemoveBehavior::Delete);
        assert_eq!(reducer.len(), 3);

        ReducerTest::new(reducer)
            .with_env(test_env())
            .given_state(seeded())
            .when_action(TodoAction::Create {
                desc: "Write docs".to_string(),
            })
            .when_action(TodoAction::Select {
                id: TodoId::from("todo-1"),
            })
            .when_action(TodoAction::Remove {
                id: TodoId::from("todo-1"),
            })
            .then_state(|state| {
                assert_eq!(state.todos.len(), 3);
                assert_eq!(state.selected_todo, Some(TodoId::from("todo-1")));
                assert!(state.selected().is_none());
                assert_eq!(state.counter, 2);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn remove_behavior_parses() {
        assert_eq!("delete".parse::<RemoveBehavior>(), Ok(RemoveBehavior::Delete));
        assert_eq!(" Inert ".parse::<RemoveBehavior>(), Ok(RemoveBehavior::Inert));
        let err = "drop".parse::<RemoveBehavior>().unwrap_err();
        assert_eq!(err, ParseRemoveBehaviorError("drop".to_string()));
        assert_eq!(err.to_string(), "unknown remove behavior \"drop\", expected delete or inert");
    }
}
