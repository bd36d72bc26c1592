//! Domain types for the todo list.
//!
//! The aggregate [`AppState`] has three independent slices: the ordered
//! [`TodoList`], the selected todo id, and a counter of mutating actions.

use serde::{Deserialize, Serialize};
use todo_store_core::environment::IdGenerator;

/// Opaque identifier of a todo
///
/// Assigned once by the `Create` transition from the environment's
/// [`IdGenerator`]; callers never choose it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(String);

impl TodoId {
    /// Wrap an identifier string
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TodoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TodoId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A single todo item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    /// Unique identifier
    pub id: TodoId,
    /// Description text
    pub desc: String,
    /// Whether the todo is done
    pub is_complete: bool,
}

impl Todo {
    /// Creates a new, incomplete todo
    #[must_use]
    pub const fn new(id: TodoId, desc: String) -> Self {
        Self {
            id,
            desc,
            is_complete: false,
        }
    }
}

/// Result of a todo-list operation that targets an existing id
///
/// Not finding the id is not an error: the list is left unchanged and the
/// caller is told so.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub enum Outcome {
    /// A todo with the id was found and updated
    Applied,
    /// No todo has the id; nothing changed
    NotFound,
}

impl Outcome {
    /// Whether the operation changed the list
    #[must_use]
    pub const fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Ordered todos, in insertion order
///
/// Lookups scan front to back and stop at the first match. Ids are unique,
/// so "first match" only matters if that invariant were ever broken.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoList(Vec<Todo>);

impl TodoList {
    /// Creates an empty list
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Number of todos
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the list is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of completed todos
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.0.iter().filter(|t| t.is_complete).count()
    }

    /// Todos in insertion order
    pub fn iter(&self) -> std::slice::Iter<'_, Todo> {
        self.0.iter()
    }

    /// Todos as a slice
    #[must_use]
    pub fn as_slice(&self) -> &[Todo] {
        &self.0
    }

    /// Most recently created todo
    #[must_use]
    pub fn last(&self) -> Option<&Todo> {
        self.0.last()
    }

    /// Index of the first todo with `id`
    #[must_use]
    pub fn position(&self, id: &TodoId) -> Option<usize> {
        self.0.iter().position(|t| &t.id == id)
    }

    /// First todo with `id`
    #[must_use]
    pub fn get(&self, id: &TodoId) -> Option<&Todo> {
        self.0.iter().find(|t| &t.id == id)
    }

    /// Whether a todo with `id` exists
    #[must_use]
    pub fn contains(&self, id: &TodoId) -> bool {
        self.position(id).is_some()
    }

    fn get_mut(&mut self, id: &TodoId) -> Option<&mut Todo> {
        self.0.iter_mut().find(|t| &t.id == id)
    }

    /// Append a new incomplete todo and return it
    ///
    /// Ids are expected to be fresh; the [`IdGenerator`] owns that contract.
    /// A repeated id is logged at `warn` and still appended, so lookups keep
    /// resolving to the older todo.
    pub fn create(&mut self, id: TodoId, desc: String) -> &Todo {
        if self.contains(&id) {
            tracing::warn!(%id, "id generator repeated an id, todo appended anyway");
        }
        self.0.push(Todo::new(id, desc));
        &self.0[self.0.len() - 1]
    }

    /// Replace the description of the todo with `id`
    pub fn edit(&mut self, id: &TodoId, desc: String) -> Outcome {
        match self.get_mut(id) {
            Some(todo) => {
                todo.desc = desc;
                Outcome::Applied
            },
            None => Outcome::NotFound,
        }
    }

    /// Set the completion flag of the todo with `id`
    pub fn toggle(&mut self, id: &TodoId, is_complete: bool) -> Outcome {
        match self.get_mut(id) {
            Some(todo) => {
                todo.is_complete = is_complete;
                Outcome::Applied
            },
            None => Outcome::NotFound,
        }
    }

    /// Drop every todo with `id`, keeping the others in order
    pub fn remove(&mut self, id: &TodoId) -> Outcome {
        let before = self.0.len();
        self.0.retain(|t| &t.id != id);
        if self.0.len() == before {
            Outcome::NotFound
        } else {
            Outcome::Applied
        }
    }
}

impl FromIterator<Todo> for TodoList {
    fn from_iter<I: IntoIterator<Item = Todo>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a TodoList {
    type Item = &'a Todo;
    type IntoIter = std::slice::Iter<'a, Todo>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Todos every fresh [`AppState`] starts with: `(desc, is_complete)`
pub const SEED_TODOS: [(&str, bool); 3] = [
    ("Learn React", true),
    ("Learn Redux", true),
    ("Learn Redux-ToolKit", false),
];

/// Aggregate state of the todo app
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    /// Todos in insertion order
    pub todos: TodoList,
    /// Id of the selected todo
    ///
    /// This is a reference by key only. Removing a todo does not clear the
    /// selection, so the id may name a todo that no longer exists; resolve it
    /// with [`AppState::selected`].
    pub selected_todo: Option<TodoId>,
    /// Number of create/edit/toggle/remove actions applied so far
    pub counter: u64,
}

impl AppState {
    /// The initial state: [`SEED_TODOS`] with fresh ids, nothing selected, counter at zero
    #[must_use]
    pub fn seeded(ids: &dyn IdGenerator) -> Self {
        let todos = SEED_TODOS
            .iter()
            .map(|&(desc, is_complete)| Todo {
                id: TodoId::new(ids.next_id()),
                desc: desc.to_string(),
                is_complete,
            })
            .collect();

        Self {
            todos,
            selected_todo: None,
            counter: 0,
        }
    }

    /// Resolve the selection, if it still points at an existing todo
    #[must_use]
    pub fn selected(&self) -> Option<&Todo> {
        self.selected_todo.as_ref().and_then(|id| self.todos.get(id))
    }
}

/// Every request to change the todo app's state
///
/// Serialized as `{ "type": "todos/create", "payload": { ... } }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum TodoAction {
    /// Append a new todo; its id comes from the environment
    #[serde(rename = "todos/create")]
    Create {
        /// Description of the new todo
        desc: String,
    },

    /// Replace a todo's description
    #[serde(rename = "todos/edit")]
    Edit {
        /// Todo to edit
        id: TodoId,
        /// New description
        desc: String,
    },

    /// Set a todo's completion flag
    #[serde(rename = "todos/toggle", rename_all = "camelCase")]
    Toggle {
        /// Todo to update
        id: TodoId,
        /// New completion flag
        is_complete: bool,
    },

    /// Remove a todo
    #[serde(rename = "todos/remove")]
    Remove {
        /// Todo to remove
        id: TodoId,
    },

    /// Point the selection at an id, existing or not
    #[serde(rename = "selectedTodo/select")]
    Select {
        /// Id to select
        id: TodoId,
    },
}

impl TodoAction {
    /// Whether this action targets the todo list (and so bumps the counter)
    #[must_use]
    pub const fn is_mutation(&self) -> bool {
        match self {
            Self::Create { .. } | Self::Edit { .. } | Self::Toggle { .. } | Self::Remove { .. } => {
                true
            },
            Self::Select { .. } => false,
        }
    }

    /// The action's type string, as it appears on the wire
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Create { .. } => "todos/create",
            Self::Edit { .. } => "todos/edit",
            Self::Toggle { .. } => "todos/toggle",
            Self::Remove { .. } => "todos/remove",
            Self::Select { .. } => "selectedTodo/select",
        }
    }
}
