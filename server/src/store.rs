//! Persistence seam for todo records.
//!
//! Handlers only see `dyn TodoStore`; `MemoryStore` is the implementation the
//! binary and the tests use. Ids are assigned by the store, starting at 1.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: i64,
    pub text: String,
    pub completed: bool,
}

/// A validated create payload. `text` is already trimmed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewTodo {
    pub text: String,
    pub completed: bool,
}

/// A validated update payload. `None` leaves the stored field untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TodoChanges {
    pub text: Option<String>,
    pub completed: Option<bool>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait TodoStore: Send + Sync {
    /// All records in id order.
    async fn list(&self) -> StoreResult<Vec<Todo>>;

    async fn get(&self, id: i64) -> StoreResult<Option<Todo>>;

    async fn create(&self, input: NewTodo) -> StoreResult<Todo>;

    /// Returns the updated record, or `None` if `id` does not exist.
    async fn update(&self, id: i64, changes: TodoChanges) -> StoreResult<Option<Todo>>;

    /// Returns `false` if `id` does not exist.
    async fn delete(&self, id: i64) -> StoreResult<bool>;
}

#[derive(Debug)]
struct Records {
    next_id: i64,
    todos: BTreeMap<i64, Todo>,
}

#[derive(Debug)]
pub struct MemoryStore {
    inner: RwLock<Records>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Records {
                next_id: 1,
                todos: BTreeMap::new(),
            }),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn list(&self) -> StoreResult<Vec<Todo>> {
        let records = self.inner.read().await;
        Ok(records.todos.values().cloned().collect())
    }

    async fn get(&self, id: i64) -> StoreResult<Option<Todo>> {
        let records = self.inner.read().await;
        Ok(records.todos.get(&id).cloned())
    }

    async fn create(&self, input: NewTodo) -> StoreResult<Todo> {
        let mut records = self.inner.write().await;
        let id = records.next_id;
        records.next_id += 1;
        let todo = Todo {
            id,
            text: input.text,
            completed: input.completed,
        };
        records.todos.insert(id, todo.clone());
        Ok(todo)
    }

    async fn update(&self, id: i64, changes: TodoChanges) -> StoreResult<Option<Todo>> {
        let mut records = self.inner.write().await;
        let Some(todo) = records.todos.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(text) = changes.text {
            todo.text = text;
        }
        if let Some(completed) = changes.completed {
            todo.completed = completed;
        }
        Ok(Some(todo.clone()))
    }

    async fn delete(&self, id: i64) -> StoreResult<bool> {
        let mut records = self.inner.write().await;
        Ok(records.todos.remove(&id).is_some())
    }
}
