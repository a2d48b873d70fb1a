//! Client-side owner of the todo list.
//!
//! # Design
//! `TodoSync` keeps the authoritative in-memory list and applies every
//! mutation optimistically before the server has answered. When the server
//! rejects a mutation it recovers per operation:
//!
//! - `add` keeps a locally synthesized record marked `unconfirmed`,
//! - `toggle` flips the record back,
//! - `update` and `delete` reload the list from the server (or the mirror).
//!
//! Failures never escape an operation; they end up in `error` as a short
//! message and the cause is logged. Every change to the list is written
//! through to the `MirrorStore`.
//!
//! Methods take `&self` and state is locked only between await points, so
//! several operations may be in flight at once. Their effects interleave in
//! completion order; there is no per-record locking, and `loading` reflects
//! whichever operation finished last.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tracing::{debug, warn};

use crate::client::TodoClient;
use crate::error::ApiError;
use crate::filter::FilterStatus;
use crate::http::{HttpRequest, HttpResponse};
use crate::mirror::MirrorStore;
use crate::transport::Transport;
use crate::types::{CreateTodo, Todo, UpdateTodo};

pub const LOAD_FAILED: &str = "failed to load todos";
pub const ADD_FAILED: &str = "failed to add todo";
pub const TOGGLE_FAILED: &str = "failed to update todo status";
pub const UPDATE_FAILED: &str = "failed to update todo";
pub const DELETE_FAILED: &str = "failed to delete todo";

/// Everything a view needs, read under one lock.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncSnapshot {
    pub todos: Vec<Todo>,
    pub filter_status: FilterStatus,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Default)]
struct SyncState {
    todos: Vec<Todo>,
    filter_status: FilterStatus,
    loading: bool,
    error: Option<String>,
}

pub struct TodoSync {
    client: TodoClient,
    transport: Arc<dyn Transport>,
    mirror: Arc<dyn MirrorStore>,
    state: Mutex<SyncState>,
}

/// Clears `loading` when the operation that set it returns, on every path.
struct Loading<'a> {
    sync: &'a TodoSync,
}

impl Drop for Loading<'_> {
    fn drop(&mut self) {
        self.sync.state().loading = false;
    }
}

impl TodoSync {
    /// An engine with an empty list. Nothing is fetched until `load`.
    pub fn new(client: TodoClient, transport: Arc<dyn Transport>, mirror: Arc<dyn MirrorStore>) -> Self {
        Self {
            client,
            transport,
            mirror,
            state: Mutex::new(SyncState::default()),
        }
    }

    /// Construct and run the initial load exactly once.
    pub async fn mount(
        client: TodoClient,
        transport: Arc<dyn Transport>,
        mirror: Arc<dyn MirrorStore>,
    ) -> Self {
        let sync = Self::new(client, transport, mirror);
        sync.load().await;
        sync
    }

    pub fn todos(&self) -> Vec<Todo> {
        self.state().todos.clone()
    }

    /// The todos matching the current filter, derived on every call.
    pub fn filtered(&self) -> Vec<Todo> {
        let state = self.state();
        state.filter_status.apply(&state.todos)
    }

    pub fn filter_status(&self) -> FilterStatus {
        self.state().filter_status
    }

    pub fn is_loading(&self) -> bool {
        self.state().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state().error.clone()
    }

    /// Records created locally while the server was failing.
    pub fn unconfirmed(&self) -> Vec<Todo> {
        self.state()
            .todos
            .iter()
            .filter(|todo| todo.unconfirmed)
            .cloned()
            .collect()
    }

    pub fn snapshot(&self) -> SyncSnapshot {
        let state = self.state();
        SyncSnapshot {
            todos: state.todos.clone(),
            filter_status: state.filter_status,
            loading: state.loading,
            error: state.error.clone(),
        }
    }

    pub fn set_filter_status(&self, status: FilterStatus) {
        self.state().filter_status = status;
    }

    /// Replace the list with the server's. If the server fails, fall back to
    /// the mirror; with no usable mirror the list is left as it was and an
    /// empty list is returned.
    pub async fn load(&self) -> Vec<Todo> {
        let _loading = self.begin();
        self.fetch_or_fallback().await
    }

    pub async fn refresh(&self) -> Vec<Todo> {
        self.load().await
    }

    pub async fn add(&self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        let _loading = self.begin();

        let input = CreateTodo {
            text: text.to_string(),
            completed: false,
        };
        let created = self.create_remote(&input).await;
        match created {
            Ok(todo) => {
                debug!(id = todo.id, "todo created");
                self.change_todos(|todos| todos.push(todo));
            }
            Err(err) => {
                warn!(error = %err, "create failed, keeping todo locally");
                self.set_error(ADD_FAILED);
                let now = Utc::now().timestamp_millis();
                self.change_todos(|todos| {
                    let id = unused_id(todos, now);
                    todos.push(Todo::unconfirmed(id, input.text));
                });
            }
        }
    }

    /// Flip `completed`. Unknown ids are ignored without a request.
    pub async fn toggle(&self, id: i64) {
        let Some(before) = self.find(id) else {
            debug!(id, "toggle ignored, no such todo");
            return;
        };
        let _loading = self.begin();

        let completed = !before.completed;
        self.change_todos(|todos| {
            if let Some(todo) = find_mut(todos, id) {
                todo.completed = completed;
            }
        });

        let changes = UpdateTodo {
            text: None,
            completed: Some(completed),
        };
        if let Err(err) = self.update_remote(id, &changes).await {
            warn!(id, error = %err, "toggle failed, flipping back");
            self.set_error(TOGGLE_FAILED);
            // Undo only this toggle's flip. Other toggles in flight on the
            // same record roll back their own, in any completion order.
            self.change_todos(|todos| {
                if let Some(todo) = find_mut(todos, id) {
                    todo.completed = !todo.completed;
                }
            });
        }
    }

    pub async fn update(&self, id: i64, new_text: &str) {
        let text = new_text.trim();
        if text.is_empty() {
            return;
        }
        let _loading = self.begin();

        self.change_todos(|todos| {
            if let Some(todo) = find_mut(todos, id) {
                todo.text = text.to_string();
            }
        });

        let changes = UpdateTodo {
            text: Some(text.to_string()),
            completed: None,
        };
        if let Err(err) = self.update_remote(id, &changes).await {
            warn!(id, error = %err, "update failed, reloading");
            self.set_error(UPDATE_FAILED);
            self.fetch_or_fallback().await;
        }
    }

    pub async fn delete(&self, id: i64) {
        let _loading = self.begin();

        self.change_todos(|todos| todos.retain(|todo| todo.id != id));

        if let Err(err) = self.delete_remote(id).await {
            warn!(id, error = %err, "delete failed, reloading");
            self.set_error(DELETE_FAILED);
            self.fetch_or_fallback().await;
        }
    }

    fn state(&self) -> MutexGuard<'_, SyncState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self) -> Loading<'_> {
        let mut state = self.state();
        state.loading = true;
        state.error = None;
        Loading { sync: self }
    }

    fn set_error(&self, message: &str) {
        self.state().error = Some(message.to_string());
    }

    fn find(&self, id: i64) -> Option<Todo> {
        self.state().todos.iter().find(|todo| todo.id == id).cloned()
    }

    /// Apply `f` to the list and write the result through to the mirror.
    ///
    /// The mirror write runs under the state lock and may block on file I/O.
    /// It is one small slot, and holding the lock keeps mirror writes in the
    /// same order as the changes they record.
    fn change_todos<R>(&self, f: impl FnOnce(&mut Vec<Todo>) -> R) -> R {
        let mut state = self.state();
        let result = f(&mut state.todos);
        if let Err(err) = self.mirror.write(&state.todos) {
            warn!(error = %err, "mirror write failed");
        }
        result
    }

    /// Shared by `load` and the post-failure reload. Does not clear an error
    /// that is already set; a failing fetch replaces it.
    async fn fetch_or_fallback(&self) -> Vec<Todo> {
        match self.fetch_all().await {
            Ok(todos) => {
                debug!(count = todos.len(), "todos loaded from server");
                self.change_todos(|current| current.clone_from(&todos));
                todos
            }
            Err(err) => {
                warn!(error = %err, "load failed, trying mirror");
                self.set_error(LOAD_FAILED);
                self.adopt_mirror()
            }
        }
    }

    fn adopt_mirror(&self) -> Vec<Todo> {
        match self.mirror.read() {
            Ok(Some(todos)) => {
                debug!(count = todos.len(), "todos loaded from mirror");
                self.change_todos(|current| current.clone_from(&todos));
                todos
            }
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(error = %err, "mirror unreadable");
                Vec::new()
            }
        }
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = %request.method, path = %request.path, "api request");
        let response = self.transport.execute(request).await?;
        debug!(status = response.status, "api response");
        Ok(response)
    }

    async fn fetch_all(&self) -> Result<Vec<Todo>, ApiError> {
        let response = self.send(self.client.build_list_todos()).await?;
        self.client.parse_list_todos(response)
    }

    async fn create_remote(&self, input: &CreateTodo) -> Result<Todo, ApiError> {
        let request = self.client.build_create_todo(input)?;
        let response = self.send(request).await?;
        self.client.parse_create_todo(response)
    }

    async fn update_remote(&self, id: i64, changes: &UpdateTodo) -> Result<Option<Todo>, ApiError> {
        let request = self.client.build_update_todo(id, changes)?;
        let response = self.send(request).await?;
        self.client.parse_update_todo(response)
    }

    async fn delete_remote(&self, id: i64) -> Result<(), ApiError> {
        let response = self.send(self.client.build_delete_todo(id)).await?;
        self.client.parse_delete_todo(response)
    }
}

fn find_mut(todos: &mut [Todo], id: i64) -> Option<&mut Todo> {
    todos.iter_mut().find(|todo| todo.id == id)
}

/// `candidate`, bumped until no existing record uses it.
fn unused_id(todos: &[Todo], mut candidate: i64) -> i64 {
    while todos.iter().any(|todo| todo.id == candidate) {
        candidate += 1;
    }
    candidate
}
