use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::Value;
use tokio::net::TcpListener;

pub mod config;
pub mod error;
pub mod store;
pub mod validate;

pub use config::ServerConfig;
pub use error::ApiError;
pub use store::{MemoryStore, NewTodo, StoreError, StoreResult, Todo, TodoChanges, TodoStore};

pub type Db = Arc<dyn TodoStore>;

/// Router over a fresh in-memory store.
pub fn app() -> Router {
    app_with_store(Arc::new(MemoryStore::new()))
}

/// All routes live under `/api`.
pub fn app_with_store(db: Db) -> Router {
    let todos = Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/{id}", get(get_todo).put(update_todo).delete(delete_todo))
        .with_state(db);
    Router::new().nest("/api", todos)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Non-numeric ids can never name a record, so they are reported as 404.
fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse().map_err(|_| ApiError::NotFound)
}

async fn list_todos(State(db): State<Db>) -> Result<Json<Vec<Todo>>, ApiError> {
    Ok(Json(db.list().await?))
}

async fn create_todo(
    State(db): State<Db>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    let Json(body) = body?;
    let input = validate::new_todo(&body)?;
    let todo = db.create(input).await?;
    tracing::debug!(id = todo.id, "created todo");
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn get_todo(State(db): State<Db>, Path(id): Path<String>) -> Result<Json<Todo>, ApiError> {
    let id = parse_id(&id)?;
    db.get(id).await?.map(Json).ok_or(ApiError::NotFound)
}

async fn update_todo(
    State(db): State<Db>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Todo>, ApiError> {
    let id = parse_id(&id)?;
    let Json(body) = body?;
    let changes = validate::todo_changes(&body)?;
    let todo = db.update(id, changes).await?.ok_or(ApiError::NotFound)?;
    tracing::debug!(id, completed = todo.completed, "updated todo");
    Ok(Json(todo))
}

async fn delete_todo(State(db): State<Db>, Path(id): Path<String>) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    if db.delete(id).await? {
        tracing::debug!(id, "deleted todo");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}
