//! Domain DTOs for the todo API.
//!
//! # Design
//! These types mirror the server's schema but are defined independently;
//! integration tests catch any drift. `Todo::unconfirmed` exists only on the
//! client: it marks records that were synthesized locally after a failed
//! create and is omitted from JSON unless set.

use serde::{Deserialize, Serialize};

/// A single todo item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: i64,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub unconfirmed: bool,
}

impl Todo {
    pub fn new(id: i64, text: impl Into<String>, completed: bool) -> Self {
        Self {
            id,
            text: text.into(),
            completed,
            unconfirmed: false,
        }
    }

    /// A record the server has never acknowledged.
    pub fn unconfirmed(id: i64, text: impl Into<String>) -> Self {
        Self {
            unconfirmed: true,
            ..Self::new(id, text, false)
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Request payload for creating a new todo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTodo {
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

/// Request payload for updating an existing todo. Only the fields present in
/// the JSON are applied; omitted fields remain unchanged on the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTodo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}
