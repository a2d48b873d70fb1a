//! Request body validation.
//!
//! Bodies are taken as raw JSON so that a present-but-wrong field (for example
//! `"completed": null`) can be told apart from an absent one.

use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::store::{NewTodo, TodoChanges};

pub const MAX_TEXT_LEN: usize = 255;

pub fn new_todo(body: &Value) -> Result<NewTodo, ApiError> {
    let fields = object(body)?;
    let text = match fields.get("text") {
        Some(value) => text(value)?,
        None => return Err(ApiError::validation("text", "The text field is required.")),
    };
    let completed = match fields.get("completed") {
        Some(value) => completed(value)?,
        None => false,
    };
    Ok(NewTodo { text, completed })
}

pub fn todo_changes(body: &Value) -> Result<TodoChanges, ApiError> {
    let fields = object(body)?;
    Ok(TodoChanges {
        text: fields.get("text").map(text).transpose()?,
        completed: fields.get("completed").map(completed).transpose()?,
    })
}

fn object(body: &Value) -> Result<&Map<String, Value>, ApiError> {
    body.as_object()
        .ok_or_else(|| ApiError::MalformedBody("expected an object".to_string()))
}

fn text(value: &Value) -> Result<String, ApiError> {
    let Value::String(raw) = value else {
        return Err(ApiError::validation("text", "The text field must be a string."));
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("text", "The text field is required."));
    }
    if trimmed.chars().count() > MAX_TEXT_LEN {
        return Err(ApiError::validation(
            "text",
            format!("The text field must not be greater than {MAX_TEXT_LEN} characters."),
        ));
    }
    Ok(trimmed.to_string())
}

/// Accepts JSON booleans and the integers 0 and 1.
fn completed(value: &Value) -> Result<bool, ApiError> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Number(n) if n.as_u64() == Some(0) => Ok(false),
        Value::Number(n) if n.as_u64() == Some(1) => Ok(true),
        _ => Err(ApiError::validation(
            "completed",
            "The completed field must be true or false.",
        )),
    }
}
