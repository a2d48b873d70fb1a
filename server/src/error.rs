//! Error responses for the todo API.
//!
//! Every failure is rendered as a JSON body with a `message` field, which is
//! what the client reads back. Validation failures also carry an `errors` map
//! keyed by field name.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Todo not found.")]
    NotFound,

    #[error("{message}")]
    Validation { field: &'static str, message: String },

    #[error("The request body must be a JSON object: {0}")]
    MalformedBody(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        ApiError::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Validation { .. } | ApiError::MalformedBody(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::MalformedBody(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::Validation { field, message } => {
                let mut errors = Map::new();
                errors.insert((*field).to_string(), json!([message]));
                json!({ "message": message, "errors": Value::Object(errors) })
            }
            ApiError::Store(err) => {
                tracing::error!(error = %err, "store failure");
                json!({ "message": "Server Error" })
            }
            other => json!({ "message": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}
