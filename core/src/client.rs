//! Stateless HTTP request builder and response parser for the todo API.
//!
//! # Design
//! `TodoClient` holds only a `base_url` and carries no mutable state between
//! calls. Each CRUD operation is split into a `build_*` method that produces
//! an `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! A `Transport` executes the round-trip in between.
//!
//! Any 2xx status is a success. A successful response that is not declared as
//! JSON (for example the empty body of a delete) is treated as an absent
//! value rather than an error.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{ApiError, FALLBACK_MESSAGE};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{CreateTodo, Todo, UpdateTodo};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api";

/// Stateless client for the todo API.
#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
}

impl Default for TodoClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl TodoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_list_todos(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/todos".to_string(), None)
    }

    pub fn build_get_todo(&self, id: i64) -> HttpRequest {
        self.request(HttpMethod::Get, format!("/todos/{id}"), None)
    }

    pub fn build_create_todo(&self, input: &CreateTodo) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(self.request(HttpMethod::Post, "/todos".to_string(), Some(body)))
    }

    pub fn build_update_todo(&self, id: i64, input: &UpdateTodo) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(self.request(HttpMethod::Put, format!("/todos/{id}"), Some(body)))
    }

    pub fn build_delete_todo(&self, id: i64) -> HttpRequest {
        self.request(HttpMethod::Delete, format!("/todos/{id}"), None)
    }

    /// A non-JSON success is read as an empty list.
    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<Vec<Todo>, ApiError> {
        Ok(parse_json(&response)?.unwrap_or_default())
    }

    pub fn parse_get_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        parse_json(&response)?.ok_or(ApiError::EmptyBody)
    }

    pub fn parse_create_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        parse_json(&response)?.ok_or(ApiError::EmptyBody)
    }

    pub fn parse_update_todo(&self, response: HttpResponse) -> Result<Option<Todo>, ApiError> {
        parse_json(&response)
    }

    pub fn parse_delete_todo(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    fn request(&self, method: HttpMethod, path: String, body: Option<String>) -> HttpRequest {
        let mut headers = vec![("accept".to_string(), "application/json".to_string())];
        if body.is_some() {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }
        HttpRequest {
            method,
            path: format!("{}{path}", self.base_url),
            headers,
            body,
        }
    }
}

fn parse_json<T: DeserializeOwned>(response: &HttpResponse) -> Result<Option<T>, ApiError> {
    check_status(response)?;
    if !response.is_json() {
        return Ok(None);
    }
    serde_json::from_str(&response.body)
        .map(Some)
        .map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    let message = error_message(&response.body);
    Err(match response.status {
        404 => ApiError::NotFound { message },
        422 => ApiError::Validation { message },
        status => ApiError::Http { status, message },
    })
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|body| body.message)
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| FALLBACK_MESSAGE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> TodoClient {
        TodoClient::new("http://localhost:8000/api")
    }

    fn json_response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: body.to_string(),
        }
    }

    fn empty_response(status: u16) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: String::new(),
        }
    }

    #[test]
    fn build_list_todos_produces_correct_request() {
        let req = client().build_list_todos();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:8000/api/todos");
        assert!(req.body.is_none());
        assert_eq!(
            req.headers,
            vec![("accept".to_string(), "application/json".to_string())]
        );
    }

    #[test]
    fn build_get_todo_produces_correct_request() {
        let req = client().build_get_todo(7);
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:8000/api/todos/7");
        assert!(req.body.is_none());
    }

    #[test]
    fn build_create_todo_produces_correct_request() {
        let input = CreateTodo {
            text: "Buy milk".to_string(),
            completed: false,
        };
        let req = client().build_create_todo(&input).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:8000/api/todos");
        assert!(req
            .headers
            .contains(&("content-type".to_string(), "application/json".to_string())));
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({"text": "Buy milk", "completed": false}));
    }

    #[test]
    fn build_update_todo_sends_only_present_fields() {
        let input = UpdateTodo {
            text: None,
            completed: Some(true),
        };
        let req = client().build_update_todo(3, &input).unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.path, "http://localhost:8000/api/todos/3");
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({"completed": true}));
    }

    #[test]
    fn build_delete_todo_produces_correct_request() {
        let req = client().build_delete_todo(3);
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.path, "http://localhost:8000/api/todos/3");
        assert!(req.body.is_none());
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = TodoClient::new("http://localhost:8000/api/");
        assert_eq!(client.build_list_todos().path, "http://localhost:8000/api/todos");
    }

    #[test]
    fn default_points_at_local_api() {
        assert_eq!(TodoClient::default().base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn parse_list_todos_success() {
        let response = json_response(200, r#"[{"id":1,"text":"Test","completed":false}]"#);
        let todos = client().parse_list_todos(response).unwrap();
        assert_eq!(todos, vec![Todo::new(1, "Test", false)]);
    }

    #[test]
    fn parse_list_todos_without_json_is_empty() {
        let todos = client().parse_list_todos(empty_response(200)).unwrap();
        assert!(todos.is_empty());
    }

    #[test]
    fn parse_list_todos_bad_json() {
        let err = client()
            .parse_list_todos(json_response(200, "not json"))
            .unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }

    #[test]
    fn parse_create_todo_accepts_200_and_201() {
        for status in [200, 201] {
            let response = json_response(status, r#"{"id":1,"text":"New","completed":false}"#);
            let todo = client().parse_create_todo(response).unwrap();
            assert_eq!(todo.text, "New");
        }
    }

    #[test]
    fn parse_create_todo_without_json_is_empty_body() {
        let err = client().parse_create_todo(empty_response(201)).unwrap_err();
        assert!(matches!(err, ApiError::EmptyBody));
    }

    #[test]
    fn error_message_comes_from_body() {
        let response = json_response(422, r#"{"message":"The text field is required."}"#);
        let err = client().parse_create_todo(response).unwrap_err();
        assert!(matches!(err, ApiError::Validation { .. }));
        assert_eq!(err.server_message(), Some("The text field is required."));
    }

    #[test]
    fn error_message_falls_back_without_json() {
        let response = HttpResponse {
            status: 500,
            headers: Vec::new(),
            body: "internal error".to_string(),
        };
        let err = client().parse_create_todo(response).unwrap_err();
        assert!(matches!(err, ApiError::Http { status: 500, .. }));
        assert_eq!(err.server_message(), Some(FALLBACK_MESSAGE));
    }

    #[test]
    fn empty_error_message_falls_back() {
        let err = client()
            .parse_update_todo(json_response(500, r#"{"message":""}"#))
            .unwrap_err();
        assert_eq!(err.server_message(), Some(FALLBACK_MESSAGE));
    }

    #[test]
    fn parse_get_todo_not_found() {
        let response = json_response(404, r#"{"message":"Todo not found."}"#);
        let err = client().parse_get_todo(response).unwrap_err();
        assert!(matches!(err, ApiError::NotFound { ref message } if message == "Todo not found."));
    }

    #[test]
    fn parse_update_todo_success() {
        let response = json_response(200, r#"{"id":1,"text":"Updated","completed":true}"#);
        let todo = client().parse_update_todo(response).unwrap().unwrap();
        assert_eq!(todo, Todo::new(1, "Updated", true));
    }

    #[test]
    fn parse_update_todo_without_json_is_none() {
        assert!(client().parse_update_todo(empty_response(204)).unwrap().is_none());
    }

    #[test]
    fn parse_delete_todo_success() {
        assert!(client().parse_delete_todo(empty_response(204)).is_ok());
    }

    #[test]
    fn parse_delete_todo_not_found() {
        let err = client().parse_delete_todo(empty_response(404)).unwrap_err();
        assert!(matches!(err, ApiError::NotFound { .. }));
    }
}
