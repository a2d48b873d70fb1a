//! Client core for the todo service.
//!
//! # Overview
//! `TodoClient` builds `HttpRequest` values and parses `HttpResponse` values
//! without touching the network (host-does-IO pattern); a `Transport` does
//! the round-trip. `TodoSync` sits on top: it owns the in-memory list,
//! applies mutations optimistically, recovers from server failures and keeps
//! a `MirrorStore` copy for offline loads.
//!
//! # Design
//! - `TodoClient` is stateless; it holds only `base_url`.
//! - Each CRUD operation is split into `build_*` and `parse_*`, so the I/O
//!   boundary is explicit and unit tests need no server.
//! - `Transport` and `MirrorStore` are injected into `TodoSync`, so tests can
//!   script the server and inspect the mirror.
//! - DTOs are defined independently from the server crate; integration tests
//!   catch schema drift.

pub mod client;
pub mod error;
pub mod filter;
pub mod http;
pub mod mirror;
pub mod sync;
pub mod transport;
pub mod types;

pub use client::TodoClient;
pub use error::ApiError;
pub use filter::FilterStatus;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use mirror::{FileMirror, MemoryMirror, MirrorError, MirrorStore};
pub use sync::{SyncSnapshot, TodoSync};
pub use transport::{ReqwestTransport, Transport};
pub use types::{CreateTodo, Todo, UpdateTodo};
