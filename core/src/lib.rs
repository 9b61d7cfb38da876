//! State-synchronization core for a remote todo service.
//!
//! # Overview
//! Binds user intents (list, create, read-one, update, delete) to calls
//! against a REST service that wraps every response in a
//! `{success, message, data}` envelope, and folds the results into an
//! immutable `ViewSnapshot` for a presentation layer to render.
//!
//! # Design
//! - `TodoClient` builds `HttpRequest` values and parses `HttpResponse`
//!   values without touching the network (host-does-IO). `TodoApi` pairs it
//!   with a `Transport` to perform the round-trip.
//! - The bearer token lives in a `CredentialStore` reached through an
//!   explicit `Session`, never through global state.
//! - `actions` are plain async functions returning the `Transition` to apply;
//!   `Store` applies it between `LoadingStarted` and `LoadingFinished`.
//! - `state::reduce` is pure.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod actions;
pub mod api;
pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod http;
pub mod state;
pub mod store;
pub mod transport;
pub mod types;

pub use actions::{Action, OperationKind};
pub use api::TodoApi;
pub use client::{TodoClient, DEFAULT_BASE_URL};
pub use config::ClientConfig;
pub use credentials::{CredentialStore, FileCredentialStore, MemoryCredentialStore, Session};
pub use error::{ApiError, StoreError};
pub use http::{HttpBody, HttpMethod, HttpRequest, HttpResponse};
pub use state::{reduce, Outcomes, Transition, ViewSnapshot};
pub use store::{Notifier, Store, TracingNotifier};
pub use transport::{ReqwestTransport, Transport};
pub use types::{CreateTodo, Credentials, RegisterUser, Todo, TodoEdit, UpdateTodo, Upload, User};
