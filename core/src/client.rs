//! HTTP request builder and envelope parser for the todo API.
//!
//! # Design
//! `TodoClient` holds the `base_url` and the `Session` it was constructed
//! with. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` (with `Authorization: Bearer <token>` attached whenever the
//! session holds a token) and a `parse_*` method that consumes an
//! `HttpResponse`. Neither half performs I/O; `TodoApi` drives the round-trip.
//!
//! Every response is a `{success, message, data}` envelope. The HTTP status
//! is ignored: the envelope alone decides between success and
//! `ApiError::RemoteOperation`.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::credentials::Session;
use crate::error::ApiError;
use crate::http::{HttpBody, HttpMethod, HttpRequest, HttpResponse};
use crate::types::{CreateTodo, Credentials, Envelope, RegisterUser, Todo, TodoEdit, Upload, User};

/// Public endpoint of the hosted todo service.
pub const DEFAULT_BASE_URL: &str = "https://public-api.delcom.org/api/v1";

/// Request builder and response parser bound to one session.
#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
    session: Session,
}

impl TodoClient {
    pub fn new(base_url: &str, session: Session) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    // -- auth ---------------------------------------------------------------

    pub fn build_register(&self, input: &RegisterUser) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/auth/register", input)
    }

    pub fn build_login(&self, input: &Credentials) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/auth/login", input)
    }

    pub fn parse_register(&self, response: HttpResponse) -> Result<String, ApiError> {
        Ok(open_envelope(&response)?.message)
    }

    pub fn parse_login(&self, response: HttpResponse) -> Result<String, ApiError> {
        let envelope = open_envelope(&response)?;
        data_field(&envelope, "token")
    }

    // -- users --------------------------------------------------------------

    pub fn build_me(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/users/me")
    }

    pub fn build_change_photo(&self, photo: Upload) -> HttpRequest {
        self.multipart_request("/users/photo", "photo", photo)
    }

    pub fn parse_me(&self, response: HttpResponse) -> Result<User, ApiError> {
        let envelope = open_envelope(&response)?;
        data_field(&envelope, "user")
    }

    pub fn parse_change_photo(&self, response: HttpResponse) -> Result<String, ApiError> {
        Ok(open_envelope(&response)?.message)
    }

    // -- todos --------------------------------------------------------------

    pub fn build_list_todos(&self, is_finished: bool) -> HttpRequest {
        let flag = u8::from(is_finished);
        self.request(HttpMethod::Get, &format!("/todos?is_finished={flag}"))
    }

    pub fn build_get_todo(&self, id: i64) -> HttpRequest {
        self.request(HttpMethod::Get, &format!("/todos/{id}"))
    }

    pub fn build_create_todo(&self, input: &CreateTodo) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/todos", input)
    }

    pub fn build_update_todo(&self, edit: &TodoEdit) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Put, &format!("/todos/{}", edit.id), &edit.payload())
    }

    pub fn build_delete_todo(&self, id: i64) -> HttpRequest {
        self.request(HttpMethod::Delete, &format!("/todos/{id}"))
    }

    pub fn build_change_cover(&self, id: i64, cover: Upload) -> HttpRequest {
        self.multipart_request(&format!("/todos/{id}/cover"), "cover", cover)
    }

    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<Vec<Todo>, ApiError> {
        let envelope = open_envelope(&response)?;
        data_field(&envelope, "todos")
    }

    pub fn parse_get_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        let envelope = open_envelope(&response)?;
        data_field(&envelope, "todo")
    }

    pub fn parse_create_todo(&self, response: HttpResponse) -> Result<i64, ApiError> {
        let envelope = open_envelope(&response)?;
        data_field(&envelope, "todo_id")
    }

    /// A success envelope without `data.todo_id` is rejected: the server must
    /// confirm which record changed.
    pub fn parse_update_todo(&self, response: HttpResponse) -> Result<i64, ApiError> {
        let envelope = open_envelope(&response)?;
        match envelope.data.as_ref().and_then(|d| d.get("todo_id")) {
            None | Some(Value::Null) => Err(ApiError::MalformedResponse(
                "Todo update failed: todo_id missing in response.".to_string(),
            )),
            Some(_) => data_field(&envelope, "todo_id"),
        }
    }

    pub fn parse_delete_todo(&self, response: HttpResponse) -> Result<String, ApiError> {
        Ok(open_envelope(&response)?.message)
    }

    pub fn parse_change_cover(&self, response: HttpResponse) -> Result<String, ApiError> {
        Ok(open_envelope(&response)?.message)
    }

    // -- helpers ------------------------------------------------------------

    fn auth_headers(&self) -> Vec<(String, String)> {
        match self.session.token() {
            Some(token) => vec![("authorization".to_string(), format!("Bearer {token}"))],
            None => Vec::new(),
        }
    }

    fn request(&self, method: HttpMethod, path: &str) -> HttpRequest {
        HttpRequest {
            method,
            path: format!("{}{path}", self.base_url),
            headers: self.auth_headers(),
            body: None,
        }
    }

    fn json_request<T: Serialize>(
        &self,
        method: HttpMethod,
        path: &str,
        input: &T,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input).map_err(|e| ApiError::Serialization(e.to_string()))?;
        let mut req = self.request(method, path);
        req.headers
            .push(("content-type".to_string(), "application/json".to_string()));
        req.body = Some(HttpBody::Json(body));
        Ok(req)
    }

    fn multipart_request(&self, path: &str, field: &str, file: Upload) -> HttpRequest {
        let mut req = self.request(HttpMethod::Post, path);
        req.body = Some(HttpBody::Multipart {
            field: field.to_string(),
            file,
        });
        req
    }
}

/// Decode the envelope and reject anything but `success: true`.
fn open_envelope(response: &HttpResponse) -> Result<Envelope, ApiError> {
    let envelope: Envelope = serde_json::from_str(&response.body)
        .map_err(|e| ApiError::Transport(format!("invalid response body (HTTP {}): {e}", response.status)))?;
    if !envelope.succeeded() {
        return Err(ApiError::RemoteOperation(envelope.message));
    }
    Ok(envelope)
}

/// Extract and decode `data.<field>` from a successful envelope.
fn data_field<T: DeserializeOwned>(envelope: &Envelope, field: &str) -> Result<T, ApiError> {
    let value = envelope
        .data
        .as_ref()
        .and_then(|d| d.get(field))
        .ok_or_else(|| ApiError::MalformedResponse(format!("{field} missing in response")))?;
    serde_json::from_value(value.clone())
        .map_err(|e| ApiError::MalformedResponse(format!("{field} has unexpected shape: {e}")))
}
