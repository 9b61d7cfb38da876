//! Async remote client: one method per endpoint of the todo service.
//!
//! Each method builds a request with `TodoClient`, executes it once on the
//! configured `Transport`, and parses the envelope. Nothing here touches the
//! view snapshot.

use std::sync::Arc;

use crate::client::TodoClient;
use crate::config::ClientConfig;
use crate::credentials::Session;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{ReqwestTransport, Transport};
use crate::types::{CreateTodo, Credentials, RegisterUser, Todo, TodoEdit, Upload, User};

/// Remote client bound to a session and a transport.
#[derive(Clone)]
pub struct TodoApi {
    client: TodoClient,
    transport: Arc<dyn Transport>,
}

impl TodoApi {
    pub fn new(client: TodoClient, transport: Arc<dyn Transport>) -> Self {
        Self { client, transport }
    }

    /// Client over `ReqwestTransport` for `base_url` and `session`.
    pub fn connect(base_url: &str, session: Session) -> Self {
        Self::new(
            TodoClient::new(base_url, session),
            Arc::new(ReqwestTransport::new()),
        )
    }

    /// Client for a loaded config, with the session persisted at
    /// `config.credentials_path`.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::connect(&config.base_url, Session::from_file(&config.credentials_path))
    }

    pub fn session(&self) -> &Session {
        self.client.session()
    }

    pub fn client(&self) -> &TodoClient {
        &self.client
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        tracing::debug!(method = request.method.as_str(), path = %request.path, "sending request");
        self.transport.execute(request).await
    }

    pub async fn register(&self, input: &RegisterUser) -> Result<String, ApiError> {
        let response = self.send(self.client.build_register(input)?).await?;
        self.client.parse_register(response)
    }

    /// Log in and store the returned token in the session.
    pub async fn login(&self, input: &Credentials) -> Result<String, ApiError> {
        let response = self.send(self.client.build_login(input)?).await?;
        let token = self.client.parse_login(response)?;
        self.session().set_token(&token)?;
        tracing::info!("session token stored");
        Ok(token)
    }

    pub fn logout(&self) -> Result<(), ApiError> {
        self.session().logout()?;
        Ok(())
    }

    pub async fn me(&self) -> Result<User, ApiError> {
        let response = self.send(self.client.build_me()).await?;
        self.client.parse_me(response)
    }

    pub async fn change_photo(&self, photo: Upload) -> Result<String, ApiError> {
        let response = self.send(self.client.build_change_photo(photo)).await?;
        self.client.parse_change_photo(response)
    }

    pub async fn list_todos(&self, is_finished: bool) -> Result<Vec<Todo>, ApiError> {
        let response = self.send(self.client.build_list_todos(is_finished)).await?;
        self.client.parse_list_todos(response)
    }

    pub async fn get_todo(&self, id: i64) -> Result<Todo, ApiError> {
        let response = self.send(self.client.build_get_todo(id)).await?;
        self.client.parse_get_todo(response)
    }

    pub async fn create_todo(&self, input: &CreateTodo) -> Result<i64, ApiError> {
        let response = self.send(self.client.build_create_todo(input)?).await?;
        self.client.parse_create_todo(response)
    }

    pub async fn update_todo(&self, edit: &TodoEdit) -> Result<i64, ApiError> {
        let response = self.send(self.client.build_update_todo(edit)?).await?;
        self.client.parse_update_todo(response)
    }

    pub async fn delete_todo(&self, id: i64) -> Result<String, ApiError> {
        let response = self.send(self.client.build_delete_todo(id)).await?;
        self.client.parse_delete_todo(response)
    }

    pub async fn change_cover(&self, id: i64, cover: Upload) -> Result<String, ApiError> {
        let response = self.send(self.client.build_change_cover(id, cover)).await?;
        self.client.parse_change_cover(response)
    }
}

impl std::fmt::Debug for TodoApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoApi")
            .field("base_url", &self.client.base_url())
            .field("session", self.client.session())
            .finish()
    }
}
