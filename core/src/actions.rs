//! User intents and the attempt phase of each one.
//!
//! Every function here is a plain async function: it calls the remote client
//! once and, on success, returns the transition the caller should apply. The
//! loading bookkeeping around it lives in `Store::dispatch`.

use crate::api::TodoApi;
use crate::error::ApiError;
use crate::state::Transition;
use crate::types::{CreateTodo, TodoEdit};

/// Which intent an action belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    List,
    Create,
    ReadOne,
    Update,
    Delete,
}

impl OperationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OperationKind::List => "list",
            OperationKind::Create => "create",
            OperationKind::ReadOne => "read-one",
            OperationKind::Update => "update",
            OperationKind::Delete => "delete",
        }
    }
}

/// A user intent together with its input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    List { is_finished: bool },
    Create(CreateTodo),
    ReadOne { id: i64 },
    Update(TodoEdit),
    Delete { id: i64 },
}

impl Action {
    pub fn kind(&self) -> OperationKind {
        match self {
            Action::List { .. } => OperationKind::List,
            Action::Create(_) => OperationKind::Create,
            Action::ReadOne { .. } => OperationKind::ReadOne,
            Action::Update(_) => OperationKind::Update,
            Action::Delete { .. } => OperationKind::Delete,
        }
    }
}

/// Run the attempt phase of `action`.
pub async fn perform(api: &TodoApi, action: Action) -> Result<Transition, ApiError> {
    match action {
        Action::List { is_finished } => list_todos(api, is_finished).await,
        Action::Create(input) => create_todo(api, &input).await,
        Action::ReadOne { id } => read_todo(api, id).await,
        Action::Update(edit) => update_todo(api, edit).await,
        Action::Delete { id } => delete_todo(api, id).await,
    }
}

pub async fn list_todos(api: &TodoApi, is_finished: bool) -> Result<Transition, ApiError> {
    let todos = api.list_todos(is_finished).await?;
    Ok(Transition::TodosReplaced(todos))
}

/// The created record is not inserted locally; list again to see it.
pub async fn create_todo(api: &TodoApi, input: &CreateTodo) -> Result<Transition, ApiError> {
    let id = api.create_todo(input).await?;
    tracing::debug!(todo_id = id, "todo created");
    Ok(Transition::Added)
}

pub async fn read_todo(api: &TodoApi, id: i64) -> Result<Transition, ApiError> {
    let todo = api.get_todo(id).await?;
    Ok(Transition::DetailReplaced(todo))
}

pub async fn update_todo(api: &TodoApi, edit: TodoEdit) -> Result<Transition, ApiError> {
    api.update_todo(&edit).await?;
    Ok(Transition::Updated(edit))
}

/// The deleted record stays in the snapshot until the next list.
pub async fn delete_todo(api: &TodoApi, id: i64) -> Result<Transition, ApiError> {
    api.delete_todo(id).await?;
    Ok(Transition::Deleted)
}
