//! Full session lifecycle against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives every remote
//! operation and every action through `ReqwestTransport` over real HTTP,
//! checking the snapshot after each step. Catches schema drift between the
//! client DTOs and the server.

use std::sync::Arc;

use parking_lot::Mutex;
use todo_sync::{
    Action, ApiError, CreateTodo, Credentials, FileCredentialStore, Notifier, RegisterUser, Session,
    Store, TodoApi, TodoEdit, Upload,
};

#[derive(Default)]
struct Dialogs(Mutex<Vec<String>>);

impl Notifier for Dialogs {
    fn notify_error(&self, message: &str) {
        self.0.lock().push(message.to_string());
    }
}

async fn start_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(mock_server::run(listener));
    format!("http://{addr}")
}

fn png() -> Upload {
    Upload {
        file_name: "cover.png".to_string(),
        mime: "image/png".to_string(),
        bytes: vec![0x89, b'P', b'N', b'G'],
    }
}

#[tokio::test]
async fn session_lifecycle() {
    let base_url = start_server().await;
    let dir = tempfile::TempDir::new().unwrap();
    let creds = dir.path().join("credentials.json");
    let api = TodoApi::connect(&base_url, Session::new(Arc::new(FileCredentialStore::new(&creds))));
    let dialogs = Arc::new(Dialogs::default());
    let store = Store::new(dialogs.clone());

    // Step 1: register and log in; the token is persisted.
    let message = api
        .register(&RegisterUser {
            name: "Ann".to_string(),
            email: "ann@example.com".to_string(),
            password: "secret".to_string(),
        })
        .await
        .unwrap();
    assert!(!message.is_empty());

    let token = api
        .login(&Credentials {
            email: "ann@example.com".to_string(),
            password: "secret".to_string(),
        })
        .await
        .unwrap();
    let reopened = Session::from_file(&creds);
    assert_eq!(reopened.token().as_deref(), Some(token.as_str()));

    let me = api.me().await.unwrap();
    assert_eq!(me.name, "Ann");
    assert!(me.photo.is_none());

    // Step 2: list: empty.
    store.dispatch(&api, Action::List { is_finished: false }).await.unwrap();
    assert!(store.snapshot().todos.is_empty());

    // Step 3: create: flags the outcome but does not insert locally.
    store
        .dispatch(
            &api,
            Action::Create(CreateTodo {
                title: "Write report".to_string(),
                description: "Q3".to_string(),
            }),
        )
        .await
        .unwrap();
    let snapshot = store.snapshot();
    assert!(snapshot.outcomes.add);
    assert!(snapshot.todos.is_empty());

    // Step 4: re-list picks it up.
    store.dispatch(&api, Action::List { is_finished: false }).await.unwrap();
    let todos = store.snapshot().todos;
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0].title, "Write report");
    assert!(!todos[0].is_finished);
    let id = todos[0].id;

    // Step 5: read one.
    store.dispatch(&api, Action::ReadOne { id }).await.unwrap();
    assert_eq!(store.snapshot().detail_todo.as_ref().map(|t| t.id), Some(id));

    // Step 6: update merges locally.
    store
        .dispatch(
            &api,
            Action::Update(TodoEdit {
                id,
                title: "Write final report".to_string(),
                description: "Q3".to_string(),
                is_finished: true,
            }),
        )
        .await
        .unwrap();
    let snapshot = store.snapshot();
    assert!(snapshot.outcomes.update);
    assert_eq!(snapshot.todos[0].title, "Write final report");
    assert!(snapshot.detail_todo.as_ref().unwrap().is_finished);

    // Step 7: the server agrees.
    let finished = api.list_todos(true).await.unwrap();
    assert_eq!(finished.len(), 1);
    assert!(api.list_todos(false).await.unwrap().is_empty());

    // Step 8: uploads.
    api.change_cover(id, png()).await.unwrap();
    assert!(api.get_todo(id).await.unwrap().cover.is_some());
    api.change_photo(png()).await.unwrap();
    assert!(api.me().await.unwrap().photo.is_some());

    // Step 9: delete: the snapshot keeps the record until the next list.
    store.dispatch(&api, Action::Delete { id }).await.unwrap();
    let snapshot = store.snapshot();
    assert!(snapshot.outcomes.delete);
    assert_eq!(snapshot.todos.len(), 1);
    store.dispatch(&api, Action::List { is_finished: true }).await.unwrap();
    assert!(store.snapshot().todos.is_empty());

    // Step 10: reading the deleted record reports the server message.
    let err = store.dispatch(&api, Action::ReadOne { id }).await.unwrap_err();
    assert_eq!(err, ApiError::RemoteOperation("Todo not found".to_string()));
    assert!(!store.snapshot().is_loading);

    // Step 11: logout: protected calls now fail.
    api.logout().unwrap();
    assert!(!creds.exists());
    let err = api.list_todos(false).await.unwrap_err();
    assert_eq!(err, ApiError::RemoteOperation("Unauthenticated".to_string()));

    assert_eq!(*dialogs.0.lock(), vec!["Todo not found".to_string()]);
}

#[tokio::test]
async fn unreachable_server_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = TodoApi::connect(&format!("http://{addr}"), Session::in_memory());
    let store = Store::default();
    let err = store.dispatch(&api, Action::List { is_finished: false }).await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)), "{err:?}");
    assert!(!store.snapshot().is_loading);
}
