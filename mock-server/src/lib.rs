use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Todo {
    pub id: i64,
    #[serde(skip)]
    pub user_id: i64,
    pub title: String,
    pub description: String,
    pub is_finished: u8,
    pub cover: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub photo: Option<String>,
    #[serde(skip)]
    pub password: String,
}

#[derive(Deserialize)]
pub struct RegisterUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginUser {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct CreateTodo {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Deserialize)]
pub struct UpdateTodo {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub is_finished: Value,
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub is_finished: Option<String>,
}

#[derive(Default)]
pub struct Db {
    users: Vec<User>,
    tokens: HashMap<String, i64>,
    todos: BTreeMap<i64, Todo>,
    next_user_id: i64,
    next_todo_id: i64,
}

pub type SharedDb = Arc<RwLock<Db>>;

type Reply = (StatusCode, Json<Value>);

pub fn app() -> Router {
    let db: SharedDb = Arc::new(RwLock::new(Db::default()));
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/users/me", get(me))
        .route("/users/photo", post(change_photo))
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/{id}", get(get_todo).put(update_todo).delete(delete_todo))
        .route("/todos/{id}/cover", post(change_cover))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn ok(message: &str, data: Option<Value>) -> Reply {
    let mut body = json!({ "success": true, "message": message });
    if let Some(data) = data {
        body["data"] = data;
    }
    (StatusCode::OK, Json(body))
}

fn fail(status: StatusCode, message: &str) -> Reply {
    (status, Json(json!({ "success": false, "message": message })))
}

fn now() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
        .to_string()
}

/// Accepts `0`, `1`, `true`, `false` and their string forms.
fn parse_flag(value: &Value) -> Option<u8> {
    match value {
        Value::Bool(b) => Some(u8::from(*b)),
        Value::Number(n) => match n.as_u64() {
            Some(0) => Some(0),
            Some(1) => Some(1),
            _ => None,
        },
        Value::String(s) => match s.as_str() {
            "0" | "false" => Some(0),
            "1" | "true" => Some(1),
            _ => None,
        },
        _ => None,
    }
}

/// Resolve the bearer token to a user id.
fn authenticate(headers: &HeaderMap, db: &Db) -> Result<i64, Reply> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .and_then(|token| db.tokens.get(token).copied())
        .ok_or_else(|| fail(StatusCode::UNAUTHORIZED, "Unauthenticated"))
}

fn owned_todo(db: &Db, user_id: i64, id: i64) -> Result<&Todo, Reply> {
    db.todos
        .get(&id)
        .filter(|t| t.user_id == user_id)
        .ok_or_else(|| fail(StatusCode::NOT_FOUND, "Todo not found"))
}

/// Read the first file field named `name` and return a pseudo URL for it.
async fn read_upload(mut multipart: Multipart, name: &str) -> Result<String, Reply> {
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some(name) {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        return match field.bytes().await {
            Ok(bytes) if !bytes.is_empty() => Ok(format!("/uploads/{}-{file_name}", Uuid::new_v4())),
            _ => Err(fail(StatusCode::BAD_REQUEST, &format!("{name} is required"))),
        };
    }
    Err(fail(StatusCode::BAD_REQUEST, &format!("{name} is required")))
}

async fn register(State(db): State<SharedDb>, Json(input): Json<RegisterUser>) -> Reply {
    if input.name.is_empty() || input.email.is_empty() || input.password.is_empty() {
        return fail(StatusCode::BAD_REQUEST, "name, email and password are required");
    }
    let mut db = db.write().await;
    if db.users.iter().any(|u| u.email == input.email) {
        return fail(StatusCode::CONFLICT, "Email already registered");
    }
    db.next_user_id += 1;
    let user = User {
        id: db.next_user_id,
        name: input.name,
        email: input.email,
        photo: None,
        password: input.password,
    };
    tracing::info!(user_id = user.id, "user registered");
    db.users.push(user);
    ok("Registration successful", None)
}

async fn login(State(db): State<SharedDb>, Json(input): Json<LoginUser>) -> Reply {
    let mut db = db.write().await;
    let Some(user_id) = db
        .users
        .iter()
        .find(|u| u.email == input.email && u.password == input.password)
        .map(|u| u.id)
    else {
        return fail(StatusCode::UNAUTHORIZED, "Invalid email or password");
    };
    let token = Uuid::new_v4().to_string();
    db.tokens.insert(token.clone(), user_id);
    ok("Login successful", Some(json!({ "token": token })))
}

async fn me(State(db): State<SharedDb>, headers: HeaderMap) -> Reply {
    let db = db.read().await;
    let user_id = match authenticate(&headers, &db) {
        Ok(id) => id,
        Err(reply) => return reply,
    };
    match db.users.iter().find(|u| u.id == user_id) {
        Some(user) => ok("User found", Some(json!({ "user": user }))),
        None => fail(StatusCode::NOT_FOUND, "User not found"),
    }
}

async fn change_photo(State(db): State<SharedDb>, headers: HeaderMap, multipart: Multipart) -> Reply {
    let user_id = match authenticate(&headers, &*db.read().await) {
        Ok(id) => id,
        Err(reply) => return reply,
    };
    let url = match read_upload(multipart, "photo").await {
        Ok(url) => url,
        Err(reply) => return reply,
    };
    let mut db = db.write().await;
    if let Some(user) = db.users.iter_mut().find(|u| u.id == user_id) {
        user.photo = Some(url);
    }
    ok("Photo updated", None)
}

async fn list_todos(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Reply {
    let db = db.read().await;
    let user_id = match authenticate(&headers, &db) {
        Ok(id) => id,
        Err(reply) => return reply,
    };
    let filter = query
        .is_finished
        .and_then(|v| parse_flag(&Value::String(v)));
    let todos: Vec<&Todo> = db
        .todos
        .values()
        .filter(|t| t.user_id == user_id)
        .filter(|t| filter.is_none_or(|f| t.is_finished == f))
        .collect();
    ok("Todos found", Some(json!({ "todos": todos })))
}

async fn get_todo(State(db): State<SharedDb>, headers: HeaderMap, Path(id): Path<i64>) -> Reply {
    let db = db.read().await;
    let user_id = match authenticate(&headers, &db) {
        Ok(id) => id,
        Err(reply) => return reply,
    };
    match owned_todo(&db, user_id, id) {
        Ok(todo) => ok("Todo found", Some(json!({ "todo": todo }))),
        Err(reply) => reply,
    }
}

async fn create_todo(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Json(input): Json<CreateTodo>,
) -> Reply {
    let mut db = db.write().await;
    let user_id = match authenticate(&headers, &db) {
        Ok(id) => id,
        Err(reply) => return reply,
    };
    if input.title.trim().is_empty() {
        return fail(StatusCode::BAD_REQUEST, "title is required");
    }
    db.next_todo_id += 1;
    let stamp = now();
    let todo = Todo {
        id: db.next_todo_id,
        user_id,
        title: input.title,
        description: input.description,
        is_finished: 0,
        cover: None,
        created_at: stamp.clone(),
        updated_at: stamp,
    };
    let id = todo.id;
    db.todos.insert(id, todo);
    ok("Todo created", Some(json!({ "todo_id": id })))
}

async fn update_todo(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(input): Json<UpdateTodo>,
) -> Reply {
    let mut db = db.write().await;
    let user_id = match authenticate(&headers, &db) {
        Ok(id) => id,
        Err(reply) => return reply,
    };
    if let Err(reply) = owned_todo(&db, user_id, id) {
        return reply;
    }
    if input.title.trim().is_empty() {
        return fail(StatusCode::BAD_REQUEST, "title is required");
    }
    let Some(flag) = parse_flag(&input.is_finished) else {
        return fail(StatusCode::BAD_REQUEST, "is_finished must be 0 or 1");
    };
    if let Some(todo) = db.todos.get_mut(&id) {
        todo.title = input.title;
        todo.description = input.description;
        todo.is_finished = flag;
        todo.updated_at = now();
    }
    ok("Todo updated", Some(json!({ "todo_id": id })))
}

async fn delete_todo(State(db): State<SharedDb>, headers: HeaderMap, Path(id): Path<i64>) -> Reply {
    let mut db = db.write().await;
    let user_id = match authenticate(&headers, &db) {
        Ok(id) => id,
        Err(reply) => return reply,
    };
    if let Err(reply) = owned_todo(&db, user_id, id) {
        return reply;
    }
    db.todos.remove(&id);
    ok("Todo deleted", None)
}

async fn change_cover(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Reply {
    {
        let db = db.read().await;
        let user_id = match authenticate(&headers, &db) {
            Ok(id) => id,
            Err(reply) => return reply,
        };
        if let Err(reply) = owned_todo(&db, user_id, id) {
            return reply;
        }
    }
    let url = match read_upload(multipart, "cover").await {
        Ok(url) => url,
        Err(reply) => return reply,
    };
    if let Some(todo) = db.write().await.todos.get_mut(&id) {
        todo.cover = Some(url);
        todo.updated_at = now();
    }
    ok("Cover updated", None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn todo() -> Todo {
        Todo {
            id: 1,
            user_id: 7,
            title: "Test".to_string(),
            description: String::new(),
            is_finished: 0,
            cover: None,
            created_at: "0".to_string(),
            updated_at: "0".to_string(),
        }
    }

    #[test]
    fn todo_serializes_without_owner() {
        let json = serde_json::to_value(todo()).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["is_finished"], 0);
        assert!(json.get("user_id").is_none());
    }

    #[test]
    fn user_serializes_without_password() {
        let user = User {
            id: 1,
            name: "A".to_string(),
            email: "a@example.com".to_string(),
            photo: None,
            password: "secret".to_string(),
        };
        let json = serde_json::to_value(user).unwrap();
        assert!(json.get("password").is_none());
    }

    #[test]
    fn parse_flag_accepts_known_forms() {
        assert_eq!(parse_flag(&json!(0)), Some(0));
        assert_eq!(parse_flag(&json!(1)), Some(1));
        assert_eq!(parse_flag(&json!(true)), Some(1));
        assert_eq!(parse_flag(&json!("false")), Some(0));
        assert_eq!(parse_flag(&json!(2)), None);
        assert_eq!(parse_flag(&json!(null)), None);
    }

    #[test]
    fn create_todo_defaults_description() {
        let input: CreateTodo = serde_json::from_str(r#"{"title":"No description"}"#).unwrap();
        assert_eq!(input.description, "");
    }

    #[test]
    fn create_todo_rejects_missing_title() {
        let result: Result<CreateTodo, _> = serde_json::from_str(r#"{"description":"x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn fail_envelope_shape() {
        let (status, Json(body)) = fail(StatusCode::NOT_FOUND, "Todo not found");
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "success": false, "message": "Todo not found" }));
    }
}
