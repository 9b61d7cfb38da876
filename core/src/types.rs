//! Domain DTOs for the todo API.
//!
//! # Design
//! These types mirror the remote service's schema but are defined
//! independently from the mock-server crate; integration tests catch any
//! schema drift between the two.
//!
//! The service encodes `is_finished` as `0`/`1`. Decoding also accepts JSON
//! booleans, encoding always emits the integer form.

use serde::{Deserialize, Deserializer, Serialize};

/// A single todo record as cached by the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: i64,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(with = "flag")]
    pub is_finished: bool,
    #[serde(default, alias = "createdAt")]
    pub created_at: Option<String>,
    #[serde(default, alias = "updatedAt")]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub cover: Option<String>,
}

/// The logged-in user as returned by `GET /users/me`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub photo: Option<String>,
}

/// Request payload for `POST /auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Request payload for `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Request payload for creating a new todo.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateTodo {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Request payload for `PUT /todos/{id}`. Every field is sent; the service
/// replaces the record's editable fields wholesale.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateTodo {
    pub title: String,
    pub description: String,
    #[serde(with = "flag")]
    pub is_finished: bool,
}

/// A full post-edit record, as held by the call site of an update. Used both
/// to build the request and to merge the edit into the local snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoEdit {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub is_finished: bool,
}

impl TodoEdit {
    pub fn payload(&self) -> UpdateTodo {
        UpdateTodo {
            title: self.title.clone(),
            description: self.description.clone(),
            is_finished: self.is_finished,
        }
    }

    /// Overwrite the editable fields of `todo` when the ids match.
    pub fn merge_into(&self, todo: &mut Todo) {
        if todo.id == self.id {
            todo.title.clone_from(&self.title);
            todo.description.clone_from(&self.description);
            todo.is_finished = self.is_finished;
        }
    }
}

/// A file sent as one part of a `multipart/form-data` upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// The response wrapper used by every endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub success: serde_json::Value,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub message: String,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl Envelope {
    /// Only a literal JSON `true` counts as success.
    pub fn succeeded(&self) -> bool {
        self.success == serde_json::Value::Bool(true)
    }
}

/// Reads an explicit `null` the same as a missing string.
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Serde adapter for the service's `0`/`1` boolean encoding.
pub mod flag {
    use serde::de::{self, Deserializer, Visitor};
    use serde::Serializer;
    use std::fmt;

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        deserializer.deserialize_any(FlagVisitor)
    }

    struct FlagVisitor;

    impl<'de> Visitor<'de> for FlagVisitor {
        type Value = bool;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("0, 1, true or false")
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<bool, E> {
            Ok(v)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<bool, E> {
            match v {
                0 => Ok(false),
                1 => Ok(true),
                other => Err(E::invalid_value(de::Unexpected::Unsigned(other), &self)),
            }
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<bool, E> {
            match v {
                0 => Ok(false),
                1 => Ok(true),
                other => Err(E::invalid_value(de::Unexpected::Signed(other), &self)),
            }
        }
    }
}
