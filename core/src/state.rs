//! View snapshot and the pure reducer that advances it.
//!
//! # Design
//! `reduce` never mutates its input and never performs side effects; it maps
//! `(previous snapshot, transition)` to the next snapshot. Side effects (I/O,
//! notifications) live in the action layer and the `Store`.
//!
//! `Transition` is a closed enum, so there is no "unknown kind" to fall
//! through: every variant has an explicit arm below.

use crate::types::{Todo, TodoEdit};

/// Success markers for the operations that do not carry data back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Outcomes {
    pub add: bool,
    pub update: bool,
    pub delete: bool,
}

/// Client-local read model rendered by the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewSnapshot {
    /// Result of the latest successful list fetch, in server order.
    pub todos: Vec<Todo>,
    /// Result of the latest successful single fetch.
    pub detail_todo: Option<Todo>,
    /// A single flag shared by every operation. Overlapping operations clear
    /// it as soon as the first of them ends.
    pub is_loading: bool,
    pub outcomes: Outcomes,
}

/// A description of how the snapshot changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    LoadingStarted,
    LoadingFinished,
    /// Replace `todos` wholesale.
    TodosReplaced(Vec<Todo>),
    /// Replace `detail_todo` wholesale.
    DetailReplaced(Todo),
    /// A create succeeded. The new record is not inserted locally.
    Added,
    /// An update succeeded; merge the edit into any cached copy.
    Updated(TodoEdit),
    /// A delete succeeded. The record is not removed locally.
    Deleted,
    /// Acknowledge the outcome flags.
    ResetOutcomes,
}

pub fn reduce(prev: &ViewSnapshot, transition: &Transition) -> ViewSnapshot {
    let mut next = prev.clone();
    match transition {
        Transition::LoadingStarted => next.is_loading = true,
        Transition::LoadingFinished => next.is_loading = false,
        Transition::TodosReplaced(todos) => next.todos.clone_from(todos),
        Transition::DetailReplaced(todo) => next.detail_todo = Some(todo.clone()),
        Transition::Added => next.outcomes.add = true,
        Transition::Updated(edit) => {
            for todo in &mut next.todos {
                edit.merge_into(todo);
            }
            if let Some(detail) = next.detail_todo.as_mut() {
                edit.merge_into(detail);
            }
            next.outcomes.update = true;
        }
        Transition::Deleted => next.outcomes.delete = true,
        Transition::ResetOutcomes => next.outcomes = Outcomes::default(),
    }
    next
}
