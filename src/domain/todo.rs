use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned numeric identity of a todo.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct TodoId(pub i64);

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Todo {
    id: TodoId,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl Todo {
    /// Only stores construct todos, so the identity is always store-assigned.
    pub(crate) fn new(id: TodoId, draft: TodoDraft, created_at: DateTime<Utc>) -> Self {
        Self { id, title: draft.title, description: draft.description, completed: draft.completed, created_at }
    }

    pub fn id(&self) -> TodoId { self.id }

    /// Copies the mutable fields of `draft` onto this todo. Identity and creation time are kept.
    pub(crate) fn apply(&mut self, draft: TodoDraft) {
        self.title = draft.title;
        self.description = draft.description;
        self.completed = draft.completed;
    }

    /// A draft that saves this todo back unchanged.
    pub fn to_draft(&self) -> TodoDraft {
        TodoDraft {
            id: Some(self.id),
            title: self.title.clone(),
            description: self.description.clone(),
            completed: self.completed,
        }
    }
}

/// Input to `TodoRepository::save`. `id: None` creates, `id: Some(_)` updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoDraft {
    pub id: Option<TodoId>,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
}

impl TodoDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self { id: None, title: title.into(), description: None, completed: false }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
