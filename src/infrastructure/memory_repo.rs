use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::{
    repository::TodoRepository,
    todo::{Todo, TodoDraft, TodoId},
};

#[derive(Default)]
struct Inner {
    items: BTreeMap<TodoId, Todo>,
    last_id: i64,
}

/// Process-local store. Ids start at 1 and are never reused.
#[derive(Clone, Default)]
pub struct InMemoryTodoRepository {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryTodoRepository {
    pub fn new() -> Self { Self::default() }
}

#[async_trait]
impl TodoRepository for InMemoryTodoRepository {
    async fn init(&self) -> Result<()> { Ok(()) }

    async fn list_all(&self) -> Result<Vec<Todo>> {
        Ok(self.inner.read().await.items.values().cloned().collect())
    }

    async fn save(&self, draft: TodoDraft) -> Result<Todo> {
        let mut inner = self.inner.write().await;
        if let Some(todo) = draft.id.and_then(|id| inner.items.get_mut(&id)) {
            todo.apply(draft);
            return Ok(todo.clone());
        }
        inner.last_id += 1;
        let id = TodoId(inner.last_id);
        let todo = Todo::new(id, draft, Utc::now());
        inner.items.insert(id, todo.clone());
        tracing::debug!(%id, "todo created");
        Ok(todo)
    }

    async fn find_by_id(&self, id: TodoId) -> Result<Option<Todo>> {
        Ok(self.inner.read().await.items.get(&id).cloned())
    }

    async fn delete_by_id(&self, id: TodoId) -> Result<bool> {
        Ok(self.inner.write().await.items.remove(&id).is_some())
    }

    async fn exists_by_id(&self, id: TodoId) -> Result<bool> {
        Ok(self.inner.read().await.items.contains_key(&id))
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.inner.read().await.items.len() as u64)
    }
}
