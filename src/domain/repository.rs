use async_trait::async_trait;
use super::todo::{Todo, TodoDraft, TodoId};

/// Storage for todos. Each operation is added because something uses it,
/// not inherited wholesale from a generic CRUD contract.
#[async_trait]
pub trait TodoRepository: Send + Sync + 'static {
    async fn init(&self) -> anyhow::Result<()>;
    /// Every stored todo, ascending by id.
    async fn list_all(&self) -> anyhow::Result<Vec<Todo>>;
    /// Creates the todo when `draft.id` is `None` or unknown, otherwise updates it in place.
    async fn save(&self, draft: TodoDraft) -> anyhow::Result<Todo>;
    async fn find_by_id(&self, id: TodoId) -> anyhow::Result<Option<Todo>>;
    async fn delete_by_id(&self, id: TodoId) -> anyhow::Result<bool>;
    async fn exists_by_id(&self, id: TodoId) -> anyhow::Result<bool>;
    async fn count(&self) -> anyhow::Result<u64>;
}
