use axum::{extract::State, routing::get, Json, Router};

use crate::{
    domain::{repository::TodoRepository, todo::Todo},
    http::types::ApiError,
};

pub const COLLECTION_PATH: &str = "/api/todos";

/// The store is handed in explicitly at startup and shared by every request.
#[derive(Clone)]
pub struct AppState<R: TodoRepository> { pub repo: R }

/// Only `GET` is bound; other verbs on the collection get axum's 405.
pub fn router<R: TodoRepository + Clone>(state: AppState<R>) -> Router {
    Router::new()
        .route(COLLECTION_PATH, get(list_todos::<R>))
        .with_state(state)
}

async fn list_todos<R: TodoRepository>(State(state): State<AppState<R>>) -> Result<Json<Vec<Todo>>, ApiError> {
    let todos = state.repo.list_all().await?;
    tracing::debug!(count = todos.len(), "listed todos");
    Ok(Json(todos))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::todo::{TodoDraft, TodoId};
    use crate::infrastructure::memory_repo::InMemoryTodoRepository;
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[tokio::test]
    async fn handler_returns_store_contents() {
        let repo = InMemoryTodoRepository::new();
        repo.save(TodoDraft::new("a")).await.unwrap();
        repo.save(TodoDraft::new("b")).await.unwrap();
        let Json(todos) = list_todos(State(AppState { repo })).await.unwrap();
        let ids: Vec<_> = todos.iter().map(|t| t.id()).collect();
        assert_eq!(ids, vec![TodoId(1), TodoId(2)]);
    }

    #[derive(Clone)]
    struct BrokenRepo;

    #[async_trait]
    impl TodoRepository for BrokenRepo {
        async fn init(&self) -> anyhow::Result<()> { Ok(()) }
        async fn list_all(&self) -> anyhow::Result<Vec<Todo>> { anyhow::bail!("disk on fire") }
        async fn save(&self, _: TodoDraft) -> anyhow::Result<Todo> { anyhow::bail!("read only") }
        async fn find_by_id(&self, _: TodoId) -> anyhow::Result<Option<Todo>> { Ok(None) }
        async fn delete_by_id(&self, _: TodoId) -> anyhow::Result<bool> { Ok(false) }
        async fn exists_by_id(&self, _: TodoId) -> anyhow::Result<bool> { Ok(false) }
        async fn count(&self) -> anyhow::Result<u64> { Ok(0) }
    }

    #[tokio::test]
    async fn store_failure_becomes_500() {
        let err = list_todos(State(AppState { repo: BrokenRepo })).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
