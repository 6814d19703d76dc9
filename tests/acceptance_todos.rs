use axum::body::to_bytes;
use axum::http::HeaderValue;
use axum::Router;
use serde_json::Value;
use todo_api::domain::repository::TodoRepository;
use todo_api::domain::todo::TodoDraft;
use todo_api::http::routes::todos;
use todo_api::http::routing::{self, cors::OriginPolicy};
use todo_api::infrastructure::{memory_repo::InMemoryTodoRepository, sqlite_repo::SqliteTodoRepository};

const ALLOWED: &str = "http://localhost:3000";

fn app_with<R: TodoRepository + Clone>(repo: R) -> Router {
    routing::app(todos::router(todos::AppState { repo }), OriginPolicy::new(HeaderValue::from_static(ALLOWED)))
}

async fn sqlite_app(titles: &[&str]) -> Router {
    // use in-memory sqlite for tests
    let repo = SqliteTodoRepository::connect("sqlite::memory:").await.unwrap();
    repo.init().await.unwrap();
    for title in titles {
        repo.save(TodoDraft::new(*title)).await.unwrap();
    }
    app_with(repo)
}

#[tokio::test]
async fn acceptance_lists_exactly_the_stored_todos() {
    let app = sqlite_app(&["one", "two", "three"]).await;

    let res = request(&app, "GET", "/api/todos", &[]).await;
    assert_eq!(res.status(), 200);
    let body = json_body(res).await;
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 3);
    let mut ids: Vec<i64> = items.iter().map(|t| t["id"].as_i64().unwrap()).collect();
    ids.sort();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(items[0]["title"], "one");
}

#[tokio::test]
async fn acceptance_empty_store_lists_empty_array() {
    let app = sqlite_app(&[]).await;
    let res = request(&app, "GET", "/api/todos", &[]).await;
    assert_eq!(res.status(), 200);
    assert_eq!(json_body(res).await, serde_json::json!([]));
}

#[tokio::test]
async fn acceptance_list_reflects_store_changes() {
    let repo = InMemoryTodoRepository::new();
    let app = app_with(repo.clone());
    let first = repo.save(TodoDraft::new("a")).await.unwrap();
    repo.save(TodoDraft::new("b")).await.unwrap();
    repo.delete_by_id(first.id()).await.unwrap();

    let body = json_body(request(&app, "GET", "/api/todos", &[]).await).await;
    let ids: Vec<i64> = body.as_array().unwrap().iter().map(|t| t["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![2]);
}

#[tokio::test]
async fn acceptance_write_verbs_are_not_routed() {
    let app = sqlite_app(&["keep me"]).await;
    for method in ["POST", "PUT", "DELETE", "PATCH"] {
        let res = request(&app, method, "/api/todos", &[]).await;
        assert_eq!(res.status(), 405, "{method}");
    }
    let res = request(&app, "GET", "/api/todos/1", &[]).await;
    assert_eq!(res.status(), 404);

    let body = json_body(request(&app, "GET", "/api/todos", &[]).await).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn acceptance_allowed_origin_gets_cors_headers() {
    let app = app_with(InMemoryTodoRepository::new());
    let res = request(&app, "GET", "/api/todos", &[("origin", ALLOWED)]).await;
    assert_eq!(res.status(), 200);
    assert_eq!(res.headers().get("access-control-allow-origin").unwrap(), ALLOWED);
}

#[tokio::test]
async fn acceptance_allowed_origin_preflight() {
    let app = app_with(InMemoryTodoRepository::new());
    let res = request(
        &app,
        "OPTIONS",
        "/api/todos",
        &[("origin", ALLOWED), ("access-control-request-method", "GET")],
    )
    .await;
    assert_eq!(res.status(), 200);
    assert_eq!(res.headers().get("access-control-allow-origin").unwrap(), ALLOWED);
    let methods = res.headers().get("access-control-allow-methods").unwrap().to_str().unwrap();
    assert!(methods.contains("GET"));
    assert_eq!(res.headers().get("access-control-max-age").unwrap(), "1800");
}

#[tokio::test]
async fn acceptance_foreign_origin_is_rejected() {
    let app = app_with(InMemoryTodoRepository::new());
    let res = request(&app, "GET", "/api/todos", &[("origin", "http://evil.example")]).await;
    assert_eq!(res.status(), 403);
    assert!(res.headers().get("access-control-allow-origin").is_none());

    let res = request(
        &app,
        "OPTIONS",
        "/api/todos",
        &[("origin", "http://evil.example"), ("access-control-request-method", "GET")],
    )
    .await;
    assert_eq!(res.status(), 403);
}

#[tokio::test]
async fn acceptance_same_origin_passes() {
    let app = app_with(InMemoryTodoRepository::new());
    let res = request(
        &app,
        "GET",
        "/api/todos",
        &[("origin", "http://127.0.0.1:8000"), ("host", "127.0.0.1:8000")],
    )
    .await;
    assert_eq!(res.status(), 200);

    let res = request(
        &app,
        "GET",
        "/api/todos",
        &[("origin", "https://127.0.0.1:8000"), ("host", "127.0.0.1:8000")],
    )
    .await;
    assert_eq!(res.status(), 403);
}

#[tokio::test]
async fn acceptance_health_ignores_origin_policy() {
    let app = app_with(InMemoryTodoRepository::new());
    let res = request(&app, "GET", "/health", &[("origin", "http://evil.example")]).await;
    assert_eq!(res.status(), 200);
    assert_eq!(json_body(res).await["status"], "ok");
}

async fn json_body(res: hyper::Response<axum::body::Body>) -> Value {
    serde_json::from_slice(&to_bytes(res.into_body(), 1024 * 1024).await.unwrap()).unwrap()
}

async fn request(app: &Router, method: &str, path: &str, headers: &[(&str, &str)]) -> hyper::Response<axum::body::Body> {
    use axum::body::Body;
    use axum::http::{Method, Request};
    use tower::ServiceExt;

    let mut req = Request::builder().method(Method::from_bytes(method.as_bytes()).unwrap()).uri(path);
    for (name, value) in headers {
        req = req.header(*name, *value);
    }
    app.clone().oneshot(req.body(Body::empty()).unwrap()).await.unwrap()
}
