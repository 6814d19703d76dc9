//! Cross-origin policy for the API routes.
//!
//! Exactly one foreign origin may call the API. Requests carrying any other
//! `Origin` (other than the server's own) are refused with 403 before they
//! reach a handler; the allowed origin gets the usual CORS response headers.

use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

/// How long browsers may cache a preflight answer.
const PREFLIGHT_MAX_AGE: Duration = Duration::from_secs(1800);

#[derive(Debug, Clone)]
pub struct OriginPolicy {
    allowed: HeaderValue,
}

impl OriginPolicy {
    pub fn new(allowed: HeaderValue) -> Self { Self { allowed } }

    pub fn allowed(&self) -> &HeaderValue { &self.allowed }

    pub fn permits(&self, origin: &HeaderValue, host: Option<&HeaderValue>) -> bool {
        *origin == self.allowed || host.is_some_and(|host| same_origin(origin, host))
    }
}

/// The server only speaks plain HTTP, so its own origin is always `http://<Host>`.
fn same_origin(origin: &HeaderValue, host: &HeaderValue) -> bool {
    let (Ok(origin), Ok(host)) = (origin.to_str(), host.to_str()) else { return false };
    origin
        .strip_prefix("http://")
        .is_some_and(|authority| authority.eq_ignore_ascii_case(host))
}

async fn reject_foreign_origin(State(policy): State<OriginPolicy>, request: Request, next: Next) -> Response {
    if let Some(origin) = request.headers().get(header::ORIGIN) {
        if !policy.permits(origin, request.headers().get(header::HOST)) {
            tracing::warn!(?origin, method = %request.method(), path = %request.uri().path(), "rejected cross-origin request");
            return (StatusCode::FORBIDDEN, "Invalid CORS request").into_response();
        }
    }
    next.run(request).await
}

/// Wraps every route of `router` in the origin check and CORS headers.
pub fn guard(router: Router, policy: OriginPolicy) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(policy.allowed.clone())
        .allow_methods([Method::GET])
        .allow_headers(Any)
        .max_age(PREFLIGHT_MAX_AGE);
    router.layer(
        ServiceBuilder::new()
            .layer(middleware::from_fn_with_state(policy, reject_foreign_origin))
            .layer(cors),
    )
}
