pub mod cors;

use axum::Router;
use tower_http::trace::TraceLayer;

use super::routes::health;
use cors::OriginPolicy;

/// Full application router: `/health` is open to everyone, `api` sits behind the origin policy.
pub fn app(api: Router, policy: OriginPolicy) -> Router {
    Router::new()
        .merge(health::router())
        .merge(cors::guard(api, policy))
        .layer(TraceLayer::new_for_http())
}
