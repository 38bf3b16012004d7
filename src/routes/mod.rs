use axum::{Router, extract::DefaultBodyLimit};
use tower_http::limit::RequestBodyLimitLayer;

use crate::state::AppState;

pub mod auth;
pub mod blogs;
pub mod courses;
pub mod doc;
pub mod forms;
pub mod health;
pub mod notifications;
pub mod orders;
pub mod products;
pub mod recipes;
pub mod search;
pub mod users;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/products", products::router())
        .nest("/recipes", recipes::router())
        .nest("/courses", courses::router())
        .nest("/blogs", blogs::router())
        .nest("/orders", orders::router())
        .nest("/users", users::router())
        .nest("/notifications", notifications::router())
        .nest("/search", search::router())
        .merge(forms::router())
}

/// Cap request bodies at `limit` bytes. The extractor limit is raised along
/// with the transport limit, otherwise axum's 2 MB default applies first.
pub fn with_body_limit<S>(router: Router<S>, limit: usize) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router
        .layer(DefaultBodyLimit::max(limit))
        .layer(RequestBodyLimitLayer::new(limit))
}
