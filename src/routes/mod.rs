pub mod api;
pub mod assets;
pub mod auth;
pub mod format;
pub mod forms;
pub mod home;
pub mod markdown;
pub mod posts;
pub mod projects;

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// The whole HTTP surface: web pages, JSON API and embedded assets.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(home::index))
        .merge(auth::router())
        .merge(projects::router())
        .merge(posts::router())
        .merge(api::router())
        .merge(assets::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
