pub mod api;
pub mod pages;
pub mod public;

use axum::Router;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let static_root = state.config.static_root.clone();
    Router::new()
        .merge(public::router())
        .merge(pages::router())
        .merge(api::router())
        .nest_service("/static", ServeDir::new(static_root))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
