use axum::Router;
use tower_http::cors::CorsLayer;

use crate::routes::{health, layout, market, news, stocks};
use crate::state::AppState;

pub fn create_app(state: AppState) -> Router {
    Router::<AppState>::new()
        .nest("/health", health::router())
        .nest("/api/layout", layout::router())
        .nest("/api/market", market::router())
        .nest("/api/stocks", stocks::router())
        .nest("/api/news", news::router())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
