use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use tracing::info;

use crate::models::{FetchOutcome, NewsFeed};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_news))
}

/// GET /api/news
///
/// Top headlines for the configured market-news query.
async fn get_news(State(state): State<AppState>) -> Json<FetchOutcome<NewsFeed>> {
    info!("GET /api/news - Fetching market news");
    Json(state.news.latest().await)
}
