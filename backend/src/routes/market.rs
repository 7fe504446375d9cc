use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use tracing::info;

use crate::models::IndexQuote;
use crate::services::quote_service;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/indices", get(get_indices))
}

/// GET /api/market/indices
///
/// Last price and day change for each configured market index. Each entry
/// carries its own status so one unreachable index does not hide the others.
async fn get_indices(State(state): State<AppState>) -> Json<Vec<IndexQuote>> {
    info!("GET /api/market/indices - Building index snapshot");
    let snapshot =
        quote_service::index_snapshot(state.market_data.as_ref(), &state.layout.indices).await;
    Json(snapshot)
}
