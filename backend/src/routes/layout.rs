use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use tracing::info;

use crate::models::DashboardLayout;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_layout))
}

/// GET /api/layout
///
/// Navigation, page titles and selector options shared by both pages.
async fn get_layout(State(state): State<AppState>) -> Json<DashboardLayout> {
    info!("GET /api/layout - Getting dashboard layout");
    Json(state.layout.as_ref().clone())
}
