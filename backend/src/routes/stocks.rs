use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use tracing::info;

use crate::errors::AppError;
use crate::models::{
    ChartQueryParams, FetchOutcome, FinancialsView, Indicator, Interval, PriceChart, QuoteView,
    Timeframe,
};
use crate::services::quote_service;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:symbol/quote", get(get_quote))
        .route("/:symbol/chart", get(get_chart))
        .route("/:symbol/financials", get(get_financials))
}

fn parse_indicators(raw: Option<&str>) -> Result<Vec<Indicator>, AppError> {
    raw.unwrap_or_default()
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.parse::<Indicator>().map_err(AppError::Validation))
        .collect()
}

/// GET /api/stocks/:symbol/quote
///
/// Current price and percentage change against the previous close.
pub async fn get_quote(
    Path(symbol): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<FetchOutcome<QuoteView>>, AppError> {
    let symbol = quote_service::validate_symbol(&symbol)?;
    info!("GET /api/stocks/{}/quote - Getting quote", symbol);
    let quote = quote_service::stock_quote(state.market_data.as_ref(), &symbol).await;
    Ok(Json(quote))
}

/// GET /api/stocks/:symbol/chart?timeframe=6mo&interval=1d&indicators=sma,ema
///
/// Candlesticks for the requested window with indicator overlays.
pub async fn get_chart(
    Path(symbol): Path<String>,
    Query(params): Query<ChartQueryParams>,
    State(state): State<AppState>,
) -> Result<Json<FetchOutcome<PriceChart>>, AppError> {
    let symbol = quote_service::validate_symbol(&symbol)?;
    let timeframe = match params.timeframe.as_deref() {
        Some(raw) => raw.parse::<Timeframe>()?,
        None => Timeframe::default(),
    };
    let interval = match params.interval.as_deref() {
        Some(raw) => raw.parse::<Interval>()?,
        None => Interval::default(),
    };
    let indicators = parse_indicators(params.indicators.as_deref())?;

    info!(
        "GET /api/stocks/{}/chart - Getting chart (timeframe={}, interval={}, indicators={:?})",
        symbol, timeframe, interval, indicators
    );

    let chart = quote_service::price_chart(
        state.market_data.as_ref(),
        &symbol,
        timeframe,
        interval,
        &indicators,
    )
    .await;
    Ok(Json(chart))
}

/// GET /api/stocks/:symbol/financials
///
/// Balance sheet and income statement with abbreviated figures.
pub async fn get_financials(
    Path(symbol): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<FinancialsView>, AppError> {
    let symbol = quote_service::validate_symbol(&symbol)?;
    info!("GET /api/stocks/{}/financials - Getting financial statements", symbol);
    let view = quote_service::financials(state.market_data.as_ref(), &symbol).await;
    Ok(Json(view))
}
