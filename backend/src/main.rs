mod app;
mod config;
mod errors;
mod external;
mod logging;
mod models;
mod routes;
mod services;
mod state;

use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::{DashboardConfig, ProviderKind, ServerConfig};
use crate::external::market_data::MarketDataProvider;
use crate::external::mock::MockProvider;
use crate::external::yahoo::YahooFinanceProvider;
use crate::logging::{init_logging, LoggingConfig};
use crate::models::DashboardLayout;
use crate::services::news_service::{NewsConfig, NewsService};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize logging FIRST
    init_logging(LoggingConfig::from_env())?;

    let server = ServerConfig::from_env()?;
    let dashboard = DashboardConfig::from_env()?;

    let market_data: Arc<dyn MarketDataProvider> = match dashboard.provider {
        ProviderKind::Yahoo => {
            tracing::info!("📊 Using market data provider: Yahoo Finance");
            Arc::new(YahooFinanceProvider::new(server.http_timeout))
        }
        ProviderKind::Mock => {
            tracing::warn!("📊 Using market data provider: mock random walk");
            Arc::new(MockProvider::new())
        }
    };

    let news = NewsService::new(NewsConfig::from_env(), server.http_timeout);

    let state = AppState {
        market_data,
        news: Arc::new(news),
        layout: Arc::new(DashboardLayout::new(dashboard.indices, dashboard.default_symbol)),
    };
    let app = app::create_app(state);

    let listener = TcpListener::bind(server.bind_addr).await?;
    tracing::info!("🚀 Stock tracker backend running at http://{}/", server.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
