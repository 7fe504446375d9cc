use std::sync::Arc;

use crate::external::market_data::MarketDataProvider;
use crate::models::DashboardLayout;
use crate::services::news_service::NewsService;

#[derive(Clone)]
pub struct AppState {
    pub market_data: Arc<dyn MarketDataProvider>,
    pub news: Arc<NewsService>,
    pub layout: Arc<DashboardLayout>,
}
