mod chart;
mod financials;
mod layout;
mod news;
mod outcome;
mod quote;

pub use chart::{ChartQueryParams, Indicator, IndicatorPoint, IndicatorSeries, Interval, PriceChart, Timeframe};
pub use financials::{FinancialsView, FormattedStatement};
pub use layout::{DashboardLayout, IndexDescriptor};
pub use news::{NewsArticle, NewsFeed};
pub use outcome::FetchOutcome;
pub use quote::{IndexQuote, Quote, QuoteView};
