use async_trait::async_trait;
use chrono::{Datelike, Duration, NaiveDate, Utc};

use crate::external::market_data::{
    Candle, FinancialStatement, LineItem, MarketDataError, MarketDataProvider, StatementKind,
};

/// Offline provider producing a random walk, for running the dashboard
/// without network access (`MARKET_DATA_PROVIDER=mock`).
pub struct MockProvider {
    start_price: f64,
}

impl MockProvider {
    pub fn new() -> Self {
        Self { start_price: 100.0 }
    }
}

fn range_days(range: &str) -> i64 {
    match range {
        "1d" => 1,
        "2d" => 2,
        "5d" => 5,
        "1mo" => 30,
        "3mo" => 90,
        "6mo" => 180,
        "1y" => 365,
        "2y" => 730,
        _ => 180,
    }
}

fn interval_days(interval: &str) -> i64 {
    match interval {
        "1wk" => 7,
        "1mo" => 30,
        _ => 1,
    }
}

#[async_trait]
impl MarketDataProvider for MockProvider {
    async fn fetch_history(
        &self,
        _symbol: &str,
        range: &str,
        interval: &str,
    ) -> Result<Vec<Candle>, MarketDataError> {
        let step = interval_days(interval);
        let count = (range_days(range) / step).max(1);
        let now = Utc::now();

        let mut current = self.start_price;
        let mut candles = Vec::with_capacity(count as usize);

        for i in (0..count).rev() {
            let open = current;
            current *= 1.0 + (rand::random::<f64>() - 0.5) * 0.02;
            let spread = current.max(open) * rand::random::<f64>() * 0.005;

            candles.push(Candle {
                timestamp: now - Duration::days(i * step),
                open,
                high: current.max(open) + spread,
                low: current.min(open) - spread,
                close: current,
                volume: rand::random_range(10_000..1_000_000),
            });
        }

        Ok(candles)
    }

    async fn fetch_statement(
        &self,
        _symbol: &str,
        kind: StatementKind,
    ) -> Result<FinancialStatement, MarketDataError> {
        let latest_year = Utc::now().year() - 1;

        let periods: Vec<NaiveDate> = (0..4)
            .filter_map(|i| NaiveDate::from_ymd_opt(latest_year - i, 3, 31))
            .collect();

        let rows = kind
            .line_items()
            .iter()
            .map(|(_, label)| LineItem {
                label: label.to_string(),
                values: periods
                    .iter()
                    .map(|_| Some(rand::random::<f64>() * 5.0e11))
                    .collect(),
            })
            .collect();

        Ok(FinancialStatement { kind, periods, rows })
    }
}
