use tracing::{error, info, warn};

use crate::errors::AppError;
use crate::external::market_data::{Candle, MarketDataError, MarketDataProvider, StatementKind};
use crate::models::{
    FetchOutcome, FinancialsView, FormattedStatement, IndexDescriptor, IndexQuote, Indicator,
    IndicatorPoint, IndicatorSeries, Interval, PriceChart, Quote, QuoteView, Timeframe,
};
use crate::services::indicators::{
    ema, macd, rsi, sma, EMA_SPAN, MACD_FAST, MACD_SIGNAL, MACD_SLOW, RSI_PERIOD, SMA_WINDOW,
};

// A few sessions back so weekends and holidays still leave two closes
const QUOTE_RANGE: &str = "5d";
const QUOTE_INTERVAL: &str = "1d";
const MAX_SYMBOL_LEN: usize = 32;

pub const NO_QUOTE_DATA: &str = "No data found for the given stock symbol.";
pub const NO_CHART_DATA: &str =
    "No data found for the given stock symbol. Please check and try again.";

/// Trim and sanity-check a user-entered ticker such as `RELIANCE.NS` or `^NSEI`.
pub fn validate_symbol(raw: &str) -> Result<String, AppError> {
    let symbol = raw.trim();
    if symbol.is_empty() {
        return Err(AppError::Validation("Stock symbol must not be empty".into()));
    }
    if symbol.len() > MAX_SYMBOL_LEN {
        return Err(AppError::Validation(format!(
            "Stock symbol must be at most {} characters",
            MAX_SYMBOL_LEN
        )));
    }
    if !symbol
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '^' | '=' | '_' | '-'))
    {
        return Err(AppError::Validation(format!("Invalid stock symbol: {}", symbol)));
    }
    Ok(symbol.to_string())
}

fn outcome_from_error<T>(symbol: &str, what: &str, err: MarketDataError) -> FetchOutcome<T> {
    match err {
        MarketDataError::NotFound(msg) => {
            warn!("No {} for {}: {}", what, symbol, msg);
            FetchOutcome::no_data(format!("No {} found for {}.", what, symbol))
        }
        other => {
            error!("Failed to fetch {} for {}: {}", what, symbol, other);
            FetchOutcome::failed(format!("Error: {}", other))
        }
    }
}

fn closes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.close).collect()
}

pub async fn stock_quote(provider: &dyn MarketDataProvider, symbol: &str) -> FetchOutcome<QuoteView> {
    match provider.fetch_history(symbol, QUOTE_RANGE, QUOTE_INTERVAL).await {
        Ok(candles) => match Quote::from_closes(symbol, &closes(&candles)) {
            Some(quote) => FetchOutcome::data(quote),
            None => {
                warn!("Only {} closes for {}, no quote", candles.len(), symbol);
                FetchOutcome::no_data(NO_QUOTE_DATA)
            }
        }
        .map(QuoteView::from),
        Err(e) => outcome_from_error(symbol, "quote", e),
    }
}

/// Quotes for every configured index, fetched one after another in list order.
pub async fn index_snapshot(
    provider: &dyn MarketDataProvider,
    indices: &[IndexDescriptor],
) -> Vec<IndexQuote> {
    let mut snapshot = Vec::with_capacity(indices.len());
    for index in indices {
        let quote = stock_quote(provider, &index.symbol).await;
        snapshot.push(IndexQuote {
            symbol: index.symbol.clone(),
            name: index.name.clone(),
            quote,
        });
    }
    let available = snapshot.iter().filter(|q| q.quote.as_data().is_some()).count();
    info!("Built index snapshot: {}/{} indices with data", available, snapshot.len());
    snapshot
}

fn aligned(candles: &[Candle], values: impl IntoIterator<Item = Option<f64>>) -> Vec<IndicatorPoint> {
    candles
        .iter()
        .zip(values)
        .map(|(c, value)| IndicatorPoint { timestamp: c.timestamp, value })
        .collect()
}

/// Overlay lines for the requested indicators, in request order, each
/// indicator at most once.
pub fn build_overlays(candles: &[Candle], indicators: &[Indicator]) -> Vec<IndicatorSeries> {
    let closes = closes(candles);
    let mut seen = Vec::new();
    let mut overlays = Vec::new();

    for &indicator in indicators {
        if seen.contains(&indicator) {
            continue;
        }
        seen.push(indicator);

        match indicator {
            Indicator::Sma => overlays.push(IndicatorSeries {
                indicator,
                name: format!("SMA ({})", SMA_WINDOW),
                points: aligned(candles, sma(&closes, SMA_WINDOW)),
            }),
            Indicator::Ema => overlays.push(IndicatorSeries {
                indicator,
                name: format!("EMA ({})", EMA_SPAN),
                points: aligned(candles, ema(&closes, EMA_SPAN).into_iter().map(Some)),
            }),
            Indicator::Rsi => overlays.push(IndicatorSeries {
                indicator,
                name: format!("RSI ({})", RSI_PERIOD),
                points: aligned(candles, rsi(&closes, RSI_PERIOD)),
            }),
            Indicator::Macd => {
                let out = macd(&closes, MACD_FAST, MACD_SLOW, MACD_SIGNAL);
                for (name, values) in [
                    (format!("MACD ({}, {})", MACD_FAST, MACD_SLOW), out.line),
                    (format!("Signal ({})", MACD_SIGNAL), out.signal),
                    ("Histogram".to_string(), out.histogram),
                ] {
                    overlays.push(IndicatorSeries {
                        indicator,
                        name,
                        points: aligned(candles, values.into_iter().map(Some)),
                    });
                }
            }
        }
    }

    overlays
}

pub async fn price_chart(
    provider: &dyn MarketDataProvider,
    symbol: &str,
    timeframe: Timeframe,
    interval: Interval,
    indicators: &[Indicator],
) -> FetchOutcome<PriceChart> {
    match provider
        .fetch_history(symbol, timeframe.as_str(), interval.as_str())
        .await
    {
        Ok(candles) if candles.is_empty() => {
            warn!("No candles for {} ({}/{})", symbol, timeframe, interval);
            FetchOutcome::no_data(NO_CHART_DATA)
        }
        Ok(candles) => {
            let overlays = build_overlays(&candles, indicators);
            FetchOutcome::data(PriceChart {
                symbol: symbol.to_string(),
                title: format!("{} Stock Price Movement", symbol),
                timeframe,
                interval,
                candles,
                overlays,
            })
        }
        Err(MarketDataError::NotFound(msg)) => {
            warn!("No chart data for {}: {}", symbol, msg);
            FetchOutcome::no_data(NO_CHART_DATA)
        }
        Err(e) => outcome_from_error(symbol, "price history", e),
    }
}

async fn statement(
    provider: &dyn MarketDataProvider,
    symbol: &str,
    kind: StatementKind,
) -> FetchOutcome<FormattedStatement> {
    match provider.fetch_statement(symbol, kind).await {
        Ok(statement) if statement.is_empty() => {
            warn!("Empty {} for {}", kind.title(), symbol);
            FetchOutcome::no_data(format!("{} data not available.", kind.title()))
        }
        Ok(statement) => FetchOutcome::data(FormattedStatement::from(&statement)),
        Err(e) => outcome_from_error(symbol, &kind.title().to_lowercase(), e),
    }
}

/// Balance sheet and income statement; each carries its own outcome.
pub async fn financials(provider: &dyn MarketDataProvider, symbol: &str) -> FinancialsView {
    let balance_sheet = statement(provider, symbol, StatementKind::BalanceSheet).await;
    let income_statement = statement(provider, symbol, StatementKind::IncomeStatement).await;

    FinancialsView {
        symbol: symbol.to_string(),
        balance_sheet,
        income_statement,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::external::market_data::{FinancialStatement, LineItem};
    use async_trait::async_trait;
    use chrono::{DateTime, NaiveDate};
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Clone)]
    pub(crate) enum Reply {
        Closes(Vec<f64>),
        NotFound,
        Down,
    }

    /// Provider double with a default reply for history and statements,
    /// overridable per symbol and per statement kind. Records the symbols
    /// it was asked for.
    pub(crate) struct StubProvider {
        pub history: Reply,
        pub statements: Reply,
        pub by_symbol: HashMap<String, Reply>,
        pub by_kind: Vec<(StatementKind, Reply)>,
        pub calls: Mutex<Vec<String>>,
    }

    impl StubProvider {
        pub(crate) fn new(history: Reply, statements: Reply) -> Self {
            Self {
                history,
                statements,
                by_symbol: HashMap::new(),
                by_kind: Vec::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn symbol(mut self, symbol: &str, reply: Reply) -> Self {
            self.by_symbol.insert(symbol.to_string(), reply);
            self
        }

        pub(crate) fn statement(mut self, kind: StatementKind, reply: Reply) -> Self {
            self.by_kind.push((kind, reply));
            self
        }
    }

    pub(crate) fn candles(closes: &[f64]) -> Vec<Candle> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Candle {
                timestamp: DateTime::from_timestamp(1_700_000_000 + i as i64 * 86_400, 0).unwrap(),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1_000,
            })
            .collect()
    }

    fn reply_error(reply: &Reply) -> MarketDataError {
        match reply {
            Reply::NotFound => MarketDataError::NotFound("No data found".into()),
            _ => MarketDataError::Network("connection refused".into()),
        }
    }

    #[async_trait]
    impl MarketDataProvider for StubProvider {
        async fn fetch_history(
            &self,
            symbol: &str,
            _range: &str,
            _interval: &str,
        ) -> Result<Vec<Candle>, MarketDataError> {
            self.calls.lock().unwrap().push(symbol.to_string());
            match self.by_symbol.get(symbol).unwrap_or(&self.history) {
                Reply::Closes(closes) => Ok(candles(closes)),
                other => Err(reply_error(other)),
            }
        }

        async fn fetch_statement(
            &self,
            _symbol: &str,
            kind: StatementKind,
        ) -> Result<FinancialStatement, MarketDataError> {
            let reply = self
                .by_kind
                .iter()
                .find(|(k, _)| *k == kind)
                .map_or(&self.statements, |(_, reply)| reply);
            match reply {
                Reply::Closes(values) => Ok(FinancialStatement {
                    kind,
                    periods: values
                        .iter()
                        .enumerate()
                        .map(|(i, _)| NaiveDate::from_ymd_opt(2024 - i as i32, 3, 31).unwrap())
                        .collect(),
                    rows: vec![LineItem {
                        label: kind.line_items()[0].1.to_string(),
                        values: values.iter().copied().map(Some).collect(),
                    }],
                }),
                other => Err(reply_error(other)),
            }
        }
    }

    #[test]
    fn symbol_validation() {
        assert_eq!(validate_symbol("  RELIANCE.NS ").unwrap(), "RELIANCE.NS");
        assert_eq!(validate_symbol("^NSEI").unwrap(), "^NSEI");
        assert!(validate_symbol("   ").is_err());
        assert!(validate_symbol("TCS NS").is_err());
        assert!(validate_symbol("../etc").is_err());
        assert!(validate_symbol(&"A".repeat(33)).is_err());
    }

    #[tokio::test]
    async fn quote_from_last_two_closes() {
        let provider = StubProvider::new(Reply::Closes(vec![98.0, 100.0, 110.0]), Reply::Down);
        let FetchOutcome::Data { data } = stock_quote(&provider, "TCS.NS").await else {
            panic!("expected data");
        };
        assert_eq!(data.quote.last_price, 110.0);
        assert_eq!(data.change_display, "10.00%");
    }

    #[tokio::test]
    async fn empty_history_is_no_data() {
        let provider = StubProvider::new(Reply::Closes(vec![]), Reply::Down);
        assert_eq!(stock_quote(&provider, "X").await, FetchOutcome::no_data(NO_QUOTE_DATA));

        let single = StubProvider::new(Reply::Closes(vec![100.0]), Reply::Down);
        assert_eq!(stock_quote(&single, "X").await, FetchOutcome::no_data(NO_QUOTE_DATA));
    }

    #[tokio::test]
    async fn failure_is_distinct_from_no_data() {
        let down = StubProvider::new(Reply::Down, Reply::Down);
        assert!(matches!(stock_quote(&down, "X").await, FetchOutcome::Failed { .. }));

        let missing = StubProvider::new(Reply::NotFound, Reply::Down);
        assert!(matches!(stock_quote(&missing, "X").await, FetchOutcome::NoData { .. }));
    }

    #[tokio::test]
    async fn index_snapshot_keeps_configured_order() {
        let provider = StubProvider::new(Reply::Closes(vec![100.0, 101.0]), Reply::Down);
        let indices = crate::config::parse_indices("^NSEI=NIFTY 50;^BSESN=SENSEX").unwrap();

        let snapshot = index_snapshot(&provider, &indices).await;
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[1].name, "SENSEX");
        assert!(snapshot.iter().all(|q| q.quote.as_data().is_some()));
        assert_eq!(*provider.calls.lock().unwrap(), vec!["^NSEI", "^BSESN"]);
    }

    #[tokio::test]
    async fn chart_attaches_aligned_overlays() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let provider = StubProvider::new(Reply::Closes(closes), Reply::Down);

        let FetchOutcome::Data { data } = price_chart(
            &provider,
            "INFY.NS",
            Timeframe::OneMonth,
            Interval::Daily,
            &[Indicator::Sma, Indicator::Ema, Indicator::Sma],
        )
        .await
        else {
            panic!("expected data");
        };

        assert_eq!(data.title, "INFY.NS Stock Price Movement");
        assert_eq!(data.overlays.len(), 2);

        let sma = &data.overlays[0];
        assert_eq!(sma.name, "SMA (20)");
        assert_eq!(sma.points.len(), 30);
        assert!(sma.points[18].value.is_none());
        assert_eq!(sma.points[19].value, Some(109.5));
        assert_eq!(sma.points[19].timestamp, data.candles[19].timestamp);

        let ema = &data.overlays[1];
        assert_eq!(ema.points[0].value, Some(100.0));
        assert!(ema.points.iter().all(|p| p.value.is_some()));
    }

    #[test]
    fn macd_adds_three_lines() {
        let overlays = build_overlays(&candles(&[1.0, 2.0, 3.0]), &[Indicator::Macd, Indicator::Rsi]);
        let names: Vec<&str> = overlays.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["MACD (12, 26)", "Signal (9)", "Histogram", "RSI (14)"]);
    }

    #[tokio::test]
    async fn empty_chart_is_no_data() {
        let provider = StubProvider::new(Reply::Closes(vec![]), Reply::Down);
        let outcome = price_chart(&provider, "X", Timeframe::default(), Interval::default(), &[]).await;
        assert_eq!(outcome, FetchOutcome::no_data(NO_CHART_DATA));
    }

    #[tokio::test]
    async fn financials_are_formatted() {
        let provider = StubProvider::new(Reply::Down, Reply::Closes(vec![2.5e9, 1.2e6]));
        let view = financials(&provider, "TCS.NS").await;

        let balance = view.balance_sheet.as_data().unwrap();
        assert_eq!(balance.rows[0].label, "Total Assets");
        assert_eq!(balance.rows[0].values, vec!["2.50B", "1.20M"]);
        assert_eq!(view.income_statement.as_data().unwrap().title, "Income Statement");
    }

    #[tokio::test]
    async fn empty_and_failed_statements() {
        let empty = StubProvider::new(Reply::Down, Reply::Closes(vec![]));
        let view = financials(&empty, "X").await;
        assert_eq!(
            view.balance_sheet,
            FetchOutcome::no_data("Balance Sheet data not available.")
        );

        let down = StubProvider::new(Reply::Down, Reply::Down);
        let view = financials(&down, "X").await;
        assert!(matches!(view.income_statement, FetchOutcome::Failed { .. }));
    }

    #[tokio::test]
    async fn one_failing_index_does_not_hide_the_others() {
        let provider = StubProvider::new(Reply::Down, Reply::Down)
            .symbol("^NSEI", Reply::Closes(vec![100.0, 102.0]))
            .symbol("^BSESN", Reply::NotFound);
        let indices =
            crate::config::parse_indices("^NSEI=NIFTY 50;^BSESN=SENSEX;^CNXIT=NIFTY IT").unwrap();

        let snapshot = index_snapshot(&provider, &indices).await;
        assert_eq!(snapshot[0].quote.as_data().unwrap().change_display, "2.00%");
        assert!(matches!(snapshot[1].quote, FetchOutcome::NoData { .. }));
        assert!(matches!(snapshot[2].quote, FetchOutcome::Failed { .. }));
    }

    #[tokio::test]
    async fn each_statement_has_its_own_outcome() {
        let provider = StubProvider::new(Reply::Down, Reply::Closes(vec![4.0e9]))
            .statement(StatementKind::IncomeStatement, Reply::Down);
        let view = financials(&provider, "TCS.NS").await;

        assert_eq!(view.balance_sheet.as_data().unwrap().rows[0].values, vec!["4.00B"]);
        assert!(matches!(view.income_statement, FetchOutcome::Failed { .. }));
    }
}
