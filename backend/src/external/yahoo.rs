use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::external::market_data::{
    Candle, FinancialStatement, LineItem, MarketDataError, MarketDataProvider, StatementKind,
};

const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const TIMESERIES_URL: &str =
    "https://query2.finance.yahoo.com/ws/fundamentals-timeseries/v1/finance/timeseries";
// 2000-01-01, early enough to cover the four annual periods Yahoo publishes.
const TIMESERIES_START: i64 = 946_684_800;

/// Yahoo Finance provider. No API key required; covers NSE (.NS) and BSE (.BO)
/// listings as well as the Indian indices (^NSEI, ^BSESN, ...).
pub struct YahooFinanceProvider {
    client: reqwest::Client,
}

impl YahooFinanceProvider {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("Mozilla/5.0 (compatible; StockTracker/0.1)")
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    result: Option<Vec<YahooResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    description: String,
}

#[derive(Debug, Deserialize)]
struct YahooResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: YahooIndicators,
}

#[derive(Debug, Deserialize)]
struct YahooIndicators {
    quote: Vec<YahooQuote>,
}

#[derive(Debug, Default, Deserialize)]
struct YahooQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

#[derive(Debug, Deserialize)]
struct TimeseriesResponse {
    timeseries: Timeseries,
}

#[derive(Debug, Deserialize)]
struct Timeseries {
    result: Option<Vec<serde_json::Map<String, Value>>>,
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReportedEntry {
    as_of_date: String,
    reported_value: Option<ReportedValue>,
}

#[derive(Debug, Deserialize)]
struct ReportedValue {
    raw: Option<f64>,
}

fn parse_chart(body: YahooChartResponse) -> Result<Vec<Candle>, MarketDataError> {
    if let Some(error) = body.chart.error {
        if error.description.contains("No data found") {
            return Err(MarketDataError::NotFound(error.description));
        }
        return Err(MarketDataError::BadResponse(error.description));
    }

    let result = body
        .chart
        .result
        .and_then(|mut r| if r.is_empty() { None } else { Some(r.swap_remove(0)) })
        .ok_or_else(|| MarketDataError::BadResponse("No results in response".into()))?;

    // An empty trading window comes back without a timestamp array.
    if result.timestamp.is_empty() {
        return Ok(Vec::new());
    }

    let quote = result
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| MarketDataError::BadResponse("No quote data in response".into()))?;

    if quote.close.len() != result.timestamp.len() {
        return Err(MarketDataError::Parse(
            "Timestamp and close price arrays have different lengths".into(),
        ));
    }

    let mut candles: Vec<Candle> = result
        .timestamp
        .iter()
        .enumerate()
        .filter_map(|(i, ts)| {
            // Holidays and halted sessions come through as nulls
            let open = quote.open.get(i).copied().flatten()?;
            let high = quote.high.get(i).copied().flatten()?;
            let low = quote.low.get(i).copied().flatten()?;
            let close = quote.close.get(i).copied().flatten()?;
            let volume = quote.volume.get(i).copied().flatten().unwrap_or(0);
            let timestamp = DateTime::from_timestamp(*ts, 0)?;

            Some(Candle { timestamp, open, high, low, close, volume })
        })
        .collect();

    candles.sort_by_key(|c| c.timestamp);
    Ok(candles)
}

fn parse_timeseries(
    kind: StatementKind,
    body: TimeseriesResponse,
) -> Result<FinancialStatement, MarketDataError> {
    if let Some(error) = body.timeseries.error.filter(|e| !e.is_null()) {
        return Err(MarketDataError::BadResponse(error.to_string()));
    }

    let results = body
        .timeseries
        .result
        .ok_or_else(|| MarketDataError::BadResponse("No results in response".into()))?;

    let mut by_key: HashMap<&str, HashMap<NaiveDate, f64>> = HashMap::new();
    let mut periods = BTreeSet::new();

    for result in &results {
        let Some(type_name) = result
            .get("meta")
            .and_then(|m| m.get("type"))
            .and_then(|t| t.get(0))
            .and_then(Value::as_str)
        else {
            continue;
        };

        let Some((key, _)) = kind
            .line_items()
            .iter()
            .find(|(key, _)| type_name.strip_prefix("annual") == Some(*key))
        else {
            debug!("Ignoring unexpected timeseries type {}", type_name);
            continue;
        };

        let Some(entries) = result.get(type_name).and_then(Value::as_array) else {
            continue;
        };

        for entry in entries.iter().filter(|e| !e.is_null()) {
            let entry: ReportedEntry = serde_json::from_value(entry.clone())
                .map_err(|e| MarketDataError::Parse(e.to_string()))?;
            let date = NaiveDate::parse_from_str(&entry.as_of_date, "%Y-%m-%d")
                .map_err(|e| MarketDataError::Parse(format!("bad asOfDate: {}", e)))?;
            let Some(raw) = entry.reported_value.and_then(|v| v.raw) else {
                continue;
            };

            periods.insert(date);
            by_key.entry(*key).or_default().insert(date, raw);
        }
    }

    let periods: Vec<NaiveDate> = periods.into_iter().rev().collect();

    let rows = kind
        .line_items()
        .iter()
        .filter_map(|(key, label)| {
            let values = by_key.get(key)?;
            Some(LineItem {
                label: label.to_string(),
                values: periods.iter().map(|p| values.get(p).copied()).collect(),
            })
        })
        .collect();

    Ok(FinancialStatement { kind, periods, rows })
}

fn timeseries_types(kind: StatementKind) -> String {
    kind.line_items()
        .iter()
        .map(|(key, _)| format!("annual{}", key))
        .collect::<Vec<_>>()
        .join(",")
}

#[async_trait]
impl MarketDataProvider for YahooFinanceProvider {
    async fn fetch_history(
        &self,
        symbol: &str,
        range: &str,
        interval: &str,
    ) -> Result<Vec<Candle>, MarketDataError> {
        let url = format!("{}/{}", CHART_URL, symbol);

        let resp = self
            .client
            .get(&url)
            .query(&[("range", range), ("interval", interval)])
            .send()
            .await
            .map_err(|e| MarketDataError::Network(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketDataError::RateLimited);
        }
        // Yahoo answers unknown symbols with 404 and a chart.error body
        if !status.is_success() && status != reqwest::StatusCode::NOT_FOUND {
            return Err(MarketDataError::BadResponse(format!("HTTP {}", status)));
        }

        let body: YahooChartResponse = resp
            .json()
            .await
            .map_err(|e| MarketDataError::Parse(e.to_string()))?;

        let candles = parse_chart(body)?;
        if candles.is_empty() {
            warn!("Yahoo returned no candles for {} ({}/{})", symbol, range, interval);
        }
        Ok(candles)
    }

    async fn fetch_statement(
        &self,
        symbol: &str,
        kind: StatementKind,
    ) -> Result<FinancialStatement, MarketDataError> {
        let url = format!("{}/{}", TIMESERIES_URL, symbol);
        let period2 = Utc::now().timestamp().to_string();
        let start = TIMESERIES_START.to_string();
        let types = timeseries_types(kind);

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("symbol", symbol),
                ("type", types.as_str()),
                ("period1", start.as_str()),
                ("period2", period2.as_str()),
            ])
            .send()
            .await
            .map_err(|e| MarketDataError::Network(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketDataError::RateLimited);
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(MarketDataError::NotFound(format!("No {} for {}", kind.title(), symbol)));
        }
        if !status.is_success() {
            return Err(MarketDataError::BadResponse(format!("HTTP {}", status)));
        }

        let body: TimeseriesResponse = resp
            .json()
            .await
            .map_err(|e| MarketDataError::Parse(e.to_string()))?;

        parse_timeseries(kind, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn chart(value: Value) -> YahooChartResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn chart_rows_with_nulls_are_skipped() {
        let body = chart(json!({
            "chart": {
                "result": [{
                    "timestamp": [1_700_172_800, 1_700_086_400, 1_700_259_200],
                    "indicators": {
                        "quote": [{
                            "open":   [101.0, 100.0, null],
                            "high":   [103.0, 102.0, 104.0],
                            "low":    [100.5,  99.0, 101.0],
                            "close":  [102.0, 101.0, 103.0],
                            "volume": [1200, null, 900]
                        }]
                    }
                }],
                "error": null
            }
        }));

        let candles = parse_chart(body).unwrap();
        assert_eq!(candles.len(), 2);
        // sorted oldest first
        assert_eq!(candles[0].close, 101.0);
        assert_eq!(candles[0].volume, 0);
        assert_eq!(candles[1].close, 102.0);
        assert_eq!(candles[1].volume, 1200);
    }

    #[test]
    fn chart_error_no_data_is_not_found() {
        let body = chart(json!({
            "chart": {
                "result": null,
                "error": { "code": "Not Found", "description": "No data found, symbol may be delisted" }
            }
        }));

        assert!(matches!(parse_chart(body), Err(MarketDataError::NotFound(_))));
    }

    #[test]
    fn chart_without_timestamps_is_empty() {
        let body = chart(json!({
            "chart": {
                "result": [{ "indicators": { "quote": [{}] } }],
                "error": null
            }
        }));

        assert!(parse_chart(body).unwrap().is_empty());
    }

    #[test]
    fn timeseries_maps_to_labelled_rows() {
        let body: TimeseriesResponse = serde_json::from_value(json!({
            "timeseries": {
                "result": [
                    {
                        "meta": { "symbol": ["TCS.NS"], "type": ["annualTotalRevenue"] },
                        "timestamp": [1_648_684_800, 1_680_220_800],
                        "annualTotalRevenue": [
                            { "asOfDate": "2022-03-31", "periodType": "12M", "reportedValue": { "raw": 1.9e12, "fmt": "1.9T" } },
                            { "asOfDate": "2023-03-31", "periodType": "12M", "reportedValue": { "raw": 2.25e12, "fmt": "2.25T" } }
                        ]
                    },
                    {
                        "meta": { "symbol": ["TCS.NS"], "type": ["annualNetIncome"] },
                        "timestamp": [1_680_220_800],
                        "annualNetIncome": [
                            null,
                            { "asOfDate": "2023-03-31", "periodType": "12M", "reportedValue": { "raw": 4.2e11 } }
                        ]
                    },
                    {
                        "meta": { "symbol": ["TCS.NS"], "type": ["annualEBITDA"] }
                    }
                ],
                "error": null
            }
        }))
        .unwrap();

        let statement = parse_timeseries(StatementKind::IncomeStatement, body).unwrap();
        assert_eq!(
            statement.periods,
            vec![
                NaiveDate::from_ymd_opt(2023, 3, 31).unwrap(),
                NaiveDate::from_ymd_opt(2022, 3, 31).unwrap(),
            ]
        );
        assert_eq!(statement.rows.len(), 2);
        assert_eq!(statement.rows[0].label, "Total Revenue");
        assert_eq!(statement.rows[0].values, vec![Some(2.25e12), Some(1.9e12)]);
        assert_eq!(statement.rows[1].label, "Net Income");
        assert_eq!(statement.rows[1].values, vec![Some(4.2e11), None]);
    }

    #[test]
    fn timeseries_types_use_annual_prefix() {
        let types = timeseries_types(StatementKind::BalanceSheet);
        assert!(types.starts_with("annualTotalAssets,"));
        assert_eq!(types.split(',').count(), StatementKind::BalanceSheet.line_items().len());
    }
}
