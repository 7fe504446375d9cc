use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One OHLCV bucket as returned by a market-data provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    BalanceSheet,
    IncomeStatement,
}

impl StatementKind {
    /// Upstream line items for this statement as (field key, display label).
    pub fn line_items(self) -> &'static [(&'static str, &'static str)] {
        match self {
            StatementKind::BalanceSheet => &[
                ("TotalAssets", "Total Assets"),
                ("TotalLiabilitiesNetMinorityInterest", "Total Liabilities"),
                ("StockholdersEquity", "Stockholders Equity"),
                ("CurrentAssets", "Current Assets"),
                ("CurrentLiabilities", "Current Liabilities"),
                ("CashAndCashEquivalents", "Cash And Cash Equivalents"),
                ("TotalDebt", "Total Debt"),
                ("WorkingCapital", "Working Capital"),
            ],
            StatementKind::IncomeStatement => &[
                ("TotalRevenue", "Total Revenue"),
                ("CostOfRevenue", "Cost Of Revenue"),
                ("GrossProfit", "Gross Profit"),
                ("OperatingIncome", "Operating Income"),
                ("EBITDA", "EBITDA"),
                ("PretaxIncome", "Pretax Income"),
                ("NetIncome", "Net Income"),
                ("DilutedEPS", "Diluted EPS"),
            ],
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            StatementKind::BalanceSheet => "Balance Sheet",
            StatementKind::IncomeStatement => "Income Statement",
        }
    }
}

/// A single labelled row; `values` is aligned with the statement's `periods`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub label: String,
    pub values: Vec<Option<f64>>,
}

/// Raw financial statement table. Periods are ordered newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialStatement {
    pub kind: StatementKind,
    pub periods: Vec<NaiveDate>,
    pub rows: Vec<LineItem>,
}

impl FinancialStatement {
    pub fn is_empty(&self) -> bool {
        self.periods.is_empty() || self.rows.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("network error: {0}")]
    Network(String),

    #[error("bad response: {0}")]
    BadResponse(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("rate limited")]
    RateLimited,

    #[error("not found: {0}")]
    NotFound(String),
}

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetch OHLCV history, oldest candle first.
    ///
    /// `range` and `interval` use the upstream vocabulary ("5d", "6mo", "1wk", ...).
    async fn fetch_history(
        &self,
        symbol: &str,
        range: &str,
        interval: &str,
    ) -> Result<Vec<Candle>, MarketDataError>;

    async fn fetch_statement(
        &self,
        symbol: &str,
        kind: StatementKind,
    ) -> Result<FinancialStatement, MarketDataError>;
}
