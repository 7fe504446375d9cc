use serde::{Deserialize, Serialize};

use crate::models::FetchOutcome;
use crate::services::format::{format_percent, format_price};
use crate::services::indicators::percent_change;

/// Last close against the close before it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub last_price: f64,
    pub previous_close: f64,
    pub change_percent: f64,
}

impl Quote {
    /// Build a quote from chronological closes.
    ///
    /// Returns `None` when fewer than two closes are available; the change
    /// calculation is never attempted in that case.
    pub fn from_closes(symbol: &str, closes: &[f64]) -> Option<Self> {
        let [.., previous_close, last_price] = closes else {
            return None;
        };

        Some(Self {
            symbol: symbol.to_string(),
            last_price: *last_price,
            previous_close: *previous_close,
            change_percent: percent_change(*last_price, *previous_close),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

/// Quote with its display strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteView {
    #[serde(flatten)]
    pub quote: Quote,
    pub price_display: String,
    pub change_display: String,
    pub direction: Direction,
}

impl From<Quote> for QuoteView {
    fn from(quote: Quote) -> Self {
        // Unchanged counts as up
        let direction = if quote.change_percent >= 0.0 { Direction::Up } else { Direction::Down };
        Self {
            price_display: format_price(quote.last_price),
            change_display: format_percent(quote.change_percent),
            direction,
            quote,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexQuote {
    pub symbol: String,
    pub name: String,
    pub quote: FetchOutcome<QuoteView>,
}
