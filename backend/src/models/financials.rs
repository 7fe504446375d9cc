use serde::{Deserialize, Serialize};

use crate::external::market_data::{FinancialStatement, StatementKind};
use crate::models::FetchOutcome;
use crate::services::format::format_number;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedLineItem {
    pub label: String,
    pub values: Vec<String>,
}

/// Display copy of a [`FinancialStatement`] with every cell abbreviated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedStatement {
    pub kind: StatementKind,
    pub title: String,
    pub periods: Vec<String>,
    pub rows: Vec<FormattedLineItem>,
}

impl From<&FinancialStatement> for FormattedStatement {
    fn from(statement: &FinancialStatement) -> Self {
        Self {
            kind: statement.kind,
            title: statement.kind.title().to_string(),
            periods: statement
                .periods
                .iter()
                .map(|p| p.format("%Y-%m-%d").to_string())
                .collect(),
            rows: statement
                .rows
                .iter()
                .map(|row| FormattedLineItem {
                    label: row.label.clone(),
                    values: row.values.iter().copied().map(format_number).collect(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialsView {
    pub symbol: String,
    pub balance_sheet: FetchOutcome<FormattedStatement>,
    pub income_statement: FetchOutcome<FormattedStatement>,
}
