use std::net::SocketAddr;
use std::time::Duration;

use crate::models::IndexDescriptor;
use crate::services::quote_service::validate_symbol;

const DEFAULT_INDICES: &str = "^NSEI=NIFTY 50;^BSESN=SENSEX;^NSEBANK=BANKNIFTY;^CNXIT=NIFTY IT";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub http_timeout: Duration,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, String> {
        let bind_addr = std::env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse()
            .map_err(|e| format!("Invalid BIND_ADDR: {}", e))?;

        let http_timeout = parse_timeout(
            &std::env::var("HTTP_TIMEOUT_SECS").unwrap_or_else(|_| "10".to_string()),
        )?;

        Ok(Self {
            bind_addr,
            http_timeout,
        })
    }
}

/// Whole seconds, at least one.
pub fn parse_timeout(raw: &str) -> Result<Duration, String> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err("Invalid HTTP_TIMEOUT_SECS: must be at least 1".to_string()),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(e) => Err(format!("Invalid HTTP_TIMEOUT_SECS '{}': {}", raw, e)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Yahoo,
    Mock,
}

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub provider: ProviderKind,
    pub indices: Vec<IndexDescriptor>,
    pub default_symbol: String,
}

impl DashboardConfig {
    pub fn from_env() -> Result<Self, String> {
        let provider = match std::env::var("MARKET_DATA_PROVIDER")
            .unwrap_or_else(|_| "yahoo".to_string())
            .to_lowercase()
            .as_str()
        {
            "yahoo" => ProviderKind::Yahoo,
            "mock" => ProviderKind::Mock,
            other => {
                return Err(format!(
                    "Invalid MARKET_DATA_PROVIDER: {}. Must be 'yahoo' or 'mock'",
                    other
                ))
            }
        };

        let indices = parse_indices(
            &std::env::var("DASHBOARD_INDICES").unwrap_or_else(|_| DEFAULT_INDICES.to_string()),
        )?;

        Ok(Self {
            provider,
            indices,
            default_symbol: std::env::var("DEFAULT_SYMBOL")
                .unwrap_or_else(|_| "RELIANCE.NS".to_string()),
        })
    }
}

/// Parse `SYMBOL=Display Name;SYMBOL=Display Name`, keeping the given order.
pub fn parse_indices(raw: &str) -> Result<Vec<IndexDescriptor>, String> {
    raw.split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (symbol, name) = entry
                .split_once('=')
                .ok_or_else(|| format!("Invalid index entry '{}', expected SYMBOL=Name", entry))?;
            let (symbol, name) = (symbol.trim(), name.trim());
            if symbol.is_empty() || name.is_empty() {
                return Err(format!("Invalid index entry '{}', expected SYMBOL=Name", entry));
            }
            let symbol = validate_symbol(symbol)
                .map_err(|e| format!("Invalid index entry '{}': {}", entry, e))?;
            Ok(IndexDescriptor {
                symbol,
                name: name.to_string(),
            })
        })
        .collect()
}
