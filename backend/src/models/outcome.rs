use serde::{Deserialize, Serialize};

/// Result of an upstream fetch as seen by a page.
///
/// Keeps "the provider answered with nothing" apart from "the provider could
/// not be reached", which the dashboard renders differently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FetchOutcome<T> {
    #[serde(rename = "ok")]
    Data { data: T },
    NoData { message: String },
    #[serde(rename = "error")]
    Failed { message: String },
}

impl<T> FetchOutcome<T> {
    pub fn data(data: T) -> Self {
        FetchOutcome::Data { data }
    }

    pub fn no_data(message: impl Into<String>) -> Self {
        FetchOutcome::NoData { message: message.into() }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        FetchOutcome::Failed { message: message.into() }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FetchOutcome<U> {
        match self {
            FetchOutcome::Data { data } => FetchOutcome::Data { data: f(data) },
            FetchOutcome::NoData { message } => FetchOutcome::NoData { message },
            FetchOutcome::Failed { message } => FetchOutcome::Failed { message },
        }
    }

    pub fn as_data(&self) -> Option<&T> {
        match self {
            FetchOutcome::Data { data } => Some(data),
            _ => None,
        }
    }
}
