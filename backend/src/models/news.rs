use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single headline for the news page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    pub source: String,
    pub published_at: Option<DateTime<Utc>>,
    pub description: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsFeed {
    pub query: String,
    pub articles: Vec<NewsArticle>,
}
