use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::errors::AppError;
use crate::models::{FetchOutcome, NewsArticle, NewsFeed};

const NEWSAPI_URL: &str = "https://newsapi.org/v2/everything";
const UNKNOWN_SOURCE: &str = "Unknown source";
// NewsAPI keeps deleted articles in results with this placeholder title
const REMOVED_MARKER: &str = "[Removed]";

/// Configuration for news service
#[derive(Debug, Clone)]
pub struct NewsConfig {
    pub api_key: Option<String>,
    pub query: String,
    pub page_size: usize,
    pub top_n: usize,
}

impl NewsConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("NEWS_API_KEY").ok().filter(|k| !k.trim().is_empty()),
            query: std::env::var("NEWS_QUERY").unwrap_or_else(|_| "Indian stock market".to_string()),
            page_size: std::env::var("NEWS_PAGE_SIZE")
                .ok()
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(10),
            top_n: std::env::var("NEWS_TOP_N")
                .ok()
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(10),
        }
    }
}

/// Trait for news providers
#[async_trait]
pub trait NewsProvider: Send + Sync {
    async fn fetch_news(&self, query: &str, page_size: usize) -> Result<Vec<NewsArticle>, AppError>;
}

/// newsapi.org `everything` search
pub struct NewsApiProvider {
    api_key: String,
    client: Client,
}

impl NewsApiProvider {
    pub fn new(api_key: String, timeout: Duration) -> Self {
        Self {
            api_key,
            client: Client::builder()
                .user_agent("StockTracker/0.1")
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    status: String,
    #[serde(default)]
    articles: Vec<NewsApiArticle>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsApiArticle {
    source: Option<NewsApiSource>,
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NewsApiSource {
    name: Option<String>,
}

/// Articles without a usable title or link are dropped; the other fields fall
/// back to placeholders.
fn into_article(item: NewsApiArticle) -> Option<NewsArticle> {
    let title = item.title.filter(|t| !t.trim().is_empty() && t != REMOVED_MARKER)?;
    let url = item.url.filter(|u| !u.trim().is_empty())?;

    let published_at = item.published_at.as_deref().and_then(|raw| {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| warn!("Could not parse publishedAt '{}': {}", raw, e))
            .ok()
    });

    Some(NewsArticle {
        title,
        source: item
            .source
            .and_then(|s| s.name)
            .unwrap_or_else(|| UNKNOWN_SOURCE.to_string()),
        published_at,
        description: item.description.unwrap_or_default(),
        url,
    })
}

fn parse_response(body: NewsApiResponse) -> Result<Vec<NewsArticle>, AppError> {
    if body.status != "ok" {
        let message = body.message.unwrap_or_else(|| format!("status {}", body.status));
        return Err(AppError::External(format!("News API error: {}", message)));
    }

    Ok(body.articles.into_iter().filter_map(into_article).collect())
}

#[async_trait]
impl NewsProvider for NewsApiProvider {
    async fn fetch_news(&self, query: &str, page_size: usize) -> Result<Vec<NewsArticle>, AppError> {
        info!("Fetching news from NewsAPI for query: {}", query);

        let page_size = page_size.clamp(1, 100).to_string();
        let response = self
            .client
            .get(NEWSAPI_URL)
            .header("X-Api-Key", &self.api_key)
            .query(&[("q", query), ("pageSize", page_size.as_str())])
            .send()
            .await
            .map_err(|e| {
                error!("NewsAPI request failed: {}", e);
                AppError::External(format!("News API error: {}", e))
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AppError::RateLimited);
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("NewsAPI error {}: {}", status, error_text);
            return Err(AppError::External(format!(
                "News API returned error {}: {}",
                status, error_text
            )));
        }

        let body: NewsApiResponse = response.json().await.map_err(|e| {
            error!("Failed to parse NewsAPI response: {}", e);
            AppError::External(format!("Failed to parse news response: {}", e))
        })?;

        let articles = parse_response(body)?;
        info!("Fetched {} news articles from NewsAPI", articles.len());
        Ok(articles)
    }
}

/// News page backend: one fixed query, top N articles.
pub struct NewsService {
    config: NewsConfig,
    provider: Option<Arc<dyn NewsProvider>>,
}

impl NewsService {
    pub fn new(config: NewsConfig, timeout: Duration) -> Self {
        match config.api_key.clone() {
            Some(api_key) => {
                info!("Initializing NewsAPI provider");
                Self::with_provider(config, Arc::new(NewsApiProvider::new(api_key, timeout)))
            }
            None => {
                warn!("NEWS_API_KEY not set, news page will report an error");
                Self { config, provider: None }
            }
        }
    }

    pub fn with_provider(config: NewsConfig, provider: Arc<dyn NewsProvider>) -> Self {
        Self {
            config,
            provider: Some(provider),
        }
    }

    pub async fn latest(&self) -> FetchOutcome<NewsFeed> {
        let Some(provider) = &self.provider else {
            return FetchOutcome::failed("News API key is not configured");
        };

        match provider.fetch_news(&self.config.query, self.config.page_size).await {
            Ok(articles) if articles.is_empty() => {
                warn!("No news articles for query '{}'", self.config.query);
                FetchOutcome::no_data("No news articles found.")
            }
            Ok(mut articles) => {
                articles.truncate(self.config.top_n);
                FetchOutcome::data(NewsFeed {
                    query: self.config.query.clone(),
                    articles,
                })
            }
            Err(e) => {
                error!("Failed to fetch news for '{}': {}", self.config.query, e);
                FetchOutcome::failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    pub(crate) struct StaticNews(pub Result<Vec<NewsArticle>, String>);

    #[async_trait]
    impl NewsProvider for StaticNews {
        async fn fetch_news(&self, _query: &str, _page_size: usize) -> Result<Vec<NewsArticle>, AppError> {
            self.0.clone().map_err(AppError::External)
        }
    }

    pub(crate) fn article(title: &str) -> NewsArticle {
        NewsArticle {
            title: title.to_string(),
            source: "Mint".to_string(),
            published_at: None,
            description: String::new(),
            url: format!("https://example.com/{}", title),
        }
    }

    pub(crate) fn config(top_n: usize) -> NewsConfig {
        NewsConfig {
            api_key: None,
            query: "Indian stock market".to_string(),
            page_size: 10,
            top_n,
        }
    }

    #[test]
    fn parses_articles_and_fills_defaults() {
        let body: NewsApiResponse = serde_json::from_value(json!({
            "status": "ok",
            "totalResults": 3,
            "articles": [
                {
                    "source": { "id": null, "name": "Economic Times" },
                    "title": "Sensex climbs 500 points",
                    "description": "Banks lead the rally.",
                    "url": "https://example.com/sensex",
                    "publishedAt": "2024-05-02T09:15:00Z"
                },
                {
                    "source": { "id": null },
                    "title": "Nifty IT slips",
                    "description": null,
                    "url": "https://example.com/nifty-it",
                    "publishedAt": "yesterday"
                },
                {
                    "source": { "id": null, "name": "[Removed]" },
                    "title": "[Removed]",
                    "url": "https://removed.com"
                },
                {
                    "source": { "name": "Mint" },
                    "title": "No link here"
                }
            ]
        }))
        .unwrap();

        let articles = parse_response(body).unwrap();
        assert_eq!(articles.len(), 2);

        assert_eq!(articles[0].source, "Economic Times");
        assert_eq!(
            articles[0].published_at.unwrap().to_rfc3339(),
            "2024-05-02T09:15:00+00:00"
        );

        assert_eq!(articles[1].source, UNKNOWN_SOURCE);
        assert_eq!(articles[1].description, "");
        assert!(articles[1].published_at.is_none());
    }

    #[test]
    fn error_status_is_an_error() {
        let body: NewsApiResponse = serde_json::from_value(json!({
            "status": "error",
            "code": "apiKeyInvalid",
            "message": "Your API key is invalid."
        }))
        .unwrap();

        let err = parse_response(body).unwrap_err();
        assert!(err.to_string().contains("Your API key is invalid."));
    }

    #[tokio::test]
    async fn latest_truncates_to_top_n() {
        let articles = (0..15).map(|i| article(&format!("a{}", i))).collect();
        let service = NewsService::with_provider(config(10), Arc::new(StaticNews(Ok(articles))));

        let FetchOutcome::Data { data } = service.latest().await else {
            panic!("expected data");
        };
        assert_eq!(data.articles.len(), 10);
        assert_eq!(data.articles[0].title, "a0");
    }

    #[tokio::test]
    async fn latest_distinguishes_empty_from_failure() {
        let empty = NewsService::with_provider(config(10), Arc::new(StaticNews(Ok(Vec::new()))));
        assert!(matches!(empty.latest().await, FetchOutcome::NoData { .. }));

        let failing = NewsService::with_provider(
            config(10),
            Arc::new(StaticNews(Err("connection reset".into()))),
        );
        assert!(matches!(failing.latest().await, FetchOutcome::Failed { .. }));
    }

    #[tokio::test]
    async fn missing_key_is_a_failure() {
        let service = NewsService::new(config(10), Duration::from_secs(1));
        assert_eq!(
            service.latest().await,
            FetchOutcome::failed("News API key is not configured")
        );
    }

    #[test]
    fn configured_key_installs_provider() {
        let keyed = NewsConfig { api_key: Some("secret".into()), ..config(10) };
        assert!(NewsService::new(keyed, Duration::from_secs(1)).provider.is_some());
        assert!(NewsService::new(config(10), Duration::from_secs(1)).provider.is_none());
    }
}
