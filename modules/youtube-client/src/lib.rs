pub mod types;

pub use types::{SearchItem, SearchListResponse, TOTAL_RESULTS_CAP};

use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use tunescout_common::{SearchError, SearchPage};
use tunescout_session::SearchBackend;
use types::ErrorEnvelope;

const BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// videoCategoryId for Music.
const MUSIC_CATEGORY_ID: &str = "10";

pub const MIN_PAGE_SIZE: u32 = 1;
/// The search API rejects maxResults above 50.
pub const MAX_PAGE_SIZE: u32 = 50;

pub struct YouTubeClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl YouTubeClient {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: BASE_URL.to_string(),
            api_key: api_key.into(),
        }
    }

    /// Point the client at a different API root. Used by tests.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Run a fresh search. An upstream 404 comes back as an empty page, not
    /// an error: "nothing found" is a valid search outcome.
    pub async fn search(&self, query: &str, page_size: u32) -> Result<SearchPage, SearchError> {
        validate_page_size(page_size)?;
        match self.request(query, None, page_size).await {
            Err(SearchError::NotFound(_)) => Ok(SearchPage::default()),
            other => other,
        }
    }

    /// Fetch the next page for a previously issued search. The token is the
    /// sole pagination input; the query is passed through because YouTube
    /// page tokens do not encode it.
    pub async fn continue_search(
        &self,
        token: &str,
        query: &str,
        page_size: u32,
    ) -> Result<SearchPage, SearchError> {
        if token.trim().is_empty() {
            return Err(SearchError::InvalidArgument(
                "Page token is required".to_string(),
            ));
        }
        validate_page_size(page_size)?;
        self.request(query, Some(token), page_size).await
    }

    async fn request(
        &self,
        query: &str,
        token: Option<&str>,
        page_size: u32,
    ) -> Result<SearchPage, SearchError> {
        let url = format!("{}/search", self.base_url);
        let max_results = page_size.to_string();
        let mut params: Vec<(&str, &str)> = vec![
            ("key", self.api_key.as_str()),
            ("part", "snippet"),
            ("q", query),
            ("type", "video"),
            ("videoCategoryId", MUSIC_CATEGORY_ID),
            ("maxResults", &max_results),
            ("order", "relevance"),
        ];
        if let Some(token) = token {
            params.push(("pageToken", token));
        }

        info!(query, page_size, continuation = token.is_some(), "YouTube search request");

        let resp = self.client.get(&url).query(&params).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(map_upstream_error(status.as_u16(), &body));
        }

        let body: SearchListResponse = resp.json().await?;
        let page = body.into_page();
        info!(count = page.items.len(), has_more = page.has_more(), "YouTube search completed");
        Ok(page)
    }
}

#[async_trait]
impl SearchBackend for YouTubeClient {
    async fn search(&self, query: &str, page_size: u32) -> Result<SearchPage, SearchError> {
        YouTubeClient::search(self, query, page_size).await
    }

    async fn continue_search(
        &self,
        token: &str,
        query: &str,
        page_size: u32,
    ) -> Result<SearchPage, SearchError> {
        YouTubeClient::continue_search(self, token, query, page_size).await
    }
}

fn validate_page_size(page_size: u32) -> Result<(), SearchError> {
    if !(MIN_PAGE_SIZE..=MAX_PAGE_SIZE).contains(&page_size) {
        return Err(SearchError::InvalidArgument(
            "Limit must be between 1 and 50".to_string(),
        ));
    }
    Ok(())
}

/// Map an upstream failure status to the shared taxonomy. Quota exhaustion
/// arrives as a 403 whose message mentions "quota", distinct from plain
/// credential failures.
fn map_upstream_error(status: u16, body: &str) -> SearchError {
    let message = extract_error_message(body);
    match status {
        400 => SearchError::BadRequest(
            message.unwrap_or_else(|| "Invalid request parameters".to_string()),
        ),
        403 if message
            .as_deref()
            .is_some_and(|m| m.to_lowercase().contains("quota")) =>
        {
            SearchError::RateLimited(
                "YouTube API quota exceeded. Please try again later.".to_string(),
            )
        }
        401 | 403 => SearchError::AuthOrQuota(
            "YouTube API access forbidden. Please check your API key.".to_string(),
        ),
        404 => SearchError::NotFound("No videos found".to_string()),
        429 => SearchError::RateLimited("Rate limit exceeded. Please try again later.".to_string()),
        _ => SearchError::Unknown(
            message.unwrap_or_else(|| format!("YouTube API error (status {status})")),
        ),
    }
}

fn extract_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|e| e.error)
        .and_then(|r| r.message)
}
