pub mod types;

pub use types::{RawTrack, TracksResponse};

use std::time::Duration;

use tracing::info;

use tunescout_common::{SearchError, SearchPage};

const BASE_URL: &str = "https://api.soundcloud.com";

/// Legacy client for the SoundCloud `/tracks` search. Initial requests
/// paginate by offset; continuation follows the upstream-issued `next_href`
/// URL verbatim.
pub struct SoundCloudClient {
    client: reqwest::Client,
    base_url: String,
    client_id: String,
}

impl SoundCloudClient {
    pub fn new(client_id: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: BASE_URL.to_string(),
            client_id: client_id.into(),
        }
    }

    /// Point the client at a different API root. Used by tests.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub async fn search(
        &self,
        query: &str,
        page: u32,
        page_size: u32,
    ) -> Result<SearchPage, SearchError> {
        if page < 1 {
            return Err(SearchError::InvalidArgument(
                "Page must be a positive integer".to_string(),
            ));
        }
        if !(1..=50).contains(&page_size) {
            return Err(SearchError::InvalidArgument(
                "Limit must be between 1 and 50".to_string(),
            ));
        }
        let offset = (page - 1) * page_size;

        let url = format!("{}/tracks", self.base_url);
        let limit = page_size.to_string();
        let offset = offset.to_string();
        let params: Vec<(&str, &str)> = vec![
            ("client_id", self.client_id.as_str()),
            ("q", query),
            ("limit", &limit),
            ("offset", &offset),
            ("linked_partitioning", "1"),
        ];

        info!(query, page, page_size, "SoundCloud search request");

        let resp = self.client.get(&url).query(&params).send().await?;
        self.into_page(resp).await
    }

    /// Follow an upstream-issued `next_href`. The URL already embeds the
    /// client id and cursor.
    pub async fn continue_search(&self, next_href: &str) -> Result<SearchPage, SearchError> {
        if next_href.trim().is_empty() {
            return Err(SearchError::InvalidArgument(
                "next_href is required".to_string(),
            ));
        }

        info!(next_href, "SoundCloud next page request");

        let resp = self.client.get(next_href).send().await?;
        self.into_page(resp).await
    }

    async fn into_page(&self, resp: reqwest::Response) -> Result<SearchPage, SearchError> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(map_upstream_error(status.as_u16(), &body));
        }
        let body: TracksResponse = resp.json().await?;
        let page = body.into_page();
        info!(count = page.items.len(), has_more = page.has_more(), "SoundCloud search completed");
        Ok(page)
    }
}

fn map_upstream_error(status: u16, body: &str) -> SearchError {
    match status {
        401 => SearchError::AuthOrQuota("Invalid SoundCloud Client ID".to_string()),
        404 => SearchError::NotFound("No tracks found".to_string()),
        429 => SearchError::RateLimited("Rate limit exceeded. Please try again later.".to_string()),
        _ => {
            let message = serde_json::from_str::<serde_json::Value>(body)
                .ok()
                .and_then(|v| v.get("message").and_then(|m| m.as_str().map(String::from)))
                .unwrap_or_else(|| "SoundCloud API error".to_string());
            SearchError::Unknown(format!("SoundCloud API error: {message}"))
        }
    }
}
