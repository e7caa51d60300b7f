use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// --- Normalized search results ---

/// A normalized track from any upstream search API.
/// Upstream-specific clients convert their native item types into this;
/// nothing upstream-specific leaks past that boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub artwork_url: Option<String>,
    pub permalink_url: String,
    pub user: TrackUser,
    pub created_at: Option<DateTime<Utc>>,
    /// Milliseconds. Not every upstream provides it.
    #[serde(rename = "duration")]
    pub duration_ms: Option<u64>,
    pub playback_count: Option<u64>,
    pub likes_count: Option<u64>,
    #[serde(default)]
    pub tag_list: Vec<String>,
}

/// Author of a track (channel or uploader).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackUser {
    pub id: Option<String>,
    pub username: String,
    pub avatar_url: Option<String>,
}

/// One page of results as returned by an upstream client.
/// The continuation token is opaque and upstream-owned: a YouTube page token
/// or a SoundCloud `next_href` URL. `None` means no further pages.
#[derive(Debug, Clone, Default)]
pub struct SearchPage {
    pub items: Vec<Track>,
    pub continuation_token: Option<String>,
    pub prev_token: Option<String>,
    pub total_estimate: Option<u64>,
}

impl SearchPage {
    pub fn has_more(&self) -> bool {
        self.continuation_token.is_some()
    }
}

// --- Proxy wire shape ---
//
// The JSON the proxy serves (and the CLI consumes). Field names, including
// the duplicated top-level `tracks`/`hasNext`/`nextHref`, are a preserved
// contract for existing front-ends.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub success: bool,
    pub data: SearchData,
    pub tracks: Vec<Track>,
    #[serde(rename = "hasNext")]
    pub has_next: bool,
    #[serde(rename = "nextHref")]
    pub next_href: Option<String>,
    #[serde(rename = "totalResults")]
    pub total_results: u64,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchData {
    pub tracks: Vec<Track>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub current_page: u32,
    pub limit: u32,
    pub total_items: u64,
    pub has_next: bool,
    pub has_previous: bool,
    pub next_page_token: Option<String>,
    pub prev_page_token: Option<String>,
}

/// Body of every error response: `{"error": {"message", "status"}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub message: String,
    pub status: u16,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>, status: u16) -> Self {
        Self {
            error: ErrorDetail {
                message: message.into(),
                status,
            },
        }
    }
}
