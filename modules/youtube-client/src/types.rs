use chrono::{DateTime, Utc};
use serde::Deserialize;

use tunescout_common::{SearchPage, Track, TrackUser};

/// The search API reports totals far beyond what it will actually
/// paginate through; results stop around this many.
pub const TOTAL_RESULTS_CAP: u64 = 1000;

const WATCH_URL: &str = "https://www.youtube.com/watch?v=";

/// Response shape of the YouTube Data API v3 `search.list` call.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchListResponse {
    #[serde(rename = "nextPageToken")]
    pub next_page_token: Option<String>,
    #[serde(rename = "prevPageToken")]
    pub prev_page_token: Option<String>,
    #[serde(rename = "pageInfo")]
    pub page_info: Option<PageInfo>,
    #[serde(default)]
    pub items: Vec<SearchItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageInfo {
    #[serde(rename = "totalResults")]
    pub total_results: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchItem {
    pub id: VideoId,
    pub snippet: Snippet,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoId {
    #[serde(rename = "videoId")]
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Snippet {
    pub title: String,
    pub description: Option<String>,
    #[serde(rename = "publishedAt")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(rename = "channelId")]
    pub channel_id: Option<String>,
    #[serde(rename = "channelTitle")]
    pub channel_title: Option<String>,
    pub thumbnails: Option<Thumbnails>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Thumbnails {
    pub default: Option<Thumbnail>,
    pub high: Option<Thumbnail>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Thumbnail {
    pub url: String,
}

/// Error body shape of the YouTube Data API.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: Option<ErrorReason>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorReason {
    pub message: Option<String>,
}

impl SearchItem {
    /// Convert to the normalized track shape. Items without a video id
    /// (channel or playlist hits) are skipped. Duration and engagement
    /// counts are not part of search responses and stay absent; fetching
    /// them would take a second videos.list call per item.
    pub fn into_track(self) -> Option<Track> {
        let video_id = self.id.video_id?;
        let Snippet {
            title,
            description,
            published_at,
            channel_id,
            channel_title,
            thumbnails,
            tags,
        } = self.snippet;
        let artwork_url = thumbnails
            .and_then(|t| t.high.or(t.default))
            .map(|t| t.url);
        Some(Track {
            permalink_url: format!("{WATCH_URL}{video_id}"),
            id: video_id,
            title,
            description,
            artwork_url,
            user: TrackUser {
                id: channel_id,
                // Search responses never carry a channel avatar.
                username: channel_title.unwrap_or_default(),
                avatar_url: None,
            },
            created_at: published_at,
            duration_ms: None,
            playback_count: None,
            likes_count: None,
            tag_list: tags.unwrap_or_default(),
        })
    }
}

impl SearchListResponse {
    pub fn into_page(self) -> SearchPage {
        let total_estimate = self
            .page_info
            .and_then(|p| p.total_results)
            .map(|t| t.min(TOTAL_RESULTS_CAP));
        SearchPage {
            items: self
                .items
                .into_iter()
                .filter_map(SearchItem::into_track)
                .collect(),
            continuation_token: self.next_page_token,
            prev_token: self.prev_page_token,
            total_estimate,
        }
    }
}
