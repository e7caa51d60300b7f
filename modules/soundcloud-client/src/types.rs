use chrono::{DateTime, Utc};
use serde::Deserialize;

use tunescout_common::{SearchPage, Track, TrackUser};

/// Response shape of `/tracks` with `linked_partitioning=1`.
#[derive(Debug, Clone, Deserialize)]
pub struct TracksResponse {
    #[serde(default)]
    pub collection: Vec<RawTrack>,
    pub next_href: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTrack {
    pub id: u64,
    pub title: String,
    pub description: Option<String>,
    /// Milliseconds.
    pub duration: Option<u64>,
    pub artwork_url: Option<String>,
    pub permalink_url: Option<String>,
    pub user: Option<RawUser>,
    pub created_at: Option<String>,
    pub genre: Option<String>,
    pub tag_list: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawUser {
    pub id: Option<u64>,
    pub username: Option<String>,
    pub avatar_url: Option<String>,
}

impl RawTrack {
    /// Convert to the normalized track shape. Genre and stream URLs are
    /// SoundCloud-specific and stay behind this boundary.
    pub fn into_track(self) -> Track {
        let user = self
            .user
            .map(|u| TrackUser {
                id: u.id.map(|id| id.to_string()),
                username: u.username.unwrap_or_default(),
                avatar_url: u.avatar_url,
            })
            .unwrap_or(TrackUser {
                id: None,
                username: String::new(),
                avatar_url: None,
            });
        Track {
            id: self.id.to_string(),
            title: self.title,
            description: self.description,
            artwork_url: self.artwork_url,
            permalink_url: self.permalink_url.unwrap_or_default(),
            user,
            created_at: parse_created_at(self.created_at.as_deref()),
            duration_ms: self.duration,
            playback_count: None,
            likes_count: None,
            tag_list: self
                .tag_list
                .as_deref()
                .map(split_tag_list)
                .unwrap_or_default(),
        }
    }
}

impl TracksResponse {
    pub fn into_page(self) -> SearchPage {
        SearchPage {
            items: self
                .collection
                .into_iter()
                .map(RawTrack::into_track)
                .collect(),
            continuation_token: self.next_href,
            prev_token: None,
            // The tracks endpoint reports no total count.
            total_estimate: None,
        }
    }
}

/// SoundCloud timestamps come as `2023/01/15 12:00:00 +0000`; some newer
/// endpoints already return RFC 3339. Anything else becomes `None`.
pub fn parse_created_at(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?;
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y/%m/%d %H:%M:%S %z") {
        return Some(dt.with_timezone(&Utc));
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Split a SoundCloud tag list. Tags containing spaces are wrapped in
/// double quotes: `house "deep house" electronic`.
pub fn split_tag_list(raw: &str) -> Vec<String> {
    let mut tags = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for c in raw.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                if !in_quotes && !current.is_empty() {
                    tags.push(std::mem::take(&mut current));
                }
            }
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    tags.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        tags.push(current);
    }
    tags
}
