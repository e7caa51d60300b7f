pub mod rest;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;

use soundcloud_client::SoundCloudClient;
use youtube_client::YouTubeClient;

pub struct AppState {
    pub youtube: YouTubeClient,
    /// Legacy upstream; routes answer 500 when no client id is configured.
    pub soundcloud: Option<SoundCloudClient>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(rest::health))
        .route("/api/youtube/search", get(rest::youtube_search))
        .route("/api/youtube/next", get(rest::youtube_next))
        .route("/api/soundcloud/search", get(rest::soundcloud_search))
        .route("/api/soundcloud/next", get(rest::soundcloud_next))
        .fallback(rest::not_found)
        .with_state(state)
}
