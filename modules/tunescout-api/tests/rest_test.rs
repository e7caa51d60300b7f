//! Router tests: parameter validation, the error body contract, and the
//! proxy path against a mocked upstream.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tunescout_api::{router, AppState};
use youtube_client::YouTubeClient;

fn app(youtube: YouTubeClient) -> axum::Router {
    router(Arc::new(AppState {
        youtube,
        soundcloud: None,
    }))
}

fn offline_app() -> axum::Router {
    // Validation-only tests never reach the upstream.
    app(YouTubeClient::new("unused-key", Duration::from_secs(1)))
}

async fn get_json(
    app: axum::Router,
    uri: &str,
) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

// --- health ---

#[tokio::test]
async fn health_reports_service_and_timestamp() {
    let (status, body) = get_json(offline_app(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
    assert_eq!(body["service"], "tunescout-api");
    assert!(body["timestamp"].as_str().is_some());
}

// --- validation ---

#[tokio::test]
async fn missing_query_is_a_400_with_error_body() {
    let (status, body) = get_json(offline_app(), "/api/youtube/search").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Search query is required");
    assert_eq!(body["error"]["status"], 400);
}

#[tokio::test]
async fn blank_query_is_a_400() {
    let (status, _) = get_json(offline_app(), "/api/youtube/search?q=%20%20").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn out_of_range_limit_is_a_400() {
    let (status, body) = get_json(offline_app(), "/api/youtube/search?q=jazz&limit=51").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Limit must be between 1 and 50");
}

#[tokio::test]
async fn non_numeric_page_is_a_400() {
    let (status, body) = get_json(offline_app(), "/api/youtube/search?q=jazz&page=abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Page must be a positive integer");
}

#[tokio::test]
async fn next_requires_a_page_token() {
    let (status, body) = get_json(offline_app(), "/api/youtube/next").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "pageToken parameter is required");
}

#[tokio::test]
async fn unknown_routes_use_the_error_body() {
    let (status, body) = get_json(offline_app(), "/api/unknown").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Route not found");
}

#[tokio::test]
async fn soundcloud_without_client_id_is_a_500() {
    let (status, body) = get_json(offline_app(), "/api/soundcloud/search?q=jazz").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["message"], "SoundCloud Client ID not configured");
}

// --- proxying ---

fn upstream_page() -> serde_json::Value {
    serde_json::json!({
        "nextPageToken": "T1",
        "pageInfo": { "totalResults": 250 },
        "items": [
            {
                "id": { "videoId": "abc" },
                "snippet": {
                    "title": "First",
                    "channelId": "UC1",
                    "channelTitle": "Channel One",
                    "publishedAt": "2024-03-01T12:00:00Z"
                }
            },
            {
                "id": { "videoId": "def" },
                "snippet": {
                    "title": "Second",
                    "channelId": "UC2",
                    "channelTitle": "Channel Two",
                    "publishedAt": "2024-04-01T12:00:00Z"
                }
            }
        ]
    })
}

#[tokio::test]
async fn search_returns_the_full_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "jazz"))
        .respond_with(ResponseTemplate::new(200).set_body_json(upstream_page()))
        .mount(&server)
        .await;

    let youtube =
        YouTubeClient::new("test-key", Duration::from_secs(5)).with_base_url(&server.uri());
    let (status, body) = get_json(app(youtube), "/api/youtube/search?q=jazz&limit=6").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Found 2 videos for \"jazz\"");
    assert_eq!(body["hasNext"], true);
    assert_eq!(body["nextHref"], "T1");
    assert_eq!(body["totalResults"], 250);

    // Normalized tracks, duplicated at the top level and under data.
    assert_eq!(body["tracks"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"]["tracks"][0]["id"], "abc");
    assert_eq!(
        body["data"]["tracks"][0]["permalink_url"],
        "https://www.youtube.com/watch?v=abc"
    );
    assert_eq!(body["data"]["tracks"][0]["user"]["username"], "Channel One");

    let pagination = &body["data"]["pagination"];
    assert_eq!(pagination["current_page"], 1);
    assert_eq!(pagination["limit"], 6);
    assert_eq!(pagination["total_items"], 250);
    assert_eq!(pagination["has_next"], true);
    assert_eq!(pagination["has_previous"], false);
    assert_eq!(pagination["next_page_token"], "T1");
}

#[tokio::test]
async fn next_continues_with_the_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("pageToken", "T1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "pageInfo": { "totalResults": 250 },
            "items": [{
                "id": { "videoId": "ghi" },
                "snippet": { "title": "Third", "channelTitle": "Channel Three" }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let youtube =
        YouTubeClient::new("test-key", Duration::from_secs(5)).with_base_url(&server.uri());
    let (status, body) =
        get_json(app(youtube), "/api/youtube/next?pageToken=T1&q=jazz&limit=6").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["hasNext"], false);
    assert!(body["nextHref"].is_null());
    assert_eq!(body["tracks"][0]["id"], "ghi");
}

#[tokio::test]
async fn quota_exhaustion_surfaces_as_429() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
            "error": { "message": "Daily quota exceeded." }
        })))
        .mount(&server)
        .await;

    let youtube =
        YouTubeClient::new("test-key", Duration::from_secs(5)).with_base_url(&server.uri());
    let (status, body) = get_json(app(youtube), "/api/youtube/search?q=jazz").await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(
        body["error"]["message"],
        "YouTube API quota exceeded. Please try again later."
    );
    assert_eq!(body["error"]["status"], 429);
}

#[tokio::test]
async fn upstream_404_is_an_empty_successful_search() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let youtube =
        YouTubeClient::new("test-key", Duration::from_secs(5)).with_base_url(&server.uri());
    let (status, body) = get_json(app(youtube), "/api/youtube/search?q=nothing").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "No videos found for \"nothing\"");
    assert_eq!(body["tracks"].as_array().unwrap().len(), 0);
    assert_eq!(body["hasNext"], false);
}
