use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use tracing::{info, warn};

use tunescout_common::{ErrorBody, Pagination, SearchData, SearchError, SearchPage, SearchResponse};

use crate::AppState;

/// Results per page when the caller does not ask for one.
const DEFAULT_LIMIT: u32 = 6;

// --- Query structs ---
//
// `page` and `limit` arrive as raw strings and are parsed by hand so a
// malformed value produces the contract's 400 body instead of a framework
// rejection.

#[derive(Deserialize)]
pub struct SearchParams {
    q: Option<String>,
    page: Option<String>,
    limit: Option<String>,
    #[serde(rename = "pageToken")]
    page_token: Option<String>,
}

#[derive(Deserialize)]
pub struct NextParams {
    #[serde(rename = "pageToken")]
    page_token: Option<String>,
    q: Option<String>,
    limit: Option<String>,
}

#[derive(Deserialize)]
pub struct SoundCloudNextParams {
    #[serde(rename = "nextHref")]
    next_href: Option<String>,
}

// --- Helpers ---

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody::new(message, status.as_u16())),
    )
        .into_response()
}

fn search_error_response(err: SearchError) -> Response {
    warn!(error = %err, "Upstream search failed");
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    error_response(status, err.to_string())
}

fn parse_page(raw: Option<&str>) -> Result<u32, Response> {
    match raw {
        None => Ok(1),
        Some(s) => match s.parse::<u32>() {
            Ok(n) if n >= 1 => Ok(n),
            _ => Err(error_response(
                StatusCode::BAD_REQUEST,
                "Page must be a positive integer",
            )),
        },
    }
}

fn parse_limit(raw: Option<&str>) -> Result<u32, Response> {
    match raw {
        None => Ok(DEFAULT_LIMIT),
        Some(s) => match s.parse::<u32>() {
            Ok(n) if (1..=50).contains(&n) => Ok(n),
            _ => Err(error_response(
                StatusCode::BAD_REQUEST,
                "Limit must be between 1 and 50",
            )),
        },
    }
}

/// Assemble the success envelope. The duplicated top-level fields mirror
/// what existing front-ends read.
fn build_response(
    page: SearchPage,
    query: &str,
    current_page: u32,
    limit: u32,
    noun: &str,
) -> SearchResponse {
    let has_next = page.has_more();
    let message = if page.items.is_empty() {
        format!("No {noun} found for \"{query}\"")
    } else {
        format!("Found {} {noun} for \"{query}\"", page.items.len())
    };
    let pagination = Pagination {
        current_page,
        limit,
        total_items: page.total_estimate.unwrap_or(0),
        has_next,
        has_previous: page.prev_token.is_some() || current_page > 1,
        next_page_token: page.continuation_token.clone(),
        prev_page_token: page.prev_token,
    };
    SearchResponse {
        success: true,
        data: SearchData {
            tracks: page.items.clone(),
            pagination,
        },
        tracks: page.items,
        has_next,
        next_href: page.continuation_token,
        total_results: page.total_estimate.unwrap_or(0),
        message,
    }
}

// --- Handlers ---

pub async fn youtube_search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Response {
    let query = match params.q.as_deref().map(str::trim) {
        Some(q) if !q.is_empty() => q.to_string(),
        _ => return error_response(StatusCode::BAD_REQUEST, "Search query is required"),
    };
    let page = match parse_page(params.page.as_deref()) {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    let limit = match parse_limit(params.limit.as_deref()) {
        Ok(l) => l,
        Err(resp) => return resp,
    };

    info!(query = %query, page, limit, "YouTube search request");

    let token = params.page_token.as_deref().filter(|t| !t.is_empty());
    let result = match token {
        Some(token) => state.youtube.continue_search(token, &query, limit).await,
        None => state.youtube.search(&query, limit).await,
    };

    match result {
        Ok(found) => Json(build_response(found, &query, page, limit, "videos")).into_response(),
        Err(e) => search_error_response(e),
    }
}

pub async fn youtube_next(
    State(state): State<Arc<AppState>>,
    Query(params): Query<NextParams>,
) -> Response {
    let token = match params.page_token.as_deref().filter(|t| !t.is_empty()) {
        Some(t) => t.to_string(),
        None => return error_response(StatusCode::BAD_REQUEST, "pageToken parameter is required"),
    };
    let limit = match parse_limit(params.limit.as_deref()) {
        Ok(l) => l,
        Err(resp) => return resp,
    };
    let query = params.q.unwrap_or_default();

    info!(query = %query, limit, "YouTube next page request");

    match state.youtube.continue_search(&token, &query, limit).await {
        Ok(found) => Json(build_response(found, &query, 1, limit, "videos")).into_response(),
        Err(e) => search_error_response(e),
    }
}

pub async fn soundcloud_search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Response {
    let Some(soundcloud) = state.soundcloud.as_ref() else {
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "SoundCloud Client ID not configured",
        );
    };
    let query = match params.q.as_deref().map(str::trim) {
        Some(q) if !q.is_empty() => q.to_string(),
        _ => return error_response(StatusCode::BAD_REQUEST, "Search query is required"),
    };
    let page = match parse_page(params.page.as_deref()) {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    let limit = match parse_limit(params.limit.as_deref()) {
        Ok(l) => l,
        Err(resp) => return resp,
    };

    info!(query = %query, page, limit, "SoundCloud search request");

    match soundcloud.search(&query, page, limit).await {
        Ok(found) => Json(build_response(found, &query, page, limit, "tracks")).into_response(),
        Err(e) => search_error_response(e),
    }
}

pub async fn soundcloud_next(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SoundCloudNextParams>,
) -> Response {
    let Some(soundcloud) = state.soundcloud.as_ref() else {
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "SoundCloud Client ID not configured",
        );
    };
    let next_href = match params.next_href.as_deref().filter(|h| !h.is_empty()) {
        Some(h) => h.to_string(),
        None => return error_response(StatusCode::BAD_REQUEST, "nextHref parameter is required"),
    };

    info!(next_href = %next_href, "SoundCloud next page request");

    match soundcloud.continue_search(&next_href).await {
        Ok(found) => Json(build_response(found, "", 1, DEFAULT_LIMIT, "tracks")).into_response(),
        Err(e) => search_error_response(e),
    }
}

pub async fn health() -> Response {
    Json(serde_json::json!({
        "status": "OK",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "service": "tunescout-api",
    }))
    .into_response()
}

pub async fn not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "Route not found")
}
