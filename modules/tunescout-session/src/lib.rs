//! Result aggregation for one search-and-paginate session.
//!
//! `SearchSession` is a pure state machine: `begin_*` hands out a
//! `PageRequest` (or refuses), `complete` folds the response back in. The
//! generation counter correlates responses to the request that triggered
//! them, so a response arriving after a newer search has started is dropped
//! instead of clobbering the newer results. `SessionDriver` wires the
//! machine to a `SearchBackend` for callers that just want async calls.

use async_trait::async_trait;
use tracing::debug;

use tunescout_common::{SearchError, SearchPage, Track};

/// Results per page when the caller does not choose one. Matches the
/// front-end's card grid.
pub const DEFAULT_PAGE_SIZE: u32 = 6;

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No query yet.
    Idle,
    /// Initial search in flight.
    Loading,
    /// Items present, continuation state known.
    Loaded,
    /// Continuation request in flight.
    LoadingMore,
    /// Last request failed. A failed load-more keeps the accumulated items
    /// and token, so the same action can be retried.
    Errored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RequestKind {
    Search,
    More,
}

/// A request the session wants issued. Carries everything the backend
/// needs plus the generation used to recognize stale responses.
#[derive(Debug, Clone)]
pub struct PageRequest {
    pub query: String,
    pub token: Option<String>,
    pub page_size: u32,
    kind: RequestKind,
    generation: u64,
}

#[derive(Debug)]
pub struct SearchSession {
    phase: SessionPhase,
    items: Vec<Track>,
    query: Option<String>,
    token: Option<String>,
    has_more: bool,
    total_estimate: Option<u64>,
    last_error: Option<SearchError>,
    generation: u64,
    page_size: u32,
}

impl Default for SearchSession {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchSession {
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(page_size: u32) -> Self {
        Self {
            phase: SessionPhase::Idle,
            items: Vec::new(),
            query: None,
            token: None,
            has_more: false,
            total_estimate: None,
            last_error: None,
            generation: 0,
            page_size,
        }
    }

    /// Start a new search. Blank queries are refused. A new search is
    /// always permitted, superseding any request still in flight: the
    /// generation bump makes the in-flight response stale.
    pub fn begin_search(&mut self, query: &str) -> Option<PageRequest> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return None;
        }
        self.generation += 1;
        self.phase = SessionPhase::Loading;
        self.query = Some(trimmed.to_string());
        self.last_error = None;
        Some(PageRequest {
            query: trimmed.to_string(),
            token: None,
            page_size: self.page_size,
            kind: RequestKind::Search,
            generation: self.generation,
        })
    }

    /// Request the next page. Refused while a request is in flight, and
    /// when there is nothing more to fetch. Allowed again from `Errored`
    /// when the session still holds a token (failed load-more retry).
    pub fn begin_load_more(&mut self) -> Option<PageRequest> {
        if !matches!(self.phase, SessionPhase::Loaded | SessionPhase::Errored) {
            return None;
        }
        if !self.has_more {
            return None;
        }
        let token = self.token.clone()?;
        self.generation += 1;
        self.phase = SessionPhase::LoadingMore;
        self.last_error = None;
        Some(PageRequest {
            query: self.query.clone().unwrap_or_default(),
            token: Some(token),
            page_size: self.page_size,
            kind: RequestKind::More,
            generation: self.generation,
        })
    }

    /// Fold a response back into the session. Responses from a superseded
    /// request are dropped silently.
    pub fn complete(&mut self, request: &PageRequest, result: Result<SearchPage, SearchError>) {
        if request.generation != self.generation {
            debug!(query = %request.query, "Dropping stale page response");
            return;
        }
        match (request.kind, result) {
            (RequestKind::Search, Ok(page)) => {
                // A new search replaces, it does not merge.
                self.items = page.items;
                self.token = page.continuation_token;
                self.has_more = self.token.is_some();
                self.total_estimate = page.total_estimate;
                self.phase = SessionPhase::Loaded;
            }
            (RequestKind::Search, Err(e)) => {
                self.items.clear();
                self.token = None;
                self.has_more = false;
                self.total_estimate = None;
                self.last_error = Some(e);
                self.phase = SessionPhase::Errored;
            }
            (RequestKind::More, Ok(page)) => {
                // Append in upstream order; no re-sorting, no cross-page dedup.
                self.items.extend(page.items);
                self.token = page.continuation_token;
                self.has_more = self.token.is_some();
                if page.total_estimate.is_some() {
                    self.total_estimate = page.total_estimate;
                }
                self.phase = SessionPhase::Loaded;
            }
            (RequestKind::More, Err(e)) => {
                // Only the new page is lost; accumulated items and the token
                // stay so the same action can be retried.
                self.last_error = Some(e);
                self.phase = SessionPhase::Errored;
            }
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Accumulated results, in arrival order.
    pub fn items(&self) -> &[Track] {
        &self.items
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn total_estimate(&self) -> Option<u64> {
        self.total_estimate
    }

    pub fn last_error(&self) -> Option<&SearchError> {
        self.last_error.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        matches!(
            self.phase,
            SessionPhase::Loading | SessionPhase::LoadingMore
        )
    }
}

/// The seam between the session and whatever issues search requests: the
/// upstream client directly, or a client of the proxy API.
#[async_trait]
pub trait SearchBackend {
    async fn search(&self, query: &str, page_size: u32) -> Result<SearchPage, SearchError>;

    /// The token is the sole pagination input; the query rides along for
    /// upstreams whose tokens do not encode it.
    async fn continue_search(
        &self,
        token: &str,
        query: &str,
        page_size: u32,
    ) -> Result<SearchPage, SearchError>;
}

/// Owns a session and a backend and runs the begin/await/complete cycle.
pub struct SessionDriver<B: SearchBackend> {
    session: SearchSession,
    backend: B,
}

impl<B: SearchBackend> SessionDriver<B> {
    pub fn new(backend: B) -> Self {
        Self::with_page_size(backend, DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(backend: B, page_size: u32) -> Self {
        Self {
            session: SearchSession::with_page_size(page_size),
            backend,
        }
    }

    pub fn session(&self) -> &SearchSession {
        &self.session
    }

    pub async fn search(&mut self, query: &str) -> &SearchSession {
        if let Some(req) = self.session.begin_search(query) {
            let result = self.backend.search(&req.query, req.page_size).await;
            self.session.complete(&req, result);
        }
        &self.session
    }

    pub async fn load_more(&mut self) -> &SearchSession {
        if let Some(req) = self.session.begin_load_more() {
            if let Some(token) = req.token.clone() {
                let result = self
                    .backend
                    .continue_search(&token, &req.query, req.page_size)
                    .await;
                self.session.complete(&req, result);
            }
        }
        &self.session
    }
}
