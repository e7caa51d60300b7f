use thiserror::Error;

/// Error taxonomy shared by the upstream clients and the proxy layer.
/// Every variant carries a message suitable for direct display.
#[derive(Debug, Clone, Error)]
pub enum SearchError {
    /// Bad caller input. Rejected before any request is issued.
    #[error("{0}")]
    InvalidArgument(String),

    /// Upstream rejected the request parameters.
    #[error("{0}")]
    BadRequest(String),

    /// Upstream found nothing at all for the request.
    #[error("{0}")]
    NotFound(String),

    /// Credential or quota problem. Operator-actionable, never retried
    /// automatically.
    #[error("{0}")]
    AuthOrQuota(String),

    /// Upstream rate limit or quota exhaustion.
    #[error("{0}")]
    RateLimited(String),

    /// Transient network failure or timeout. Safe to retry manually.
    #[error("{0}")]
    Unavailable(String),

    /// Catch-all. Full upstream detail goes to the log, the message here is
    /// generic enough to show.
    #[error("{0}")]
    Unknown(String),
}

impl SearchError {
    /// HTTP status the proxy reports for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            SearchError::InvalidArgument(_) | SearchError::BadRequest(_) => 400,
            SearchError::AuthOrQuota(_) => 401,
            SearchError::NotFound(_) => 404,
            SearchError::Unavailable(_) => 408,
            SearchError::RateLimited(_) => 429,
            SearchError::Unknown(_) => 500,
        }
    }
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SearchError::Unavailable("Request timeout. Please try again.".to_string())
        } else if err.is_connect() {
            SearchError::Unavailable("Network error. Please check your connection.".to_string())
        } else if err.is_decode() {
            SearchError::Unknown(format!("Invalid response from upstream: {err}"))
        } else {
            SearchError::Unknown(err.to_string())
        }
    }
}
