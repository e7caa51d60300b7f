use std::env;
use std::time::Duration;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Upstream credentials
    pub youtube_api_key: String,
    pub soundcloud_client_id: Option<String>,

    // API server
    pub api_host: String,
    pub api_port: u16,

    // Upstream request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        Self {
            youtube_api_key: required_env("YOUTUBE_API_KEY"),
            soundcloud_client_id: env::var("SOUNDCLOUD_CLIENT_ID")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            api_host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            api_port: env::var("API_PORT")
                .unwrap_or_else(|_| "3001".to_string())
                .parse()
                .expect("API_PORT must be a number"),
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .expect("REQUEST_TIMEOUT_SECS must be a number"),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}
