use std::time::Duration;

/// Default number of refresh cycles one originating call may trigger.
pub const DEFAULT_MAX_REFRESH_ATTEMPTS: u32 = 4;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_REFRESH_TIMEOUT: Duration = Duration::from_secs(10);

/// Client configuration, constructed explicitly by the embedding program.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root including the `/api` prefix, e.g. `http://localhost:5001/api`.
    pub base_url: String,
    /// Name of the session cookie set by the server (default: `refreshToken`).
    pub cookie_name: String,
    /// Refresh cycles allowed per originating call (default: 4).
    pub max_refresh_attempts: u32,
    /// Timeout applied to every HTTP request (default: 30s).
    pub request_timeout: Duration,
    /// Timeout for one refresh exchange (default: 10s).
    pub refresh_timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            cookie_name: "refreshToken".to_string(),
            max_refresh_attempts: DEFAULT_MAX_REFRESH_ATTEMPTS,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            refresh_timeout: DEFAULT_REFRESH_TIMEOUT,
        }
    }
}
