use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed cache file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Cache lock poisoned")]
    LockPoisoned,
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("rate limit exceeded")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("{host} API returned status {status}")]
    UnexpectedStatus { host: String, status: u16 },

    #[error("{0} requires authentication")]
    Unauthorized(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("unsupported registry: {0}")]
    UnsupportedRegistry(String),
}

impl RegistryError {
    /// Whether this is the rate-limit signal that halts further lookups
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, RegistryError::RateLimited { .. })
    }
}
