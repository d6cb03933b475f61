use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Request for {package} timed out after {timeout_ms}ms")]
    Timeout { package: String, timeout_ms: u64 },

    #[error("Package not found: {0}")]
    NotFound(String),

    #[error("Unexpected status {status} for {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}
