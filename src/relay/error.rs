use thiserror::Error;

/// Failures after validation; all of them surface as 500 `Proxy error: ...`
#[derive(Debug, Error)]
pub enum RelayError {
    /// Text carried a percent sequence that does not decode
    #[error("{0}")]
    Decode(&'static str),

    /// Upstream unreachable, timed out, or the request could not be sent
    #[error("{0}")]
    Request(#[from] reqwest::Error),

    /// Multipart body without a boundary, or with a broken part
    #[error("failed to parse multipart body: {0}")]
    Multipart(#[from] multer::Error),

    /// Inbound body could not be read
    #[error("failed to read request body: {0}")]
    Body(String),
}

impl RelayError {
    /// Description placed in the 500 envelope
    pub fn description(&self) -> String {
        format!("Proxy error: {self}")
    }
}
