//! Typed errors for the measurement pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`). Only
//! [`PipelineError`] ever reaches a caller of the façade; every other error is
//! classified here and converted into a simulated-record fallback.

use std::time::Duration;

use thiserror::Error;

/// Errors surfaced by the pipeline façade and configuration loading.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Neither page images nor document bytes were supplied
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// Configuration could not be loaded
    #[error("config error: {0}")]
    Config(String),
}

/// Errors raised by a [`VisionModel`](crate::traits::vision::VisionModel).
#[derive(Debug, Error)]
pub enum InferenceError {
    /// The call did not finish within the configured timeout
    #[error("inference timed out after {0:?}")]
    Timeout(Duration),

    /// The service rejected the call due to rate limiting
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// The account quota is exhausted
    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Connection failed before a response was received
    #[error("network error: {0}")]
    Network(String),

    /// The service answered with an error
    #[error("service error (status {status}): {message}")]
    Service { status: u16, message: String },

    /// The client is misconfigured (missing key, unknown model)
    #[error("configuration error: {0}")]
    Config(String),
}

impl InferenceError {
    /// Whether a later attempt could plausibly succeed.
    ///
    /// The coordinator never retries on its own; callers may use this to
    /// decide whether to resubmit.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::RateLimited(_) | Self::Network(_) => true,
            Self::Service { status, .. } => *status >= 500,
            Self::QuotaExceeded(_) | Self::Config(_) => false,
        }
    }
}

/// The inference response did not contain a usable JSON object.
#[derive(Debug, Error)]
pub enum ResponseParseError {
    /// The response was empty or whitespace
    #[error("response contained no payload")]
    NoPayload,

    /// JSON parsed but was not an object
    #[error("expected a JSON object, found {found}")]
    NotAnObject { found: &'static str },

    /// JSON was malformed even after cleanup
    #[error("invalid JSON after cleanup: {source} (near: {snippet:?})")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
        snippet: String,
    },
}

/// Errors raised by a [`PageRasterizer`](crate::traits::rasterizer::PageRasterizer).
#[derive(Debug, Error)]
pub enum RasterizeError {
    /// The requested page does not exist in the document
    #[error("page {page} out of range (document has {page_count} pages)")]
    PageOutOfRange { page: u32, page_count: u32 },

    /// The renderer failed on an existing page
    #[error("render failed on page {page}: {message}")]
    Render { page: u32, message: String },
}

/// Result type alias for façade operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
