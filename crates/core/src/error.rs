//! Error types for StyleCheck.

use thiserror::Error;

/// Result type alias using StyleCheck's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for StyleCheck.
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Image Encoding
    // =========================================================================
    #[error("Image read error: {0}")]
    ImageRead(String),

    #[error("Unexpected I/O error: {0}")]
    UnexpectedIo(String),

    // =========================================================================
    // Model Endpoint
    // =========================================================================
    #[error("Analysis request timed out after {0} seconds")]
    Timeout(u64),

    #[error("API key is invalid or expired")]
    Auth,

    #[error("Rate limit exceeded. Please try again in a moment.")]
    RateLimit,

    #[error("AI service is temporarily unavailable. Please try again.")]
    ServiceUnavailable,

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("API error: {0}")]
    UnknownApi(String),

    // =========================================================================
    // Response Normalization
    // =========================================================================
    /// The model reported that no clothing is visible. Semantic, not
    /// structural: callers route this to a retake-photo flow, never to a
    /// generic failure screen.
    #[error("No outfit detected: {0}")]
    NoOutfitDetected(String),

    #[error("Invalid analysis format received")]
    InvalidAnalysisFormat,

    #[error("Failed to parse AI analysis")]
    Parse,

    // =========================================================================
    // Persistence & Transport
    // =========================================================================
    #[error("Network error: {0}")]
    Network(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Identity provider error: {0}")]
    Identity(String),

    // =========================================================================
    // Generic
    // =========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an image read error.
    pub fn image_read(msg: impl Into<String>) -> Self {
        Self::ImageRead(msg.into())
    }

    /// Create an unexpected I/O error.
    pub fn unexpected_io(msg: impl Into<String>) -> Self {
        Self::UnexpectedIo(msg.into())
    }

    /// Create a bad request error.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    /// Create an unknown API error carrying the upstream message.
    pub fn unknown_api(msg: impl Into<String>) -> Self {
        Self::UnknownApi(msg.into())
    }

    /// Create a no-outfit-detected error.
    pub fn no_outfit(msg: impl Into<String>) -> Self {
        Self::NoOutfitDetected(msg.into())
    }

    /// Create a network error.
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a persistence error.
    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    /// Create a storage error.
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create an identity provider error.
    pub fn identity(msg: impl Into<String>) -> Self {
        Self::Identity(msg.into())
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether a failed persistence attempt may be retried.
    ///
    /// Replaces the original's substring scan over error messages with a
    /// typed classification produced at the transport boundary.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_) | Self::ServiceUnavailable)
    }

    /// Whether this is the semantic "retake photo" outcome.
    pub fn is_no_outfit(&self) -> bool {
        matches!(self, Self::NoOutfitDetected(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(Error::network("connection reset").is_transient());
        assert!(Error::ServiceUnavailable.is_transient());
        assert!(!Error::persistence("row level security violation").is_transient());
        assert!(!Error::Auth.is_transient());
    }

    #[test]
    fn no_outfit_is_semantic_not_structural() {
        let err = Error::no_outfit("No outfit detected");
        assert!(err.is_no_outfit());
        assert!(!Error::Parse.is_no_outfit());
        assert!(!Error::InvalidAnalysisFormat.is_no_outfit());
    }
}
