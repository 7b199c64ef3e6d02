//! Bulk body error types
//!
//! Errors that can occur while constructing a bulk request body.

use thiserror::Error;

/// Errors that can occur during bulk body encoding
#[derive(Debug, Error)]
pub enum BodyError {
    // ========================================================================
    // Record-scoped errors - the failed record was rolled back, the
    // encoder stays usable
    // ========================================================================
    /// A metadata or document value could not be serialized to JSON
    #[error("json serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Document carried the direct-send flag without a usable message string
    #[error("no 'message' field in document")]
    MissingMessageField,

    // ========================================================================
    // Encoder-scoped errors - construction or stream state is at fault
    // ========================================================================
    /// Requested gzip level is outside the supported range
    #[error("invalid compression level: {0} (expected 0-9)")]
    InvalidCompressionLevel(u32),

    /// Codec configuration combines options that cannot work together
    #[error("invalid codec config: {0}")]
    InvalidConfig(&'static str),

    /// Write attempted after the compressed stream was finalized
    #[error("body already finalized: reset() before adding more records")]
    Finalized,

    /// The streaming compressor failed to accept or flush data
    #[error("compressor failure: {0}")]
    Compressor(#[from] std::io::Error),
}

impl BodyError {
    /// Create an invalid compression level error
    #[inline]
    pub fn invalid_level(level: u32) -> Self {
        Self::InvalidCompressionLevel(level)
    }

    /// Create an invalid config error
    #[inline]
    pub fn invalid_config(msg: &'static str) -> Self {
        Self::InvalidConfig(msg)
    }

    /// Check if this error is scoped to a single record
    ///
    /// Record-scoped failures leave the encoder usable: the failed record has
    /// been rolled back and the caller may drop it and keep adding. Anything
    /// else means the encoder or its configuration is unusable as-is.
    pub fn is_record_error(&self) -> bool {
        matches!(self, Self::Json(_) | Self::MissingMessageField)
    }
}
