//! Bulk codec configuration
//!
//! Settings controlling how request bodies are encoded. Loading (files,
//! environment) is the caller's concern; this crate only defines the
//! deserializable shape and its validation rules.

use serde::Deserialize;

use crate::encoder::MAX_COMPRESSION_LEVEL;
use crate::error::BodyError;
use crate::Result;

/// Body codec settings for a bulk writer
///
/// # Example
///
/// ```toml
/// [output.bulk]
/// compression_level = 3
/// direct_passthrough = false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BulkCodecConfig {
    /// Gzip level for the request body: 0 sends uncompressed NDJSON,
    /// 1-9 trade encoding speed for ratio
    ///
    /// Default: 0 (no compression)
    pub compression_level: u32,

    /// Emit documents carrying the direct-send marker verbatim instead
    /// of re-encoding them
    ///
    /// Default: false
    pub direct_passthrough: bool,
}

impl Default for BulkCodecConfig {
    fn default() -> Self {
        Self {
            compression_level: 0,
            direct_passthrough: false,
        }
    }
}

impl BulkCodecConfig {
    /// Validate settings that deserialization alone cannot check
    ///
    /// Rejects out-of-range gzip levels and the direct + compression
    /// combination (passthrough specializes the plain encoder only).
    pub fn validate(&self) -> Result<()> {
        if self.compression_level > MAX_COMPRESSION_LEVEL {
            return Err(BodyError::invalid_level(self.compression_level));
        }
        if self.direct_passthrough && self.compression_level != 0 {
            return Err(BodyError::invalid_config(
                "direct_passthrough requires compression_level 0",
            ));
        }
        Ok(())
    }
}
