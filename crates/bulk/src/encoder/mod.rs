//! Bulk request body encoders
//!
//! A bulk body is a sequence of records, each encoded as two
//! newline-terminated JSON values: an action metadata line followed by the
//! document itself. Encoders accumulate records into an in-memory buffer
//! that the transport sends as one request.
//!
//! # Available Encoders
//!
//! - `JsonEncoder` - Uncompressed NDJSON output
//! - `GzipEncoder` - Gzip-compressed NDJSON output
//! - `DirectJsonEncoder` - NDJSON with verbatim passthrough for
//!   pre-formatted documents
//!
//! All three guarantee rollback: a record that fails to encode leaves the
//! body exactly as it was before the call, so one bad document never
//! corrupts a batch.
//!
//! # Example
//!
//! ```ignore
//! let config = BulkCodecConfig::default();
//! let mut encoder = BulkEncoder::from_config(&config)?;
//!
//! for (meta, doc) in batch {
//!     if let Err(err) = encoder.add(&meta, &doc) {
//!         if err.is_record_error() {
//!             continue; // rolled back, drop the record
//!         }
//!         return Err(err);
//!     }
//! }
//!
//! let body = encoder.finish()?;
//! send(encoder.content_headers(), body)?;
//! ```

mod direct;
mod gzip;
mod json;

pub use direct::{DirectJsonEncoder, DIRECT_FLAG_FIELD, MESSAGE_FIELD};
pub use gzip::{GzipEncoder, MAX_COMPRESSION_LEVEL};
pub use json::JsonEncoder;

use std::io::Write;

use serde::Serialize;

use crate::config::BulkCodecConfig;
use crate::headers::ContentHeaders;
use crate::Result;

/// Capability shared by every bulk body encoder
///
/// Mutating operations take `&mut self`: an encoder belongs to one batch
/// builder at a time and is never shared across tasks.
pub trait BodyEncoder {
    /// Append one record as `{meta}\n{doc}\n`
    ///
    /// On failure the body is rolled back to its pre-call state and the
    /// record is lost; the encoder stays usable.
    fn add<M, D>(&mut self, meta: &M, doc: &D) -> Result<()>
    where
        M: Serialize + ?Sized,
        D: Serialize + ?Sized;

    /// Append a single pre-built entry as one `{entry}\n` line
    ///
    /// Same rollback guarantee as [`add`](Self::add).
    fn add_raw<T>(&mut self, entry: &T) -> Result<()>
    where
        T: Serialize + ?Sized;

    /// Discard everything and encode `doc` as the only value in the body
    fn marshal<T>(&mut self, doc: &T) -> Result<()>
    where
        T: Serialize + ?Sized;

    /// Discard all buffered output and make the encoder ready for reuse
    fn reset(&mut self);

    /// Headers the transport must set when sending this body
    fn content_headers(&self) -> ContentHeaders;

    /// Finalize the body and return its bytes
    ///
    /// For compressed variants this writes the stream trailer; adding more
    /// records afterwards requires a [`reset`](Self::reset) first.
    fn finish(&mut self) -> Result<&[u8]>;

    /// Number of body bytes produced so far
    fn bytes_written(&self) -> usize;
}

/// Write one JSON value followed by the record separator
#[inline]
pub(crate) fn write_json_line<W, T>(writer: &mut W, value: &T) -> Result<()>
where
    W: Write,
    T: Serialize + ?Sized,
{
    serde_json::to_writer(&mut *writer, value)?;
    writer.write_all(b"\n")?;
    Ok(())
}

// ============================================================================
// BulkEncoder - config-selected encoder variant
// ============================================================================

/// The closed set of body encoder variants
///
/// [`BodyEncoder`] has generic methods and cannot be boxed; this enum is the
/// runtime-selected form handed to batch builders.
#[derive(Debug)]
pub enum BulkEncoder {
    Json(JsonEncoder),
    Gzip(GzipEncoder),
    Direct(DirectJsonEncoder),
}

impl BulkEncoder {
    /// Build the encoder variant selected by `config`
    ///
    /// Level 0 selects plain NDJSON (or the passthrough variant when
    /// `direct_passthrough` is set), levels 1-9 select gzip. Invalid
    /// settings fail here, never at encode time.
    pub fn from_config(config: &BulkCodecConfig) -> Result<Self> {
        Self::build(config, Vec::with_capacity(crate::DEFAULT_BODY_CAPACITY))
    }

    /// Like [`from_config`](Self::from_config), reusing `buf`'s allocation
    pub fn from_config_with_buffer(config: &BulkCodecConfig, buf: Vec<u8>) -> Result<Self> {
        Self::build(config, buf)
    }

    fn build(config: &BulkCodecConfig, buf: Vec<u8>) -> Result<Self> {
        config.validate()?;

        let encoder = if config.direct_passthrough {
            Self::Direct(DirectJsonEncoder::with_buffer(buf))
        } else if config.compression_level == 0 {
            Self::Json(JsonEncoder::with_buffer(buf))
        } else {
            Self::Gzip(GzipEncoder::with_buffer(config.compression_level, buf)?)
        };

        tracing::debug!(
            compression_level = config.compression_level,
            direct_passthrough = config.direct_passthrough,
            "bulk body encoder ready"
        );
        Ok(encoder)
    }

    /// Consume the encoder and hand back its buffer for pooling
    pub fn into_buffer(self) -> Vec<u8> {
        match self {
            Self::Json(enc) => enc.into_buffer(),
            Self::Gzip(enc) => enc.into_buffer(),
            Self::Direct(enc) => enc.into_buffer(),
        }
    }
}

impl BodyEncoder for BulkEncoder {
    fn add<M, D>(&mut self, meta: &M, doc: &D) -> Result<()>
    where
        M: Serialize + ?Sized,
        D: Serialize + ?Sized,
    {
        match self {
            Self::Json(enc) => enc.add(meta, doc),
            Self::Gzip(enc) => enc.add(meta, doc),
            Self::Direct(enc) => enc.add(meta, doc),
        }
    }

    fn add_raw<T>(&mut self, entry: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        match self {
            Self::Json(enc) => enc.add_raw(entry),
            Self::Gzip(enc) => enc.add_raw(entry),
            Self::Direct(enc) => enc.add_raw(entry),
        }
    }

    fn marshal<T>(&mut self, doc: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        match self {
            Self::Json(enc) => enc.marshal(doc),
            Self::Gzip(enc) => enc.marshal(doc),
            Self::Direct(enc) => enc.marshal(doc),
        }
    }

    fn reset(&mut self) {
        match self {
            Self::Json(enc) => enc.reset(),
            Self::Gzip(enc) => enc.reset(),
            Self::Direct(enc) => enc.reset(),
        }
    }

    fn content_headers(&self) -> ContentHeaders {
        match self {
            Self::Json(enc) => enc.content_headers(),
            Self::Gzip(enc) => enc.content_headers(),
            Self::Direct(enc) => enc.content_headers(),
        }
    }

    fn finish(&mut self) -> Result<&[u8]> {
        match self {
            Self::Json(enc) => enc.finish(),
            Self::Gzip(enc) => enc.finish(),
            Self::Direct(enc) => enc.finish(),
        }
    }

    fn bytes_written(&self) -> usize {
        match self {
            Self::Json(enc) => enc.bytes_written(),
            Self::Gzip(enc) => enc.bytes_written(),
            Self::Direct(enc) => enc.bytes_written(),
        }
    }
}
