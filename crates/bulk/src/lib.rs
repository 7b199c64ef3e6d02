//! Bulk request body encoding for the skiff indexing client
//!
//! This crate builds the NDJSON bodies of bulk write requests: for each
//! record an action metadata line followed by the document line, optionally
//! gzip-compressed, with verbatim passthrough for documents that arrive
//! pre-rendered. The transport layer that sends the bytes lives elsewhere;
//! this crate only produces bodies and the headers describing them.
//!
//! # Design Principles
//!
//! - **All-or-nothing records**: a record that fails to encode is rolled
//!   back completely, so one bad document never poisons a batch
//! - **Fail-fast construction**: invalid compression levels and codec
//!   settings are rejected when the encoder is built, not at encode time
//! - **Allocation reuse**: encoders can be built over pooled buffers and
//!   hand the allocation back when the batch is done
//!
//! # Example
//!
//! ```ignore
//! use skiff_bulk::{BodyEncoder, BulkCodecConfig, BulkEncoder};
//!
//! let config = BulkCodecConfig {
//!     compression_level: 6,
//!     ..Default::default()
//! };
//! let mut encoder = BulkEncoder::from_config(&config)?;
//! encoder.add(&meta, &doc)?;
//! let body = encoder.finish()?;
//! ```

mod config;
mod encoder;
mod error;
mod headers;
mod pool;

pub use config::BulkCodecConfig;
pub use encoder::{
    BodyEncoder, BulkEncoder, DirectJsonEncoder, GzipEncoder, JsonEncoder, DIRECT_FLAG_FIELD,
    MAX_COMPRESSION_LEVEL, MESSAGE_FIELD,
};
pub use error::BodyError;
pub use headers::{ContentHeaders, CONTENT_ENCODING_GZIP, CONTENT_TYPE_JSON};
pub use pool::{BufferPool, BufferPoolMetrics, MetricsSnapshot, MAX_RETAIN_FACTOR};

/// Result type for bulk body operations
pub type Result<T> = std::result::Result<T, BodyError>;

/// Default body buffer capacity in bytes (256KB)
pub const DEFAULT_BODY_CAPACITY: usize = 256 * 1024;
