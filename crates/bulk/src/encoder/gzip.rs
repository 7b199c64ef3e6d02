//! Gzip-compressed NDJSON body encoder
//!
//! Same record protocol as the plain encoder, routed through a streaming
//! gzip compressor. Each committed record is followed by a sync flush, so
//! the output buffer always decodes back to the records added so far even
//! before the stream is finalized.

use std::io::Write;

use flate2::write::GzEncoder;
use flate2::Compression;
use serde::Serialize;

use crate::encoder::{write_json_line, BodyEncoder};
use crate::error::BodyError;
use crate::headers::ContentHeaders;
use crate::Result;

/// Highest gzip level accepted at construction
pub const MAX_COMPRESSION_LEVEL: u32 = 9;

/// Gzip-compressed bulk body encoder
///
/// Records are serialized into a scratch buffer first and only written to
/// the compressor once both values encoded cleanly. A failed record
/// therefore never touches the compressor: its internal state and the
/// output buffer stay exactly as they were, which is what makes rollback
/// sound for a stateful stream.
#[derive(Debug)]
pub struct GzipEncoder {
    gzip: GzEncoder<Vec<u8>>,
    scratch: Vec<u8>,
    level: Compression,
    finalized: bool,
}

impl GzipEncoder {
    /// Create an encoder with a fresh output buffer
    ///
    /// Fails with [`BodyError::InvalidCompressionLevel`] when `level` is
    /// above 9. There is no fallback to uncompressed output: a caller that
    /// asked for compression either gets it or gets an error.
    pub fn new(level: u32) -> Result<Self> {
        Self::with_buffer(level, Vec::with_capacity(crate::DEFAULT_BODY_CAPACITY))
    }

    /// Create an encoder reusing `buf`'s allocation as the output buffer
    ///
    /// Existing content is cleared; only capacity is recycled.
    pub fn with_buffer(level: u32, mut buf: Vec<u8>) -> Result<Self> {
        if level > MAX_COMPRESSION_LEVEL {
            return Err(BodyError::invalid_level(level));
        }
        buf.clear();
        let level = Compression::new(level);
        Ok(Self {
            gzip: GzEncoder::new(buf, level),
            scratch: Vec::new(),
            level,
            finalized: false,
        })
    }

    /// Consume the encoder and hand back the output buffer for pooling
    ///
    /// Finalizes the stream if it wasn't already.
    pub fn into_buffer(self) -> Vec<u8> {
        // A Vec sink cannot fail the trailer write
        self.gzip.finish().unwrap_or_default()
    }

    /// Configured gzip level
    pub fn level(&self) -> u32 {
        self.level.level()
    }

    fn commit_scratch(&mut self) -> Result<()> {
        self.gzip.write_all(&self.scratch)?;
        // Sync flush: makes the record decodable from the unfinished stream
        self.gzip.flush()?;
        Ok(())
    }
}

impl BodyEncoder for GzipEncoder {
    fn add<M, D>(&mut self, meta: &M, doc: &D) -> Result<()>
    where
        M: Serialize + ?Sized,
        D: Serialize + ?Sized,
    {
        if self.finalized {
            return Err(BodyError::Finalized);
        }
        self.scratch.clear();
        write_json_line(&mut self.scratch, meta)?;
        write_json_line(&mut self.scratch, doc)?;
        self.commit_scratch()
    }

    fn add_raw<T>(&mut self, entry: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        if self.finalized {
            return Err(BodyError::Finalized);
        }
        self.scratch.clear();
        write_json_line(&mut self.scratch, entry)?;
        self.commit_scratch()
    }

    fn marshal<T>(&mut self, doc: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        self.reset();
        self.add_raw(doc)
    }

    /// Drop all buffered output and attach a fresh compressor to the
    /// reclaimed buffer
    fn reset(&mut self) {
        let mut buf = std::mem::take(self.gzip.get_mut());
        buf.clear();
        self.gzip = GzEncoder::new(buf, self.level);
        self.finalized = false;
    }

    fn content_headers(&self) -> ContentHeaders {
        ContentHeaders::GZIP_JSON
    }

    /// Write the gzip trailer and return the complete stream
    ///
    /// Idempotent: calling again returns the same bytes. Adding records
    /// after this fails with [`BodyError::Finalized`] until `reset()`.
    fn finish(&mut self) -> Result<&[u8]> {
        self.gzip.try_finish()?;
        self.finalized = true;
        Ok(self.gzip.get_ref().as_slice())
    }

    /// Compressed bytes flushed to the output buffer so far
    fn bytes_written(&self) -> usize {
        self.gzip.get_ref().len()
    }
}

#[cfg(test)]
#[path = "gzip_test.rs"]
mod gzip_test;
