//! Plain NDJSON body encoder

use serde::Serialize;

use crate::encoder::{write_json_line, BodyEncoder};
use crate::headers::ContentHeaders;
use crate::Result;

/// Uncompressed bulk body encoder
///
/// Appends each record to an in-memory buffer as two newline-terminated
/// JSON values. The serializer streams bytes as it walks the value, so a
/// failed record can leave partial output behind; every mutating operation
/// records the buffer length up front and truncates back to it on failure.
#[derive(Debug)]
pub struct JsonEncoder {
    buf: Vec<u8>,
}

impl JsonEncoder {
    /// Create an encoder with a fresh buffer
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(crate::DEFAULT_BODY_CAPACITY),
        }
    }

    /// Create an encoder reusing `buf`'s allocation
    ///
    /// Existing content is cleared; only capacity is recycled.
    pub fn with_buffer(mut buf: Vec<u8>) -> Self {
        buf.clear();
        Self { buf }
    }

    /// Consume the encoder and hand back its buffer for pooling
    pub fn into_buffer(self) -> Vec<u8> {
        self.buf
    }

    pub(crate) fn buffer_mut(&mut self) -> &mut Vec<u8> {
        &mut self.buf
    }

    fn encode_record<M, D>(&mut self, meta: &M, doc: &D) -> Result<()>
    where
        M: Serialize + ?Sized,
        D: Serialize + ?Sized,
    {
        write_json_line(&mut self.buf, meta)?;
        write_json_line(&mut self.buf, doc)?;
        Ok(())
    }
}

impl Default for JsonEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl BodyEncoder for JsonEncoder {
    fn add<M, D>(&mut self, meta: &M, doc: &D) -> Result<()>
    where
        M: Serialize + ?Sized,
        D: Serialize + ?Sized,
    {
        let mark = self.buf.len();
        if let Err(err) = self.encode_record(meta, doc) {
            self.buf.truncate(mark);
            return Err(err);
        }
        Ok(())
    }

    fn add_raw<T>(&mut self, entry: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let mark = self.buf.len();
        if let Err(err) = write_json_line(&mut self.buf, entry) {
            self.buf.truncate(mark);
            return Err(err);
        }
        Ok(())
    }

    fn marshal<T>(&mut self, doc: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        self.reset();
        self.add_raw(doc)
    }

    fn reset(&mut self) {
        self.buf.clear();
    }

    fn content_headers(&self) -> ContentHeaders {
        ContentHeaders::JSON
    }

    /// Nothing to finalize for the plain variant; the encoder stays writable
    fn finish(&mut self) -> Result<&[u8]> {
        Ok(&self.buf)
    }

    fn bytes_written(&self) -> usize {
        self.buf.len()
    }
}

#[cfg(test)]
#[path = "json_test.rs"]
mod json_test;
