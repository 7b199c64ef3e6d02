//! NDJSON body encoder with direct passthrough
//!
//! Some pipelines carry documents that were already rendered to their final
//! wire form upstream. Re-encoding them would double-escape the payload, so
//! such documents mark themselves with an escape field and ship the rendered
//! bytes in a companion string field. This encoder detects the marker and
//! splices the companion string into the body verbatim; everything else is
//! encoded exactly like the plain variant.

use serde::Serialize;
use serde_json::Value;

use crate::encoder::{write_json_line, BodyEncoder, JsonEncoder};
use crate::error::BodyError;
use crate::headers::ContentHeaders;
use crate::Result;

/// Field that marks a document for direct passthrough
pub const DIRECT_FLAG_FIELD: &str = "send_direct_flag";

/// Field holding the pre-rendered line emitted for marked documents
pub const MESSAGE_FIELD: &str = "message";

/// Plain NDJSON encoder with verbatim passthrough for marked documents
///
/// Wraps a [`JsonEncoder`] and adds the marker inspection in front of the
/// document write. The metadata line is written before the document is
/// probed, so passthrough failures roll the metadata back too: either the
/// whole record lands in the body or none of it does.
#[derive(Debug)]
pub struct DirectJsonEncoder {
    inner: JsonEncoder,
}

/// Outcome of probing a document for the passthrough marker
enum DirectProbe<'a> {
    /// Marker set, message present: splice it in verbatim
    Message(&'a str),
    /// Marker set but no usable message string
    MarkerWithoutMessage,
    /// No marker: encode as ordinary JSON
    NotMarked,
}

fn probe_direct(value: &Value) -> DirectProbe<'_> {
    let map = match value.as_object() {
        Some(map) => map,
        None => return DirectProbe::NotMarked,
    };
    match map.get(DIRECT_FLAG_FIELD) {
        Some(flag) if is_truthy(flag) => match map.get(MESSAGE_FIELD).and_then(Value::as_str) {
            Some(message) => DirectProbe::Message(message),
            None => DirectProbe::MarkerWithoutMessage,
        },
        _ => DirectProbe::NotMarked,
    }
}

/// Marker values `false` and `null` count as unset
fn is_truthy(value: &Value) -> bool {
    !matches!(value, Value::Null | Value::Bool(false))
}

impl DirectJsonEncoder {
    /// Create an encoder with a fresh buffer
    pub fn new() -> Self {
        Self {
            inner: JsonEncoder::new(),
        }
    }

    /// Create an encoder reusing `buf`'s allocation
    pub fn with_buffer(buf: Vec<u8>) -> Self {
        Self {
            inner: JsonEncoder::with_buffer(buf),
        }
    }

    /// Consume the encoder and hand back its buffer for pooling
    pub fn into_buffer(self) -> Vec<u8> {
        self.inner.into_buffer()
    }

    fn encode_record<M, D>(&mut self, meta: &M, doc: &D) -> Result<()>
    where
        M: Serialize + ?Sized,
        D: Serialize + ?Sized,
    {
        write_json_line(self.inner.buffer_mut(), meta)?;
        // Materialize the document so the marker can be probed
        let value = serde_json::to_value(doc)?;
        self.encode_doc(&value)
    }

    fn encode_doc(&mut self, doc: &Value) -> Result<()> {
        match probe_direct(doc) {
            DirectProbe::Message(message) => {
                let buf = self.inner.buffer_mut();
                buf.extend_from_slice(message.as_bytes());
                buf.push(b'\n');
                Ok(())
            }
            DirectProbe::MarkerWithoutMessage => Err(BodyError::MissingMessageField),
            DirectProbe::NotMarked => write_json_line(self.inner.buffer_mut(), doc),
        }
    }
}

impl Default for DirectJsonEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl BodyEncoder for DirectJsonEncoder {
    fn add<M, D>(&mut self, meta: &M, doc: &D) -> Result<()>
    where
        M: Serialize + ?Sized,
        D: Serialize + ?Sized,
    {
        let mark = self.inner.bytes_written();
        if let Err(err) = self.encode_record(meta, doc) {
            self.inner.buffer_mut().truncate(mark);
            return Err(err);
        }
        Ok(())
    }

    fn add_raw<T>(&mut self, entry: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        self.inner.add_raw(entry)
    }

    fn marshal<T>(&mut self, doc: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        self.inner.reset();
        // Nothing written yet, so a probe or encode failure needs no rollback
        let value = serde_json::to_value(doc)?;
        self.encode_doc(&value)
    }

    fn reset(&mut self) {
        self.inner.reset();
    }

    fn content_headers(&self) -> ContentHeaders {
        self.inner.content_headers()
    }

    fn finish(&mut self) -> Result<&[u8]> {
        self.inner.finish()
    }

    fn bytes_written(&self) -> usize {
        self.inner.bytes_written()
    }
}

#[cfg(test)]
#[path = "direct_test.rs"]
mod direct_test;
