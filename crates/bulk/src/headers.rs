//! Content negotiation headers for bulk request bodies
//!
//! Every encoder variant reports the headers a transport must set when
//! sending the body it produced. Keeping this as plain string pairs avoids
//! coupling the codec to any particular HTTP client.

/// `Content-Type` value shared by every bulk body variant
pub const CONTENT_TYPE_JSON: &str = "application/json; charset=UTF-8";

/// `Content-Encoding` value for gzip-compressed bodies
pub const CONTENT_ENCODING_GZIP: &str = "gzip";

/// Request headers describing an encoded bulk body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentHeaders {
    /// Always the NDJSON content type, compressed or not
    pub content_type: &'static str,

    /// Set only when the body bytes are compressed
    pub content_encoding: Option<&'static str>,
}

impl ContentHeaders {
    /// Headers for an uncompressed NDJSON body
    pub const JSON: Self = Self {
        content_type: CONTENT_TYPE_JSON,
        content_encoding: None,
    };

    /// Headers for a gzip-compressed NDJSON body
    pub const GZIP_JSON: Self = Self {
        content_type: CONTENT_TYPE_JSON,
        content_encoding: Some(CONTENT_ENCODING_GZIP),
    };

    /// Iterate the headers as `(name, value)` pairs for a request builder
    pub fn pairs(&self) -> impl Iterator<Item = (&'static str, &'static str)> {
        std::iter::once(("Content-Type", self.content_type))
            .chain(self.content_encoding.map(|enc| ("Content-Encoding", enc)))
    }
}
