//! Body decoding for text rewriting.
//!
//! Only bodies that decode as UTF-8 are rewritten. Anything else is carried
//! as opaque bytes; a failed decode is a routing decision, never an error.

use axum::body::Bytes;

/// A body classified as text or opaque bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedBody {
    Text(String),
    Raw(Bytes),
}

impl DecodedBody {
    /// Classify a body by attempting a UTF-8 decode.
    pub fn decode(bytes: Bytes) -> Self {
        match std::str::from_utf8(&bytes) {
            Ok(text) => DecodedBody::Text(text.to_owned()),
            Err(_) => DecodedBody::Raw(bytes),
        }
    }

    /// Apply `f` to a text body and re-encode. Raw bodies are returned as-is.
    pub fn rewrite_with(self, f: impl FnOnce(&str) -> String) -> Bytes {
        match self {
            DecodedBody::Text(text) => Bytes::from(f(&text)),
            DecodedBody::Raw(bytes) => bytes,
        }
    }
}
