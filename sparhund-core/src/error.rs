//! Error types for packet field access and lenient text extraction.

use std::str::Utf8Error;

use thiserror::Error;

use crate::packet::Protocol;

/// Raised by a typed accessor when the packet does not carry the layer.
///
/// Predicates treat it as "no match". It is never produced for a layer that
/// is present but empty, so a zero-length payload stays distinguishable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error(
    "packet has no {layer}{} layer",
    .alternative.map(|other| format!(" or {other}")).unwrap_or_default()
)]
pub struct FieldAbsent {
    pub layer: Protocol,
    /// Set when either of two layers would have satisfied the accessor.
    pub alternative: Option<Protocol>,
}

impl FieldAbsent {
    pub fn new(layer: Protocol) -> Self {
        Self {
            layer,
            alternative: None,
        }
    }

    pub fn either(layer: Protocol, alternative: Protocol) -> Self {
        Self {
            layer,
            alternative: Some(alternative),
        }
    }
}

/// Malformed textual or structural field met during extraction.
///
/// Extractors skip the offending packet and continue with the next one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("{field} is not valid UTF-8: {source}")]
    InvalidUtf8 {
        field: &'static str,
        #[source]
        source: Utf8Error,
    },

    #[error("{field} is missing")]
    MissingField { field: &'static str },

    #[error(transparent)]
    FieldAbsent(#[from] FieldAbsent),
}
