//! Errors raised while dissecting frame bytes.

use etherparse::err::{self, Layer, LenError};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DissectError {
    /// The buffer ends before the layer's fixed header does.
    #[error("Insufficient data to parse {layer}: need {needed} bytes, have {available}")]
    InsufficientData {
        layer: &'static str,
        needed: usize,
        available: usize,
    },
    /// A header field holds a value the parser cannot follow.
    #[error("Malformed {layer}: {reason}")]
    Malformed {
        layer: &'static str,
        reason: &'static str,
    },
    /// Rejected by the etherparse header decoder.
    #[error("Invalid {layer} header: {reason}")]
    InvalidHeader { layer: &'static str, reason: String },
}

impl DissectError {
    pub(crate) fn ensure(layer: &'static str, data: &[u8], needed: usize) -> Result<(), Self> {
        if data.len() < needed {
            return Err(DissectError::InsufficientData {
                layer,
                needed,
                available: data.len(),
            });
        }
        Ok(())
    }

    pub(crate) fn from_len(layer: &'static str, e: &LenError) -> Self {
        DissectError::InsufficientData {
            layer,
            needed: e.required_len,
            available: e.len,
        }
    }

    /// Maps the error that stopped a lax slice to the layer it stopped at.
    pub(crate) fn from_slice(e: &err::packet::SliceError, at: Layer) -> Self {
        let layer = layer_name(at);
        match e {
            err::packet::SliceError::Len(len) => Self::from_len(layer, len),
            other => DissectError::InvalidHeader {
                layer,
                reason: other.to_string(),
            },
        }
    }
}

fn layer_name(layer: Layer) -> &'static str {
    match layer {
        Layer::Ethernet2Header => "ethernet",
        Layer::VlanHeader => "802.1Q",
        Layer::Ipv4Header => "ipv4",
        Layer::TcpHeader => "tcp",
        Layer::UdpHeader => "udp",
        Layer::Icmpv4 => "icmp",
        _ => "packet",
    }
}
