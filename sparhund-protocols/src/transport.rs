//! ## sparhund-protocols::transport
//! Maps etherparse TCP, UDP and ICMPv4 slices onto the packet model.
//!
//! Payloads are cut from the frame's `Bytes` with `slice_ref`, so no bytes
//! are copied.

use bytes::Bytes;
use etherparse::err::tcp::HeaderSliceError;
use etherparse::{Icmpv4Slice, IpNumber, TcpSlice, TransportSlice, UdpSlice};
use sparhund_core::packet::{IcmpMessage, TcpSegment, TransportLayer, UdpDatagram};
use sparhund_core::TcpFlags;

use crate::error::DissectError;

pub fn tcp(frame: &Bytes, slice: &TcpSlice<'_>) -> TcpSegment {
    let mut flags = TcpFlags::default();
    for (set, flag) in [
        (slice.fin(), TcpFlags::FIN),
        (slice.syn(), TcpFlags::SYN),
        (slice.rst(), TcpFlags::RST),
        (slice.psh(), TcpFlags::PSH),
        (slice.ack(), TcpFlags::ACK),
        (slice.urg(), TcpFlags::URG),
        (slice.ece(), TcpFlags::ECE),
        (slice.cwr(), TcpFlags::CWR),
    ] {
        if set {
            flags = flags | flag;
        }
    }

    TcpSegment {
        source_port: slice.source_port(),
        destination_port: slice.destination_port(),
        sequence: slice.sequence_number(),
        acknowledgement: slice.acknowledgment_number(),
        flags,
        window: slice.window_size(),
        payload: frame.slice_ref(slice.payload()),
    }
}

pub fn udp(frame: &Bytes, slice: &UdpSlice<'_>) -> UdpDatagram {
    UdpDatagram {
        source_port: slice.source_port(),
        destination_port: slice.destination_port(),
        payload: frame.slice_ref(slice.payload()),
    }
}

pub fn icmp(slice: &Icmpv4Slice<'_>) -> IcmpMessage {
    IcmpMessage {
        icmp_type: slice.type_u8(),
        code: slice.code_u8(),
    }
}

/// Maps a transport slice decoded by etherparse. ICMPv6 has no counterpart
/// in the model and maps to [`TransportLayer::None`].
pub fn layer(frame: &Bytes, slice: &TransportSlice<'_>) -> TransportLayer {
    match slice {
        TransportSlice::Tcp(segment) => TransportLayer::Tcp(tcp(frame, segment)),
        TransportSlice::Udp(datagram) => TransportLayer::Udp(udp(frame, datagram)),
        TransportSlice::Icmpv4(message) => TransportLayer::Icmp(icmp(message)),
        _ => TransportLayer::None,
    }
}

/// Decodes the transport header at the start of a first IPv4 fragment.
///
/// etherparse stops at the IP layer for any fragment, but the first one
/// still carries a complete transport header.
pub fn first_fragment(
    frame: &Bytes,
    protocol: IpNumber,
    payload: &[u8],
) -> Result<TransportLayer, DissectError> {
    match protocol {
        IpNumber::TCP => match TcpSlice::from_slice(payload) {
            Ok(segment) => Ok(TransportLayer::Tcp(tcp(frame, &segment))),
            Err(HeaderSliceError::Len(e)) => Err(DissectError::from_len("tcp", &e)),
            Err(HeaderSliceError::Content(e)) => Err(DissectError::InvalidHeader {
                layer: "tcp",
                reason: e.to_string(),
            }),
        },
        IpNumber::UDP => UdpSlice::from_slice_lax(payload)
            .map(|datagram| TransportLayer::Udp(udp(frame, &datagram)))
            .map_err(|e| DissectError::from_len("udp", &e)),
        IpNumber::ICMP => Icmpv4Slice::from_slice(payload)
            .map(|message| TransportLayer::Icmp(icmp(&message)))
            .map_err(|e| DissectError::from_len("icmp", &e)),
        _ => Ok(TransportLayer::None),
    }
}
