//! ## sparhund-protocols::dot11
//! IEEE 802.11 MAC header, beacon bodies and unprotected data frames.

use bytes::Bytes;
use sparhund_core::packet::{BeaconBody, Dot11Frame, InformationElement};
use sparhund_core::MacAddr;

use crate::error::DissectError;

const MIN_HEADER_LEN: usize = 10;
const MANAGEMENT_HEADER_LEN: usize = 24;
const BEACON_FIXED_LEN: usize = 12;
const FLAG_TO_DS_FROM_DS: u8 = 0x03;
const FLAG_PROTECTED: u8 = 0x40;
const FLAG_ORDER: u8 = 0x80;
const SUBTYPE_QOS: u8 = 0x08;
const CONTROL_SUBTYPE_CTS: u8 = 12;
const CONTROL_SUBTYPE_ACK: u8 = 13;
const LLC_SNAP: [u8; 6] = [0xaa, 0xaa, 0x03, 0x00, 0x00, 0x00];

/// A decoded 802.11 frame, plus the encapsulated network payload when the
/// frame is an unprotected LLC/SNAP data frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dot11Dissection {
    pub frame: Dot11Frame,
    /// `(ethertype, payload)`
    pub encapsulated: Option<(u16, Bytes)>,
}

pub fn parse(data: &Bytes) -> Result<Dot11Dissection, DissectError> {
    DissectError::ensure("802.11", data, MIN_HEADER_LEN)?;

    let fc = data[0];
    if fc & 0x03 != 0 {
        return Err(DissectError::Malformed {
            layer: "802.11",
            reason: "unknown protocol version",
        });
    }
    let frame_type = (fc >> 2) & 0x03;
    let subtype = fc >> 4;
    let flags = data[1];
    let receiver = MacAddr::from_slice(&data[4..10]).unwrap_or_default();

    let mut frame = Dot11Frame {
        frame_type,
        subtype,
        flags,
        receiver,
        transmitter: None,
        bssid: None,
        beacon: None,
    };

    match frame_type {
        Dot11Frame::TYPE_CONTROL => {
            if subtype != CONTROL_SUBTYPE_CTS && subtype != CONTROL_SUBTYPE_ACK {
                frame.transmitter = data.get(10..16).and_then(MacAddr::from_slice);
            }
            Ok(Dot11Dissection {
                frame,
                encapsulated: None,
            })
        }
        Dot11Frame::TYPE_MANAGEMENT => {
            DissectError::ensure("802.11 management", data, MANAGEMENT_HEADER_LEN)?;
            frame.transmitter = MacAddr::from_slice(&data[10..16]);
            frame.bssid = MacAddr::from_slice(&data[16..22]);
            if subtype == Dot11Frame::SUBTYPE_BEACON {
                frame.beacon = Some(parse_beacon(&data.slice(MANAGEMENT_HEADER_LEN..))?);
            }
            Ok(Dot11Dissection {
                frame,
                encapsulated: None,
            })
        }
        Dot11Frame::TYPE_DATA => {
            DissectError::ensure("802.11 data", data, MANAGEMENT_HEADER_LEN)?;
            frame.transmitter = MacAddr::from_slice(&data[10..16]);
            frame.bssid = MacAddr::from_slice(&data[16..22]);
            let encapsulated = parse_data_body(data, subtype, flags);
            Ok(Dot11Dissection {
                frame,
                encapsulated,
            })
        }
        _ => Err(DissectError::Malformed {
            layer: "802.11",
            reason: "reserved frame type",
        }),
    }
}

/// Fixed beacon fields followed by tagged elements. A truncated trailing
/// element ends the element list instead of failing the frame.
pub fn parse_beacon(body: &Bytes) -> Result<BeaconBody, DissectError> {
    DissectError::ensure("802.11 beacon", body, BEACON_FIXED_LEN)?;

    let mut ts = [0u8; 8];
    ts.copy_from_slice(&body[0..8]);
    let mut elements = Vec::new();
    let mut offset = BEACON_FIXED_LEN;
    while offset + 2 <= body.len() {
        let id = body[offset];
        let len = usize::from(body[offset + 1]);
        let start = offset + 2;
        if start + len > body.len() {
            break;
        }
        elements.push(InformationElement {
            id,
            data: body.slice(start..start + len),
        });
        offset = start + len;
    }

    Ok(BeaconBody {
        timestamp: u64::from_le_bytes(ts),
        interval: u16::from_le_bytes([body[8], body[9]]),
        capabilities: u16::from_le_bytes([body[10], body[11]]),
        elements,
    })
}

fn parse_data_body(data: &Bytes, subtype: u8, flags: u8) -> Option<(u16, Bytes)> {
    if flags & FLAG_PROTECTED != 0 {
        return None;
    }
    let mut header_len = MANAGEMENT_HEADER_LEN;
    if flags & FLAG_TO_DS_FROM_DS == FLAG_TO_DS_FROM_DS {
        header_len += 6;
    }
    if subtype & SUBTYPE_QOS != 0 {
        header_len += 2;
        if flags & FLAG_ORDER != 0 {
            header_len += 4;
        }
    }
    let body = data.get(header_len..)?;
    if body.len() < LLC_SNAP.len() + 2 || body[..LLC_SNAP.len()] != LLC_SNAP {
        return None;
    }
    let ethertype = u16::from_be_bytes([body[6], body[7]]);
    Some((ethertype, data.slice(header_len + LLC_SNAP.len() + 2..)))
}
