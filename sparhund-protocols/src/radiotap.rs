//! ## sparhund-protocols::radiotap
//! Strips the radiotap header in front of 802.11 frames.
//!
//! Only the fields needed to find the flags byte are walked (TSFT, flags).
//! When the flags announce a trailing FCS, it is trimmed from the frame.

use bytes::Bytes;

use crate::error::DissectError;

const MIN_HEADER_LEN: usize = 8;
const PRESENT_TSFT: u32 = 1 << 0;
const PRESENT_FLAGS: u32 = 1 << 1;
const PRESENT_EXTENDED: u32 = 1 << 31;
const FLAG_FCS_AT_END: u8 = 0x10;
const FCS_LEN: usize = 4;

/// Returns the 802.11 frame that follows the radiotap header.
pub fn parse(data: &Bytes) -> Result<Bytes, DissectError> {
    DissectError::ensure("radiotap", data, MIN_HEADER_LEN)?;
    if data[0] != 0 {
        return Err(DissectError::Malformed {
            layer: "radiotap",
            reason: "unknown header version",
        });
    }

    let header_len = usize::from(u16::from_le_bytes([data[2], data[3]]));
    DissectError::ensure("radiotap", data, header_len.max(MIN_HEADER_LEN))?;

    let present = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);
    let mut offset = MIN_HEADER_LEN;
    let mut word = present;
    while word & PRESENT_EXTENDED != 0 {
        DissectError::ensure("radiotap present bitmap", data, offset + 4)?;
        word = u32::from_le_bytes([
            data[offset],
            data[offset + 1],
            data[offset + 2],
            data[offset + 3],
        ]);
        offset += 4;
    }

    let mut fcs_at_end = false;
    if present & PRESENT_TSFT != 0 {
        offset = (offset + 7) & !7;
        offset += 8;
    }
    if present & PRESENT_FLAGS != 0 && offset < header_len {
        fcs_at_end = data[offset] & FLAG_FCS_AT_END != 0;
    }

    let mut end = data.len();
    if fcs_at_end {
        end = end.saturating_sub(FCS_LEN).max(header_len);
    }
    Ok(data.slice(header_len..end))
}
