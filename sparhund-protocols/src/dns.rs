//! ## sparhund-protocols::dns
//! DNS message parser (header and question section).
//!
//! Names are returned as raw label bytes joined by `.`, with the trailing
//! root dot, so callers decide how to treat non-UTF-8 labels. Compression
//! pointers are followed with a hop limit.

use bytes::Bytes;
use sparhund_core::packet::{DnsMessage, DnsQuestion};

use crate::error::DissectError;

/// Ports on which UDP and TCP payloads are handed to this parser.
pub const DNS_PORTS: [u16; 2] = [53, 5353];

const HEADER_LEN: usize = 12;
const MAX_QUESTIONS: usize = 32;
const MAX_POINTER_HOPS: usize = 16;
const MAX_NAME_LEN: usize = 255;

pub fn is_dns_port(port: u16) -> bool {
    DNS_PORTS.contains(&port)
}

/// Parses a DNS message carried over UDP.
pub fn parse(data: &[u8]) -> Result<DnsMessage, DissectError> {
    DissectError::ensure("dns", data, HEADER_LEN)?;

    let id = u16::from_be_bytes([data[0], data[1]]);
    let flags = u16::from_be_bytes([data[2], data[3]]);
    let question_count = usize::from(u16::from_be_bytes([data[4], data[5]]));
    let answer_count = u16::from_be_bytes([data[6], data[7]]);

    if question_count > MAX_QUESTIONS {
        return Err(DissectError::Malformed {
            layer: "dns",
            reason: "implausible question count",
        });
    }

    let mut questions = Vec::with_capacity(question_count);
    let mut offset = HEADER_LEN;
    for _ in 0..question_count {
        let (name, next) = read_name(data, offset)?;
        DissectError::ensure("dns question", data, next + 4)?;
        questions.push(DnsQuestion {
            name,
            qtype: u16::from_be_bytes([data[next], data[next + 1]]),
            qclass: u16::from_be_bytes([data[next + 2], data[next + 3]]),
        });
        offset = next + 4;
    }

    Ok(DnsMessage {
        id,
        is_response: flags & 0x8000 != 0,
        opcode: ((flags >> 11) & 0x0f) as u8,
        rcode: (flags & 0x000f) as u8,
        questions,
        answer_count,
    })
}

/// Parses a DNS message carried over TCP (two-byte length prefix).
pub fn parse_tcp(data: &[u8]) -> Result<DnsMessage, DissectError> {
    DissectError::ensure("dns over tcp", data, 2)?;
    let length = usize::from(u16::from_be_bytes([data[0], data[1]]));
    let end = (2 + length).min(data.len());
    parse(&data[2..end])
}

/// Reads a possibly compressed name at `offset`. Returns the name and the
/// offset just past it in the original (uncompressed) position.
fn read_name(data: &[u8], offset: usize) -> Result<(Bytes, usize), DissectError> {
    let mut name = Vec::new();
    let mut position = offset;
    let mut resume_at = None;
    let mut hops = 0;

    loop {
        DissectError::ensure("dns name", data, position + 1)?;
        let len = data[position];
        match len & 0xc0 {
            0x00 if len == 0 => {
                position += 1;
                break;
            }
            0x00 => {
                let start = position + 1;
                let end = start + usize::from(len);
                DissectError::ensure("dns label", data, end)?;
                name.extend_from_slice(&data[start..end]);
                name.push(b'.');
                if name.len() > MAX_NAME_LEN {
                    return Err(DissectError::Malformed {
                        layer: "dns",
                        reason: "name longer than 255 bytes",
                    });
                }
                position = end;
            }
            0xc0 => {
                DissectError::ensure("dns pointer", data, position + 2)?;
                hops += 1;
                if hops > MAX_POINTER_HOPS {
                    return Err(DissectError::Malformed {
                        layer: "dns",
                        reason: "compression pointer loop",
                    });
                }
                resume_at.get_or_insert(position + 2);
                position = usize::from(u16::from_be_bytes([len & 0x3f, data[position + 1]]));
            }
            _ => {
                return Err(DissectError::Malformed {
                    layer: "dns",
                    reason: "reserved label type",
                })
            }
        }
    }

    if name.is_empty() {
        name.push(b'.');
    }
    Ok((Bytes::from(name), resume_at.unwrap_or(position)))
}
