//! DNS query-name extraction.

use tracing::debug;

use crate::error::DecodeError;
use crate::packet::Packet;

/// Name of the first question in the packet's DNS message, decoded as
/// strict UTF-8.
pub fn dns_query_name(packet: &Packet) -> Result<String, DecodeError> {
    let question = packet
        .dns()?
        .first_question()
        .ok_or(DecodeError::MissingField {
            field: "dns question",
        })?;
    std::str::from_utf8(&question.name)
        .map(str::to_owned)
        .map_err(|source| DecodeError::InvalidUtf8 {
            field: "dns query name",
            source,
        })
}

/// Query names of every DNS packet, in capture order.
///
/// Packets without a question or with a name that is not valid UTF-8 are
/// dropped; the rest of the sequence is still extracted.
pub fn extract_dns_query_names<'a, I>(packets: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a Packet>,
{
    packets
        .into_iter()
        .filter(|packet| packet.dns().is_ok())
        .filter_map(|packet| match dns_query_name(packet) {
            Ok(name) => Some(name),
            Err(e) => {
                debug!(timestamp_us = packet.timestamp_us, error = %e, "Skipping DNS packet");
                None
            }
        })
        .collect()
}
