//! 802.11 beacon and management frame extraction.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::error::DecodeError;
use crate::packet::{BeaconBody, MacAddr, Packet};

/// Position of the information element whose first byte is read as the
/// channel. Beacons normally carry SSID, supported rates and DS parameter
/// set in that order.
const CHANNEL_ELEMENT_INDEX: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BeaconInfo {
    pub ssid: String,
    pub bssid: MacAddr,
    pub power_constraint: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ManagementFrameInfo {
    pub subtype: u8,
    pub transmitter: MacAddr,
    pub receiver: MacAddr,
}

fn beacon_info(packet: &Packet) -> Result<(u8, BeaconInfo), DecodeError> {
    let frame = packet.dot11()?;
    let body = packet.beacon()?;
    let bssid = frame.bssid.ok_or(DecodeError::MissingField { field: "bssid" })?;
    let channel = body
        .elements
        .get(CHANNEL_ELEMENT_INDEX)
        .and_then(|e| e.data.first().copied())
        .ok_or(DecodeError::MissingField {
            field: "channel element",
        })?;
    let ssid = String::from_utf8_lossy(body.ssid().unwrap_or_default()).into_owned();
    let power_constraint = body
        .element(BeaconBody::ELEMENT_POWER_CONSTRAINT)
        .and_then(|e| e.data.first().copied());

    Ok((
        channel,
        BeaconInfo {
            ssid,
            bssid,
            power_constraint,
        },
    ))
}

/// Beacons grouped by channel, each group in capture order.
pub fn parse_beacon_frames<'a, I>(packets: I) -> BTreeMap<u8, Vec<BeaconInfo>>
where
    I: IntoIterator<Item = &'a Packet>,
{
    let mut channels: BTreeMap<u8, Vec<BeaconInfo>> = BTreeMap::new();
    for packet in packets.into_iter().filter(|p| p.beacon().is_ok()) {
        match beacon_info(packet) {
            Ok((channel, info)) => channels.entry(channel).or_default().push(info),
            Err(e) => debug!(timestamp_us = packet.timestamp_us, error = %e, "Skipping beacon"),
        }
    }
    channels
}

/// `(subtype, transmitter, receiver)` of every management frame.
pub fn parse_management_frames<'a, I>(packets: I) -> Vec<ManagementFrameInfo>
where
    I: IntoIterator<Item = &'a Packet>,
{
    packets
        .into_iter()
        .filter_map(|packet| packet.dot11().ok())
        .filter(|frame| frame.is_management())
        .filter_map(|frame| {
            Some(ManagementFrameInfo {
                subtype: frame.subtype,
                transmitter: frame.transmitter?,
                receiver: frame.receiver,
            })
        })
        .collect()
}
