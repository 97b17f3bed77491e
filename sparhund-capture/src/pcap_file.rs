//! Offline capture reader built on `pcap::Capture::from_file`.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use pcap::{Capture, PacketHeader};
use sparhund_core::Packet;
use sparhund_protocols::{dissect, Linktype};
use tracing::{debug, info};

use crate::{CaptureError, PacketSource};

/// Reads a pcap (or pcapng, where libpcap supports it) file from disk.
#[derive(Debug, Clone)]
pub struct PcapFileSource {
    path: PathBuf,
}

impl PcapFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn decode_failure(&self, source: pcap::Error) -> CaptureError {
        CaptureError::DecodeFailure {
            path: self.path.display().to_string(),
            source,
        }
    }
}

impl PacketSource for PcapFileSource {
    fn packets(self) -> Result<Vec<Packet>, CaptureError> {
        let mut capture = Capture::from_file(&self.path).map_err(|e| self.decode_failure(e))?;
        let linktype = Linktype::from_raw(capture.get_datalink().0);
        if let Linktype::Unsupported(raw) = linktype {
            debug!(linktype = raw, "Unsupported link type, packets keep no decoded layers");
        }

        let mut packets = Vec::new();
        let mut partial = 0usize;
        loop {
            match capture.next_packet() {
                Ok(frame) => {
                    let mut dissected = dissect(
                        linktype,
                        timestamp_us(frame.header),
                        Bytes::copy_from_slice(frame.data),
                    );
                    dissected.packet.wire_length = frame.header.len as usize;
                    if let Some(error) = dissected.error {
                        partial += 1;
                        debug!(index = packets.len(), %error, "Partially dissected frame");
                    }
                    packets.push(dissected.packet);
                }
                Err(pcap::Error::NoMorePackets) => break,
                Err(error) => return Err(self.decode_failure(error)),
            }
        }

        info!(
            path = %self.path.display(),
            packets = packets.len(),
            partial,
            "Capture loaded"
        );
        Ok(packets)
    }

    /// The capture path exactly as it was given.
    fn identifier(&self) -> String {
        self.path.display().to_string()
    }
}

fn timestamp_us(header: &PacketHeader) -> u64 {
    let seconds = u64::try_from(header.ts.tv_sec).unwrap_or(0);
    let micros = u64::try_from(header.ts.tv_usec).unwrap_or(0);
    seconds * 1_000_000 + micros
}
