//! sparhund-capture
//!
//! Provides the packet sources the analyzer reads from.
//! Only offline capture files (via pcap) and in-memory sequences are
//! implemented; live capture is out of scope.

pub mod error;
pub mod memory;
pub mod pcap_file;

use sparhund_core::Packet;

pub use error::CaptureError;
pub use memory::MemorySource;
pub use pcap_file::PcapFileSource;

/// Something that yields an ordered, fully decoded packet sequence.
pub trait PacketSource {
    /// Consumes the source and returns every packet in capture order.
    fn packets(self) -> Result<Vec<Packet>, CaptureError>;

    /// Name recorded as the report's `source` (the capture path for files).
    fn identifier(&self) -> String;
}
