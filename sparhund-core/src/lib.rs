//! # sparhund-core
//!
//! Foundation layer shared by every Sparhund crate.
//!
//! ### Key Submodules:
//! - `packet`: layered, capability-tagged packet model
//! - `classifier`: pure filters and field extractors over packet sequences
//! - `range`: IPv4 address ranges with selectable comparison
//! - `error`: `FieldAbsent` and `DecodeError`
//!
//! Nothing in this crate performs I/O. Packets are decoded elsewhere
//! (`sparhund-protocols`) and are never mutated once built.

pub mod builder;
pub mod classifier;
pub mod error;
pub mod packet;
pub mod range;

pub mod prelude {
    pub use crate::builder::PacketBuilder;
    pub use crate::classifier::*;
    pub use crate::error::*;
    pub use crate::packet::*;
    pub use crate::range::*;
}

pub use error::{DecodeError, FieldAbsent};
pub use builder::PacketBuilder;
pub use packet::{MacAddr, Packet, Protocol, TcpFlags};
pub use range::{AddressRange, RangeComparison};
