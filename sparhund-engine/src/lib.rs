//! # sparhund-engine
//!
//! Runs the classifier and the detectors over one capture and assembles the
//! resulting [`Report`].
//!
//! ### Key Submodules:
//! - `analyzer`: sequential and fan-out/fan-in analysis pipelines
//! - `report`: the report value and its builder
//! - `error`: `EngineError`

pub mod analyzer;
pub mod error;
pub mod report;

pub use analyzer::Analyzer;
pub use error::EngineError;
pub use report::{PacketCategory, Report, ReportBuilder};
