//! # Sparhund Detection Engine
//!
//! Signature matching and the heuristic detectors that turn a decoded
//! packet sequence into [`Finding`]s.
//!
//! ### Key Submodules:
//! - `signatures`: Aho-Corasick matcher shared by the content detectors
//! - `detectors`: the seven detectors and the [`Detector`] trait
//! - `window`: sliding time-window peak counting
//! - `finding`: detector output types

pub mod decode;
pub mod detectors;
pub mod error;
pub mod finding;
pub mod signatures;
pub mod window;

pub use detectors::{default_detectors, Detector};
pub use error::DetectionError;
pub use finding::{Finding, FindingDetails};
pub use signatures::SignatureEngine;
