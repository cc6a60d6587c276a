#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod config;
pub mod diagnostics;
pub mod digitizer;
pub mod error;
pub mod image;
pub mod types;

// Stage modules: public, but considered unstable internals.
pub mod extract;
pub mod grid;
pub mod layout;
pub mod preprocess;
pub mod quality;
pub mod reconstruct;

// --- High-level re-exports -------------------------------------------------

// Main entry points: digitizer + results.
pub use crate::digitizer::{DigitizerParams, EcgDigitizer};
pub use crate::error::DigitizeError;
pub use crate::types::{DigitizationResult, GridCalibration, LeadName, Waveform};

// High-level diagnostics returned by the digitizer.
pub use crate::diagnostics::{DigitizationReport, DigitizationTrace};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
pub mod prelude {
    pub use crate::digitizer::{DigitizerParams, EcgDigitizer};
    pub use crate::error::DigitizeError;
    pub use crate::types::{DigitizationResult, LeadName, Waveform};
}
