//! Digitizer orchestration.
//!
//! Modules
//! - [`params`]: configuration types used by the digitizer and configs.
//! - `pipeline`: the main [`EcgDigitizer`] implementation.

pub mod params;
mod pipeline;

pub use params::DigitizerParams;
pub use pipeline::EcgDigitizer;
