//! `vqmt` is a collection of full-reference video quality metrics.
//!
//! Every metric compares an original and a processed frame of identical
//! dimensions and yields one or two scalar scores for the luma plane.
//! Implemented metrics: SSIM, MS-SSIM, PSNR-HVS/PSNR-HVS-M and pixel-domain
//! VIF (VIFp).

#![allow(clippy::cast_lossless)]
#![allow(clippy::needless_range_loop)]
#![allow(clippy::unreadable_literal)]
#![deny(missing_docs)]

#[macro_use]
extern crate itertools;
#[macro_use]
extern crate thiserror;

pub mod video;

/// Possible errors that may occur during processing of a metric.
///
/// This enum may be added to in the future and should not be assumed to be exhaustive.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// Indicates an input file could not be read for some reason.
    #[error("Could not read input file: {reason}")]
    MalformedInput {
        #[doc(hidden)]
        reason: &'static str,
    },
    /// Indicates an input file could be read, but is not supported by the current metric.
    #[error("Input type not supported: {reason}")]
    UnsupportedInput {
        #[doc(hidden)]
        reason: &'static str,
    },
    /// Indicates two inputs did not have matching formats or resolutions.
    #[error("Input videos must have matching formats: {reason}")]
    InputMismatch {
        #[doc(hidden)]
        reason: &'static str,
    },
    /// Placeholder
    #[doc(hidden)]
    #[error("Unreachable")]
    NonExhaustive,
}
