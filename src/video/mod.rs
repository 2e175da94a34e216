//! Contains the full-reference video/image quality metrics.

#[cfg(feature = "decode")]
pub mod decode;
pub mod grid;
mod pixel;
pub mod psnr_hvs;
pub mod ssim;
#[cfg(test)]
pub(crate) mod test_util;
pub mod vif;

use crate::MetricsError;
use std::error::Error;

#[cfg(feature = "decode")]
pub use decode::*;
pub use grid::FloatGrid;
pub use pixel::*;

use psnr_hvs::{PsnrHvs, PsnrHvsScores};
use ssim::{MsSsim, MsSsimScores, Ssim};
use vif::Vifp;

/// A container holding the data for one video frame. This includes all planes
/// of the video. Currently, only planar YUV/YCbCr format is supported.
#[derive(Clone, Debug)]
pub struct FrameInfo<T: Pixel> {
    /// A container holding three planes worth of video data.
    /// The indices in the array correspond to the following planes:
    ///
    /// - 0 - Y/Luma plane
    /// - 1 - U/Cb plane
    /// - 2 - V/Cr plane
    pub planes: [PlaneData<T>; 3],
    /// The number of bits per pixel.
    pub bit_depth: usize,
    /// The chroma sampling format of the video. Most videos are in 4:2:0 format.
    pub chroma_sampling: ChromaSampling,
}

impl<T: Pixel> FrameInfo<T> {
    pub(crate) fn can_compare(&self, other: &Self) -> Result<(), MetricsError> {
        if self.bit_depth != other.bit_depth {
            return Err(MetricsError::InputMismatch {
                reason: "Bit depths do not match",
            });
        }
        if self.bit_depth != 8 {
            return Err(MetricsError::UnsupportedInput {
                reason: "Only 8-bit input is supported",
            });
        }
        if self.chroma_sampling != other.chroma_sampling {
            return Err(MetricsError::InputMismatch {
                reason: "Chroma subsampling formats do not match",
            });
        }
        self.planes[0].can_compare(&other.planes[0])?;

        Ok(())
    }
}

/// Contains the data for one plane in a video frame. For chroma planes, this data is
/// represented in the original chroma sampling. E.g. if this is a 4:2:0 video clip,
/// the chroma planes will have half the resolution, in each dimension, of the luma
/// plane.
#[derive(Clone, Debug)]
pub struct PlaneData<T: Pixel> {
    /// The width, in pixels, of this plane.
    pub width: usize,
    /// The height, in pixels, of this plane.
    pub height: usize,
    /// A plane's pixels are contained in this `Vec`, in row-major order.
    /// A `u8` should be used for low-bit-depth video, and `u16` for high-bit-depth.
    pub data: Vec<T>,
}

impl<T: Pixel> PlaneData<T> {
    pub(crate) fn can_compare(&self, other: &Self) -> Result<(), MetricsError> {
        if self.width != other.width || self.height != other.height {
            return Err(MetricsError::InputMismatch {
                reason: "Video resolution does not match",
            });
        }

        Ok(())
    }
}

/// Available chroma sampling formats.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ChromaSampling {
    /// Both vertically and horizontally subsampled.
    Cs420,
    /// Horizontally subsampled.
    Cs422,
    /// Not subsampled.
    Cs444,
    /// Monochrome.
    Cs400,
}

impl Default for ChromaSampling {
    fn default() -> Self {
        ChromaSampling::Cs420
    }
}

impl ChromaSampling {
    /// Provides the amount to right shift the luma plane dimensions to get the
    ///  chroma plane dimensions.
    /// Only values 0 or 1 are ever returned.
    /// Cs400 returns None, as there are no chroma planes.
    #[cfg(feature = "decode")]
    pub(crate) fn get_decimation(self) -> Option<(usize, usize)> {
        use self::ChromaSampling::*;
        match self {
            Cs420 => Some((1, 1)),
            Cs422 => Some((1, 0)),
            Cs444 => Some((0, 0)),
            Cs400 => None,
        }
    }

    /// Calculates the size of a chroma plane for this sampling type, given the luma plane dimensions.
    #[cfg(feature = "decode")]
    pub(crate) fn get_chroma_dimensions(
        self,
        luma_width: usize,
        luma_height: usize,
    ) -> (usize, usize) {
        if let Some((ss_x, ss_y)) = self.get_decimation() {
            (luma_width >> ss_x, luma_height >> ss_y)
        } else {
            (0, 0)
        }
    }
}

/// The scores of every metric in this crate for one frame pair,
/// as returned by [`calculate_frame_metrics`](fn.calculate_frame_metrics.html).
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FrameMetrics {
    /// Single-scale structural similarity. Higher is better.
    pub ssim: f64,
    /// Multi-scale structural similarity scores. Higher is better.
    pub msssim: MsSsimScores,
    /// DCT-domain PSNR variants weighted for human contrast sensitivity.
    pub psnr_hvs: PsnrHvsScores,
    /// Pixel-domain visual information fidelity. Higher is better.
    pub vifp: f64,
}

/// Calculates every metric in this crate between two video frames.
///
/// The four engines are independent, so they run as parallel tasks on
/// the rayon thread pool.
pub fn calculate_frame_metrics<T: Pixel>(
    frame1: &FrameInfo<T>,
    frame2: &FrameInfo<T>,
) -> Result<FrameMetrics, Box<dyn Error>> {
    frame1.can_compare(frame2)?;

    let height = frame1.planes[0].height;
    let width = frame1.planes[0].width;
    let original = FloatGrid::from_plane(&frame1.planes[0]);
    let processed = FloatGrid::from_plane(&frame2.planes[0]);

    let mut ssim: Result<f64, MetricsError> = Ok(0.0);
    let mut msssim: Result<MsSsimScores, MetricsError> = Ok(MsSsimScores::default());
    let mut psnr_hvs: Result<PsnrHvsScores, MetricsError> = Ok(PsnrHvsScores::default());
    let mut vifp: Result<f64, MetricsError> = Ok(0.0);
    rayon::scope(|s| {
        s.spawn(|_| ssim = Ssim::new(height, width).compute(&original, &processed));
        s.spawn(|_| msssim = MsSsim::new(height, width).compute(&original, &processed));
        s.spawn(|_| psnr_hvs = PsnrHvs::new(height, width).compute(&original, &processed));
        s.spawn(|_| vifp = Vifp::new(height, width).compute(&original, &processed));
    });

    Ok(FrameMetrics {
        ssim: ssim?,
        msssim: msssim?,
        psnr_hvs: psnr_hvs?,
        vifp: vifp?,
    })
}

/// Engines are constructed for fixed dimensions; every grid pair they are
/// handed must match them exactly. Mismatches fail fast rather than being
/// silently truncated.
pub(crate) fn check_dimensions(
    height: usize,
    width: usize,
    original: &FloatGrid,
    processed: &FloatGrid,
) -> Result<(), MetricsError> {
    if original.rows() != height
        || original.cols() != width
        || processed.rows() != height
        || processed.cols() != width
    {
        return Err(MetricsError::InputMismatch {
            reason: "Grid dimensions do not match the metric's construction",
        });
    }
    Ok(())
}

trait VideoMetric {
    type FrameResult;
    type VideoResult;

    /// Generic method for internal use that processes multiple frames from a video
    /// into an aggregate metric.
    #[cfg(feature = "decode")]
    fn process_video<D: decode::Decoder>(
        &mut self,
        decoder1: &mut D,
        decoder2: &mut D,
        frame_limit: Option<usize>,
    ) -> Result<Self::VideoResult, Box<dyn Error>> {
        if decoder1.get_bit_depth() != decoder2.get_bit_depth() {
            return Err(Box::new(MetricsError::InputMismatch {
                reason: "Bit depths do not match",
            }));
        }
        if decoder1.get_bit_depth() > 8 {
            return Err(Box::new(MetricsError::UnsupportedInput {
                reason: "Only 8-bit input is supported",
            }));
        }

        let mut metrics = Vec::with_capacity(frame_limit.unwrap_or(0));
        let mut frame_no = 0;
        while frame_limit.map(|limit| limit > frame_no).unwrap_or(true) {
            let frame1 = decoder1.read_video_frame::<u8>();
            let frame2 = decoder2.read_video_frame::<u8>();
            if let (Some(frame1), Some(frame2)) = (frame1, frame2) {
                metrics.push(self.process_frame(&frame1, &frame2)?);
                frame_no += 1;
                continue;
            }
            // At end of video
            break;
        }
        if frame_no == 0 {
            return Err(MetricsError::UnsupportedInput {
                reason: "No readable frames found in one or more input files",
            }
            .into());
        }

        self.aggregate_frame_results(&metrics)
    }

    fn process_frame<T: Pixel>(
        &mut self,
        frame1: &FrameInfo<T>,
        frame2: &FrameInfo<T>,
    ) -> Result<Self::FrameResult, Box<dyn Error>>;

    #[cfg(feature = "decode")]
    fn aggregate_frame_results(
        &self,
        metrics: &[Self::FrameResult],
    ) -> Result<Self::VideoResult, Box<dyn Error>>;
}
