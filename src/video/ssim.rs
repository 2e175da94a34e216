//! Structural Similarity index.
//!
//! The SSIM index is a full reference metric; in other words, the measurement
//! or prediction of image quality is based on an initial uncompressed or
//! distortion-free image as reference. SSIM is designed to improve on
//! traditional methods such as peak signal-to-noise ratio (PSNR) and mean
//! squared error (MSE).
//!
//! See https://en.wikipedia.org/wiki/Structural_similarity for more details.

#[cfg(feature = "decode")]
use crate::video::decode::Decoder;
use crate::video::grid::{gaussian_blur_valid, resize_bilinear, FloatGrid};
use crate::video::pixel::Pixel;
use crate::video::{check_dimensions, FrameInfo, VideoMetric};
use crate::MetricsError;
use std::error::Error;

// (0.01 * 255)^2 and (0.03 * 255)^2, fixed for 8-bit luma.
const SSIM_C1: f32 = 6.5025;
const SSIM_C2: f32 = 58.5225;

const KERNEL_SIZE: usize = 11;
const KERNEL_SIGMA: f64 = 1.5;

/// Calculates the average SSIM score between two videos. Higher is better.
#[cfg(feature = "decode")]
#[inline]
pub fn calculate_video_ssim<D: Decoder>(
    decoder1: &mut D,
    decoder2: &mut D,
    frame_limit: Option<usize>,
) -> Result<f64, Box<dyn Error>> {
    let details = decoder1.get_video_details();
    Ssim::new(details.height, details.width).process_video(decoder1, decoder2, frame_limit)
}

/// Calculates the SSIM score between the luma planes of two video frames.
/// Higher is better.
#[inline]
pub fn calculate_frame_ssim<T: Pixel>(
    frame1: &FrameInfo<T>,
    frame2: &FrameInfo<T>,
) -> Result<f64, Box<dyn Error>> {
    frame1.can_compare(frame2)?;
    let luma = &frame1.planes[0];
    let result = Ssim::new(luma.height, luma.width).compute(
        &FloatGrid::from_plane(luma),
        &FloatGrid::from_plane(&frame2.planes[0]),
    )?;
    Ok(result)
}

/// Single-scale SSIM engine over sliding 11×11 Gaussian windows.
///
/// The engine is constructed for fixed frame dimensions and holds no other
/// state; it may be reused for any number of frame pairs of that size.
#[derive(Debug, Clone, Copy)]
pub struct Ssim {
    height: usize,
    width: usize,
}

impl Ssim {
    /// Creates an SSIM engine for frames of the given dimensions.
    pub fn new(height: usize, width: usize) -> Self {
        Ssim { height, width }
    }

    /// Computes the SSIM index between an original and a processed grid.
    ///
    /// Both grids must match the engine's construction dimensions, which must
    /// be at least 11×11 for the windowed maps to be nonempty.
    pub fn compute(
        &self,
        original: &FloatGrid,
        processed: &FloatGrid,
    ) -> Result<f64, MetricsError> {
        check_dimensions(self.height, self.width, original, processed)?;
        Ok(ssim_map_means(original, processed).0)
    }
}

impl VideoMetric for Ssim {
    type FrameResult = f64;
    type VideoResult = f64;

    fn process_frame<T: Pixel>(
        &mut self,
        frame1: &FrameInfo<T>,
        frame2: &FrameInfo<T>,
    ) -> Result<Self::FrameResult, Box<dyn Error>> {
        frame1.can_compare(frame2)?;
        let result = self.compute(
            &FloatGrid::from_plane(&frame1.planes[0]),
            &FloatGrid::from_plane(&frame2.planes[0]),
        )?;
        Ok(result)
    }

    #[cfg(feature = "decode")]
    fn aggregate_frame_results(
        &self,
        metrics: &[Self::FrameResult],
    ) -> Result<Self::VideoResult, Box<dyn Error>> {
        Ok(metrics.iter().sum::<f64>() / metrics.len() as f64)
    }
}

/// Calculates the average MS-SSIM score between two videos. Higher is better.
///
/// MS-SSIM is a variant of SSIM computed over subsampled versions
/// of an image. It is designed to be a more accurate metric
/// than SSIM.
#[cfg(feature = "decode")]
#[inline]
pub fn calculate_video_msssim<D: Decoder>(
    decoder1: &mut D,
    decoder2: &mut D,
    frame_limit: Option<usize>,
) -> Result<MsSsimScores, Box<dyn Error>> {
    let details = decoder1.get_video_details();
    MsSsim::new(details.height, details.width).process_video(decoder1, decoder2, frame_limit)
}

/// Calculates the MS-SSIM score between the luma planes of two video frames.
/// Higher is better.
#[inline]
pub fn calculate_frame_msssim<T: Pixel>(
    frame1: &FrameInfo<T>,
    frame2: &FrameInfo<T>,
) -> Result<MsSsimScores, Box<dyn Error>> {
    frame1.can_compare(frame2)?;
    let luma = &frame1.planes[0];
    let result = MsSsim::new(luma.height, luma.width).compute(
        &FloatGrid::from_plane(luma),
        &FloatGrid::from_plane(&frame2.planes[0]),
    )?;
    Ok(result)
}

/// The two scores produced by an MS-SSIM measurement.
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MsSsimScores {
    /// Finest-scale (single-scale) SSIM score.
    pub ssim: f64,
    /// Weighted multi-scale score.
    pub msssim: f64,
}

const NLEVS: usize = 5;

// These come from the original MS-SSIM implementation paper:
// https://ece.uwaterloo.ca/~z70wang/publications/msssim.pdf
// They don't add up to exactly 1 due to rounding done in the paper.
const MS_WEIGHT: [f64; NLEVS] = [0.0448, 0.2856, 0.3001, 0.2363, 0.1333];

/// Multi-scale SSIM engine over a 5-level downsampled pyramid.
///
/// Dimensions must survive four halvings with room for the 11×11 window at
/// every level, i.e. `min(height, width) >= 160`; this is a documented caller
/// precondition, not a runtime check.
#[derive(Debug, Clone, Copy)]
pub struct MsSsim {
    height: usize,
    width: usize,
}

impl MsSsim {
    /// Creates an MS-SSIM engine for frames of the given dimensions.
    pub fn new(height: usize, width: usize) -> Self {
        MsSsim { height, width }
    }

    /// Computes the MS-SSIM score between an original and a processed grid,
    /// along with the finest-scale SSIM score.
    pub fn compute(
        &self,
        original: &FloatGrid,
        processed: &FloatGrid,
    ) -> Result<MsSsimScores, MetricsError> {
        check_dimensions(self.height, self.width, original, processed)?;

        let mut mssim = [0.0; NLEVS];
        let mut mcs = [0.0; NLEVS];
        let mut im1 = original.clone();
        let mut im2 = processed.clone();
        for level in 0..NLEVS {
            let res = ssim_map_means(&im1, &im2);
            mssim[level] = res.0;
            mcs[level] = res.1;

            if level < NLEVS - 1 {
                let rows = im1.rows() / 2;
                let cols = im1.cols() / 2;
                im1 = resize_bilinear(&im1, rows, cols);
                im2 = resize_bilinear(&im2, rows, cols);
            }
        }

        // The coarsest scale contributes its full SSIM score; every finer
        // scale contributes only its contrast-structure mean, raised to the
        // published weight.
        let mut msssim = mssim[NLEVS - 1];
        for level in 0..NLEVS - 1 {
            msssim *= mcs[level].powf(MS_WEIGHT[level]);
        }

        Ok(MsSsimScores {
            ssim: mssim[0],
            msssim,
        })
    }
}

impl VideoMetric for MsSsim {
    type FrameResult = MsSsimScores;
    type VideoResult = MsSsimScores;

    fn process_frame<T: Pixel>(
        &mut self,
        frame1: &FrameInfo<T>,
        frame2: &FrameInfo<T>,
    ) -> Result<Self::FrameResult, Box<dyn Error>> {
        frame1.can_compare(frame2)?;
        let result = self.compute(
            &FloatGrid::from_plane(&frame1.planes[0]),
            &FloatGrid::from_plane(&frame2.planes[0]),
        )?;
        Ok(result)
    }

    #[cfg(feature = "decode")]
    fn aggregate_frame_results(
        &self,
        metrics: &[Self::FrameResult],
    ) -> Result<Self::VideoResult, Box<dyn Error>> {
        Ok(MsSsimScores {
            ssim: metrics.iter().map(|m| m.ssim).sum::<f64>() / metrics.len() as f64,
            msssim: metrics.iter().map(|m| m.msssim).sum::<f64>() / metrics.len() as f64,
        })
    }
}

/// Computes the mean of the windowed SSIM map and of the contrast-structure
/// map for one grid pair. This is the routine both the single-scale and the
/// multi-scale engine are built on.
///
/// Local variances keep whatever sign finite-precision filtering gives them;
/// SSIM deliberately does not clamp them, unlike VIF.
pub(crate) fn ssim_map_means(img1: &FloatGrid, img2: &FloatGrid) -> (f64, f64) {
    let mu1 = gaussian_blur_valid(img1, KERNEL_SIZE, KERNEL_SIGMA);
    let mu2 = gaussian_blur_valid(img2, KERNEL_SIZE, KERNEL_SIGMA);
    let xx = gaussian_blur_valid(&img1.multiply(img1), KERNEL_SIZE, KERNEL_SIGMA);
    let yy = gaussian_blur_valid(&img2.multiply(img2), KERNEL_SIZE, KERNEL_SIGMA);
    let xy = gaussian_blur_valid(&img1.multiply(img2), KERNEL_SIZE, KERNEL_SIGMA);

    let mut ssim_sum = 0.0f64;
    let mut cs_sum = 0.0f64;
    for (&m1, &m2, &xx, &yy, &xy) in izip!(mu1.data(), mu2.data(), xx.data(), yy.data(), xy.data())
    {
        let mu1_sq = m1 * m1;
        let mu2_sq = m2 * m2;
        let mu1_mu2 = m1 * m2;
        let sigma1_sq = xx - mu1_sq;
        let sigma2_sq = yy - mu2_sq;
        let sigma12 = xy - mu1_mu2;

        let cs = (2.0 * sigma12 + SSIM_C2) / (sigma1_sq + sigma2_sq + SSIM_C2);
        let ssim = cs * (2.0 * mu1_mu2 + SSIM_C1) / (mu1_sq + mu2_sq + SSIM_C1);
        cs_sum += cs as f64;
        ssim_sum += ssim as f64;
    }

    let count = (mu1.rows() * mu1.cols()) as f64;
    (ssim_sum / count, cs_sum / count)
}
