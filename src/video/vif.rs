//! Pixel-domain Visual Information Fidelity.
//!
//! VIF models the distortion between the two images as a linear
//! gain-plus-noise channel per local window, on every level of a
//! four-scale Gaussian pyramid, and compares the information that survives
//! the channel against the information in the reference.
//!
//! See https://en.wikipedia.org/wiki/Visual_Information_Fidelity for more
//! details.

#[cfg(feature = "decode")]
use crate::video::decode::Decoder;
use crate::video::grid::{gaussian_blur_valid, resize_nearest, FloatGrid};
use crate::video::pixel::Pixel;
use crate::video::{check_dimensions, FrameInfo, VideoMetric};
use crate::MetricsError;
use std::error::Error;

/// Assumed noise variance of the visual channel model.
const SIGMA_NSQ: f64 = 2.0;
const NLEVS: usize = 4;
const EPSILON: f32 = 1e-10;

/// Calculates the average VIFp score between two videos. Higher is better.
#[cfg(feature = "decode")]
#[inline]
pub fn calculate_video_vifp<D: Decoder>(
    decoder1: &mut D,
    decoder2: &mut D,
    frame_limit: Option<usize>,
) -> Result<f64, Box<dyn Error>> {
    let details = decoder1.get_video_details();
    Vifp::new(details.height, details.width).process_video(decoder1, decoder2, frame_limit)
}

/// Calculates the VIFp score between the luma planes of two video frames.
/// Higher is better.
#[inline]
pub fn calculate_frame_vifp<T: Pixel>(
    frame1: &FrameInfo<T>,
    frame2: &FrameInfo<T>,
) -> Result<f64, Box<dyn Error>> {
    frame1.can_compare(frame2)?;
    let luma = &frame1.planes[0];
    let result = Vifp::new(luma.height, luma.width).compute(
        &FloatGrid::from_plane(luma),
        &FloatGrid::from_plane(&frame2.planes[0]),
    )?;
    Ok(result)
}

/// Pixel-domain VIF engine over a four-scale Gaussian pyramid.
///
/// Unlike SSIM, VIF is directional: the first argument of `compute` is the
/// reference and the second the distorted image, and swapping them changes
/// the score.
#[derive(Debug, Clone, Copy)]
pub struct Vifp {
    height: usize,
    width: usize,
}

impl Vifp {
    /// Creates a VIFp engine for frames of the given dimensions.
    pub fn new(height: usize, width: usize) -> Self {
        Vifp { height, width }
    }

    /// Computes the VIFp score of `processed` against `original`.
    ///
    /// An identical pair scores 1.0; scores fall towards 0.0 as information
    /// is lost. If the reference has zero local variance everywhere on every
    /// scale the denominator of the final ratio is 0 and the result is not a
    /// finite number; guarding against such degenerate input is the caller's
    /// responsibility.
    pub fn compute(
        &self,
        original: &FloatGrid,
        processed: &FloatGrid,
    ) -> Result<f64, MetricsError> {
        check_dimensions(self.height, self.width, original, processed)?;

        let mut num = 0.0;
        let mut den = 0.0;
        let mut ref_grid = original.clone();
        let mut dist_grid = processed.clone();
        for scale in 0..NLEVS {
            // Window sizes 17, 9, 5, 3.
            let n = (2 << (NLEVS - scale - 1)) + 1;
            if scale > 0 {
                let sigma = n as f64 / 5.0;
                let blurred_ref = gaussian_blur_valid(&ref_grid, n, sigma);
                let blurred_dist = gaussian_blur_valid(&dist_grid, n, sigma);
                let rows = blurred_ref.rows() / 2;
                let cols = blurred_ref.cols() / 2;
                ref_grid = resize_nearest(&blurred_ref, rows, cols);
                dist_grid = resize_nearest(&blurred_dist, rows, cols);
            }
            accumulate_scale(&ref_grid, &dist_grid, n, &mut num, &mut den);
        }

        Ok(num / den)
    }
}

impl VideoMetric for Vifp {
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

/// Adds one scale's information sums to the running totals.
fn accumulate_scale(
    ref_grid: &FloatGrid,
    dist_grid: &FloatGrid,
    n: usize,
    num: &mut f64,
    den: &mut f64,
) {
    let sigma = n as f64 / 5.0;
    let mu1 = gaussian_blur_valid(ref_grid, n, sigma);
    let mu2 = gaussian_blur_valid(dist_grid, n, sigma);
    let xx = gaussian_blur_valid(&ref_grid.multiply(ref_grid), n, sigma);
    let yy = gaussian_blur_valid(&dist_grid.multiply(dist_grid), n, sigma);
    let xy = gaussian_blur_valid(&ref_grid.multiply(dist_grid), n, sigma);

    // Local variances are floored at zero here; numerical noise below zero
    // would otherwise leak into the channel model.
    let mut sigma1_sq: Vec<f32> = izip!(xx.data(), mu1.data())
        .map(|(&xx, &m)| (xx - m * m).max(0.0))
        .collect();
    let sigma2_sq: Vec<f32> = izip!(yy.data(), mu2.data())
        .map(|(&yy, &m)| (yy - m * m).max(0.0))
        .collect();
    let sigma12: Vec<f32> = izip!(xy.data(), mu1.data(), mu2.data())
        .map(|(&xy, &m1, &m2)| xy - m1 * m2)
        .collect();

    let mut g: Vec<f32> = izip!(&sigma12, &sigma1_sq)
        .map(|(&s12, &s1)| s12 / (s1 + EPSILON))
        .collect();
    let mut sv_sq: Vec<f32> = izip!(&sigma2_sq, &g, &sigma12)
        .map(|(&s2, &g, &s12)| s2 - g * s12)
        .collect();

    // Degenerate windows are fixed up in three ordered passes.
    // No signal in the reference window:
    for (s1, g, sv, &s2) in izip!(&mut sigma1_sq, &mut g, &mut sv_sq, &sigma2_sq) {
        if *s1 <= EPSILON {
            *g = 0.0;
            *sv = s2;
            *s1 = 0.0;
        }
    }
    // No signal in the distorted window either:
    for (&s2, g, sv) in izip!(&sigma2_sq, &mut g, &mut sv_sq) {
        if s2 <= EPSILON {
            *g = 0.0;
            *sv = 0.0;
        }
    }
    // A non-positive gain carries no information:
    for (g, sv, &s2) in izip!(&mut g, &mut sv_sq, &sigma2_sq) {
        if *g <= 0.0 {
            *sv = s2;
            *g = 0.0;
        }
    }

    for (&g, &sv, &s1) in izip!(&g, &sv_sq, &sigma1_sq) {
        let sv = sv.max(EPSILON) as f64;
        *num += (1.0 + (g as f64).powi(2) * s1 as f64 / (sv + SIGMA_NSQ)).log10();
        *den += (1.0 + s1 as f64 / SIGMA_NSQ).log10();
    }
}
