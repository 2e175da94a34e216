//! Peak Signal-to-Noise Ratio metrics accounting for the Human Visual System.
//!
//! Humans perceive larger differences from certain factors of an image
//! compared to other factors. PSNR-HVS weighs the DCT-domain error by a
//! contrast sensitivity function; PSNR-HVS-M additionally discounts
//! differences hidden by between-coefficient contrast masking.
//!
//! See https://en.wikipedia.org/wiki/Peak_signal-to-noise_ratio for more details.

#[cfg(feature = "decode")]
use crate::video::decode::Decoder;
use crate::video::grid::FloatGrid;
use crate::video::pixel::Pixel;
use crate::video::{check_dimensions, FrameInfo, VideoMetric};
use crate::MetricsError;
use std::error::Error;

/// Calculates the average PSNR-HVS(-M) scores between two videos.
/// Higher is better.
#[cfg(feature = "decode")]
#[inline]
pub fn calculate_video_psnr_hvs<D: Decoder>(
    decoder1: &mut D,
    decoder2: &mut D,
    frame_limit: Option<usize>,
) -> Result<PsnrHvsScores, Box<dyn Error>> {
    let details = decoder1.get_video_details();
    PsnrHvs::new(details.height, details.width).process_video(decoder1, decoder2, frame_limit)
}

/// Calculates the PSNR-HVS(-M) scores between the luma planes of two video
/// frames. Higher is better.
#[inline]
pub fn calculate_frame_psnr_hvs<T: Pixel>(
    frame1: &FrameInfo<T>,
    frame2: &FrameInfo<T>,
) -> Result<PsnrHvsScores, Box<dyn Error>> {
    frame1.can_compare(frame2)?;
    let luma = &frame1.planes[0];
    let result = PsnrHvs::new(luma.height, luma.width).compute(
        &FloatGrid::from_plane(luma),
        &FloatGrid::from_plane(&frame2.planes[0]),
    )?;
    Ok(result)
}

/// The two scores produced by a PSNR-HVS measurement, in decibels.
///
/// Identical inputs produce the sentinel value `100000.0` rather than
/// infinity, for output compatibility with the reference implementation.
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PsnrHvsScores {
    /// CSF-weighted score without contrast masking.
    pub psnr_hvs: f64,
    /// CSF-weighted score with between-coefficient contrast masking.
    pub psnr_hvs_m: f64,
}

// Contrast sensitivity function weights per 8x8 DCT coefficient, and the
// masking weights derived from the normalized and squared JPEG luma
// quantization table. Literal published coefficients; do not retune.
#[rustfmt::skip]
const CSF: [[f64; 8]; 8] = [
    [1.608443, 2.339554, 2.573509, 1.608443, 1.072295, 0.643377, 0.504610, 0.421887],
    [2.144591, 2.144591, 1.838221, 1.354478, 0.989811, 0.443708, 0.428918, 0.467911],
    [1.838221, 1.979622, 1.608443, 1.072295, 0.643377, 0.451493, 0.372972, 0.459555],
    [1.838221, 1.513829, 1.169777, 0.887417, 0.504610, 0.295806, 0.321689, 0.415082],
    [1.429727, 1.169777, 0.695543, 0.459555, 0.378457, 0.236102, 0.249855, 0.334222],
    [1.072295, 0.735288, 0.467911, 0.402111, 0.317717, 0.247453, 0.227744, 0.279729],
    [0.525206, 0.402111, 0.329937, 0.295806, 0.249855, 0.212687, 0.214459, 0.254803],
    [0.357432, 0.279729, 0.270896, 0.262603, 0.229778, 0.257351, 0.249855, 0.259950],
];

#[rustfmt::skip]
const MASK: [[f64; 8]; 8] = [
    [0.390625, 0.826446, 1.000000, 0.390625, 0.173611, 0.062500, 0.038447, 0.026874],
    [0.694444, 0.694444, 0.510204, 0.277008, 0.147929, 0.029727, 0.027778, 0.033058],
    [0.510204, 0.591716, 0.390625, 0.173611, 0.062500, 0.030779, 0.021004, 0.031888],
    [0.510204, 0.346021, 0.206612, 0.118906, 0.038447, 0.013212, 0.015625, 0.026015],
    [0.308642, 0.206612, 0.073046, 0.031888, 0.021626, 0.008417, 0.009426, 0.016866],
    [0.173611, 0.081633, 0.033058, 0.024414, 0.015242, 0.009246, 0.007831, 0.011815],
    [0.041649, 0.024414, 0.016437, 0.013212, 0.009426, 0.006830, 0.006944, 0.009803],
    [0.019290, 0.011815, 0.011080, 0.010412, 0.007972, 0.010000, 0.009426, 0.010203],
];

/// PSNR-HVS / PSNR-HVS-M engine over non-overlapping 8×8 DCT blocks.
///
/// Frames whose dimensions are not multiples of 8 have their trailing
/// partial blocks skipped, while the error sums are still normalized by the
/// full frame area, matching the reference behavior.
#[derive(Debug, Clone, Copy)]
pub struct PsnrHvs {
    height: usize,
    width: usize,
}

impl PsnrHvs {
    /// Creates a PSNR-HVS engine for frames of the given dimensions.
    pub fn new(height: usize, width: usize) -> Self {
        PsnrHvs { height, width }
    }

    /// Computes the PSNR-HVS and PSNR-HVS-M scores between an original and a
    /// processed grid. PSNR-HVS-M is the primary score.
    pub fn compute(
        &self,
        original: &FloatGrid,
        processed: &FloatGrid,
    ) -> Result<PsnrHvsScores, MetricsError> {
        check_dimensions(self.height, self.width, original, processed)?;

        let basis = dct_basis();
        let mut s1 = 0.0f64;
        let mut s2 = 0.0f64;
        if self.height >= 8 && self.width >= 8 {
            for (y, x) in iproduct!(
                (0..=self.height - 8).step_by(8),
                (0..=self.width - 8).step_by(8)
            ) {
                let a = copy_block(original, y, x);
                let b = copy_block(processed, y, x);
                let a_dct = dct2_8x8(&basis, &a);
                let b_dct = dct2_8x8(&basis, &b);

                // Masking is driven by the busier of the two patches.
                let mask = maskeff(&a, &a_dct).max(maskeff(&b, &b_dct));

                for (k, l) in iproduct!(0..8, 0..8) {
                    let mut u = (a_dct[k * 8 + l] - b_dct[k * 8 + l]).abs();
                    s2 += (u * CSF[k][l]).powi(2);
                    // Every AC coefficient goes through the masking
                    // dead-zone; the DC term never does.
                    if k != 0 || l != 0 {
                        let threshold = mask / MASK[k][l];
                        u = if u < threshold { 0.0 } else { u - threshold };
                    }
                    s1 += (u * CSF[k][l]).powi(2);
                }
            }
        }

        let num = (self.height * self.width) as f64;
        s1 /= num;
        s2 /= num;
        Ok(PsnrHvsScores {
            psnr_hvs: to_db(s2),
            psnr_hvs_m: to_db(s1),
        })
    }
}

impl VideoMetric for PsnrHvs {
    type FrameResult = PsnrHvsScores;
    type VideoResult = PsnrHvsScores;

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
        Ok(PsnrHvsScores {
            psnr_hvs: metrics.iter().map(|m| m.psnr_hvs).sum::<f64>() / metrics.len() as f64,
            psnr_hvs_m: metrics.iter().map(|m| m.psnr_hvs_m).sum::<f64>() / metrics.len() as f64,
        })
    }
}

fn to_db(s: f64) -> f64 {
    if s <= f64::EPSILON {
        100000.0
    } else {
        10.0 * (255.0 * 255.0 / s).log10()
    }
}

fn copy_block(grid: &FloatGrid, y: usize, x: usize) -> [f64; 64] {
    let mut block = [0.0; 64];
    for i in 0..8 {
        let row = &grid.data()[(y + i) * grid.cols() + x..][..8];
        for j in 0..8 {
            block[i * 8 + j] = row[j] as f64;
        }
    }
    block
}

/// Orthonormal DCT-II basis: `basis[k][n] = c(k)·cos((2n+1)kπ/16)`.
fn dct_basis() -> [[f64; 8]; 8] {
    let mut basis = [[0.0; 8]; 8];
    for k in 0..8 {
        let scale = if k == 0 { (1.0f64 / 8.0).sqrt() } else { 0.5 };
        for n in 0..8 {
            basis[k][n] =
                scale * ((2 * n + 1) as f64 * k as f64 * std::f64::consts::PI / 16.0).cos();
        }
    }
    basis
}

/// Separable 2-D orthonormal DCT of one 8×8 block, the same transform as
/// Matlab's `dct2`.
fn dct2_8x8(basis: &[[f64; 8]; 8], block: &[f64; 64]) -> [f64; 64] {
    let mut rows = [0.0; 64];
    for r in 0..8 {
        for k in 0..8 {
            rows[r * 8 + k] = (0..8).map(|n| block[r * 8 + n] * basis[k][n]).sum();
        }
    }
    let mut out = [0.0; 64];
    for c in 0..8 {
        for k in 0..8 {
            out[k * 8 + c] = (0..8).map(|n| rows[n * 8 + c] * basis[k][n]).sum();
        }
    }
    out
}

/// Unbiased sample variance of a sub-block, scaled by the number of samples
/// (Matlab's `var(z(:)) * length(z(:))`).
fn vari(block: &[f64; 64], y0: usize, x0: usize, rows: usize, cols: usize) -> f64 {
    let n = (rows * cols) as f64;
    let mut sum = 0.0;
    let mut sum_sq = 0.0;
    for (i, j) in iproduct!(0..rows, 0..cols) {
        let v = block[(y0 + i) * 8 + x0 + j];
        sum += v;
        sum_sq += v * v;
    }
    let biased = sum_sq / n - (sum / n).powi(2);
    biased * n * n / (n - 1.0)
}

/// Masking strength of one patch: the MASK-weighted AC energy of its DCT,
/// scaled by how much of the patch's variance is concentrated in its four
/// 4×4 quadrants.
fn maskeff(block: &[f64; 64], dct: &[f64; 64]) -> f64 {
    let mut m = 0.0;
    for (k, l) in iproduct!(0..8, 0..8) {
        if k != 0 || l != 0 {
            m += dct[k * 8 + l].powi(2) * MASK[k][l];
        }
    }

    let mut pop = vari(block, 0, 0, 8, 8);
    if pop.abs() > f64::EPSILON {
        pop = (vari(block, 0, 0, 4, 4)
            + vari(block, 0, 4, 4, 4)
            + vari(block, 4, 4, 4, 4)
            + vari(block, 4, 0, 4, 4))
            / pop;
    }

    (m * pop).sqrt() / 32.0
}
