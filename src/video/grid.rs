//! 2-D floating point sample grids and the "valid"-mode Gaussian filter
//! shared by the windowed metrics.

use crate::video::pixel::{CastFromPrimitive, Pixel};
use crate::video::PlaneData;

/// A 2-D grid of `f32` samples in row-major order.
///
/// Metrics operate on grids derived from 8-bit luma planes, so the sample
/// range is conceptually `[0, 255]`, stored as floating point so that
/// filtered intermediates keep their precision.
#[derive(Clone, Debug)]
pub struct FloatGrid {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl FloatGrid {
    /// Creates a zero-filled grid of the given dimensions.
    pub fn new(rows: usize, cols: usize) -> Self {
        FloatGrid {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Builds a grid from existing row-major samples.
    pub fn from_data(rows: usize, cols: usize, data: Vec<f32>) -> Self {
        assert_eq!(data.len(), rows * cols);
        FloatGrid { rows, cols, data }
    }

    /// Converts a pixel plane into a float grid.
    pub fn from_plane<T: Pixel>(plane: &PlaneData<T>) -> Self {
        FloatGrid {
            rows: plane.height,
            cols: plane.width,
            data: plane
                .data
                .iter()
                .map(|pix| u32::cast_from(*pix) as f32)
                .collect(),
        }
    }

    /// The number of rows in this grid.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// The number of columns in this grid.
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// The raw samples in row-major order.
    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    #[cfg(test)]
    #[inline]
    pub(crate) fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    #[inline]
    pub(crate) fn row(&self, r: usize) -> &[f32] {
        &self.data[r * self.cols..][..self.cols]
    }

    /// Applies a function to every sample, yielding a new grid.
    pub fn map<F: Fn(f32) -> f32>(&self, f: F) -> FloatGrid {
        FloatGrid {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }

    /// Combines two same-size grids samplewise, yielding a new grid.
    pub fn zip_map<F: Fn(f32, f32) -> f32>(&self, other: &FloatGrid, f: F) -> FloatGrid {
        assert_eq!(self.rows, other.rows);
        assert_eq!(self.cols, other.cols);
        FloatGrid {
            rows: self.rows,
            cols: self.cols,
            data: izip!(&self.data, &other.data).map(|(&a, &b)| f(a, b)).collect(),
        }
    }

    /// Samplewise product of two same-size grids.
    pub fn multiply(&self, other: &FloatGrid) -> FloatGrid {
        self.zip_map(other, |a, b| a * b)
    }

    /// Mean of all samples, accumulated in double precision.
    pub fn mean(&self) -> f64 {
        self.data.iter().map(|&v| v as f64).sum::<f64>() / self.data.len() as f64
    }
}

/// Builds a normalized 1-D Gaussian kernel of odd length `ksize`.
pub(crate) fn gaussian_kernel(ksize: usize, sigma: f64) -> Vec<f64> {
    assert!(ksize % 2 == 1);
    let center = (ksize / 2) as f64;
    let mut kernel: Vec<f64> = (0..ksize)
        .map(|i| (-(i as f64 - center).powi(2) / (2.0 * sigma * sigma)).exp())
        .collect();
    let sum: f64 = kernel.iter().sum();
    for v in &mut kernel {
        *v /= sum;
    }
    kernel
}

/// Smooths `src` with a `ksize`×`ksize` Gaussian of standard deviation
/// `sigma` and returns only the part of the correlation computed without
/// zero-padded edges, shrinking each dimension by `ksize - 1` (the same
/// output as Matlab's `filter2(window, src, 'valid')`).
///
/// `ksize` must be odd and must not exceed either dimension of `src`;
/// violating this is a caller bug, not a recoverable condition.
pub fn gaussian_blur_valid(src: &FloatGrid, ksize: usize, sigma: f64) -> FloatGrid {
    assert!(ksize <= src.rows && ksize <= src.cols);
    let kernel = gaussian_kernel(ksize, sigma);
    let out_rows = src.rows - (ksize - 1);
    let out_cols = src.cols - (ksize - 1);

    // Separable filter: horizontal pass over full rows, then vertical.
    let mut tmp = vec![0.0f32; src.rows * out_cols];
    for r in 0..src.rows {
        let row = src.row(r);
        for c in 0..out_cols {
            let acc: f64 = kernel
                .iter()
                .zip(&row[c..c + ksize])
                .map(|(&w, &v)| w * v as f64)
                .sum();
            tmp[r * out_cols + c] = acc as f32;
        }
    }
    let mut out = FloatGrid::new(out_rows, out_cols);
    for r in 0..out_rows {
        for c in 0..out_cols {
            let acc: f64 = kernel
                .iter()
                .enumerate()
                .map(|(k, &w)| w * tmp[(r + k) * out_cols + c] as f64)
                .sum();
            out.data[r * out_cols + c] = acc as f32;
        }
    }
    out
}

/// Resizes `src` to the given dimensions with bilinear interpolation,
/// sampling at pixel centers with replicated borders. With `out = in / 2`
/// this is the 2× decimation the multi-scale pyramid uses.
pub fn resize_bilinear(src: &FloatGrid, out_rows: usize, out_cols: usize) -> FloatGrid {
    let scale_y = src.rows as f64 / out_rows as f64;
    let scale_x = src.cols as f64 / out_cols as f64;
    let mut out = FloatGrid::new(out_rows, out_cols);
    for y in 0..out_rows {
        let fy = ((y as f64 + 0.5) * scale_y - 0.5).max(0.0);
        let y0 = (fy.floor() as usize).min(src.rows - 1);
        let y1 = (y0 + 1).min(src.rows - 1);
        let dy = fy - y0 as f64;
        for x in 0..out_cols {
            let fx = ((x as f64 + 0.5) * scale_x - 0.5).max(0.0);
            let x0 = (fx.floor() as usize).min(src.cols - 1);
            let x1 = (x0 + 1).min(src.cols - 1);
            let dx = fx - x0 as f64;
            let top = src.data[y0 * src.cols + x0] as f64 * (1.0 - dx)
                + src.data[y0 * src.cols + x1] as f64 * dx;
            let bottom = src.data[y1 * src.cols + x0] as f64 * (1.0 - dx)
                + src.data[y1 * src.cols + x1] as f64 * dx;
            out.data[y * out_cols + x] = (top * (1.0 - dy) + bottom * dy) as f32;
        }
    }
    out
}

/// Resizes `src` to the given dimensions by nearest-neighbor sampling.
/// With `out = in / 2` this keeps every other row and column, the
/// `ref(1:2:end, 1:2:end)` decimation of the VIF pyramid.
pub fn resize_nearest(src: &FloatGrid, out_rows: usize, out_cols: usize) -> FloatGrid {
    let scale_y = src.rows as f64 / out_rows as f64;
    let scale_x = src.cols as f64 / out_cols as f64;
    let mut out = FloatGrid::new(out_rows, out_cols);
    for y in 0..out_rows {
        let sy = ((y as f64 * scale_y) as usize).min(src.rows - 1);
        for x in 0..out_cols {
            let sx = ((x as f64 * scale_x) as usize).min(src.cols - 1);
            out.data[y * out_cols + x] = src.data[sy * src.cols + sx];
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gaussian_kernel_is_normalized() {
        let kernel = gaussian_kernel(11, 1.5);
        assert!((kernel.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        // Symmetric with the peak at the center.
        assert!((kernel[0] - kernel[10]).abs() < 1e-15);
        assert!(kernel[5] > kernel[4]);
    }

    #[test]
    fn valid_blur_shrinks_by_ksize_minus_one() {
        let src = FloatGrid::new(21, 21);
        let dst = gaussian_blur_valid(&src, 11, 1.5);
        assert_eq!(dst.rows(), 11);
        assert_eq!(dst.cols(), 11);
    }

    #[test]
    fn valid_blur_preserves_flat_grids() {
        let src = FloatGrid::from_data(16, 16, vec![128.0; 16 * 16]);
        let dst = gaussian_blur_valid(&src, 5, 1.0);
        assert_eq!(dst.rows(), 12);
        for &v in dst.data() {
            assert!((v - 128.0).abs() < 1e-4);
        }
    }

    #[test]
    fn bilinear_decimation_averages_quads() {
        // Even dimensions halved exactly: each output sample is the mean of
        // its 2x2 source quad.
        let mut src = FloatGrid::new(4, 4);
        src.data_mut().copy_from_slice(&[
            1.0, 3.0, 5.0, 7.0, //
            1.0, 3.0, 5.0, 7.0, //
            10.0, 10.0, 20.0, 20.0, //
            30.0, 30.0, 40.0, 40.0,
        ]);
        let dst = resize_bilinear(&src, 2, 2);
        assert_eq!(dst.data(), &[2.0, 6.0, 20.0, 30.0]);
    }

    #[test]
    fn nearest_decimation_keeps_even_indices() {
        let mut src = FloatGrid::new(2, 4);
        src.data_mut().copy_from_slice(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
        let dst = resize_nearest(&src, 1, 2);
        assert_eq!(dst.data(), &[1.0, 3.0]);
    }
}
