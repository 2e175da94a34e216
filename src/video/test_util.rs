//! Synthetic inputs shared by the metric unit tests.

use crate::video::grid::FloatGrid;

/// A textured 8-bit-range pattern: smooth gradients plus sinusoidal detail,
/// so windowed statistics are nondegenerate everywhere.
pub fn test_pattern(rows: usize, cols: usize) -> FloatGrid {
    let mut data = Vec::with_capacity(rows * cols);
    for r in 0..rows {
        for c in 0..cols {
            let v = 96.0
                + 60.0 * (c as f32 * 0.7).sin()
                + 40.0 * (r as f32 * 0.35).cos()
                + (r + c) as f32 * 0.1;
            data.push(v.max(0.0).min(255.0));
        }
    }
    FloatGrid::from_data(rows, cols, data)
}

/// Adds deterministic zero-mean noise of the given amplitude to a copy of
/// `src`, clamped to the 8-bit range. The same seed yields the same noise
/// pattern at every amplitude, so degradation sweeps are strictly ordered.
pub fn noisy_copy(src: &FloatGrid, amplitude: f32, seed: u64) -> FloatGrid {
    let mut state = seed
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407);
    let data = src
        .data()
        .iter()
        .map(|&v| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            let unit = ((state >> 33) as f64 / (1u64 << 31) as f64 * 2.0 - 1.0) as f32;
            (v + unit * amplitude).max(0.0).min(255.0)
        })
        .collect();
    FloatGrid::from_data(src.rows(), src.cols(), data)
}
