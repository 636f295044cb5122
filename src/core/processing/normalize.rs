use ndarray::Array2;

use crate::io::samples::SampleGrid;
use crate::types::BitDepth;

/// Linearly scale a sample from `0..=2^bits-1` to `0..=255`, rounding half up.
#[inline]
pub fn to_display(value: u16, bit_depth: BitDepth) -> u8 {
    let max = bit_depth.max_value() as u32;
    let v = (value as u32).min(max);
    ((v * 255 + max / 2) / max) as u8
}

/// Display intensities for the whole grid, same shape as the samples.
pub fn display_grid(grid: &SampleGrid) -> Array2<u8> {
    let depth = grid.bit_depth();
    grid.samples().mapv(|v| to_display(v, depth))
}
