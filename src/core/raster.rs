//! Cartesian output raster.
use ndarray::Array2;

/// Square-or-rectangular 8-bit display raster indexed `[row, col]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartesianRaster {
    pixels: Array2<u8>,
}

impl CartesianRaster {
    pub fn from_pixels(pixels: Array2<u8>) -> Self {
        Self { pixels }
    }

    /// Build from row-major bytes; `None` if the length does not match.
    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Option<Self> {
        Array2::from_shape_vec((height, width), data)
            .ok()
            .map(Self::from_pixels)
    }

    pub fn width(&self) -> usize {
        self.pixels.ncols()
    }

    pub fn height(&self) -> usize {
        self.pixels.nrows()
    }

    /// Geometric centre pixel as `(col, row)`.
    pub fn center(&self) -> (usize, usize) {
        (self.width() / 2, self.height() / 2)
    }

    pub fn get(&self, col: usize, row: usize) -> Option<u8> {
        self.pixels.get((row, col)).copied()
    }

    pub fn pixels(&self) -> &Array2<u8> {
        &self.pixels
    }

    /// Row-major copy of the pixel data.
    pub fn to_raw(&self) -> Vec<u8> {
        self.pixels.iter().copied().collect()
    }
}
