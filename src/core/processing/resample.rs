//! Polar to Cartesian resampling.
//!
//! Ray `i` sits at sweep angle `i * 360 / azimuths`, range bin `j` at distance
//! `range_offset + (blind + j) * range_resolution`, where `blind` is the number of bins
//! hidden by the sampling delay (0 unless requested). Blind bins are drawn at full intensity. Screen angles are measured counter-clockwise
//! from +x with y pointing up; the raster row axis points down.
//!
//! Two fill policies share the geometry:
//! - `Scatter` projects every sample forward to its nearest pixel in `(azimuth, range)`
//!   scan order. Later samples overwrite earlier ones and unwritten pixels stay 0.
//!   This is the reference output and the default.
//! - `Nearest` walks every pixel, inverts the projection and takes the closest sample,
//!   so the sparse rim has no gaps.
use std::f64::consts::TAU;

use ndarray::Array2;
use tracing::{debug, info, warn};

use crate::core::params::RenderParams;
use crate::core::processing::normalize::display_grid;
use crate::core::raster::CartesianRaster;
use crate::error::{Error, Result};
use crate::io::polar::PolarImage;
use crate::types::{FillPolicy, OrientationConfig};

/// Upper bound on the raster side, pixels.
pub const MAX_SIDE: usize = 16_384;

/// Display intensity of the blind zone near the antenna.
pub const BLIND_ZONE_INTENSITY: u8 = u8::MAX;

/// Mapping between polar indices and raster pixels for one render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterGeometry {
    pub azimuth_count: usize,
    pub range_count: usize,
    /// Pixels per range bin.
    pub scale: f64,
    /// Pixels added to every radius.
    pub offset: f64,
    /// Blind bins drawn before range bin 0.
    pub blind_bins: usize,
    pub orientation: OrientationConfig,
    /// Clockwise rotation, radians.
    pub rotation: f64,
    /// Raster side length, pixels.
    pub side: usize,
    /// Centre pixel index along both axes.
    pub center: usize,
}

impl RasterGeometry {
    pub fn new(image: &PolarImage, params: &RenderParams) -> Result<Self> {
        params.validate()?;
        let grid = image.grid();
        let (azimuth_count, range_count) = (grid.azimuth_count(), grid.range_count());
        if azimuth_count == 0 || range_count == 0 {
            return Err(Error::EmptySampleGrid {
                azimuths: azimuth_count,
                ranges: range_count,
            });
        }

        let resolution = image.range_resolution();
        let pixel_size = params.pixel_size.unwrap_or(resolution);
        let blind_bins = if params.blind_range {
            image.blind_bins().unwrap_or_else(|| {
                warn!("Blind range requested but SDRNG/SFREQ are missing; ignoring");
                0
            })
        } else {
            0
        };
        let mut rotation_deg = params.rotation_deg;
        if params.heading_from_header {
            match image.heading_deg() {
                Some(heading) => rotation_deg += heading,
                None => warn!("Heading requested but BO2RA is missing; ignoring"),
            }
        }
        let scale = resolution / pixel_size;
        let offset = params.range_offset / pixel_size;

        let bins = blind_bins.saturating_add(range_count);
        let extent = (offset + bins as f64 * scale).ceil();
        if !extent.is_finite() || extent * 2.0 > MAX_SIDE as f64 {
            return Err(Error::InvalidArgument {
                arg: "pixel_size",
                value: format!("{} gives a raster wider than {} pixels", pixel_size, MAX_SIDE),
            });
        }
        let extent = (extent as usize).max(1);

        Ok(Self {
            azimuth_count,
            range_count,
            scale,
            offset,
            blind_bins,
            orientation: params.orientation(),
            rotation: rotation_deg.to_radians(),
            side: 2 * extent,
            center: extent,
        })
    }

    fn azimuth_step(&self) -> f64 {
        TAU / self.azimuth_count as f64
    }

    /// Screen angle of ray `azimuth`.
    fn screen_angle(&self, azimuth: usize) -> f64 {
        self.orientation.apply(azimuth as f64 * self.azimuth_step()) - self.rotation
    }

    fn bin_count(&self) -> usize {
        self.blind_bins.saturating_add(self.range_count)
    }

    /// Radius of drawn bin `bin`, counting blind bins first.
    fn radius(&self, bin: usize) -> f64 {
        self.offset + bin as f64 * self.scale
    }

    fn place(&self, dx: f64, dy: f64) -> Option<(usize, usize)> {
        let col = self.center as f64 + dx.round();
        let row = self.center as f64 - dy.round();
        let limit = self.side as f64;
        if col < 0.0 || row < 0.0 || col >= limit || row >= limit {
            return None;
        }
        Some((col as usize, row as usize))
    }

    /// Target pixel `(col, row)` of sample `(azimuth, range)`, `None` if it falls outside.
    pub fn project(&self, azimuth: usize, range: usize) -> Option<(usize, usize)> {
        let (sin, cos) = self.screen_angle(azimuth).sin_cos();
        let r = self.radius(self.blind_bins.saturating_add(range));
        self.place(r * cos, r * sin)
    }

    /// Nearest sample `(azimuth, range)` for pixel `(col, row)`, `None` inside the blind
    /// zone or beyond the last bin.
    pub fn unproject(&self, col: usize, row: usize) -> Option<(usize, usize)> {
        let (azimuth, bin) = self.locate(col, row)?;
        let range = bin.checked_sub(self.blind_bins)?;
        Some((azimuth, range))
    }

    /// Nearest `(azimuth, drawn bin)` for pixel `(col, row)`.
    fn locate(&self, col: usize, row: usize) -> Option<(usize, usize)> {
        let dx = col as f64 - self.center as f64;
        let dy = self.center as f64 - row as f64;
        let bin = ((dx.hypot(dy) - self.offset) / self.scale).round();
        if bin < 0.0 || bin >= self.bin_count() as f64 {
            return None;
        }
        let sweep = self.orientation.invert(dy.atan2(dx) + self.rotation);
        let ray = (sweep / self.azimuth_step()).round() as i64;
        let azimuth = ray.rem_euclid(self.azimuth_count as i64) as usize;
        Some((azimuth, bin as usize))
    }
}

/// Render a polar image onto a square Cartesian raster.
pub fn polar_to_cartesian(image: &PolarImage, params: &RenderParams) -> Result<CartesianRaster> {
    let geometry = RasterGeometry::new(image, params)?;
    let intensities = display_grid(image.grid());
    let mut pixels = Array2::<u8>::zeros((geometry.side, geometry.side));

    match params.fill {
        FillPolicy::Scatter => scatter(&geometry, &intensities, &mut pixels),
        FillPolicy::Nearest => gather(&geometry, &intensities, &mut pixels),
    }

    info!(
        "Rendered {}x{} polar grid to {}x{} raster ({} fill, orient={}, toggle_direction={}, blind bins={})",
        geometry.azimuth_count,
        geometry.range_count,
        geometry.side,
        geometry.side,
        params.fill,
        params.orient,
        params.toggle_direction,
        geometry.blind_bins
    );
    Ok(CartesianRaster::from_pixels(pixels))
}

fn scatter(geometry: &RasterGeometry, intensities: &Array2<u8>, pixels: &mut Array2<u8>) {
    let mut dropped = 0usize;
    for azimuth in 0..geometry.azimuth_count {
        let (sin, cos) = geometry.screen_angle(azimuth).sin_cos();
        for bin in 0..geometry.bin_count() {
            let r = geometry.radius(bin);
            match geometry.place(r * cos, r * sin) {
                Some((col, row)) => {
                    pixels[[row, col]] = bin_intensity(geometry, intensities, azimuth, bin)
                }
                None => dropped += 1,
            }
        }
    }
    if dropped > 0 {
        debug!("Dropped {} samples outside the raster", dropped);
    }
}

fn bin_intensity(
    geometry: &RasterGeometry,
    intensities: &Array2<u8>,
    azimuth: usize,
    bin: usize,
) -> u8 {
    match bin.checked_sub(geometry.blind_bins) {
        Some(range) => intensities[[azimuth, range]],
        None => BLIND_ZONE_INTENSITY,
    }
}

fn gather(geometry: &RasterGeometry, intensities: &Array2<u8>, pixels: &mut Array2<u8>) {
    for ((row, col), px) in pixels.indexed_iter_mut() {
        if let Some((azimuth, bin)) = geometry.locate(col, row) {
            *px = bin_intensity(geometry, intensities, azimuth, bin);
        }
    }
}
