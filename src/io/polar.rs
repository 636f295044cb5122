//! `PolarImage`: a decoded capture, owning its header and sample grid.
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{Error, Result};
use crate::io::directory::AttributeDirectory;
use crate::io::header::{AttributeValue, Header, HeaderLayout, decode_header};
use crate::io::samples::{SampleGrid, decode_samples};

/// Speed of light used for range gate conversions, m/s.
const SPEED_OF_LIGHT: f64 = 3.0e8;

/// Range gate length of the 40 MHz sampling clock, metres.
const GATE_40MHZ: f64 = 3.75;

#[derive(Debug, Clone, PartialEq)]
pub struct PolarImage {
    header: Header,
    layout: HeaderLayout,
    grid: SampleGrid,
    source: Option<PathBuf>,
}

impl PolarImage {
    /// Read and decode a capture file using the built-in attribute directory.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_directory(path, AttributeDirectory::builtin())
    }

    pub fn open_with_directory(path: &Path, directory: &AttributeDirectory) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let mut image = Self::from_bytes(&bytes, directory)?;
        image.source = Some(path.to_path_buf());
        info!(
            "Processed {:?}: {} rays x {} range bins",
            path.file_name().unwrap_or(path.as_os_str()),
            image.grid.azimuth_count(),
            image.grid.range_count()
        );
        Ok(image)
    }

    /// Decode a capture held in memory.
    pub fn from_bytes(bytes: &[u8], directory: &AttributeDirectory) -> Result<Self> {
        let header = decode_header(bytes, directory)?;
        let layout = header.layout()?;
        let offset = header.payload_offset().unwrap_or(bytes.len()).min(bytes.len());
        let grid = decode_samples(&layout, &bytes[offset..])?;
        Ok(Self {
            header,
            layout,
            grid,
            source: None,
        })
    }

    /// Assemble an image from already decoded parts. The grid shape must match the layout.
    pub fn from_parts(header: Header, grid: SampleGrid) -> Result<Self> {
        let layout = header.layout()?;
        if layout.azimuth_count != grid.azimuth_count() || layout.range_count != grid.range_count()
        {
            return Err(Error::InvalidArgument {
                arg: "grid",
                value: format!(
                    "{}x{} does not match declared {}x{}",
                    grid.azimuth_count(),
                    grid.range_count(),
                    layout.azimuth_count,
                    layout.range_count
                ),
            });
        }
        if layout.bit_depth != grid.bit_depth().bits() as i64 {
            return Err(Error::InvalidArgument {
                arg: "grid",
                value: format!(
                    "{} samples but header declares {} bits",
                    grid.bit_depth(),
                    layout.bit_depth
                ),
            });
        }
        Ok(Self {
            header,
            layout,
            grid,
            source: None,
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn layout(&self) -> &HeaderLayout {
        &self.layout
    }

    pub fn grid(&self) -> &SampleGrid {
        &self.grid
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Case-insensitive attribute value lookup.
    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.header.value(name)
    }

    /// Description of an attribute present in this header.
    pub fn describe(&self, name: &str) -> Option<&str> {
        self.header.describe(name)
    }

    /// Angular step between rays, degrees.
    pub fn azimuth_step_deg(&self) -> f64 {
        if self.layout.azimuth_count == 0 {
            0.0
        } else {
            360.0 / self.layout.azimuth_count as f64
        }
    }

    /// Distance covered by one range bin.
    pub fn range_resolution(&self) -> f64 {
        self.layout.range_resolution
    }

    /// Range bins hidden by the sampling delay (`SDRNG`): two bins for every started range
    /// gate of the sampling clock (`SFREQ`, MHz). `None` when either is absent.
    pub fn blind_bins(&self) -> Option<usize> {
        let delay = self.header.number("SDRNG")?;
        let freq_mhz = self.header.number("SFREQ").filter(|f| *f > 0.0)?;
        let gate = if freq_mhz == 40.0 {
            GATE_40MHZ
        } else {
            SPEED_OF_LIGHT / (2.0 * freq_mhz * 1e6)
        };
        Some(((delay.max(0.0) / gate).ceil() as usize).saturating_mul(2))
    }

    /// Distance covered by [`blind_bins`](Self::blind_bins) at this capture's range resolution.
    pub fn blind_range(&self) -> Option<f64> {
        Some(self.blind_bins()? as f64 * self.layout.range_resolution)
    }

    /// Sweep rotation from the bow-to-radar angle, `2 * BO2RA` in whole degrees.
    pub fn heading_deg(&self) -> Option<f64> {
        self.header.number("BO2RA").map(|angle| (2.0 * angle).trunc())
    }

    /// Release the image into its header and grid.
    pub fn into_parts(self) -> (Header, SampleGrid) {
        (self.header, self.grid)
    }
}
