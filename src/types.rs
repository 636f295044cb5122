//! Shared types and enums used across POLARPRO.
//! Includes sample layout (`BitDepth`, `ByteOrder`), resampling policy (`FillPolicy`)
//! and the render orientation flags (`OrientationConfig`).
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Width of one polar sample in the capture payload.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub enum BitDepth {
    U8,
    U16,
}

impl BitDepth {
    pub fn from_bits(bits: i64) -> Result<Self> {
        match bits {
            8 => Ok(BitDepth::U8),
            16 => Ok(BitDepth::U16),
            other => Err(Error::UnsupportedBitDepth(other)),
        }
    }

    pub fn bits(self) -> u32 {
        match self {
            BitDepth::U8 => 8,
            BitDepth::U16 => 16,
        }
    }

    pub fn bytes_per_sample(self) -> usize {
        match self {
            BitDepth::U8 => 1,
            BitDepth::U16 => 2,
        }
    }

    /// Largest representable sample, `2^bits - 1`.
    pub fn max_value(self) -> u16 {
        match self {
            BitDepth::U8 => u8::MAX as u16,
            BitDepth::U16 => u16::MAX,
        }
    }
}

impl std::fmt::Display for BitDepth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-bit", self.bits())
    }
}

/// Byte order of 16-bit samples.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub enum ByteOrder {
    /// Least-significant byte first.
    Lsb,
    /// Most-significant byte first.
    Msb,
}

impl ByteOrder {
    /// Parse the header form: `0`/`1` or one of the textual spellings.
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_uppercase().as_str() {
            "0" | "LSB" | "LE" | "LITTLE" => Some(ByteOrder::Lsb),
            "1" | "MSB" | "BE" | "BIG" => Some(ByteOrder::Msb),
            _ => None,
        }
    }

    pub fn read_u16(self, bytes: [u8; 2]) -> u16 {
        match self {
            ByteOrder::Lsb => u16::from_le_bytes(bytes),
            ByteOrder::Msb => u16::from_be_bytes(bytes),
        }
    }
}

impl std::fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ByteOrder::Lsb => write!(f, "LSB"),
            ByteOrder::Msb => write!(f, "MSB"),
        }
    }
}

/// How polar samples are transferred onto the Cartesian raster.
#[derive(
    Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum FillPolicy {
    /// Forward-map every sample to its nearest pixel; last write wins, gaps stay black.
    #[default]
    Scatter,
    /// Map every pixel back to its nearest sample; fills the gaps near the rim.
    Nearest,
}

impl std::fmt::Display for FillPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FillPolicy::Scatter => write!(f, "Scatter"),
            FillPolicy::Nearest => write!(f, "Nearest"),
        }
    }
}

/// Angular reference axis and sweep handedness of the render.
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct OrientationConfig {
    /// Azimuth 0 points up (north) instead of right (east).
    pub orient: bool,
    /// Azimuth increases clockwise instead of counter-clockwise.
    pub toggle_direction: bool,
}

impl OrientationConfig {
    pub fn new(orient: bool, toggle_direction: bool) -> Self {
        Self {
            orient,
            toggle_direction,
        }
    }

    /// Map a sweep angle (radians) to a screen angle measured counter-clockwise from +x.
    pub fn apply(self, theta: f64) -> f64 {
        let theta = if self.toggle_direction { -theta } else { theta };
        if self.orient {
            theta + std::f64::consts::FRAC_PI_2
        } else {
            theta
        }
    }

    /// Inverse of [`OrientationConfig::apply`].
    pub fn invert(self, screen: f64) -> f64 {
        let theta = if self.orient {
            screen - std::f64::consts::FRAC_PI_2
        } else {
            screen
        };
        if self.toggle_direction { -theta } else { theta }
    }
}
