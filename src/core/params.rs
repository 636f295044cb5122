use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{FillPolicy, OrientationConfig};

/// Render parameters suitable for config files and CLI presets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderParams {
    /// Azimuth 0 points up instead of right
    pub orient: bool,
    /// Azimuth increases clockwise instead of counter-clockwise
    pub toggle_direction: bool,
    pub fill: FillPolicy,
    /// Distance per output pixel; None means one pixel per range bin
    pub pixel_size: Option<f64>,
    /// Distance added to every range bin
    pub range_offset: f64,
    /// Prepend the blind zone derived from the capture's sampling delay, drawn at full intensity
    pub blind_range: bool,
    /// Extra clockwise rotation of the whole image, degrees
    pub rotation_deg: f64,
    /// Also rotate by the heading stored in the capture header (`BO2RA`)
    pub heading_from_header: bool,
}

impl Default for RenderParams {
    fn default() -> Self {
        Self {
            orient: false,
            toggle_direction: false,
            fill: FillPolicy::Scatter,
            pixel_size: None,
            range_offset: 0.0,
            blind_range: false,
            rotation_deg: 0.0,
            heading_from_header: false,
        }
    }
}

impl RenderParams {
    pub fn from_orientation(orientation: OrientationConfig) -> Self {
        Self {
            orient: orientation.orient,
            toggle_direction: orientation.toggle_direction,
            ..Self::default()
        }
    }

    pub fn orientation(&self) -> OrientationConfig {
        OrientationConfig::new(self.orient, self.toggle_direction)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let params: Self = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(size) = self.pixel_size {
            if !(size.is_finite() && size > 0.0) {
                return Err(Error::InvalidArgument {
                    arg: "pixel_size",
                    value: size.to_string(),
                });
            }
        }
        if !(self.range_offset.is_finite() && self.range_offset >= 0.0) {
            return Err(Error::InvalidArgument {
                arg: "range_offset",
                value: self.range_offset.to_string(),
            });
        }
        if !self.rotation_deg.is_finite() {
            return Err(Error::InvalidArgument {
                arg: "rotation_deg",
                value: self.rotation_deg.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let params = RenderParams::from_json_str(r#"{ "orient": true, "fill": "nearest" }"#).unwrap();
        assert!(params.orient);
        assert!(!params.toggle_direction);
        assert_eq!(params.fill, FillPolicy::Nearest);
        assert_eq!(params.pixel_size, None);
        assert!(!params.heading_from_header);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(RenderParams::from_json_str(r#"{ "pixel_size": 0.0 }"#).is_err());
        assert!(RenderParams::from_json_str(r#"{ "range_offset": -1.0 }"#).is_err());
        assert!(RenderParams::from_json_str(r#"{ "fill": "bilinear" }"#).is_err());
    }
}
