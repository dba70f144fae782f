//! Calibration parameters for the annular unwrap.
//!
//! A [`CalibrationModel`] describes the geometry of the fisheye source (frame
//! size, annulus centre, usable radius band, seam rotation) and the desired
//! panorama size. The model is mutable and carries no derived state; validity
//! is checked explicitly with [`CalibrationModel::validate`] before a
//! transformation table is generated from it.
//!
//! Calibrations can be persisted to YAML in the layout of
//! `samples/annular.yaml`:
//!
//! ```yaml
//! unwrap0:
//!   original_size: [640, 480]
//!   centre: [0.5, 0.5]
//!   radius: [0.25, 0.6]
//!   offset_angle_deg: 180.0
//!   unwrap_width: 800
//!   unwrap_height: 100
//! ```

use std::f64::consts::PI;
use std::fs;
use std::io::Write;

use log::debug;
use serde::{Deserialize, Serialize};
use yaml_rust::YamlLoader;

/// Errors raised by calibration validation and persistence.
#[derive(thiserror::Error, Debug)]
pub enum CalibrationError {
    /// The source frame size has not been set or is zero.
    #[error("original frame size must be positive, got {width}x{height}")]
    OriginalSizeInvalid { width: u32, height: u32 },
    /// The panorama width has not been set or is zero.
    #[error("unwrap width must be positive")]
    UnwrapWidthInvalid,
    /// The annulus centre lies outside the source frame.
    #[error("centre ({u}, {v}) must lie within [0, 1] x [0, 1]")]
    CentreOutOfRange { u: f64, v: f64 },
    /// The radius band is empty, reversed, or out of range.
    #[error("radius range [{min}, {max}] is invalid, need 0 <= min < max <= 1")]
    RadiusRangeInvalid { min: f64, max: f64 },
    /// The seam rotation is outside the accepted interval.
    #[error("offset angle {0} deg must lie within (-360, 360]")]
    OffsetAngleOutOfRange(f64),
    /// Any other invalid parameter combination.
    #[error("invalid calibration: {0}")]
    InvalidParams(String),
    /// Failure while parsing a calibration YAML file.
    #[error("failed to load YAML: {0}")]
    YamlError(String),
    /// Failure while reading or writing a calibration file.
    #[error("IO error: {0}")]
    IOError(String),
}

impl From<std::io::Error> for CalibrationError {
    fn from(err: std::io::Error) -> Self {
        CalibrationError::IOError(err.to_string())
    }
}

impl From<yaml_rust::ScanError> for CalibrationError {
    fn from(err: yaml_rust::ScanError) -> Self {
        CalibrationError::YamlError(err.to_string())
    }
}

/// Geometric parameters of the annular source and the panorama target.
///
/// All radial quantities are normalized: the centre is a fraction of the
/// source frame size and the radius band is a fraction of the half-frame.
/// A radius above `1/sqrt(2)` reaches outside a square frame; this is
/// accepted and absorbed by the clamp-to-edge sampling policy.
///
/// A freshly constructed model is invalid until the original size, the
/// radius band, and the unwrap width have been set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationModel {
    /// Source (fisheye) frame width in pixels.
    pub original_width: u32,
    /// Source (fisheye) frame height in pixels.
    pub original_height: u32,
    /// Normalized horizontal centre of the annulus, in [0, 1].
    pub u_centre: f64,
    /// Normalized vertical centre of the annulus, in [0, 1].
    pub v_centre: f64,
    /// Inner edge of the usable radius band, normalized.
    pub radius_min: f64,
    /// Outer edge of the usable radius band, normalized.
    pub radius_max: f64,
    /// Rotation applied to the seam of the unwrap, degrees in (-360, 360].
    pub offset_angle_deg: f64,
    /// Panorama width in pixels.
    pub unwrap_width: u32,
    /// Panorama height in pixels; derived from the radius band when `None`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unwrap_height: Option<u32>,
}

impl Default for CalibrationModel {
    fn default() -> Self {
        CalibrationModel {
            original_width: 0,
            original_height: 0,
            u_centre: 0.5,
            v_centre: 0.5,
            radius_min: 0.0,
            radius_max: 0.0,
            offset_angle_deg: 0.0,
            unwrap_width: 0,
            unwrap_height: None,
        }
    }
}

impl CalibrationModel {
    /// Creates a model with nothing set; invalid until configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the source frame dimensions. Call again if the capture format
    /// changes.
    pub fn set_original_size(&mut self, width: u32, height: u32) {
        self.original_width = width;
        self.original_height = height;
    }

    /// Sets the normalized annulus centre.
    pub fn set_centre(&mut self, u: f64, v: f64) {
        self.u_centre = u;
        self.v_centre = v;
    }

    /// Sets the usable radius band.
    pub fn set_radius_range(&mut self, min: f64, max: f64) {
        self.radius_min = min;
        self.radius_max = max;
    }

    /// Sets the seam rotation in degrees.
    pub fn set_offset_angle(&mut self, degrees: f64) {
        self.offset_angle_deg = degrees;
    }

    /// Sets the panorama width.
    pub fn set_unwrap_width(&mut self, width: u32) {
        self.unwrap_width = width;
    }

    /// Sets an explicit panorama height, overriding the derived value.
    pub fn set_unwrap_height(&mut self, height: u32) {
        self.unwrap_height = Some(height);
    }

    /// Checks every field, reporting the first one that is missing or out
    /// of range.
    pub fn validate(&self) -> Result<(), CalibrationError> {
        if self.original_width == 0 || self.original_height == 0 {
            return Err(CalibrationError::OriginalSizeInvalid {
                width: self.original_width,
                height: self.original_height,
            });
        }
        if self.unwrap_width == 0 {
            return Err(CalibrationError::UnwrapWidthInvalid);
        }
        if !self.u_centre.is_finite()
            || !self.v_centre.is_finite()
            || !(0.0..=1.0).contains(&self.u_centre)
            || !(0.0..=1.0).contains(&self.v_centre)
        {
            return Err(CalibrationError::CentreOutOfRange {
                u: self.u_centre,
                v: self.v_centre,
            });
        }
        if !self.radius_min.is_finite()
            || !self.radius_max.is_finite()
            || self.radius_min < 0.0
            || self.radius_max > 1.0
            || self.radius_min >= self.radius_max
        {
            return Err(CalibrationError::RadiusRangeInvalid {
                min: self.radius_min,
                max: self.radius_max,
            });
        }
        if !self.offset_angle_deg.is_finite()
            || self.offset_angle_deg <= -360.0
            || self.offset_angle_deg > 360.0
        {
            return Err(CalibrationError::OffsetAngleOutOfRange(
                self.offset_angle_deg,
            ));
        }
        if let Some(h) = self.unwrap_height {
            if h == 0 {
                return Err(CalibrationError::InvalidParams(
                    "unwrap height must be positive".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Returns `true` when [`validate`](Self::validate) succeeds.
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// The panorama height used for table generation.
    ///
    /// When no explicit height is set, it is derived from the aspect of the
    /// radius band: the band's thickness over its mean circumference,
    /// `unwrap_width * (max - min) / (pi * (max + min))`, at least one row.
    pub fn effective_unwrap_height(&self) -> u32 {
        match self.unwrap_height {
            Some(h) => h,
            None => {
                let circumference = PI * (self.radius_max + self.radius_min);
                if circumference <= 0.0 {
                    return 1;
                }
                let span = self.radius_max - self.radius_min;
                let derived = (self.unwrap_width as f64 * span / circumference).round();
                debug!("derived unwrap height {derived} from radius band");
                (derived as u32).max(1)
            }
        }
    }

    /// Loads a calibration from a YAML file.
    ///
    /// Expects an `unwrap0` node holding `original_size`, `centre`, `radius`,
    /// `offset_angle_deg`, `unwrap_width` and an optional `unwrap_height`.
    /// The loaded model is validated before being returned.
    pub fn load_from_yaml(path: &str) -> Result<Self, CalibrationError> {
        let contents = fs::read_to_string(path)?;
        let docs = YamlLoader::load_from_str(&contents)?;

        if docs.is_empty() {
            return Err(CalibrationError::YamlError(
                "empty YAML document".to_string(),
            ));
        }

        let node = &docs[0]["unwrap0"];
        if node.is_badvalue() {
            return Err(CalibrationError::YamlError(
                "missing 'unwrap0' node".to_string(),
            ));
        }

        let (original_width, original_height) = parse_u32_pair(node, "original_size")?;
        let (u_centre, v_centre) = parse_f64_pair(node, "centre")?;
        let (radius_min, radius_max) = parse_f64_pair(node, "radius")?;

        let offset_angle_deg = match &node["offset_angle_deg"] {
            y if y.is_badvalue() => 0.0,
            y => as_f64(y).ok_or_else(|| {
                CalibrationError::YamlError("invalid 'offset_angle_deg': not a float".to_string())
            })?,
        };

        let unwrap_width = node["unwrap_width"].as_i64().ok_or_else(|| {
            CalibrationError::YamlError("missing or invalid 'unwrap_width'".to_string())
        })? as u32;

        let unwrap_height = match &node["unwrap_height"] {
            y if y.is_badvalue() => None,
            y => Some(y.as_i64().ok_or_else(|| {
                CalibrationError::YamlError("invalid 'unwrap_height': not an integer".to_string())
            })? as u32),
        };

        let model = CalibrationModel {
            original_width,
            original_height,
            u_centre,
            v_centre,
            radius_min,
            radius_max,
            offset_angle_deg,
            unwrap_width,
            unwrap_height,
        };
        model.validate()?;
        Ok(model)
    }

    /// Saves the calibration to a YAML file in the format accepted by
    /// [`load_from_yaml`](Self::load_from_yaml).
    pub fn save_to_yaml(&self, path: &str) -> Result<(), CalibrationError> {
        let mut node = serde_yaml::Mapping::new();
        node.insert(
            "original_size".into(),
            serde_yaml::to_value(vec![self.original_width, self.original_height])
                .map_err(|e| CalibrationError::YamlError(e.to_string()))?,
        );
        node.insert(
            "centre".into(),
            serde_yaml::to_value(vec![self.u_centre, self.v_centre])
                .map_err(|e| CalibrationError::YamlError(e.to_string()))?,
        );
        node.insert(
            "radius".into(),
            serde_yaml::to_value(vec![self.radius_min, self.radius_max])
                .map_err(|e| CalibrationError::YamlError(e.to_string()))?,
        );
        node.insert("offset_angle_deg".into(), self.offset_angle_deg.into());
        node.insert("unwrap_width".into(), self.unwrap_width.into());
        if let Some(h) = self.unwrap_height {
            node.insert("unwrap_height".into(), h.into());
        }

        let mut root = serde_yaml::Mapping::new();
        root.insert("unwrap0".into(), serde_yaml::Value::Mapping(node));

        let yaml_string = serde_yaml::to_string(&serde_yaml::Value::Mapping(root))
            .map_err(|e| CalibrationError::YamlError(e.to_string()))?;

        if let Some(parent) = std::path::Path::new(path).parent() {
            fs::create_dir_all(parent).map_err(|e| CalibrationError::IOError(e.to_string()))?;
        }
        let mut file =
            fs::File::create(path).map_err(|e| CalibrationError::IOError(e.to_string()))?;
        file.write_all(yaml_string.as_bytes())
            .map_err(|e| CalibrationError::IOError(e.to_string()))?;
        Ok(())
    }
}

// yaml-rust reads integers and floats as distinct scalar types.
fn as_f64(yaml: &yaml_rust::Yaml) -> Option<f64> {
    yaml.as_f64().or_else(|| yaml.as_i64().map(|v| v as f64))
}

fn parse_f64_pair(
    node: &yaml_rust::Yaml,
    key: &str,
) -> Result<(f64, f64), CalibrationError> {
    let values = node[key].as_vec().ok_or_else(|| {
        CalibrationError::YamlError(format!("missing '{key}' array"))
    })?;
    if values.len() < 2 {
        return Err(CalibrationError::YamlError(format!(
            "'{key}' must have 2 elements, got {}",
            values.len()
        )));
    }
    let a = as_f64(&values[0])
        .ok_or_else(|| CalibrationError::YamlError(format!("invalid '{key}[0]': not a float")))?;
    let b = as_f64(&values[1])
        .ok_or_else(|| CalibrationError::YamlError(format!("invalid '{key}[1]': not a float")))?;
    Ok((a, b))
}

fn parse_u32_pair(
    node: &yaml_rust::Yaml,
    key: &str,
) -> Result<(u32, u32), CalibrationError> {
    let values = node[key].as_vec().ok_or_else(|| {
        CalibrationError::YamlError(format!("missing '{key}' array"))
    })?;
    if values.len() < 2 {
        return Err(CalibrationError::YamlError(format!(
            "'{key}' must have 2 elements, got {}",
            values.len()
        )));
    }
    let a = values[0]
        .as_i64()
        .ok_or_else(|| CalibrationError::YamlError(format!("invalid '{key}[0]': not an integer")))?;
    let b = values[1]
        .as_i64()
        .ok_or_else(|| CalibrationError::YamlError(format!("invalid '{key}[1]': not an integer")))?;
    Ok((a as u32, b as u32))
}
