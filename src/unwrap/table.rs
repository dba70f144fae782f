//! Transformation-table generation.
//!
//! Maps every panorama pixel to the point in the annular source image it
//! samples from. For a destination pixel `(x, y)` the angular position around
//! the mirror is `theta = x / width * 2*pi + offset` and the radial position
//! interpolates linearly from the inner to the outer edge of the usable band.
//! The source coordinate is then
//!
//! ```text
//! src_x = u_centre * w + r * (w / 2) * cos(theta)
//! src_y = v_centre * h + r * (h / 2) * sin(theta)
//! ```
//!
//! with the radial term scaled per axis, so a circular mirror image stays
//! circular on a non-square frame. Generation is O(width * height), paid once
//! per calibration; applying the table per frame is pure arithmetic.

use std::f64::consts::PI;

use log::info;
use nalgebra::Vector2;

use crate::calibration::{CalibrationError, CalibrationModel};

/// Precomputed source sampling coordinates for every panorama pixel.
///
/// Immutable once generated. Entries are stored row-major and may be
/// fractional or outside the source frame; the resampler's clamp-to-edge
/// policy handles the latter. Identical calibrations always produce
/// bit-identical tables.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformationTable {
    unwrap_width: u32,
    unwrap_height: u32,
    source_width: u32,
    source_height: u32,
    entries: Vec<Vector2<f64>>,
}

impl TransformationTable {
    /// Generates the table for a calibration.
    ///
    /// Fails with the offending field's [`CalibrationError`] when the model
    /// is invalid; no table is produced in that case.
    pub fn generate(model: &CalibrationModel) -> Result<Self, CalibrationError> {
        model.validate()?;

        let unwrap_width = model.unwrap_width;
        let unwrap_height = model.effective_unwrap_height();
        let width = model.original_width as f64;
        let height = model.original_height as f64;
        let centre_x = model.u_centre * width;
        let centre_y = model.v_centre * height;
        let radius_span = model.radius_max - model.radius_min;
        let offset = model.offset_angle_deg.to_radians();

        // theta only depends on the column, so the trig is hoisted out of
        // the row loop.
        let column_trig: Vec<(f64, f64)> = (0..unwrap_width)
            .map(|x| {
                let theta = (x as f64 / unwrap_width as f64) * 2.0 * PI + offset;
                (theta.cos(), theta.sin())
            })
            .collect();

        let mut entries =
            Vec::with_capacity(unwrap_width as usize * unwrap_height as usize);
        for y in 0..unwrap_height {
            let radius_fraction =
                model.radius_min + radius_span * (y as f64 / unwrap_height as f64);
            let radial_x = radius_fraction * (width / 2.0);
            let radial_y = radius_fraction * (height / 2.0);
            for &(cos_theta, sin_theta) in &column_trig {
                entries.push(Vector2::new(
                    centre_x + radial_x * cos_theta,
                    centre_y + radial_y * sin_theta,
                ));
            }
        }

        info!(
            "generated {}x{} transformation table for {}x{} source",
            unwrap_width, unwrap_height, model.original_width, model.original_height
        );

        Ok(TransformationTable {
            unwrap_width,
            unwrap_height,
            source_width: model.original_width,
            source_height: model.original_height,
            entries,
        })
    }

    /// Panorama width in pixels.
    pub fn unwrap_width(&self) -> u32 {
        self.unwrap_width
    }

    /// Panorama height in pixels.
    pub fn unwrap_height(&self) -> u32 {
        self.unwrap_height
    }

    /// Source frame width the table was generated for.
    pub fn source_width(&self) -> u32 {
        self.source_width
    }

    /// Source frame height the table was generated for.
    pub fn source_height(&self) -> u32 {
        self.source_height
    }

    /// The source sampling coordinate for destination pixel `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the panorama dimensions.
    pub fn entry(&self, x: u32, y: u32) -> Vector2<f64> {
        assert!(x < self.unwrap_width && y < self.unwrap_height);
        self.entries[(y * self.unwrap_width + x) as usize]
    }

    /// One destination row of sampling coordinates.
    pub(crate) fn row(&self, y: usize) -> &[Vector2<f64>] {
        let w = self.unwrap_width as usize;
        &self.entries[y * w..(y + 1) * w]
    }
}
