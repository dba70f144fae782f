//! The unwrap façade and its supporting pieces.
//!
//! [`Unwrapper`] owns a [`CalibrationModel`](crate::CalibrationModel) and the
//! [`TransformationTable`] generated from it, and walks a small state
//! machine:
//!
//! ```text
//! Unconfigured --setters--> Configured --generate_transformation--> Ready
//!                               ^                                     |
//!                               +----------- any setter --------------+
//! ```
//!
//! Any calibration change drops the table, so a stale mapping can never be
//! applied to a frame; resampling before a table exists is an error, not
//! garbage output.

use image::{ImageBuffer, Pixel};

use crate::calibration::{CalibrationError, CalibrationModel};

pub mod resample;
pub mod table;

pub use resample::{resample_frame, resample_frame_par, Interpolation};
pub use table::TransformationTable;

/// Errors raised while applying a transformation.
#[derive(thiserror::Error, Debug)]
pub enum UnwrapError {
    /// The calibration is missing or invalid.
    #[error("invalid calibration: {0}")]
    Calibration(#[from] CalibrationError),
    /// The frame does not match the source size the table was generated for.
    #[error(
        "frame size {actual_width}x{actual_height} does not match the \
         {expected_width}x{expected_height} source the table was generated for"
    )]
    DimensionMismatch {
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },
    /// `unwrap_frame` was called before a table was generated.
    #[error("no transformation table, call generate_transformation() first")]
    NotReady,
}

/// Lifecycle state of an [`Unwrapper`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnwrapperState {
    /// The calibration is incomplete; nothing can be generated yet.
    Unconfigured,
    /// The calibration is valid but no table has been generated for it.
    Configured,
    /// A table exists for the current calibration and can be applied.
    Ready,
}

/// Owns a calibration and the transformation generated from it.
#[derive(Debug, Clone)]
pub struct Unwrapper {
    model: CalibrationModel,
    interpolation: Interpolation,
    table: Option<TransformationTable>,
}

impl Default for Unwrapper {
    fn default() -> Self {
        Self::new()
    }
}

impl Unwrapper {
    /// Creates an unconfigured unwrapper with an empty calibration.
    pub fn new() -> Self {
        Unwrapper {
            model: CalibrationModel::new(),
            interpolation: Interpolation::Bilinear,
            table: None,
        }
    }

    /// Creates an unwrapper around an existing calibration. No table is
    /// generated yet.
    pub fn with_calibration(model: CalibrationModel) -> Self {
        Unwrapper {
            model,
            interpolation: Interpolation::Bilinear,
            table: None,
        }
    }

    /// The current lifecycle state.
    pub fn state(&self) -> UnwrapperState {
        if self.table.is_some() {
            UnwrapperState::Ready
        } else if self.model.is_valid() {
            UnwrapperState::Configured
        } else {
            UnwrapperState::Unconfigured
        }
    }

    /// Read access to the current calibration.
    pub fn calibration(&self) -> &CalibrationModel {
        &self.model
    }

    /// The generated table, if any. Read-only; safe to share across
    /// concurrent resample calls.
    pub fn table(&self) -> Option<&TransformationTable> {
        self.table.as_ref()
    }

    /// Sets the source frame dimensions, dropping any generated table.
    pub fn set_original_size(&mut self, width: u32, height: u32) {
        self.model.set_original_size(width, height);
        self.table = None;
    }

    /// Sets the normalized annulus centre, dropping any generated table.
    pub fn set_centre(&mut self, u: f64, v: f64) {
        self.model.set_centre(u, v);
        self.table = None;
    }

    /// Sets the usable radius band, dropping any generated table.
    pub fn set_radius_range(&mut self, min: f64, max: f64) {
        self.model.set_radius_range(min, max);
        self.table = None;
    }

    /// Sets the seam rotation in degrees, dropping any generated table.
    pub fn set_offset_angle(&mut self, degrees: f64) {
        self.model.set_offset_angle(degrees);
        self.table = None;
    }

    /// Sets the panorama width, dropping any generated table.
    pub fn set_unwrap_width(&mut self, width: u32) {
        self.model.set_unwrap_width(width);
        self.table = None;
    }

    /// Sets an explicit panorama height, dropping any generated table.
    pub fn set_unwrap_height(&mut self, height: u32) {
        self.model.set_unwrap_height(height);
        self.table = None;
    }

    /// Chooses the sampling mode for subsequent frames. Does not touch the
    /// table; defaults to bilinear.
    pub fn set_interpolation(&mut self, interpolation: Interpolation) {
        self.interpolation = interpolation;
    }

    /// Generates the transformation table for the current calibration.
    ///
    /// On validation failure the unwrapper keeps whatever table it had and
    /// reports the offending field; a partially built table is never
    /// published.
    pub fn generate_transformation(&mut self) -> Result<(), CalibrationError> {
        let generated = TransformationTable::generate(&self.model)?;
        self.table = Some(generated);
        Ok(())
    }

    /// Unwraps one frame into a freshly allocated panorama.
    ///
    /// Only callable in [`UnwrapperState::Ready`]; fails with
    /// [`UnwrapError::NotReady`] otherwise.
    pub fn unwrap_frame<P>(
        &self,
        frame: &ImageBuffer<P, Vec<u8>>,
    ) -> Result<ImageBuffer<P, Vec<u8>>, UnwrapError>
    where
        P: Pixel<Subpixel = u8>,
    {
        let table = self.table.as_ref().ok_or(UnwrapError::NotReady)?;
        resample_frame(table, frame, self.interpolation)
    }

    /// Like [`unwrap_frame`](Self::unwrap_frame), resampling destination
    /// rows in parallel.
    pub fn unwrap_frame_par<P>(
        &self,
        frame: &ImageBuffer<P, Vec<u8>>,
    ) -> Result<ImageBuffer<P, Vec<u8>>, UnwrapError>
    where
        P: Pixel<Subpixel = u8>,
    {
        let table = self.table.as_ref().ok_or(UnwrapError::NotReady)?;
        resample_frame_par(table, frame, self.interpolation)
    }
}
