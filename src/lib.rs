//! Annular Panorama Unwrapping Library
//!
//! Converts circular (annular) fisheye images, as produced by a
//! spherical-mirror optical attachment, into rectangular panoramic images.
//! The library is built around three pieces:
//! - [`CalibrationModel`]: validated geometric parameters describing the
//!   fisheye source and the desired panorama,
//! - [`TransformationTable`]: a precomputed per-destination-pixel map of
//!   source sampling coordinates, generated once per calibration,
//! - [`Unwrapper`]: a façade owning both, applying the table to each
//!   incoming frame.
//!
//! Frame acquisition is abstracted behind the [`FrameSource`] trait with
//! still-image and image-sequence implementations; display and encoding are
//! left to the caller.

pub mod calibration;
pub mod source;
pub mod unwrap;

// Re-export commonly used types
pub use calibration::{CalibrationError, CalibrationModel};
pub use source::{FrameSource, ImageFileSource, SequenceSource, SourceError};
pub use unwrap::{
    Interpolation, TransformationTable, UnwrapError, Unwrapper, UnwrapperState,
};
