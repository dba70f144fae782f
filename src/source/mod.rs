//! Frame acquisition.
//!
//! The transformation core never opens devices or files itself; it is fed
//! frames by a [`FrameSource`], selected by the driving application. Two
//! implementations are provided: a still image re-served on every grab
//! ([`ImageFileSource`]) and a directory of numbered frames streamed in
//! order ([`SequenceSource`]).

use image::RgbImage;

mod image_file;
mod sequence;

pub use image_file::ImageFileSource;
pub use sequence::SequenceSource;

/// Errors raised by frame sources.
#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    /// An operation was attempted before `open` succeeded.
    #[error("source is not open")]
    NotOpen,
    /// The location contained no usable frames.
    #[error("no frames found in {0}")]
    Empty(String),
    /// A streaming source ran out of frames.
    #[error("end of stream")]
    EndOfStream,
    /// A frame's size differs from the first frame of the stream.
    #[error(
        "frame size {actual_width}x{actual_height} does not match the \
         stream's {expected_width}x{expected_height}"
    )]
    DimensionChange {
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },
    /// Filesystem failure.
    #[error("IO error: {0}")]
    IOError(String),
    /// The file could not be decoded as an image.
    #[error("failed to decode image: {0}")]
    DecodeError(String),
}

impl From<std::io::Error> for SourceError {
    fn from(err: std::io::Error) -> Self {
        SourceError::IOError(err.to_string())
    }
}

impl From<image::ImageError> for SourceError {
    fn from(err: image::ImageError) -> Self {
        SourceError::DecodeError(err.to_string())
    }
}

/// Capability set the unwrap driver needs from any frame origin.
///
/// `width` and `height` report the source frame size once open (0 before),
/// which the driver feeds into the calibration before generating a
/// transformation.
pub trait FrameSource {
    /// Opens the source at a location (file path or directory).
    fn open(&mut self, location: &str) -> Result<(), SourceError>;

    /// Releases the source; `grab` fails until reopened.
    fn close(&mut self);

    /// Whether the source is open and able to deliver frames.
    fn is_open(&self) -> bool;

    /// Produces the next frame. May block on slow media.
    fn grab(&mut self) -> Result<RgbImage, SourceError>;

    /// Source frame width in pixels, 0 when closed.
    fn width(&self) -> u32;

    /// Source frame height in pixels, 0 when closed.
    fn height(&self) -> u32;
}
