//! Still-image frame source.

use image::RgbImage;

use super::{FrameSource, SourceError};

/// Serves a single decoded image; every `grab` returns a copy of it.
///
/// Useful for calibrating against a test shot, and as the degenerate
/// "stream" of a single frame.
#[derive(Debug, Default)]
pub struct ImageFileSource {
    image: Option<RgbImage>,
}

impl ImageFileSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FrameSource for ImageFileSource {
    fn open(&mut self, location: &str) -> Result<(), SourceError> {
        let decoded = image::open(location)?.to_rgb8();
        self.image = Some(decoded);
        Ok(())
    }

    fn close(&mut self) {
        self.image = None;
    }

    fn is_open(&self) -> bool {
        self.image.is_some()
    }

    fn grab(&mut self) -> Result<RgbImage, SourceError> {
        self.image.clone().ok_or(SourceError::NotOpen)
    }

    fn width(&self) -> u32 {
        self.image.as_ref().map_or(0, |i| i.width())
    }

    fn height(&self) -> u32 {
        self.image.as_ref().map_or(0, |i| i.height())
    }
}
