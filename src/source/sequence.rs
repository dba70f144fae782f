//! Image-sequence frame source.

use std::fs;
use std::path::PathBuf;

use image::RgbImage;
use log::debug;

use super::{FrameSource, SourceError};

const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "bmp", "tiff"];

/// Streams the image files of a directory in lexicographic order.
///
/// Stands in for a live capture device when working offline: each `grab`
/// yields the next frame, [`SourceError::EndOfStream`] once exhausted. All
/// frames must share the size of the first one; a deviating frame is
/// rejected with [`SourceError::DimensionChange`] rather than silently fed
/// to a mismatched transformation.
#[derive(Debug, Default)]
pub struct SequenceSource {
    paths: Vec<PathBuf>,
    next: usize,
    width: u32,
    height: u32,
}

impl SequenceSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames remaining in the stream.
    pub fn remaining(&self) -> usize {
        self.paths.len() - self.next
    }
}

impl FrameSource for SequenceSource {
    fn open(&mut self, location: &str) -> Result<(), SourceError> {
        let mut paths: Vec<PathBuf> = fs::read_dir(location)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
                    .unwrap_or(false)
            })
            .collect();
        paths.sort();

        if paths.is_empty() {
            return Err(SourceError::Empty(location.to_string()));
        }

        // The first frame fixes the stream dimensions.
        let first = image::open(&paths[0])?;
        self.width = first.width();
        self.height = first.height();
        debug!(
            "opened sequence of {} frames at {}x{}",
            paths.len(),
            self.width,
            self.height
        );

        self.paths = paths;
        self.next = 0;
        Ok(())
    }

    fn close(&mut self) {
        self.paths.clear();
        self.next = 0;
        self.width = 0;
        self.height = 0;
    }

    fn is_open(&self) -> bool {
        !self.paths.is_empty()
    }

    fn grab(&mut self) -> Result<RgbImage, SourceError> {
        if !self.is_open() {
            return Err(SourceError::NotOpen);
        }
        if self.next >= self.paths.len() {
            return Err(SourceError::EndOfStream);
        }

        let frame = image::open(&self.paths[self.next])?.to_rgb8();
        if frame.width() != self.width || frame.height() != self.height {
            return Err(SourceError::DimensionChange {
                expected_width: self.width,
                expected_height: self.height,
                actual_width: frame.width(),
                actual_height: frame.height(),
            });
        }

        self.next += 1;
        Ok(frame)
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}
