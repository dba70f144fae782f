//! Integration tests for the still-image and sequence frame sources.

use image::{Rgb, RgbImage};
use pano_unwrap::{FrameSource, ImageFileSource, SequenceSource, SourceError};
use std::fs;
use std::path::Path;

fn solid_frame(width: u32, height: u32, color: [u8; 3]) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb(color))
}

fn write_frames(dir: &str, frames: &[(&str, RgbImage)]) {
    fs::create_dir_all(dir).expect("failed to create fixture dir");
    for (name, frame) in frames {
        frame
            .save(Path::new(dir).join(name))
            .expect("failed to write fixture frame");
    }
}

#[test]
fn test_image_file_source_serves_copies() {
    let dir = "output/fixture_still";
    write_frames(dir, &[("shot.png", solid_frame(32, 24, [10, 20, 30]))]);

    let mut source = ImageFileSource::new();
    assert!(!source.is_open());
    assert_eq!(source.width(), 0);

    source.open(&format!("{dir}/shot.png")).expect("open still");
    assert!(source.is_open());
    assert_eq!((source.width(), source.height()), (32, 24));

    // A still source keeps serving the same frame.
    let first = source.grab().expect("first grab");
    let second = source.grab().expect("second grab");
    assert_eq!(first, second);
    assert_eq!(*first.get_pixel(0, 0), Rgb([10, 20, 30]));

    source.close();
    assert!(!source.is_open());
    assert!(matches!(source.grab(), Err(SourceError::NotOpen)));

    fs::remove_dir_all(dir).ok();
}

#[test]
fn test_sequence_source_streams_in_order() {
    let dir = "output/fixture_sequence";
    write_frames(
        dir,
        &[
            ("frame_000.png", solid_frame(16, 12, [1, 0, 0])),
            ("frame_001.png", solid_frame(16, 12, [2, 0, 0])),
            ("frame_002.png", solid_frame(16, 12, [3, 0, 0])),
        ],
    );

    let mut source = SequenceSource::new();
    source.open(dir).expect("open sequence");
    assert!(source.is_open());
    assert_eq!((source.width(), source.height()), (16, 12));
    assert_eq!(source.remaining(), 3);

    for expected in 1u8..=3 {
        let frame = source.grab().expect("grab frame");
        assert_eq!(*frame.get_pixel(0, 0), Rgb([expected, 0, 0]));
    }

    assert!(matches!(source.grab(), Err(SourceError::EndOfStream)));
    assert_eq!(source.remaining(), 0);

    source.close();
    assert!(!source.is_open());
    assert!(matches!(source.grab(), Err(SourceError::NotOpen)));

    fs::remove_dir_all(dir).ok();
}

#[test]
fn test_sequence_source_rejects_dimension_change() {
    let dir = "output/fixture_dimension_change";
    write_frames(
        dir,
        &[
            ("a.png", solid_frame(16, 12, [1, 0, 0])),
            ("b.png", solid_frame(8, 6, [2, 0, 0])),
        ],
    );

    let mut source = SequenceSource::new();
    source.open(dir).expect("open sequence");
    source.grab().expect("first frame matches");
    assert!(matches!(
        source.grab(),
        Err(SourceError::DimensionChange {
            expected_width: 16,
            expected_height: 12,
            actual_width: 8,
            actual_height: 6,
        })
    ));

    fs::remove_dir_all(dir).ok();
}

#[test]
fn test_empty_directory_is_rejected() {
    let dir = "output/fixture_empty";
    fs::create_dir_all(dir).expect("failed to create fixture dir");

    let mut source = SequenceSource::new();
    assert!(matches!(source.open(dir), Err(SourceError::Empty(_))));
    assert!(!source.is_open());

    fs::remove_dir_all(dir).ok();
}

#[test]
fn test_non_image_files_are_ignored() {
    let dir = "output/fixture_mixed";
    write_frames(dir, &[("frame.png", solid_frame(16, 12, [5, 0, 0]))]);
    fs::write(format!("{dir}/notes.txt"), "not a frame").expect("failed to write file");

    let mut source = SequenceSource::new();
    source.open(dir).expect("open sequence");
    assert_eq!(source.remaining(), 1);
    source.grab().expect("grab the png");
    assert!(matches!(source.grab(), Err(SourceError::EndOfStream)));

    fs::remove_dir_all(dir).ok();
}
