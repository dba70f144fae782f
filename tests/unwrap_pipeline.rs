//! End-to-end tests over the full configure/generate/apply flow.

use image::{Rgb, RgbImage};
use pano_unwrap::{UnwrapError, Unwrapper, UnwrapperState};

/// A smooth gradient frame: linear in x and y, so bilinear samples can be
/// predicted from the sampling coordinate alone.
fn gradient_frame(width: u32, height: u32) -> RgbImage {
    let mut frame = RgbImage::new(width, height);
    for (x, y, pixel) in frame.enumerate_pixels_mut() {
        *pixel = Rgb([(x / 4) as u8, (y / 2) as u8, ((x + y) % 256) as u8]);
    }
    frame
}

fn scenario_unwrapper() -> Unwrapper {
    let mut unwrapper = Unwrapper::new();
    unwrapper.set_original_size(640, 480);
    unwrapper.set_centre(0.5, 0.5);
    unwrapper.set_radius_range(0.25, 0.6);
    unwrapper.set_offset_angle(180.0);
    unwrapper.set_unwrap_width(800);
    unwrapper.set_unwrap_height(100);
    unwrapper
}

#[test]
fn test_full_pipeline_produces_expected_panorama() {
    let mut unwrapper = scenario_unwrapper();
    unwrapper.generate_transformation().expect("valid calibration");
    assert_eq!(unwrapper.state(), UnwrapperState::Ready);

    // The seam pixel samples the source at (240, 240): 180 degrees from the
    // centre (320, 240) at a quarter of the half-width.
    let table = unwrapper.table().expect("table exists in Ready");
    let seam = table.entry(0, 0);
    assert!((seam.x - 240.0).abs() < 0.5);
    assert!((seam.y - 240.0).abs() < 0.5);

    let frame = gradient_frame(640, 480);
    let panorama = unwrapper.unwrap_frame(&frame).expect("ready unwrapper");
    assert_eq!(panorama.dimensions(), (800, 100));

    // Source value at (240, 240) is (60, 120, 224); the gradient is linear
    // so the bilinear sample must land within rounding of it.
    let seam_pixel = panorama.get_pixel(0, 0);
    let expected = [60u8, 120, 224];
    for channel in 0..3 {
        let diff = (seam_pixel[channel] as i32 - expected[channel] as i32).abs();
        assert!(
            diff <= 1,
            "channel {channel}: {} vs {}",
            seam_pixel[channel],
            expected[channel]
        );
    }
}

#[test]
fn test_mismatched_frame_is_rejected_without_output() {
    let mut unwrapper = scenario_unwrapper();
    unwrapper.generate_transformation().expect("valid calibration");

    let wrong_size = gradient_frame(320, 240);
    let result = unwrapper.unwrap_frame(&wrong_size);
    assert!(matches!(
        result,
        Err(UnwrapError::DimensionMismatch {
            expected_width: 640,
            expected_height: 480,
            ..
        })
    ));
}

#[test]
fn test_unconfigured_unwrap_is_an_illegal_state() {
    let unwrapper = Unwrapper::new();
    assert_eq!(unwrapper.state(), UnwrapperState::Unconfigured);
    let frame = gradient_frame(640, 480);
    assert!(matches!(
        unwrapper.unwrap_frame(&frame),
        Err(UnwrapError::NotReady)
    ));
}

#[test]
fn test_off_centre_wide_band_stays_in_bounds() {
    // Centre near the corner with the band at full width pushes many
    // sampling coordinates outside the frame; clamping must absorb all of
    // them without panicking.
    let mut unwrapper = Unwrapper::new();
    unwrapper.set_original_size(320, 200);
    unwrapper.set_centre(0.9, 0.1);
    unwrapper.set_radius_range(0.05, 1.0);
    unwrapper.set_offset_angle(-90.0);
    unwrapper.set_unwrap_width(256);
    unwrapper.generate_transformation().expect("valid calibration");

    let frame = gradient_frame(320, 200);
    let panorama = unwrapper.unwrap_frame(&frame).expect("clamped sampling");
    assert_eq!(panorama.width(), 256);
}

#[test]
fn test_recalibration_changes_output() {
    let mut unwrapper = scenario_unwrapper();
    unwrapper.generate_transformation().expect("valid calibration");
    let frame = gradient_frame(640, 480);
    let first = unwrapper.unwrap_frame(&frame).expect("ready");

    unwrapper.set_offset_angle(0.0);
    assert_eq!(unwrapper.state(), UnwrapperState::Configured);
    unwrapper.generate_transformation().expect("still valid");
    let second = unwrapper.unwrap_frame(&frame).expect("ready again");

    assert_eq!(first.dimensions(), second.dimensions());
    assert_ne!(first, second);
}
