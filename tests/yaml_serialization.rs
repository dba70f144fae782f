//! Integration tests for calibration YAML loading and saving.

use pano_unwrap::{CalibrationError, CalibrationModel};
use std::fs;

#[test]
fn test_sample_calibration_loads() {
    let model = CalibrationModel::load_from_yaml("samples/annular.yaml")
        .expect("failed to load sample calibration");

    assert_eq!(model.original_width, 640);
    assert_eq!(model.original_height, 480);
    assert_eq!(model.u_centre, 0.5);
    assert_eq!(model.v_centre, 0.5);
    assert_eq!(model.radius_min, 0.25);
    assert_eq!(model.radius_max, 0.6);
    assert_eq!(model.offset_angle_deg, 180.0);
    assert_eq!(model.unwrap_width, 800);
    assert_eq!(model.unwrap_height, Some(100));
    assert!(model.is_valid());
}

#[test]
fn test_calibration_yaml_round_trip() {
    fs::create_dir_all("output").ok();

    let input_path = "samples/annular.yaml";
    let output_path = "output/test_annular.yaml";

    let model = CalibrationModel::load_from_yaml(input_path).expect("failed to load");
    model.save_to_yaml(output_path).expect("failed to save");

    let reloaded = CalibrationModel::load_from_yaml(output_path).expect("failed to reload");
    assert_eq!(model, reloaded);

    fs::remove_file(output_path).ok();
}

#[test]
fn test_round_trip_without_explicit_height() {
    fs::create_dir_all("output").ok();

    let mut model = CalibrationModel::new();
    model.set_original_size(1024, 768);
    model.set_centre(0.48, 0.52);
    model.set_radius_range(0.1, 0.65);
    model.set_offset_angle(-45.0);
    model.set_unwrap_width(1200);

    let output_path = "output/test_derived_height.yaml";
    model.save_to_yaml(output_path).expect("failed to save");

    let reloaded = CalibrationModel::load_from_yaml(output_path).expect("failed to reload");
    assert_eq!(model, reloaded);
    assert_eq!(reloaded.unwrap_height, None);
    assert_eq!(
        reloaded.effective_unwrap_height(),
        model.effective_unwrap_height()
    );

    fs::remove_file(output_path).ok();
}

#[test]
fn test_missing_file_reports_io_error() {
    let result = CalibrationModel::load_from_yaml("samples/does_not_exist.yaml");
    assert!(matches!(result, Err(CalibrationError::IOError(_))));
}

#[test]
fn test_invalid_calibration_file_is_rejected() {
    fs::create_dir_all("output").ok();

    // Reversed radius band: parses fine, fails validation.
    let output_path = "output/test_invalid_calib.yaml";
    fs::write(
        output_path,
        "unwrap0:\n  original_size: [640, 480]\n  centre: [0.5, 0.5]\n  radius: [0.6, 0.25]\n  unwrap_width: 800\n",
    )
    .expect("failed to write fixture");

    let result = CalibrationModel::load_from_yaml(output_path);
    assert!(matches!(
        result,
        Err(CalibrationError::RadiusRangeInvalid { .. })
    ));

    fs::remove_file(output_path).ok();
}

#[test]
fn test_missing_node_is_a_yaml_error() {
    fs::create_dir_all("output").ok();

    let output_path = "output/test_missing_node.yaml";
    fs::write(output_path, "something_else: 1\n").expect("failed to write fixture");

    let result = CalibrationModel::load_from_yaml(output_path);
    assert!(matches!(result, Err(CalibrationError::YamlError(_))));

    fs::remove_file(output_path).ok();
}
