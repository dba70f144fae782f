//! Annular Image Unwrapping Tool
//!
//! Unwrap a single spherical-mirror fisheye shot into a panorama.
//!
//! Usage:
//!   cargo run --bin unwrap_image -- -i fisheye.jpg -o panorama.png
//!   cargo run --bin unwrap_image -- -i fisheye.jpg -o panorama.png -c samples/annular.yaml

use clap::Parser;
use pano_unwrap::{CalibrationModel, FrameSource, ImageFileSource, Interpolation, Unwrapper};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "Unwrap an annular fisheye image into a panorama")]
struct Cli {
    /// Input fisheye image path
    #[arg(short = 'i', long)]
    input: PathBuf,

    /// Output panorama path
    #[arg(short = 'o', long)]
    output: PathBuf,

    /// Calibration YAML file; when given, the geometry flags below are ignored
    #[arg(short = 'c', long)]
    calib: Option<PathBuf>,

    /// Normalized horizontal centre of the annulus
    #[arg(long, default_value_t = 0.5)]
    u_centre: f64,

    /// Normalized vertical centre of the annulus
    #[arg(long, default_value_t = 0.5)]
    v_centre: f64,

    /// Inner usable radius, normalized
    #[arg(long, default_value_t = 0.25)]
    radius_min: f64,

    /// Outer usable radius, normalized
    #[arg(long, default_value_t = 0.6)]
    radius_max: f64,

    /// Seam rotation in degrees
    #[arg(long, default_value_t = 180.0)]
    offset_angle: f64,

    /// Panorama width in pixels
    #[arg(long, default_value_t = 800)]
    unwrap_width: u32,

    /// Panorama height in pixels (derived from the radius band when omitted)
    #[arg(long)]
    unwrap_height: Option<u32>,

    /// Use nearest-neighbour sampling instead of bilinear
    #[arg(long)]
    nearest: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    println!("🎯 Annular Unwrap Tool");
    println!("======================");
    println!("Input: {:?}", cli.input);
    println!("Output: {:?}", cli.output);
    println!();

    let mut model = match &cli.calib {
        Some(path) => {
            let calib_path = path.to_str().ok_or("calibration path is not valid UTF-8")?;
            let model = CalibrationModel::load_from_yaml(calib_path)?;
            println!("✓ Loaded calibration from {calib_path}");
            model
        }
        None => {
            let mut model = CalibrationModel::new();
            model.set_centre(cli.u_centre, cli.v_centre);
            model.set_radius_range(cli.radius_min, cli.radius_max);
            model.set_offset_angle(cli.offset_angle);
            model.set_unwrap_width(cli.unwrap_width);
            if let Some(height) = cli.unwrap_height {
                model.set_unwrap_height(height);
            }
            model
        }
    };
    println!(
        "  centre=({:.3}, {:.3}), radius=[{:.3}, {:.3}], offset={:.1}°",
        model.u_centre, model.v_centre, model.radius_min, model.radius_max, model.offset_angle_deg
    );

    let mut source = ImageFileSource::new();
    source.open(cli.input.to_str().ok_or("input path is not valid UTF-8")?)?;
    println!("✓ Loaded input image: {}x{}", source.width(), source.height());

    model.set_original_size(source.width(), source.height());

    let mut unwrapper = Unwrapper::with_calibration(model);
    if cli.nearest {
        unwrapper.set_interpolation(Interpolation::Nearest);
    }
    unwrapper.generate_transformation()?;
    let table = unwrapper.table().ok_or("table missing after generation")?;
    println!(
        "✓ Generated {}x{} transformation table",
        table.unwrap_width(),
        table.unwrap_height()
    );

    println!("⏳ Unwrapping...");
    let frame = source.grab()?;
    let panorama = unwrapper.unwrap_frame(&frame)?;

    panorama.save(&cli.output)?;
    println!("✓ Saved panorama to: {:?}", cli.output);
    println!();
    println!("✅ Done!");

    Ok(())
}
