//! Frame-Sequence Unwrapping Tool
//!
//! Runs the steady-state unwrap loop over a directory of captured frames:
//! grab, resample, write, until the stream is exhausted. Stands in for the
//! live-capture pipeline when working from recorded footage.
//!
//! Usage:
//!   cargo run --bin unwrap_sequence -- -d frames/ -o unwrapped/ -c samples/annular.yaml

use clap::Parser;
use log::info;
use pano_unwrap::{
    CalibrationModel, FrameSource, Interpolation, SequenceSource, SourceError, Unwrapper,
};
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "Unwrap a directory of annular fisheye frames")]
struct Cli {
    /// Directory holding the input frames
    #[arg(short = 'd', long)]
    input_dir: PathBuf,

    /// Directory for the unwrapped panoramas
    #[arg(short = 'o', long)]
    output_dir: PathBuf,

    /// Calibration YAML file; when given, the geometry flags below are ignored
    #[arg(short = 'c', long)]
    calib: Option<PathBuf>,

    /// Normalized annulus centre, horizontal
    #[arg(long, default_value_t = 0.5)]
    u_centre: f64,

    /// Normalized annulus centre, vertical
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

    /// Output filename prefix
    #[arg(long, default_value = "pano")]
    prefix: String,

    /// Use nearest-neighbour sampling instead of bilinear
    #[arg(long)]
    nearest: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let mut model = match &cli.calib {
        Some(path) => {
            let calib_path = path.to_str().ok_or("calibration path is not valid UTF-8")?;
            CalibrationModel::load_from_yaml(calib_path)?
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

    let mut source = SequenceSource::new();
    source.open(
        cli.input_dir
            .to_str()
            .ok_or("input directory path is not valid UTF-8")?,
    )?;
    info!(
        "opened frame sequence: {} frames pending, {}x{}",
        source.remaining(),
        source.width(),
        source.height()
    );

    model.set_original_size(source.width(), source.height());

    let mut unwrapper = Unwrapper::with_calibration(model);
    if cli.nearest {
        unwrapper.set_interpolation(Interpolation::Nearest);
    }
    unwrapper.generate_transformation()?;

    fs::create_dir_all(&cli.output_dir)?;

    let mut index = 0usize;
    loop {
        let frame = match source.grab() {
            Ok(frame) => frame,
            Err(SourceError::EndOfStream) => break,
            Err(err) => return Err(err.into()),
        };

        let panorama = unwrapper.unwrap_frame_par(&frame)?;
        let path = cli.output_dir.join(format!("{}_{:05}.png", cli.prefix, index));
        panorama.save(&path)?;
        info!("frame {index} -> {path:?}");
        index += 1;
    }

    info!("unwrapped {index} frames into {:?}", cli.output_dir);
    println!("✅ Unwrapped {index} frames");
    Ok(())
}
