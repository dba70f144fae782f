//! Per-frame resampling.
//!
//! This is the hot path, executed once per captured frame: walk the
//! transformation table and sample the source frame at each stored
//! coordinate. No trigonometry and no table allocation happen here, only
//! linear arithmetic and memory reads. Sampling coordinates outside the
//! source frame are clamped to the nearest border pixel, so no entry ever
//! reads out of bounds.

use image::{ImageBuffer, Pixel};
use nalgebra::Vector2;
use rayon::prelude::*;

use super::table::TransformationTable;
use super::UnwrapError;

/// Pixel sampling mode used when applying a transformation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    /// Nearest-neighbour transfer, one read per destination pixel.
    Nearest,
    /// Bilinear blend of the four nearest source pixels.
    Bilinear,
}

/// Applies a transformation table to a source frame.
///
/// The source must have exactly the dimensions the table was generated for;
/// anything else fails with [`UnwrapError::DimensionMismatch`] before any
/// pixel is touched. The output is a freshly allocated frame of the table's
/// panorama size with the same pixel layout as the input, which is never
/// mutated.
pub fn resample_frame<P>(
    table: &TransformationTable,
    source: &ImageBuffer<P, Vec<u8>>,
    interpolation: Interpolation,
) -> Result<ImageBuffer<P, Vec<u8>>, UnwrapError>
where
    P: Pixel<Subpixel = u8>,
{
    check_dimensions(table, source)?;

    let unwrap_width = table.unwrap_width() as usize;
    let channels = P::CHANNEL_COUNT as usize;
    let mut dest: ImageBuffer<P, Vec<u8>> =
        ImageBuffer::new(table.unwrap_width(), table.unwrap_height());

    let src = source.as_raw().as_slice();
    let src_width = source.width() as usize;
    let src_height = source.height() as usize;

    let dest_raw: &mut [u8] = &mut dest;
    for (y, row) in dest_raw.chunks_exact_mut(unwrap_width * channels).enumerate() {
        fill_row(
            row,
            table.row(y),
            src,
            src_width,
            src_height,
            channels,
            interpolation,
        );
    }

    Ok(dest)
}

/// Like [`resample_frame`], with destination rows processed in parallel.
///
/// Output is identical to the serial version; rows are independent and the
/// table is only read, so splitting the destination into row bands is safe.
pub fn resample_frame_par<P>(
    table: &TransformationTable,
    source: &ImageBuffer<P, Vec<u8>>,
    interpolation: Interpolation,
) -> Result<ImageBuffer<P, Vec<u8>>, UnwrapError>
where
    P: Pixel<Subpixel = u8>,
{
    check_dimensions(table, source)?;

    let unwrap_width = table.unwrap_width() as usize;
    let channels = P::CHANNEL_COUNT as usize;
    let mut dest: ImageBuffer<P, Vec<u8>> =
        ImageBuffer::new(table.unwrap_width(), table.unwrap_height());

    let src = source.as_raw().as_slice();
    let src_width = source.width() as usize;
    let src_height = source.height() as usize;

    let dest_raw: &mut [u8] = &mut dest;
    dest_raw
        .par_chunks_exact_mut(unwrap_width * channels)
        .enumerate()
        .for_each(|(y, row)| {
            fill_row(
                row,
                table.row(y),
                src,
                src_width,
                src_height,
                channels,
                interpolation,
            );
        });

    Ok(dest)
}

fn check_dimensions<P>(
    table: &TransformationTable,
    source: &ImageBuffer<P, Vec<u8>>,
) -> Result<(), UnwrapError>
where
    P: Pixel<Subpixel = u8>,
{
    if source.width() != table.source_width() || source.height() != table.source_height() {
        return Err(UnwrapError::DimensionMismatch {
            expected_width: table.source_width(),
            expected_height: table.source_height(),
            actual_width: source.width(),
            actual_height: source.height(),
        });
    }
    Ok(())
}

fn fill_row(
    row: &mut [u8],
    coords: &[Vector2<f64>],
    src: &[u8],
    src_width: usize,
    src_height: usize,
    channels: usize,
    interpolation: Interpolation,
) {
    let max_x = (src_width - 1) as f64;
    let max_y = (src_height - 1) as f64;

    for (out, coord) in row.chunks_exact_mut(channels).zip(coords) {
        // clamp-to-edge before sampling, the single out-of-bounds policy
        let x = coord.x.clamp(0.0, max_x);
        let y = coord.y.clamp(0.0, max_y);

        match interpolation {
            Interpolation::Nearest => {
                let u = x.round() as usize;
                let v = y.round() as usize;
                let base = (v * src_width + u) * channels;
                out.copy_from_slice(&src[base..base + channels]);
            }
            Interpolation::Bilinear => {
                let x0 = x.floor() as usize;
                let y0 = y.floor() as usize;
                let x1 = (x0 + 1).min(src_width - 1);
                let y1 = (y0 + 1).min(src_height - 1);

                let wx = x - x0 as f64;
                let wy = y - y0 as f64;
                let wx_inv = 1.0 - wx;
                let wy_inv = 1.0 - wy;

                let i00 = (y0 * src_width + x0) * channels;
                let i10 = (y0 * src_width + x1) * channels;
                let i01 = (y1 * src_width + x0) * channels;
                let i11 = (y1 * src_width + x1) * channels;

                for c in 0..channels {
                    let value = src[i00 + c] as f64 * wx_inv * wy_inv
                        + src[i10 + c] as f64 * wx * wy_inv
                        + src[i01 + c] as f64 * wx_inv * wy
                        + src[i11 + c] as f64 * wx * wy;
                    out[c] = value.round().clamp(0.0, 255.0) as u8;
                }
            }
        }
    }
}
