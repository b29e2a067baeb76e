//! Manual GIF -> APNG reconstruction.
//!
//! Used when the installed encoder cannot produce APNG output: every frame
//! of the source GIF is decoded with the `image` crate, scaled, and written
//! as an animated PNG through the `png` crate's multi-frame encoder. If the
//! animated write fails, the first frame is written as a plain PNG instead,
//! so the caller still gets a usable artifact.

use std::fs::File;
use std::io::{BufWriter, Cursor};
use std::path::Path;

use image::codecs::gif::GifDecoder;
use image::{imageops, AnimationDecoder, RgbaImage};

use gifforge_core::{ConversionOptions, Error, Result};

/// One decoded, scaled frame with its delay as a (numerator, denominator)
/// fraction of a second.
struct ApngFrame {
    pixels: RgbaImage,
    delay: (u16, u16),
}

/// Rebuild `gif_bytes` as an animated PNG at `dest`.
///
/// CPU-bound; callers should run this under `spawn_blocking`.
pub fn reconstruct(gif_bytes: &[u8], options: &ConversionOptions, dest: &Path) -> Result<()> {
    let decoder = GifDecoder::new(Cursor::new(gif_bytes))
        .map_err(|e| Error::Resource(format!("failed to decode source GIF: {e}")))?;
    let frames = decoder
        .into_frames()
        .collect_frames()
        .map_err(|e| Error::Resource(format!("failed to read GIF frames: {e}")))?;

    if frames.is_empty() {
        return Err(Error::Resource("source GIF has no frames".into()));
    }

    let first = frames[0].buffer();
    let (target_w, target_h) = target_dimensions(first.width(), first.height(), options);

    let frames: Vec<ApngFrame> = frames
        .into_iter()
        .map(|frame| {
            let (num_ms, den_ms) = frame.delay().numer_denom_ms();
            let pixels = if frame.buffer().dimensions() == (target_w, target_h) {
                frame.into_buffer()
            } else {
                imageops::resize(
                    frame.buffer(),
                    target_w,
                    target_h,
                    imageops::FilterType::Lanczos3,
                )
            };
            ApngFrame {
                pixels,
                delay: delay_fraction(num_ms, den_ms),
            }
        })
        .collect();

    match write_animated(&frames, target_w, target_h, options, dest) {
        Ok(()) => Ok(()),
        Err(e) => {
            tracing::warn!(error = %e, "Animated PNG write failed; degrading to single frame");
            write_single_frame(&frames[0].pixels, dest)
        }
    }
}

/// Convert a millisecond fraction to the PNG frame-delay fraction of a
/// second, clamping into the u16 range the format requires.
fn delay_fraction(num_ms: u32, den_ms: u32) -> (u16, u16) {
    // num_ms/den_ms milliseconds == num_ms / (den_ms * 1000) seconds.
    let num = num_ms.min(u16::MAX as u32) as u16;
    let den = den_ms.saturating_mul(1000).min(u16::MAX as u32) as u16;
    if den == 0 {
        (num, 1000)
    } else {
        (num, den)
    }
}

fn target_dimensions(src_w: u32, src_h: u32, options: &ConversionOptions) -> (u32, u32) {
    let width = options.width.max(1);
    match options.height {
        Some(h) => (width, h.max(1)),
        None => {
            let h = ((width as f64 / src_w as f64) * src_h as f64).round() as u32;
            (width, h.max(1))
        }
    }
}

fn write_animated(
    frames: &[ApngFrame],
    width: u32,
    height: u32,
    options: &ConversionOptions,
    dest: &Path,
) -> Result<()> {
    let file = File::create(dest)?;
    let writer = BufWriter::new(file);

    let mut encoder = png::Encoder::new(writer, width, height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    encoder
        .set_animated(frames.len() as u32, options.loop_count as u32)
        .map_err(|e| Error::Resource(format!("APNG header setup failed: {e}")))?;

    let mut writer = encoder
        .write_header()
        .map_err(|e| Error::Resource(format!("APNG header write failed: {e}")))?;

    for frame in frames {
        writer
            .set_frame_delay(frame.delay.0, frame.delay.1)
            .map_err(|e| Error::Resource(format!("APNG frame delay failed: {e}")))?;
        writer
            .write_image_data(frame.pixels.as_raw())
            .map_err(|e| Error::Resource(format!("APNG frame write failed: {e}")))?;
    }

    writer
        .finish()
        .map_err(|e| Error::Resource(format!("APNG finalize failed: {e}")))?;
    Ok(())
}

fn write_single_frame(frame: &RgbaImage, dest: &Path) -> Result<()> {
    frame
        .save_with_format(dest, image::ImageFormat::Png)
        .map_err(|e| Error::Resource(format!("single-frame PNG write failed: {e}")))
}
