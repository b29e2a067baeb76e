//! Image-sequence to animated GIF composition.
//!
//! Each uploaded image becomes one frame on a uniform transparent canvas:
//! decode, apply its per-index transform (rotation then zoom), optionally
//! pre-resize to the target width, fit to the canvas, then alpha-composite
//! at the requested anchor. With crossfade enabled, three blended
//! transition frames are inserted between each consecutive pair and the
//! per-frame delay is quartered, keeping the overall duration close to the
//! non-crossfade timing.

use std::fs::File;
use std::io::{BufWriter, Cursor};
use std::path::Path;

use image::{imageops, RgbaImage};

use gifforge_core::{ConversionOptions, Error, Result};

use crate::layout;

/// Blend weights of the incoming frame for the three transition frames.
const CROSSFADE_WEIGHTS: [f32; 3] = [0.25, 0.5, 0.75];

/// Metadata about a composed GIF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeInfo {
    /// Total frame count, transitions included.
    pub frames: usize,
    pub width: u32,
    pub height: u32,
    /// Delay between frames in milliseconds.
    pub delay_ms: u32,
}

/// Compose `inputs` (encoded images, in upload order) into an animated GIF
/// at `dest`.
///
/// CPU-bound; callers should run this under `spawn_blocking`.
pub fn compose_gif(
    inputs: &[Vec<u8>],
    options: &ConversionOptions,
    dest: &Path,
) -> Result<ComposeInfo> {
    if inputs.is_empty() {
        return Err(Error::Validation("no image files provided".into()));
    }

    let width = options.width.max(1);
    let height = options.height.unwrap_or(width).max(1);

    let mut frames: Vec<RgbaImage> = Vec::with_capacity(inputs.len());
    for (index, bytes) in inputs.iter().enumerate() {
        let frame = prepare_frame(index, bytes, width, height, options)?;
        frames.push(frame);
    }

    let mut delay_ms = 1000 / options.fps.max(1);
    if options.crossfade && frames.len() > 1 {
        frames = with_crossfade(frames);
        delay_ms /= 4;
    }
    let delay_ms = delay_ms.max(10);

    write_gif(&frames, width, height, delay_ms, options, dest)?;

    tracing::debug!(
        frames = frames.len(),
        width,
        height,
        delay_ms,
        "Composed image sequence"
    );

    Ok(ComposeInfo {
        frames: frames.len(),
        width,
        height,
        delay_ms,
    })
}

/// Decode and lay out one input image as a full-canvas frame.
fn prepare_frame(
    index: usize,
    bytes: &[u8],
    width: u32,
    height: u32,
    options: &ConversionOptions,
) -> Result<RgbaImage> {
    let decoded = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| Error::Validation(format!("image {index}: unreadable data: {e}")))?
        .decode()
        .map_err(|e| Error::Validation(format!("image {index}: decode failed: {e}")))?;
    let mut img = decoded.into_rgba8();

    if let Some(transform) = options.transform_for(index) {
        img = apply_transform(img, transform.rotation, transform.zoom);
    }

    if options.trim_images && img.width() != width {
        let ratio = img.height() as f64 / img.width() as f64;
        let new_height = ((width as f64 * ratio).round() as u32).max(1);
        img = imageops::resize(&img, width, new_height, imageops::FilterType::Lanczos3);
    }

    // Fit to the canvas: exact when a height was requested, aspect-preserving
    // within the width bound otherwise.
    img = if options.height.is_some() {
        imageops::resize(&img, width, height, imageops::FilterType::Lanczos3)
    } else {
        let (fw, fh) = layout::fit_within(img.width(), img.height(), width);
        if (fw, fh) == img.dimensions() {
            img
        } else {
            imageops::resize(&img, fw, fh, imageops::FilterType::Lanczos3)
        }
    };

    let mut canvas = RgbaImage::new(width, height);
    let (x, y) = layout::anchor_position(options.alignment, (width, height), img.dimensions());
    imageops::overlay(&mut canvas, &img, x, y);
    Ok(canvas)
}

/// Rotation first (quarter turns, arbitrary angles rounded), then zoom.
fn apply_transform(img: RgbaImage, rotation: i32, zoom: f32) -> RgbaImage {
    let img = match layout::quarter_turns(rotation) {
        1 => imageops::rotate90(&img),
        2 => imageops::rotate180(&img),
        3 => imageops::rotate270(&img),
        _ => img,
    };

    if zoom > 0.0 && (zoom - 1.0).abs() > f32::EPSILON {
        let w = ((img.width() as f32 * zoom) as u32).max(1);
        let h = ((img.height() as f32 * zoom) as u32).max(1);
        imageops::resize(&img, w, h, imageops::FilterType::Lanczos3)
    } else {
        img
    }
}

/// Insert three blended transition frames between each consecutive pair.
fn with_crossfade(frames: Vec<RgbaImage>) -> Vec<RgbaImage> {
    let mut out = Vec::with_capacity(frames.len() + 3 * (frames.len() - 1));
    for pair in frames.windows(2) {
        out.push(pair[0].clone());
        for weight in CROSSFADE_WEIGHTS {
            out.push(blend(&pair[0], &pair[1], weight));
        }
    }
    out.push(frames[frames.len() - 1].clone());
    out
}

/// Per-pixel linear blend; `weight` is the share of `next`.
fn blend(current: &RgbaImage, next: &RgbaImage, weight: f32) -> RgbaImage {
    let mut out = current.clone();
    for (dst, src) in out.pixels_mut().zip(next.pixels()) {
        for channel in 0..4 {
            let a = dst.0[channel] as f32;
            let b = src.0[channel] as f32;
            dst.0[channel] = (a + (b - a) * weight).round() as u8;
        }
    }
    out
}

fn write_gif(
    frames: &[RgbaImage],
    width: u32,
    height: u32,
    delay_ms: u32,
    options: &ConversionOptions,
    dest: &Path,
) -> Result<()> {
    if width > u16::MAX as u32 || height > u16::MAX as u32 {
        return Err(Error::Validation(format!(
            "canvas {width}x{height} exceeds the GIF size limit"
        )));
    }

    let file = File::create(dest)?;
    let writer = BufWriter::new(file);
    let mut encoder = gif::Encoder::new(writer, width as u16, height as u16, &[])
        .map_err(|e| Error::Resource(format!("GIF encoder setup failed: {e}")))?;

    let repeat = if options.loop_count == 0 {
        gif::Repeat::Infinite
    } else {
        gif::Repeat::Finite(options.loop_count)
    };
    encoder
        .set_repeat(repeat)
        .map_err(|e| Error::Resource(format!("GIF loop setup failed: {e}")))?;

    let delay_cs = (delay_ms / 10).clamp(1, u16::MAX as u32) as u16;

    for frame in frames {
        let mut pixels = frame.as_raw().clone();
        let mut gif_frame =
            gif::Frame::from_rgba_speed(width as u16, height as u16, &mut pixels, 10);
        gif_frame.delay = delay_cs;
        if options.transparency {
            gif_frame.dispose = gif::DisposalMethod::Background;
        }
        encoder
            .write_frame(&gif_frame)
            .map_err(|e| Error::Resource(format!("GIF frame write failed: {e}")))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gifforge_core::{Alignment, ImageTransform};
    use image::{DynamicImage, Rgba};

    fn solid_png(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba(color));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn decode_frames(path: &Path) -> (u32, u32, usize) {
        use image::AnimationDecoder;
        let file = File::open(path).unwrap();
        let decoder = image::codecs::gif::GifDecoder::new(std::io::BufReader::new(file)).unwrap();
        let frames = decoder.into_frames().collect_frames().unwrap();
        let (w, h) = frames[0].buffer().dimensions();
        (w, h, frames.len())
    }

    #[test]
    fn empty_input_is_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = compose_gif(
            &[],
            &ConversionOptions::default(),
            &dir.path().join("out.gif"),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn undecodable_image_is_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = compose_gif(
            &[b"not an image".to_vec()],
            &ConversionOptions::default(),
            &dir.path().join("out.gif"),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn one_frame_per_image_without_crossfade() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.gif");
        let inputs = vec![
            solid_png(16, 16, [255, 0, 0, 255]),
            solid_png(16, 16, [0, 255, 0, 255]),
            solid_png(16, 16, [0, 0, 255, 255]),
        ];

        let options = ConversionOptions {
            width: 16,
            height: Some(16),
            fps: 2,
            ..Default::default()
        };
        let info = compose_gif(&inputs, &options, &dest).unwrap();

        assert_eq!(info.frames, 3);
        assert_eq!(info.delay_ms, 500);
        assert_eq!((info.width, info.height), (16, 16));

        let (w, h, n) = decode_frames(&dest);
        assert_eq!((w, h, n), (16, 16, 3));
    }

    #[test]
    fn crossfade_inserts_transitions_and_quarters_delay() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("fade.gif");
        let inputs = vec![
            solid_png(8, 8, [255, 0, 0, 255]),
            solid_png(8, 8, [0, 0, 255, 255]),
        ];

        let options = ConversionOptions {
            width: 8,
            height: Some(8),
            fps: 2,
            crossfade: true,
            ..Default::default()
        };
        let info = compose_gif(&inputs, &options, &dest).unwrap();

        // 2 originals + 3 transitions.
        assert_eq!(info.frames, 5);
        assert_eq!(info.delay_ms, 125);

        let (_, _, n) = decode_frames(&dest);
        assert_eq!(n, 5);
    }

    #[test]
    fn crossfade_with_single_image_is_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("single.gif");
        let options = ConversionOptions {
            width: 8,
            height: Some(8),
            fps: 2,
            crossfade: true,
            ..Default::default()
        };
        let info = compose_gif(&[solid_png(8, 8, [9, 9, 9, 255])], &options, &dest).unwrap();
        assert_eq!(info.frames, 1);
        assert_eq!(info.delay_ms, 500);
    }

    #[test]
    fn canvas_defaults_to_square_when_height_omitted() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("square.gif");
        let options = ConversionOptions {
            width: 32,
            height: None,
            fps: 2,
            ..Default::default()
        };
        let info = compose_gif(&[solid_png(64, 16, [1, 2, 3, 255])], &options, &dest).unwrap();
        assert_eq!((info.width, info.height), (32, 32));

        let (w, h, _) = decode_frames(&dest);
        assert_eq!((w, h), (32, 32));
    }

    #[test]
    fn alignment_places_small_image_on_canvas() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("aligned.gif");
        let options = ConversionOptions {
            width: 16,
            height: Some(16),
            fps: 2,
            alignment: Alignment::TopLeft,
            transparency: true,
            ..Default::default()
        };
        // 8x8 source on a 16x16 canvas.
        let info = compose_gif(&[solid_png(8, 8, [200, 10, 10, 255])], &options, &dest).unwrap();
        assert_eq!((info.width, info.height), (16, 16));
    }

    #[test]
    fn transform_rotation_and_zoom() {
        let tall = apply_transform(RgbaImage::new(4, 8), 90, 1.0);
        assert_eq!(tall.dimensions(), (8, 4));

        let zoomed = apply_transform(RgbaImage::new(4, 4), 0, 2.0);
        assert_eq!(zoomed.dimensions(), (8, 8));

        let both = apply_transform(RgbaImage::new(4, 8), 270, 0.5);
        assert_eq!(both.dimensions(), (4, 2));
    }

    #[test]
    fn transform_applied_by_index() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("indexed.gif");
        let options = ConversionOptions {
            width: 8,
            height: Some(8),
            fps: 2,
            image_transforms: vec![ImageTransform {
                id: "1".into(),
                rotation: 180,
                zoom: 1.0,
            }],
            ..Default::default()
        };
        let inputs = vec![
            solid_png(8, 8, [255, 0, 0, 255]),
            solid_png(8, 8, [0, 255, 0, 255]),
        ];
        let info = compose_gif(&inputs, &options, &dest).unwrap();
        assert_eq!(info.frames, 2);
    }

    #[test]
    fn blend_midpoint() {
        let black = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 255]));
        let white = RgbaImage::from_pixel(1, 1, Rgba([255, 255, 255, 255]));
        let mid = blend(&black, &white, 0.5);
        let px = mid.get_pixel(0, 0).0;
        assert!(px[0] >= 127 && px[0] <= 128);
    }

    #[test]
    fn delay_floor_is_ten_ms() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("fast.gif");
        let options = ConversionOptions {
            width: 4,
            height: Some(4),
            fps: 200,
            ..Default::default()
        };
        let info = compose_gif(&[solid_png(4, 4, [1, 1, 1, 255])], &options, &dest).unwrap();
        assert_eq!(info.delay_ms, 10);
    }
}
