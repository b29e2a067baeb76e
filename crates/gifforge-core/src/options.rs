//! Conversion request options shared by every converter.
//!
//! [`ConversionOptions`] mirrors the `options` object of the task body:
//!
//! ```json
//! { "tasks": { "convert": { "output_format": "gif", "options": {
//!     "width": 400, "fps": 15, "loop_count": 0, "transparency": true,
//!     "trim_start": "00:00:05.00", "alignment": "center" } } } }
//! ```
//!
//! Every field has a serde default so an empty `{}` options object is valid.

use serde::{Deserialize, Serialize};

/// Options accepted by all conversion paths. Unknown fields are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionOptions {
    /// Output width in pixels.
    pub width: u32,
    /// Output height; omitted means "preserve aspect ratio".
    pub height: Option<u32>,
    /// Output frame rate.
    pub fps: u32,
    /// GIF loop count; 0 means loop forever.
    pub loop_count: u16,
    /// Seek position timecode (e.g. "00:00:05.00").
    pub trim_start: Option<String>,
    /// End timecode (with trim_start) or duration (without).
    pub trim_end: Option<String>,
    /// Compression level 0-10 (clamped to the encoder's range where applied).
    pub compression: u8,
    /// Reserve a transparent palette slot / preserve alpha.
    pub transparency: bool,
    /// Canvas anchor for composed frames.
    pub alignment: Alignment,
    /// Synthesize blended transition frames between composed images.
    pub crossfade: bool,
    /// Pre-resize composed frames to the target width, preserving aspect.
    pub trim_images: bool,
    /// Quality preset for reverse (GIF -> video) conversion.
    pub quality: Quality,
    /// Per-frame transforms for image-sequence composition, keyed by index.
    pub image_transforms: Vec<ImageTransform>,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: None,
            fps: default_fps(),
            loop_count: 0,
            trim_start: None,
            trim_end: None,
            compression: default_compression(),
            transparency: true,
            alignment: Alignment::Center,
            crossfade: false,
            trim_images: false,
            quality: Quality::Medium,
            image_transforms: Vec::new(),
        }
    }
}

fn default_width() -> u32 {
    400
}

fn default_fps() -> u32 {
    15
}

fn default_compression() -> u8 {
    6
}

impl ConversionOptions {
    /// Find the transform declared for the frame at `index`, if any.
    pub fn transform_for(&self, index: usize) -> Option<&ImageTransform> {
        let key = index.to_string();
        self.image_transforms.iter().find(|t| t.id == key)
    }
}

/// A declared transform for one frame of an image sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageTransform {
    /// Frame index as a string (matches the upload order).
    pub id: String,
    /// Clockwise rotation in degrees.
    #[serde(default)]
    pub rotation: i32,
    /// Scale factor; 1.0 is unchanged.
    #[serde(default = "default_zoom")]
    pub zoom: f32,
}

fn default_zoom() -> f32 {
    1.0
}

/// Nine-position canvas anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Alignment {
    TopLeft,
    TopMiddle,
    TopRight,
    MiddleLeft,
    Center,
    MiddleRight,
    BottomLeft,
    BottomMiddle,
    BottomRight,
}

/// Quality preset mapped to encoder rate-control settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    High,
    Medium,
    Low,
}

impl Quality {
    /// Constant-rate-factor for libx264.
    pub fn x264_crf(self) -> &'static str {
        match self {
            Quality::High => "18",
            Quality::Medium => "23",
            Quality::Low => "28",
        }
    }

    /// (CRF, target bitrate) for libvpx-vp9.
    pub fn vp9_settings(self) -> (&'static str, &'static str) {
        match self {
            Quality::High => ("15", "2M"),
            Quality::Medium => ("23", "1M"),
            Quality::Low => ("35", "500K"),
        }
    }
}
