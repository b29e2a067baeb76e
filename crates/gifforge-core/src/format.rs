//! Target formats and encoding tiers.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::options::ConversionOptions;
use crate::Error;

/// Closed set of conversion target formats.
///
/// String dispatch from the request body happens exactly once, at the edge
/// (`FromStr`); everything downstream matches exhaustively on this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    Gif,
    Mp4,
    Webm,
    Apng,
    Png,
}

impl TargetFormat {
    /// File extension for artifacts of this format.
    pub fn extension(self) -> &'static str {
        match self {
            TargetFormat::Gif => "gif",
            TargetFormat::Mp4 => "mp4",
            TargetFormat::Webm => "webm",
            TargetFormat::Apng => "apng",
            TargetFormat::Png => "png",
        }
    }

    /// Download category directory for this format.
    pub fn category(self) -> &'static str {
        match self {
            TargetFormat::Gif => "gifs",
            TargetFormat::Mp4 | TargetFormat::Webm => "videos",
            TargetFormat::Apng | TargetFormat::Png => "images",
        }
    }

    pub fn as_str(self) -> &'static str {
        self.extension()
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gif" => Ok(TargetFormat::Gif),
            "mp4" => Ok(TargetFormat::Mp4),
            "webm" => Ok(TargetFormat::Webm),
            "apng" => Ok(TargetFormat::Apng),
            "png" => Ok(TargetFormat::Png),
            other => Err(Error::Validation(format!(
                "unsupported output format: {other}"
            ))),
        }
    }
}

/// Ordered fallback chain for video -> GIF encoding.
///
/// Tiers are attempted strictly in declaration order and never repeated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodingTier {
    TwoPass,
    Simple,
    Basic,
}

impl EncodingTier {
    /// All tiers, highest quality first.
    pub const ORDER: [EncodingTier; 3] =
        [EncodingTier::TwoPass, EncodingTier::Simple, EncodingTier::Basic];

    /// Wire name reported in the `gif_info.method` response field.
    pub fn as_str(self) -> &'static str {
        match self {
            EncodingTier::TwoPass => "two_pass",
            EncodingTier::Simple => "simple",
            EncodingTier::Basic => "basic",
        }
    }
}

impl fmt::Display for EncodingTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a successful conversion, echoed back to the HTTP layer.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionResult {
    /// Artifact file name (`<uuid>.<ext>`).
    pub output_file: String,
    /// Absolute path to the artifact on disk.
    pub path: PathBuf,
    /// Artifact size in bytes. Always non-zero for a success.
    pub file_size: u64,
    /// Format of the artifact.
    pub format: TargetFormat,
    /// Tier that produced the artifact, when the tier chain was used.
    pub tier: Option<EncodingTier>,
    /// Conversion method label (`two_pass`, `simple`, `basic`, `ffmpeg`,
    /// `frame_reconstruction`, `compose`).
    pub method: String,
    /// Options the conversion actually honored, echoed to the caller.
    pub options: ConversionOptions,
}
