//! Media validation via the external prober.
//!
//! [`MediaProbe::probe`] shells out to
//! `ffprobe -v quiet -print_format json -show_format -show_streams` and
//! reduces the structured output to a [`ProbeResult`]. It never returns an
//! error: unreadable files, malformed output, timeouts, and missing video
//! streams all become `valid = false`. Callers decide strictness.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::command::ToolCommand;

/// Probe timeout: a prober that takes longer than this is not going to
/// tell us anything useful.
const PROBE_TIMEOUT: Duration = Duration::from_secs(30);

/// Result of probing an input file.
#[derive(Debug, Clone)]
pub struct ProbeResult {
    /// Whether the file is readable media with at least one video stream.
    pub valid: bool,
    /// Container format name reported by the prober, when available.
    pub detected_format: Option<String>,
    /// Whether any stream has `codec_type == "video"`.
    pub has_video_stream: bool,
}

impl ProbeResult {
    fn invalid() -> Self {
        Self {
            valid: false,
            detected_format: None,
            has_video_stream: false,
        }
    }
}

/// Prober backed by the ffprobe CLI.
#[derive(Debug, Clone)]
pub struct MediaProbe {
    ffprobe: PathBuf,
}

impl MediaProbe {
    /// Create a prober using the given ffprobe path.
    pub fn new(ffprobe: PathBuf) -> Self {
        Self { ffprobe }
    }

    /// Probe a media file. Always returns a result, never an error.
    pub async fn probe(&self, path: &Path) -> ProbeResult {
        let result = ToolCommand::new(self.ffprobe.clone())
            .args(["-v", "quiet", "-print_format", "json", "-show_format", "-show_streams"])
            .arg_path(path)
            .timeout(PROBE_TIMEOUT)
            .execute()
            .await;

        match result {
            Ok(output) => {
                let parsed = parse_probe_output(&output.stdout);
                if parsed.valid {
                    tracing::debug!(
                        format = parsed.detected_format.as_deref().unwrap_or("unknown"),
                        "Probe succeeded"
                    );
                } else {
                    tracing::debug!("Probe parsed but input is not valid video media");
                }
                parsed
            }
            Err(e) => {
                tracing::debug!(error = %e, "Probe failed");
                ProbeResult::invalid()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// JSON structures
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: Option<FfprobeFormat>,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    format_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
}

/// Reduce prober JSON to a [`ProbeResult`]. Malformed JSON or missing
/// format/stream sections yield `valid = false`.
fn parse_probe_output(stdout: &str) -> ProbeResult {
    let parsed: FfprobeOutput = match serde_json::from_str(stdout) {
        Ok(p) => p,
        Err(_) => return ProbeResult::invalid(),
    };

    let Some(format) = parsed.format else {
        return ProbeResult::invalid();
    };

    let has_video_stream = parsed
        .streams
        .iter()
        .any(|s| s.codec_type.as_deref() == Some("video"));

    ProbeResult {
        valid: has_video_stream,
        detected_format: format.format_name,
        has_video_stream,
    }
}
