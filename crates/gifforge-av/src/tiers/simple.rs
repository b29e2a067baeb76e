//! Single-pass GIF encoding, used when the two-pass tier fails.
//!
//! Same scale/fps chain, no palette stage, and the container format is
//! forced explicitly instead of inferred from the output extension. As a
//! fallback tier it probes leniently: a failed probe is logged and the
//! encode proceeds anyway.

use std::path::{Path, PathBuf};
use std::time::Duration;

use gifforge_core::{ConversionOptions, Result};

use crate::command::ToolCommand;
use crate::filter;
use crate::probe::MediaProbe;

const ENCODE_TIMEOUT: Duration = Duration::from_secs(300);

/// The middle tier: one pass, explicit `-f gif`.
#[derive(Debug, Clone)]
pub struct SimpleEncoder {
    ffmpeg: PathBuf,
    probe: MediaProbe,
}

impl SimpleEncoder {
    pub fn new(ffmpeg: PathBuf, probe: MediaProbe) -> Self {
        Self { ffmpeg, probe }
    }

    /// Encode `input` to an animated GIF at `output` in a single pass.
    pub async fn encode(
        &self,
        input: &Path,
        options: &ConversionOptions,
        output: &Path,
    ) -> Result<()> {
        let probe = self.probe.probe(input).await;
        if !probe.valid {
            tracing::warn!(
                input = %input.display(),
                "Probe failed; proceeding with single-pass encode anyway"
            );
        }

        let mut cmd = ToolCommand::new(self.ffmpeg.clone());
        cmd.arg("-y").arg("-i").arg_path(input);
        cmd.args(filter::trim_args(options));
        cmd.arg("-vf").arg(filter::video_filters(options).join(","));
        cmd.arg("-f").arg("gif");
        cmd.args(filter::loop_args(options.loop_count));
        cmd.arg("-an");
        cmd.arg_path(output);
        cmd.timeout(ENCODE_TIMEOUT);
        cmd.execute().await?;

        Ok(())
    }
}
