//! Two-pass palette-optimized GIF encoding.
//!
//! Pass 1 computes an optimal 256-color palette for the whole clip; pass 2
//! maps every frame onto that palette with ordered dithering. Best quality,
//! most moving parts, so this tier is also the strictest about its input:
//! a failed probe aborts before any expensive encoding starts.

use std::path::{Path, PathBuf};
use std::time::Duration;

use gifforge_core::{ConversionOptions, Error, Result};

use crate::command::ToolCommand;
use crate::probe::MediaProbe;
use crate::{filter, scratch};

/// Per-stage timeout.
const STAGE_TIMEOUT: Duration = Duration::from_secs(300);

/// The highest-quality tier: palettegen then paletteuse.
#[derive(Debug, Clone)]
pub struct TwoPassEncoder {
    ffmpeg: PathBuf,
    probe: MediaProbe,
}

impl TwoPassEncoder {
    pub fn new(ffmpeg: PathBuf, probe: MediaProbe) -> Self {
        Self { ffmpeg, probe }
    }

    /// Encode `input` to an animated GIF at `output`.
    ///
    /// The palette intermediate is scoped to this call and removed whether
    /// stage 2 succeeds or fails.
    pub async fn encode(
        &self,
        input: &Path,
        options: &ConversionOptions,
        output: &Path,
    ) -> Result<()> {
        let probe = self.probe.probe(input).await;
        if !probe.valid {
            return Err(Error::Probe(
                "input is not a valid media file or has no video stream".into(),
            ));
        }

        let palette = scratch::scoped_palette()?;

        // Stage 1: palette generation.
        let mut palette_cmd = ToolCommand::new(self.ffmpeg.clone());
        palette_cmd.arg("-y").arg("-i").arg_path(input);
        palette_cmd.args(filter::trim_args(options));
        palette_cmd.arg("-vf").arg(filter::palette_filters(options));
        palette_cmd.arg_path(&palette);
        palette_cmd.timeout(STAGE_TIMEOUT);
        palette_cmd.execute().await?;

        // Stage 2: encode through the palette.
        let mut gif_cmd = ToolCommand::new(self.ffmpeg.clone());
        gif_cmd.arg("-y").arg("-i").arg_path(input);
        gif_cmd.arg("-i").arg_path(&palette);
        gif_cmd.args(filter::trim_args(options));
        gif_cmd
            .arg("-filter_complex")
            .arg(filter::paletteuse_graph(options));
        gif_cmd.args(filter::loop_args(options.loop_count));
        gif_cmd.arg("-an");
        gif_cmd.arg_path(output);
        gif_cmd.timeout(STAGE_TIMEOUT);
        gif_cmd.execute().await?;

        // `palette` drops here, deleting the intermediate on every path.
        Ok(())
    }
}
