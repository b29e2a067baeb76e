//! Last-resort GIF encoding with hard-capped parameters.
//!
//! Ignores almost every caller option and skips probing entirely. Fixed
//! 320px width, 10fps, first 5 seconds only. Exists to squeeze *some*
//! artifact out of inputs broken enough to defeat the other two tiers.

use std::path::{Path, PathBuf};
use std::time::Duration;

use gifforge_core::Result;

use crate::command::ToolCommand;

const ENCODE_TIMEOUT: Duration = Duration::from_secs(120);

/// Hard caps applied regardless of the request.
const BASIC_WIDTH: u32 = 320;
const BASIC_FPS: u32 = 10;
const BASIC_MAX_SECONDS: u32 = 5;

/// The last-resort tier.
#[derive(Debug, Clone)]
pub struct BasicEncoder {
    ffmpeg: PathBuf,
}

impl BasicEncoder {
    pub fn new(ffmpeg: PathBuf) -> Self {
        Self { ffmpeg }
    }

    /// Width the basic tier always encodes at.
    pub fn width() -> u32 {
        BASIC_WIDTH
    }

    /// Frame rate the basic tier always encodes at.
    pub fn fps() -> u32 {
        BASIC_FPS
    }

    /// Encode the first seconds of `input` to a small GIF at `output`.
    pub async fn encode(&self, input: &Path, output: &Path) -> Result<()> {
        let mut cmd = ToolCommand::new(self.ffmpeg.clone());
        cmd.arg("-y").arg("-i").arg_path(input);
        cmd.arg("-vf")
            .arg(format!("scale={BASIC_WIDTH}:-1,fps={BASIC_FPS}"));
        cmd.arg("-t").arg(BASIC_MAX_SECONDS.to_string());
        cmd.arg("-f").arg("gif");
        cmd.arg("-an");
        cmd.arg_path(output);
        cmd.timeout(ENCODE_TIMEOUT);
        cmd.execute().await?;

        Ok(())
    }
}
