//! Reverse conversion: animated GIF to video or still formats.
//!
//! Each target format maps to one encoder invocation. APNG is special:
//! encoder builds without the apng muxer are common, so the converter
//! checks capability up front and additionally catches the characteristic
//! "Unknown encoder" / "Invalid argument" failures at runtime, rebuilding
//! the animation frame-by-frame in-process when either trigger fires.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use gifforge_core::config::OutputConfig;
use gifforge_core::{ConversionOptions, ConversionResult, Error, Result, TargetFormat};

use crate::apng;
use crate::capability::ApngCapability;
use crate::command::ToolCommand;
use crate::filter;
use crate::scratch;

const ENCODE_TIMEOUT: Duration = Duration::from_secs(300);

/// Highest compression level the PNG encoder accepts.
const MAX_PNG_COMPRESSION: u8 = 9;

/// Converter from animated GIF inputs to mp4, webm, apng, and png.
#[derive(Debug, Clone)]
pub struct ReverseConverter {
    ffmpeg: std::path::PathBuf,
    capability: Arc<ApngCapability>,
    output: OutputConfig,
}

impl ReverseConverter {
    pub fn new(
        ffmpeg: std::path::PathBuf,
        capability: Arc<ApngCapability>,
        output: OutputConfig,
    ) -> Self {
        Self {
            ffmpeg,
            capability,
            output,
        }
    }

    /// Convert an uploaded GIF to `target`.
    ///
    /// The upload is saved to a scoped temp file that is removed on every
    /// exit path; only a verified artifact is moved into the export tree.
    pub async fn convert_from_animated(
        &self,
        bytes: &[u8],
        target: TargetFormat,
        options: &ConversionOptions,
    ) -> Result<ConversionResult> {
        if target == TargetFormat::Gif {
            return Err(Error::Validation(
                "input is already a GIF; pick a different output format".into(),
            ));
        }

        let input = scratch::save_scoped_input("input.gif", bytes)?;
        let scoped_out = scratch::scoped_output(target.extension())?;

        let method = match target {
            TargetFormat::Mp4 => {
                self.encode_x264(&input, options, &scoped_out).await?;
                "ffmpeg"
            }
            TargetFormat::Webm => {
                self.encode_vp9(&input, options, &scoped_out).await?;
                "ffmpeg"
            }
            TargetFormat::Png => {
                self.extract_first_frame(&input, options, &scoped_out)
                    .await?;
                "ffmpeg"
            }
            TargetFormat::Apng => self.encode_apng(bytes, &input, options, &scoped_out).await?,
            TargetFormat::Gif => unreachable!(),
        };

        let file_size = scratch::verify_artifact(&scoped_out)?;
        let output_file = scratch::unique_artifact_name(target.extension());
        let dest = self.output.category_dir(target.category()).join(&output_file);
        scratch::persist(scoped_out, &dest)?;

        tracing::info!(
            format = %target,
            method,
            output = %output_file,
            size = file_size,
            "Reverse conversion succeeded"
        );

        Ok(ConversionResult {
            output_file,
            path: dest,
            file_size,
            format: target,
            tier: None,
            method: method.to_string(),
            options: options.clone(),
        })
    }

    async fn encode_x264(
        &self,
        input: &Path,
        options: &ConversionOptions,
        output: &Path,
    ) -> Result<()> {
        let vf = format!(
            "{},fps={}",
            filter::plain_scale(options.width, options.height),
            options.fps
        );

        let mut cmd = ToolCommand::new(self.ffmpeg.clone());
        cmd.arg("-y").arg("-i").arg_path(input);
        cmd.arg("-vf").arg(vf);
        cmd.args(["-c:v", "libx264", "-preset", "medium"]);
        cmd.arg("-crf").arg(options.quality.x264_crf());
        // Broad-player compatibility and progressive download.
        cmd.args(["-pix_fmt", "yuv420p", "-movflags", "+faststart"]);
        cmd.arg_path(output);
        cmd.timeout(ENCODE_TIMEOUT);
        cmd.execute().await?;
        Ok(())
    }

    async fn encode_vp9(
        &self,
        input: &Path,
        options: &ConversionOptions,
        output: &Path,
    ) -> Result<()> {
        let vf = format!(
            "{},fps={}",
            filter::plain_scale(options.width, options.height),
            options.fps
        );
        let (crf, bitrate) = options.quality.vp9_settings();

        let mut cmd = ToolCommand::new(self.ffmpeg.clone());
        cmd.arg("-y").arg("-i").arg_path(input);
        cmd.arg("-vf").arg(vf);
        cmd.args(["-c:v", "libvpx-vp9"]);
        cmd.arg("-crf").arg(crf);
        cmd.arg("-b:v").arg(bitrate);
        cmd.arg_path(output);
        cmd.timeout(ENCODE_TIMEOUT);
        cmd.execute().await?;
        Ok(())
    }

    /// Extract the first frame as a still PNG.
    async fn extract_first_frame(
        &self,
        input: &Path,
        options: &ConversionOptions,
        output: &Path,
    ) -> Result<()> {
        let mut cmd = ToolCommand::new(self.ffmpeg.clone());
        cmd.arg("-y").arg("-i").arg_path(input);
        cmd.args(["-vframes", "1", "-c:v", "png"]);
        cmd.arg("-vf")
            .arg(filter::plain_scale(options.width, options.height));
        cmd.arg_path(output);
        cmd.timeout(ENCODE_TIMEOUT);
        cmd.execute().await?;
        Ok(())
    }

    /// Encode APNG natively, or rebuild it frame-by-frame when the encoder
    /// build cannot. Returns the method label for the result.
    async fn encode_apng(
        &self,
        gif_bytes: &[u8],
        input: &Path,
        options: &ConversionOptions,
        output: &Path,
    ) -> Result<&'static str> {
        if !self.capability.supports_apng().await {
            tracing::info!("Encoder lacks APNG support; using frame reconstruction");
            self.reconstruct_apng(gif_bytes, options, output).await?;
            return Ok("frame_reconstruction");
        }

        match self.encode_apng_native(input, options, output).await {
            Ok(()) => Ok("ffmpeg"),
            Err(Error::Tool { message, .. })
                if message.contains("Unknown encoder") || message.contains("Invalid argument") =>
            {
                tracing::warn!("Native APNG encode rejected; using frame reconstruction");
                self.reconstruct_apng(gif_bytes, options, output).await?;
                Ok("frame_reconstruction")
            }
            Err(e) => Err(e),
        }
    }

    async fn encode_apng_native(
        &self,
        input: &Path,
        options: &ConversionOptions,
        output: &Path,
    ) -> Result<()> {
        let compression = options.compression.min(MAX_PNG_COMPRESSION);

        let mut cmd = ToolCommand::new(self.ffmpeg.clone());
        cmd.arg("-y").arg("-i").arg_path(input);
        cmd.arg("-vf")
            .arg(filter::plain_scale(options.width, options.height));
        cmd.args(["-c:v", "png", "-f", "apng"]);
        cmd.arg("-compression_level").arg(compression.to_string());
        // Loop indefinitely, like the source GIF.
        cmd.args(["-plays", "0"]);
        cmd.arg_path(output);
        cmd.timeout(ENCODE_TIMEOUT);
        cmd.execute().await?;
        Ok(())
    }

    async fn reconstruct_apng(
        &self,
        gif_bytes: &[u8],
        options: &ConversionOptions,
        output: &Path,
    ) -> Result<()> {
        let bytes = gif_bytes.to_vec();
        let opts = options.clone();
        let dest = output.to_path_buf();
        tokio::task::spawn_blocking(move || apng::reconstruct(&bytes, &opts, &dest))
            .await
            .map_err(|e| Error::Internal(format!("APNG reconstruction task failed: {e}")))?
    }
}
