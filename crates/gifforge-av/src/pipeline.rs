//! Tiered video-to-GIF conversion orchestrator.
//!
//! Tries [`TwoPassEncoder`], then [`SimpleEncoder`], then [`BasicEncoder`],
//! stopping at the first tier that produces a verified, non-empty artifact.
//! Tier failures are logged with tier identity and converted into "try the
//! next tier"; only exhaustion of the whole chain surfaces an error, and
//! that error aggregates every tier's failure reason.
//!
//! Strictness is deliberately asymmetric: the two-pass tier treats a failed
//! probe as fatal (cheap to abandon before an expensive encode), the simple
//! tier only warns, and the basic tier does not probe at all.

use std::path::PathBuf;

use gifforge_core::config::OutputConfig;
use gifforge_core::{ConversionOptions, ConversionResult, EncodingTier, Error, Result, TargetFormat};

use crate::probe::MediaProbe;
use crate::scratch;
use crate::tiers::{BasicEncoder, SimpleEncoder, TwoPassEncoder};

/// Orchestrator for the video -> animated GIF fallback chain.
#[derive(Debug, Clone)]
pub struct GifPipeline {
    two_pass: TwoPassEncoder,
    simple: SimpleEncoder,
    basic: BasicEncoder,
    output: OutputConfig,
}

impl GifPipeline {
    /// Build a pipeline from resolved tool paths and output configuration.
    pub fn new(ffmpeg: PathBuf, ffprobe: PathBuf, output: OutputConfig) -> Self {
        let probe = MediaProbe::new(ffprobe);
        Self {
            two_pass: TwoPassEncoder::new(ffmpeg.clone(), probe.clone()),
            simple: SimpleEncoder::new(ffmpeg.clone(), probe),
            basic: BasicEncoder::new(ffmpeg),
            output,
        }
    }

    /// Convert an uploaded video (or image) to an animated GIF.
    ///
    /// The upload is saved to a scoped temp file which is removed on every
    /// exit path. Tiers run strictly in order and are never repeated; the
    /// first verified success wins.
    pub async fn convert_to_animated(
        &self,
        original_name: &str,
        bytes: &[u8],
        options: &ConversionOptions,
    ) -> Result<ConversionResult> {
        let input = scratch::save_scoped_input(original_name, bytes)?;

        let mut failures: Vec<(EncodingTier, Error)> = Vec::new();

        for tier in EncodingTier::ORDER {
            match self.attempt_tier(tier, &input, options).await {
                Ok(result) => {
                    tracing::info!(
                        tier = %tier,
                        output = %result.output_file,
                        size = result.file_size,
                        "GIF conversion succeeded"
                    );
                    return Ok(result);
                }
                Err(e) => {
                    tracing::warn!(tier = %tier, error = %e, "Encoding tier failed");
                    failures.push((tier, e));
                }
            }
        }

        let summary = failures
            .iter()
            .map(|(tier, e)| format!("{tier}: {e}"))
            .collect::<Vec<_>>()
            .join("; ");
        Err(Error::encode("all tiers exhausted", summary))
        // `input` drops here, deleting the scoped temp copy.
    }

    /// Run one tier against the scoped input and verify its output.
    async fn attempt_tier(
        &self,
        tier: EncodingTier,
        input: &tempfile::TempPath,
        options: &ConversionOptions,
    ) -> Result<ConversionResult> {
        let scoped_out = scratch::scoped_output("gif")?;

        match tier {
            EncodingTier::TwoPass => self.two_pass.encode(input, options, &scoped_out).await?,
            EncodingTier::Simple => self.simple.encode(input, options, &scoped_out).await?,
            EncodingTier::Basic => self.basic.encode(input, &scoped_out).await?,
        }

        // Exit 0 is not enough; an empty artifact is still a tier failure.
        let file_size = scratch::verify_artifact(&scoped_out)?;

        let output_file = scratch::unique_artifact_name("gif");
        let dest = self.output.category_dir("gifs").join(&output_file);
        scratch::persist(scoped_out, &dest)?;

        // Echo the options the tier actually honored.
        let mut echoed = options.clone();
        if tier == EncodingTier::Basic {
            echoed.width = BasicEncoder::width();
            echoed.height = None;
            echoed.fps = BasicEncoder::fps();
        }

        Ok(ConversionResult {
            output_file,
            path: dest,
            file_size,
            format: TargetFormat::Gif,
            tier: Some(tier),
            method: tier.as_str().to_string(),
            options: echoed,
        })
    }
}
