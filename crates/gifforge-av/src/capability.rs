//! Encoder capability probing.
//!
//! Environments vary wildly in what their encoder build supports; APNG in
//! particular is missing from older distributions. The check is a pure
//! question ("does `ffmpeg -formats` list apng?") memoized in an explicit,
//! injectable cache rather than an implicit global, so tests and callers
//! can pin the answer.

use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::OnceCell;

use crate::command::ToolCommand;

const FORMATS_TIMEOUT: Duration = Duration::from_secs(10);

/// Memoized "does the encoder support APNG output" check.
#[derive(Debug)]
pub struct ApngCapability {
    ffmpeg: PathBuf,
    cached: OnceCell<bool>,
}

impl ApngCapability {
    /// Lazily-probed capability for the given encoder binary.
    pub fn new(ffmpeg: PathBuf) -> Self {
        Self {
            ffmpeg,
            cached: OnceCell::new(),
        }
    }

    /// A capability with a pinned answer; no process is ever spawned.
    pub fn preset(supported: bool) -> Self {
        Self {
            ffmpeg: PathBuf::new(),
            cached: OnceCell::from(supported),
        }
    }

    /// Whether the encoder supports the APNG muxer. Probed at most once
    /// per process; any probe failure is treated as "unsupported".
    pub async fn supports_apng(&self) -> bool {
        *self
            .cached
            .get_or_init(|| async {
                let result = ToolCommand::new(self.ffmpeg.clone())
                    .arg("-formats")
                    .timeout(FORMATS_TIMEOUT)
                    .execute()
                    .await;

                match result {
                    Ok(output) => {
                        let supported = output.stdout.to_lowercase().contains("apng");
                        tracing::debug!(supported, "APNG capability probe completed");
                        supported
                    }
                    Err(e) => {
                        tracing::debug!(error = %e, "APNG capability probe failed");
                        false
                    }
                }
            })
            .await
    }
}
