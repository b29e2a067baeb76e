//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`], which builds a full [`AppContext`] around stub
//! `ffmpeg`/`ffprobe` shell scripts and starts Axum on a random port for
//! HTTP-level testing. The stubs emit believable output (valid probe JSON,
//! a non-empty artifact written to the last argument) so the whole pipeline
//! runs without a real encoder installed.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use gifforge_av::ToolRegistry;
use gifforge_core::config::Config;
use gifforge_server::context::AppContext;
use gifforge_server::router::build_router;

/// A stub ffmpeg that always succeeds, reports APNG support, and writes a
/// non-empty artifact to its last argument. `{LOG}` is replaced with a
/// per-harness file that accumulates one line per invocation.
pub const FFMPEG_OK: &str = r#"#!/bin/sh
echo "$@" >> "{LOG}"
if [ "$1" = "-formats" ]; then
  echo "DE apng  Animated Portable Network Graphics"
  exit 0
fi
if [ "$1" = "-version" ]; then
  echo "ffmpeg version 6.0-stub"
  exit 0
fi
for last in "$@"; do :; done
printf 'GIF89a-stub-artifact-data' > "$last"
"#;

/// Like [`FFMPEG_OK`] but rejects any palette-stage invocation, forcing the
/// pipeline off the two-pass tier.
pub const FFMPEG_NO_PALETTE: &str = r#"#!/bin/sh
echo "$@" >> "{LOG}"
if [ "$1" = "-formats" ]; then
  echo "DE apng  Animated Portable Network Graphics"
  exit 0
fi
if [ "$1" = "-version" ]; then
  echo "ffmpeg version 6.0-stub"
  exit 0
fi
case "$*" in
  *palette*) echo "No such filter: palettegen" >&2; exit 1;;
esac
for last in "$@"; do :; done
printf 'GIF89a-stub-artifact-data' > "$last"
"#;

/// An ffmpeg that fails every encode attempt.
pub const FFMPEG_ALWAYS_FAILS: &str = r#"#!/bin/sh
echo "$@" >> "{LOG}"
if [ "$1" = "-version" ]; then
  echo "ffmpeg version 6.0-stub"
  exit 0
fi
echo "Conversion failed!" >&2
exit 1
"#;

/// Like [`FFMPEG_OK`] but without APNG in the muxer list.
pub const FFMPEG_NO_APNG: &str = r#"#!/bin/sh
echo "$@" >> "{LOG}"
if [ "$1" = "-formats" ]; then
  echo "DE gif  CompuServe Graphics Interchange Format"
  exit 0
fi
if [ "$1" = "-version" ]; then
  echo "ffmpeg version 6.0-stub"
  exit 0
fi
for last in "$@"; do :; done
printf 'GIF89a-stub-artifact-data' > "$last"
"#;

/// A stub ffprobe that reports one video stream for any input.
pub const FFPROBE_OK: &str = r#"#!/bin/sh
if [ "$1" = "-version" ]; then
  echo "ffprobe version 6.0-stub"
  exit 0
fi
echo '{"format":{"format_name":"gif"},"streams":[{"codec_type":"video"}]}'
"#;

/// A stub ffprobe that reports an audio-only file.
pub const FFPROBE_NO_VIDEO: &str = r#"#!/bin/sh
if [ "$1" = "-version" ]; then
  echo "ffprobe version 6.0-stub"
  exit 0
fi
echo '{"format":{"format_name":"mp3"},"streams":[{"codec_type":"audio"}]}'
"#;

pub struct TestHarness {
    pub ctx: AppContext,
    pub output_root: PathBuf,
    /// One line per stub-ffmpeg invocation (full argument list).
    pub ffmpeg_log: PathBuf,
    _output_dir: TempDir,
    _tools_dir: TempDir,
}

impl TestHarness {
    /// Harness with the always-succeeding stub tools.
    pub fn new() -> Self {
        Self::with_stubs(FFMPEG_OK, FFPROBE_OK)
    }

    /// Harness with custom stub tool scripts.
    pub fn with_stubs(ffmpeg_script: &str, ffprobe_script: &str) -> Self {
        let tools_dir = TempDir::new().expect("failed to create tools dir");
        let ffmpeg_log = tools_dir.path().join("ffmpeg-invocations.log");
        let ffmpeg_script = ffmpeg_script.replace("{LOG}", &ffmpeg_log.to_string_lossy());
        let ffmpeg = write_stub(tools_dir.path(), "ffmpeg", &ffmpeg_script);
        let ffprobe = write_stub(tools_dir.path(), "ffprobe", ffprobe_script);

        let output_dir = TempDir::new().expect("failed to create output dir");
        let mut config = Config::default();
        config.output.root = output_dir.path().to_path_buf();
        config.output.ensure_dirs().expect("failed to create export dirs");

        let tools = Arc::new(ToolRegistry::with_paths(ffmpeg, ffprobe));
        let ctx = AppContext::with_tools(config, tools);

        Self {
            ctx,
            output_root: output_dir.path().to_path_buf(),
            ffmpeg_log,
            _output_dir: output_dir,
            _tools_dir: tools_dir,
        }
    }

    /// Argument lines of every stub-ffmpeg invocation so far, excluding the
    /// discovery-time `-version` call.
    pub fn ffmpeg_invocations(&self) -> Vec<String> {
        std::fs::read_to_string(&self.ffmpeg_log)
            .unwrap_or_default()
            .lines()
            .filter(|l| !l.starts_with("-version") && !l.starts_with("-formats"))
            .map(str::to_string)
            .collect()
    }

    /// Start an Axum server on a random port and return the harness together
    /// with its base URL.
    pub async fn with_server() -> (Self, String) {
        Self::serve(Self::new()).await
    }

    pub async fn with_server_stubs(ffmpeg_script: &str, ffprobe_script: &str) -> (Self, String) {
        Self::serve(Self::with_stubs(ffmpeg_script, ffprobe_script)).await
    }

    async fn serve(harness: Self) -> (Self, String) {
        let app = build_router(harness.ctx.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr: SocketAddr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        (harness, format!("http://{addr}"))
    }
}

fn write_stub(dir: &Path, name: &str, script: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, script).expect("failed to write stub script");
    let mut perms = std::fs::metadata(&path).expect("stub metadata").permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).expect("failed to chmod stub");
    path
}

/// Minimal single-frame GIF bytes, produced through the composer so tests
/// have a decodable animated input.
pub fn sample_gif_bytes() -> Vec<u8> {
    use image::{DynamicImage, RgbImage};

    let img = RgbImage::from_pixel(8, 8, image::Rgb([120, 40, 200]));
    let mut png = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
        .expect("png encode");

    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("sample.gif");
    let options = gifforge_core::ConversionOptions {
        width: 8,
        height: Some(8),
        fps: 5,
        ..Default::default()
    };
    gifforge_compose::compose_gif(&[png], &options, &path).expect("compose sample gif");
    std::fs::read(&path).expect("read sample gif")
}

/// The standard task body for a conversion request.
pub fn task_body(output_format: &str, options: serde_json::Value) -> String {
    serde_json::json!({
        "tasks": { "convert": { "output_format": output_format, "options": options } }
    })
    .to_string()
}
