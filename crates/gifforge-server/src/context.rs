//! Shared application context.
//!
//! [`AppContext`] is the state handed to every route handler. It wraps the
//! immutable configuration, the discovered tool registry, and the memoized
//! APNG capability in `Arc`s; converters themselves are cheap and are built
//! per request from the resolved tool paths.

use std::sync::Arc;

use gifforge_av::{ApngCapability, GifPipeline, ReverseConverter, ToolRegistry};
use gifforge_core::config::Config;
use gifforge_core::Result;

/// Application state shared across route handlers via Axum state.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub tools: Arc<ToolRegistry>,
    pub apng: Arc<ApngCapability>,
}

impl AppContext {
    /// Build a context, discovering tools from config.
    pub fn new(config: Config) -> Self {
        let tools = Arc::new(ToolRegistry::discover(&config.tools));
        Self::with_tools(config, tools)
    }

    /// Build a context around an existing registry. The APNG capability is
    /// bound to the discovered encoder; without one it is pinned to
    /// "unsupported" so APNG requests go straight to frame reconstruction.
    pub fn with_tools(config: Config, tools: Arc<ToolRegistry>) -> Self {
        let apng = match tools.require("ffmpeg") {
            Ok(cfg) => ApngCapability::new(cfg.path.clone()),
            Err(_) => ApngCapability::preset(false),
        };
        Self {
            config: Arc::new(config),
            tools,
            apng: Arc::new(apng),
        }
    }

    /// Tiered video-to-GIF pipeline for this request.
    pub fn gif_pipeline(&self) -> Result<GifPipeline> {
        let ffmpeg = self.tools.require("ffmpeg")?.path.clone();
        let ffprobe = self.tools.require("ffprobe")?.path.clone();
        Ok(GifPipeline::new(ffmpeg, ffprobe, self.config.output.clone()))
    }

    /// Reverse (GIF to video/raster) converter for this request.
    pub fn reverse_converter(&self) -> Result<ReverseConverter> {
        let ffmpeg = self.tools.require("ffmpeg")?.path.clone();
        Ok(ReverseConverter::new(
            ffmpeg,
            Arc::clone(&self.apng),
            self.config.output.clone(),
        ))
    }
}
