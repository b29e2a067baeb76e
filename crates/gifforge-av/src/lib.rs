//! External-tool integration for gifforge.
//!
//! This crate owns everything that touches ffmpeg and ffprobe: tool
//! discovery, command execution with timeouts, media probing, filter-graph
//! construction, the tiered video-to-GIF pipeline, and the reverse
//! GIF-to-video converter with its in-process APNG fallback.

pub mod apng;
pub mod capability;
pub mod command;
pub mod filter;
pub mod pipeline;
pub mod probe;
pub mod reverse;
pub mod scratch;
pub mod tiers;
pub mod tools;

pub use capability::ApngCapability;
pub use command::{ToolCommand, ToolOutput};
pub use pipeline::GifPipeline;
pub use probe::{MediaProbe, ProbeResult};
pub use reverse::ReverseConverter;
pub use tools::{ToolInfo, ToolRegistry};
