//! # gifforge-core
//!
//! Shared foundation for the gifforge crates: the unified [`Error`] type,
//! application [`config::Config`], and the conversion data model
//! ([`ConversionOptions`], [`TargetFormat`], [`EncodingTier`],
//! [`ConversionResult`]).

pub mod config;
pub mod error;
pub mod format;
pub mod options;

pub use error::{Error, Result};
pub use format::{ConversionResult, EncodingTier, TargetFormat};
pub use options::{Alignment, ConversionOptions, ImageTransform, Quality};
