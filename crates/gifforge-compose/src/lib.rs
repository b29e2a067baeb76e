//! In-process image-sequence to GIF composition.
//!
//! Unlike the video pipeline in `gifforge-av`, composition never shells out:
//! frames are decoded, transformed, and laid out with the `image` crate and
//! encoded with the `gif` crate.

pub mod composer;
pub mod layout;

pub use composer::{compose_gif, ComposeInfo};
