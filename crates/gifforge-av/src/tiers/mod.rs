//! The three encoding tiers of the GIF pipeline, highest quality first.
//!
//! Each tier owns its own command construction and timeout; the orchestrator
//! in [`crate::pipeline`] tries them strictly in order.

mod basic;
mod simple;
mod two_pass;

pub use basic::BasicEncoder;
pub use simple::SimpleEncoder;
pub use two_pass::TwoPassEncoder;
