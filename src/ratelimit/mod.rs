//! Rate Limiting Module
//!
//! Per-client sliding-window admission control with a long window and a
//! burst window.

mod limiter;
mod window;

pub use limiter::{Decision, SlidingWindowLimiter};
pub use window::RateWindow;
