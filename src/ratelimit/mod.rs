//! Rate accounting: dual-cap admission control and idle-entry eviction.

mod counter;
mod limiter;
mod sweeper;

pub use counter::{WindowCounter, WINDOW};
pub use limiter::RateLimiter;
pub use sweeper::Sweeper;
