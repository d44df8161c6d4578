//! Structured logging for store lifecycle and persistence failures

mod logger;

pub use logger::{Logger, Severity};
