//! Utility functions for formatting and hashing.

pub mod fingerprint;
pub mod format;

// Re-export commonly used functions at module level
pub use fingerprint::email_fingerprint;
pub use format::{format_age, pad2};
