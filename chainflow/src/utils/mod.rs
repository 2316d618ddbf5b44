//! Utility functions.

mod timestamps;

pub use timestamps::{duration_ms, iso_timestamp, Timestamp};
