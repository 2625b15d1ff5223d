//! Utility functions for string formatting and payload input.

pub mod format;

pub use format::{format_date, format_optional, merge_payload, parse_payload, truncate_string};
