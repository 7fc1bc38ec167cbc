//! Metrics sinks.

mod json;

pub use json::JsonLinesSink;
