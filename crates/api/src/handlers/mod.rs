//! Request handlers. Each validates its payload against the configured
//! field limits, then delegates to the matching rule engine.

pub mod category;
pub mod task;
