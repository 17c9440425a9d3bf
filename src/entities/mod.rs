//! Record types and the harvest, lookup, join and prediction workflows built on them.

pub mod annotation;
pub mod genome;
pub mod joined;
pub mod prediction;
pub mod snp_info;

/// Default cap on in-flight catalog requests; `0` launches every request at once.
pub const DEFAULT_CONCURRENCY: usize = 0;
