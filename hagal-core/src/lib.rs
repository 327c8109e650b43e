//! Hagal-Core
//!
//! Query model shared by the datasource and its front ends, plus the JSON shapes
//! exchanged with the Hagal metrics API.

pub mod proxy;
pub mod query;

/// One day in milliseconds, the size of the live tail of a split window.
pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;
