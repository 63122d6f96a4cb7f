//! Chat statistics backend library.
//!
//! Exposes the aggregation core and the HTTP surface for use by the binary
//! and tests.

pub mod api;
pub mod config;
pub mod middleware;
pub mod models;
pub mod stats;
