//! Shared utilities for insightify
//!
//! This crate provides common functionality used across the insightify workspace:
//! tracing setup and the runtime environment the binaries run under.

pub mod config;
pub mod logging;

pub use config::Config;
pub use logging::{LogFormat, init_tracing};
