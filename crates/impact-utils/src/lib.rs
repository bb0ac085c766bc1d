//! Shared utilities for the news impact workspace
//!
//! This crate provides the ambient pieces every binary in the workspace needs:
//! tracing subscriber setup and environment-driven application configuration.

pub mod config;
pub mod logging;

pub use config::{Config, ConfigError, LogFormat};
pub use logging::{init_tracing, init_tracing_with};
