//! Shared utilities for chartwatch
//!
//! This crate provides common functionality used across the chartwatch
//! workspace: logging setup, `.env` loading, environment value parsing, and
//! redaction of secrets before they reach a log line.

pub mod config;
pub mod logging;
pub mod redact;

pub use config::{load_env_file, parse_bool};
pub use logging::{LogOptions, init_tracing};
pub use redact::sanitize_for_logging;
