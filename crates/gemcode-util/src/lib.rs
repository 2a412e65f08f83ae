//! Shared utilities for gemcode.
//!
//! This crate provides common utilities used across the gemcode workspace:
//! - Path containment checks for the workspace sandbox
//! - Logging setup with tracing

pub mod log;
pub mod path;

pub use path::{is_within, normalize, safe_join};
