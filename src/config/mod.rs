//! Configuration module for mathdown
//!
//! This module handles per-editor settings and style overrides,
//! including serialization/deserialization to/from JSON and
//! persistent storage to platform-specific directories.

mod persistence;
mod settings;

pub use persistence::*;
pub use settings::*;
