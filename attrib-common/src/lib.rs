//! # Attrib Common Library
//!
//! Shared code for the Attrib metadata tools including:
//! - Error types
//! - TOML configuration loading and resolution
//! - Logging initialization
//! - Event types (MetadataEvent enum) and the broadcast EventBus

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
