//! Core types, traits, and error definitions for StyleCheck.
//!
//! This crate provides the foundational building blocks shared across all
//! layers of the outfit-critique service.

pub mod config;
pub mod error;
pub mod mocks;
pub mod traits;
pub mod types;

pub use config::{AnalysisConfig, AppConfig, BackendConfig, ModelConfig};
pub use error::{Error, Result};
pub use traits::*;
pub use types::*;
