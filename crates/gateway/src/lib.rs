//! HTTP surface and the analyze-and-save workflow.

pub mod server;
pub mod workflow;

pub use server::{AppState, ServerConfig, StyleCheckServer};
pub use workflow::{AnalyzeOutcome, OutfitWorkflow, RetryPolicy};
