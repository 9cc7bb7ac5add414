//! The outfit-analysis pipeline.
//!
//! Encode a photo as an inline data URI, request a critique from a
//! vision-capable model, repair and normalize the reply, and stabilize
//! repeated submissions through the consistency cache.

pub mod analyzer;
pub mod cache;
pub mod encoder;
pub mod normalize;
pub mod rubric;

pub use analyzer::OutfitAnalyzer;
pub use cache::{CachePolicy, ConsistencyCache};
pub use encoder::encode_image;
pub use normalize::{normalize_rating, parse_reply};
pub use rubric::CRITIQUE_RUBRIC;
