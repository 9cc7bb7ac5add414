//! Core traits for StyleCheck.
//!
//! These traits define the contracts for every external collaborator so the
//! pipeline can be wired against real services or mocks.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;
use crate::types::{NewOutfit, Outfit, User, UserStats};

// =============================================================================
// Vision / LLM Endpoint
// =============================================================================

/// A vision-capable chat-completion client.
#[async_trait]
pub trait VisionClient: Send + Sync {
    /// Send one rubric + inline image request and return the model's raw
    /// textual reply (`choices[0].message.content`).
    async fn critique_image(&self, rubric: &str, image_data_uri: &str) -> Result<String>;
}

// =============================================================================
// Backend Data Store
// =============================================================================

/// Persisted outfit records.
#[async_trait]
pub trait OutfitStore: Send + Sync {
    /// Create a new record.
    async fn create(&self, outfit: &NewOutfit) -> Result<Outfit>;

    /// List a user's records, newest first.
    async fn list(&self, user_id: &str) -> Result<Vec<Outfit>>;

    /// Fetch a single record by id.
    async fn get(&self, id: &str) -> Result<Option<Outfit>>;

    /// Delete a record by id.
    async fn delete(&self, id: &str) -> Result<()>;

    /// Search a user's records by occasion or feedback substring.
    async fn search(&self, user_id: &str, query: &str) -> Result<Vec<Outfit>>;

    /// Aggregate statistics over a user's records.
    async fn stats(&self, user_id: &str) -> Result<UserStats>;
}

// =============================================================================
// Object Storage
// =============================================================================

/// Binary object storage for outfit photos.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload bytes to a path and return a publicly reachable URL.
    async fn upload(&self, data: Bytes, path: &str, content_type: &str) -> Result<String>;

    /// Remove an object by path.
    async fn remove(&self, path: &str) -> Result<()>;
}

// =============================================================================
// Identity Provider
// =============================================================================

/// Authentication and user profile access.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Register a new account.
    async fn sign_up(&self, email: &str, password: &str, name: &str, age: Option<u32>)
        -> Result<User>;

    /// Authenticate with email and password.
    async fn sign_in(&self, email: &str, password: &str) -> Result<User>;

    /// End the current session.
    async fn sign_out(&self) -> Result<()>;

    /// The currently authenticated user, if any.
    async fn current_user(&self) -> Result<Option<User>>;
}

// =============================================================================
// Progress Notices
// =============================================================================

/// Sink for user-facing progress notices emitted by the workflow.
pub trait ProgressSink: Send + Sync {
    /// A transient persistence failure occurred and the workflow is about to
    /// retry (`attempt` of `max` attempts already used).
    fn retrying(&self, attempt: u32, max: u32);
}

/// Progress sink that only logs.
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn retrying(&self, attempt: u32, max: u32) {
        tracing::info!(attempt, max, "Retrying... Please wait.");
    }
}
