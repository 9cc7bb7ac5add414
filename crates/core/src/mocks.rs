//! Mock collaborators for testing without real network calls.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::error::{Error, Result};
use crate::traits::{OutfitStore, ProgressSink, VisionClient};
use crate::types::{NewOutfit, Outfit, UserStats};

/// Vision client that replays a scripted sequence of raw model replies.
///
/// The last reply repeats once the script is exhausted.
pub struct ScriptedVisionClient {
    replies: Mutex<VecDeque<String>>,
    last: Mutex<Option<String>>,
    calls: AtomicU32,
}

impl ScriptedVisionClient {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            last: Mutex::new(None),
            calls: AtomicU32::new(0),
        }
    }

    /// Number of requests issued so far.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VisionClient for ScriptedVisionClient {
    async fn critique_image(&self, _rubric: &str, _image_data_uri: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut replies = self
            .replies
            .lock()
            .map_err(|_| Error::internal("scripted replies lock poisoned"))?;
        if let Some(next) = replies.pop_front() {
            let mut last = self
                .last
                .lock()
                .map_err(|_| Error::internal("scripted replies lock poisoned"))?;
            *last = Some(next.clone());
            return Ok(next);
        }
        let last = self
            .last
            .lock()
            .map_err(|_| Error::internal("scripted replies lock poisoned"))?;
        last.clone()
            .ok_or_else(|| Error::internal("scripted vision client has no replies"))
    }
}

/// Vision client that always fails.
pub struct FailingVisionClient;

#[async_trait]
impl VisionClient for FailingVisionClient {
    async fn critique_image(&self, _rubric: &str, _image_data_uri: &str) -> Result<String> {
        Err(Error::ServiceUnavailable)
    }
}

/// Outfit store that fails the first `fail_times` create calls, then
/// succeeds. Used to exercise the retry wrapper.
pub struct FlakyOutfitStore {
    fail_times: u32,
    transient: bool,
    calls: AtomicU32,
    created: Mutex<Vec<Outfit>>,
}

impl FlakyOutfitStore {
    /// Fail `fail_times` create calls with a transient network error.
    pub fn transient(fail_times: u32) -> Self {
        Self {
            fail_times,
            transient: true,
            calls: AtomicU32::new(0),
            created: Mutex::new(Vec::new()),
        }
    }

    /// Fail `fail_times` create calls with a non-retryable persistence error.
    pub fn terminal(fail_times: u32) -> Self {
        Self {
            fail_times,
            transient: false,
            calls: AtomicU32::new(0),
            created: Mutex::new(Vec::new()),
        }
    }

    /// Number of create calls observed.
    pub fn create_calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    fn records(&self) -> Result<std::sync::MutexGuard<'_, Vec<Outfit>>> {
        self.created
            .lock()
            .map_err(|_| Error::internal("flaky store lock poisoned"))
    }
}

#[async_trait]
impl OutfitStore for FlakyOutfitStore {
    async fn create(&self, outfit: &NewOutfit) -> Result<Outfit> {
        let attempt = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt <= self.fail_times {
            return Err(if self.transient {
                Error::network("Network request failed")
            } else {
                Error::persistence("row violates row-level security policy")
            });
        }
        let now = Utc::now();
        let record = Outfit {
            id: format!("outfit-{}", attempt),
            user_id: outfit.user_id.clone(),
            image_url: outfit.image_url.clone(),
            rating: outfit.rating,
            occasion: outfit.occasion.clone(),
            suggestions: outfit.suggestions.clone(),
            feedback: outfit.feedback.clone(),
            created_at: now,
            updated_at: now,
        };
        self.records()?.push(record.clone());
        Ok(record)
    }

    async fn list(&self, user_id: &str) -> Result<Vec<Outfit>> {
        Ok(self
            .records()?
            .iter()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn get(&self, id: &str) -> Result<Option<Outfit>> {
        Ok(self.records()?.iter().find(|o| o.id == id).cloned())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.records()?.retain(|o| o.id != id);
        Ok(())
    }

    async fn search(&self, user_id: &str, query: &str) -> Result<Vec<Outfit>> {
        let query = query.to_lowercase();
        Ok(self
            .records()?
            .iter()
            .filter(|o| {
                o.user_id == user_id
                    && (o.occasion.to_lowercase().contains(&query)
                        || o.feedback.to_lowercase().contains(&query))
            })
            .cloned()
            .collect())
    }

    async fn stats(&self, user_id: &str) -> Result<UserStats> {
        let records = self.list(user_id).await?;
        Ok(UserStats {
            total_outfits: records.len(),
            average_rating: 0.0,
            favorite_occasion: String::new(),
        })
    }
}

/// Progress sink that records every notice it receives.
#[derive(Default)]
pub struct RecordingProgress {
    notices: Mutex<Vec<(u32, u32)>>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<(u32, u32)> {
        self.notices.lock().map(|n| n.clone()).unwrap_or_default()
    }
}

impl ProgressSink for RecordingProgress {
    fn retrying(&self, attempt: u32, max: u32) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push((attempt, max));
        }
    }
}
