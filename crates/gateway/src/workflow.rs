//! The analyze-and-save workflow: encode, critique, upload, persist with
//! retries, and fall back to a local record when the backend stays down.

use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use chrono::Utc;
use uuid::Uuid;

use stylecheck_analysis::{encode_image, OutfitAnalyzer};
use stylecheck_core::{
    ImagePayload, NewOutfit, ObjectStore, Outfit, OutfitStore, ProgressSink, Result,
};
use stylecheck_store::InMemoryOutfitStore;

/// Retry settings for persistence.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Pause between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    pub fn from_analysis_config(cfg: &stylecheck_core::AnalysisConfig) -> Self {
        Self {
            max_attempts: cfg.max_retries,
            delay: Duration::from_millis(cfg.retry_delay_ms),
        }
    }
}

/// What the workflow produced: the saved record, and whether it actually
/// reached the backend or only the local holding store.
#[derive(Debug, Clone)]
pub struct AnalyzeOutcome {
    pub outfit: Outfit,
    pub synced: bool,
}

pub struct OutfitWorkflow {
    analyzer: Arc<OutfitAnalyzer>,
    outfits: Arc<dyn OutfitStore>,
    objects: Option<Arc<dyn ObjectStore>>,
    local: Arc<InMemoryOutfitStore>,
    retry: RetryPolicy,
    progress: Arc<dyn ProgressSink>,
}

impl OutfitWorkflow {
    pub fn new(
        analyzer: Arc<OutfitAnalyzer>,
        outfits: Arc<dyn OutfitStore>,
        retry: RetryPolicy,
        progress: Arc<dyn ProgressSink>,
    ) -> Self {
        Self {
            analyzer,
            outfits,
            objects: None,
            local: Arc::new(InMemoryOutfitStore::new()),
            retry,
            progress,
        }
    }

    /// Attach object storage for uploaded photos. Without it, records keep
    /// the inline data URI as their image location.
    pub fn with_object_store(mut self, objects: Arc<dyn ObjectStore>) -> Self {
        self.objects = Some(objects);
        self
    }

    /// Records that never reached the backend.
    pub fn local_store(&self) -> Arc<InMemoryOutfitStore> {
        self.local.clone()
    }

    /// Analyze a locally-referenced photo and persist the verdict.
    pub async fn analyze_and_save(&self, user_id: &str, image_uri: &str) -> Result<AnalyzeOutcome> {
        let payload = encode_image(image_uri).await?;
        self.analyze_and_save_payload(user_id, &payload).await
    }

    /// Same flow for an already-encoded payload.
    pub async fn analyze_and_save_payload(
        &self,
        user_id: &str,
        payload: &ImagePayload,
    ) -> Result<AnalyzeOutcome> {
        let analysis = self.analyzer.analyze_payload(payload).await?;

        let image_url = self.store_image(user_id, payload).await;
        let new_outfit = NewOutfit::from_analysis(user_id, &image_url, &analysis);

        self.persist_with_retry(&new_outfit).await
    }

    /// Upload the photo when object storage is configured; on any upload
    /// failure the record keeps the inline data URI so the verdict is never
    /// lost over a thumbnail.
    async fn store_image(&self, user_id: &str, payload: &ImagePayload) -> String {
        let objects = match &self.objects {
            Some(objects) => objects,
            None => return payload.data_uri(),
        };

        let bytes = match base64::engine::general_purpose::STANDARD.decode(&payload.inline_data) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(error = %e, "Inline image data is not valid base64; keeping data URI");
                return payload.data_uri();
            }
        };

        let path = format!(
            "{}/{}.{}",
            user_id,
            Uuid::new_v4(),
            extension_for(&payload.mime_type)
        );
        match objects
            .upload(bytes.into(), &path, &payload.mime_type)
            .await
        {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(error = %e, path, "Image upload failed; keeping data URI");
                payload.data_uri()
            }
        }
    }

    async fn persist_with_retry(&self, new_outfit: &NewOutfit) -> Result<AnalyzeOutcome> {
        let max = self.retry.max_attempts.max(1);
        let mut attempt = 0;

        let last_err = loop {
            attempt += 1;
            match self.outfits.create(new_outfit).await {
                Ok(outfit) => {
                    tracing::info!(outfit_id = %outfit.id, attempt, "Outfit saved");
                    return Ok(AnalyzeOutcome {
                        outfit,
                        synced: true,
                    });
                }
                Err(e) if e.is_transient() && attempt < max => {
                    tracing::warn!(error = %e, attempt, max, "Save failed, retrying");
                    self.progress.retrying(attempt, max);
                    tokio::time::sleep(self.retry.delay).await;
                }
                Err(e) => break e,
            }
        };

        tracing::warn!(error = %last_err, attempts = attempt, "Saving locally instead");
        let outfit = self.save_locally(new_outfit);
        Ok(AnalyzeOutcome {
            outfit,
            synced: false,
        })
    }

    fn save_locally(&self, new_outfit: &NewOutfit) -> Outfit {
        let now = Utc::now();
        let outfit = Outfit {
            id: format!("local_{}", now.timestamp_millis()),
            user_id: new_outfit.user_id.clone(),
            image_url: new_outfit.image_url.clone(),
            rating: new_outfit.rating,
            occasion: new_outfit.occasion.clone(),
            suggestions: new_outfit.suggestions.clone(),
            feedback: new_outfit.feedback.clone(),
            created_at: now,
            updated_at: now,
        };
        self.local.insert(outfit.clone());
        outfit
    }
}

fn extension_for(mime_type: &str) -> &'static str {
    match mime_type {
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/heic" => "heic",
        _ => "jpg",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stylecheck_analysis::CachePolicy;
    use stylecheck_core::mocks::{FlakyOutfitStore, RecordingProgress, ScriptedVisionClient};

    const GOOD_REPLY: &str =
        r#"{"rating": 7.0, "occasion": "Casual", "suggestions": ["Add a watch"], "feedback": "• Clean look"}"#;

    fn payload() -> ImagePayload {
        ImagePayload {
            mime_type: "image/jpeg".to_string(),
            inline_data: "QUJD".to_string(),
        }
    }

    fn workflow(
        store: Arc<FlakyOutfitStore>,
        progress: Arc<RecordingProgress>,
    ) -> OutfitWorkflow {
        let vision = Arc::new(ScriptedVisionClient::new([GOOD_REPLY]));
        let analyzer = Arc::new(OutfitAnalyzer::new(vision, CachePolicy::default()));
        OutfitWorkflow::new(analyzer, store, RetryPolicy::default(), progress)
    }

    #[tokio::test]
    async fn saves_on_first_attempt() {
        let store = Arc::new(FlakyOutfitStore::transient(0));
        let progress = Arc::new(RecordingProgress::new());
        let wf = workflow(store.clone(), progress.clone());

        let outcome = wf
            .analyze_and_save_payload("alice", &payload())
            .await
            .unwrap();

        assert!(outcome.synced);
        assert_eq!(outcome.outfit.rating, 7.0);
        assert_eq!(store.create_calls(), 1);
        assert!(progress.notices().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn retries_transient_failures_then_succeeds() {
        let store = Arc::new(FlakyOutfitStore::transient(2));
        let progress = Arc::new(RecordingProgress::new());
        let wf = workflow(store.clone(), progress.clone());

        let outcome = wf
            .analyze_and_save_payload("alice", &payload())
            .await
            .unwrap();

        assert!(outcome.synced);
        assert_eq!(store.create_calls(), 3);
        assert_eq!(progress.notices(), vec![(1, 3), (2, 3)]);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_retries_fall_back_to_local_record() {
        let store = Arc::new(FlakyOutfitStore::transient(3));
        let progress = Arc::new(RecordingProgress::new());
        let wf = workflow(store.clone(), progress.clone());

        let outcome = wf
            .analyze_and_save_payload("alice", &payload())
            .await
            .unwrap();

        assert!(!outcome.synced);
        assert!(outcome.outfit.id.starts_with("local_"));
        assert_eq!(store.create_calls(), 3);
        assert_eq!(progress.notices().len(), 2);

        let held = wf.local_store().list("alice").await.unwrap();
        assert_eq!(held.len(), 1);
    }

    #[tokio::test]
    async fn terminal_failure_is_not_retried() {
        let store = Arc::new(FlakyOutfitStore::terminal(1));
        let progress = Arc::new(RecordingProgress::new());
        let wf = workflow(store.clone(), progress.clone());

        let outcome = wf
            .analyze_and_save_payload("alice", &payload())
            .await
            .unwrap();

        assert!(!outcome.synced);
        assert_eq!(store.create_calls(), 1);
        assert!(progress.notices().is_empty());
    }

    #[tokio::test]
    async fn no_outfit_reply_propagates_without_saving() {
        let vision = Arc::new(ScriptedVisionClient::new([
            r#"{"error": "No outfit detected. Please upload a clear photo."}"#,
        ]));
        let analyzer = Arc::new(OutfitAnalyzer::new(vision, CachePolicy::default()));
        let store = Arc::new(FlakyOutfitStore::transient(0));
        let wf = OutfitWorkflow::new(
            analyzer,
            store.clone(),
            RetryPolicy::default(),
            Arc::new(RecordingProgress::new()),
        );

        let err = wf
            .analyze_and_save_payload("alice", &payload())
            .await
            .unwrap_err();
        assert!(err.is_no_outfit());
        assert_eq!(store.create_calls(), 0);
    }

    #[test]
    fn extension_mapping() {
        assert_eq!(extension_for("image/png"), "png");
        assert_eq!(extension_for("image/jpeg"), "jpg");
        assert_eq!(extension_for("application/octet-stream"), "jpg");
    }
}
