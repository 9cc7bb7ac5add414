//! Analysis orchestration: encode, request, normalize, reconcile.

use std::sync::{Arc, Mutex};

use stylecheck_core::{Error, ImagePayload, OutfitAnalysis, Result, VisionClient};

use crate::cache::{CachePolicy, ConsistencyCache};
use crate::encoder::encode_image;
use crate::normalize::parse_reply;
use crate::rubric::CRITIQUE_RUBRIC;

/// Runs one analysis at a time against an injected vision client, sharing a
/// process-wide consistency cache across calls.
pub struct OutfitAnalyzer {
    vision: Arc<dyn VisionClient>,
    cache: Mutex<ConsistencyCache>,
}

impl OutfitAnalyzer {
    pub fn new(vision: Arc<dyn VisionClient>, policy: CachePolicy) -> Self {
        Self {
            vision,
            cache: Mutex::new(ConsistencyCache::new(policy)),
        }
    }

    /// Analyze a locally-referenced photo.
    pub async fn analyze_uri(&self, image_uri: &str) -> Result<OutfitAnalysis> {
        let payload = encode_image(image_uri).await?;
        self.analyze_payload(&payload).await
    }

    /// Analyze an already-encoded payload.
    pub async fn analyze_payload(&self, payload: &ImagePayload) -> Result<OutfitAnalysis> {
        let data_uri = payload.data_uri();

        let raw = self
            .vision
            .critique_image(CRITIQUE_RUBRIC, &data_uri)
            .await?;
        tracing::debug!(reply_len = raw.len(), "Model reply received");

        let candidate = parse_reply(&raw)?;

        let mut cache = self
            .cache
            .lock()
            .map_err(|_| Error::internal("consistency cache lock poisoned"))?;
        let verdict = cache.reconcile(&data_uri, candidate);

        tracing::info!(
            rating = verdict.rating,
            occasion = %verdict.occasion,
            "Outfit analysis complete"
        );
        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stylecheck_core::mocks::ScriptedVisionClient;

    fn payload(tag: &str) -> ImagePayload {
        ImagePayload {
            mime_type: "image/jpeg".to_string(),
            inline_data: format!("BASE64-{}", tag),
        }
    }

    #[tokio::test]
    async fn identical_payload_twice_yields_identical_verdict() {
        let client = Arc::new(ScriptedVisionClient::new([
            r#"{"rating": 7.0, "occasion": "Casual", "suggestions": ["a"], "feedback": "• fine"}"#,
            // A re-roll with a different rating; must be masked by the cache.
            r#"{"rating": 9.0, "occasion": "Party", "suggestions": ["b"], "feedback": "• wild"}"#,
        ]));
        let analyzer = OutfitAnalyzer::new(client.clone(), CachePolicy::default());

        let p = payload("same");
        let first = analyzer.analyze_payload(&p).await.unwrap();
        let second = analyzer.analyze_payload(&p).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(client.calls(), 2);
    }

    #[tokio::test]
    async fn error_reply_routes_to_no_outfit() {
        let client = Arc::new(ScriptedVisionClient::new([
            r#"{"error": "No outfit detected. Please upload a clear photo."}"#,
        ]));
        let analyzer = OutfitAnalyzer::new(client, CachePolicy::default());

        let err = analyzer.analyze_payload(&payload("x")).await.unwrap_err();
        assert!(err.is_no_outfit());
    }

    #[tokio::test]
    async fn fenced_reply_is_normalized() {
        let client = Arc::new(ScriptedVisionClient::new([
            "```json\n{\"rating\": 4.2,\n\"occasion\": \"Casual\",\n\"suggestions\": [\"a\", \"b\"],\n\"feedback\": \"• x • y\"}\n```",
        ]));
        let analyzer = OutfitAnalyzer::new(client, CachePolicy::default());

        let verdict = analyzer.analyze_payload(&payload("fenced")).await.unwrap();
        assert_eq!(verdict.rating, 3.5);
        assert_eq!(verdict.feedback, "• x \n• y");
    }
}
