//! Consistency cache for analysis verdicts.
//!
//! The model is non-deterministic: resubmitting the same or a near-identical
//! photo can re-roll the rating, which reads as arbitrary to the user. The
//! cache pins repeated submissions to a previously issued verdict.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use stylecheck_core::OutfitAnalysis;

/// Tunables for cache behaviour. The similarity and rating-delta thresholds
/// are heuristic, preserved from the shipped service.
#[derive(Debug, Clone)]
pub struct CachePolicy {
    /// Maximum retained entries; oldest evicted first.
    pub capacity: usize,
    /// Minimum feedback word-overlap ratio for a near-duplicate.
    pub similarity_threshold: f64,
    /// Maximum rating difference for a near-duplicate.
    pub rating_delta: f64,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            capacity: 50,
            similarity_threshold: 0.9,
            rating_delta: 1.0,
        }
    }
}

/// One remembered (image, verdict) pair. Never mutated after insertion.
#[derive(Debug, Clone)]
struct AnalysisCacheEntry {
    fingerprint: String,
    verdict: OutfitAnalysis,
    #[allow(dead_code)]
    observed_at: DateTime<Utc>,
}

/// Bounded, insertion-ordered store of prior verdicts.
#[derive(Debug)]
pub struct ConsistencyCache {
    entries: VecDeque<AnalysisCacheEntry>,
    policy: CachePolicy,
}

impl ConsistencyCache {
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            entries: VecDeque::new(),
            policy,
        }
    }

    /// Reconcile a freshly normalized candidate against prior verdicts.
    ///
    /// Exact fingerprint match wins first: an identical resubmission yields
    /// the identical verdict. Otherwise a near-duplicate (feedback overlap
    /// above the threshold and rating within the delta) converges to the
    /// most recently stored matching verdict. Only a genuinely new result
    /// is stored.
    pub fn reconcile(&mut self, image_data_uri: &str, candidate: OutfitAnalysis) -> OutfitAnalysis {
        let fp = fingerprint(image_data_uri);

        if let Some(entry) = self.entries.iter().find(|e| e.fingerprint == fp) {
            tracing::debug!(fingerprint = %fp, "Identical image, returning stored verdict");
            return entry.verdict.clone();
        }

        let near = self.entries.iter().rev().find(|e| {
            feedback_similarity(&e.verdict.feedback, &candidate.feedback)
                > self.policy.similarity_threshold
                && (e.verdict.rating - candidate.rating).abs() < self.policy.rating_delta
        });
        if let Some(entry) = near {
            tracing::debug!(
                stored_rating = entry.verdict.rating,
                candidate_rating = candidate.rating,
                "Near-duplicate outfit, keeping prior rating"
            );
            return entry.verdict.clone();
        }

        self.entries.push_back(AnalysisCacheEntry {
            fingerprint: fp,
            verdict: candidate.clone(),
            observed_at: Utc::now(),
        });
        while self.entries.len() > self.policy.capacity {
            self.entries.pop_front();
        }

        candidate
    }

    /// Whether an exact fingerprint is currently remembered.
    pub fn contains(&self, image_data_uri: &str) -> bool {
        let fp = fingerprint(image_data_uri);
        self.entries.iter().any(|e| e.fingerprint == fp)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Cheap identity proxy for an image payload: length plus a fixed-size
/// content prefix. Collision-tolerant by design, not a cryptographic hash.
pub fn fingerprint(image_data_uri: &str) -> String {
    let prefix: String = image_data_uri.chars().take(100).collect();
    format!("{}_{}", image_data_uri.len(), prefix)
}

/// Word-overlap ratio between two feedback texts: words of `a` also present
/// in `b` (with multiplicity), over the larger total word count.
pub fn feedback_similarity(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    let words_a: Vec<&str> = a.split_whitespace().collect();
    let words_b: Vec<&str> = b.split_whitespace().collect();

    let denom = words_a.len().max(words_b.len());
    if denom == 0 {
        return 0.0;
    }

    let set_b: std::collections::HashSet<&str> = words_b.iter().copied().collect();
    let common = words_a.iter().filter(|w| set_b.contains(*w)).count();

    common as f64 / denom as f64
}
