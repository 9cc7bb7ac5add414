//! End-to-end flows over mock collaborators: raw model reply in, persisted
//! record out.

use std::sync::Arc;

use stylecheck_analysis::{CachePolicy, OutfitAnalyzer};
use stylecheck_core::mocks::{FlakyOutfitStore, RecordingProgress, ScriptedVisionClient};
use stylecheck_core::{ImagePayload, OutfitStore};
use stylecheck_gateway::{OutfitWorkflow, RetryPolicy};

fn payload(tag: &str) -> ImagePayload {
    ImagePayload {
        mime_type: "image/jpeg".to_string(),
        inline_data: format!("QUJD{}", tag),
    }
}

fn workflow_with(
    replies: &[&str],
    store: Arc<FlakyOutfitStore>,
    progress: Arc<RecordingProgress>,
) -> OutfitWorkflow {
    let vision = Arc::new(ScriptedVisionClient::new(replies.iter().copied()));
    let analyzer = Arc::new(OutfitAnalyzer::new(vision, CachePolicy::default()));
    OutfitWorkflow::new(analyzer, store, RetryPolicy::default(), progress)
}

#[tokio::test]
async fn fenced_reply_is_recovered_and_saved() {
    let reply = "```json\n{\"rating\": 4.2,\n\"occasion\": \"Casual\",\n\"suggestions\": [\"Try darker shoes\"],\n\"feedback\": \"• Good colors • Loose fit\"}\n```";
    let store = Arc::new(FlakyOutfitStore::transient(0));
    let wf = workflow_with(&[reply], store.clone(), Arc::new(RecordingProgress::new()));

    let outcome = wf
        .analyze_and_save_payload("alice", &payload("a"))
        .await
        .unwrap();

    assert!(outcome.synced);
    // 4.2 falls in the harsh band and lands on a half step.
    assert_eq!(outcome.outfit.rating, 3.5);
    assert_eq!(outcome.outfit.occasion, "Casual");
    assert_eq!(outcome.outfit.feedback, "• Good colors \n• Loose fit");

    let listed = store.list("alice").await.unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn unclear_photo_reaches_the_caller_as_no_outfit() {
    let store = Arc::new(FlakyOutfitStore::transient(0));
    let wf = workflow_with(
        &["I'm unable to view this image, sorry."],
        store.clone(),
        Arc::new(RecordingProgress::new()),
    );

    let err = wf
        .analyze_and_save_payload("alice", &payload("b"))
        .await
        .unwrap_err();

    assert!(err.is_no_outfit());
    assert!(store.list("alice").await.unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn backend_outage_falls_back_to_local_record() {
    let reply =
        r#"{"rating": 8.0, "occasion": "Date Night", "suggestions": [], "feedback": "• Sharp"}"#;
    let store = Arc::new(FlakyOutfitStore::transient(5));
    let progress = Arc::new(RecordingProgress::new());
    let wf = workflow_with(&[reply], store.clone(), progress.clone());

    let outcome = wf
        .analyze_and_save_payload("alice", &payload("c"))
        .await
        .unwrap();

    assert!(!outcome.synced);
    assert!(outcome.outfit.id.starts_with("local_"));
    assert_eq!(outcome.outfit.rating, 8.0);
    // Three attempts total, a notice before each of the two waits.
    assert_eq!(store.create_calls(), 3);
    assert_eq!(progress.notices(), vec![(1, 3), (2, 3)]);
    assert_eq!(wf.local_store().list("alice").await.unwrap().len(), 1);
}

#[tokio::test]
async fn resubmitting_the_same_photo_keeps_the_verdict() {
    let replies = [
        r#"{"rating": 7.0, "occasion": "Casual", "suggestions": ["a"], "feedback": "• Nice"}"#,
        // A re-roll the cache must mask.
        r#"{"rating": 9.5, "occasion": "Party", "suggestions": ["b"], "feedback": "• Different"}"#,
    ];
    let store = Arc::new(FlakyOutfitStore::transient(0));
    let wf = workflow_with(&replies, store.clone(), Arc::new(RecordingProgress::new()));

    let p = payload("same");
    let first = wf.analyze_and_save_payload("alice", &p).await.unwrap();
    let second = wf.analyze_and_save_payload("alice", &p).await.unwrap();

    assert_eq!(first.outfit.rating, second.outfit.rating);
    assert_eq!(first.outfit.feedback, second.outfit.feedback);
    assert_eq!(store.list("alice").await.unwrap().len(), 2);
}
