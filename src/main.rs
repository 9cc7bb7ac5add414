//! StyleCheck - outfit critique service.
//!
//! Wires the analysis pipeline, backend collaborators, and HTTP surface
//! together from configuration, falling back to in-process stand-ins when
//! no external endpoints are configured.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use stylecheck_analysis::{CachePolicy, OutfitAnalyzer};
use stylecheck_core::mocks::ScriptedVisionClient;
use stylecheck_core::{AppConfig, ObjectStore, OutfitStore, TracingProgress, VisionClient};
use stylecheck_gateway::{OutfitWorkflow, RetryPolicy, ServerConfig, StyleCheckServer};
use stylecheck_model_gateway::OpenAiVisionClient;
use stylecheck_store::{InMemoryOutfitStore, SupabaseObjectStore, SupabaseOutfitStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,stylecheck=debug")),
        )
        .init();

    let config = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load configuration, using defaults");
        AppConfig::default()
    });

    tracing::info!("Starting StyleCheck v{}", env!("CARGO_PKG_VERSION"));

    // Vision endpoint
    let vision: Arc<dyn VisionClient> = match OpenAiVisionClient::from_config(&config.model) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            tracing::warn!(
                error = %e,
                "No usable model endpoint; using a canned vision client"
            );
            Arc::new(ScriptedVisionClient::new([
                r#"{"rating": 7.0, "occasion": "Casual", "suggestions": ["Configure a model API key"], "feedback": "• Canned verdict: no model endpoint configured"}"#,
            ]))
        }
    };

    let analyzer = Arc::new(OutfitAnalyzer::new(
        vision,
        CachePolicy {
            capacity: config.analysis.cache_capacity,
            similarity_threshold: config.analysis.similarity_threshold,
            rating_delta: config.analysis.rating_delta,
        },
    ));

    // Backend collaborators
    let (outfits, objects): (Arc<dyn OutfitStore>, Option<Arc<dyn ObjectStore>>) =
        match (&config.backend.url, &config.backend.anon_key) {
            (Some(url), Some(key)) => {
                tracing::info!(url = %url, "Using remote backend");
                (
                    Arc::new(SupabaseOutfitStore::new(url.clone(), key.clone())),
                    Some(Arc::new(SupabaseObjectStore::new(
                        url.clone(),
                        key.clone(),
                        config.backend.bucket.clone(),
                    ))),
                )
            }
            _ => {
                tracing::info!("No backend configured; using in-memory outfit store");
                (Arc::new(InMemoryOutfitStore::new()), None)
            }
        };

    let mut workflow = OutfitWorkflow::new(
        analyzer,
        outfits.clone(),
        RetryPolicy::from_analysis_config(&config.analysis),
        Arc::new(TracingProgress),
    );
    if let Some(objects) = objects {
        workflow = workflow.with_object_store(objects);
    }

    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        enable_cors: true,
        enable_tracing: true,
    };

    tracing::info!(
        host = %server_config.host,
        port = server_config.port,
        "HTTP surface initialized"
    );

    StyleCheckServer::new(server_config, Arc::new(workflow), outfits)
        .run()
        .await?;

    Ok(())
}
