//! Axum-based HTTP surface for the analysis workflow.

use std::sync::Arc;

use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use stylecheck_core::{Error, ImagePayload, Outfit, OutfitStore, UserStats};

use crate::workflow::OutfitWorkflow;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub enable_cors: bool,
    pub enable_tracing: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            enable_cors: true,
            enable_tracing: true,
        }
    }
}

/// Shared application state.
pub struct AppState {
    pub workflow: Arc<OutfitWorkflow>,
    pub outfits: Arc<dyn OutfitStore>,
}

pub struct StyleCheckServer {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl StyleCheckServer {
    pub fn new(
        config: ServerConfig,
        workflow: Arc<OutfitWorkflow>,
        outfits: Arc<dyn OutfitStore>,
    ) -> Self {
        Self {
            config,
            state: Arc::new(AppState { workflow, outfits }),
        }
    }

    /// Build the Axum router.
    pub fn build_router(&self) -> Router {
        let mut router = Router::new()
            .route("/health", get(health_handler))
            .route("/v1/analyze", post(analyze_handler))
            // GET takes a user id, DELETE a record id; the router needs one
            // shared parameter name for the segment.
            .route("/v1/outfits/:id", get(list_handler).delete(delete_handler))
            .route("/v1/outfits/:id/stats", get(stats_handler))
            .with_state(self.state.clone());

        if self.config.enable_cors {
            router = router.layer(CorsLayer::new().allow_origin(Any).allow_methods(Any));
        }

        if self.config.enable_tracing {
            router = router.layer(TraceLayer::new_for_http());
        }

        router
    }

    /// Run the server.
    pub async fn run(self) -> stylecheck_core::Result<()> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| Error::internal(format!("Failed to bind: {}", e)))?;

        tracing::info!(addr = %addr, "StyleCheck server starting");

        axum::serve(listener, self.build_router())
            .await
            .map_err(|e| Error::internal(format!("Server error: {}", e)))?;

        Ok(())
    }
}

// =============================================================================
// Request/Response Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub user_id: String,
    /// Local path or `file://` URI of the photo, read server-side.
    pub image_uri: Option<String>,
    /// Alternatively, the photo inline.
    pub image_base64: Option<String>,
    pub mime_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub outfit: Outfit,
    /// False when the record only reached the local holding store.
    pub synced: bool,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// Substring filter over occasion and feedback.
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OutfitsResponse {
    pub outfits: Vec<Outfit>,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: UserStats,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

/// Map workflow errors onto HTTP. The no-outfit outcome is the one clients
/// branch on, so it gets a stable code.
fn error_response(err: Error) -> (StatusCode, Json<ErrorResponse>) {
    let (status, code) = match &err {
        Error::NoOutfitDetected(_) => (StatusCode::UNPROCESSABLE_ENTITY, "no_outfit_detected"),
        Error::ImageRead(_) => (StatusCode::BAD_REQUEST, "image_read"),
        Error::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
        Error::Auth => (StatusCode::BAD_GATEWAY, "upstream_auth"),
        Error::RateLimit => (StatusCode::TOO_MANY_REQUESTS, "rate_limited"),
        Error::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "timeout"),
        Error::ServiceUnavailable => (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable"),
        Error::Parse | Error::InvalidAnalysisFormat => (StatusCode::BAD_GATEWAY, "invalid_reply"),
        Error::Network(_) => (StatusCode::SERVICE_UNAVAILABLE, "network"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
    };
    (
        status,
        Json(ErrorResponse {
            code: code.to_string(),
            message: err.to_string(),
        }),
    )
}

// =============================================================================
// Handlers
// =============================================================================

async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AnalyzeRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    tracing::info!(user_id = %payload.user_id, "Processing analyze request");

    let outcome = match (&payload.image_uri, &payload.image_base64) {
        (Some(uri), _) => state
            .workflow
            .analyze_and_save(&payload.user_id, uri)
            .await
            .map_err(error_response)?,
        (None, Some(data)) => {
            let image = ImagePayload {
                mime_type: payload
                    .mime_type
                    .clone()
                    .unwrap_or_else(|| "image/jpeg".to_string()),
                inline_data: data.clone(),
            };
            state
                .workflow
                .analyze_and_save_payload(&payload.user_id, &image)
                .await
                .map_err(error_response)?
        }
        (None, None) => {
            return Err(error_response(Error::bad_request(
                "either image_uri or image_base64 is required",
            )))
        }
    };

    Ok((
        StatusCode::OK,
        Json(AnalyzeResponse {
            outfit: outcome.outfit,
            synced: outcome.synced,
        }),
    ))
}

async fn list_handler(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    let outfits = match params.q.as_deref().filter(|q| !q.is_empty()) {
        Some(q) => state.outfits.search(&user_id, q).await,
        None => state.outfits.list(&user_id).await,
    }
    .map_err(error_response)?;

    Ok(Json(OutfitsResponse { outfits }))
}

async fn stats_handler(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    let stats = state.outfits.stats(&user_id).await.map_err(error_response)?;
    Ok(Json(StatsResponse { stats }))
}

async fn delete_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    state.outfits.delete(&id).await.map_err(error_response)?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn health_reports_ok() {
        let response = health_handler().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn no_outfit_maps_to_422_with_stable_code() {
        let (status, Json(body)) = error_response(Error::no_outfit("No outfit detected"));
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body.code, "no_outfit_detected");
    }

    #[test]
    fn image_read_maps_to_400() {
        let (status, Json(body)) = error_response(Error::image_read("Image file not found"));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.code, "image_read");
    }

    #[test]
    fn rate_limit_maps_to_429() {
        let (status, _) = error_response(Error::RateLimit);
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    }
}
