use config::{Config, ConfigError, Environment, File};
use secrecy::Secret;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub backend: BackendConfig,
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Vision/LLM endpoint settings.
#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    pub api_base: String,
    pub api_key: Option<Secret<String>>,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub request_timeout_secs: u64,
}

/// Backend-as-a-service (records, object storage, identity) settings.
#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    pub url: Option<String>,
    pub anon_key: Option<Secret<String>>,
    pub bucket: String,
}

/// Tunables for the analysis pipeline. The similarity and delta thresholds
/// are heuristic; the defaults mirror the values the service shipped with.
#[derive(Debug, Deserialize, Clone)]
pub struct AnalysisConfig {
    pub cache_capacity: usize,
    pub similarity_threshold: f64,
    pub rating_delta: f64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("STYLECHECK_ENV").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            .add_source(File::with_name("config/default"))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(File::with_name("config/local").required(false))
            // Map APP__SERVER__PORT=3000 to app.server.port
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".into(),
                port: 3000,
            },
            model: ModelConfig {
                api_base: "https://api.openai.com/v1".into(),
                api_key: None,
                model: "gpt-4o".into(),
                max_tokens: 800,
                temperature: 0.3,
                request_timeout_secs: 30,
            },
            backend: BackendConfig {
                url: None,
                anon_key: None,
                bucket: "outfit-images".into(),
            },
            analysis: AnalysisConfig::default(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            cache_capacity: 50,
            similarity_threshold: 0.9,
            rating_delta: 1.0,
            max_retries: 3,
            retry_delay_ms: 2000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_shipped_constants() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.model.max_tokens, 800);
        assert_eq!(cfg.model.request_timeout_secs, 30);
        assert_eq!(cfg.analysis.cache_capacity, 50);
        assert_eq!(cfg.analysis.max_retries, 3);
        assert_eq!(cfg.analysis.retry_delay_ms, 2000);
    }
}
