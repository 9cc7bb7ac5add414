//! Object storage for outfit photos, backed by Supabase Storage.

use async_trait::async_trait;
use bytes::Bytes;
use secrecy::{ExposeSecret, Secret};

use stylecheck_core::{Error, ObjectStore, Result};

/// Bucket-scoped object storage over `{base}/storage/v1/object`.
pub struct SupabaseObjectStore {
    http: reqwest::Client,
    base_url: String,
    anon_key: Secret<String>,
    bucket: String,
}

impl SupabaseObjectStore {
    pub fn new(
        base_url: impl Into<String>,
        anon_key: Secret<String>,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key,
            bucket: bucket.into(),
        }
    }

    fn object_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url, self.bucket, path
        )
    }

    /// Publicly reachable URL for an uploaded object.
    pub fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, path
        )
    }
}

fn classify_transport(err: reqwest::Error) -> Error {
    if err.is_connect() || err.is_timeout() || err.is_request() {
        Error::network(err.to_string())
    } else {
        Error::storage(err.to_string())
    }
}

#[async_trait]
impl ObjectStore for SupabaseObjectStore {
    async fn upload(&self, data: Bytes, path: &str, content_type: &str) -> Result<String> {
        let response = self
            .http
            .post(self.object_url(path))
            .header("apikey", self.anon_key.expose_secret())
            .bearer_auth(self.anon_key.expose_secret())
            .header("Content-Type", content_type)
            .header("Cache-Control", "max-age=3600")
            .body(data)
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), path, "Image upload failed");
            return Err(Error::storage(format!("{}: {}", status, body)));
        }

        tracing::debug!(path, "Image uploaded");
        Ok(self.public_url(path))
    }

    async fn remove(&self, path: &str) -> Result<()> {
        let response = self
            .http
            .delete(self.object_url(path))
            .header("apikey", self.anon_key.expose_secret())
            .bearer_auth(self.anon_key.expose_secret())
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::storage(format!("{}: {}", status, body)));
        }
        Ok(())
    }
}
