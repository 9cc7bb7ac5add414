//! Outfit record store backed by the Supabase REST endpoint.

use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};

use stylecheck_core::{Error, NewOutfit, Outfit, OutfitStore, Result, UserStats};

use crate::compute_stats;

/// Outfit records over `POST/GET/DELETE {base}/rest/v1/outfits`.
pub struct SupabaseOutfitStore {
    http: reqwest::Client,
    base_url: String,
    anon_key: Secret<String>,
}

impl SupabaseOutfitStore {
    pub fn new(base_url: impl Into<String>, anon_key: Secret<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key,
        }
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/outfits", self.base_url)
    }

    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("apikey", self.anon_key.expose_secret())
            .bearer_auth(self.anon_key.expose_secret())
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        tracing::error!(status = status.as_u16(), body = %body, "Outfit store request failed");
        Err(Error::persistence(format!("{}: {}", status, body)))
    }
}

/// Transport failures are transient (retryable); HTTP-level rejections
/// are not.
fn classify_transport(err: reqwest::Error) -> Error {
    if err.is_connect() || err.is_timeout() || err.is_request() {
        Error::network(err.to_string())
    } else {
        Error::persistence(err.to_string())
    }
}

#[async_trait]
impl OutfitStore for SupabaseOutfitStore {
    async fn create(&self, outfit: &NewOutfit) -> Result<Outfit> {
        let response = self
            .authed(self.http.post(self.table_url()))
            .header("Prefer", "return=representation")
            .json(outfit)
            .send()
            .await
            .map_err(classify_transport)?;
        let response = Self::check(response).await?;

        let mut rows: Vec<Outfit> = response.json().await.map_err(classify_transport)?;
        rows.pop()
            .ok_or_else(|| Error::persistence("insert returned no representation"))
    }

    async fn list(&self, user_id: &str) -> Result<Vec<Outfit>> {
        let response = self
            .authed(self.http.get(self.table_url()))
            .query(&[
                ("select", "*"),
                ("user_id", &format!("eq.{}", user_id)),
                ("order", "created_at.desc"),
            ])
            .send()
            .await
            .map_err(classify_transport)?;
        let response = Self::check(response).await?;

        response.json().await.map_err(classify_transport)
    }

    async fn get(&self, id: &str) -> Result<Option<Outfit>> {
        let response = self
            .authed(self.http.get(self.table_url()))
            .query(&[("select", "*"), ("id", &format!("eq.{}", id))])
            .send()
            .await
            .map_err(classify_transport)?;
        let response = Self::check(response).await?;

        let rows: Vec<Outfit> = response.json().await.map_err(classify_transport)?;
        Ok(rows.into_iter().next())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let response = self
            .authed(self.http.delete(self.table_url()))
            .query(&[("id", &format!("eq.{}", id))])
            .send()
            .await
            .map_err(classify_transport)?;
        Self::check(response).await?;
        Ok(())
    }

    async fn search(&self, user_id: &str, query: &str) -> Result<Vec<Outfit>> {
        let filter = format!("(occasion.ilike.*{q}*,feedback.ilike.*{q}*)", q = query);
        let response = self
            .authed(self.http.get(self.table_url()))
            .query(&[
                ("select", "*"),
                ("user_id", &format!("eq.{}", user_id)),
                ("or", &filter),
                ("order", "created_at.desc"),
            ])
            .send()
            .await
            .map_err(classify_transport)?;
        let response = Self::check(response).await?;

        response.json().await.map_err(classify_transport)
    }

    async fn stats(&self, user_id: &str) -> Result<UserStats> {
        // A user's own records are few; one list beats three aggregate
        // round-trips.
        let records = self.list(user_id).await?;
        Ok(compute_stats(&records))
    }
}
