//! Identity provider backed by Supabase GoTrue.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::{watch, RwLock};

use stylecheck_core::{Error, IdentityProvider, Result, User};

/// Session-holding auth client over `{base}/auth/v1`.
///
/// Auth state changes are published on a watch channel instead of a
/// callback registration; subscribers see the latest signed-in user or
/// `None` after sign-out.
pub struct SupabaseAuth {
    http: reqwest::Client,
    base_url: String,
    anon_key: Secret<String>,
    access_token: RwLock<Option<String>>,
    state_tx: watch::Sender<Option<User>>,
}

impl SupabaseAuth {
    pub fn new(base_url: impl Into<String>, anon_key: Secret<String>) -> Self {
        let (state_tx, _) = watch::channel(None);
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key,
            access_token: RwLock::new(None),
            state_tx,
        }
    }

    /// Observe auth state changes.
    pub fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.state_tx.subscribe()
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<AuthErrorBody>(&body)
            .ok()
            .and_then(|b| b.error_description.or(b.msg))
            .unwrap_or_else(|| format!("auth request failed with status {}", status));
        Err(Error::identity(message))
    }
}

fn classify_transport(err: reqwest::Error) -> Error {
    if err.is_connect() || err.is_timeout() || err.is_request() {
        Error::network(err.to_string())
    } else {
        Error::identity(err.to_string())
    }
}

#[async_trait]
impl IdentityProvider for SupabaseAuth {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        name: &str,
        age: Option<u32>,
    ) -> Result<User> {
        let body = json!({
            "email": email,
            "password": password,
            "data": { "name": name, "age": age },
        });

        let response = self
            .http
            .post(self.auth_url("signup"))
            .header("apikey", self.anon_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(classify_transport)?;
        let response = Self::check(response).await?;

        let session: SessionBody = response.json().await.map_err(classify_transport)?;
        let raw_user = session
            .user
            .ok_or_else(|| Error::identity("Signup failed"))?;
        let user = raw_user.normalize(Some(name), age);

        if let Some(token) = session.access_token {
            *self.access_token.write().await = Some(token);
        }
        let _ = self.state_tx.send(Some(user.clone()));
        Ok(user)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<User> {
        let body = json!({ "email": email, "password": password });

        let response = self
            .http
            .post(self.auth_url("token"))
            .query(&[("grant_type", "password")])
            .header("apikey", self.anon_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(classify_transport)?;
        let response = Self::check(response).await?;

        let session: SessionBody = response.json().await.map_err(classify_transport)?;
        let raw_user = session.user.ok_or_else(|| Error::identity("Login failed"))?;
        let user = raw_user.normalize(None, None);

        *self.access_token.write().await = session.access_token;
        let _ = self.state_tx.send(Some(user.clone()));

        tracing::info!(user_id = %user.id, "User signed in");
        Ok(user)
    }

    async fn sign_out(&self) -> Result<()> {
        let token = self.access_token.write().await.take();
        if let Some(token) = token {
            let response = self
                .http
                .post(self.auth_url("logout"))
                .header("apikey", self.anon_key.expose_secret())
                .bearer_auth(&token)
                .send()
                .await
                .map_err(classify_transport)?;
            Self::check(response).await?;
        }
        let _ = self.state_tx.send(None);
        Ok(())
    }

    async fn current_user(&self) -> Result<Option<User>> {
        let token = self.access_token.read().await.clone();
        let token = match token {
            Some(token) => token,
            None => return Ok(None),
        };

        let response = self
            .http
            .get(self.auth_url("user"))
            .header("apikey", self.anon_key.expose_secret())
            .bearer_auth(&token)
            .send()
            .await
            .map_err(classify_transport)?;

        if response.status().as_u16() == 401 {
            // Stale token: treat as signed out.
            *self.access_token.write().await = None;
            return Ok(None);
        }
        let response = Self::check(response).await?;

        let raw: SupabaseUser = response.json().await.map_err(classify_transport)?;
        Ok(Some(raw.normalize(None, None)))
    }
}

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Deserialize)]
struct SessionBody {
    access_token: Option<String>,
    user: Option<SupabaseUser>,
}

#[derive(Deserialize)]
struct SupabaseUser {
    id: String,
    email: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
    user_metadata: Option<UserMetadata>,
}

#[derive(Deserialize)]
struct UserMetadata {
    name: Option<String>,
    age: Option<u32>,
}

#[derive(Deserialize)]
struct AuthErrorBody {
    error_description: Option<String>,
    msg: Option<String>,
}

impl SupabaseUser {
    /// Normalize to the application user record, preferring stored metadata
    /// over the caller-supplied fallbacks.
    fn normalize(self, fallback_name: Option<&str>, fallback_age: Option<u32>) -> User {
        let metadata = self.user_metadata.unwrap_or(UserMetadata {
            name: None,
            age: None,
        });
        User {
            id: self.id,
            email: self.email.unwrap_or_default(),
            name: metadata
                .name
                .or_else(|| fallback_name.map(str::to_string))
                .unwrap_or_else(|| "User".to_string()),
            age: metadata.age.or(fallback_age),
            created_at: self.created_at,
            updated_at: self.updated_at.unwrap_or(self.created_at),
        }
    }
}
