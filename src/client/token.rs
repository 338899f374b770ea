use super::credentials::{ServiceAccountCredentials, ANALYTICS_READONLY_SCOPE};
use crate::error::{AnalyticsError, AnalyticsResult};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Tokens are refreshed this long before Google would reject them.
const EXPIRY_SKEW_SECS: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_SKEW_SECS) >= self.expires_at
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

/// Hands out OAuth access tokens for one service account, cached in memory
/// and in a file under the client's cache directory.
pub struct TokenProvider {
    http: reqwest::Client,
    credentials_path: PathBuf,
    cache_file: PathBuf,
    current: Mutex<Option<AccessToken>>,
}

impl TokenProvider {
    pub fn new(http: reqwest::Client, credentials_path: &Path, cache_location: &Path) -> Self {
        Self {
            http,
            credentials_path: credentials_path.to_path_buf(),
            cache_file: cache_location.join(token_file_name(credentials_path)),
            current: Mutex::new(None),
        }
    }

    pub fn cache_file(&self) -> &Path {
        &self.cache_file
    }

    pub async fn access_token(&self) -> AnalyticsResult<String> {
        let mut slot = self.current.lock().await;
        let now = Utc::now();

        if let Some(token) = slot.as_ref().filter(|t| !t.is_expired(now)) {
            return Ok(token.token.clone());
        }

        if let Some(token) = self.read_cached(now).await {
            tracing::debug!(path = %self.cache_file.display(), "using cached access token");
            let value = token.token.clone();
            *slot = Some(token);
            return Ok(value);
        }

        let token = self.fetch(now).await?;
        self.write_cached(&token).await;
        let value = token.token.clone();
        *slot = Some(token);
        Ok(value)
    }

    async fn fetch(&self, now: DateTime<Utc>) -> AnalyticsResult<AccessToken> {
        let creds = ServiceAccountCredentials::from_file(&self.credentials_path).await?;
        let assertion = creds.sign_assertion(ANALYTICS_READONLY_SCOPE, now)?;

        let resp = self
            .http
            .post(&creds.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(status = %status, account = %creds.client_email, "token exchange failed");
            return Err(AnalyticsError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: TokenResponse = resp.json().await?;
        tracing::info!(
            account = %creds.client_email,
            expires_in = parsed.expires_in,
            "obtained access token"
        );
        Ok(AccessToken {
            token: parsed.access_token,
            expires_at: now + Duration::seconds(parsed.expires_in),
        })
    }

    async fn read_cached(&self, now: DateTime<Utc>) -> Option<AccessToken> {
        let data = tokio::fs::read(&self.cache_file).await.ok()?;
        let token: AccessToken = serde_json::from_slice(&data).ok()?;
        (!token.is_expired(now)).then_some(token)
    }

    /// Failures are logged and otherwise ignored.
    async fn write_cached(&self, token: &AccessToken) {
        if let Err(e) = self.persist(token).await {
            tracing::warn!(
                path = %self.cache_file.display(),
                error = %e,
                "failed to persist access token"
            );
        }
    }

    async fn persist(&self, token: &AccessToken) -> std::io::Result<()> {
        if let Some(dir) = self.cache_file.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        let data = serde_json::to_vec(token).map_err(std::io::Error::other)?;

        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options.open(&self.cache_file).await?;
        // The mode above only applies on creation; tighten files left by older runs
        #[cfg(unix)]
        file.set_permissions(std::fs::Permissions::from_mode(0o600)).await?;
        file.write_all(&data).await?;
        file.flush().await
    }
}

/// One token file per credentials file, so switching accounts never reuses a token.
fn token_file_name(credentials_path: &Path) -> String {
    let digest = Sha256::digest(credentials_path.to_string_lossy().as_bytes());
    format!("access-token-{}.json", &hex::encode(digest)[..16])
}
