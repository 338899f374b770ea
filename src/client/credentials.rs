use crate::error::{AnalyticsError, AnalyticsResult};
use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Read-only scope for the reporting API.
pub const ANALYTICS_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/analytics.readonly";

/// Assertions are requested for the maximum lifetime Google accepts.
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// The subset of a service account key file needed for the JWT bearer flow.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountCredentials {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

impl fmt::Debug for ServiceAccountCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountCredentials")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

impl ServiceAccountCredentials {
    pub fn from_json(data: &str) -> AnalyticsResult<Self> {
        let creds: Self = serde_json::from_str(data)
            .map_err(|e| AnalyticsError::Credentials(format!("invalid key file: {e}")))?;
        if creds.client_email.is_empty() {
            return Err(AnalyticsError::Credentials(
                "key file has an empty client_email".to_string(),
            ));
        }
        Ok(creds)
    }

    pub async fn from_file(path: &Path) -> AnalyticsResult<Self> {
        let data = tokio::fs::read_to_string(path).await.map_err(|e| {
            AnalyticsError::Credentials(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_json(&data)
    }

    /// Build the signed RS256 assertion exchanged for an access token.
    pub fn sign_assertion(&self, scope: &str, now: DateTime<Utc>) -> AnalyticsResult<String> {
        let iat = now.timestamp();
        let claims = AssertionClaims {
            iss: &self.client_email,
            scope,
            aud: &self.token_uri,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.private_key_id.clone();

        let key = EncodingKey::from_rsa_pem(self.private_key.as_bytes())?;
        Ok(encode(&header, &claims, &key)?)
    }
}
