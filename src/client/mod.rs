pub mod cache;
pub mod credentials;
pub mod token;
pub mod types;

use crate::config::AnalyticsConfig;
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::period::Period;
use cache::ReportCache;
use reqwest::header::CONTENT_TYPE;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use token::TokenProvider;
use types::{BatchGetResponse, Report, ReportQuery};

pub const DEFAULT_ENDPOINT: &str = "https://analyticsreporting.googleapis.com/v4/reports:batchGet";

/// Low-level reporting client: service-account auth, transport, and response caching.
///
/// Construction never fails and touches neither the network nor the credentials
/// file. Both are first used by [`AnalyticsClient::perform_query`].
pub struct AnalyticsClient {
    http: reqwest::Client,
    endpoint: String,
    tokens: TokenProvider,
    cache: RwLock<ReportCache>,
    cache_location: PathBuf,
}

impl AnalyticsClient {
    pub fn for_config(config: &AnalyticsConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "falling back to default HTTP client");
                reqwest::Client::new()
            });

        let tokens = TokenProvider::new(
            http.clone(),
            &config.service_account_credentials_json,
            &config.cache_location,
        );

        Self {
            http,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            tokens,
            cache: RwLock::new(ReportCache::new(config.cache_lifetime_in_minutes)),
            cache_location: config.cache_location.clone(),
        }
    }

    /// Point the client at a different `reports:batchGet` URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn cache_location(&self) -> &Path {
        &self.cache_location
    }

    pub fn token_cache_file(&self) -> &Path {
        self.tokens.cache_file()
    }

    pub fn cache_lifetime_in_minutes(&self) -> u64 {
        self.cache
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .lifetime_minutes()
    }

    /// Replace the response cache with one using the new lifetime. Cached reports are dropped.
    pub fn set_cache_lifetime_in_minutes(&self, minutes: u64) {
        *self.cache.write().unwrap_or_else(|e| e.into_inner()) = ReportCache::new(minutes);
    }

    pub async fn perform_query(
        &self,
        view_id: &str,
        period: &Period,
        query: &ReportQuery,
    ) -> AnalyticsResult<Report> {
        let body = query.to_request_body(view_id, period)?;
        let key = ReportCache::cache_key(&body);

        if let Some(cached) = self.cached_report(&key) {
            tracing::debug!(view_id, key = %key, "report cache hit");
            return Ok(cached);
        }
        tracing::debug!(view_id, key = %key, "report cache miss");

        let token = self.tokens.access_token().await?;
        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(token)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(view_id, status = %status, "reporting request failed");
            return Err(AnalyticsError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: BatchGetResponse = resp.json().await?;
        let report: Report = parsed
            .reports
            .into_iter()
            .next()
            .map(Report::from)
            .ok_or_else(|| AnalyticsError::MalformedResponse("response contained no reports".to_string()))?;

        self.store_report(key, &report)?;
        Ok(report)
    }

    fn cached_report(&self, key: &str) -> Option<Report> {
        let cache = self.cache.read().unwrap_or_else(|e| e.into_inner());
        let raw = cache.get(key)?;
        serde_json::from_str(&raw).ok()
    }

    fn store_report(&self, key: String, report: &Report) -> AnalyticsResult<()> {
        let cache = self.cache.read().unwrap_or_else(|e| e.into_inner());
        if cache.is_enabled() {
            cache.insert(key, serde_json::to_string(report)?);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_config_never_touches_credentials() {
        let config = AnalyticsConfig {
            view_id: None,
            service_account_credentials_json: PathBuf::from("/definitely/not/here.json"),
            cache_lifetime_in_minutes: 10,
            cache_location: PathBuf::from("/tmp/analytics-cache"),
        };
        let client = AnalyticsClient::for_config(&config);
        assert_eq!(client.endpoint(), DEFAULT_ENDPOINT);
        assert_eq!(client.cache_lifetime_in_minutes(), 10);
        assert_eq!(client.cache_location(), Path::new("/tmp/analytics-cache"));
        assert!(client.token_cache_file().starts_with("/tmp/analytics-cache"));
    }

    #[test]
    fn test_set_cache_lifetime() {
        let client = AnalyticsClient::for_config(&AnalyticsConfig::default());
        assert_eq!(client.cache_lifetime_in_minutes(), 1440);
        client.set_cache_lifetime_in_minutes(0);
        assert_eq!(client.cache_lifetime_in_minutes(), 0);
    }

    #[test]
    fn test_with_endpoint() {
        let client = AnalyticsClient::for_config(&AnalyticsConfig::default())
            .with_endpoint("http://127.0.0.1:9/v4/reports:batchGet");
        assert_eq!(client.endpoint(), "http://127.0.0.1:9/v4/reports:batchGet");
    }
}
