use moka::sync::Cache;
use sha2::{Digest, Sha256};
use std::time::Duration;

/// moka refuses TTLs over 1000 years; longer lifetimes are capped here.
const MAX_TTL_SECS: u64 = 100 * 365 * 24 * 60 * 60;

/// Report cache keyed on the SHA-256 of the request body.
/// Stores serialized JSON strings; a lifetime of zero disables it entirely.
pub struct ReportCache {
    inner: Option<Cache<String, String>>,
    lifetime_minutes: u64,
}

impl ReportCache {
    pub fn new(lifetime_minutes: u64) -> Self {
        let inner = (lifetime_minutes > 0).then(|| {
            Cache::builder()
                .time_to_live(ttl(lifetime_minutes))
                .max_capacity(512)
                .build()
        });
        Self {
            inner,
            lifetime_minutes,
        }
    }

    pub fn cache_key(request_body: &str) -> String {
        hex::encode(Sha256::digest(request_body.as_bytes()))
    }

    pub fn lifetime_minutes(&self) -> u64 {
        self.lifetime_minutes
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.as_ref()?.get(key)
    }

    pub fn insert(&self, key: String, value: String) {
        if let Some(cache) = &self.inner {
            cache.insert(key, value);
        }
    }
}

fn ttl(lifetime_minutes: u64) -> Duration {
    Duration::from_secs(lifetime_minutes.saturating_mul(60).min(MAX_TTL_SECS))
}
