use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

/// Environment variable the host reads the view id from.
pub const VIEW_ID_ENV: &str = "GOOGLE_ANALYTICS_VIEW_ID";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub analytics: AnalyticsConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct AnalyticsConfig {
    /// The view id of which you want to display data.
    #[serde(default)]
    pub view_id: Option<String>,
    /// Path to the json file with service account credentials.
    #[serde(default = "default_credentials_path")]
    pub service_account_credentials_json: PathBuf,
    /// Minutes reporting responses are cached. Zero disables caching.
    #[serde(default = "default_cache_lifetime")]
    pub cache_lifetime_in_minutes: u64,
    /// Directory where the client keeps its cache files.
    #[serde(default = "default_cache_location")]
    pub cache_location: PathBuf,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            view_id: None,
            service_account_credentials_json: default_credentials_path(),
            cache_lifetime_in_minutes: default_cache_lifetime(),
            cache_location: default_cache_location(),
        }
    }
}

impl AnalyticsConfig {
    pub fn new(view_id: impl Into<String>, credentials: impl Into<PathBuf>) -> Self {
        Self {
            view_id: Some(view_id.into()),
            service_account_credentials_json: credentials.into(),
            ..Self::default()
        }
    }

    /// The configured view id, with an empty string treated as absent.
    pub fn view_id(&self) -> Option<&str> {
        self.view_id.as_deref().filter(|id| !id.is_empty())
    }
}

fn default_credentials_path() -> PathBuf {
    PathBuf::from("storage/analytics/service-account-credentials.json")
}

fn default_cache_lifetime() -> u64 {
    60 * 24
}

fn default_cache_location() -> PathBuf {
    PathBuf::from("storage/cache/analytics")
}

impl AppConfig {
    pub fn load(config_path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = Config::builder();

        // Load from config file
        let path = config_path.unwrap_or("analytics.toml");
        builder = builder.add_source(File::with_name(path).required(false));

        // Overlay with environment variables (ANALYTICS__ANALYTICS__VIEW_ID=123, etc.).
        // Values stay strings so view ids like "0123" keep their leading zeros;
        // numeric fields are parsed from the string during deserialization.
        builder = builder.add_source(Environment::with_prefix("ANALYTICS").separator("__"));

        // The conventional view id variable wins over everything else
        if let Ok(view_id) = std::env::var(VIEW_ID_ENV) {
            builder = builder.set_override("analytics.view_id", view_id)?;
        }

        builder.build()?.try_deserialize()
    }
}
