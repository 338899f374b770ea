//! Binds the reporting client and the analytics facade from one configuration.
//!
//! Only the facade binding validates. Code that needs nothing but the raw
//! client (diagnostics, token checks) can resolve it with an incomplete config.

use crate::analytics::Analytics;
use crate::client::AnalyticsClient;
use crate::config::AnalyticsConfig;
use crate::error::InvalidConfiguration;
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// Symbolic name the facade can also be resolved under.
pub const FACADE_ALIAS: &str = "google-analytics";

/// How long a resolved service lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    /// Built once, then shared for the lifetime of the provider.
    #[default]
    Singleton,
    /// Built (and for the facade, validated) on every request.
    Transient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKey {
    Client,
    Analytics,
}

impl ServiceKey {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "analytics.client" => Some(Self::Client),
            "analytics" | FACADE_ALIAS => Some(Self::Analytics),
            _ => None,
        }
    }
}

pub enum Service {
    Client(Arc<AnalyticsClient>),
    Analytics(Arc<Analytics>),
}

pub struct AnalyticsServiceProvider {
    config: AnalyticsConfig,
    scope: Scope,
    client: OnceCell<Arc<AnalyticsClient>>,
    analytics: OnceCell<Arc<Analytics>>,
}

impl AnalyticsServiceProvider {
    pub fn new(config: AnalyticsConfig) -> Self {
        Self::with_scope(config, Scope::default())
    }

    pub fn with_scope(config: AnalyticsConfig, scope: Scope) -> Self {
        Self {
            config,
            scope,
            client: OnceCell::new(),
            analytics: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// The raw reporting client. Never validates, never fails.
    pub fn client(&self) -> Arc<AnalyticsClient> {
        match self.scope {
            Scope::Singleton => self
                .client
                .get_or_init(|| Arc::new(AnalyticsClient::for_config(&self.config)))
                .clone(),
            Scope::Transient => Arc::new(AnalyticsClient::for_config(&self.config)),
        }
    }

    /// The view-bound facade, after checking the configuration is usable.
    pub fn analytics(&self) -> Result<Arc<Analytics>, InvalidConfiguration> {
        match self.scope {
            Scope::Singleton => self
                .analytics
                .get_or_try_init(|| self.build_analytics())
                .cloned(),
            Scope::Transient => self.build_analytics(),
        }
    }

    pub fn resolve(&self, key: ServiceKey) -> Result<Service, InvalidConfiguration> {
        match key {
            ServiceKey::Client => Ok(Service::Client(self.client())),
            ServiceKey::Analytics => self.analytics().map(Service::Analytics),
        }
    }

    fn build_analytics(&self) -> Result<Arc<Analytics>, InvalidConfiguration> {
        let view_id = guard_against_invalid_configuration(&self.config)?;
        let client = self.client();
        Ok(Arc::new(Analytics::new(client, view_id)))
    }
}

/// Checks the view id first, then that the credentials file exists right now.
/// Returns the view id to bind the facade to.
pub fn guard_against_invalid_configuration(
    config: &AnalyticsConfig,
) -> Result<&str, InvalidConfiguration> {
    let view_id = config
        .view_id()
        .ok_or(InvalidConfiguration::ViewIdNotSpecified)?;

    if !config.service_account_credentials_json.is_file() {
        return Err(InvalidConfiguration::CredentialsFileMissing(
            config.service_account_credentials_json.clone(),
        ));
    }

    Ok(view_id)
}
