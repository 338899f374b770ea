pub mod analytics;
pub mod client;
pub mod config;
pub mod error;
pub mod period;
pub mod provider;
pub mod publish;

pub use analytics::Analytics;
pub use client::AnalyticsClient;
pub use config::AnalyticsConfig;
pub use error::{AnalyticsError, InvalidConfiguration};
pub use period::Period;
pub use provider::{AnalyticsServiceProvider, Scope, Service, ServiceKey, FACADE_ALIAS};
