use crate::error::PublishError;
use std::path::{Path, PathBuf};

/// The default configuration shipped with the crate.
pub const DEFAULT_CONFIG: &str = include_str!("../config/analytics.toml");

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    Published(PathBuf),
    /// The destination already existed and `force` was not set.
    Skipped(PathBuf),
}

/// Copy the default config template to `destination`, creating parent directories.
pub fn publish_config(destination: &Path, force: bool) -> Result<PublishOutcome, PublishError> {
    if destination.exists() && !force {
        tracing::info!(path = %destination.display(), "config already published, skipping");
        return Ok(PublishOutcome::Skipped(destination.to_path_buf()));
    }

    let io_err = |source: std::io::Error| PublishError::Io {
        path: destination.to_path_buf(),
        source,
    };

    if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    std::fs::write(destination, DEFAULT_CONFIG).map_err(io_err)?;

    tracing::info!(path = %destination.display(), "published config");
    Ok(PublishOutcome::Published(destination.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn test_publish_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("config/nested/analytics.toml");

        let outcome = publish_config(&dest, false).unwrap();
        assert_eq!(outcome, PublishOutcome::Published(dest.clone()));
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), DEFAULT_CONFIG);
    }

    #[test]
    fn test_publish_does_not_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("analytics.toml");
        std::fs::write(&dest, "# mine").unwrap();

        let outcome = publish_config(&dest, false).unwrap();
        assert_eq!(outcome, PublishOutcome::Skipped(dest.clone()));
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "# mine");

        let outcome = publish_config(&dest, true).unwrap();
        assert_eq!(outcome, PublishOutcome::Published(dest.clone()));
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), DEFAULT_CONFIG);
    }

    #[test]
    fn test_published_template_loads_with_defaults() {
        let _env = crate::config::tests::lock_env();
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("analytics.toml");
        publish_config(&dest, false).unwrap();

        let config = AppConfig::load(Some(dest.to_str().unwrap())).unwrap();
        let defaults = crate::config::AnalyticsConfig::default();
        assert_eq!(
            config.analytics.service_account_credentials_json,
            defaults.service_account_credentials_json
        );
        assert_eq!(
            config.analytics.cache_lifetime_in_minutes,
            defaults.cache_lifetime_in_minutes
        );
        assert_eq!(config.analytics.cache_location, defaults.cache_location);
    }
}
