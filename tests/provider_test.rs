use analytics_provider::{
    AnalyticsConfig, AnalyticsServiceProvider, InvalidConfiguration, Scope, Service, ServiceKey,
    FACADE_ALIAS,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Writes an (empty) credentials file and returns its path. Existence is all binding checks.
fn credentials_file(dir: &Path) -> PathBuf {
    let path = dir.join("service-account-credentials.json");
    std::fs::write(&path, "{}").unwrap();
    path
}

fn config(view_id: Option<&str>, credentials: &Path) -> AnalyticsConfig {
    AnalyticsConfig {
        view_id: view_id.map(str::to_string),
        service_account_credentials_json: credentials.to_path_buf(),
        ..AnalyticsConfig::default()
    }
}

#[test]
fn test_missing_view_id_fails_even_with_credentials() {
    let dir = tempfile::tempdir().unwrap();
    let creds = credentials_file(dir.path());

    for view_id in [None, Some("")] {
        let provider = AnalyticsServiceProvider::new(config(view_id, &creds));
        let err = provider.analytics().err().unwrap();
        assert_eq!(err, InvalidConfiguration::ViewIdNotSpecified);
    }
}

#[test]
fn test_missing_view_id_fails_without_credentials() {
    let provider = AnalyticsServiceProvider::new(config(None, Path::new("/nope/creds.json")));
    assert_eq!(
        provider.analytics().err(),
        Some(InvalidConfiguration::ViewIdNotSpecified)
    );
}

#[test]
fn test_missing_credentials_carries_exact_path() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("does-not-exist.json");
    let provider = AnalyticsServiceProvider::new(config(Some("12345"), &missing));

    assert_eq!(
        provider.analytics().err(),
        Some(InvalidConfiguration::CredentialsFileMissing(missing))
    );
}

#[test]
fn test_empty_view_id_checked_before_credentials() {
    let provider =
        AnalyticsServiceProvider::new(config(Some(""), Path::new("/tmp/missing.json")));
    assert_eq!(
        provider.analytics().err(),
        Some(InvalidConfiguration::ViewIdNotSpecified)
    );
}

#[test]
fn test_valid_config_binds_view_id() {
    let dir = tempfile::tempdir().unwrap();
    let creds = credentials_file(dir.path());
    let provider = AnalyticsServiceProvider::new(config(Some("12345"), &creds));

    let analytics = provider.analytics().unwrap();
    assert_eq!(analytics.view_id(), "12345");
}

#[test]
fn test_client_never_fails() {
    let configs = [
        AnalyticsConfig::default(),
        config(None, Path::new("/missing/creds.json")),
        config(Some(""), Path::new("")),
        AnalyticsConfig {
            cache_lifetime_in_minutes: 0,
            ..config(Some("1"), Path::new("/missing/creds.json"))
        },
        AnalyticsConfig {
            cache_lifetime_in_minutes: 600_000_000,
            ..AnalyticsConfig::default()
        },
        AnalyticsConfig {
            cache_lifetime_in_minutes: u64::MAX,
            ..config(Some("12345"), Path::new("/missing/creds.json"))
        },
    ];

    for cfg in configs {
        for scope in [Scope::Singleton, Scope::Transient] {
            let provider = AnalyticsServiceProvider::with_scope(cfg.clone(), scope);
            let client = provider.client();
            assert_eq!(
                client.cache_lifetime_in_minutes(),
                cfg.cache_lifetime_in_minutes
            );
            assert!(matches!(
                provider.resolve(ServiceKey::Client),
                Ok(Service::Client(_))
            ));
        }
    }
}

#[test]
fn test_singleton_alias_resolves_same_instance() {
    let dir = tempfile::tempdir().unwrap();
    let creds = credentials_file(dir.path());
    let provider = AnalyticsServiceProvider::new(config(Some("12345"), &creds));

    let by_key = match provider.resolve(ServiceKey::Analytics).unwrap() {
        Service::Analytics(a) => a,
        Service::Client(_) => panic!("expected the facade"),
    };
    let alias_key = ServiceKey::from_name(FACADE_ALIAS).unwrap();
    let by_alias = match provider.resolve(alias_key).unwrap() {
        Service::Analytics(a) => a,
        Service::Client(_) => panic!("expected the facade"),
    };

    assert!(Arc::ptr_eq(&by_key, &by_alias));
    assert!(Arc::ptr_eq(by_key.client(), &provider.client()));
}

#[test]
fn test_singleton_does_not_revalidate() {
    let dir = tempfile::tempdir().unwrap();
    let creds = credentials_file(dir.path());
    let provider = AnalyticsServiceProvider::new(config(Some("12345"), &creds));

    let first = provider.analytics().unwrap();
    std::fs::remove_file(&creds).unwrap();
    let second = provider.analytics().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn test_singleton_failure_is_not_cached() {
    let dir = tempfile::tempdir().unwrap();
    let creds = dir.path().join("later.json");
    let provider = AnalyticsServiceProvider::new(config(Some("12345"), &creds));

    assert!(provider.analytics().is_err());
    std::fs::write(&creds, "{}").unwrap();
    assert_eq!(provider.analytics().unwrap().view_id(), "12345");
}

#[test]
fn test_transient_revalidates_every_resolution() {
    let dir = tempfile::tempdir().unwrap();
    let creds = credentials_file(dir.path());
    let provider =
        AnalyticsServiceProvider::with_scope(config(Some("12345"), &creds), Scope::Transient);

    let first = provider.analytics().unwrap();
    let second = provider.analytics().unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    assert!(!Arc::ptr_eq(first.client(), second.client()));

    std::fs::remove_file(&creds).unwrap();
    assert_eq!(
        provider.analytics().err(),
        Some(InvalidConfiguration::CredentialsFileMissing(creds))
    );
}

#[test]
fn test_error_messages_name_the_problem() {
    let err = InvalidConfiguration::CredentialsFileMissing(PathBuf::from("/tmp/missing.json"));
    assert!(err.to_string().contains("/tmp/missing.json"));
    assert!(InvalidConfiguration::ViewIdNotSpecified
        .to_string()
        .contains("view id"));
}
