use std::path::PathBuf;

/// Raised when the facade is requested with an unusable configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidConfiguration {
    #[error("there was no view id specified, set GOOGLE_ANALYTICS_VIEW_ID or analytics.view_id")]
    ViewIdNotSpecified,

    #[error("could not find a credentials file at `{}`", .0.display())]
    CredentialsFileMissing(PathBuf),
}

/// Errors from the reporting client and the facade queries built on it.
#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    #[error("credentials error: {0}")]
    Credentials(String),

    #[error("token signing error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("google api returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("start date `{start}` cannot be after end date `{end}`")]
    InvalidPeriod {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },
}

pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("could not publish config to `{}`: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
