use analytics_provider::config::AppConfig;
use analytics_provider::publish::{publish_config, PublishOutcome};
use analytics_provider::{AnalyticsServiceProvider, Period};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "analytics-provider",
    about = "Google Analytics reporting client and facade"
)]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "analytics.toml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Copy the default config template into place
    Publish {
        #[arg(long, default_value = "analytics.toml")]
        path: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Validate the configuration by resolving the analytics facade
    Check,
    /// Resolve only the raw client and print its settings
    Client,
    /// Run a report and print it as JSON
    Query {
        #[arg(value_enum)]
        report: ReportKind,
        #[arg(long, default_value_t = 7)]
        days: u32,
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ReportKind {
    Visitors,
    Totals,
    Pages,
    Referrers,
    Browsers,
}

fn load_provider(config_path: &str) -> Result<AnalyticsServiceProvider, config::ConfigError> {
    let config = AppConfig::load(Some(config_path))?;
    Ok(AnalyticsServiceProvider::new(config.analytics))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Init tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "analytics_provider=info".into()),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Publish { path, force } => match publish_config(&path, force)? {
            PublishOutcome::Published(p) => println!("published {}", p.display()),
            PublishOutcome::Skipped(p) => {
                println!("{} already exists, use --force to overwrite", p.display())
            }
        },
        Command::Check => {
            let provider = load_provider(&cli.config)?;
            let analytics = provider.analytics()?;
            tracing::info!(view_id = analytics.view_id(), "configuration is valid");
            println!("ok: view {}", analytics.view_id());
        }
        Command::Client => {
            let provider = load_provider(&cli.config)?;
            let client = provider.client();
            let summary = serde_json::json!({
                "endpoint": client.endpoint(),
                "cache_lifetime_in_minutes": client.cache_lifetime_in_minutes(),
                "cache_location": client.cache_location(),
                "token_cache_file": client.token_cache_file(),
                "credentials": provider.config().service_account_credentials_json,
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Query {
            report,
            days,
            limit,
        } => {
            let provider = load_provider(&cli.config)?;
            let analytics = provider.analytics()?;
            let period = Period::days(days)?;
            tracing::info!(view_id = analytics.view_id(), days, "running report");

            let output = match report {
                ReportKind::Visitors => {
                    serde_json::to_value(analytics.fetch_visitors_and_page_views(&period).await?)?
                }
                ReportKind::Totals => serde_json::to_value(
                    analytics
                        .fetch_total_visitors_and_page_views(&period)
                        .await?,
                )?,
                ReportKind::Pages => serde_json::to_value(
                    analytics.fetch_most_visited_pages(&period, limit).await?,
                )?,
                ReportKind::Referrers => {
                    serde_json::to_value(analytics.fetch_top_referrers(&period, limit).await?)?
                }
                ReportKind::Browsers => {
                    serde_json::to_value(analytics.fetch_top_browsers(&period, limit).await?)?
                }
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_publish_parses_without_config() {
        let cli = Cli::try_parse_from(["analytics-provider", "publish", "--path", "out.toml", "--force"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Command::Publish { ref path, force: true } if path == &PathBuf::from("out.toml")
        ));
        assert_eq!(cli.config, "analytics.toml");
    }
}
