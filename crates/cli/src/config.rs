//! Run configuration from command-line flags and environment variables.
//!
//! Every flag falls back to an environment variable, and `main` loads a
//! `.env` file first, so a run can be configured entirely from the
//! environment:
//!
//! | Env Var                    | Flag                 | Default                                  |
//! |----------------------------|----------------------|------------------------------------------|
//! | `PORTAL_URL`               | `--portal-url`       | `https://governmentofbc.maps.arcgis.com` |
//! | `PORTAL_ORG_ID`            | `--org-id`           | `ubm4tcTYICKBpist`                       |
//! | `AGOL_USERNAME`            | `--username`         | anonymous                                |
//! | `AGOL_PASSWORD`            | `--password`         | required with a username                 |
//! | `LAYER_ITEM_IDS`           | `--item-ids`         | all layers                               |
//! | `REPORTS_DIR`              | `--reports-dir`      | `reports`                                |
//! | `MAX_SEARCH_PAGES`         | `--max-pages`        | `1000`                                   |
//! | `TOKEN_EXPIRATION_MINUTES` | `--token-expiration` | `360`                                    |
//! | `DETAIL_CONCURRENCY`       | `--concurrency`      | `16`                                     |
//! | `REQUEST_TIMEOUT_SECS`     | `--request-timeout`  | `30`                                     |

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use mapaudit_core::error::CoreError;
use mapaudit_core::item_ids::parse_item_ids;
use mapaudit_core::search_query::{DEFAULT_MAX_PAGES, DEFAULT_ORG_ID};
use mapaudit_core::validation::{normalize_portal_url, DEFAULT_PORTAL_URL};
use mapaudit_portal::token::DEFAULT_TOKEN_EXPIRATION_MINUTES;
use mapaudit_portal::{Credentials, PortalOptions, RetryPolicy};
use mapaudit_report::paths::DEFAULT_REPORTS_DIR;

/// Default number of item detail requests in flight at once.
pub const DEFAULT_CONCURRENCY: usize = 16;

/// Default per-request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Report which web maps in a portal organization depend on which layers.
#[derive(Debug, Parser)]
#[command(name = "mapaudit", version)]
pub struct Cli {
    /// Portal base URL.
    #[arg(long, env = "PORTAL_URL", default_value = DEFAULT_PORTAL_URL)]
    pub portal_url: String,

    /// Organization whose web maps are audited.
    #[arg(long, env = "PORTAL_ORG_ID", default_value = DEFAULT_ORG_ID)]
    pub org_id: String,

    /// Portal username. Without one only public web maps are processed.
    #[arg(long, env = "AGOL_USERNAME")]
    pub username: Option<String>,

    /// Portal password (case sensitive).
    #[arg(long, env = "AGOL_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Comma-separated layer item ids to report on. Blank reports on every layer.
    #[arg(long, env = "LAYER_ITEM_IDS")]
    pub item_ids: Option<String>,

    /// Directory the report files are written to.
    #[arg(long, env = "REPORTS_DIR", default_value = DEFAULT_REPORTS_DIR)]
    pub reports_dir: PathBuf,

    /// Search pages fetched before the run is aborted.
    #[arg(long, env = "MAX_SEARCH_PAGES", default_value_t = DEFAULT_MAX_PAGES)]
    pub max_pages: u32,

    /// Lifetime requested for the portal token, in minutes.
    #[arg(long = "token-expiration", env = "TOKEN_EXPIRATION_MINUTES", default_value_t = DEFAULT_TOKEN_EXPIRATION_MINUTES)]
    pub token_expiration_minutes: u32,

    /// Layer detail requests in flight at once.
    #[arg(long, env = "DETAIL_CONCURRENCY", default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Timeout for a single HTTP request, in seconds.
    #[arg(long = "request-timeout", env = "REQUEST_TIMEOUT_SECS", default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub request_timeout_secs: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("A password is required when a username is given")]
    MissingPassword,

    #[error("{name} must be greater than zero")]
    NotPositive { name: &'static str },

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Validated settings for one audit run.
#[derive(Debug, Clone)]
pub struct Config {
    pub portal: PortalOptions,
    /// Layer item ids requested by the user; empty means every layer.
    pub item_ids: Vec<String>,
    pub reports_dir: PathBuf,
    pub concurrency: usize,
}

impl Config {
    /// Validate parsed flags into a run configuration.
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        let portal_url = normalize_portal_url(&cli.portal_url)?;

        let username = non_blank(cli.username);
        let password = non_blank(cli.password);
        let credentials = match (username, password) {
            (Some(username), Some(password)) => Some(Credentials::new(username, password)),
            (Some(_), None) => return Err(ConfigError::MissingPassword),
            (None, Some(_)) => {
                tracing::warn!("Password given without a username; ignoring it");
                None
            }
            (None, None) => None,
        };

        if cli.max_pages == 0 {
            return Err(ConfigError::NotPositive { name: "max-pages" });
        }
        if cli.concurrency == 0 {
            return Err(ConfigError::NotPositive { name: "concurrency" });
        }
        if cli.request_timeout_secs == 0 {
            return Err(ConfigError::NotPositive {
                name: "request-timeout",
            });
        }

        let item_ids = cli
            .item_ids
            .as_deref()
            .map(parse_item_ids)
            .unwrap_or_default();

        Ok(Self {
            portal: PortalOptions {
                portal_url,
                org_id: cli.org_id.trim().to_string(),
                credentials,
                token_expiration_minutes: cli.token_expiration_minutes,
                max_pages: cli.max_pages,
                request_timeout: Duration::from_secs(cli.request_timeout_secs),
                retry: RetryPolicy::default(),
            },
            item_ids,
            reports_dir: cli.reports_dir,
            concurrency: cli.concurrency,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    // `parse_from` still reads the `env` fallbacks, so assert only on flags passed here.
    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["mapaudit"];
        argv.extend_from_slice(args);
        Cli::parse_from(argv)
    }

    fn cli() -> Cli {
        Cli {
            portal_url: DEFAULT_PORTAL_URL.to_string(),
            org_id: DEFAULT_ORG_ID.to_string(),
            username: None,
            password: None,
            item_ids: None,
            reports_dir: PathBuf::from(DEFAULT_REPORTS_DIR),
            max_pages: DEFAULT_MAX_PAGES,
            token_expiration_minutes: DEFAULT_TOKEN_EXPIRATION_MINUTES,
            concurrency: DEFAULT_CONCURRENCY,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }

    #[test]
    fn flags_parse() {
        let parsed = parse(&[
            "--portal-url",
            "https://example.maps.arcgis.com/",
            "--item-ids",
            "a1, b2",
            "--max-pages",
            "5",
            "--token-expiration",
            "60",
            "--concurrency",
            "4",
        ]);

        assert_eq!(parsed.portal_url, "https://example.maps.arcgis.com/");
        assert_eq!(parsed.max_pages, 5);
        assert_eq!(parsed.token_expiration_minutes, 60);
        assert_eq!(parsed.concurrency, 4);
    }

    #[test]
    fn anonymous_defaults() {
        let config = Config::from_cli(cli()).unwrap();
        assert!(config.portal.credentials.is_none());
        assert!(config.item_ids.is_empty());
        assert_eq!(config.portal.portal_url, DEFAULT_PORTAL_URL);
        assert_eq!(config.portal.max_pages, 1000);
        assert_eq!(config.portal.token_expiration_minutes, 360);
        assert_eq!(config.reports_dir, PathBuf::from("reports"));
    }

    #[test]
    fn username_requires_password() {
        let err = Config::from_cli(Cli {
            username: Some("alice".to_string()),
            ..cli()
        })
        .unwrap_err();
        assert_matches!(err, ConfigError::MissingPassword);
    }

    #[test]
    fn blank_username_is_anonymous() {
        let config = Config::from_cli(Cli {
            username: Some("  ".to_string()),
            ..cli()
        })
        .unwrap();
        assert!(config.portal.credentials.is_none());
    }

    #[test]
    fn credentials_are_kept() {
        let config = Config::from_cli(Cli {
            username: Some("alice".to_string()),
            password: Some("Secret".to_string()),
            ..cli()
        })
        .unwrap();
        assert_eq!(
            config.portal.credentials,
            Some(Credentials::new("alice", "Secret"))
        );
    }

    #[test]
    fn item_ids_are_split() {
        let config = Config::from_cli(Cli {
            item_ids: Some("a1, b2,,a1".to_string()),
            ..cli()
        })
        .unwrap();
        assert_eq!(config.item_ids, vec!["a1", "b2"]);
    }

    #[test]
    fn zero_limits_are_rejected() {
        let err = Config::from_cli(Cli {
            concurrency: 0,
            ..cli()
        })
        .unwrap_err();
        assert_matches!(err, ConfigError::NotPositive { name: "concurrency" });

        let err = Config::from_cli(Cli {
            max_pages: 0,
            ..cli()
        })
        .unwrap_err();
        assert_matches!(err, ConfigError::NotPositive { name: "max-pages" });
    }

    #[test]
    fn invalid_portal_url_is_rejected() {
        let err = Config::from_cli(Cli {
            portal_url: "ftp://example".to_string(),
            ..cli()
        })
        .unwrap_err();
        assert_matches!(err, ConfigError::Core(_));
    }
}
