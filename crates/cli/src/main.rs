//! `mapaudit` -- web-map layer dependency auditor.
//!
//! Enumerates the web maps of a portal organization, resolves the layers
//! each map uses and writes three reports: the maps with their layers,
//! the layers with the maps that use them, and a CSV dependency matrix.
//!
//! Configuration comes from flags or the environment (see
//! [`mapaudit_cli::config`]). `RUST_LOG` controls log filtering and
//! `LOG_FORMAT=json` switches to JSON log lines.

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mapaudit_cli::config::{Cli, Config};
use mapaudit_cli::run::{self, RunOutcome};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "mapaudit=info,mapaudit_cli=info,mapaudit_portal=info,mapaudit_report=info".into()
            }),
        )
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(tracing_subscriber::fmt::layer))
        .init();

    match try_main(Cli::parse()).await {
        Ok(outcome) => {
            tracing::info!(
                maps = outcome.maps,
                layers = outcome.layers,
                dependencies = outcome.dependencies,
                maps_report = %outcome.paths.maps.display(),
                layers_report = %outcome.paths.layers.display(),
                dependencies_report = %outcome.paths.dependencies.display(),
                "Audit complete",
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn try_main(cli: Cli) -> anyhow::Result<RunOutcome> {
    let config = Config::from_cli(cli).context("Invalid configuration")?;
    tracing::info!(
        portal = %config.portal.portal_url,
        org_id = %config.portal.org_id,
        authenticated = config.portal.credentials.is_some(),
        requested_layers = config.item_ids.len(),
        "Starting mapaudit",
    );

    run::run(&config).await.context("Audit failed")
}
