//! One audit run: authenticate, enumerate maps and their layers, fetch
//! layer details and write the reports.

use mapaudit_core::crossref::{build_layer_summaries, collect_layer_item_ids, dependency_rows};
use mapaudit_core::maps::MapSummary;
use mapaudit_portal::{PortalClient, PortalError};
use mapaudit_report::{ReportError, ReportPaths, ReportWriter, RunTimestamp};

use crate::config::Config;

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Portal(#[from] PortalError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error("Could not find any of the requested item ids; see the warnings above for each id")]
    NoValidItemIds,
}

/// What a completed run produced.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub maps: usize,
    pub layers: usize,
    pub dependencies: usize,
    pub paths: ReportPaths,
}

/// Run a full audit against the configured portal.
pub async fn run(config: &Config) -> Result<RunOutcome, RunError> {
    let client = PortalClient::new(config.portal.clone())?;
    run_with_client(&client, config).await
}

/// Run a full audit with an existing client.
pub async fn run_with_client(client: &PortalClient, config: &Config) -> Result<RunOutcome, RunError> {
    if !client.authenticate().await? {
        tracing::info!("Proceeding without a token. Only publicly available webmaps will be processed.");
    }

    let requested = validate_item_ids(client, &config.item_ids).await?;

    let maps = enumerate_maps(client).await?;

    let writer = ReportWriter::create(&config.reports_dir, RunTimestamp::now())?;
    writer.write_maps(&maps)?;

    let layer_ids = if requested.is_empty() {
        collect_layer_item_ids(&maps)
    } else {
        requested
    };
    tracing::info!(count = layer_ids.len(), concurrency = config.concurrency, "Fetching layer details");

    let details = client
        .item_details_batch(&layer_ids, config.concurrency)
        .await?;
    let summaries = build_layer_summaries(&details, &maps);
    let rows = dependency_rows(&summaries);

    writer.write_dependencies(&rows)?;
    writer.write_layers(&summaries)?;

    Ok(RunOutcome {
        maps: maps.len(),
        layers: summaries.len(),
        dependencies: rows.len(),
        paths: writer.paths().clone(),
    })
}

/// Keep the requested ids that exist and are visible, warning about the rest.
///
/// An empty request is valid and means "every layer". A non-empty request
/// with no valid ids is an error.
pub async fn validate_item_ids(
    client: &PortalClient,
    item_ids: &[String],
) -> Result<Vec<String>, RunError> {
    let mut valid = Vec::with_capacity(item_ids.len());
    for item_id in item_ids {
        if client.item_exists(item_id).await? {
            valid.push(item_id.clone());
        } else {
            tracing::warn!(
                item_id = %item_id,
                "Could not locate item with ID {item_id}. Please confirm that the item exists and that you have permission to access it."
            );
        }
    }

    if !item_ids.is_empty() && valid.is_empty() {
        return Err(RunError::NoValidItemIds);
    }
    Ok(valid)
}

/// Search the organization's web maps and resolve each map's layers, one
/// map at a time.
pub async fn enumerate_maps(client: &PortalClient) -> Result<Vec<MapSummary>, RunError> {
    let mut maps = client.search_all_maps().await?;
    let total = maps.len();

    for (n, map) in maps.iter_mut().enumerate() {
        tracing::info!("{}/{total} Getting layer information for webmap: {}", n + 1, map.title);
        map.layers = client.map_layers(&map.id).await?;
    }

    Ok(maps)
}
