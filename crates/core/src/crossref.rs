//! Joins map summaries and layer details into the layer-centric view.

use std::collections::HashSet;

use crate::layers::{DependencyRow, LayerDetails, LayerSummary};
use crate::maps::{MapRef, MapSummary};

/// Unique layer item ids across all maps, in first-seen order.
///
/// Layers without an `itemId` are skipped.
pub fn collect_layer_item_ids(maps: &[MapSummary]) -> Vec<String> {
    let mut seen = HashSet::new();
    maps.iter()
        .flat_map(|map| map.layers.iter())
        .filter_map(|layer| layer.item_id.as_deref())
        .filter(|item_id| seen.insert(*item_id))
        .map(str::to_string)
        .collect()
}

/// Maps that reference the given layer item, in enumeration order.
pub fn relevant_maps(maps: &[MapSummary], layer_item_id: &str) -> Vec<MapRef> {
    maps.iter()
        .filter(|map| map.depends_on(layer_item_id))
        .map(MapRef::from)
        .collect()
}

/// One summary per layer detail, each listing its referencing maps.
pub fn build_layer_summaries(details: &[LayerDetails], maps: &[MapSummary]) -> Vec<LayerSummary> {
    details
        .iter()
        .map(|detail| LayerSummary {
            id: detail.id.clone(),
            title: detail.title.clone(),
            url: detail.url.clone(),
            maps: relevant_maps(maps, &detail.id),
        })
        .collect()
}

/// Flatten summaries into (layer, map) rows. Unreferenced layers yield none.
pub fn dependency_rows(summaries: &[LayerSummary]) -> Vec<DependencyRow> {
    summaries
        .iter()
        .flat_map(|layer| layer.maps.iter().map(move |map| DependencyRow::new(layer, map)))
        .collect()
}
