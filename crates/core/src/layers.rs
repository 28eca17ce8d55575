//! Layer items and the rows of the dependency matrix.

use serde::{Deserialize, Serialize};

use crate::maps::MapRef;

/// The reported subset of a layer item's details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerDetails {
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// Service URL. Items such as uploaded files have none.
    #[serde(default)]
    pub url: Option<String>,
}

/// A layer with every map that references it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerSummary {
    pub id: String,
    pub title: String,
    pub url: Option<String>,
    pub maps: Vec<MapRef>,
}

/// One (layer, referencing map) pair in the dependency CSV.
///
/// Field order and names are the CSV header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyRow {
    pub layer_id: String,
    pub layer_title: String,
    pub layer_url: Option<String>,
    pub map_item_id: String,
    pub map_name: String,
    pub map_views: i64,
    pub map_owner: String,
}

impl DependencyRow {
    pub fn new(layer: &LayerSummary, map: &MapRef) -> Self {
        Self {
            layer_id: layer.id.clone(),
            layer_title: layer.title.clone(),
            layer_url: layer.url.clone(),
            map_item_id: map.id.clone(),
            map_name: map.title.clone(),
            map_views: map.num_views,
            map_owner: map.owner.clone(),
        }
    }
}
