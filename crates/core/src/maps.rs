//! Web-map summaries and the layer references they contain.
//!
//! Field names serialize in camelCase (`numViews`, `itemId`) so the map
//! report keeps the portal's own vocabulary.

use serde::{Deserialize, Deserializer, Serialize};

/// A layer reference inside a web map's `operationalLayers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapLayer {
    /// Layer id inside the map document. Some older maps store it as a number.
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub id: Option<String>,
    /// Portal item backing the layer; absent for layers added by raw service URL.
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub item_id: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub title: Option<String>,
}

impl MapLayer {
    /// Whether this layer is backed by the given portal item.
    pub fn references(&self, item_id: &str) -> bool {
        self.item_id.as_deref() == Some(item_id)
    }
}

/// A web map owned by the organization, with its resolved layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapSummary {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub num_views: i64,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub layers: Vec<MapLayer>,
}

impl MapSummary {
    /// Whether any layer of this map is backed by the given portal item.
    pub fn depends_on(&self, item_id: &str) -> bool {
        self.layers.iter().any(|layer| layer.references(item_id))
    }
}

/// A map as listed under a layer in the layer report (no nested layers).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapRef {
    pub id: String,
    pub title: String,
    pub num_views: i64,
    pub owner: String,
}

impl From<&MapSummary> for MapRef {
    fn from(map: &MapSummary) -> Self {
        Self {
            id: map.id.clone(),
            title: map.title.clone(),
            num_views: map.num_views,
            owner: map.owner.clone(),
        }
    }
}

fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
