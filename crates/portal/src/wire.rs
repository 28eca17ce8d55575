//! JSON shapes returned by the portal endpoints.
//!
//! Only the fields the audit reads are modelled; everything else is
//! ignored by serde.

use mapaudit_core::maps::{MapLayer, MapSummary};
use serde::Deserialize;

/// `error.code` values meaning the token is missing, invalid or expired.
pub const TOKEN_ERROR_CODES: &[i64] = &[401, 498, 499];

/// `layerType` of a group layer whose children are the real data layers.
pub const GROUP_LAYER_TYPE: &str = "GroupLayer";

/// The `error` object the portal embeds in otherwise successful responses.
#[derive(Debug, Clone, Deserialize)]
pub struct PortalErrorBody {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

impl PortalErrorBody {
    pub fn is_token_error(&self) -> bool {
        TOKEN_ERROR_CODES.contains(&self.code)
    }
}

/// Extract the embedded `error` object, if the body carries one.
pub fn portal_error(body: &serde_json::Value) -> Option<PortalErrorBody> {
    let error = body.get("error")?;
    Some(
        serde_json::from_value(error.clone()).unwrap_or_else(|_| PortalErrorBody {
            code: 0,
            message: error.to_string(),
        }),
    )
}

/// Response of `POST /sharing/rest/generateToken`.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub token: Option<String>,
    /// Expiry as milliseconds since the Unix epoch.
    #[serde(default)]
    pub expires: Option<i64>,
    #[serde(default)]
    pub error: Option<PortalErrorBody>,
}

/// One page of `GET /sharing/rest/search`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    /// Missing when the portal answered with an error instead of results.
    #[serde(default)]
    pub results: Option<Vec<MapSummary>>,
    #[serde(default)]
    pub next_start: Option<i64>,
    #[serde(default)]
    pub total: Option<i64>,
    #[serde(default)]
    pub error: Option<PortalErrorBody>,
}

/// `GET /sharing/rest/content/items/{id}/data` for a web map or scene.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemData {
    #[serde(default)]
    pub operational_layers: Option<Vec<OperationalLayer>>,
}

impl ItemData {
    /// The map's data layers, with group layers replaced by their children.
    pub fn into_map_layers(self) -> Vec<MapLayer> {
        let mut layers = Vec::new();
        for layer in self.operational_layers.unwrap_or_default() {
            layer.flatten_into(&mut layers);
        }
        layers
    }
}

/// An entry of `operationalLayers`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationalLayer {
    #[serde(flatten)]
    pub layer: MapLayer,
    #[serde(default)]
    pub layer_type: Option<String>,
    /// Children of a group layer. Some documents store `null` here.
    #[serde(default)]
    pub layers: Option<Vec<OperationalLayer>>,
}

impl OperationalLayer {
    fn flatten_into(self, out: &mut Vec<MapLayer>) {
        if self.layer_type.as_deref() == Some(GROUP_LAYER_TYPE) {
            for child in self.layers.unwrap_or_default() {
                child.flatten_into(out);
            }
        } else {
            out.push(self.layer);
        }
    }
}
