//! Input validation shared by the client and the command line.

use crate::error::CoreError;

/// Portal used when none is configured.
pub const DEFAULT_PORTAL_URL: &str = "https://governmentofbc.maps.arcgis.com";

/// Validate a portal base URL and strip trailing slashes.
pub fn normalize_portal_url(url: &str) -> Result<String, CoreError> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(
            "Portal URL must not be empty".to_string(),
        ));
    }
    if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
        return Err(CoreError::Validation(format!(
            "Portal URL must start with http:// or https://, got: '{trimmed}'"
        )));
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}
