//! YAML report encoding.

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::error::ReportError;

/// Serialize `value` as YAML and write it to `path`, replacing any file.
pub fn write_yaml<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), ReportError> {
    let encoded = serde_yaml::to_string(value)?;
    fs::write(path, encoded).map_err(|e| ReportError::io(path, e))
}
