//! The layer-to-map dependency matrix as CSV.

use std::path::Path;

use mapaudit_core::layers::DependencyRow;

use crate::error::ReportError;

/// Column names, in [`DependencyRow`] field order.
pub const CSV_HEADER: [&str; 7] = [
    "layer_id",
    "layer_title",
    "layer_url",
    "map_item_id",
    "map_name",
    "map_views",
    "map_owner",
];

/// Write the header and one record per row. Missing URLs are empty fields.
///
/// The header is written explicitly so an empty matrix still has one.
pub fn write_dependencies(path: &Path, rows: &[DependencyRow]) -> Result<(), ReportError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;

    writer.write_record(CSV_HEADER)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush().map_err(|e| ReportError::io(path, e))
}
