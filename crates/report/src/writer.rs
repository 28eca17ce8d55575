//! [`ReportWriter`] ties the report files of one run to a directory and
//! timestamp.

use std::fs;
use std::path::{Path, PathBuf};

use mapaudit_core::layers::{DependencyRow, LayerSummary};
use mapaudit_core::maps::MapSummary;

use crate::dependencies::write_dependencies;
use crate::error::ReportError;
use crate::paths::{ReportPaths, RunTimestamp};
use crate::yaml::write_yaml;

pub struct ReportWriter {
    paths: ReportPaths,
}

impl ReportWriter {
    /// Create the reports directory if needed and fix the run's file names.
    pub fn create(dir: &Path, timestamp: RunTimestamp) -> Result<Self, ReportError> {
        fs::create_dir_all(dir).map_err(|e| ReportError::io(dir, e))?;
        Ok(Self {
            paths: ReportPaths::new(dir, timestamp),
        })
    }

    pub fn paths(&self) -> &ReportPaths {
        &self.paths
    }

    pub fn write_maps(&self, maps: &[MapSummary]) -> Result<PathBuf, ReportError> {
        write_yaml(&self.paths.maps, maps)?;
        tracing::info!(path = %self.paths.maps.display(), count = maps.len(), "Wrote map report");
        Ok(self.paths.maps.clone())
    }

    pub fn write_layers(&self, layers: &[LayerSummary]) -> Result<PathBuf, ReportError> {
        write_yaml(&self.paths.layers, layers)?;
        tracing::info!(path = %self.paths.layers.display(), count = layers.len(), "Wrote layer report");
        Ok(self.paths.layers.clone())
    }

    pub fn write_dependencies(&self, rows: &[DependencyRow]) -> Result<PathBuf, ReportError> {
        write_dependencies(&self.paths.dependencies, rows)?;
        tracing::info!(path = %self.paths.dependencies.display(), rows = rows.len(), "Wrote dependency matrix");
        Ok(self.paths.dependencies.clone())
    }
}
