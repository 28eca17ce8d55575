//! Report file naming.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::Utc;

/// Directory reports go to when none is configured.
pub const DEFAULT_REPORTS_DIR: &str = "reports";

/// Milliseconds since the Unix epoch, shared by all files of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RunTimestamp(pub i64);

impl RunTimestamp {
    pub fn now() -> Self {
        Self(Utc::now().timestamp_millis())
    }
}

impl fmt::Display for RunTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The three report paths of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub maps: PathBuf,
    pub layers: PathBuf,
    pub dependencies: PathBuf,
}

impl ReportPaths {
    pub fn new(dir: &Path, timestamp: RunTimestamp) -> Self {
        Self {
            maps: dir.join(format!("maps_{timestamp}.yml")),
            layers: dir.join(format!("layers_{timestamp}.yml")),
            dependencies: dir.join(format!("dependencies_{timestamp}.csv")),
        }
    }
}
