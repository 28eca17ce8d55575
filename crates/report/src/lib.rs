//! Report files written at the end of an audit run.
//!
//! A run produces three files sharing one millisecond timestamp:
//! `maps_<ts>.yml`, `layers_<ts>.yml` and `dependencies_<ts>.csv`.

pub mod dependencies;
pub mod error;
pub mod paths;
pub mod writer;
pub mod yaml;

pub use error::ReportError;
pub use paths::{ReportPaths, RunTimestamp};
pub use writer::ReportWriter;
