//! Domain types and pure helpers for auditing web-map layer dependencies.
//!
//! Nothing in this crate performs I/O. The portal client fills the types
//! defined here, the cross-referencing helpers join them, and the report
//! crate serializes the result.

pub mod crossref;
pub mod error;
pub mod item_ids;
pub mod layers;
pub mod maps;
pub mod search_query;
pub mod validation;
