//! Parsing of user-supplied layer item id lists.

use std::collections::HashSet;

/// Split a comma-separated id list, trimming entries and dropping blanks
/// and repeats (first occurrence wins).
pub fn parse_item_ids(raw: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .filter(|id| seen.insert(*id))
        .map(str::to_string)
        .collect()
}
