//! Search parameters for enumerating an organization's web maps.
//!
//! The portal search endpoint pages with a 1-based `start` offset and
//! reports the next offset in `nextStart`, which is `-1` on the last page.

// ---------------------------------------------------------------------------
// Paging constants
// ---------------------------------------------------------------------------

/// Results requested per search page.
pub const PAGE_SIZE: u32 = 100;

/// `nextStart` value marking the last page.
pub const LAST_PAGE_MARKER: i64 = -1;

/// Default cap on fetched pages. Reaching it means something went wrong.
pub const DEFAULT_MAX_PAGES: u32 = 1000;

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

/// Organization searched when none is configured.
pub const DEFAULT_ORG_ID: &str = "ubm4tcTYICKBpist";

/// Item types excluded from the web-map search alongside the type filter.
const EXCLUDED_TYPES: &[&str] = &[
    r#"-type:"Code Attachment""#,
    r#"-type:"Featured Items""#,
    r#"-type:"Symbol Set""#,
    r#"-type:"Color Set""#,
    r#"-type:"Windows Viewer Add In""#,
    r#"-type:"Windows Viewer Configuration""#,
    r#"-type:"Map Area""#,
    r#"-typekeywords:"MapAreaPackage""#,
    r#"-type:"Indoors Map Configuration""#,
    r#"-typekeywords:"SMX""#,
];

/// Build the `q` parameter selecting the organization's web maps and scenes.
pub fn org_web_map_query(org_id: &str) -> String {
    format!(
        r#" orgid:{org_id} (type:("Web Map" OR "CityEngine Web Scene") -type:"Web Mapping Application")  {}"#,
        EXCLUDED_TYPES.join(" ")
    )
}

/// 1-based `start` offset of a 1-based page number.
pub fn page_start(page: u32) -> u32 {
    page.saturating_sub(1) * PAGE_SIZE + 1
}

/// Whether a page's `nextStart` indicates there are more pages.
///
/// A missing `nextStart` is treated as the last page.
pub fn has_next_page(next_start: Option<i64>) -> bool {
    matches!(next_start, Some(n) if n != LAST_PAGE_MARKER && n > 0)
}
