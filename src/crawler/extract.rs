//! Site adapter for the submission listing and solution pages
//!
//! Selectors and URL shapes here are specific to the judge's layout. They
//! are fixed on purpose: a layout change means updating this file.

use scraper::{Html, Selector};
use url::Url;

/// Table body of the submission listing; its presence means the page rendered
pub const LISTING_CONTAINER: &str = "tbody.MuiTableBody-root";

/// One row per submission
const LISTING_ROWS: &str = "tbody.MuiTableBody-root tr";

/// First cell of a listing row, holding the submission id
const ROW_ID_CELL: &str = "td";

/// Pagination control leading to the next listing page
const NEXT_PAGE_BUTTON: &str = r#"button[aria-label="Next Page"]"#;

/// Verdict label on a solution page
pub const STATUS_LABEL: &str = r#"div[class*="_status_container"] > span"#;

/// Language label on a solution page
pub const LANGUAGE_LABEL: &str = r#"div[class*="_ideLanguageName"]"#;

/// Element whose text is the submitted source on the plain-text page
pub const SOURCE_BODY: &str = "body";

/// Path segment preceding the id in solution links
const SOLUTION_SEGMENT: &str = "viewsolution";

/// Path segment preceding the id in plain-text source links
const PLAINTEXT_SEGMENT: &str = "viewplaintext";

/// True for non-empty, all-digit submission ids
pub fn is_submission_id(candidate: &str) -> bool {
    !candidate.is_empty() && candidate.chars().all(|c| c.is_ascii_digit())
}

/// Submission ids listed on a listing page, in row order
///
/// Rows whose first cell is not a numeric id (headers, placeholders, empty
/// rows) are dropped.
pub fn extract_submission_ids(document: &Html) -> Vec<String> {
    let (Ok(rows), Ok(cell)) = (Selector::parse(LISTING_ROWS), Selector::parse(ROW_ID_CELL)) else {
        return Vec::new();
    };

    document
        .select(&rows)
        .filter_map(|row| {
            let id = row
                .select(&cell)
                .next()?
                .text()
                .collect::<String>()
                .trim()
                .to_string();
            is_submission_id(&id).then_some(id)
        })
        .collect()
}

/// Whether the listing offers an enabled "Next Page" control
pub fn has_next_page(document: &Html) -> bool {
    let Ok(selector) = Selector::parse(NEXT_PAGE_BUTTON) else {
        return false;
    };

    document
        .select(&selector)
        .next()
        .map(|button| button.value().attr("disabled").is_none())
        .unwrap_or(false)
}

/// Solution page URL for a submission id
pub fn solution_link(site_root: &str, id: &str) -> String {
    format!("{}/{}/{}", site_root.trim_end_matches('/'), SOLUTION_SEGMENT, id)
}

/// Plain-text source URL for a submission id
pub fn plaintext_link(site_root: &str, id: &str) -> String {
    format!("{}/{}/{}", site_root.trim_end_matches('/'), PLAINTEXT_SEGMENT, id)
}

/// Submission id embedded in a solution link
///
/// Returns None when the link does not parse or has no numeric segment
/// after `viewsolution`.
pub fn submission_id(link: &str) -> Option<String> {
    let url = Url::parse(link).ok()?;
    let mut segments = url.path_segments()?;
    segments.find(|segment| *segment == SOLUTION_SEGMENT)?;
    let id = segments.next()?;
    is_submission_id(id).then(|| id.to_string())
}
