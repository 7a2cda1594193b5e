//! Best-effort parser for markdown-table-shaped listing dumps.
//!
//! Table boundaries are detected, not declared: a table starts at the first
//! row after a header containing a "Company" marker and ends at the first
//! blank line or section heading. Malformed rows are skipped silently; a
//! wholly unparseable source yields an empty set, never an error.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::warn;

use crate::RawListing;

lazy_static! {
    // Embedded hyperlink: [Apply](https://example.com/apply)
    static ref LINK_RE: Regex = Regex::new(r"\[[^\]]*\]\((https?://[^)\s]+)\)").unwrap();
    // Alignment/separator row: | --- | :--- | ---: |
    static ref SEPARATOR_RE: Regex = Regex::new(r"^\|?[\s|:\-]+\|?$").unwrap();
}

/// Minimum populated columns for a row to produce a record.
const MIN_COLUMNS: usize = 4;

/// Parse every listing table found in `text`. Best-effort: rows that do not
/// yield at least four non-empty columns and a resolvable apply URL are
/// dropped without producing partial records.
pub fn parse_listing_tables(text: &str) -> Vec<RawListing> {
    let mut listings = Vec::new();
    let mut in_table = false;

    for line in text.lines() {
        let trimmed = line.trim();

        if !in_table {
            if is_header_row(trimmed) {
                in_table = true;
            }
            continue;
        }

        // Blank line or a new section heading terminates the current table.
        if trimmed.is_empty() || trimmed.starts_with('#') {
            in_table = false;
            continue;
        }

        if SEPARATOR_RE.is_match(trimmed) {
            continue;
        }

        if !trimmed.starts_with('|') {
            in_table = false;
            continue;
        }

        if let Some(listing) = parse_row(trimmed) {
            listings.push(listing);
        }
    }

    if listings.is_empty() && !text.trim().is_empty() {
        warn!("no parsable listing rows found in source text");
    }

    listings
}

fn is_header_row(line: &str) -> bool {
    line.starts_with('|') && line.to_lowercase().contains("company")
}

fn parse_row(line: &str) -> Option<RawListing> {
    let cells: Vec<&str> = line
        .split('|')
        .map(str::trim)
        .filter(|cell| !cell.is_empty())
        .collect();

    if cells.len() < MIN_COLUMNS {
        return None;
    }

    let apply_url = resolve_apply_url(cells[3]);
    if apply_url.is_empty() {
        return None;
    }

    Some(RawListing {
        company: cells[0].to_string(),
        title: cells[1].to_string(),
        location: cells[2].to_string(),
        apply_url,
    })
}

/// Prefer an embedded hyperlink target; fall back to the raw cell text.
fn resolve_apply_url(cell: &str) -> String {
    LINK_RE
        .captures(cell)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| cell.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const WELL_FORMED: &str = "\
## Open roles

| Company | Role | Location | Apply |
| --- | --- | --- | --- |
| Acme Labs | Software Engineer Intern | Remote | [Apply](https://acme.example/apply) |
| Globex | Data Analyst | New York, NY | [Link](https://globex.example/jobs/7) |
";

    #[test]
    fn parses_well_formed_table_rows() {
        let listings = parse_listing_tables(WELL_FORMED);

        assert_eq!(listings.len(), 2);
        assert_eq!(
            listings[0],
            RawListing {
                company: "Acme Labs".into(),
                title: "Software Engineer Intern".into(),
                location: "Remote".into(),
                apply_url: "https://acme.example/apply".into(),
            }
        );
    }

    #[test]
    fn raw_cell_text_is_used_when_no_embedded_link_exists() {
        let text = "\
| Company | Role | Location | Apply |
| --- | --- | --- | --- |
| Initech | QA Engineer | Austin, TX | https://initech.example/careers |
";
        let listings = parse_listing_tables(text);
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].apply_url, "https://initech.example/careers");
    }

    #[test]
    fn rows_with_too_few_columns_are_skipped() {
        let text = "\
| Company | Role | Location | Apply |
| --- | --- | --- | --- |
| Acme | Engineer | [Apply](https://acme.example) |
| Acme | | Remote | [Apply](https://acme.example) |
| Hooli | PM | Palo Alto | [Apply](https://hooli.example/pm) |
";
        let listings = parse_listing_tables(text);
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].company, "Hooli");
    }

    #[test]
    fn table_ends_at_blank_line_or_heading() {
        let text = "\
| Company | Role | Location | Apply |
| --- | --- | --- | --- |
| Acme | Engineer | Remote | [Apply](https://acme.example) |

| Stray | Row | Outside | [Apply](https://stray.example) |
## Notes
| Hooli | PM | Palo Alto | [Apply](https://hooli.example) |
";
        let listings = parse_listing_tables(text);
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].company, "Acme");
    }

    #[test]
    fn second_table_with_its_own_header_is_picked_up() {
        let text = format!("{WELL_FORMED}\n# Another batch\n\n| Company | Role | Location | Apply |\n|---|---|---|---|\n| Umbrella | Research Intern | Boston, MA | [Go](https://umbrella.example) |\n");
        let listings = parse_listing_tables(&text);
        assert_eq!(listings.len(), 3);
        assert_eq!(listings[2].company, "Umbrella");
    }

    #[test]
    fn malformed_sources_yield_empty_sets_not_errors() {
        assert!(parse_listing_tables("").is_empty());
        assert!(parse_listing_tables("just prose, no tables").is_empty());
        assert!(parse_listing_tables("| no | header | marker | here |").is_empty());
    }
}
