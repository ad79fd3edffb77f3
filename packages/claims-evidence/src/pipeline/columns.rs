//! Table loading and column resolution.
//!
//! Bibliography exports disagree on header spelling (`Title` vs `title`,
//! `Abstract Note`, `Summary of findings`, ...). Headers are normalized
//! (trimmed, BOM stripped, lowercased, inner whitespace collapsed) and
//! mapped onto the canonical fields of [`InputRecord`].

use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{PipelineError, Result};
use crate::types::record::InputRecord;

/// Exact names accepted for the content column, in priority order.
const CONTENT_EXACT: &[&str] = &["abstract", "abstract note"];

/// Prefixes tried, in order, when no exact content header exists.
const CONTENT_PREFIXES: &[&str] =
    &["reasoning for", "supporting", "summary", "description", "notes"];

const AUTHOR_NAMES: &[&str] = &["authors", "author"];
const YEAR_NAMES: &[&str] = &["year"];
const DOI_NAMES: &[&str] = &["doi"];
const CITATION_NAMES: &[&str] = &["citation count", "citation_count", "citationcount", "citations"];

/// A raw table: headers plus trimmed cells (`None` for blank or missing).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl Table {
    /// Parse CSV from any reader. Row lengths may vary.
    pub fn from_reader<R: io::Read>(reader: R) -> csv::Result<Self> {
        let reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        read_table(reader)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn read_table<R: io::Read>(mut reader: csv::Reader<R>) -> csv::Result<Table> {
    let headers = reader.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(
            record
                .iter()
                .map(|cell| {
                    let cell = cell.trim();
                    (!cell.is_empty()).then(|| cell.to_string())
                })
                .collect(),
        );
    }

    Ok(Table { headers, rows })
}

/// Read a UTF-8 CSV file with a header row.
///
/// Fails when the file cannot be opened or decoded, or has no header row.
pub fn load_table(path: impl AsRef<Path>) -> Result<Table> {
    let path = path.as_ref();
    let table_error = |source| PipelineError::TableRead {
        path: path.to_path_buf(),
        source,
    };

    let reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(table_error)?;
    let table = read_table(reader).map_err(table_error)?;

    if table.headers.iter().all(|h| normalize_header(h).is_empty()) {
        return Err(PipelineError::EmptyTable {
            path: path.to_path_buf(),
        });
    }

    debug!(path = %path.display(), rows = table.len(), "loaded table");
    Ok(table)
}

/// Canonical field to column-index mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMap {
    pub title: usize,
    /// `None` when no content-like header exists (empty column injected)
    pub content: Option<usize>,
    pub authors: Option<usize>,
    pub year: Option<usize>,
    pub doi: Option<usize>,
    pub citation_count: Option<usize>,
}

/// Lowercase, trim, strip a BOM and collapse inner whitespace.
pub fn normalize_header(header: &str) -> String {
    header
        .trim_start_matches('\u{feff}')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Map raw headers onto canonical fields.
///
/// `title` is required. The content column is an exact `abstract` /
/// `abstract note` match, else the first header (in table order) starting
/// with one of the fallback prefixes.
pub fn resolve_columns<S: AsRef<str>>(headers: &[S]) -> Result<ColumnMap> {
    let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h.as_ref())).collect();
    let find = |names: &[&str]| normalized.iter().position(|h| names.contains(&h.as_str()));

    let title = find(&["title"]).ok_or_else(|| PipelineError::MissingTitleColumn {
        found: headers.iter().map(|h| h.as_ref().to_string()).collect(),
    })?;

    let content = CONTENT_EXACT
        .iter()
        .find_map(|name| normalized.iter().position(|h| h == name))
        .or_else(|| {
            normalized.iter().enumerate().find_map(|(i, h)| {
                (i != title && CONTENT_PREFIXES.iter().any(|p| h.starts_with(p))).then_some(i)
            })
        });

    Ok(ColumnMap {
        title,
        content,
        authors: find(AUTHOR_NAMES),
        year: find(YEAR_NAMES),
        doi: find(DOI_NAMES),
        citation_count: find(CITATION_NAMES),
    })
}

/// Records ready for extraction, plus the rows that could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTable {
    pub columns: ColumnMap,
    /// Header actually used as content, if any
    pub content_header: Option<String>,
    pub records: Vec<InputRecord>,
    /// 1-based row numbers skipped for a blank title
    pub skipped_rows: Vec<usize>,
}

impl ResolvedTable {
    pub fn rows_total(&self) -> usize {
        self.records.len() + self.skipped_rows.len()
    }
}

/// Resolve columns and build one [`InputRecord`] per usable row.
pub fn resolve_records(table: &Table) -> Result<ResolvedTable> {
    let columns = resolve_columns(&table.headers)?;

    let content_header = columns.content.map(|i| table.headers[i].trim().to_string());
    match &content_header {
        Some(header) if !CONTENT_EXACT.contains(&normalize_header(header).as_str()) => {
            warn!(column = %header, "no abstract column; using fallback content column");
        }
        None => {
            warn!("no abstract-like column found; extracting from titles alone");
        }
        _ => {}
    }

    let mut records = Vec::with_capacity(table.len());
    let mut skipped_rows = Vec::new();

    for (i, row) in table.rows.iter().enumerate() {
        let row_number = i + 1;
        let cell = |index: Option<usize>| index.and_then(|i| row.get(i).cloned().flatten());

        let Some(title) = cell(Some(columns.title)) else {
            warn!(row = row_number, "blank title, skipping row");
            skipped_rows.push(row_number);
            continue;
        };

        records.push(InputRecord {
            row: row_number,
            title,
            abstract_text: cell(columns.content).unwrap_or_default(),
            authors: cell(columns.authors),
            year: cell(columns.year).map(|y| normalize_integer(&y)),
            doi: cell(columns.doi),
            citation_count: cell(columns.citation_count).map(|c| normalize_integer(&c)),
        });
    }

    Ok(ResolvedTable {
        columns,
        content_header,
        records,
        skipped_rows,
    })
}

/// `2021.0` -> `2021`. Anything else is returned unchanged.
pub fn normalize_integer(value: &str) -> String {
    match value.split_once('.') {
        Some((int, frac))
            if !int.is_empty()
                && int.chars().all(|c| c.is_ascii_digit())
                && !frac.is_empty()
                && frac.chars().all(|c| c == '0') =>
        {
            int.to_string()
        }
        _ => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn table(csv: &str) -> Table {
        Table::from_reader(csv.as_bytes()).unwrap()
    }

    #[test]
    fn test_exact_abstract_preferred() {
        let cols = resolve_columns(&["Summary", "Title", "Abstract Note", "ABSTRACT"]).unwrap();
        assert_eq!(cols.title, 1);
        assert_eq!(cols.content, Some(3));
    }

    #[test]
    fn test_abstract_note_when_no_abstract() {
        let cols = resolve_columns(&["title", "Abstract  Note", "notes"]).unwrap();
        assert_eq!(cols.content, Some(1));
    }

    #[test]
    fn test_prefix_fallback_in_table_order() {
        let cols = resolve_columns(&[
            "Title",
            "Notes on method",
            "Reasoning for inclusion",
            "Summary",
        ])
        .unwrap();
        assert_eq!(cols.content, Some(1));
    }

    #[test]
    fn test_no_content_column() {
        let resolved = resolve_records(&table("Title,Year\nA paper,2020\n")).unwrap();
        assert_eq!(resolved.columns.content, None);
        assert_eq!(resolved.records[0].abstract_text, "");
        assert!(!resolved.records[0].has_content());
    }

    #[test]
    fn test_missing_title_is_fatal() {
        let err = resolve_columns(&["Name", "Abstract"]).unwrap_err();
        assert!(matches!(err, PipelineError::MissingTitleColumn { .. }));
        assert!(err.to_string().contains("Name, Abstract"));
    }

    #[test]
    fn test_bom_and_spacing() {
        let cols = resolve_columns(&["\u{feff} Title ", "Citation Count"]).unwrap();
        assert_eq!(cols.title, 0);
        assert_eq!(cols.citation_count, Some(1));
    }

    #[test]
    fn test_resolve_records() {
        let csv = "Title,Authors,Year,DOI,Citation count,Abstract\n\
                   Deep Models,\"Smith, John\",2021.0,10.1/x,12.0,We measured things.\n\
                   ,Nobody,2020,,,\n\
                   Short Row,Doe\n";
        let resolved = resolve_records(&table(csv)).unwrap();

        assert_eq!(resolved.rows_total(), 3);
        assert_eq!(resolved.skipped_rows, vec![2]);
        assert_eq!(resolved.records.len(), 2);

        let first = &resolved.records[0];
        assert_eq!(first.row, 1);
        assert_eq!(first.title, "Deep Models");
        assert_eq!(first.authors.as_deref(), Some("Smith, John"));
        assert_eq!(first.year.as_deref(), Some("2021"));
        assert_eq!(first.citation_count.as_deref(), Some("12"));
        assert_eq!(first.abstract_text, "We measured things.");

        let short = &resolved.records[1];
        assert_eq!(short.row, 3);
        assert_eq!(short.year, None);
        assert_eq!(short.doi_display(), "N/A");
    }

    #[test]
    fn test_load_table_missing_file() {
        let err = load_table("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, PipelineError::TableRead { .. }));
    }

    #[test]
    fn test_load_table_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        std::fs::write(&path, "").unwrap();
        assert!(matches!(
            load_table(&path).unwrap_err(),
            PipelineError::EmptyTable { .. }
        ));
    }

    #[test]
    fn test_normalize_integer() {
        assert_eq!(normalize_integer("2021.0"), "2021");
        assert_eq!(normalize_integer("2021"), "2021");
        assert_eq!(normalize_integer("3.5"), "3.5");
        assert_eq!(normalize_integer("n.d."), "n.d.");
    }

    fn title_variant() -> impl Strategy<Value = String> {
        (prop::collection::vec(any::<bool>(), 5), "[ ]{0,2}", "[ ]{0,2}").prop_map(
            |(upper, lead, trail)| {
                let word: String = "title"
                    .chars()
                    .zip(upper)
                    .map(|(c, up)| if up { c.to_ascii_uppercase() } else { c })
                    .collect();
                format!("{lead}{word}{trail}")
            },
        )
    }

    fn other_header() -> impl Strategy<Value = String> {
        "[a-z]{1,10}( [a-z]{1,6})?".prop_filter("not a title", |h| h != "title")
    }

    proptest! {
        #[test]
        fn prop_title_variant_always_resolves(
            title in title_variant(),
            others in prop::collection::vec(other_header(), 0..6),
            pos in 0usize..6,
        ) {
            let mut headers = others;
            let pos = pos.min(headers.len());
            headers.insert(pos, title);

            let cols = resolve_columns(&headers).unwrap();
            prop_assert_eq!(cols.title, pos);
        }

        #[test]
        fn prop_no_title_always_fails(headers in prop::collection::vec(other_header(), 0..8)) {
            prop_assert!(resolve_columns(&headers).is_err());
        }

        #[test]
        fn prop_first_prefix_match_wins(
            filler in prop::collection::vec("[x-z]{2,6}", 0..4),
            first in 0usize..5,
            second in 0usize..5,
            upper in any::<bool>(),
        ) {
            let mut first_header = format!("{} one", CONTENT_PREFIXES[first]);
            if upper {
                first_header = first_header.to_uppercase();
            }
            let second_header = format!("{} two", CONTENT_PREFIXES[second]);

            let mut headers = vec!["Title".to_string()];
            headers.extend(filler);
            let expected = headers.len();
            headers.push(first_header);
            headers.push(second_header);

            let cols = resolve_columns(&headers).unwrap();
            prop_assert_eq!(cols.content, Some(expected));
        }
    }
}
