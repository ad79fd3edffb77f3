//! One resolved row of the source table.

use serde::{Deserialize, Serialize};

/// Placeholder rendered for a missing author list, year or title.
pub const UNKNOWN: &str = "Unknown";

/// Placeholder rendered for a missing DOI or citation count.
pub const NOT_AVAILABLE: &str = "N/A";

/// A bibliography row after column resolution.
///
/// Only `title` is guaranteed. `abstract_text` is always present but may be
/// empty when the table had no usable content column, in which case
/// extraction runs on the title alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputRecord {
    /// 1-based data row number in the source table (header excluded)
    pub row: usize,

    pub title: String,

    /// Content column (abstract or its fallback)
    #[serde(rename = "abstract")]
    pub abstract_text: String,

    pub authors: Option<String>,

    pub year: Option<String>,

    pub doi: Option<String>,

    pub citation_count: Option<String>,
}

impl InputRecord {
    /// Create a record with just a title.
    pub fn new(row: usize, title: impl Into<String>) -> Self {
        Self {
            row,
            title: title.into(),
            abstract_text: String::new(),
            authors: None,
            year: None,
            doi: None,
            citation_count: None,
        }
    }

    pub fn with_abstract(mut self, text: impl Into<String>) -> Self {
        self.abstract_text = text.into();
        self
    }

    pub fn with_authors(mut self, authors: impl Into<String>) -> Self {
        self.authors = Some(authors.into());
        self
    }

    pub fn with_year(mut self, year: impl Into<String>) -> Self {
        self.year = Some(year.into());
        self
    }

    pub fn with_doi(mut self, doi: impl Into<String>) -> Self {
        self.doi = Some(doi.into());
        self
    }

    /// Whether the content column had anything in it for this row.
    pub fn has_content(&self) -> bool {
        !self.abstract_text.trim().is_empty()
    }

    pub fn authors_display(&self) -> &str {
        self.authors.as_deref().unwrap_or(UNKNOWN)
    }

    pub fn year_display(&self) -> &str {
        self.year.as_deref().unwrap_or(UNKNOWN)
    }

    pub fn doi_display(&self) -> &str {
        self.doi.as_deref().unwrap_or(NOT_AVAILABLE)
    }

    pub fn citation_count_display(&self) -> &str {
        self.citation_count.as_deref().unwrap_or(NOT_AVAILABLE)
    }
}

/// Bibliographic metadata carried alongside a paper's evidence for
/// rendering. Denormalized copy of the fields of [`InputRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperMetadata {
    pub title: String,
    pub authors: Option<String>,
    pub year: Option<String>,
    pub doi: Option<String>,
    pub citation_count: Option<String>,
}

impl From<&InputRecord> for PaperMetadata {
    fn from(record: &InputRecord) -> Self {
        Self {
            title: record.title.clone(),
            authors: record.authors.clone(),
            year: record.year.clone(),
            doi: record.doi.clone(),
            citation_count: record.citation_count.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_defaults() {
        let record = InputRecord::new(1, "A title");
        assert_eq!(record.authors_display(), "Unknown");
        assert_eq!(record.year_display(), "Unknown");
        assert_eq!(record.doi_display(), "N/A");
        assert_eq!(record.citation_count_display(), "N/A");
        assert!(!record.has_content());
    }

    #[test]
    fn test_metadata_copies_fields() {
        let record = InputRecord::new(3, "Title")
            .with_authors("Smith, J.")
            .with_year("2021")
            .with_doi("10.1/x");
        let meta = PaperMetadata::from(&record);
        assert_eq!(meta.title, "Title");
        assert_eq!(meta.authors.as_deref(), Some("Smith, J."));
        assert_eq!(meta.year.as_deref(), Some("2021"));
        assert_eq!(meta.doi.as_deref(), Some("10.1/x"));
        assert!(meta.citation_count.is_none());
    }
}
