//! Evidence items and the per-paper set that owns them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::record::PaperMetadata;

/// Marker substituted for any what/how/who the model left out or left blank.
/// Matches the wording the extraction prompt asks the model to use.
pub const NOT_SPECIFIED: &str = "Not specified in abstract";

/// One empirical finding with its methodological breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceItem {
    /// The evidence statement itself
    pub statement: String,

    /// What was measured or collected
    pub what: String,

    /// How it was measured or analyzed
    pub how: String,

    /// Who or what population/dataset
    pub who: String,
}

impl EvidenceItem {
    /// Build an item, substituting [`NOT_SPECIFIED`] for blank parts.
    pub fn new(
        statement: impl Into<String>,
        what: impl Into<String>,
        how: impl Into<String>,
        who: impl Into<String>,
    ) -> Self {
        Self {
            statement: or_placeholder(statement.into()),
            what: or_placeholder(what.into()),
            how: or_placeholder(how.into()),
            who: or_placeholder(who.into()),
        }
    }
}

fn or_placeholder(value: String) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        NOT_SPECIFIED.to_string()
    } else {
        trimmed.to_string()
    }
}

/// 1-based ordinal of an evidence item within its paper, rendered `evd-001`.
///
/// Unique only inside one paper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EvidenceId(u32);

impl EvidenceId {
    pub const PREFIX: &'static str = "evd-";

    /// Create an id from a 1-based ordinal. Zero is not a valid ordinal.
    pub fn new(ordinal: u32) -> Option<Self> {
        (ordinal > 0).then_some(Self(ordinal))
    }

    /// Id for the item at 0-based position `index`.
    pub fn from_index(index: usize) -> Self {
        Self(index as u32 + 1)
    }

    pub fn ordinal(self) -> u32 {
        self.0
    }
}

impl fmt::Display for EvidenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:03}", Self::PREFIX, self.0)
    }
}

impl FromStr for EvidenceId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .trim()
            .strip_prefix(Self::PREFIX)
            .ok_or_else(|| format!("evidence id must start with '{}': {s}", Self::PREFIX))?;
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(format!("evidence id must end in digits: {s}"));
        }
        let ordinal: u32 = digits.parse().map_err(|e| format!("{s}: {e}"))?;
        Self::new(ordinal).ok_or_else(|| format!("evidence ordinals start at 1: {s}"))
    }
}

/// All evidence extracted from one paper.
///
/// Only created for rows that yielded at least one item; immutable after
/// creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperEvidenceSet {
    /// Display identifier and note file stem (e.g. `@smithDeepModels2021`)
    pub citekey: String,

    pub metadata: PaperMetadata,

    items: Vec<EvidenceItem>,
}

impl PaperEvidenceSet {
    /// Returns `None` when `items` is empty.
    pub fn new(
        citekey: impl Into<String>,
        metadata: PaperMetadata,
        items: Vec<EvidenceItem>,
    ) -> Option<Self> {
        if items.is_empty() {
            return None;
        }
        Some(Self {
            citekey: citekey.into(),
            metadata,
            items,
        })
    }

    pub fn items(&self) -> &[EvidenceItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items paired with their ordinal ids, in order.
    pub fn evidence(&self) -> impl Iterator<Item = (EvidenceId, &EvidenceItem)> {
        self.items
            .iter()
            .enumerate()
            .map(|(i, item)| (EvidenceId::from_index(i), item))
    }

    /// Look up an item by id.
    pub fn get(&self, id: EvidenceId) -> Option<&EvidenceItem> {
        self.items.get(id.ordinal() as usize - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> PaperMetadata {
        PaperMetadata {
            title: "T".into(),
            authors: None,
            year: None,
            doi: None,
            citation_count: None,
        }
    }

    #[test]
    fn test_evidence_id_format() {
        assert_eq!(EvidenceId::from_index(0).to_string(), "evd-001");
        assert_eq!(EvidenceId::from_index(41).to_string(), "evd-042");
        assert_eq!(EvidenceId::new(1234).unwrap().to_string(), "evd-1234");
        assert!(EvidenceId::new(0).is_none());
    }

    #[test]
    fn test_evidence_id_parse() {
        assert_eq!("evd-007".parse::<EvidenceId>().unwrap().ordinal(), 7);
        assert!("evd-".parse::<EvidenceId>().is_err());
        assert!("evd-000".parse::<EvidenceId>().is_err());
        assert!("evidence-001".parse::<EvidenceId>().is_err());
        assert!("evd-01a".parse::<EvidenceId>().is_err());
    }

    #[test]
    fn test_blank_fields_get_placeholder() {
        let item = EvidenceItem::new("  Accuracy improved ", "", "   ", "students");
        assert_eq!(item.statement, "Accuracy improved");
        assert_eq!(item.what, NOT_SPECIFIED);
        assert_eq!(item.how, NOT_SPECIFIED);
        assert_eq!(item.who, "students");
    }

    #[test]
    fn test_empty_set_not_created() {
        assert!(PaperEvidenceSet::new("@x", meta(), vec![]).is_none());
    }

    #[test]
    fn test_set_lookup_by_id() {
        let set = PaperEvidenceSet::new(
            "@x",
            meta(),
            vec![
                EvidenceItem::new("a", "w", "h", "p"),
                EvidenceItem::new("b", "w", "h", "p"),
            ],
        )
        .unwrap();

        let id = "evd-002".parse().unwrap();
        assert_eq!(set.get(id).unwrap().statement, "b");
        assert!(set.get(EvidenceId::new(3).unwrap()).is_none());

        let ids: Vec<String> = set.evidence().map(|(id, _)| id.to_string()).collect();
        assert_eq!(ids, vec!["evd-001", "evd-002"]);
    }
}
