//! Which node and relation categories a run is scoped to.
//!
//! The host application keeps a discourse-graph schema listing node types
//! (Evidence, Claim, Question, ...) and the relations allowed between them.
//! A run selects a subset by name; the result is an immutable
//! [`ExtractionScope`] passed explicitly to extraction, synthesis and
//! rendering.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

pub const EVIDENCE_TYPE: &str = "Evidence";
pub const CLAIM_TYPE: &str = "Claim";

const DEFAULT_EVIDENCE_TAG: &str = "evd-candidate";
const DEFAULT_CLAIM_TAG: &str = "clm-candidate";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeType {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationType {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub complement: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscourseRelation {
    pub source_id: String,
    pub destination_id: String,
    pub relationship_type_id: String,
}

/// The host application's discourse-graph schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscourseSchema {
    #[serde(default)]
    pub node_types: Vec<NodeType>,
    #[serde(default)]
    pub relation_types: Vec<RelationType>,
    #[serde(default)]
    pub discourse_relations: Vec<DiscourseRelation>,
}

impl DiscourseSchema {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| PipelineError::Scope(format!("invalid schema JSON: {e}")))
    }

    /// The built-in Evidence/Claim schema used when no schema file is given.
    pub fn builtin() -> Self {
        let scope = ExtractionScope::default();
        Self {
            node_types: scope.node_types,
            relation_types: scope.relation_types,
            discourse_relations: scope.discourse_relations,
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::Scope(format!("cannot read schema {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }
}

/// Immutable selection of node/relation categories for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionScope {
    node_types: Vec<NodeType>,
    relation_types: Vec<RelationType>,
    discourse_relations: Vec<DiscourseRelation>,
}

impl Default for ExtractionScope {
    /// Evidence and Claim, with `Evidence supports Claim`.
    fn default() -> Self {
        Self {
            node_types: vec![
                NodeType {
                    id: "evidence".into(),
                    name: EVIDENCE_TYPE.into(),
                    description: Some("A discrete empirical finding".into()),
                    tag: Some(DEFAULT_EVIDENCE_TAG.into()),
                },
                NodeType {
                    id: "claim".into(),
                    name: CLAIM_TYPE.into(),
                    description: Some("A generalizable assertion".into()),
                    tag: Some(DEFAULT_CLAIM_TAG.into()),
                },
            ],
            relation_types: vec![RelationType {
                id: "supports".into(),
                label: "supports".into(),
                complement: Some("is supported by".into()),
            }],
            discourse_relations: vec![DiscourseRelation {
                source_id: "evidence".into(),
                destination_id: "claim".into(),
                relationship_type_id: "supports".into(),
            }],
        }
    }
}

impl ExtractionScope {
    /// Select `requested` node types (by name) from `schema`.
    ///
    /// Relations are kept only when both endpoints are selected. Fails when
    /// none of the requested names exist, or when `Evidence` is not among
    /// the selection (there would be nothing to extract).
    pub fn from_schema<S: AsRef<str>>(schema: &DiscourseSchema, requested: &[S]) -> Result<Self> {
        let wanted: HashSet<&str> = requested.iter().map(|s| s.as_ref()).collect();

        let node_types: Vec<NodeType> = schema
            .node_types
            .iter()
            .filter(|nt| wanted.contains(nt.name.as_str()))
            .cloned()
            .collect();

        if node_types.is_empty() {
            let available: Vec<&str> =
                schema.node_types.iter().map(|nt| nt.name.as_str()).collect();
            let requested: Vec<&str> = requested.iter().map(|s| s.as_ref()).collect();
            return Err(PipelineError::Scope(format!(
                "none of the requested node types found in schema (requested: {}; available: {})",
                requested.join(", "),
                available.join(", ")
            )));
        }

        let selected_ids: HashSet<&str> = node_types.iter().map(|nt| nt.id.as_str()).collect();
        let discourse_relations = schema
            .discourse_relations
            .iter()
            .filter(|dr| {
                selected_ids.contains(dr.source_id.as_str())
                    && selected_ids.contains(dr.destination_id.as_str())
            })
            .cloned()
            .collect();

        let scope = Self {
            node_types,
            relation_types: schema.relation_types.clone(),
            discourse_relations,
        };

        if !scope.extracts_evidence() {
            return Err(PipelineError::Scope(format!(
                "'{EVIDENCE_TYPE}' must be among the selected node types"
            )));
        }

        Ok(scope)
    }

    pub fn node_types(&self) -> &[NodeType] {
        &self.node_types
    }

    pub fn includes(&self, name: &str) -> bool {
        self.node_types.iter().any(|nt| nt.name == name)
    }

    pub fn extracts_evidence(&self) -> bool {
        self.includes(EVIDENCE_TYPE)
    }

    pub fn synthesizes_claims(&self) -> bool {
        self.includes(CLAIM_TYPE)
    }

    /// Tag appended to each evidence bullet, without the leading `#`.
    pub fn evidence_tag(&self) -> Option<&str> {
        self.tag_for(EVIDENCE_TYPE)
    }

    /// Tag appended to each claim bullet, without the leading `#`.
    pub fn claim_tag(&self) -> Option<&str> {
        self.tag_for(CLAIM_TYPE)
    }

    fn tag_for(&self, name: &str) -> Option<&str> {
        self.node_types
            .iter()
            .find(|nt| nt.name == name)
            .and_then(|nt| nt.tag.as_deref())
            .map(|t| t.trim().trim_start_matches('#'))
            .filter(|t| !t.is_empty())
    }

    /// Human-readable `Source relation Target` lines for the prompt.
    pub fn relation_patterns(&self) -> Vec<String> {
        self.discourse_relations
            .iter()
            .map(|dr| {
                let source = self.node_name(&dr.source_id).unwrap_or("Unknown");
                let target = self.node_name(&dr.destination_id).unwrap_or("Unknown");
                let label = self
                    .relation_types
                    .iter()
                    .find(|rt| rt.id == dr.relationship_type_id)
                    .map(|rt| rt.label.as_str())
                    .unwrap_or("Unknown");
                format!("{source} {label} {target}")
            })
            .collect()
    }

    fn node_name(&self, id: &str) -> Option<&str> {
        self.node_types
            .iter()
            .find(|nt| nt.id == id)
            .map(|nt| nt.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = r##"{
        "nodeTypes": [
            {"id": "n1", "name": "Evidence", "description": "Finding", "tag": "#evd-candidate"},
            {"id": "n2", "name": "Claim", "tag": "clm-candidate"},
            {"id": "n3", "name": "Question"},
            {"id": "n4", "name": "Source"}
        ],
        "relationTypes": [
            {"id": "r1", "label": "supports", "complement": "is supported by"},
            {"id": "r2", "label": "informs"}
        ],
        "discourseRelations": [
            {"sourceId": "n1", "destinationId": "n2", "relationshipTypeId": "r1"},
            {"sourceId": "n1", "destinationId": "n3", "relationshipTypeId": "r2"},
            {"sourceId": "n4", "destinationId": "n1", "relationshipTypeId": "r2"}
        ]
    }"##;

    #[test]
    fn test_default_scope() {
        let scope = ExtractionScope::default();
        assert!(scope.extracts_evidence());
        assert!(scope.synthesizes_claims());
        assert_eq!(scope.evidence_tag(), Some("evd-candidate"));
        assert_eq!(scope.claim_tag(), Some("clm-candidate"));
        assert_eq!(scope.relation_patterns(), vec!["Evidence supports Claim"]);
    }

    #[test]
    fn test_from_schema_filters_relations() {
        let schema = DiscourseSchema::from_json(SCHEMA).unwrap();
        let scope = ExtractionScope::from_schema(&schema, &["Evidence", "Claim"]).unwrap();

        assert_eq!(scope.node_types().len(), 2);
        assert_eq!(scope.relation_patterns(), vec!["Evidence supports Claim"]);
        assert_eq!(scope.evidence_tag(), Some("evd-candidate"));
    }

    #[test]
    fn test_from_schema_without_claim() {
        let schema = DiscourseSchema::from_json(SCHEMA).unwrap();
        let scope = ExtractionScope::from_schema(&schema, &["Evidence", "Question"]).unwrap();

        assert!(!scope.synthesizes_claims());
        assert_eq!(scope.claim_tag(), None);
        assert_eq!(scope.relation_patterns(), vec!["Evidence informs Question"]);
    }

    #[test]
    fn test_unknown_types_rejected() {
        let schema = DiscourseSchema::from_json(SCHEMA).unwrap();
        let err = ExtractionScope::from_schema(&schema, &["Pattern"]).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Pattern"));
        assert!(msg.contains("Evidence, Claim, Question, Source"));
    }

    #[test]
    fn test_builtin_schema_matches_default() {
        let scope =
            ExtractionScope::from_schema(&DiscourseSchema::builtin(), &["Evidence", "Claim"]).unwrap();
        assert_eq!(scope, ExtractionScope::default());
    }

    #[test]
    fn test_evidence_required() {
        let schema = DiscourseSchema::from_json(SCHEMA).unwrap();
        assert!(ExtractionScope::from_schema(&schema, &["Claim"]).is_err());
    }
}
