//! Knowledge statements: one origin → via → destination connection

use super::entity::{AnatomicalEntity, BaseEntity};
use super::types::{deserialize_ids, StatementId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Statements keyed by id, in payload order
pub type StatementMap = IndexMap<StatementId, KnowledgeStatement>;

/// Segment type of a via
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ViaType {
    #[serde(rename = "AXON")]
    Axon,
    #[serde(rename = "DENDRITE")]
    Dendrite,
    #[default]
    #[serde(other, rename = "UNKNOWN")]
    Unknown,
}

impl ViaType {
    pub fn label(&self) -> &'static str {
        match self {
            ViaType::Axon => "Axon",
            ViaType::Dendrite => "Dendrite",
            ViaType::Unknown => "Not specified",
        }
    }
}

impl fmt::Display for ViaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Terminal type of a destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DestinationType {
    #[serde(rename = "AXON-T")]
    AxonTerminal,
    #[serde(rename = "AFFERENT-T")]
    AfferentTerminal,
    #[default]
    #[serde(other, rename = "UNKNOWN")]
    Unknown,
}

impl DestinationType {
    pub fn label(&self) -> &'static str {
        match self {
            DestinationType::AxonTerminal => "Axon terminal",
            DestinationType::AfferentTerminal => "Afferent terminal",
            DestinationType::Unknown => "Not specified",
        }
    }
}

impl fmt::Display for DestinationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViaSegment {
    /// 0-based position along the path
    #[serde(default)]
    pub order: usize,
    #[serde(rename = "type", default)]
    pub kind: ViaType,
    #[serde(default)]
    pub anatomical_entities: Vec<AnatomicalEntity>,
    #[serde(default)]
    pub from_entities: Vec<AnatomicalEntity>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestinationSegment {
    #[serde(rename = "type", default)]
    pub kind: DestinationType,
    #[serde(default)]
    pub anatomical_entities: Vec<AnatomicalEntity>,
    #[serde(default)]
    pub from_entities: Vec<AnatomicalEntity>,
}

/// Statement continuing a path from one of its origins
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardConnection {
    pub id: StatementId,
    #[serde(default, deserialize_with = "deserialize_ids")]
    pub origin_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeStatement {
    pub id: StatementId,
    /// Empty when the statement has no phenotype
    pub phenotype: String,
    pub apinatomy: String,
    pub species: Vec<BaseEntity>,
    pub origins: Vec<AnatomicalEntity>,
    pub vias: Vec<ViaSegment>,
    pub destinations: Vec<DestinationSegment>,
    pub forward_connections: Vec<ForwardConnection>,
    pub provenances: Vec<String>,
    pub knowledge_statement: String,
    pub statement_preview: String,
    pub journey: Vec<String>,
    pub laterality: String,
    pub projection: String,
    pub circuit_type: String,
    pub sex: Option<BaseEntity>,
}

impl KnowledgeStatement {
    pub fn new(id: impl Into<StatementId>) -> Self {
        KnowledgeStatement {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_phenotype(mut self, phenotype: impl Into<String>) -> Self {
        self.phenotype = phenotype.into();
        self
    }

    /// Phenotype bucket this statement falls into
    pub fn phenotype_or<'a>(&'a self, other_label: &'a str) -> &'a str {
        if self.phenotype.is_empty() {
            other_label
        } else {
            &self.phenotype
        }
    }

    pub fn via_entities(&self) -> impl Iterator<Item = &AnatomicalEntity> {
        self.vias.iter().flat_map(|via| via.anatomical_entities.iter())
    }

    pub fn destination_entities(&self) -> impl Iterator<Item = &AnatomicalEntity> {
        self.destinations
            .iter()
            .flat_map(|dest| dest.anatomical_entities.iter())
    }
}
