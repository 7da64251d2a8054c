//! Hierarchy nodes and organs

use super::entity::BaseEntity;
use super::types::{NodeId, OrganId, StatementId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Organs a statement was recorded under for one leaf
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConnectionDetail {
    pub target_organs: BTreeSet<OrganId>,
    pub end_organs: BTreeSet<OrganId>,
}

/// A region in the anatomical classification tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchicalNode {
    pub id: NodeId,
    pub name: String,
    /// Membership only; display order is derived separately
    #[serde(default)]
    pub children: BTreeSet<NodeId>,
    /// statement id → organs, present on leaves only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_details: Option<BTreeMap<StatementId, ConnectionDetail>>,
    /// end organ id → statement ids, present on leaves only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_details: Option<BTreeMap<OrganId, BTreeSet<StatementId>>>,
}

impl HierarchicalNode {
    pub fn new(id: NodeId, name: impl Into<String>) -> Self {
        HierarchicalNode {
            id,
            name: name.into(),
            children: BTreeSet::new(),
            connection_details: None,
            destination_details: None,
        }
    }

    /// A node with empty detail maps, ready to receive statements
    pub fn leaf(id: NodeId, name: impl Into<String>) -> Self {
        let mut node = HierarchicalNode::new(id, name);
        node.connection_details = Some(BTreeMap::new());
        node.destination_details = Some(BTreeMap::new());
        node
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Record that `statement` reaches `end_organ` within `target_organ`
    pub fn record_statement(
        &mut self,
        statement: &str,
        target_organ: &str,
        end_organ: &str,
    ) {
        let detail = self
            .connection_details
            .get_or_insert_with(BTreeMap::new)
            .entry(statement.to_string())
            .or_default();
        detail.target_organs.insert(target_organ.to_string());
        detail.end_organs.insert(end_organ.to_string());

        self.destination_details
            .get_or_insert_with(BTreeMap::new)
            .entry(end_organ.to_string())
            .or_default()
            .insert(statement.to_string());
    }

    /// Whether any recorded statement lists `organ` as its target organ
    pub fn knows_target_organ(&self, organ: &str) -> bool {
        self.connection_details
            .as_ref()
            .map(|details| details.values().any(|d| d.target_organs.contains(organ)))
            .unwrap_or(false)
    }

    /// Number of distinct statements recorded on this node
    pub fn statement_count(&self) -> usize {
        self.connection_details
            .as_ref()
            .map(|d| d.len())
            .unwrap_or(0)
    }
}

/// An end organ used as a heatmap column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organ {
    pub id: OrganId,
    pub name: String,
    /// Sub-regions in discovery order; always contains the organ itself
    #[serde(default)]
    pub children: IndexMap<String, BaseEntity>,
    /// Column rank, 1-based
    #[serde(default)]
    pub order: usize,
}

impl Organ {
    pub fn new(id: impl Into<OrganId>, name: impl Into<String>) -> Self {
        Organ {
            id: id.into(),
            name: name.into(),
            children: IndexMap::new(),
            order: 0,
        }
    }

    pub fn add_child(&mut self, id: &str, name: &str) {
        if !self.children.contains_key(id) {
            self.children
                .insert(id.to_string(), BaseEntity::new(id, name));
        }
    }
}
