//! Flat hierarchy input rows

use serde::{Deserialize, Serialize};

/// One ancestor level of a record; either half may be missing
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Level {
    pub id: Option<String>,
    pub name: Option<String>,
}

impl Level {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Level {
            id: Some(id.into()),
            name: Some(name.into()),
        }
    }
}

/// A decoded binding row: ancestor chain, leaf, statement and organs
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HierarchyRecord {
    /// Level 1 first
    pub levels: Vec<Level>,
    pub leaf_id: Option<String>,
    pub leaf_name: Option<String>,
    pub statement_id: Option<String>,
    pub target_organ_id: Option<String>,
    pub target_organ_name: Option<String>,
    pub end_organ_id: Option<String>,
    pub end_organ_name: Option<String>,
    pub target_system_id: Option<String>,
    pub target_system_name: Option<String>,
}

impl HierarchyRecord {
    /// Level-1 name, empty when absent
    pub fn level1_name(&self) -> &str {
        self.levels
            .first()
            .and_then(|level| level.name.as_deref())
            .unwrap_or("")
    }

    pub fn with_level(mut self, id: &str, name: &str) -> Self {
        self.levels.push(Level::new(id, name));
        self
    }

    pub fn with_leaf(mut self, id: &str, name: &str) -> Self {
        self.leaf_id = Some(id.to_string());
        self.leaf_name = Some(name.to_string());
        self
    }

    pub fn with_statement(mut self, id: &str) -> Self {
        self.statement_id = Some(id.to_string());
        self
    }

    pub fn with_target_organ(mut self, id: &str, name: &str) -> Self {
        self.target_organ_id = Some(id.to_string());
        self.target_organ_name = Some(name.to_string());
        self
    }

    pub fn with_end_organ(mut self, id: &str, name: &str) -> Self {
        self.end_organ_id = Some(id.to_string());
        self.end_organ_name = Some(name.to_string());
        self
    }

    pub fn with_target_system(mut self, id: &str, name: &str) -> Self {
        self.target_system_id = Some(id.to_string());
        self.target_system_name = Some(name.to_string());
        self
    }
}
