//! Engine configuration
//!
//! Root definitions, sentinels, the path delimiter and the diagram layout
//! constants. `AtlasConfig::default()` reproduces the built-in dataset
//! conventions; a YAML or JSON document may override any field.

use crate::model::{NodeId, DEFAULT_PATH_DELIMITER};
use neuroatlas_diagram::LayoutConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

pub const CNS_ROOT_ID: &str = "http://purl.obolibrary.org/obo/UBERON_0001017";
pub const PNS_ROOT_ID: &str = "http://purl.obolibrary.org/obo/UBERON_0000010";
pub const OTHERS_ROOT_ID: &str = "Others_Y_Axis_ID";
pub const OTHER_ORGAN_ID: &str = "OTHER_X";
pub const OTHER_ORGAN_LABEL: &str = "Other";
pub const OTHER_PHENOTYPE_LABEL: &str = "other";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Predicate over a record's level-1 name deciding root membership
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "match", content = "names", rename_all = "snake_case")]
pub enum RootMembership {
    /// Level-1 name is one of the listed names
    NameIn(Vec<String>),
    /// Level-1 name is present and none of the listed names
    NameNotIn(Vec<String>),
    /// Level-1 name is absent (the catch-all root)
    Missing,
}

impl RootMembership {
    pub fn matches(&self, level1_name: &str) -> bool {
        match self {
            RootMembership::NameIn(names) => names.iter().any(|n| n == level1_name),
            RootMembership::NameNotIn(names) => {
                !level1_name.is_empty() && !names.iter().any(|n| n == level1_name)
            }
            RootMembership::Missing => level1_name.is_empty(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootDefinition {
    pub id: String,
    pub name: String,
    pub membership: RootMembership,
}

impl RootDefinition {
    pub fn new(id: impl Into<String>, name: impl Into<String>, membership: RootMembership) -> Self {
        RootDefinition {
            id: id.into(),
            name: name.into(),
            membership,
        }
    }

    pub fn node_id(&self) -> NodeId {
        NodeId::new(self.id.clone())
    }

    pub fn is_catch_all(&self) -> bool {
        self.membership == RootMembership::Missing
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtlasConfig {
    /// Separator between path segments of synthetic node ids
    pub path_delimiter: String,
    /// Top-level categories, evaluated in order
    pub roots: Vec<RootDefinition>,
    pub other_organ_id: String,
    pub other_organ_label: String,
    /// Bucket for statements without a phenotype
    pub other_phenotype_label: String,
    pub layout: LayoutConfig,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            path_delimiter: DEFAULT_PATH_DELIMITER.to_string(),
            roots: vec![
                RootDefinition::new(
                    CNS_ROOT_ID,
                    "Central nervous system",
                    RootMembership::NameIn(vec!["brain".to_string(), "spinal cord".to_string()]),
                ),
                RootDefinition::new(
                    PNS_ROOT_ID,
                    "Peripheral nervous system",
                    RootMembership::NameNotIn(vec!["brain".to_string()]),
                ),
                RootDefinition::new(OTHERS_ROOT_ID, "Others", RootMembership::Missing),
            ],
            other_organ_id: OTHER_ORGAN_ID.to_string(),
            other_organ_label: OTHER_ORGAN_LABEL.to_string(),
            other_phenotype_label: OTHER_PHENOTYPE_LABEL.to_string(),
            layout: LayoutConfig::default(),
        }
    }
}

impl AtlasConfig {
    pub fn from_yaml_str(s: &str) -> ConfigResult<Self> {
        let config: AtlasConfig = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(s: &str) -> ConfigResult<Self> {
        let config: AtlasConfig = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file; `.json` files are read as JSON, anything else as YAML
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_yaml_str(&content),
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.path_delimiter.is_empty() {
            return Err(ConfigError::Invalid("path_delimiter must not be empty".to_string()));
        }
        if self.roots.is_empty() {
            return Err(ConfigError::Invalid("at least one root is required".to_string()));
        }
        let catch_all = self.roots.iter().filter(|r| r.is_catch_all()).count();
        if catch_all != 1 {
            return Err(ConfigError::Invalid(format!(
                "exactly one catch-all root is required, found {}",
                catch_all
            )));
        }
        for (i, root) in self.roots.iter().enumerate() {
            if self.roots[..i].iter().any(|r| r.id == root.id) {
                return Err(ConfigError::Invalid(format!("duplicate root id {}", root.id)));
            }
        }
        Ok(())
    }

    pub fn catch_all_root(&self) -> Option<&RootDefinition> {
        self.roots.iter().find(|r| r.is_catch_all())
    }

    /// First root whose predicate accepts `level1_name`, else the catch-all
    pub fn root_for(&self, level1_name: &str) -> Option<&RootDefinition> {
        self.roots
            .iter()
            .find(|r| r.membership.matches(level1_name))
            .or_else(|| self.catch_all_root())
    }

    pub fn root_ids(&self) -> Vec<NodeId> {
        self.roots.iter().map(|r| r.node_id()).collect()
    }
}
