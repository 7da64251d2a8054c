//! Core identifier types

use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Default separator between path segments of a hierarchy node id
pub const DEFAULT_PATH_DELIMITER: &str = "#";

/// Knowledge statement identifier (the statement's reference URI)
pub type StatementId = String;

/// Organ or sub-organ identifier (an ontology IRI or a sentinel)
pub type OrganId = String;

/// Identifier of a node in the anatomical hierarchy.
///
/// Roots carry their configured id; every other node carries the path of
/// ancestor ids joined by the delimiter, so the same anatomical entity under
/// two different ancestors yields two distinct ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        NodeId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Id of a child reached by appending `segment` to this path
    pub fn child(&self, segment: &str, delimiter: &str) -> NodeId {
        NodeId(format!("{}{}{}", self.0, delimiter, segment))
    }

    /// Last path segment, i.e. the raw entity id
    pub fn base_id(&self, delimiter: &str) -> &str {
        base_id(&self.0, delimiter)
    }
}

/// Last segment of a delimited path
pub fn base_id<'a>(path: &'a str, delimiter: &str) -> &'a str {
    if delimiter.is_empty() {
        return path;
    }
    path.rsplit(delimiter).next().unwrap_or(path)
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        NodeId(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        NodeId(s)
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Integer(i64),
}

/// Accept entity ids written either as strings or as integers
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Integer(n) => n.to_string(),
    })
}

/// Sequence variant of [`deserialize_id`]
pub(crate) fn deserialize_ids<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Vec<RawId> = Vec::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|id| match id {
            RawId::Text(s) => s,
            RawId::Integer(n) => n.to_string(),
        })
        .collect())
}
