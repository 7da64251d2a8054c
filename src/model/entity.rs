//! Named anatomical entities

use super::types::deserialize_id;
use serde::{Deserialize, Serialize};

/// Minimal id + display name pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BaseEntity {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
}

impl BaseEntity {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        BaseEntity {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Anatomical entity referenced by a knowledge statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnatomicalEntity {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub synonyms: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ontology_uri: Option<String>,
}

impl AnatomicalEntity {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        AnatomicalEntity {
            id: id.into(),
            name: name.into(),
            synonyms: String::new(),
            ontology_uri: None,
        }
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.ontology_uri = Some(uri.into());
        self
    }

    pub fn as_base(&self) -> BaseEntity {
        BaseEntity::new(self.id.clone(), self.name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_id_accepted() {
        let entity: AnatomicalEntity =
            serde_json::from_str(r#"{"id": 42, "name": "vagus nerve"}"#).unwrap();
        assert_eq!(entity.id, "42");
        assert_eq!(entity.synonyms, "");
        assert!(entity.ontology_uri.is_none());
    }
}
