//! Binding-table documents (`{head: {vars}, results: {bindings: [...]}}`)

use super::{decode, PayloadError, PayloadResult};
use crate::hierarchy::{ChildOrderMap, EndOrganOrderMap};
use crate::model::{HierarchyRecord, Level};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VariableType {
    Uri,
    Literal,
    TypedLiteral,
    Bnode,
    #[serde(other)]
    Unknown,
}

/// A single bound value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    #[serde(rename = "type")]
    pub kind: VariableType,
    pub value: String,
}

/// One result row: variable name → bound value
pub type Binding = BTreeMap<String, Variable>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Head {
    #[serde(default)]
    pub vars: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Results {
    pub bindings: Vec<Binding>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BindingTable {
    #[serde(default)]
    pub head: Head,
    pub results: Results,
}

impl BindingTable {
    pub fn len(&self) -> usize {
        self.results.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.bindings.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = &Binding> {
        self.results.bindings.iter()
    }
}

fn shape_error(msg: impl Into<String>) -> PayloadError {
    PayloadError::InvalidShape(msg.into())
}

/// Validate and decode a binding-table document
pub fn parse_bindings(input: &str) -> PayloadResult<BindingTable> {
    let document: Value = serde_json::from_str(input)?;

    let root = document
        .as_object()
        .ok_or_else(|| shape_error("document is not an object"))?;
    let results = root
        .get("results")
        .and_then(Value::as_object)
        .ok_or_else(|| shape_error("missing `results` object"))?;
    let rows = results
        .get("bindings")
        .and_then(Value::as_array)
        .ok_or_else(|| shape_error("missing `results.bindings` array"))?;

    let mut bindings = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let row = row
            .as_object()
            .ok_or_else(|| shape_error(format!("binding {} is not an object", i)))?;
        let mut binding = Binding::new();
        for (name, value) in row {
            let variable = Variable::deserialize(value).map_err(|e| {
                shape_error(format!("binding {} variable `{}`: {}", i, name, e))
            })?;
            binding.insert(name.clone(), variable);
        }
        bindings.push(binding);
    }

    let head = match root.get("head") {
        Some(head) => Head::deserialize(head).map_err(|e| shape_error(format!("head: {}", e)))?,
        None => Head::default(),
    };

    debug!("Decoded binding table with {} rows", bindings.len());
    Ok(BindingTable {
        head,
        results: Results { bindings },
    })
}

fn value_of(binding: &Binding, name: &str) -> Option<String> {
    binding.get(name).map(|v| v.value.clone())
}

/// Map one binding row onto a hierarchy record.
///
/// Levels are read as `A_L1_ID`/`A_L1`, `A_L2_ID`/`A_L2`, ... until a level
/// has neither half.
pub fn record_from_binding(binding: &Binding) -> HierarchyRecord {
    let mut levels = Vec::new();
    for i in 1.. {
        let id = value_of(binding, &format!("A_L{}_ID", i));
        let name = value_of(binding, &format!("A_L{}", i));
        if id.is_none() && name.is_none() {
            break;
        }
        levels.push(Level { id, name });
    }

    HierarchyRecord {
        levels,
        leaf_id: value_of(binding, "A_ID"),
        leaf_name: value_of(binding, "A"),
        statement_id: value_of(binding, "Neuron_ID"),
        target_organ_id: value_of(binding, "Target_Organ_IRI"),
        target_organ_name: value_of(binding, "Target_Organ"),
        end_organ_id: value_of(binding, "B_ID"),
        end_organ_name: value_of(binding, "B"),
        target_system_id: value_of(binding, "Target_System_IRI"),
        target_system_name: value_of(binding, "Target_System"),
    }
}

/// Decode the hierarchy payload into flat records
pub fn parse_hierarchy_records(input: &str) -> PayloadResult<Vec<HierarchyRecord>> {
    let table = parse_bindings(input)?;
    let records: Vec<HierarchyRecord> = table.rows().map(record_from_binding).collect();
    info!("Decoded {} hierarchy records", records.len());
    Ok(records)
}

/// `{nodeBaseId: [childBaseId, ...]}`
pub fn parse_child_order(input: &str) -> PayloadResult<ChildOrderMap> {
    decode(input, "child order map")
}

/// `{targetSystemId: [organId, ...]}`, keeping the document's key order
pub fn parse_end_organ_order(input: &str) -> PayloadResult<EndOrganOrderMap> {
    decode(input, "end organ order map")
}

/// Major nerve ids from `results.bindings[].Nerve_IRI.value`
pub fn parse_major_nerves(input: &str) -> PayloadResult<BTreeSet<String>> {
    let table = parse_bindings(input)?;
    let nerves: BTreeSet<String> = table
        .rows()
        .filter_map(|row| value_of(row, "Nerve_IRI"))
        .collect();
    info!("Decoded {} major nerves", nerves.len());
    Ok(nerves)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HIERARCHY: &str = r#"{
        "head": {"vars": ["A_L1_ID", "A_L1", "A_ID", "A", "Neuron_ID"]},
        "results": {"bindings": [
            {
                "A_L1_ID": {"type": "uri", "value": "http://x/brain"},
                "A_L1": {"type": "literal", "value": "brain"},
                "A_L2_ID": {"type": "uri", "value": "http://x/medulla"},
                "A_ID": {"type": "uri", "value": "http://x/nts"},
                "A": {"type": "literal", "value": "nucleus of solitary tract"},
                "Neuron_ID": {"type": "uri", "value": "ks1"},
                "Target_Organ_IRI": {"type": "uri", "value": "http://x/heart"},
                "Target_Organ": {"type": "literal", "value": "heart"},
                "B_ID": {"type": "uri", "value": "http://x/atrium"},
                "B": {"type": "literal", "value": "atrium"}
            },
            {
                "A_ID": {"type": "uri", "value": "http://x/dangling"}
            }
        ]}
    }"#;

    #[test]
    fn test_records_from_bindings() {
        let records = parse_hierarchy_records(HIERARCHY).unwrap();
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.levels.len(), 2);
        assert_eq!(first.levels[1].id.as_deref(), Some("http://x/medulla"));
        assert_eq!(first.levels[1].name, None);
        assert_eq!(first.level1_name(), "brain");
        assert_eq!(first.statement_id.as_deref(), Some("ks1"));
        assert_eq!(first.end_organ_name.as_deref(), Some("atrium"));
        assert_eq!(first.target_system_id, None);

        assert!(records[1].levels.is_empty());
        assert_eq!(records[1].leaf_name, None);
    }

    #[test]
    fn test_shape_validation() {
        for input in [
            "[]",
            r#"{"head": {}}"#,
            r#"{"results": {"bindings": {}}}"#,
            r#"{"results": {"bindings": [1]}}"#,
            r#"{"results": {"bindings": [{"A": "plain string"}]}}"#,
        ] {
            let err = parse_bindings(input).unwrap_err();
            assert!(matches!(err, PayloadError::InvalidShape(_)), "{}", input);
        }
        assert!(matches!(parse_bindings("{").unwrap_err(), PayloadError::Json(_)));
    }

    #[test]
    fn test_unknown_variable_type() {
        let table = parse_bindings(
            r#"{"results": {"bindings": [{"x": {"type": "triple", "value": "v"}}]}}"#,
        )
        .unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.results.bindings[0]["x"].kind, VariableType::Unknown);
    }

    #[test]
    fn test_order_maps() {
        let order = parse_child_order(r#"{"brain": ["b", "a"]}"#).unwrap();
        assert_eq!(order["brain"], vec!["b", "a"]);

        let organs = parse_end_organ_order(r#"{"z": ["o1"], "a": ["o2", "o3"]}"#).unwrap();
        let keys: Vec<&str> = organs.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["z", "a"]);
    }

    #[test]
    fn test_major_nerves() {
        let nerves = parse_major_nerves(
            r#"{"results": {"bindings": [
                {"Nerve_IRI": {"type": "uri", "value": "n2"}},
                {"Nerve_IRI": {"type": "uri", "value": "n1"}},
                {"Other": {"type": "uri", "value": "n3"}}
            ]}}"#,
        )
        .unwrap();
        assert_eq!(nerves.into_iter().collect::<Vec<_>>(), vec!["n1", "n2"]);
    }
}
