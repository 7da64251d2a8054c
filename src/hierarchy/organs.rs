//! Organ catalog: heatmap columns and target-system groupings

use crate::config::AtlasConfig;
use crate::model::{HierarchyRecord, Organ, OrganId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Preferred organ order per target system: system id → organ ids
pub type EndOrganOrderMap = IndexMap<String, Vec<String>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetSystem {
    pub id: String,
    pub name: String,
    /// Ranked 1..n
    pub organs: Vec<Organ>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OrganCatalog {
    /// Keyed by organ id, in discovery order (sentinel organ first)
    pub organs: IndexMap<OrganId, Organ>,
    /// Keyed by target system id, in discovery order
    pub target_systems: IndexMap<String, TargetSystem>,
}

impl OrganCatalog {
    pub fn get(&self, id: &str) -> Option<&Organ> {
        self.organs.get(id)
    }

    pub fn len(&self) -> usize {
        self.organs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.organs.is_empty()
    }

    /// Organs sorted by rank
    pub fn ordered(&self) -> Vec<&Organ> {
        let mut organs: Vec<&Organ> = self.organs.values().collect();
        organs.sort_by_key(|o| o.order);
        organs
    }
}

/// Derive organs and target systems from the binding records.
///
/// Every organ's children contain the organ itself plus the end organs
/// recorded under it; end organs of records without a target organ go under
/// the sentinel organ. Ranks follow the flattened `order` map first, then
/// discovery order, with the sentinel organ last.
pub fn build_organ_catalog(
    records: &[HierarchyRecord],
    order: &EndOrganOrderMap,
    config: &AtlasConfig,
) -> OrganCatalog {
    let other_id = config.other_organ_id.as_str();
    let mut organs: IndexMap<OrganId, Organ> = IndexMap::new();
    organs.insert(
        other_id.to_string(),
        Organ::new(other_id, config.other_organ_label.as_str()),
    );

    let mut systems: IndexMap<String, (String, IndexMap<OrganId, Organ>)> = IndexMap::new();

    for record in records {
        let end = record
            .end_organ_id
            .as_deref()
            .zip(record.end_organ_name.as_deref());

        match (record.target_organ_id.as_deref(), record.target_organ_name.as_deref()) {
            (Some(organ_id), Some(organ_name)) => {
                let organ = organs
                    .entry(organ_id.to_string())
                    .or_insert_with(|| Organ::new(organ_id, organ_name));
                organ.add_child(organ_id, organ_name);
                if let Some((child_id, child_name)) = end {
                    organ.add_child(child_id, child_name);
                }

                if let (Some(system_id), Some(system_name)) = (
                    record.target_system_id.as_deref(),
                    record.target_system_name.as_deref(),
                ) {
                    let (_, members) = systems
                        .entry(system_id.to_string())
                        .or_insert_with(|| (system_name.to_string(), IndexMap::new()));
                    members
                        .entry(organ_id.to_string())
                        .or_insert_with(|| Organ::new(organ_id, organ_name));
                }
            }
            _ => {
                if let Some((child_id, child_name)) = end {
                    if let Some(other) = organs.get_mut(other_id) {
                        other.add_child(child_id, child_name);
                    }
                }
            }
        }
    }

    let mut rank = 1;
    for organ_id in order.values().flatten() {
        if organ_id == other_id {
            continue;
        }
        if let Some(organ) = organs.get_mut(organ_id.as_str()) {
            if organ.order == 0 {
                organ.order = rank;
                rank += 1;
            }
        }
    }
    for (id, organ) in organs.iter_mut() {
        if id != other_id && organ.order == 0 {
            organ.order = rank;
            rank += 1;
        }
    }
    if let Some(other) = organs.get_mut(other_id) {
        other.order = rank;
    }

    let target_systems = systems
        .into_iter()
        .map(|(id, (name, members))| {
            let preferred = order.get(&id);
            let position = |organ: &Organ| {
                preferred
                    .and_then(|list| list.iter().position(|o| *o == organ.id))
                    .unwrap_or(usize::MAX)
            };
            let mut list: Vec<Organ> = members.into_values().collect();
            list.sort_by(|a, b| {
                position(a)
                    .cmp(&position(b))
                    .then_with(|| a.name.cmp(&b.name))
            });
            for (i, organ) in list.iter_mut().enumerate() {
                organ.order = i + 1;
            }
            (
                id.clone(),
                TargetSystem {
                    id,
                    name,
                    organs: list,
                },
            )
        })
        .collect();

    info!("Built organ catalog: {} organs", organs.len());
    OrganCatalog {
        organs,
        target_systems,
    }
}
