//! Hierarchy construction from flat binding records

use super::Hierarchy;
use crate::config::AtlasConfig;
use crate::model::{HierarchicalNode, HierarchyRecord, NodeId};
use tracing::{error, info, warn};

/// Record whose target or end organ is missing, processed after the
/// complete records of the same dataset
struct DeferredRecord<'a> {
    record: &'a HierarchyRecord,
    parent: NodeId,
    leaf: NodeId,
}

/// Build the region forest from flat records.
///
/// Never fails: records without a leaf contribute only their ancestor chain,
/// records without a statement id contribute an empty leaf.
pub fn build_hierarchy(records: &[HierarchyRecord], config: &AtlasConfig) -> Hierarchy {
    let delimiter = config.path_delimiter.as_str();
    let mut hierarchy = Hierarchy::new(delimiter);
    for root in &config.roots {
        hierarchy.add_root(root.node_id(), &root.name);
    }

    let mut deferred = Vec::new();

    for record in records {
        let Some(root) = config.root_for(record.level1_name()) else {
            continue;
        };
        let mut parent = root.node_id();

        for level in &record.levels {
            let Some(level_id) = level.id.as_deref() else {
                break;
            };
            let Some(level_name) = level.name.as_deref() else {
                continue;
            };
            let path = parent.child(level_id, delimiter);
            hierarchy.insert(HierarchicalNode::new(path.clone(), level_name));
            hierarchy.add_child(&parent, path.clone());
            parent = path;
        }

        let (Some(leaf_id), Some(leaf_name)) = (record.leaf_id.as_deref(), record.leaf_name.as_deref())
        else {
            continue;
        };
        let leaf = parent.child(leaf_id, delimiter);
        hierarchy.insert(HierarchicalNode::leaf(leaf.clone(), leaf_name));

        if record.target_organ_id.is_none() || record.end_organ_id.is_none() {
            deferred.push(DeferredRecord { record, parent, leaf });
            continue;
        }

        match (
            record.statement_id.as_deref(),
            record.target_organ_id.as_deref(),
            record.end_organ_id.as_deref(),
        ) {
            (Some(statement), Some(target), Some(end)) => {
                if let Some(node) = hierarchy.get_mut(leaf.as_str()) {
                    node.record_statement(statement, target, end);
                }
            }
            _ => error!("Statement id missing for leaf {}", leaf),
        }
        hierarchy.add_child(&parent, leaf);
    }

    let deferred_count = deferred.len();
    for DeferredRecord { record, parent, leaf } in deferred {
        match record.statement_id.as_deref() {
            Some(statement) => {
                let (target, end) = resolve_missing_organs(&hierarchy, record, &leaf, config);
                if let Some(node) = hierarchy.get_mut(leaf.as_str()) {
                    node.record_statement(statement, &target, &end);
                }
            }
            None => error!("Statement id missing for leaf {}", leaf),
        }
        hierarchy.add_child(&parent, leaf);
    }

    info!(
        "Built hierarchy: {} nodes from {} records ({} with missing organs)",
        hierarchy.len(),
        records.len(),
        deferred_count
    );
    hierarchy
}

/// Substitute the sentinel organ for a missing target or end organ.
///
/// When only the target is missing and the leaf already knows the end organ
/// as a target organ, that end organ doubles as the target.
fn resolve_missing_organs(
    hierarchy: &Hierarchy,
    record: &HierarchyRecord,
    leaf: &NodeId,
    config: &AtlasConfig,
) -> (String, String) {
    let statement = record.statement_id.as_deref().unwrap_or_default();
    let mut target = match record.target_organ_id.as_deref() {
        Some(target) => target.to_string(),
        None => {
            warn!("Target organ missing for statement {}", statement);
            config.other_organ_id.clone()
        }
    };

    let end = match record.end_organ_id.as_deref() {
        Some(end) => {
            let known = hierarchy
                .get(leaf.as_str())
                .map(|node| node.knows_target_organ(end))
                .unwrap_or(false);
            if known {
                target = end.to_string();
            }
            end.to_string()
        }
        None => {
            warn!("End organ missing for statement {}", statement);
            config.other_organ_id.clone()
        }
    };

    (target, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CNS_ROOT_ID, OTHERS_ROOT_ID, PNS_ROOT_ID};
    use crate::model::Level;

    fn record(l1: &str, leaf: &str, ks: &str) -> HierarchyRecord {
        HierarchyRecord::default()
            .with_level(&format!("{}_id", l1), l1)
            .with_leaf(leaf, &format!("{} name", leaf))
            .with_statement(ks)
            .with_target_organ("heart", "Heart")
            .with_end_organ("atrium", "Atrium")
    }

    #[test]
    fn test_roots_always_present() {
        let h = build_hierarchy(&[], &AtlasConfig::default());
        assert_eq!(h.roots().len(), 3);
        assert!(h.contains(CNS_ROOT_ID));
        assert!(h.contains(PNS_ROOT_ID));
        assert!(h.contains(OTHERS_ROOT_ID));
    }

    #[test]
    fn test_path_ids_and_root_selection() {
        let records = vec![record("brain", "cortex", "ks1"), record("vagus", "ganglion", "ks2")];
        let h = build_hierarchy(&records, &AtlasConfig::default());

        let brain = format!("{}#brain_id", CNS_ROOT_ID);
        let cortex = format!("{}#cortex", brain);
        assert!(h.get(CNS_ROOT_ID).unwrap().children.contains(brain.as_str()));
        assert!(h.get(&brain).unwrap().children.contains(cortex.as_str()));
        assert!(h.get(&cortex).unwrap().is_leaf());

        let vagus = format!("{}#vagus_id", PNS_ROOT_ID);
        assert!(h.contains(&vagus));
    }

    #[test]
    fn test_missing_level1_goes_to_catch_all() {
        let r = HierarchyRecord::default()
            .with_leaf("x", "X")
            .with_statement("ks1")
            .with_target_organ("heart", "Heart")
            .with_end_organ("heart", "Heart");
        let h = build_hierarchy(&[r], &AtlasConfig::default());
        let leaf = format!("{}#x", OTHERS_ROOT_ID);
        assert!(h.get(OTHERS_ROOT_ID).unwrap().children.contains(leaf.as_str()));
    }

    #[test]
    fn test_level_without_name_is_skipped() {
        let mut r = record("brain", "cortex", "ks1");
        r.levels.push(Level {
            id: Some("unnamed".to_string()),
            name: None,
        });
        r.levels.push(Level::new("lobe", "Lobe"));
        let h = build_hierarchy(&[r], &AtlasConfig::default());
        let lobe = format!("{}#brain_id#lobe", CNS_ROOT_ID);
        assert!(h.contains(&lobe));
        assert!(h.contains(&format!("{}#cortex", lobe)));
    }

    #[test]
    fn test_walk_stops_at_missing_level_id() {
        let mut r = record("brain", "cortex", "ks1");
        r.levels.push(Level {
            id: None,
            name: Some("ghost".to_string()),
        });
        r.levels.push(Level::new("lobe", "Lobe"));
        let h = build_hierarchy(&[r], &AtlasConfig::default());
        assert!(h.contains(&format!("{}#brain_id#cortex", CNS_ROOT_ID)));
        assert!(!h.contains(&format!("{}#brain_id#lobe", CNS_ROOT_ID)));
    }

    #[test]
    fn test_details_recorded() {
        let h = build_hierarchy(&[record("brain", "cortex", "ks1")], &AtlasConfig::default());
        let leaf = h.get(&format!("{}#brain_id#cortex", CNS_ROOT_ID)).unwrap();
        let details = leaf.connection_details.as_ref().unwrap();
        assert!(details["ks1"].target_organs.contains("heart"));
        let dest = leaf.destination_details.as_ref().unwrap();
        assert!(dest["atrium"].contains("ks1"));
    }

    #[test]
    fn test_missing_organs_use_sentinel() {
        let mut r = record("brain", "cortex", "ks1");
        r.target_organ_id = None;
        r.end_organ_id = None;
        let h = build_hierarchy(&[r], &AtlasConfig::default());
        let leaf = h.get(&format!("{}#brain_id#cortex", CNS_ROOT_ID)).unwrap();
        let detail = &leaf.connection_details.as_ref().unwrap()["ks1"];
        assert!(detail.target_organs.contains("OTHER_X"));
        assert!(detail.end_organs.contains("OTHER_X"));
    }

    #[test]
    fn test_deferred_end_organ_reused_as_target() {
        let complete = HierarchyRecord::default()
            .with_level("brain_id", "brain")
            .with_leaf("cortex", "Cortex")
            .with_statement("ks1")
            .with_target_organ("heart", "Heart")
            .with_end_organ("heart", "Heart");
        let partial = HierarchyRecord::default()
            .with_level("brain_id", "brain")
            .with_leaf("cortex", "Cortex")
            .with_statement("ks2")
            .with_end_organ("heart", "Heart");

        // the partial record comes first but is processed last
        let h = build_hierarchy(&[partial, complete], &AtlasConfig::default());
        let leaf = h.get(&format!("{}#brain_id#cortex", CNS_ROOT_ID)).unwrap();
        let detail = &leaf.connection_details.as_ref().unwrap()["ks2"];
        assert!(detail.target_organs.contains("heart"));
        assert!(!detail.target_organs.contains("OTHER_X"));
    }

    #[test]
    fn test_missing_statement_keeps_leaf() {
        let mut r = record("brain", "cortex", "ks1");
        r.statement_id = None;
        let h = build_hierarchy(&[r], &AtlasConfig::default());
        let leaf_id = format!("{}#brain_id#cortex", CNS_ROOT_ID);
        let leaf = h.get(&leaf_id).unwrap();
        assert_eq!(leaf.statement_count(), 0);
        assert!(h
            .get(&format!("{}#brain_id", CNS_ROOT_ID))
            .unwrap()
            .children
            .contains(leaf_id.as_str()));
    }

    #[test]
    fn test_record_without_leaf_contributes_chain() {
        let r = HierarchyRecord::default().with_level("brain_id", "brain");
        let h = build_hierarchy(&[r], &AtlasConfig::default());
        let brain = h.get(&format!("{}#brain_id", CNS_ROOT_ID)).unwrap();
        assert!(brain.children.is_empty());
    }
}
