//! Y-axis construction and flattening

use crate::aggregate::ConnectionsMap;
use crate::hierarchy::{ChildOrderMap, Hierarchy};
use crate::model::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Separator between ancestor and descendant labels in flattened rows
pub const LABEL_SEPARATOR: &str = " - ";

/// Display tree mirroring the hierarchy in display order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YAxisItem {
    pub id: NodeId,
    pub label: String,
    pub children: Vec<YAxisItem>,
}

/// Which nodes are expanded; owned by the caller, separate from the hierarchy
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExpansionState {
    expanded: BTreeSet<NodeId>,
}

impl ExpansionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expand(&mut self, id: impl Into<NodeId>) {
        self.expanded.insert(id.into());
    }

    pub fn collapse(&mut self, id: &str) {
        self.expanded.remove(id);
    }

    /// Flip one node; returns the new state
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.expanded.remove(id) {
            false
        } else {
            self.expanded.insert(NodeId::new(id));
            true
        }
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    pub fn clear(&mut self) {
        self.expanded.clear();
    }

    pub fn len(&self) -> usize {
        self.expanded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expanded.is_empty()
    }
}

/// One visible row of the flattened y-axis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YAxisRow {
    pub id: NodeId,
    /// Ancestor labels prefixed with [`LABEL_SEPARATOR`]
    pub label: String,
    pub depth: usize,
    pub expanded: bool,
}

/// Build the display tree under `roots`, skipping roots not in the hierarchy
pub fn build_y_axis(hierarchy: &Hierarchy, roots: &[NodeId], order: &ChildOrderMap) -> Vec<YAxisItem> {
    roots
        .iter()
        .filter_map(|root| build_item(hierarchy, root.as_str(), order, &mut BTreeSet::new()))
        .collect()
}

fn build_item<'h>(
    hierarchy: &'h Hierarchy,
    id: &'h str,
    order: &ChildOrderMap,
    path: &mut BTreeSet<&'h str>,
) -> Option<YAxisItem> {
    let node = hierarchy.get(id)?;
    if !path.insert(id) {
        return None;
    }
    let children = hierarchy
        .ordered_children(id, order)
        .into_iter()
        .filter_map(|child| build_item(hierarchy, child.id.as_str(), order, path))
        .collect();
    path.remove(id);

    Some(YAxisItem {
        id: node.id.clone(),
        label: node.name.clone(),
        children,
    })
}

/// Flatten a display tree: every listed item contributes a row, expanded
/// items also contribute their children.
pub fn flatten_y_axis(items: &[YAxisItem], expansion: &ExpansionState) -> Vec<YAxisRow> {
    let mut rows = Vec::new();
    flatten_into(items, expansion, "", 0, &mut rows);
    rows
}

fn flatten_into(
    items: &[YAxisItem],
    expansion: &ExpansionState,
    prefix: &str,
    depth: usize,
    rows: &mut Vec<YAxisRow>,
) {
    for item in items {
        let label = if prefix.is_empty() {
            item.label.clone()
        } else {
            format!("{}{}{}", prefix, LABEL_SEPARATOR, item.label)
        };
        let expanded = expansion.is_expanded(item.id.as_str());
        rows.push(YAxisRow {
            id: item.id.clone(),
            label: label.clone(),
            depth,
            expanded,
        });
        if expanded && !item.children.is_empty() {
            flatten_into(&item.children, expansion, &label, depth + 1, rows);
        }
    }
}

/// Visible rows for the hierarchy under `roots` in default display order
pub fn project_y_axis(hierarchy: &Hierarchy, roots: &[NodeId], expansion: &ExpansionState) -> Vec<YAxisRow> {
    let items = build_y_axis(hierarchy, roots, &ChildOrderMap::new());
    flatten_y_axis(&items, expansion)
}

/// Drop items with no data in any column and no surviving descendant
pub fn prune_y_axis(items: &[YAxisItem], connections: &ConnectionsMap) -> Vec<YAxisItem> {
    items
        .iter()
        .filter_map(|item| {
            let has_data = connections
                .get(item.id.as_str())
                .map(|cells| cells.iter().any(|cell| !cell.is_empty()))
                .unwrap_or(false);
            let children = prune_y_axis(&item.children, connections);
            (has_data || !children.is_empty()).then(|| YAxisItem {
                id: item.id.clone(),
                label: item.label.clone(),
                children,
            })
        })
        .collect()
}

/// Expand every item that has children
pub fn expand_all(items: &[YAxisItem], expansion: &mut ExpansionState) {
    for item in items {
        if !item.children.is_empty() {
            expansion.expand(item.id.clone());
            expand_all(&item.children, expansion);
        }
    }
}
