//! Anatomical region hierarchy
//!
//! A forest of [`HierarchicalNode`]s rooted at the configured top-level
//! categories. Built once per dataset by [`build_hierarchy`] and read-only
//! afterwards; expansion state lives in the projection layer.

pub mod builder;
pub mod order;
pub mod organs;

pub use builder::build_hierarchy;
pub use order::{natural_cmp, ChildOrderMap};
pub use organs::{build_organ_catalog, EndOrganOrderMap, OrganCatalog, TargetSystem};

use crate::model::{base_id, HierarchicalNode, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hierarchy {
    nodes: BTreeMap<NodeId, HierarchicalNode>,
    /// Root ids in declaration order
    roots: Vec<NodeId>,
    delimiter: String,
}

impl Hierarchy {
    pub fn new(delimiter: impl Into<String>) -> Self {
        Hierarchy {
            nodes: BTreeMap::new(),
            roots: Vec::new(),
            delimiter: delimiter.into(),
        }
    }

    /// Declare a root; re-declaring an existing root is a no-op
    pub fn add_root(&mut self, id: NodeId, name: &str) {
        if !self.nodes.contains_key(&id) {
            self.nodes
                .insert(id.clone(), HierarchicalNode::new(id.clone(), name));
        }
        if !self.roots.contains(&id) {
            self.roots.push(id);
        }
    }

    /// Insert a node unless one with the same id exists
    pub fn insert(&mut self, node: HierarchicalNode) {
        self.nodes.entry(node.id.clone()).or_insert(node);
    }

    /// Register `child` under `parent`; ignored when the parent is unknown
    pub fn add_child(&mut self, parent: &NodeId, child: NodeId) {
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.insert(child);
        }
    }

    pub fn get(&self, id: &str) -> Option<&HierarchicalNode> {
        self.nodes.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut HierarchicalNode> {
        self.nodes.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &HierarchicalNode> {
        self.nodes.values()
    }

    /// Raw entity id of a node path
    pub fn base_id<'a>(&self, path: &'a str) -> &'a str {
        base_id(path, &self.delimiter)
    }

    /// True for nodes without children, and for ids not in the hierarchy
    pub fn is_leaf(&self, id: &str) -> bool {
        self.nodes.get(id).map(|n| n.is_leaf()).unwrap_or(true)
    }

    /// Base ids of every leaf below `id` (the node itself when it is a leaf)
    pub fn leaf_descendants(&self, id: &str) -> Vec<String> {
        let mut leaves = Vec::new();
        let mut visited = HashSet::new();
        let mut stack = vec![id];

        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            match self.nodes.get(current) {
                Some(node) if !node.is_leaf() => {
                    stack.extend(node.children.iter().rev().map(|c| c.as_str()));
                }
                _ => leaves.push(self.base_id(current).to_string()),
            }
        }
        leaves
    }

    /// Children of `id` in display order.
    ///
    /// Nodes with children come before leaves. Within each group, ids listed
    /// for the parent's base id in `order` come first in listed order, the
    /// rest follow in natural name order.
    pub fn ordered_children(&self, id: &str, order: &ChildOrderMap) -> Vec<&HierarchicalNode> {
        let Some(parent) = self.nodes.get(id) else {
            return Vec::new();
        };
        let preferred = order.get(self.base_id(id));

        let rank = |node: &HierarchicalNode| -> usize {
            preferred
                .and_then(|list| {
                    let child = self.base_id(node.id.as_str());
                    list.iter().position(|entry| entry == child)
                })
                .unwrap_or(usize::MAX)
        };

        let mut children: Vec<&HierarchicalNode> = parent
            .children
            .iter()
            .filter_map(|child| self.nodes.get(child))
            .collect();

        children.sort_by(|a, b| {
            a.is_leaf()
                .cmp(&b.is_leaf())
                .then_with(|| rank(a).cmp(&rank(b)))
                .then_with(|| natural_cmp(&a.name, &b.name))
                .then_with(|| a.id.cmp(&b.id))
        });
        children
    }

    /// Number of nodes in the subtree rooted at `id`
    pub fn subtree_size(&self, id: &str) -> usize {
        let mut count = 0;
        let mut visited = HashSet::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            if let Some(node) = self.nodes.get(current) {
                count += 1;
                stack.extend(node.children.iter().map(|c| c.as_str()));
            }
        }
        count
    }
}

impl Default for Hierarchy {
    fn default() -> Self {
        Hierarchy::new(crate::model::DEFAULT_PATH_DELIMITER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Hierarchy {
        let mut h = Hierarchy::new("#");
        let root = NodeId::new("root");
        h.add_root(root.clone(), "Root");

        let group = root.child("g", "#");
        h.insert(HierarchicalNode::new(group.clone(), "Group"));
        h.add_child(&root, group.clone());

        for (id, name) in [("l10", "Level 10"), ("l2", "level 2"), ("x", "Alpha")] {
            let leaf = group.child(id, "#");
            h.insert(HierarchicalNode::leaf(leaf.clone(), name));
            h.add_child(&group, leaf);
        }
        let lone = root.child("z", "#");
        h.insert(HierarchicalNode::leaf(lone.clone(), "Aardvark"));
        h.add_child(&root, lone);
        h
    }

    #[test]
    fn test_leaf_descendants() {
        let h = sample();
        let mut leaves = h.leaf_descendants("root");
        leaves.sort();
        assert_eq!(leaves, vec!["l10", "l2", "x", "z"]);
        assert_eq!(h.leaf_descendants("root#z"), vec!["z"]);
        assert!(h.is_leaf("root#z"));
        assert!(!h.is_leaf("root#g"));
        assert!(h.is_leaf("unknown"));
    }

    #[test]
    fn test_ordered_children_groups_and_natural_sort() {
        let h = sample();
        let order = ChildOrderMap::new();
        let names: Vec<&str> = h
            .ordered_children("root", &order)
            .iter()
            .map(|n| n.name.as_str())
            .collect();
        // the internal node precedes the leaf despite its name
        assert_eq!(names, vec!["Group", "Aardvark"]);

        let names: Vec<&str> = h
            .ordered_children("root#g", &order)
            .iter()
            .map(|n| n.name.as_str())
            .collect();
        assert_eq!(names, vec!["Alpha", "level 2", "Level 10"]);
    }

    #[test]
    fn test_ordered_children_with_order_map() {
        let h = sample();
        let mut order = ChildOrderMap::new();
        order.insert("g".to_string(), vec!["l10".to_string()]);
        let names: Vec<&str> = h
            .ordered_children("root#g", &order)
            .iter()
            .map(|n| n.name.as_str())
            .collect();
        assert_eq!(names, vec!["Level 10", "Alpha", "level 2"]);
    }

    #[test]
    fn test_subtree_size() {
        let h = sample();
        assert_eq!(h.subtree_size("root"), 6);
        assert_eq!(h.subtree_size("root#g"), 4);
        assert_eq!(h.subtree_size("missing"), 0);
    }
}
