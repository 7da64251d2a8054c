//! Memoized bottom-up aggregation

use super::axis::{AxisKind, OrganAxis};
use super::phenotype::{cell_count, merge_into, PhenotypeKsIdMap};
use super::{AggregationError, AggregationResult};
use crate::config::OTHER_PHENOTYPE_LABEL;
use crate::filter::{Filters, StatementFilter};
use crate::hierarchy::Hierarchy;
use crate::model::{HierarchicalNode, KnowledgeStatement, NodeId, StatementMap};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Node id → one bucket map per axis column
pub type ConnectionsMap = BTreeMap<NodeId, Vec<PhenotypeKsIdMap>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AggregationStats {
    /// Nodes computed (not served from the memo)
    pub computed: usize,
    pub cache_hits: usize,
    pub visible_statements: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AggregationWarning {
    /// Leaves below the start node carry organ keys, none of them on the axis
    AxisMismatch { node: NodeId },
    /// The filters left no statement visible
    NoVisibleStatements,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregation {
    pub connections: ConnectionsMap,
    pub warnings: Vec<AggregationWarning>,
    pub stats: AggregationStats,
}

impl Aggregation {
    pub fn get(&self, id: &str) -> Option<&[PhenotypeKsIdMap]> {
        self.connections.get(id).map(|cells| cells.as_slice())
    }

    /// Per-column statement counts for a node
    pub fn counts(&self, id: &str) -> Option<Vec<usize>> {
        self.get(id)
            .map(|cells| cells.iter().map(cell_count).collect())
    }

    pub fn has_warning(&self, warning: &AggregationWarning) -> bool {
        self.warnings.contains(warning)
    }
}

/// How many organ keys a subtree's leaves carry and how many hit the axis
#[derive(Debug, Clone, Copy, Default)]
struct KeyCoverage {
    keys: usize,
    matched: usize,
}

impl KeyCoverage {
    fn add(&mut self, other: KeyCoverage) {
        self.keys += other.keys;
        self.matched += other.matched;
    }
}

/// Aggregation memo tied to one (hierarchy, filters, axis) tuple.
///
/// Every node is computed at most once per scope; a different filter set or
/// axis needs a new scope.
pub struct AggregationScope<'a> {
    hierarchy: &'a Hierarchy,
    axis: &'a OrganAxis,
    filter: StatementFilter,
    visible: FxHashMap<&'a str, &'a KnowledgeStatement>,
    other_label: String,
    memo: FxHashMap<NodeId, Vec<PhenotypeKsIdMap>>,
    coverage: FxHashMap<NodeId, KeyCoverage>,
    in_progress: FxHashSet<NodeId>,
    stats: AggregationStats,
}

impl<'a> AggregationScope<'a> {
    pub fn new(
        hierarchy: &'a Hierarchy,
        axis: &'a OrganAxis,
        statements: &'a StatementMap,
        filters: &Filters,
    ) -> Self {
        let filter = filters.resolve(hierarchy);
        let visible = filter.apply(statements);
        debug!(
            "Aggregation scope: {} of {} statements visible, {} columns",
            visible.len(),
            statements.len(),
            axis.len()
        );

        let stats = AggregationStats {
            visible_statements: visible.len(),
            ..Default::default()
        };

        AggregationScope {
            hierarchy,
            axis,
            filter,
            visible,
            other_label: OTHER_PHENOTYPE_LABEL.to_string(),
            memo: FxHashMap::default(),
            coverage: FxHashMap::default(),
            in_progress: FxHashSet::default(),
            stats,
        }
    }

    /// Bucket label for statements without a phenotype
    pub fn with_other_label(mut self, label: impl Into<String>) -> Self {
        self.other_label = label.into();
        self
    }

    pub fn stats(&self) -> AggregationStats {
        self.stats
    }

    pub fn is_cached(&self, id: &str) -> bool {
        self.memo.contains_key(id)
    }

    /// Aggregated cells of one node, computing its subtree on first use
    pub fn node(&mut self, id: &str) -> AggregationResult<&[PhenotypeKsIdMap]> {
        let node_id = self.lookup(id)?;
        self.compute(&node_id);
        Ok(self
            .memo
            .get(id)
            .map(|cells| cells.as_slice())
            .unwrap_or(&[]))
    }

    /// Aggregate from `start`, returning every node computed so far in this scope
    pub fn aggregate(&mut self, start: &str) -> AggregationResult<Aggregation> {
        let node_id = self.lookup(start)?;
        self.compute(&node_id);

        let mut warnings = self.visibility_warnings();
        let coverage = self.coverage.get(start).copied().unwrap_or_default();
        if coverage.keys > 0 && coverage.matched == 0 {
            warn!(
                "Axis shares no organ key with the {} keys below {}",
                coverage.keys, start
            );
            warnings.push(AggregationWarning::AxisMismatch { node: node_id });
        }

        debug!(
            "Aggregated {}: {} computed, {} cache hits",
            start, self.stats.computed, self.stats.cache_hits
        );
        Ok(self.snapshot(warnings))
    }

    /// Aggregate every node of the hierarchy
    pub fn aggregate_all(&mut self) -> Aggregation {
        let hierarchy = self.hierarchy;
        for node in hierarchy.nodes() {
            self.compute(&node.id);
        }
        let mut warnings = self.visibility_warnings();

        // Mismatch is judged over the whole hierarchy, reported per affected root
        let mut total = KeyCoverage::default();
        for root in hierarchy.roots() {
            total.add(self.coverage.get(root).copied().unwrap_or_default());
        }
        if total.keys > 0 && total.matched == 0 {
            warn!(
                "Axis shares no organ key with the {} keys in the hierarchy",
                total.keys
            );
            for root in hierarchy.roots() {
                let keys = self.coverage.get(root).map_or(0, |c| c.keys);
                if keys > 0 {
                    warnings.push(AggregationWarning::AxisMismatch { node: root.clone() });
                }
            }
        }
        self.snapshot(warnings)
    }

    fn visibility_warnings(&self) -> Vec<AggregationWarning> {
        let mut warnings = Vec::new();
        if self.visible.is_empty() {
            warn!("No statements visible under the current filters");
            warnings.push(AggregationWarning::NoVisibleStatements);
        }
        warnings
    }

    fn snapshot(&self, warnings: Vec<AggregationWarning>) -> Aggregation {
        Aggregation {
            connections: self
                .memo
                .iter()
                .map(|(id, cells)| (id.clone(), cells.clone()))
                .collect(),
            warnings,
            stats: self.stats,
        }
    }

    fn lookup(&self, id: &str) -> AggregationResult<NodeId> {
        self.hierarchy
            .get(id)
            .map(|node| node.id.clone())
            .ok_or_else(|| AggregationError::NodeNotFound(id.to_string()))
    }

    fn compute(&mut self, id: &NodeId) {
        if self.memo.contains_key(id) {
            self.stats.cache_hits += 1;
            return;
        }
        let hierarchy = self.hierarchy;
        let Some(node) = hierarchy.get(id.as_str()) else {
            return;
        };
        if !self.in_progress.insert(id.clone()) {
            warn!("Cycle detected at node {}", id);
            return;
        }

        let mut cells = vec![PhenotypeKsIdMap::new(); self.axis.len()];
        let mut coverage = KeyCoverage::default();

        if node.is_leaf() {
            coverage = self.fill_leaf(node, &mut cells);
        } else {
            for child in &node.children {
                self.compute(child);
                if let Some(child_cells) = self.memo.get(child) {
                    for (cell, child_cell) in cells.iter_mut().zip(child_cells) {
                        merge_into(cell, child_cell);
                    }
                }
                if let Some(child_coverage) = self.coverage.get(child) {
                    coverage.add(*child_coverage);
                }
            }
        }

        self.in_progress.remove(id);
        self.stats.computed += 1;
        self.coverage.insert(id.clone(), coverage);
        self.memo.insert(id.clone(), cells);
    }

    fn fill_leaf(&self, node: &HierarchicalNode, cells: &mut [PhenotypeKsIdMap]) -> KeyCoverage {
        let mut coverage = KeyCoverage::default();

        match self.axis.kind() {
            AxisKind::EndOrgan => {
                let Some(details) = node.destination_details.as_ref() else {
                    return coverage;
                };
                for (organ, statements) in details {
                    coverage.keys += 1;
                    let Some(column) = self.axis.position(organ) else {
                        continue;
                    };
                    coverage.matched += 1;
                    for statement in statements {
                        self.push(&mut cells[column], statement);
                    }
                }
            }
            AxisKind::TargetOrgan => {
                let Some(details) = node.connection_details.as_ref() else {
                    return coverage;
                };
                for (statement, detail) in details {
                    for organ in &detail.target_organs {
                        coverage.keys += 1;
                        let Some(column) = self.axis.position(organ) else {
                            continue;
                        };
                        coverage.matched += 1;
                        if self.filter.allows_organ(organ) {
                            self.push(&mut cells[column], statement);
                        }
                    }
                }
            }
        }
        coverage
    }

    fn push(&self, cell: &mut PhenotypeKsIdMap, statement: &str) {
        if let Some(ks) = self.visible.get(statement) {
            cell.entry(ks.phenotype_or(&self.other_label).to_string())
                .or_default()
                .push(statement.to_string());
        }
    }
}

/// Aggregate the subtree under `start` in a fresh scope
pub fn aggregate(
    hierarchy: &Hierarchy,
    axis: &OrganAxis,
    statements: &StatementMap,
    filters: &Filters,
    start: &str,
) -> AggregationResult<Aggregation> {
    AggregationScope::new(hierarchy, axis, statements, filters).aggregate(start)
}

/// Aggregate every node of the hierarchy in a fresh scope
pub fn aggregate_all(
    hierarchy: &Hierarchy,
    axis: &OrganAxis,
    statements: &StatementMap,
    filters: &Filters,
) -> Aggregation {
    AggregationScope::new(hierarchy, axis, statements, filters).aggregate_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::AxisColumn;

    // R has leaves X {ks1, ks2} and Y {ks2, ks3}, all under end organ "e"
    fn scenario() -> (Hierarchy, StatementMap) {
        let mut h = Hierarchy::new("#");
        let root = NodeId::new("R");
        h.add_root(root.clone(), "R");
        for (leaf, statements) in [("X", ["ks1", "ks2"]), ("Y", ["ks2", "ks3"])] {
            let id = root.child(leaf, "#");
            let mut node = HierarchicalNode::leaf(id.clone(), leaf);
            for ks in statements {
                node.record_statement(ks, "organ", "e");
            }
            h.insert(node);
            h.add_child(&root, id);
        }

        let mut statements = StatementMap::new();
        statements.insert("ks1".into(), KnowledgeStatement::new("ks1").with_phenotype("p1"));
        statements.insert("ks2".into(), KnowledgeStatement::new("ks2").with_phenotype("p2"));
        statements.insert("ks3".into(), KnowledgeStatement::new("ks3"));
        (h, statements)
    }

    fn end_axis() -> OrganAxis {
        OrganAxis::new(
            AxisKind::EndOrgan,
            vec![AxisColumn {
                id: "e".to_string(),
                name: "E".to_string(),
            }],
        )
    }

    #[test]
    fn test_leaf_buckets_by_phenotype() {
        let (h, statements) = scenario();
        let axis = end_axis();
        let result = aggregate(&h, &axis, &statements, &Filters::new(), "R#Y").unwrap();
        let cell = &result.get("R#Y").unwrap()[0];
        assert_eq!(cell["p2"], vec!["ks2"]);
        assert_eq!(cell["other"], vec!["ks3"]);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_parent_concatenates_children() {
        let (h, statements) = scenario();
        let axis = end_axis();
        let result = aggregate(&h, &axis, &statements, &Filters::new(), "R").unwrap();
        let cell = &result.get("R").unwrap()[0];
        assert_eq!(cell["p2"], vec!["ks2", "ks2"]);
        assert_eq!(result.counts("R"), Some(vec![4]));
        assert_eq!(result.stats.computed, 3);
    }

    #[test]
    fn test_memo_serves_repeat_requests() {
        let (h, statements) = scenario();
        let axis = end_axis();
        let filters = Filters::new();
        let mut scope = AggregationScope::new(&h, &axis, &statements, &filters);
        let first = scope.aggregate("R").unwrap();
        let second = scope.aggregate("R").unwrap();
        assert_eq!(first.connections, second.connections);
        assert_eq!(scope.stats().computed, 3);
        assert_eq!(scope.stats().cache_hits, 1);
        assert!(scope.is_cached("R#X"));
    }

    #[test]
    fn test_unknown_start_node() {
        let (h, statements) = scenario();
        let axis = end_axis();
        let err = aggregate(&h, &axis, &statements, &Filters::new(), "nope").unwrap_err();
        assert!(matches!(err, AggregationError::NodeNotFound(id) if id == "nope"));
    }

    #[test]
    fn test_axis_mismatch_warning() {
        let (h, statements) = scenario();
        let axis = OrganAxis::new(
            AxisKind::EndOrgan,
            vec![AxisColumn {
                id: "unrelated".to_string(),
                name: "Unrelated".to_string(),
            }],
        );
        let result = aggregate(&h, &axis, &statements, &Filters::new(), "R").unwrap();
        assert!(result.has_warning(&AggregationWarning::AxisMismatch {
            node: NodeId::new("R")
        }));
        assert_eq!(result.counts("R"), Some(vec![0]));
    }

    #[test]
    fn test_no_visible_statements_warning() {
        let (h, statements) = scenario();
        let axis = end_axis();
        let filters = Filters::new().with_phenotypes(["absent"]);
        let result = aggregate(&h, &axis, &statements, &filters, "R").unwrap();
        assert_eq!(result.warnings, vec![AggregationWarning::NoVisibleStatements]);
    }

    #[test]
    fn test_target_organ_axis_respects_end_organ_filter() {
        let (h, statements) = scenario();
        let axis = OrganAxis::new(
            AxisKind::TargetOrgan,
            vec![AxisColumn {
                id: "organ".to_string(),
                name: "Organ".to_string(),
            }],
        );
        let all = aggregate(&h, &axis, &statements, &Filters::new(), "R").unwrap();
        assert_eq!(all.counts("R"), Some(vec![4]));

        let filters = Filters::new().with_end_organs(["elsewhere"]);
        let none = aggregate(&h, &axis, &statements, &filters, "R").unwrap();
        assert_eq!(none.counts("R"), Some(vec![0]));
    }

    #[test]
    fn test_aggregate_all_covers_every_node() {
        let (h, statements) = scenario();
        let axis = end_axis();
        let result = aggregate_all(&h, &axis, &statements, &Filters::new());
        assert_eq!(result.connections.len(), h.len());
        assert_eq!(result.stats.computed, h.len());
    }
}
