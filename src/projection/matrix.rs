//! Heatmap matrix projection and helpers

use super::axis::{YAxisItem, YAxisRow};
use crate::aggregate::{cell_count, cell_statements, ConnectionsMap, OrganAxis, PhenotypeKsIdMap};
use crate::model::{NodeId, StatementId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Detail row: the bucket maps behind one matrix row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailRow {
    pub id: NodeId,
    pub label: String,
    pub cells: Vec<PhenotypeKsIdMap>,
}

/// Counts matrix, one row per y-axis row and one column per axis column.
/// Rows without aggregation data are all zeros.
pub fn project_matrix(connections: &ConnectionsMap, rows: &[YAxisRow], axis: &OrganAxis) -> Vec<Vec<usize>> {
    rows.iter()
        .map(|row| match connections.get(row.id.as_str()) {
            Some(cells) => (0..axis.len())
                .map(|i| cells.get(i).map(cell_count).unwrap_or(0))
                .collect(),
            None => vec![0; axis.len()],
        })
        .collect()
}

/// Per-cell bucket maps; rows without aggregation data are all empty
pub fn project_detail(connections: &ConnectionsMap, rows: &[YAxisRow], axis: &OrganAxis) -> Vec<DetailRow> {
    rows.iter()
        .map(|row| {
            let cells = match connections.get(row.id.as_str()) {
                Some(cells) => (0..axis.len())
                    .map(|i| cells.get(i).cloned().unwrap_or_default())
                    .collect(),
                None => vec![PhenotypeKsIdMap::new(); axis.len()],
            };
            DetailRow {
                id: row.id.clone(),
                label: row.label.clone(),
                cells,
            }
        })
        .collect()
}

/// Smallest and largest cell count across the root rows
pub fn min_max(connections: &ConnectionsMap, roots: &[NodeId]) -> Option<(usize, usize)> {
    roots
        .iter()
        .filter_map(|root| connections.get(root.as_str()))
        .flat_map(|cells| cells.iter().map(cell_count))
        .fold(None, |acc, count| match acc {
            None => Some((count, count)),
            Some((min, max)) => Some((min.min(count), max.max(count))),
        })
}

/// Colour intensity for a cell in `[0, 1]`.
///
/// The range minimum is pinned to zero so the smallest non-zero count stays
/// visible; only the maximum matters.
pub fn normalized(value: usize, max: usize) -> f64 {
    if max == 0 {
        return 0.0;
    }
    value.min(max) as f64 / max as f64
}

/// Columns holding data in any top-level item's row
pub fn non_empty_columns(items: &[YAxisItem], connections: &ConnectionsMap) -> BTreeSet<usize> {
    let mut columns = BTreeSet::new();
    for item in items {
        if let Some(cells) = connections.get(item.id.as_str()) {
            for (i, cell) in cells.iter().enumerate() {
                if !cell.is_empty() {
                    columns.insert(i);
                }
            }
        }
    }
    columns
}

/// Keep only `columns` in the rows of `items` and their descendants
pub fn prune_columns(
    items: &[YAxisItem],
    connections: &ConnectionsMap,
    columns: &BTreeSet<usize>,
) -> ConnectionsMap {
    let mut pruned = BTreeMap::new();
    let mut stack: Vec<&YAxisItem> = items.iter().collect();
    while let Some(item) = stack.pop() {
        if let Some(cells) = connections.get(item.id.as_str()) {
            let kept = cells
                .iter()
                .enumerate()
                .filter(|(i, _)| columns.contains(i))
                .map(|(_, cell)| cell.clone())
                .collect();
            pruned.insert(item.id.clone(), kept);
        }
        stack.extend(item.children.iter());
    }
    pruned
}

/// Reorder a row so that position `i` holds the old `permutation[i]`;
/// out-of-range indices are skipped
pub fn reorder_columns<T: Clone>(row: &[T], permutation: &[usize]) -> Vec<T> {
    permutation
        .iter()
        .filter_map(|&i| row.get(i).cloned())
        .collect()
}

/// Number of distinct statements across every cell of a row
pub fn total_statements(cells: &[PhenotypeKsIdMap]) -> usize {
    row_statements(cells).len()
}

/// Distinct statements across every cell of a row
pub fn row_statements(cells: &[PhenotypeKsIdMap]) -> BTreeSet<StatementId> {
    cells.iter().flat_map(cell_statements).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{AxisColumn, AxisKind};

    fn cell(phenotype: &str, ids: &[&str]) -> PhenotypeKsIdMap {
        let mut cell = PhenotypeKsIdMap::new();
        cell.insert(
            phenotype.to_string(),
            ids.iter().map(|s| s.to_string()).collect(),
        );
        cell
    }

    fn empty() -> PhenotypeKsIdMap {
        PhenotypeKsIdMap::new()
    }

    fn axis(n: usize) -> OrganAxis {
        OrganAxis::new(
            AxisKind::TargetOrgan,
            (0..n)
                .map(|i| AxisColumn {
                    id: format!("o{}", i),
                    name: format!("O{}", i),
                })
                .collect(),
        )
    }

    fn row(id: &str) -> YAxisRow {
        YAxisRow {
            id: NodeId::new(id),
            label: id.to_string(),
            depth: 0,
            expanded: false,
        }
    }

    #[test]
    fn test_missing_rows_are_zero() {
        let mut connections = ConnectionsMap::new();
        connections.insert(
            NodeId::new("a"),
            vec![cell("p", &["ks1", "ks2"]), empty()],
        );
        let matrix = project_matrix(&connections, &[row("a"), row("b")], &axis(2));
        assert_eq!(matrix, vec![vec![2, 0], vec![0, 0]]);

        let detail = project_detail(&connections, &[row("b")], &axis(2));
        assert_eq!(detail[0].cells.len(), 2);
        assert!(detail[0].cells.iter().all(|c| c.is_empty()));
    }

    #[test]
    fn test_min_max_over_roots() {
        let mut connections = ConnectionsMap::new();
        connections.insert(NodeId::new("r1"), vec![cell("p", &["a"]), empty()]);
        connections.insert(NodeId::new("r2"), vec![cell("p", &["a", "b", "c"])]);
        connections.insert(NodeId::new("child"), vec![cell("p", &["a"; 9])]);
        let roots = vec![NodeId::new("r1"), NodeId::new("r2")];
        assert_eq!(min_max(&connections, &roots), Some((0, 3)));
        assert_eq!(min_max(&connections, &[]), None);
    }

    #[test]
    fn test_normalized_pins_min() {
        assert_eq!(normalized(0, 0), 0.0);
        assert_eq!(normalized(4, 8), 0.5);
        assert_eq!(normalized(8, 8), 1.0);
    }

    #[test]
    fn test_column_pruning() {
        let items = vec![YAxisItem {
            id: NodeId::new("r"),
            label: "R".to_string(),
            children: vec![YAxisItem {
                id: NodeId::new("r#c"),
                label: "C".to_string(),
                children: vec![],
            }],
        }];
        let mut connections = ConnectionsMap::new();
        connections.insert(NodeId::new("r"), vec![empty(), cell("p", &["ks1"]), empty()]);
        connections.insert(NodeId::new("r#c"), vec![empty(), cell("p", &["ks1"]), empty()]);

        let columns = non_empty_columns(&items, &connections);
        assert_eq!(columns.into_iter().collect::<Vec<_>>(), vec![1]);

        let columns: BTreeSet<usize> = [1].into_iter().collect();
        let pruned = prune_columns(&items, &connections, &columns);
        assert_eq!(pruned["r#c"].len(), 1);
        assert_eq!(pruned.len(), 2);
    }

    #[test]
    fn test_reorder_and_totals() {
        assert_eq!(reorder_columns(&["a", "b", "c"], &[2, 0, 7]), vec!["c", "a"]);

        let cells = vec![cell("p", &["ks1", "ks2"]), cell("q", &["ks2", "ks3"])];
        assert_eq!(total_statements(&cells), 3);
    }
}
