//! Per-cell phenotype buckets

use crate::model::StatementId;
use std::collections::{BTreeMap, BTreeSet};

/// Phenotype label → statement ids for one (node, column) cell
pub type PhenotypeKsIdMap = BTreeMap<String, Vec<StatementId>>;

/// Append every bucket of `source` onto the matching bucket of `target`
pub fn merge_into(target: &mut PhenotypeKsIdMap, source: &PhenotypeKsIdMap) {
    for (phenotype, ids) in source {
        target
            .entry(phenotype.clone())
            .or_default()
            .extend(ids.iter().cloned());
    }
}

/// Number of statement references in a cell, duplicates included
pub fn cell_count(cell: &PhenotypeKsIdMap) -> usize {
    cell.values().map(|ids| ids.len()).sum()
}

/// Distinct statements in a cell
pub fn cell_statements(cell: &PhenotypeKsIdMap) -> BTreeSet<StatementId> {
    cell.values().flatten().cloned().collect()
}
