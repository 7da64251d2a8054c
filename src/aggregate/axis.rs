//! Organ column axis

use crate::model::Organ;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Which leaf detail map the axis keys are looked up in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisKind {
    /// Keys are end-organ (sub-region) ids, read from destination details
    EndOrgan,
    /// Keys are organ ids, matched against a statement's target organs
    TargetOrgan,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisColumn {
    pub id: String,
    pub name: String,
}

/// Ordered columns plus a key → position index
#[derive(Debug, Clone)]
pub struct OrganAxis {
    kind: AxisKind,
    columns: Vec<AxisColumn>,
    index: FxHashMap<String, usize>,
}

impl OrganAxis {
    /// Build from explicit columns; a repeated key keeps its first column
    pub fn new(kind: AxisKind, columns: Vec<AxisColumn>) -> Self {
        let mut index = FxHashMap::default();
        for (position, column) in columns.iter().enumerate() {
            index.entry(column.id.clone()).or_insert(position);
        }
        OrganAxis {
            kind,
            columns,
            index,
        }
    }

    /// One column per organ, sorted by rank
    pub fn target_organs<'a>(organs: impl IntoIterator<Item = &'a Organ>) -> Self {
        let mut organs: Vec<&Organ> = organs.into_iter().collect();
        organs.sort_by_key(|o| o.order);
        let columns = organs
            .into_iter()
            .map(|o| AxisColumn {
                id: o.id.clone(),
                name: o.name.clone(),
            })
            .collect();
        OrganAxis::new(AxisKind::TargetOrgan, columns)
    }

    /// One column per sub-region of `organ`, in discovery order
    pub fn end_organs(organ: &Organ) -> Self {
        let columns = organ
            .children
            .values()
            .map(|child| AxisColumn {
                id: child.id.clone(),
                name: child.name.clone(),
            })
            .collect();
        OrganAxis::new(AxisKind::EndOrgan, columns)
    }

    pub fn kind(&self) -> AxisKind {
        self.kind
    }

    pub fn columns(&self) -> &[AxisColumn] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn position(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_axis_sorted_by_rank() {
        let mut heart = Organ::new("heart", "Heart");
        heart.order = 2;
        let mut lung = Organ::new("lung", "Lung");
        lung.order = 1;
        let axis = OrganAxis::target_organs([&heart, &lung]);
        assert_eq!(axis.labels(), vec!["Lung", "Heart"]);
        assert_eq!(axis.position("heart"), Some(1));
        assert_eq!(axis.position("kidney"), None);
    }

    #[test]
    fn test_end_organ_axis_from_children() {
        let mut heart = Organ::new("heart", "Heart");
        heart.add_child("heart", "Heart");
        heart.add_child("atrium", "Atrium");
        let axis = OrganAxis::end_organs(&heart);
        assert_eq!(axis.kind(), AxisKind::EndOrgan);
        assert_eq!(axis.len(), 2);
        assert_eq!(axis.position("atrium"), Some(1));
    }
}
