//! Selectable filter values derived from the statement collection

use crate::model::{AnatomicalEntity, KnowledgeStatement, Organ, StatementMap};
use crate::projection::YAxisItem;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOption {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synonyms: Option<String>,
}

impl FilterOption {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        FilterOption {
            id: id.into(),
            label: label.into(),
            synonyms: None,
        }
    }

    fn from_entity(entity: &AnatomicalEntity) -> Self {
        FilterOption {
            id: entity.id.clone(),
            label: entity.name.clone(),
            synonyms: (!entity.synonyms.is_empty()).then(|| entity.synonyms.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterOptions {
    pub phenotypes: Vec<FilterOption>,
    pub apinatomies: Vec<FilterOption>,
    pub species: Vec<FilterOption>,
    pub origins: Vec<FilterOption>,
    pub vias: Vec<FilterOption>,
    pub end_organs: Vec<FilterOption>,
    pub nerves: Vec<FilterOption>,
}

/// Keep the first option per id
fn dedup_by_id(options: impl IntoIterator<Item = FilterOption>) -> Vec<FilterOption> {
    let mut seen = HashSet::new();
    options
        .into_iter()
        .filter(|o| seen.insert(o.id.clone()))
        .collect()
}

fn sorted_entities<'a>(entities: impl Iterator<Item = &'a AnatomicalEntity>) -> Vec<FilterOption> {
    let mut list: Vec<&AnatomicalEntity> = entities.collect();
    list.sort_by(|a, b| a.name.cmp(&b.name));
    dedup_by_id(list.into_iter().map(FilterOption::from_entity))
}

fn labels(values: BTreeSet<&str>) -> Vec<FilterOption> {
    values
        .into_iter()
        .map(|v| FilterOption::new(v, v))
        .collect()
}

pub fn unique_phenotypes(statements: &StatementMap) -> Vec<FilterOption> {
    labels(
        statements
            .values()
            .map(|ks| ks.phenotype.as_str())
            .filter(|p| !p.is_empty())
            .collect(),
    )
}

pub fn unique_apinatomies(statements: &StatementMap) -> Vec<FilterOption> {
    labels(
        statements
            .values()
            .map(|ks| ks.apinatomy.as_str())
            .filter(|a| !a.is_empty())
            .collect(),
    )
}

pub fn unique_species(statements: &StatementMap) -> Vec<FilterOption> {
    dedup_by_id(
        statements
            .values()
            .flat_map(|ks| ks.species.iter())
            .map(|s| FilterOption::new(s.id.clone(), s.name.clone())),
    )
}

pub fn unique_vias(statements: &StatementMap) -> Vec<FilterOption> {
    sorted_entities(statements.values().flat_map(KnowledgeStatement::via_entities))
}

/// Statement origins sorted by name, followed by every y-axis region
/// (keyed by base id) not already listed
pub fn unique_origins(
    statements: &StatementMap,
    y_axis: &[YAxisItem],
    delimiter: &str,
) -> Vec<FilterOption> {
    let mut options = sorted_entities(statements.values().flat_map(|ks| ks.origins.iter()));

    let mut stack: Vec<&YAxisItem> = y_axis.iter().rev().collect();
    while let Some(item) = stack.pop() {
        let base = item.id.base_id(delimiter);
        options.push(FilterOption::new(base, item.label.clone()));
        stack.extend(item.children.iter().rev());
    }
    dedup_by_id(options)
}

pub fn unique_end_organs<'a>(organs: impl IntoIterator<Item = &'a Organ>) -> Vec<FilterOption> {
    organs
        .into_iter()
        .map(|o| FilterOption::new(o.id.clone(), o.name.clone()))
        .collect()
}

/// Via entities that are major nerves
pub fn nerve_options(statements: &StatementMap, major_nerves: &BTreeSet<String>) -> Vec<FilterOption> {
    sorted_entities(
        statements
            .values()
            .flat_map(KnowledgeStatement::via_entities)
            .filter(|e| major_nerves.contains(&e.id)),
    )
}

pub fn filter_options<'a>(
    statements: &StatementMap,
    y_axis: &[YAxisItem],
    organs: impl IntoIterator<Item = &'a Organ>,
    major_nerves: &BTreeSet<String>,
    delimiter: &str,
) -> FilterOptions {
    FilterOptions {
        phenotypes: unique_phenotypes(statements),
        apinatomies: unique_apinatomies(statements),
        species: unique_species(statements),
        origins: unique_origins(statements, y_axis, delimiter),
        vias: unique_vias(statements),
        end_organs: unique_end_organs(organs),
        nerves: nerve_options(statements, major_nerves),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BaseEntity, NodeId, ViaSegment, ViaType};

    fn statements() -> StatementMap {
        let mut map = StatementMap::new();
        let mut ks1 = KnowledgeStatement::new("ks1").with_phenotype("sympathetic");
        ks1.species = vec![BaseEntity::new("rat", "Rat")];
        ks1.origins = vec![AnatomicalEntity::new("o2", "Zeta"), AnatomicalEntity::new("o1", "Alpha")];
        ks1.vias = vec![ViaSegment {
            order: 0,
            kind: ViaType::Axon,
            anatomical_entities: vec![
                AnatomicalEntity::new("vagus", "Vagus nerve"),
                AnatomicalEntity::new("branch", "Branch"),
            ],
            from_entities: vec![],
        }];
        map.insert(ks1.id.clone(), ks1);

        let mut ks2 = KnowledgeStatement::new("ks2");
        ks2.species = vec![BaseEntity::new("rat", "Rat")];
        ks2.origins = vec![AnatomicalEntity::new("o1", "Alpha")];
        map.insert(ks2.id.clone(), ks2);
        map
    }

    #[test]
    fn test_phenotypes_skip_empty() {
        let options = unique_phenotypes(&statements());
        assert_eq!(options, vec![FilterOption::new("sympathetic", "sympathetic")]);
    }

    #[test]
    fn test_species_unique() {
        assert_eq!(unique_species(&statements()).len(), 1);
    }

    #[test]
    fn test_origins_sorted_then_regions() {
        let y_axis = vec![YAxisItem {
            id: NodeId::new("root"),
            label: "Root".to_string(),
            children: vec![YAxisItem {
                id: NodeId::new("root#o1"),
                label: "Alpha region".to_string(),
                children: vec![],
            }],
        }];
        let options = unique_origins(&statements(), &y_axis, "#");
        let ids: Vec<&str> = options.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["o1", "o2", "root"]);
        assert_eq!(options[0].label, "Alpha");
    }

    #[test]
    fn test_nerves_are_major_vias() {
        let mut major = BTreeSet::new();
        major.insert("vagus".to_string());
        let nerves = nerve_options(&statements(), &major);
        assert_eq!(nerves, vec![FilterOption::new("vagus", "Vagus nerve")]);
        assert_eq!(unique_vias(&statements()).len(), 2);
    }
}
