//! Statement filters
//!
//! [`Filters`] is the user-facing selection. It is resolved against the
//! hierarchy once per aggregation into a [`StatementFilter`], which expands
//! origin/via region ids to their leaf entities and answers per-statement
//! membership.

pub mod options;

pub use options::{filter_options, nerve_options, FilterOption, FilterOptions};

use crate::hierarchy::Hierarchy;
use crate::model::{KnowledgeStatement, StatementMap};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Selected filter values; an empty dimension places no restriction
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Filters {
    pub phenotypes: BTreeSet<String>,
    /// Via entity ids
    pub nerves: BTreeSet<String>,
    pub species: BTreeSet<String>,
    pub apinatomies: BTreeSet<String>,
    /// Origin entity ids or hierarchy node ids
    pub origins: BTreeSet<String>,
    /// Via entity ids or hierarchy node ids
    pub vias: BTreeSet<String>,
    /// Organ ids whose columns receive data
    pub end_organs: BTreeSet<String>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.phenotypes.is_empty()
            && self.nerves.is_empty()
            && self.species.is_empty()
            && self.apinatomies.is_empty()
            && self.origins.is_empty()
            && self.vias.is_empty()
            && self.end_organs.is_empty()
    }

    pub fn with_phenotypes<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.phenotypes.extend(values.into_iter().map(Into::into));
        self
    }

    pub fn with_nerves<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.nerves.extend(values.into_iter().map(Into::into));
        self
    }

    pub fn with_species<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.species.extend(values.into_iter().map(Into::into));
        self
    }

    pub fn with_apinatomies<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.apinatomies.extend(values.into_iter().map(Into::into));
        self
    }

    /// Entity or region ids; regions expand to their leaves on resolve
    pub fn with_origins<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.origins.extend(values.into_iter().map(Into::into));
        self
    }

    pub fn with_vias<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.vias.extend(values.into_iter().map(Into::into));
        self
    }

    pub fn with_end_organs<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.end_organs.extend(values.into_iter().map(Into::into));
        self
    }

    /// Expand hierarchy ids and build the per-statement predicate
    pub fn resolve(&self, hierarchy: &Hierarchy) -> StatementFilter {
        StatementFilter {
            phenotypes: self.phenotypes.iter().cloned().collect(),
            nerves: self.nerves.iter().cloned().collect(),
            species: self.species.iter().cloned().collect(),
            apinatomies: self.apinatomies.iter().cloned().collect(),
            origins: expand_entities(&self.origins, hierarchy),
            vias: expand_entities(&self.vias, hierarchy),
            end_organs: self.end_organs.iter().cloned().collect(),
        }
    }
}

/// Leaf ids pass through; region ids become their leaf descendants' base ids
fn expand_entities(ids: &BTreeSet<String>, hierarchy: &Hierarchy) -> FxHashSet<String> {
    let mut expanded = FxHashSet::default();
    for id in ids {
        if hierarchy.is_leaf(id) {
            expanded.insert(id.clone());
        } else {
            expanded.extend(hierarchy.leaf_descendants(id));
        }
    }
    expanded
}

/// Resolved filter; dimensions combine with AND
#[derive(Debug, Clone, Default)]
pub struct StatementFilter {
    phenotypes: FxHashSet<String>,
    nerves: FxHashSet<String>,
    species: FxHashSet<String>,
    apinatomies: FxHashSet<String>,
    origins: FxHashSet<String>,
    vias: FxHashSet<String>,
    end_organs: FxHashSet<String>,
}

impl StatementFilter {
    pub fn matches(&self, ks: &KnowledgeStatement) -> bool {
        let phenotype = self.phenotypes.is_empty() || self.phenotypes.contains(&ks.phenotype);
        let apinatomy = self.apinatomies.is_empty() || self.apinatomies.contains(&ks.apinatomy);
        let species = self.species.is_empty()
            || ks.species.iter().any(|s| self.species.contains(&s.id));
        let nerve = self.nerves.is_empty()
            || ks.via_entities().any(|e| self.nerves.contains(&e.id));
        let via = self.vias.is_empty() || ks.via_entities().any(|e| self.vias.contains(&e.id));
        let origin = self.origins.is_empty()
            || ks.origins.iter().any(|o| self.origins.contains(&o.id));

        phenotype && apinatomy && species && nerve && via && origin
    }

    /// Statements passing the filter, keyed by id
    pub fn apply<'a>(
        &self,
        statements: &'a StatementMap,
    ) -> FxHashMap<&'a str, &'a KnowledgeStatement> {
        statements
            .iter()
            .filter(|(_, ks)| self.matches(ks))
            .map(|(id, ks)| (id.as_str(), ks))
            .collect()
    }

    /// Whether the column keyed by `organ` may receive data
    pub fn allows_organ(&self, organ: &str) -> bool {
        self.end_organs.is_empty() || self.end_organs.contains(organ)
    }
}
