//! Aggregation engine
//!
//! Turns hierarchy + filtered statements + organ axis into per-node
//! connection summaries: for every node, one phenotype → statement-id bucket
//! map per axis column. Leaves read their recorded details; internal nodes
//! concatenate their children's buckets column by column. Results are
//! memoized per [`AggregationScope`].

pub mod axis;
pub mod engine;
pub mod phenotype;

pub use axis::{AxisColumn, AxisKind, OrganAxis};
pub use engine::{
    aggregate, aggregate_all, Aggregation, AggregationScope, AggregationStats,
    AggregationWarning, ConnectionsMap,
};
pub use phenotype::{cell_count, cell_statements, merge_into, PhenotypeKsIdMap};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AggregationError {
    #[error("Node {0} not found in hierarchy")]
    NodeNotFound(String),
}

pub type AggregationResult<T> = Result<T, AggregationError>;
