//! Neuroatlas
//!
//! Connectivity aggregation and layout engine for neuron-population
//! knowledge statements: builds the anatomical region hierarchy, aggregates
//! statements into per-node, per-organ phenotype buckets, projects them onto
//! a heatmap, and lays out origin → via → destination path diagrams.
//!
//! # Pipeline
//!
//! 1. [`payload`] decodes binding tables and statement collections
//! 2. [`hierarchy`] builds the region tree and the organ catalog
//! 3. [`filter`] narrows the statement set
//! 4. [`aggregate`] computes connection summaries over an organ axis
//! 5. [`projection`] flattens the tree into rows and lines up the matrix
//! 6. [`diagram`] lays out a single statement's path
//!
//! ## Example Usage
//!
//! ```rust
//! use neuroatlas::{
//!     aggregate, build_hierarchy, AtlasConfig, Filters, HierarchyRecord, KnowledgeStatement,
//!     OrganAxis, AxisColumn, AxisKind, StatementMap,
//! };
//!
//! let config = AtlasConfig::default();
//! let records = vec![HierarchyRecord::default()
//!     .with_level("http://x/brain", "brain")
//!     .with_leaf("http://x/nts", "NTS")
//!     .with_statement("ks1")
//!     .with_target_organ("http://x/heart", "heart")
//!     .with_end_organ("http://x/atrium", "atrium")];
//! let hierarchy = build_hierarchy(&records, &config);
//!
//! let mut statements = StatementMap::new();
//! statements.insert("ks1".to_string(), KnowledgeStatement::new("ks1"));
//!
//! let axis = OrganAxis::new(
//!     AxisKind::TargetOrgan,
//!     vec![AxisColumn { id: "http://x/heart".to_string(), name: "heart".to_string() }],
//! );
//! let root = &config.roots[0];
//! let result = aggregate(&hierarchy, &axis, &statements, &Filters::new(), &root.id).unwrap();
//! assert_eq!(result.counts(&root.id), Some(vec![1]));
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod aggregate;
pub mod config;
pub mod diagram;
pub mod filter;
pub mod hierarchy;
pub mod model;
pub mod payload;
pub mod projection;

// Re-export main types for convenience
pub use model::{
    AnatomicalEntity, BaseEntity, ConnectionDetail, DestinationSegment, DestinationType,
    ForwardConnection, HierarchicalNode, HierarchyRecord, KnowledgeStatement, Level, NodeId,
    Organ, OrganId, StatementId, StatementMap, ViaSegment, ViaType,
};

pub use config::{AtlasConfig, ConfigError, ConfigResult, RootDefinition, RootMembership};

pub use hierarchy::{
    build_hierarchy, build_organ_catalog, ChildOrderMap, EndOrganOrderMap, Hierarchy,
    OrganCatalog, TargetSystem,
};

pub use filter::{filter_options, FilterOption, FilterOptions, Filters, StatementFilter};

pub use aggregate::{
    aggregate, aggregate_all, Aggregation, AggregationError, AggregationResult,
    AggregationScope, AggregationWarning, AxisColumn, AxisKind, ConnectionsMap, OrganAxis,
    PhenotypeKsIdMap,
};

pub use projection::{
    build_y_axis, flatten_y_axis, project_matrix, ExpansionState, YAxisItem, YAxisRow,
};

pub use diagram::{build_graph, statement_diagram, DiagramModel, LayoutConfig};

pub use payload::{PayloadError, PayloadResult};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
