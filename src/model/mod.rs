//! Data model shared by the hierarchy, aggregation and diagram layers

pub mod entity;
pub mod node;
pub mod record;
pub mod statement;
pub mod types;

pub use entity::{AnatomicalEntity, BaseEntity};
pub use node::{ConnectionDetail, HierarchicalNode, Organ};
pub use record::{HierarchyRecord, Level};
pub use statement::{
    DestinationSegment, DestinationType, ForwardConnection, KnowledgeStatement, StatementMap,
    ViaSegment, ViaType,
};
pub use types::{base_id, NodeId, OrganId, StatementId, DEFAULT_PATH_DELIMITER};
