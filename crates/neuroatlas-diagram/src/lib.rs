pub mod common;
pub mod layered;

pub use common::{
    Adjacency, DiagramLink, DiagramModel, DiagramNode, LayerEntity, LayerGroup, LayerKind,
    NodeKey, PortKind, Position,
};
pub use layered::{build_layered_graph, LayeredGraphBuilder, LayoutConfig};
