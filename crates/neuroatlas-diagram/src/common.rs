//! Shared types for layered path diagrams
//!
//! A diagram is a set of nodes arranged in layers (origins, via segments,
//! destinations) joined by links that always run from an `out` port to an
//! `in` port.

use std::collections::HashMap;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The role a layer plays in an origin → via → destination path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LayerKind {
    Origin,
    Via,
    Destination,
}

impl LayerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayerKind::Origin => "Origin",
            LayerKind::Via => "Via",
            LayerKind::Destination => "Destination",
        }
    }

    /// Whether nodes of this kind accept incoming links
    pub fn has_input(&self) -> bool {
        match self {
            LayerKind::Origin => false,
            LayerKind::Via | LayerKind::Destination => true,
        }
    }

    /// Whether nodes of this kind emit outgoing links
    pub fn has_output(&self) -> bool {
        match self {
            LayerKind::Origin | LayerKind::Via => true,
            LayerKind::Destination => false,
        }
    }

    /// Ports carried by a node of this kind, input first
    pub fn ports(&self) -> Vec<PortKind> {
        let mut ports = Vec::with_capacity(2);
        if self.has_input() {
            ports.push(PortKind::In);
        }
        if self.has_output() {
            ports.push(PortKind::Out);
        }
        ports
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Port direction on a diagram node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PortKind {
    In,
    Out,
}

impl PortKind {
    pub fn name(&self) -> &'static str {
        match self {
            PortKind::In => "in",
            PortKind::Out => "out",
        }
    }
}

/// Identity of a node: an entity id inside one layer.
///
/// The same entity appearing in two layers yields two distinct keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NodeKey {
    pub layer: usize,
    pub entity_id: String,
}

impl NodeKey {
    pub fn new(layer: usize, entity_id: impl Into<String>) -> Self {
        NodeKey {
            layer,
            entity_id: entity_id.into(),
        }
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}:{}", self.layer, self.entity_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// One side of an adjacency annotation ("connects to" / "connects from")
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Adjacency {
    pub name: String,
    pub kind: LayerKind,
}

/// Entity placed into a layer
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LayerEntity {
    pub id: String,
    pub name: String,
    pub uri: Option<String>,
}

impl LayerEntity {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        LayerEntity {
            id: id.into(),
            name: name.into(),
            uri: None,
        }
    }
}

/// A group of entities sharing one layer and one set of upstream entities
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LayerGroup {
    pub entities: Vec<LayerEntity>,
    /// Ids of the entities this group is reached from
    pub from_entities: Vec<String>,
    /// Display label of the segment type (e.g. "Axon terminal")
    pub anatomical_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DiagramNode {
    pub key: NodeKey,
    pub kind: LayerKind,
    pub name: String,
    pub uri: Option<String>,
    pub anatomical_type: Option<String>,
    pub position: Position,
    pub ports: Vec<PortKind>,
    /// Nodes linking into this one
    pub from: Vec<Adjacency>,
    /// Nodes this one links to
    pub to: Vec<Adjacency>,
    /// Ids of statements continuing the path from this node
    pub forward_connections: Vec<String>,
}

impl DiagramNode {
    pub fn has_port(&self, port: PortKind) -> bool {
        self.ports.contains(&port)
    }
}

/// Directed link between two nodes (indices into `DiagramModel::nodes`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DiagramLink {
    pub source: usize,
    pub source_port: PortKind,
    pub target: usize,
    pub target_port: PortKind,
}

impl DiagramLink {
    pub fn new(source: usize, target: usize) -> Self {
        DiagramLink {
            source,
            source_port: PortKind::Out,
            target,
            target_port: PortKind::In,
        }
    }
}

/// Finished diagram: nodes in creation order plus links
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DiagramModel {
    pub nodes: Vec<DiagramNode>,
    pub links: Vec<DiagramLink>,
}

impl DiagramModel {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Index of the node holding `entity_id` in `layer`
    pub fn find(&self, layer: usize, entity_id: &str) -> Option<usize> {
        self.nodes
            .iter()
            .position(|n| n.key.layer == layer && n.key.entity_id == entity_id)
    }

    /// Nodes of one layer, left to right
    pub fn layer(&self, layer: usize) -> Vec<&DiagramNode> {
        self.nodes.iter().filter(|n| n.key.layer == layer).collect()
    }

    /// Number of layers (highest layer index + 1)
    pub fn layer_count(&self) -> usize {
        self.nodes
            .iter()
            .map(|n| n.key.layer + 1)
            .max()
            .unwrap_or(0)
    }

    /// Outgoing neighbours of a node
    pub fn successors(&self, idx: usize) -> Vec<usize> {
        self.links
            .iter()
            .filter(|l| l.source == idx)
            .map(|l| l.target)
            .collect()
    }

    /// Incoming neighbours of a node
    pub fn predecessors(&self, idx: usize) -> Vec<usize> {
        self.links
            .iter()
            .filter(|l| l.target == idx)
            .map(|l| l.source)
            .collect()
    }

    /// Map from node key to node index
    pub fn key_index(&self) -> HashMap<&NodeKey, usize> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(idx, n)| (&n.key, idx))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_kind_ports() {
        assert_eq!(LayerKind::Origin.ports(), vec![PortKind::Out]);
        assert_eq!(LayerKind::Via.ports(), vec![PortKind::In, PortKind::Out]);
        assert_eq!(LayerKind::Destination.ports(), vec![PortKind::In]);
    }

    #[test]
    fn test_node_key_identity() {
        let a = NodeKey::new(1, "12");
        let b = NodeKey::new(2, "12");
        assert_ne!(a, b);
        assert_eq!(format!("{}", a), "L1:12");
        // "Via1" + "23" and "Via12" + "3" must not collide
        assert_ne!(NodeKey::new(1, "23"), NodeKey::new(12, "3"));
    }

    #[test]
    fn test_link_direction() {
        let link = DiagramLink::new(0, 1);
        assert_eq!(link.source_port, PortKind::Out);
        assert_eq!(link.target_port, PortKind::In);
    }
}
