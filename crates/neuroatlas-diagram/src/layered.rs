//! Layered graph construction
//!
//! Builds the origin → via → destination diagram one layer at a time.
//! Origins occupy layer 0, each via group occupies the layer its order
//! assigns, and destinations occupy the layer after the deepest via.
//! Every upstream reference is resolved by scanning the earlier layers from
//! layer 0 upwards; the first node holding the referenced entity wins.

use super::common::{
    Adjacency, DiagramLink, DiagramModel, DiagramNode, LayerEntity, LayerGroup, LayerKind, NodeKey,
    Position,
};
use std::collections::{HashMap, HashSet};
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Placement constants for the emitted node positions
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LayoutConfig {
    /// Row of layer 0
    pub y_start: f64,
    /// Vertical distance between layers
    pub y_increment: f64,
    /// Horizontal distance between origin and via nodes
    pub x_increment: f64,
    pub origin_x_start: f64,
    pub via_x_start: f64,
    pub destination_x_start: f64,
    /// Destinations are spread wider than the other layers
    pub destination_x_increment: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            y_start: 50.0,
            y_increment: 250.0,
            x_increment: 250.0,
            origin_x_start: 100.0,
            via_x_start: 120.0,
            destination_x_start: 115.0,
            destination_x_increment: 500.0,
        }
    }
}

impl LayoutConfig {
    /// Row assigned to a layer
    pub fn row(&self, layer: usize) -> f64 {
        self.y_start + layer as f64 * self.y_increment
    }
}

/// Incremental builder for a layered diagram.
///
/// Via groups must be added before destinations: the destination layer is
/// fixed the first time a destination group is added.
pub struct LayeredGraphBuilder {
    config: LayoutConfig,
    nodes: Vec<DiagramNode>,
    links: Vec<DiagramLink>,
    index: HashMap<NodeKey, usize>,
    link_set: HashSet<(usize, usize)>,
    /// Next free x coordinate per layer
    cursors: HashMap<usize, f64>,
    /// Deepest layer holding via nodes (0 when there are none)
    deepest_via: usize,
    destination_layer: Option<usize>,
}

impl LayeredGraphBuilder {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            nodes: Vec::new(),
            links: Vec::new(),
            index: HashMap::new(),
            link_set: HashSet::new(),
            cursors: HashMap::new(),
            deepest_via: 0,
            destination_layer: None,
        }
    }

    /// Place origin entities on layer 0
    pub fn add_origins(&mut self, origins: &[LayerEntity]) {
        for entity in origins {
            self.place(0, LayerKind::Origin, entity, None);
        }
    }

    /// Place a via group with the given 0-based order on layer `order + 1`
    pub fn add_via_group(&mut self, order: usize, group: &LayerGroup) {
        let layer = order + 1;
        self.deepest_via = self.deepest_via.max(layer);
        self.add_group(layer, LayerKind::Via, group);
    }

    /// Place a destination group on the final layer
    pub fn add_destination_group(&mut self, group: &LayerGroup) {
        let layer = *self
            .destination_layer
            .get_or_insert(self.deepest_via + 1);
        self.add_group(layer, LayerKind::Destination, group);
    }

    /// Scan layers `0..before` in increasing order for a node holding `entity_id`
    pub fn find_in_prior_layers(&self, entity_id: &str, before: usize) -> Option<usize> {
        (0..before).find_map(|layer| {
            self.index
                .get(&NodeKey::new(layer, entity_id))
                .copied()
        })
    }

    /// Attach forward connection ids to the node holding `entity_id` in `layer`
    pub fn add_forward_connection(&mut self, layer: usize, entity_id: &str, statement_id: &str) {
        if let Some(&idx) = self.index.get(&NodeKey::new(layer, entity_id)) {
            let forward = &mut self.nodes[idx].forward_connections;
            if !forward.iter().any(|id| id == statement_id) {
                forward.push(statement_id.to_string());
            }
        }
    }

    /// Layer destinations were placed on, if any were added
    pub fn destination_layer(&self) -> Option<usize> {
        self.destination_layer
    }

    pub fn finish(self) -> DiagramModel {
        DiagramModel {
            nodes: self.nodes,
            links: self.links,
        }
    }

    fn add_group(&mut self, layer: usize, kind: LayerKind, group: &LayerGroup) {
        for entity in &group.entities {
            let target = self.place(layer, kind, entity, group.anatomical_type.clone());

            for from_id in &group.from_entities {
                match self.find_in_prior_layers(from_id, layer) {
                    Some(source) => self.link(source, target),
                    None => debug!(
                        "No upstream node for entity {} referenced by {} in layer {}",
                        from_id, entity.id, layer
                    ),
                }
            }
        }
    }

    fn place(
        &mut self,
        layer: usize,
        kind: LayerKind,
        entity: &LayerEntity,
        anatomical_type: Option<String>,
    ) -> usize {
        let key = NodeKey::new(layer, entity.id.clone());
        if let Some(&idx) = self.index.get(&key) {
            return idx;
        }

        let (x_start, x_step) = match kind {
            LayerKind::Origin => (self.config.origin_x_start, self.config.x_increment),
            LayerKind::Via => (self.config.via_x_start, self.config.x_increment),
            LayerKind::Destination => (
                self.config.destination_x_start,
                self.config.destination_x_increment,
            ),
        };
        let cursor = self.cursors.entry(layer).or_insert(x_start);
        let position = Position {
            x: *cursor,
            y: self.config.row(layer),
        };
        *cursor += x_step;

        let idx = self.nodes.len();
        self.nodes.push(DiagramNode {
            key: key.clone(),
            kind,
            name: entity.name.clone(),
            uri: entity.uri.clone(),
            anatomical_type,
            position,
            ports: kind.ports(),
            from: Vec::new(),
            to: Vec::new(),
            forward_connections: Vec::new(),
        });
        self.index.insert(key, idx);
        idx
    }

    fn link(&mut self, source: usize, target: usize) {
        if !self.link_set.insert((source, target)) {
            return;
        }
        self.links.push(DiagramLink::new(source, target));

        let (source_name, source_kind) = {
            let s = &self.nodes[source];
            (s.name.clone(), s.kind)
        };
        let (target_name, target_kind) = {
            let t = &self.nodes[target];
            (t.name.clone(), t.kind)
        };
        self.nodes[source].to.push(Adjacency {
            name: target_name,
            kind: target_kind,
        });
        self.nodes[target].from.push(Adjacency {
            name: source_name,
            kind: source_kind,
        });
    }
}

/// Build a complete diagram from origins, ordered via groups and destinations.
///
/// Via groups are placed in ascending order (stable for equal orders) so
/// every upstream layer exists before it is searched.
pub fn build_layered_graph(
    origins: &[LayerEntity],
    vias: &[(usize, LayerGroup)],
    destinations: &[LayerGroup],
    config: LayoutConfig,
) -> DiagramModel {
    let mut builder = LayeredGraphBuilder::new(config);
    builder.add_origins(origins);

    let mut ordered: Vec<&(usize, LayerGroup)> = vias.iter().collect();
    ordered.sort_by_key(|(order, _)| *order);
    for (order, group) in ordered {
        builder.add_via_group(*order, group);
    }

    for group in destinations {
        builder.add_destination_group(group);
    }

    builder.finish()
}
