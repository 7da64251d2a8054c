//! Path diagram module
//!
//! Layout lives in the `neuroatlas-diagram` crate, which knows nothing about
//! knowledge statements. This module maps statement segments onto its layer
//! groups.

use crate::model::{
    AnatomicalEntity, DestinationSegment, ForwardConnection, KnowledgeStatement, ViaSegment,
};
use tracing::debug;

pub use neuroatlas_diagram::{
    build_layered_graph, Adjacency, DiagramLink, DiagramModel, DiagramNode, LayerEntity,
    LayerGroup, LayerKind, LayeredGraphBuilder, LayoutConfig, NodeKey, PortKind, Position,
};

fn layer_entity(entity: &AnatomicalEntity) -> LayerEntity {
    LayerEntity {
        id: entity.id.clone(),
        name: entity.name.clone(),
        uri: entity.ontology_uri.clone(),
    }
}

fn layer_group(
    entities: &[AnatomicalEntity],
    from_entities: &[AnatomicalEntity],
    anatomical_type: &str,
) -> LayerGroup {
    LayerGroup {
        entities: entities.iter().map(layer_entity).collect(),
        from_entities: from_entities.iter().map(|e| e.id.clone()).collect(),
        anatomical_type: Some(anatomical_type.to_string()),
    }
}

/// Build the path diagram with the default layout
pub fn build_graph(
    origins: &[AnatomicalEntity],
    vias: &[ViaSegment],
    destinations: &[DestinationSegment],
) -> DiagramModel {
    build_graph_with(origins, vias, destinations, &[], &LayoutConfig::default())
}

/// Build the path diagram, attaching `forward` statements to the destination
/// nodes their origins name
pub fn build_graph_with(
    origins: &[AnatomicalEntity],
    vias: &[ViaSegment],
    destinations: &[DestinationSegment],
    forward: &[ForwardConnection],
    config: &LayoutConfig,
) -> DiagramModel {
    let mut builder = LayeredGraphBuilder::new(config.clone());

    let origin_entities: Vec<LayerEntity> = origins.iter().map(layer_entity).collect();
    builder.add_origins(&origin_entities);

    let mut ordered: Vec<&ViaSegment> = vias.iter().collect();
    ordered.sort_by_key(|via| via.order);
    for via in ordered {
        let group = layer_group(&via.anatomical_entities, &via.from_entities, via.kind.label());
        builder.add_via_group(via.order, &group);
    }

    for destination in destinations {
        let group = layer_group(
            &destination.anatomical_entities,
            &destination.from_entities,
            destination.kind.label(),
        );
        builder.add_destination_group(&group);
    }

    if let Some(layer) = builder.destination_layer() {
        for connection in forward {
            for origin_id in &connection.origin_ids {
                builder.add_forward_connection(layer, origin_id, &connection.id);
            }
        }
    }

    let model = builder.finish();
    debug!(
        "Diagram built: {} nodes, {} links over {} layers",
        model.node_count(),
        model.link_count(),
        model.layer_count()
    );
    model
}

/// Diagram for one statement, forward connections included
pub fn statement_diagram(statement: &KnowledgeStatement, config: &LayoutConfig) -> DiagramModel {
    build_graph_with(
        &statement.origins,
        &statement.vias,
        &statement.destinations,
        &statement.forward_connections,
        config,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DestinationType, ViaType};

    fn entity(id: &str) -> AnatomicalEntity {
        AnatomicalEntity::new(id, id.to_uppercase())
    }

    fn via(order: usize, ids: &[&str], from: &[&str]) -> ViaSegment {
        ViaSegment {
            order,
            kind: ViaType::Axon,
            anatomical_entities: ids.iter().map(|id| entity(id)).collect(),
            from_entities: from.iter().map(|id| entity(id)).collect(),
        }
    }

    fn destination(ids: &[&str], from: &[&str]) -> DestinationSegment {
        DestinationSegment {
            kind: DestinationType::AxonTerminal,
            anatomical_entities: ids.iter().map(|id| entity(id)).collect(),
            from_entities: from.iter().map(|id| entity(id)).collect(),
        }
    }

    #[test]
    fn test_chain_with_annotations() {
        let model = build_graph(
            &[entity("a").with_uri("http://example.org/a")],
            &[via(0, &["b"], &["a"])],
            &[destination(&["c"], &["b"])],
        );

        assert_eq!(model.node_count(), 3);
        assert_eq!(model.link_count(), 2);

        let a = model.find(0, "a").unwrap();
        let b = model.find(1, "b").unwrap();
        let c = model.find(2, "c").unwrap();
        assert_eq!(model.successors(a), vec![b]);
        assert_eq!(model.successors(b), vec![c]);

        assert_eq!(model.nodes[a].uri.as_deref(), Some("http://example.org/a"));
        assert_eq!(model.nodes[b].anatomical_type.as_deref(), Some("Axon"));
        assert_eq!(model.nodes[c].anatomical_type.as_deref(), Some("Axon terminal"));
        assert_eq!(model.nodes[c].from[0].name, "B");
        assert_eq!(model.nodes[c].from[0].kind, LayerKind::Via);
    }

    #[test]
    fn test_vias_sorted_before_placement() {
        let model = build_graph(
            &[entity("a")],
            &[via(1, &["c"], &["b"]), via(0, &["b"], &["a"])],
            &[destination(&["d"], &["c"])],
        );
        assert_eq!(model.link_count(), 3);
        assert!(model.find(3, "d").is_some());
    }

    #[test]
    fn test_forward_connections_on_destinations() {
        let mut statement = KnowledgeStatement::new("ks1");
        statement.origins = vec![entity("a")];
        statement.destinations = vec![destination(&["c"], &["a"])];
        statement.forward_connections = vec![
            ForwardConnection {
                id: "ks2".to_string(),
                origin_ids: vec!["c".to_string()],
            },
            ForwardConnection {
                id: "ks3".to_string(),
                origin_ids: vec!["z".to_string()],
            },
        ];

        let model = statement_diagram(&statement, &LayoutConfig::default());
        let c = model.find(1, "c").unwrap();
        assert_eq!(model.nodes[c].forward_connections, vec!["ks2"]);
    }
}
