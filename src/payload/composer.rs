//! Composer API statement pages
//!
//! A page is `{count, next, previous, results: [...]}`. Entities come either
//! as a simple entity or as a region/layer intersection; the latter is named
//! `"region (layer)"` and identified by `"regionUri (layerUri)"`.

use super::{decode, PayloadResult};
use crate::model::types::deserialize_id;
use crate::model::{
    AnatomicalEntity, BaseEntity, DestinationSegment, DestinationType, ForwardConnection,
    KnowledgeStatement, StatementMap, ViaSegment, ViaType,
};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{info, warn};

/// Treat an explicit `null` like a missing field
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComposerPage {
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<ComposerStatement>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OntologyTerm {
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub ontology_uri: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegionLayer {
    pub region: OntologyTerm,
    pub layer: OntologyTerm,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ComposerEntity {
    pub simple_entity: Option<OntologyTerm>,
    pub region_layer: Option<RegionLayer>,
    #[serde(deserialize_with = "nullable")]
    pub synonyms: String,
}

impl ComposerEntity {
    pub fn ontology_uri(&self) -> String {
        match (&self.region_layer, &self.simple_entity) {
            (Some(rl), _) => format!("{} ({})", rl.region.ontology_uri, rl.layer.ontology_uri),
            (None, Some(simple)) => simple.ontology_uri.clone(),
            (None, None) => String::new(),
        }
    }

    pub fn name(&self) -> String {
        match (&self.region_layer, &self.simple_entity) {
            (Some(rl), _) => format!("{} ({})", rl.region.name, rl.layer.name),
            (None, Some(simple)) => simple.name.clone(),
            (None, None) => String::new(),
        }
    }

    fn to_entity(&self) -> AnatomicalEntity {
        let uri = self.ontology_uri();
        let mut entity = AnatomicalEntity::new(uri.clone(), self.name());
        entity.synonyms = self.synonyms.clone();
        if !uri.is_empty() {
            entity.ontology_uri = Some(uri);
        }
        entity
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ComposerVia {
    #[serde(deserialize_with = "nullable")]
    pub order: usize,
    #[serde(rename = "type", deserialize_with = "nullable")]
    pub kind: ViaType,
    #[serde(deserialize_with = "nullable")]
    pub anatomical_entities: Vec<ComposerEntity>,
    #[serde(deserialize_with = "nullable")]
    pub from_entities: Vec<ComposerEntity>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ComposerDestination {
    #[serde(rename = "type", deserialize_with = "nullable")]
    pub kind: DestinationType,
    #[serde(deserialize_with = "nullable")]
    pub anatomical_entities: Vec<ComposerEntity>,
    #[serde(deserialize_with = "nullable")]
    pub from_entities: Vec<ComposerEntity>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ComposerForwardConnection {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub reference_uri: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub origins: Vec<ComposerEntity>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Provenance {
    pub uri: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ComposerStatement {
    pub reference_uri: Option<String>,
    pub phenotype: Option<OntologyTerm>,
    pub apinatomy_model: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub species: Vec<OntologyTerm>,
    #[serde(deserialize_with = "nullable")]
    pub origins: Vec<ComposerEntity>,
    #[serde(deserialize_with = "nullable")]
    pub vias: Vec<ComposerVia>,
    #[serde(deserialize_with = "nullable")]
    pub destinations: Vec<ComposerDestination>,
    #[serde(deserialize_with = "nullable")]
    pub forward_connection: Vec<ComposerForwardConnection>,
    #[serde(deserialize_with = "nullable")]
    pub provenances: Vec<Provenance>,
    pub knowledge_statement: Option<String>,
    pub statement_preview: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub journey: Vec<String>,
    pub laterality: Option<String>,
    pub projection: Option<String>,
    pub circuit_type: Option<String>,
    pub sex: Option<OntologyTerm>,
}

fn entities(list: &[ComposerEntity]) -> Vec<AnatomicalEntity> {
    list.iter().map(ComposerEntity::to_entity).collect()
}

fn term_entity(term: &OntologyTerm) -> BaseEntity {
    BaseEntity::new(term.ontology_uri.clone(), term.name.clone())
}

impl ComposerStatement {
    /// Statement id used across the atlas (`reference_uri`)
    pub fn statement_id(&self) -> Option<&str> {
        self.reference_uri.as_deref().filter(|uri| !uri.is_empty())
    }

    pub fn to_statement(&self) -> Option<KnowledgeStatement> {
        let id = self.statement_id()?;
        Some(KnowledgeStatement {
            id: id.to_string(),
            phenotype: self
                .phenotype
                .as_ref()
                .map(|p| p.name.clone())
                .unwrap_or_default(),
            apinatomy: self.apinatomy_model.clone().unwrap_or_default(),
            species: self.species.iter().map(term_entity).collect(),
            origins: entities(&self.origins),
            vias: self
                .vias
                .iter()
                .map(|via| ViaSegment {
                    order: via.order,
                    kind: via.kind,
                    anatomical_entities: entities(&via.anatomical_entities),
                    from_entities: entities(&via.from_entities),
                })
                .collect(),
            destinations: self
                .destinations
                .iter()
                .map(|dest| DestinationSegment {
                    kind: dest.kind,
                    anatomical_entities: entities(&dest.anatomical_entities),
                    from_entities: entities(&dest.from_entities),
                })
                .collect(),
            forward_connections: self
                .forward_connection
                .iter()
                .map(|fc| ForwardConnection {
                    id: fc.reference_uri.clone().unwrap_or_else(|| fc.id.clone()),
                    origin_ids: fc.origins.iter().map(ComposerEntity::ontology_uri).collect(),
                })
                .collect(),
            provenances: self
                .provenances
                .iter()
                .map(|p| p.uri.clone().unwrap_or_default())
                .collect(),
            knowledge_statement: self.knowledge_statement.clone().unwrap_or_default(),
            statement_preview: self.statement_preview.clone().unwrap_or_default(),
            journey: self.journey.clone(),
            laterality: self.laterality.clone().unwrap_or_default(),
            projection: self.projection.clone().unwrap_or_default(),
            circuit_type: self.circuit_type.clone().unwrap_or_default(),
            sex: self.sex.as_ref().map(term_entity),
        })
    }
}

impl ComposerPage {
    /// Convert every statement with a reference uri, in page order
    pub fn into_statements(self) -> StatementMap {
        let mut statements = StatementMap::with_capacity(self.results.len());
        for raw in &self.results {
            match raw.to_statement() {
                Some(statement) => {
                    statements.insert(statement.id.clone(), statement);
                }
                None => warn!("Skipping composer statement without reference_uri"),
            }
        }
        statements
    }
}

pub fn parse_composer_page(input: &str) -> PayloadResult<ComposerPage> {
    decode(input, "composer page")
}

/// Decode a statement collection: either a composer page or a native map of
/// statement id → statement
pub fn parse_statements(input: &str) -> PayloadResult<StatementMap> {
    let document: Value = serde_json::from_str(input)?;
    let is_page = document
        .get("results")
        .map(Value::is_array)
        .unwrap_or(false);

    let statements = if is_page {
        parse_composer_page(input)?.into_statements()
    } else {
        decode::<StatementMap>(input, "statement map")?
    };
    info!("Decoded {} knowledge statements", statements.len());
    Ok(statements)
}
