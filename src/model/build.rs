use std::collections::HashMap;

use serde_json::Value;
use tracing::{info, warn};

use crate::error::{GraphError, GraphWarning};

use super::document::{Field, RawDocument, RawRelation, node_id_from_value, parse_document};
use super::graph::{Graph, Link, Node, NodeId};

const DEFAULT_WEIGHT: f64 = 1.0;

/// A built graph plus the non-fatal diagnostics gathered on the way.
#[derive(Clone, Debug)]
pub struct BuildReport {
    pub graph: Graph,
    pub warnings: Vec<GraphWarning>,
}

pub fn parse_graph(raw: &str) -> Result<BuildReport, GraphError> {
    let document: Value = serde_json::from_str(raw)?;
    build_graph(&document)
}

pub fn build_graph(document: &Value) -> Result<BuildReport, GraphError> {
    let RawDocument {
        characters,
        relations,
        summary,
        validation,
        mut warnings,
    } = parse_document(document)?;

    let mut nodes: Vec<Node> = Vec::with_capacity(characters.len());
    let mut index_by_id: HashMap<NodeId, usize> = HashMap::with_capacity(characters.len());

    for (record, character) in characters.into_iter().enumerate() {
        let id = character
            .id
            .as_ref()
            .and_then(node_id_from_value)
            .ok_or_else(|| GraphError::invalid(format!("character #{record} has no usable id")))?;

        let mut fields = FieldReader::new(format!("character {id}"), &mut warnings);
        let label = fields
            .value("common_name", character.common_name)
            .map(|name| name.trim().to_owned())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| id.to_string());

        let node = Node {
            id: id.clone(),
            label,
            is_main: fields
                .value("main_character", character.main_character)
                .unwrap_or(false),
            traits: fields.text_list("traits", character.traits),
            aliases: fields.text_list("names", character.names),
            description: fields
                .value("description", character.description)
                .unwrap_or_default(),
        };

        if let Some(&existing) = index_by_id.get(&id) {
            warn!(%id, "duplicate character id, keeping the later record");
            warnings.push(GraphWarning::DuplicateCharacter { id });
            nodes[existing] = node;
        } else {
            index_by_id.insert(id, nodes.len());
            nodes.push(node);
        }
    }

    let mut links = Vec::with_capacity(relations.len());
    for (record, relation) in relations.into_iter().enumerate() {
        let resolved = match relation {
            Some(relation) => resolve_relation(record, relation, &index_by_id, &mut warnings),
            None => Err(GraphWarning::MalformedRelation { relation: record }),
        };
        match resolved {
            Ok(link) => links.push(link),
            Err(warning) => {
                warn!("{warning}");
                warnings.push(warning);
            }
        }
    }

    info!(
        nodes = nodes.len(),
        links = links.len(),
        warnings = warnings.len(),
        "built character graph"
    );

    Ok(BuildReport {
        graph: Graph {
            nodes,
            links,
            index_by_id,
            summary,
            validation,
        },
        warnings,
    })
}

/// Unwraps optional fields of one record, recording a warning for every value
/// of the wrong type.
struct FieldReader<'a> {
    record: String,
    warnings: &'a mut Vec<GraphWarning>,
}

impl<'a> FieldReader<'a> {
    fn new(record: String, warnings: &'a mut Vec<GraphWarning>) -> Self {
        Self { record, warnings }
    }

    fn value<T>(&mut self, name: &'static str, field: Field<T>) -> Option<T> {
        match field {
            Field::Absent => None,
            Field::Present(value) => Some(value),
            Field::Mistyped(_) => {
                self.mistyped(name);
                None
            }
        }
    }

    /// Keeps the string entries of a list that also holds other values.
    fn text_list(&mut self, name: &'static str, field: Field<Vec<String>>) -> Vec<String> {
        match field {
            Field::Mistyped(Value::Array(items)) => {
                self.mistyped(name);
                items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::String(text) => Some(text),
                        _ => None,
                    })
                    .collect()
            }
            other => self.value(name, other).unwrap_or_default(),
        }
    }

    /// Numeric strings are read as numbers; anything else falls back to 1.0.
    fn weight(&mut self, field: Field<f64>) -> f64 {
        if let Field::Mistyped(Value::String(text)) = &field
            && let Ok(weight) = text.trim().parse::<f64>()
        {
            return weight;
        }
        self.value("weight", field).unwrap_or(DEFAULT_WEIGHT)
    }

    fn mistyped(&mut self, field: &'static str) {
        warn!(record = %self.record, field, "ignoring mistyped field");
        self.warnings.push(GraphWarning::MistypedField {
            record: self.record.clone(),
            field,
        });
    }
}

fn resolve_relation(
    record: usize,
    relation: RawRelation,
    index_by_id: &HashMap<NodeId, usize>,
    warnings: &mut Vec<GraphWarning>,
) -> Result<Link, GraphWarning> {
    let source_id = relation.id1.as_ref().and_then(node_id_from_value);
    let target_id = relation.id2.as_ref().and_then(node_id_from_value);

    let source = source_id.as_ref().and_then(|id| index_by_id.get(id).copied());
    let target = target_id.as_ref().and_then(|id| index_by_id.get(id).copied());

    let (Some(source_id), Some(target_id), Some(source), Some(target)) =
        (source_id.clone(), target_id.clone(), source, target)
    else {
        let describe = |id: &Option<NodeId>| {
            id.as_ref()
                .map(NodeId::to_string)
                .unwrap_or_else(|| "<missing>".to_owned())
        };
        let missing = if source.is_none() {
            describe(&source_id)
        } else {
            describe(&target_id)
        };
        return Err(GraphWarning::DanglingReference {
            relation: record,
            source_id: describe(&source_id),
            target_id: describe(&target_id),
            missing,
        });
    };

    let mut fields = FieldReader::new(format!("relation #{record}"), warnings);
    Ok(Link {
        source_id,
        target_id,
        weight: fields.weight(relation.weight),
        role_forward: fields
            .value("id1_to_id2_role", relation.id1_to_id2_role)
            .unwrap_or_default(),
        role_backward: fields
            .value("id2_to_id1_role", relation.id2_to_id1_role)
            .unwrap_or_default(),
        key_dialogs: fields.text_list("key_dialogs", relation.key_dialogs),
        source,
        target,
    })
}
