use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::{GraphError, GraphWarning};

use super::graph::{NodeId, StoryValidation};

/// Optional field of an analysis record. A value of the wrong type is kept
/// raw so the builder can fall back to the default and say so.
#[derive(Clone, Debug, PartialEq)]
pub(super) enum Field<T> {
    Absent,
    Present(T),
    Mistyped(Value),
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Self::Absent
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Field<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        if value.is_null() {
            return Ok(Self::Absent);
        }
        Ok(match T::deserialize(&value) {
            Ok(typed) => Self::Present(typed),
            Err(_) => Self::Mistyped(value),
        })
    }
}

#[derive(Clone, Debug, Deserialize)]
pub(super) struct RawCharacter {
    #[serde(default)]
    pub(super) id: Option<Value>,
    #[serde(default)]
    pub(super) common_name: Field<String>,
    #[serde(default)]
    pub(super) main_character: Field<bool>,
    #[serde(default)]
    pub(super) traits: Field<Vec<String>>,
    #[serde(default)]
    pub(super) names: Field<Vec<String>>,
    #[serde(default)]
    pub(super) description: Field<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub(super) struct RawRelation {
    #[serde(default)]
    pub(super) id1: Option<Value>,
    #[serde(default)]
    pub(super) id2: Option<Value>,
    #[serde(default)]
    pub(super) weight: Field<f64>,
    #[serde(default)]
    pub(super) id1_to_id2_role: Field<String>,
    #[serde(default)]
    pub(super) id2_to_id1_role: Field<String>,
    #[serde(default)]
    pub(super) key_dialogs: Field<Vec<String>>,
}

#[derive(Clone, Debug, Deserialize)]
struct RawValidation {
    #[serde(default)]
    known_story: bool,
    #[serde(default)]
    issues: Vec<String>,
    #[serde(default)]
    notes: String,
    #[serde(default)]
    score: Option<f64>,
}

pub(super) struct RawDocument {
    pub(super) characters: Vec<RawCharacter>,
    /// `None` marks a relation record that is not an object.
    pub(super) relations: Vec<Option<RawRelation>>,
    pub(super) summary: String,
    pub(super) validation: Option<StoryValidation>,
    pub(super) warnings: Vec<GraphWarning>,
}

fn required_array<'a>(
    object: &'a Map<String, Value>,
    key: &str,
) -> Result<&'a [Value], GraphError> {
    match object.get(key) {
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(GraphError::invalid(format!("`{key}` must be an array"))),
        None => Err(GraphError::invalid(format!("`{key}` is missing"))),
    }
}

pub(super) fn parse_document(document: &Value) -> Result<RawDocument, GraphError> {
    let object = document
        .as_object()
        .ok_or_else(|| GraphError::invalid("document must be a JSON object"))?;

    let characters = required_array(object, "characters")?
        .iter()
        .enumerate()
        .map(|(index, value)| {
            if !value.is_object() {
                return Err(GraphError::invalid(format!(
                    "character #{index} is not an object"
                )));
            }
            RawCharacter::deserialize(value).map_err(|error| {
                GraphError::invalid(format!("character #{index} is malformed: {error}"))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let relations = required_array(object, "relations")?
        .iter()
        .enumerate()
        .map(|(index, value)| {
            if !value.is_object() {
                return Ok(None);
            }
            RawRelation::deserialize(value).map(Some).map_err(|error| {
                GraphError::invalid(format!("relation #{index} is malformed: {error}"))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut warnings = Vec::new();
    let mut mistyped = |field: &'static str| {
        warn!(field, "ignoring mistyped document field");
        warnings.push(GraphWarning::MistypedField {
            record: "document".to_owned(),
            field,
        });
    };

    let summary = match object.get("summary") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(_) => {
            mistyped("summary");
            String::new()
        }
    };

    let validation = match object.get("validation") {
        None | Some(Value::Null) => None,
        Some(value) => match RawValidation::deserialize(value) {
            Ok(raw) => Some(StoryValidation {
                known_story: raw.known_story,
                issues: raw.issues,
                notes: raw.notes,
                score: raw
                    .score
                    .filter(|score| score.is_finite())
                    .map(|score| score.round() as i64),
            }),
            Err(_) => {
                mistyped("validation");
                None
            }
        },
    };

    Ok(RawDocument {
        characters,
        relations,
        summary,
        validation,
        warnings,
    })
}

/// Character ids arrive as numbers or strings depending on the producer.
pub(super) fn node_id_from_value(value: &Value) -> Option<NodeId> {
    match value {
        Value::String(text) => {
            let text = text.trim();
            (!text.is_empty()).then(|| NodeId::new(text))
        }
        Value::Number(number) => {
            if let Some(integer) = number.as_i64() {
                Some(NodeId::new(integer.to_string()))
            } else if let Some(integer) = number.as_u64() {
                Some(NodeId::new(integer.to_string()))
            } else {
                let float = number.as_f64()?;
                if float.fract() == 0.0 && float.abs() < 9.0e15 {
                    Some(NodeId::new((float as i64).to_string()))
                } else {
                    Some(NodeId::new(float.to_string()))
                }
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn numeric_and_string_ids_normalise_alike() {
        assert_eq!(node_id_from_value(&json!(7)), Some(NodeId::new("7")));
        assert_eq!(node_id_from_value(&json!(7.0)), Some(NodeId::new("7")));
        assert_eq!(node_id_from_value(&json!(" 7 ")), Some(NodeId::new("7")));
        assert_eq!(node_id_from_value(&json!("")), None);
        assert_eq!(node_id_from_value(&json!(null)), None);
        assert_eq!(node_id_from_value(&json!([1])), None);
    }

    #[test]
    fn rejects_non_array_sections() {
        let missing = parse_document(&json!({ "characters": [] }));
        assert!(matches!(missing, Err(GraphError::InvalidInput { .. })));

        let wrong_shape = parse_document(&json!({ "characters": {}, "relations": [] }));
        assert!(matches!(wrong_shape, Err(GraphError::InvalidInput { .. })));

        let not_object = parse_document(&json!([1, 2, 3]));
        assert!(matches!(not_object, Err(GraphError::InvalidInput { .. })));
    }

    #[test]
    fn reads_optional_validation_block() {
        let raw = parse_document(&json!({
            "characters": [],
            "relations": [],
            "summary": "A tale.",
            "validation": { "known_story": true, "issues": ["x"], "notes": "ok", "score": 8 }
        }))
        .unwrap();

        assert_eq!(raw.summary, "A tale.");
        let validation = raw.validation.unwrap();
        assert!(validation.known_story);
        assert_eq!(validation.issues, vec!["x".to_owned()]);
        assert_eq!(validation.score, Some(8));
        assert!(raw.warnings.is_empty());
    }

    #[test]
    fn malformed_validation_block_is_reported() {
        let raw = parse_document(&json!({
            "characters": [],
            "relations": [],
            "summary": 12,
            "validation": { "known_story": "yes" }
        }))
        .unwrap();

        assert!(raw.summary.is_empty());
        assert!(raw.validation.is_none());
        assert_eq!(
            raw.warnings,
            vec![
                GraphWarning::MistypedField {
                    record: "document".to_owned(),
                    field: "summary",
                },
                GraphWarning::MistypedField {
                    record: "document".to_owned(),
                    field: "validation",
                },
            ]
        );
    }

    #[test]
    fn mistyped_field_keeps_raw_value() {
        let raw = parse_document(&json!({
            "characters": [{ "id": 1, "traits": ["brave", 3], "common_name": null }],
            "relations": [{ "id1": 1, "id2": 1, "weight": "8" }, 4]
        }))
        .unwrap();

        let character = &raw.characters[0];
        assert_eq!(character.traits, Field::Mistyped(json!(["brave", 3])));
        assert_eq!(character.common_name, Field::Absent);
        assert_eq!(character.names, Field::Absent);

        let relation = raw.relations[0].as_ref().unwrap();
        assert_eq!(relation.weight, Field::Mistyped(json!("8")));
        assert!(raw.relations[1].is_none());
    }
}
