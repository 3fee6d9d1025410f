//! Typed records parsed from model output.
//!
//! The model's JSON is mapped onto these structs immediately after it is
//! located, so nothing downstream handles untyped maps.

use serde::{Deserialize, Deserializer};

use crate::graph::normalize_entity;

use super::error::{ExtractionError, ExtractionResult};

/// One occurrence as emitted by the model.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OccurrenceRecord {
    #[serde(default, deserialize_with = "scalar_string")]
    pub time: String,
    #[serde(deserialize_with = "scalar_string")]
    pub relationship: String,
    #[serde(default, deserialize_with = "scalar_string")]
    pub event: String,
}

/// All occurrences the model reported for one entity pair.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RelationshipRecord {
    #[serde(rename = "E1", deserialize_with = "scalar_string")]
    pub e1: String,
    #[serde(rename = "E2", deserialize_with = "scalar_string")]
    pub e2: String,
    #[serde(rename = "R", default)]
    pub occurrences: Vec<OccurrenceRecord>,
}

/// A semantic label for an entity.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LabelRecord {
    #[serde(rename = "Label", deserialize_with = "scalar_string")]
    pub label: String,
    #[serde(rename = "Entity", deserialize_with = "scalar_string")]
    pub entity: String,
    #[serde(default, deserialize_with = "scalar_string")]
    pub time: String,
}

/// Relationships and labels extracted from one piece of text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedElements {
    pub relationships: Vec<RelationshipRecord>,
    pub labels: Vec<LabelRecord>,
}

#[derive(Deserialize)]
struct Payload {
    #[serde(rename = "R", default)]
    relationships: Vec<RelationshipRecord>,
    #[serde(rename = "L", default)]
    labels: Vec<LabelRecord>,
}

impl ExtractedElements {
    /// Map a located JSON value onto typed records.
    ///
    /// An object must carry `"R"` and/or `"L"`; a bare array is read as the
    /// relationship list. Records naming an empty entity are dropped.
    pub fn from_value(value: serde_json::Value) -> ExtractionResult<Self> {
        let schema = |e: serde_json::Error| ExtractionError::Schema {
            message: e.to_string(),
        };

        let mut elements = if value.is_array() {
            Self {
                relationships: serde_json::from_value(value).map_err(schema)?,
                labels: Vec::new(),
            }
        } else if let Some(map) = value.as_object() {
            if !map.contains_key("R") && !map.contains_key("L") {
                return Err(ExtractionError::Schema {
                    message: "object has neither \"R\" nor \"L\" key".into(),
                });
            }
            let payload: Payload = serde_json::from_value(value).map_err(schema)?;
            Self {
                relationships: payload.relationships,
                labels: payload.labels,
            }
        } else {
            return Err(ExtractionError::Schema {
                message: format!("expected object or array, got {value}"),
            });
        };

        elements.drop_unnamed();
        Ok(elements)
    }

    /// Parse a JSON string that is already isolated.
    pub fn from_json_str(json: &str) -> ExtractionResult<Self> {
        let value = serde_json::from_str(json).map_err(|e| ExtractionError::Schema {
            message: e.to_string(),
        })?;
        Self::from_value(value)
    }

    pub fn is_empty(&self) -> bool {
        self.relationships.is_empty() && self.labels.is_empty()
    }

    fn drop_unnamed(&mut self) {
        let before = (self.relationships.len(), self.labels.len());
        self.relationships
            .retain(|r| !normalize_entity(&r.e1).is_empty() && !normalize_entity(&r.e2).is_empty());
        self.labels
            .retain(|l| !normalize_entity(&l.entity).is_empty() && !l.label.trim().is_empty());
        let dropped_r = before.0 - self.relationships.len();
        let dropped_l = before.1 - self.labels.len();
        if dropped_r + dropped_l > 0 {
            tracing::warn!(dropped_r, dropped_l, "dropped extracted records with empty names");
        }
    }
}

/// Accept strings, numbers and booleans; models often emit `"time": 2024`.
fn scalar_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Bool(b) => Ok(b.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(D::Error::custom(format!(
            "expected a string, got {other}"
        ))),
    }
}
