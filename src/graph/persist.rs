//! JSON persistence for the memory graph.
//!
//! The on-disk document is `{"R": [{E1, E2, R: [...]}], "L": [{Label, Entity, time}]}`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PersistError;

use super::{EntityPair, LabelEntry, MemoryGraph, RelationshipEdge};

/// Serialized form of a [`MemoryGraph`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    #[serde(rename = "R", default)]
    pub relationships: Vec<RelationshipEdge>,
    #[serde(rename = "L", default)]
    pub labels: Vec<LabelEntry>,
}

impl From<&MemoryGraph> for GraphDocument {
    fn from(graph: &MemoryGraph) -> Self {
        Self {
            relationships: graph.relationships().to_vec(),
            labels: graph.labels().to_vec(),
        }
    }
}

impl TryFrom<GraphDocument> for MemoryGraph {
    type Error = PersistError;

    /// Rebuild a graph, re-canonicalizing pairs so duplicates in hand-edited
    /// files merge into one edge.
    ///
    /// Every edge carries at least one occurrence, so an entry with an empty
    /// `"R"` list is rejected.
    fn try_from(doc: GraphDocument) -> Result<Self, Self::Error> {
        let mut graph = MemoryGraph::new();
        for edge in doc.relationships {
            if edge.occurrences.is_empty() {
                return Err(PersistError::Malformed {
                    message: format!("pair ({}, {}) has no occurrences", edge.e1, edge.e2),
                });
            }
            let pair = EntityPair::new(&edge.e1, &edge.e2);
            for occurrence in edge.occurrences {
                graph.push_occurrence(pair.clone(), occurrence);
            }
        }
        for entry in doc.labels {
            graph.add_label(&entry.entity, &entry.label, &entry.time);
        }
        Ok(graph)
    }
}

impl MemoryGraph {
    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, PersistError> {
        serde_json::to_string_pretty(&GraphDocument::from(self)).map_err(|e| {
            PersistError::Serialize {
                message: e.to_string(),
            }
        })
    }

    /// Parse a graph from its JSON document form.
    pub fn from_json(json: &str) -> Result<Self, PersistError> {
        let doc: GraphDocument =
            serde_json::from_str(json).map_err(|e| PersistError::Malformed {
                message: e.to_string(),
            })?;
        doc.try_into()
    }

    /// Write the graph to `path`, creating parent directories as needed.
    pub fn save_json(&self, path: &Path) -> Result<(), PersistError> {
        let json = self.to_json()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| PersistError::Io {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, json).map_err(|e| PersistError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        tracing::info!(
            path = %path.display(),
            pairs = self.relationships().len(),
            labels = self.labels().len(),
            "saved memory graph JSON"
        );
        Ok(())
    }

    /// Read a graph previously written by [`MemoryGraph::save_json`].
    pub fn load_json(path: &Path) -> Result<Self, PersistError> {
        let content = std::fs::read_to_string(path).map_err(|e| PersistError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_json(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MemoryGraph {
        let mut g = MemoryGraph::new();
        g.add_relationship("Alice", "Bob", "2024-01", "met", "Alice met Bob at a conference.");
        g.add_relationship("Bob", "Alice", "2025-03", "collaborated with", "They collaborated.");
        g.add_relationship("Noa Middleton", "Park", "2025-09-13", "teaches at", "Noa coaches parkour.");
        g.add_label("Noa Middleton", "Instructor", "2025-09-13");
        g.add_label("Park", "Location", "");
        g.add_label("Noa Middleton", "Instructor", "2025-09-13");
        g
    }

    #[test]
    fn document_uses_expected_keys() {
        let json = sample().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let first = &value["R"][0];
        assert_eq!(first["E1"], "Alice");
        assert_eq!(first["E2"], "Bob");
        assert_eq!(first["R"][1]["relationship"], "collaborated with");
        assert_eq!(value["L"][0]["Label"], "Instructor");
        assert_eq!(value["L"][0]["Entity"], "Noa Middleton");
        assert_eq!(value["L"][0]["time"], "2025-09-13");
    }

    #[test]
    fn file_roundtrip_preserves_pairs_occurrences_and_labels() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("out").join("graph.json");
        let original = sample();
        original.save_json(&path).unwrap();

        let loaded = MemoryGraph::load_json(&path).unwrap();
        assert_eq!(loaded.relationships(), original.relationships());
        assert_eq!(loaded.labels(), original.labels());
        assert_eq!(loaded.labels().len(), 3);
    }

    #[test]
    fn empty_graph_serializes_empty_arrays() {
        let json = MemoryGraph::new().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["R"], serde_json::json!([]));
        assert_eq!(value["L"], serde_json::json!([]));
    }

    #[test]
    fn loading_merges_duplicate_pairs() {
        let json = r#"{
            "R": [
                {"E1": "Bob", "E2": "Alice", "R": [{"time": "1", "relationship": "met", "event": "a"}]},
                {"E1": "Alice", "E2": "Bob", "R": [{"time": "2", "relationship": "left", "event": "b"}]}
            ]
        }"#;
        let g = MemoryGraph::from_json(json).unwrap();
        assert_eq!(g.relationships().len(), 1);
        assert_eq!(g.edge("Alice", "Bob").unwrap().occurrences.len(), 2);
        assert!(g.labels().is_empty());
    }

    #[test]
    fn edge_without_occurrences_is_rejected() {
        let json = r#"{"R": [{"E1": "Alice", "E2": "Bob", "R": []}], "L": []}"#;
        let err = MemoryGraph::from_json(json).unwrap_err();
        match err {
            PersistError::Malformed { message } => assert!(message.contains("(Alice, Bob)")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn malformed_document_is_rejected() {
        let err = MemoryGraph::from_json(r#"{"R": "nope"}"#).unwrap_err();
        assert!(matches!(err, PersistError::Malformed { .. }));
    }
}
