//! Memory graph: the relationship graph `R` and the label dictionary `L`.
//!
//! - **R** maps an unordered entity pair to a relationship edge carrying a
//!   time-ordered sequence of occurrences. Each pair appears at most once.
//! - **L** is an append-only list of `(label, entity, time)` entries.
//!
//! Entities have no table of their own; they are the normalized names used
//! as keys in R and L.

pub mod assemble;
pub mod builder;
pub mod persist;

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// Normalize an entity name: trim and collapse internal whitespace.
pub fn normalize_entity(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Unordered entity pair, stored with the two normalized names sorted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityPair {
    first: String,
    second: String,
}

impl EntityPair {
    /// Build the canonical key for `(a, b)`; `(b, a)` yields the same key.
    pub fn new(a: &str, b: &str) -> Self {
        let a = normalize_entity(a);
        let b = normalize_entity(b);
        if a <= b {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        }
    }

    pub fn first(&self) -> &str {
        &self.first
    }

    pub fn second(&self) -> &str {
        &self.second
    }

    /// Whether `entity` is one end of this pair.
    pub fn contains(&self, entity: &str) -> bool {
        self.first == entity || self.second == entity
    }
}

impl std::fmt::Display for EntityPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.first, self.second)
    }
}

/// One timestamped occurrence of a relationship between two entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    /// Free-form time as given by the narrative ("2024-01", "spring 2023").
    #[serde(default)]
    pub time: String,
    /// Relationship label ("met", "works with").
    pub relationship: String,
    /// Supporting event text.
    #[serde(default)]
    pub event: String,
}

impl Occurrence {
    pub fn new(
        time: impl Into<String>,
        relationship: impl Into<String>,
        event: impl Into<String>,
    ) -> Self {
        Self {
            time: time.into(),
            relationship: relationship.into(),
            event: event.into(),
        }
    }
}

/// All occurrences recorded for one entity pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipEdge {
    #[serde(rename = "E1")]
    pub e1: String,
    #[serde(rename = "E2")]
    pub e2: String,
    /// Occurrences in append (narrative) order.
    #[serde(rename = "R")]
    pub occurrences: Vec<Occurrence>,
}

impl RelationshipEdge {
    pub fn pair(&self) -> EntityPair {
        EntityPair::new(&self.e1, &self.e2)
    }

    /// The most recently appended occurrence.
    pub fn latest(&self) -> Option<&Occurrence> {
        self.occurrences.last()
    }
}

/// A role an entity held at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LabelEntry {
    #[serde(rename = "Label")]
    pub label: String,
    #[serde(rename = "Entity")]
    pub entity: String,
    #[serde(default)]
    pub time: String,
}

/// Labels collected for a single entity, in the order they were added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityLabels {
    pub entity: String,
    /// `(label, time)` pairs.
    pub labels: Vec<(String, String)>,
}

/// The accumulated R graph and L dictionary of one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct MemoryGraph {
    edges: Vec<RelationshipEdge>,
    index: HashMap<EntityPair, usize>,
    labels: Vec<LabelEntry>,
}

impl MemoryGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `e1` and `e2` had `relationship` at `time`.
    ///
    /// Appends to the existing edge for the unordered pair, or creates a new
    /// edge with a single occurrence.
    pub fn add_relationship(
        &mut self,
        e1: &str,
        e2: &str,
        time: &str,
        relationship: &str,
        event_text: &str,
    ) {
        self.push_occurrence(EntityPair::new(e1, e2), Occurrence::new(time, relationship, event_text));
    }

    pub(crate) fn push_occurrence(&mut self, pair: EntityPair, occurrence: Occurrence) {
        match self.index.get(&pair) {
            Some(&idx) => self.edges[idx].occurrences.push(occurrence),
            None => {
                self.index.insert(pair.clone(), self.edges.len());
                self.edges.push(RelationshipEdge {
                    e1: pair.first,
                    e2: pair.second,
                    occurrences: vec![occurrence],
                });
            }
        }
    }

    /// Append a label entry. No deduplication.
    pub fn add_label(&mut self, entity: &str, label: &str, time: &str) {
        self.labels.push(LabelEntry {
            label: label.trim().to_string(),
            entity: normalize_entity(entity),
            time: time.trim().to_string(),
        });
    }

    /// Relationship edges in creation order.
    pub fn relationships(&self) -> &[RelationshipEdge] {
        &self.edges
    }

    /// Label entries in append order.
    pub fn labels(&self) -> &[LabelEntry] {
        &self.labels
    }

    /// Look up the edge for an unordered pair.
    pub fn edge(&self, a: &str, b: &str) -> Option<&RelationshipEdge> {
        self.index
            .get(&EntityPair::new(a, b))
            .map(|&idx| &self.edges[idx])
    }

    /// Whether a label entry with exactly these fields exists.
    pub fn has_label(&self, entity: &str, label: &str, time: &str) -> bool {
        let entity = normalize_entity(entity);
        self.labels
            .iter()
            .any(|l| l.entity == entity && l.label == label.trim() && l.time == time.trim())
    }

    /// Every entity named in R or L, in order of first appearance.
    pub fn entities(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        let names = self
            .edges
            .iter()
            .flat_map(|e| [e.e1.as_str(), e.e2.as_str()])
            .chain(self.labels.iter().map(|l| l.entity.as_str()));
        for name in names {
            if seen.insert(name) {
                out.push(name);
            }
        }
        out
    }

    /// Total number of occurrences across all edges.
    pub fn occurrence_count(&self) -> usize {
        self.edges.iter().map(|e| e.occurrences.len()).sum()
    }

    /// True when both R and L are empty.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty() && self.labels.is_empty()
    }

    /// Group L by entity, entities in order of first label.
    pub fn label_dictionary(&self) -> Vec<EntityLabels> {
        let mut positions: HashMap<&str, usize> = HashMap::new();
        let mut out: Vec<EntityLabels> = Vec::new();
        for entry in &self.labels {
            let idx = *positions.entry(entry.entity.as_str()).or_insert_with(|| {
                out.push(EntityLabels {
                    entity: entry.entity.clone(),
                    labels: Vec::new(),
                });
                out.len() - 1
            });
            out[idx]
                .labels
                .push((entry.label.clone(), entry.time.clone()));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_is_unordered() {
        assert_eq!(EntityPair::new("Alice", "Bob"), EntityPair::new("Bob", "Alice"));
        let pair = EntityPair::new("Bob", "Alice");
        assert_eq!(pair.first(), "Alice");
        assert_eq!(pair.second(), "Bob");
    }

    #[test]
    fn pair_normalizes_whitespace() {
        assert_eq!(
            EntityPair::new("  Noa   Middleton ", "Park"),
            EntityPair::new("Park", "Noa Middleton")
        );
    }

    #[test]
    fn reversed_pair_merges_in_call_order() {
        let mut g = MemoryGraph::new();
        g.add_relationship("Alice", "Bob", "2024-01", "met", "Alice met Bob.");
        g.add_relationship("Bob", "Alice", "2024-02", "argued", "Bob argued with Alice.");
        g.add_relationship("Alice", "Bob", "2024-03", "reconciled", "They made up.");

        assert_eq!(g.relationships().len(), 1);
        let edge = g.edge("Bob", "Alice").unwrap();
        let rels: Vec<&str> = edge
            .occurrences
            .iter()
            .map(|o| o.relationship.as_str())
            .collect();
        assert_eq!(rels, ["met", "argued", "reconciled"]);
        assert_eq!(edge.latest().unwrap().time, "2024-03");
    }

    #[test]
    fn distinct_pairs_get_distinct_edges() {
        let mut g = MemoryGraph::new();
        g.add_relationship("Alice", "Bob", "t1", "met", "");
        g.add_relationship("Alice", "Carol", "t1", "met", "");
        g.add_relationship("Carol", "Bob", "t2", "met", "");
        assert_eq!(g.relationships().len(), 3);
        assert_eq!(g.occurrence_count(), 3);
    }

    #[test]
    fn labels_are_append_only() {
        let mut g = MemoryGraph::new();
        for _ in 0..3 {
            g.add_label("Alice", "Person", "2024-01");
        }
        g.add_label("Park", "Location", "");
        assert_eq!(g.labels().len(), 4);
        assert!(g.has_label(" Alice ", "Person", "2024-01"));
        assert!(!g.has_label("Alice", "Location", ""));
    }

    #[test]
    fn entities_in_first_appearance_order() {
        let mut g = MemoryGraph::new();
        g.add_relationship("Bob", "Alice", "", "met", "");
        g.add_label("Park", "Location", "");
        g.add_label("Alice", "Person", "");
        assert_eq!(g.entities(), ["Alice", "Bob", "Park"]);
    }

    #[test]
    fn label_dictionary_groups_by_entity() {
        let mut g = MemoryGraph::new();
        g.add_label("Alice", "Person", "2024-01");
        g.add_label("Park", "Location", "");
        g.add_label("Alice", "Student", "2024-01");

        let dict = g.label_dictionary();
        assert_eq!(dict.len(), 2);
        assert_eq!(dict[0].entity, "Alice");
        assert_eq!(
            dict[0].labels,
            vec![
                ("Person".to_string(), "2024-01".to_string()),
                ("Student".to_string(), "2024-01".to_string())
            ]
        );
        assert_eq!(dict[1].entity, "Park");
    }

    #[test]
    fn empty_graph() {
        let g = MemoryGraph::new();
        assert!(g.is_empty());
        assert!(g.entities().is_empty());
        assert!(g.edge("A", "B").is_none());
    }
}
