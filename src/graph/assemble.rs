//! Fold extracted records into a [`MemoryGraph`].
//!
//! Entity names are deduplicated case-insensitively: the first spelling the
//! graph saw for a name wins, so "alice" from a later chunk lands on the
//! existing "Alice" edges and labels.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::extract::records::ExtractedElements;

use super::{EntityPair, MemoryGraph, Occurrence, normalize_entity};

/// How label records are merged into L.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LabelPolicy {
    /// Append every record.
    #[default]
    AppendOnly,
    /// Skip a record whose `(entity, label, time)` is already in L.
    Dedup,
}

/// Counts of what one [`GraphAssembler::assemble`] call changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssembleStats {
    pub occurrences: usize,
    pub new_pairs: usize,
    pub labels: usize,
    pub skipped_labels: usize,
}

/// Merges typed extraction output into the R/L structures of a graph.
pub struct GraphAssembler<'g> {
    graph: &'g mut MemoryGraph,
    policy: LabelPolicy,
    /// Lowercased normalized name -> spelling already used in the graph.
    aliases: HashMap<String, String>,
}

impl<'g> GraphAssembler<'g> {
    pub fn new(graph: &'g mut MemoryGraph, policy: LabelPolicy) -> Self {
        let aliases = graph
            .entities()
            .into_iter()
            .map(|name| (name.to_lowercase(), name.to_string()))
            .collect();
        Self {
            graph,
            policy,
            aliases,
        }
    }

    /// Resolve a raw entity name to the spelling used in the graph.
    pub fn resolve_entity(&mut self, raw: &str) -> String {
        let normalized = normalize_entity(raw);
        self.aliases
            .entry(normalized.to_lowercase())
            .or_insert(normalized)
            .clone()
    }

    /// Merge every record, in order.
    pub fn assemble(&mut self, elements: &ExtractedElements) -> AssembleStats {
        let mut stats = AssembleStats::default();

        for record in &elements.relationships {
            let e1 = self.resolve_entity(&record.e1);
            let e2 = self.resolve_entity(&record.e2);
            let pair = EntityPair::new(&e1, &e2);
            let is_new = self.graph.edge(&e1, &e2).is_none();

            for occ in &record.occurrences {
                self.graph.push_occurrence(
                    pair.clone(),
                    Occurrence::new(occ.time.trim(), occ.relationship.trim(), occ.event.trim()),
                );
                stats.occurrences += 1;
            }
            if is_new && !record.occurrences.is_empty() {
                stats.new_pairs += 1;
            }
        }

        for record in &elements.labels {
            let entity = self.resolve_entity(&record.entity);
            if self.policy == LabelPolicy::Dedup
                && self.graph.has_label(&entity, &record.label, &record.time)
            {
                stats.skipped_labels += 1;
                continue;
            }
            self.graph.add_label(&entity, &record.label, &record.time);
            stats.labels += 1;
        }

        tracing::debug!(
            occurrences = stats.occurrences,
            new_pairs = stats.new_pairs,
            labels = stats.labels,
            skipped_labels = stats.skipped_labels,
            "assembled extraction into memory graph"
        );
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn elements(json: &str) -> ExtractedElements {
        ExtractedElements::from_json_str(json).unwrap()
    }

    #[test]
    fn appends_occurrences_to_existing_pair() {
        let mut graph = MemoryGraph::new();
        graph.add_relationship("Alice", "Bob", "2024-01-01", "met", "Alice met Bob");

        let stats = GraphAssembler::new(&mut graph, LabelPolicy::AppendOnly).assemble(&elements(
            r#"{"R": [{"E1": "Bob", "E2": "Alice", "R": [{"time": "2024-02-01", "relationship": "met", "event": "again"}]}]}"#,
        ));

        assert_eq!(stats.occurrences, 1);
        assert_eq!(stats.new_pairs, 0);
        assert_eq!(graph.relationships().len(), 1);
        assert_eq!(graph.edge("Alice", "Bob").unwrap().occurrences.len(), 2);
    }

    #[test]
    fn entity_names_deduplicate_case_insensitively() {
        let mut graph = MemoryGraph::new();
        graph.add_label("Noa Middleton", "Person", "");

        GraphAssembler::new(&mut graph, LabelPolicy::AppendOnly).assemble(&elements(
            r#"{"R": [{"E1": "noa  middleton", "E2": "PARK", "R": [{"relationship": "trains at"}]}],
                "L": [{"Label": "Location", "Entity": "park"}]}"#,
        ));

        let edge = graph.edge("Noa Middleton", "PARK").unwrap();
        assert!(edge.pair().contains("Noa Middleton"));
        // The first spelling seen within the batch wins for new entities too.
        assert_eq!(graph.labels()[1].entity, "PARK");
        assert_eq!(graph.entities().len(), 2);
    }

    #[test]
    fn append_only_keeps_duplicate_labels() {
        let mut graph = MemoryGraph::new();
        let el = elements(r#"{"L": [{"Label": "Person", "Entity": "Alice", "time": "t"}]}"#);
        let mut asm = GraphAssembler::new(&mut graph, LabelPolicy::AppendOnly);
        asm.assemble(&el);
        asm.assemble(&el);
        assert_eq!(graph.labels().len(), 2);
    }

    #[test]
    fn dedup_policy_skips_known_labels() {
        let mut graph = MemoryGraph::new();
        let el = elements(
            r#"{"L": [
                {"Label": "Person", "Entity": "Alice", "time": "t"},
                {"Label": "Person", "Entity": "alice", "time": "t"},
                {"Label": "Person", "Entity": "Alice", "time": "t2"}
            ]}"#,
        );
        let stats = GraphAssembler::new(&mut graph, LabelPolicy::Dedup).assemble(&el);
        assert_eq!(stats.labels, 2);
        assert_eq!(stats.skipped_labels, 1);
        assert_eq!(graph.labels().len(), 2);
    }

    #[test]
    fn record_without_occurrences_adds_no_edge() {
        let mut graph = MemoryGraph::new();
        let stats = GraphAssembler::new(&mut graph, LabelPolicy::AppendOnly)
            .assemble(&elements(r#"{"R": [{"E1": "A", "E2": "B", "R": []}]}"#));
        assert_eq!(stats.new_pairs, 0);
        assert!(graph.relationships().is_empty());
    }

    #[test]
    fn policy_names_in_config_form() {
        let policy: LabelPolicy = serde_json::from_str("\"dedup\"").unwrap();
        assert_eq!(policy, LabelPolicy::Dedup);
        let policy: LabelPolicy = serde_json::from_str("\"append-only\"").unwrap();
        assert_eq!(policy, LabelPolicy::AppendOnly);
    }
}
