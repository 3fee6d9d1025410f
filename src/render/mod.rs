//! Presentation of a memory graph: an image of R and text listings of L.
//!
//! R is projected onto a petgraph [`UnGraph`] (one node per entity, one edge
//! per pair) and written both as DOT and as a standalone SVG with a
//! deterministic circular layout. Rendering never mutates the graph.

pub mod svg;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use petgraph::dot::{Config, Dot};
use petgraph::graph::{NodeIndex, UnGraph};
use serde::{Deserialize, Serialize};

use crate::error::RenderError;
use crate::graph::{LabelEntry, MemoryGraph};

/// Edge weight: what happened between one pair of entities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairSummary {
    /// Number of occurrences on the edge.
    pub count: usize,
    /// Relationship labels in occurrence order.
    pub relationships: Vec<String>,
    /// Time of the latest occurrence.
    pub latest_time: String,
}

impl std::fmt::Display for PairSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let last = self.relationships.last().map(String::as_str).unwrap_or("");
        if self.latest_time.is_empty() {
            write!(f, "{}x {}", self.count, last)
        } else {
            write!(f, "{}x {}: {}", self.count, self.latest_time, last)
        }
    }
}

/// Project R onto an undirected petgraph graph.
pub fn relationship_graph(graph: &MemoryGraph) -> UnGraph<String, PairSummary> {
    let mut g = UnGraph::new_undirected();
    let mut nodes: HashMap<&str, NodeIndex> = HashMap::new();

    for edge in graph.relationships() {
        let a = *nodes
            .entry(edge.e1.as_str())
            .or_insert_with(|| g.add_node(edge.e1.clone()));
        let b = *nodes
            .entry(edge.e2.as_str())
            .or_insert_with(|| g.add_node(edge.e2.clone()));
        let summary = PairSummary {
            count: edge.occurrences.len(),
            relationships: edge
                .occurrences
                .iter()
                .map(|o| o.relationship.clone())
                .collect(),
            latest_time: edge.latest().map(|o| o.time.clone()).unwrap_or_default(),
        };
        g.add_edge(a, b, summary);
    }
    g
}

/// Paths of the files written by [`visualize_r`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedGraph {
    pub svg: PathBuf,
    pub dot: PathBuf,
}

/// Write `<title>.svg` and `<title>.dot` for R into `out_dir`.
///
/// Spaces in the title become underscores in the file names. An empty R
/// still produces a placeholder image.
pub fn visualize_r(
    graph: &MemoryGraph,
    out_dir: &Path,
    title: &str,
) -> Result<RenderedGraph, RenderError> {
    let g = relationship_graph(graph);

    std::fs::create_dir_all(out_dir).map_err(|e| RenderError::Io {
        path: out_dir.display().to_string(),
        source: e,
    })?;

    let stem = title.replace(' ', "_");
    let svg_path = out_dir.join(format!("{stem}.svg"));
    let dot_path = out_dir.join(format!("{stem}.dot"));

    write_file(&svg_path, &svg::render_svg(&g, title))?;
    write_file(&dot_path, &render_dot(&g))?;

    tracing::info!(
        path = %svg_path.display(),
        nodes = g.node_count(),
        edges = g.edge_count(),
        "saved graph visualization"
    );
    Ok(RenderedGraph {
        svg: svg_path,
        dot: dot_path,
    })
}

/// DOT source for the projected graph.
pub fn render_dot(g: &UnGraph<String, PairSummary>) -> String {
    let body = Dot::with_config(g, &[Config::GraphContentOnly]);
    format!("graph memory {{\n{body}}}\n")
}

fn write_file(path: &Path, content: &str) -> Result<(), RenderError> {
    std::fs::write(path, content).map_err(|e| RenderError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

/// How [`summarize_l`] groups label entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelGrouping {
    #[default]
    Entity,
    Time,
}

impl FromStr for LabelGrouping {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "entity" => Ok(Self::Entity),
            "time" => Ok(Self::Time),
            other => Err(format!("unknown grouping \"{other}\" (expected entity or time)")),
        }
    }
}

/// Human-readable listing of L, groups in order of first appearance.
pub fn summarize_l(labels: &[LabelEntry], grouping: LabelGrouping) -> String {
    if labels.is_empty() {
        return "L dictionary is empty.\n".to_string();
    }

    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<&LabelEntry>> = HashMap::new();
    for entry in labels {
        let key = match grouping {
            LabelGrouping::Entity => entry.entity.as_str(),
            LabelGrouping::Time => entry.time.as_str(),
        };
        groups
            .entry(key)
            .or_insert_with(|| {
                order.push(key);
                Vec::new()
            })
            .push(entry);
    }

    let mut out = String::new();
    for key in order {
        let heading = if key.is_empty() { "(no time)" } else { key };
        out.push_str(heading);
        out.push_str(":\n");
        for entry in &groups[key] {
            match grouping {
                LabelGrouping::Entity if entry.time.is_empty() => {
                    out.push_str(&format!("  - {}\n", entry.label));
                }
                LabelGrouping::Entity => {
                    out.push_str(&format!("  - {} (time: {})\n", entry.label, entry.time));
                }
                LabelGrouping::Time => {
                    out.push_str(&format!("  - {}: {}\n", entry.entity, entry.label));
                }
            }
        }
    }
    out
}

/// Headline numbers for a finished graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphSummary {
    pub nodes: usize,
    pub edges: usize,
    pub occurrences: usize,
    pub labelled_entities: usize,
    pub labels: usize,
    /// Up to ten node names, in order of first appearance.
    pub sample_nodes: Vec<String>,
    /// Up to ten labelled entity names.
    pub sample_labelled: Vec<String>,
}

const SAMPLE: usize = 10;

/// Summarize R and L.
pub fn graph_summary(graph: &MemoryGraph) -> GraphSummary {
    let g = relationship_graph(graph);
    let dict = graph.label_dictionary();
    GraphSummary {
        nodes: g.node_count(),
        edges: g.edge_count(),
        occurrences: graph.occurrence_count(),
        labelled_entities: dict.len(),
        labels: graph.labels().len(),
        sample_nodes: g.node_weights().take(SAMPLE).cloned().collect(),
        sample_labelled: dict.into_iter().take(SAMPLE).map(|e| e.entity).collect(),
    }
}

impl std::fmt::Display for GraphSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "R graph: {} nodes, {} edges, {} occurrences",
            self.nodes, self.edges, self.occurrences
        )?;
        if !self.sample_nodes.is_empty() {
            writeln!(f, "R graph nodes: {}", self.sample_nodes.join(", "))?;
        }
        write!(
            f,
            "L dictionary: {} entities, {} total labels",
            self.labelled_entities, self.labels
        )?;
        if !self.sample_labelled.is_empty() {
            write!(f, "\nL dictionary entities: {}", self.sample_labelled.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MemoryGraph {
        let mut g = MemoryGraph::new();
        g.add_relationship("Alice", "Bob", "2024-01", "met", "");
        g.add_relationship("Bob", "Alice", "2024-02", "argued", "");
        g.add_relationship("Alice", "Park", "", "visits", "");
        g.add_label("Alice", "Person", "2024-01");
        g.add_label("Park", "Location", "");
        g.add_label("Alice", "Student", "2024-01");
        g
    }

    #[test]
    fn projection_has_one_edge_per_pair() {
        let g = relationship_graph(&sample());
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 2);
        let first = g.edge_weights().next().unwrap();
        assert_eq!(first.count, 2);
        assert_eq!(first.relationships, ["met", "argued"]);
        assert_eq!(first.to_string(), "2x 2024-02: argued");
    }

    #[test]
    fn edge_label_without_time() {
        let summary = PairSummary {
            count: 1,
            relationships: vec!["visits".into()],
            latest_time: String::new(),
        };
        assert_eq!(summary.to_string(), "1x visits");
    }

    #[test]
    fn dot_lists_nodes_and_edges() {
        let dot = render_dot(&relationship_graph(&sample()));
        assert!(dot.starts_with("graph memory {"));
        assert!(dot.contains("\"Alice\""));
        assert!(dot.contains("--"));
        assert!(dot.trim_end().ends_with('}'));
    }

    #[test]
    fn visualize_writes_both_files() {
        let dir = tempfile::TempDir::new().unwrap();
        let rendered = visualize_r(&sample(), &dir.path().join("graphs"), "R Graph").unwrap();
        assert!(rendered.svg.ends_with("R_Graph.svg"));
        let svg = std::fs::read_to_string(&rendered.svg).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(">Alice</text>"));
        assert!(rendered.dot.exists());
    }

    #[test]
    fn empty_graph_renders_placeholder() {
        let dir = tempfile::TempDir::new().unwrap();
        let rendered = visualize_r(&MemoryGraph::new(), dir.path(), "R Graph").unwrap();
        let svg = std::fs::read_to_string(rendered.svg).unwrap();
        assert!(svg.contains("empty graph"));
    }

    #[test]
    fn unwritable_directory_is_render_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();
        let err = visualize_r(&sample(), &blocker.join("sub"), "R Graph").unwrap_err();
        assert!(matches!(err, RenderError::Io { .. }));
    }

    #[test]
    fn summarize_by_entity() {
        let text = summarize_l(sample().labels(), LabelGrouping::Entity);
        assert_eq!(
            text,
            "Alice:\n  - Person (time: 2024-01)\n  - Student (time: 2024-01)\nPark:\n  - Location\n"
        );
    }

    #[test]
    fn summarize_by_time() {
        let text = summarize_l(sample().labels(), LabelGrouping::Time);
        assert_eq!(
            text,
            "2024-01:\n  - Alice: Person\n  - Alice: Student\n(no time):\n  - Park: Location\n"
        );
    }

    #[test]
    fn summarize_empty() {
        assert_eq!(summarize_l(&[], LabelGrouping::Entity), "L dictionary is empty.\n");
    }

    #[test]
    fn grouping_parses() {
        assert_eq!("Time".parse::<LabelGrouping>().unwrap(), LabelGrouping::Time);
        assert!("date".parse::<LabelGrouping>().is_err());
    }

    #[test]
    fn summary_counts() {
        let summary = graph_summary(&sample());
        assert_eq!(summary.nodes, 3);
        assert_eq!(summary.edges, 2);
        assert_eq!(summary.occurrences, 3);
        assert_eq!(summary.labelled_entities, 2);
        assert_eq!(summary.labels, 3);
        assert_eq!(summary.sample_nodes, ["Alice", "Bob", "Park"]);
        let text = summary.to_string();
        assert!(text.contains("R graph: 3 nodes, 2 edges, 3 occurrences"));
        assert!(text.contains("L dictionary: 2 entities, 3 total labels"));
    }
}
