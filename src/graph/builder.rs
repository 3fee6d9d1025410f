//! Orchestrates chunked extraction into a single memory graph.

use serde::{Deserialize, Serialize};

use crate::chunker::{ChunkConfig, chunk_text};
use crate::extract::GraphElementExtractor;
use crate::extract::error::ExtractionResult;
use crate::extract::llm::CompletionBackend;

use super::MemoryGraph;
use super::assemble::{GraphAssembler, LabelPolicy};

/// Builder settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuilderConfig {
    pub chunk: ChunkConfig,
    pub label_policy: LabelPolicy,
}

/// Owns the graph of one run and the extractor that fills it.
pub struct MemoryGraphBuilder<B> {
    extractor: GraphElementExtractor<B>,
    graph: MemoryGraph,
    config: BuilderConfig,
}

impl<B: CompletionBackend> MemoryGraphBuilder<B> {
    /// Start a run with an empty graph.
    pub fn new(extractor: GraphElementExtractor<B>, config: BuilderConfig) -> Self {
        Self {
            extractor,
            graph: MemoryGraph::new(),
            config,
        }
    }

    /// Extract over the whole text, chunk by chunk in source order.
    ///
    /// Whitespace-only text makes no model call and leaves the graph empty.
    /// The first chunk that fails aborts the build; chunks merged before it
    /// stay in the graph.
    pub fn build_memory_graph(&mut self, text: &str) -> ExtractionResult<&MemoryGraph> {
        let chunks = chunk_text(text, &self.config.chunk);
        if chunks.is_empty() {
            tracing::info!("no narrative text, skipping extraction");
            return Ok(&self.graph);
        }

        tracing::info!(chunks = chunks.len(), "extracting memory graph");
        for chunk in &chunks {
            tracing::debug!(index = chunk.index, words = chunk.word_count, "extracting chunk");
            let mut assembler = GraphAssembler::new(&mut self.graph, self.config.label_policy);
            self.extractor
                .extract_graph_elements(&chunk.text, &mut assembler)?;
        }

        tracing::info!(
            pairs = self.graph.relationships().len(),
            occurrences = self.graph.occurrence_count(),
            labels = self.graph.labels().len(),
            "memory graph built"
        );
        Ok(&self.graph)
    }

    pub fn graph(&self) -> &MemoryGraph {
        &self.graph
    }

    pub fn extractor(&self) -> &GraphElementExtractor<B> {
        &self.extractor
    }

    pub fn into_graph(self) -> MemoryGraph {
        self.graph
    }
}
