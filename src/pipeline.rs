//! End-to-end run: narrative text in, memory graph JSON and images out.

use std::path::{Path, PathBuf};

use crate::config::PipelineConfig;
use crate::data::{AnswerStats, DataProcessor, analyze_graph_answers, create_story_text_with_meta};
use crate::error::{MemoryGraphResult, RenderError};
use crate::extract::GraphElementExtractor;
use crate::extract::llm::CompletionBackend;
use crate::graph::MemoryGraph;
use crate::graph::builder::MemoryGraphBuilder;
use crate::render::{GraphSummary, RenderedGraph, graph_summary, visualize_r};

/// Title of the rendered R image.
pub const R_GRAPH_TITLE: &str = "R Graph";

/// What a finished run produced.
#[derive(Debug)]
pub struct PipelineReport {
    pub graph: MemoryGraph,
    /// Where the graph JSON was written.
    pub output_json: PathBuf,
    /// Rendered files, when rendering succeeded.
    pub rendered: Option<RenderedGraph>,
    /// Rendering failure, if any. The JSON output is still valid.
    pub render_error: Option<RenderError>,
    pub summary: GraphSummary,
    /// Graph answer statistics, for runs over a data directory.
    pub answer_stats: Option<AnswerStats>,
}

/// Drives extraction, persistence and rendering for one configuration.
pub struct Pipeline<B> {
    config: PipelineConfig,
    backend: B,
}

impl<B: CompletionBackend> Pipeline<B> {
    pub fn new(config: PipelineConfig, backend: B) -> Self {
        Self { config, backend }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Build a memory graph from `text`, save it, then render it.
    ///
    /// Extraction or persistence failures abort the run and no JSON is
    /// written. A rendering failure is logged and recorded in the report.
    pub fn run(&self, text: &str) -> MemoryGraphResult<PipelineReport> {
        let extractor = GraphElementExtractor::new(&self.backend, self.config.extractor_config());
        let mut builder = MemoryGraphBuilder::new(extractor, self.config.builder_config());
        builder.build_memory_graph(text)?;
        let graph = builder.into_graph();

        graph.save_json(&self.config.output_json)?;

        let (rendered, render_error) =
            match visualize_r(&graph, &self.config.image_dir, R_GRAPH_TITLE) {
                Ok(rendered) => (Some(rendered), None),
                Err(e) => {
                    tracing::warn!(error = %e, "graph rendering failed, JSON output kept");
                    (None, Some(e))
                }
            };

        let summary = graph_summary(&graph);
        Ok(PipelineReport {
            graph,
            output_json: self.config.output_json.clone(),
            rendered,
            render_error,
            summary,
            answer_stats: None,
        })
    }

    /// Load a benchmark data directory, narrate it and run on the story.
    pub fn process_data(&self, data_dir: &Path) -> MemoryGraphResult<PipelineReport> {
        let data = DataProcessor::new(data_dir).load_all_data()?;

        let answer_stats = analyze_graph_answers(&data.graph_answers);
        if let Some(stats) = &answer_stats {
            tracing::info!(
                total = stats.total,
                mean_len = stats.mean_len,
                "analyzed graph answers"
            );
        }

        let story = create_story_text_with_meta(&data.events, &data.meta_events);
        tracing::info!(chars = story.chars().count(), "created story text");

        let mut report = self.run(&story)?;
        report.answer_stats = answer_stats;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::llm::LlmConfig;
    use crate::testing::{ScriptedBackend, relationship_reply};

    fn config(dir: &Path) -> PipelineConfig {
        let mut cfg = PipelineConfig::with_llm(LlmConfig::with_api_key("test"));
        cfg.output_json = dir.join("out/graph.json");
        cfg.image_dir = dir.join("images");
        cfg
    }

    #[test]
    fn run_writes_json_and_images() {
        let dir = tempfile::TempDir::new().unwrap();
        let backend = ScriptedBackend::new([relationship_reply(
            "Alice", "Bob", "2024-01-01", "met", "Alice met Bob",
        )]);
        let pipeline = Pipeline::new(config(dir.path()), &backend);

        let report = pipeline.run("Alice met Bob at the park.").unwrap();
        assert!(report.output_json.exists());
        assert!(report.rendered.as_ref().unwrap().svg.exists());
        assert!(report.render_error.is_none());
        assert_eq!(report.summary.nodes, 2);
        assert_eq!(MemoryGraph::load_json(&report.output_json).unwrap().relationships().len(), 1);
    }

    #[test]
    fn render_failure_keeps_json() {
        let dir = tempfile::TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a dir").unwrap();
        let mut cfg = config(dir.path());
        cfg.image_dir = blocker.join("images");

        let backend = ScriptedBackend::new([relationship_reply("A", "B", "1", "met", "")]);
        let report = Pipeline::new(cfg, &backend).run("A met B.").unwrap();
        assert!(report.rendered.is_none());
        assert!(matches!(report.render_error, Some(RenderError::Io { .. })));
        assert!(MemoryGraph::load_json(&report.output_json).is_ok());
    }

    #[test]
    fn extraction_failure_writes_nothing() {
        let dir = tempfile::TempDir::new().unwrap();
        let cfg = config(dir.path());
        let output = cfg.output_json.clone();
        let backend = ScriptedBackend::new(["no json", "still none", "nope"]);
        assert!(Pipeline::new(cfg, &backend).run("A met B.").is_err());
        assert!(!output.exists());
    }
}
