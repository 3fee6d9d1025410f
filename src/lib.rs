// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # memory-graph
//!
//! Builds an episodic memory graph from narrative text with a language model.
//!
//! The graph has two parts:
//!
//! - **R**: relationships between pairs of entities, each pair carrying a
//!   chronological list of occurrences (time, relationship, event text)
//! - **L**: a flat list of labels attached to entities at a point in time
//!
//! ## Architecture
//!
//! - **Data loading** (`data`): benchmark event files rendered into a story
//! - **Chunking** (`chunker`): sentence-aligned word-bounded chunks
//! - **Extraction** (`extract`): prompt, model call, tolerant JSON recovery, retry
//! - **Graph** (`graph`): R/L store, per-chunk assembly, JSON persistence
//! - **Rendering** (`render`): SVG/DOT image of R, text listings of L
//! - **Pipeline** (`pipeline`): the above wired together for one run
//!
//! ## Library usage
//!
//! ```no_run
//! use memory_graph::config::PipelineConfig;
//! use memory_graph::extract::llm::ChatCompletionClient;
//! use memory_graph::pipeline::Pipeline;
//!
//! let config = PipelineConfig::resolve(None, Some(std::path::Path::new(".env"))).unwrap();
//! let client = ChatCompletionClient::new(config.llm.clone());
//! let report = Pipeline::new(config, client)
//!     .run("On 2024-01-01, at Park, Alice met Bob.")
//!     .unwrap();
//! println!("{}", report.summary);
//! ```

pub mod chunker;
pub mod config;
pub mod data;
pub mod error;
pub mod extract;
pub mod graph;
pub mod pipeline;
pub mod render;
pub mod testing;
