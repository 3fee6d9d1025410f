//! Graph element extraction: prompt a language model for relationship and
//! label triples and parse its answer into typed records.
//!
//! Parsing tolerates noise around the JSON block (fences, commentary) via
//! [`json_span::json_spans`]. When a response contains no usable JSON the
//! model is asked again, up to `max_retries` more times; transport errors
//! are not retried.

pub mod error;
pub mod json_span;
pub mod llm;
pub mod records;

use crate::graph::assemble::GraphAssembler;

use self::error::{ExtractionError, ExtractionResult};
use self::json_span::json_spans;
use self::llm::CompletionBackend;
use self::records::ExtractedElements;

/// Extraction settings.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Additional model calls allowed after a parse failure.
    pub max_retries: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self { max_retries: 2 }
    }
}

/// Build the instruction prompt for one piece of narrative text.
pub fn build_prompt(text: &str) -> String {
    format!(
        r#"You are a memory extraction agent. Read the text below and extract structured episodic memory.

## Text
"""
{text}
"""

## Task
Produce two structures.

### R: relationships between two entities over time
Each entry names two entities and every timestamped interaction between them:
{{"E1": "Entity A", "E2": "Entity B", "R": [
  {{"time": "2024-01", "relationship": "met", "event": "Entity A met Entity B at a conference."}},
  {{"time": "2025-03", "relationship": "collaborated with", "event": "They collaborated on a project."}}
]}}

### L: semantic labels for named entities
Assign one or more labels describing what each entity is or the role it plays
(for example "Person", "Instructor", "Athlete", "Location", "Recreational Area",
"Organization", "Event", "Tool", "Pet"). Go beyond generic types when the text
supports it, and emit one entry per label:
{{"Label": "Instructor", "Entity": "Noa Middleton", "time": "2025-09-13"}}
Use the time stated or implied by the text, or "" if none.

## Output
Return only JSON with keys "R" and "L". No explanations."#
    )
}

/// Sends text to a language model and turns the reply into graph elements.
pub struct GraphElementExtractor<B> {
    backend: B,
    config: ExtractorConfig,
}

impl<B: CompletionBackend> GraphElementExtractor<B> {
    pub fn new(backend: B, config: ExtractorConfig) -> Self {
        Self { backend, config }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Extract elements from `text` and merge them through `assembler`.
    pub fn extract_graph_elements(
        &self,
        text: &str,
        assembler: &mut GraphAssembler<'_>,
    ) -> ExtractionResult<()> {
        let elements = self.extract(text)?;
        assembler.assemble(&elements);
        Ok(())
    }

    /// Call the model and parse its reply, retrying on unparseable output.
    pub fn extract(&self, text: &str) -> ExtractionResult<ExtractedElements> {
        let prompt = build_prompt(text);
        let attempts = self.config.max_retries + 1;

        let mut last_error = None;
        for attempt in 1..=attempts {
            let response = self.backend.complete(&prompt)?;
            match parse_response(&response) {
                Ok(elements) => {
                    tracing::info!(
                        attempt,
                        relationships = elements.relationships.len(),
                        labels = elements.labels.len(),
                        "extracted graph elements"
                    );
                    return Ok(elements);
                }
                Err(e) if e.is_parse_failure() => {
                    tracing::warn!(attempt, attempts, error = %e, "unparseable model output");
                    tracing::debug!(raw = %excerpt(&response), "raw model output");
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(ExtractionError::RetriesExhausted {
            attempts,
            last: Box::new(last_error.unwrap_or(ExtractionError::NoJson {
                excerpt: String::new(),
            })),
        })
    }
}

/// Map the first JSON span in a raw model response that has the R/L shape
/// to typed records.
///
/// Spans of the wrong shape (a bracketed step number, say) are passed over.
/// When none fit, the first span's schema error is reported.
pub fn parse_response(response: &str) -> ExtractionResult<ExtractedElements> {
    let mut first_error = None;
    for (span, value) in json_spans(response) {
        match ExtractedElements::from_value(value) {
            Ok(elements) => return Ok(elements),
            Err(e) => {
                tracing::debug!(span = %excerpt(span), error = %e, "skipping JSON span");
                first_error.get_or_insert(e);
            }
        }
    }
    Err(first_error.unwrap_or_else(|| ExtractionError::NoJson {
        excerpt: excerpt(response),
    }))
}

fn excerpt(text: &str) -> String {
    text.chars().take(500).collect()
}
