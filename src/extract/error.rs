//! Diagnostic error types for graph element extraction.

use miette::Diagnostic;
use thiserror::Error;

use super::llm::LlmError;

/// Errors from turning model output into graph elements.
#[derive(Debug, Error, Diagnostic)]
pub enum ExtractionError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Backend(#[from] LlmError),

    #[error("no JSON object or array found in model response")]
    #[diagnostic(
        code(memgraph::extract::no_json),
        help("The model answered without a JSON block. Lower the temperature or try another model.")
    )]
    NoJson { excerpt: String },

    #[error("model JSON has an unexpected shape: {message}")]
    #[diagnostic(
        code(memgraph::extract::schema),
        help(
            "Expected {{\"R\": [{{E1, E2, R: [{{time, relationship, event}}]}}], \
             \"L\": [{{Label, Entity, time}}]}}."
        )
    )]
    Schema { message: String },

    #[error("model output unparseable after {attempts} attempts")]
    #[diagnostic(
        code(memgraph::extract::retries_exhausted),
        help(
            "Every attempt returned output without usable JSON. Raise max_retries \
             in the config, reduce chunk size, or switch models."
        )
    )]
    RetriesExhausted {
        attempts: usize,
        #[source]
        last: Box<ExtractionError>,
    },
}

impl ExtractionError {
    /// Whether another model call may fix this error.
    pub fn is_parse_failure(&self) -> bool {
        matches!(self, Self::NoJson { .. } | Self::Schema { .. })
    }
}

/// Convenience alias for extraction results.
pub type ExtractionResult<T> = std::result::Result<T, ExtractionError>;
