//! Rich diagnostic error types for the memory-graph pipeline.
//!
//! Each stage defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes, help text, and source chains so users know exactly
//! which input or step failed and how to fix it.

use miette::Diagnostic;
use thiserror::Error;

use crate::extract::error::ExtractionError;

/// Top-level error type for a pipeline run.
///
/// Each variant wraps a stage-specific error, preserving the full diagnostic
/// chain (error codes, help text, sources) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum MemoryGraphError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    DataLoad(#[from] DataLoadError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Persist(#[from] PersistError),
}

/// Convenience alias for pipeline-level results.
pub type MemoryGraphResult<T> = std::result::Result<T, MemoryGraphError>;

// ---------------------------------------------------------------------------
// Data loading errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum DataLoadError {
    #[error("required input file not found: {path}")]
    #[diagnostic(
        code(memgraph::data::not_found),
        help(
            "The data directory must contain `events.json` and `meta_events.json`. \
             Point --data-dir at the directory holding them."
        )
    )]
    NotFound { path: String },

    #[error("failed to read {path}")]
    #[diagnostic(
        code(memgraph::data::io),
        help("Check that the file is readable and the disk is not failing.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in {path}: {message}")]
    #[diagnostic(
        code(memgraph::data::malformed),
        help(
            "The file could not be parsed. `events.json` must be an array of \
             [date, location, actor, activity, description] arrays and \
             `meta_events.json` an array of grouping objects or tuples."
        )
    )]
    Malformed { path: String, message: String },
}

// ---------------------------------------------------------------------------
// Output persistence errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum PersistError {
    #[error("I/O error on {path}")]
    #[diagnostic(
        code(memgraph::persist::io),
        help(
            "Failed to read or write the memory graph JSON. Check that the parent \
             directory exists and is writable."
        )
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize memory graph: {message}")]
    #[diagnostic(code(memgraph::persist::serialize))]
    Serialize { message: String },

    #[error("malformed memory graph JSON: {message}")]
    #[diagnostic(
        code(memgraph::persist::malformed),
        help(
            "Expected an object with \"R\" (array of {{E1, E2, R}}) and \
             \"L\" (array of {{Label, Entity, time}}) keys."
        )
    )]
    Malformed { message: String },
}

// ---------------------------------------------------------------------------
// Rendering errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum RenderError {
    #[error("failed to write rendered graph to {path}")]
    #[diagnostic(
        code(memgraph::render::io),
        help(
            "The image directory is not writable. The graph JSON has already been \
             saved; fix --output-dir and re-render with `memory-graph show`."
        )
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("{var} is not set")]
    #[diagnostic(
        code(memgraph::config::missing_credential),
        help(
            "Set {var} in the environment or in the .env file passed with --env-file."
        )
    )]
    MissingCredential { var: String },

    #[error("failed to read config file: {path}")]
    #[diagnostic(
        code(memgraph::config::read),
        help("Ensure the config file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {message}")]
    #[diagnostic(
        code(memgraph::config::parse),
        help("Check the TOML syntax in the config file.")
    )]
    Parse { path: String, message: String },

    #[error("failed to read env file {path}: {message}")]
    #[diagnostic(
        code(memgraph::config::env_file),
        help("Each line of the env file must be KEY=value.")
    )]
    EnvFile { path: String, message: String },
}
