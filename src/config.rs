//! Run configuration.
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! the environment. `.env` values take precedence over the process
//! environment. CLI flags are applied last by the binary.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::chunker::ChunkConfig;
use crate::error::ConfigError;
use crate::extract::ExtractorConfig;
use crate::extract::llm::{DEFAULT_BASE_URL, DEFAULT_MODEL, LlmConfig};
use crate::graph::assemble::LabelPolicy;
use crate::graph::builder::BuilderConfig;
use crate::render::LabelGrouping;

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const BASE_URL_VAR: &str = "OPENAI_BASE_URL";
pub const MODEL_VAR: &str = "MEMORY_GRAPH_MODEL";

pub const DEFAULT_OUTPUT_JSON: &str = "generated_memory_graph.json";
pub const DEFAULT_IMAGE_DIR: &str = "generated_graphs";

/// Optional settings file, persisted as TOML.
///
/// The API key only comes from the environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Extra model calls allowed per chunk after a parse failure.
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
    /// Word budget per extraction chunk.
    #[serde(default = "default_max_words")]
    pub max_words: usize,
    #[serde(default)]
    pub label_policy: LabelPolicy,
    #[serde(default)]
    pub label_grouping: LabelGrouping,
    #[serde(default = "default_output_json")]
    pub output_json: PathBuf,
    #[serde(default = "default_image_dir")]
    pub image_dir: PathBuf,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.into()
}
fn default_model() -> String {
    DEFAULT_MODEL.into()
}
fn default_temperature() -> f32 {
    0.2
}
fn default_timeout_secs() -> u64 {
    120
}
fn default_max_retries() -> usize {
    ExtractorConfig::default().max_retries
}
fn default_max_words() -> usize {
    ChunkConfig::default().max_words
}
fn default_output_json() -> PathBuf {
    DEFAULT_OUTPUT_JSON.into()
}
fn default_image_dir() -> PathBuf {
    DEFAULT_IMAGE_DIR.into()
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            max_words: default_max_words(),
            label_policy: LabelPolicy::default(),
            label_grouping: LabelGrouping::default(),
            output_json: default_output_json(),
            image_dir: default_image_dir(),
        }
    }
}

impl ConfigFile {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Load `path` when given, otherwise the built-in defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

/// Fully resolved settings for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub llm: LlmConfig,
    pub max_retries: usize,
    pub chunk: ChunkConfig,
    pub label_policy: LabelPolicy,
    pub label_grouping: LabelGrouping,
    pub output_json: PathBuf,
    pub image_dir: PathBuf,
}

impl PipelineConfig {
    /// Defaults around an explicit model configuration.
    pub fn with_llm(llm: LlmConfig) -> Self {
        let file = ConfigFile::default();
        Self {
            llm,
            max_retries: file.max_retries,
            chunk: ChunkConfig {
                max_words: file.max_words,
            },
            label_policy: file.label_policy,
            label_grouping: file.label_grouping,
            output_json: file.output_json,
            image_dir: file.image_dir,
        }
    }

    /// Resolve from an optional TOML file, an optional `.env` file and the
    /// process environment.
    ///
    /// A missing `.env` file is not an error.
    pub fn resolve(config_file: Option<&Path>, env_file: Option<&Path>) -> Result<Self, ConfigError> {
        let file = ConfigFile::load_or_default(config_file)?;
        let dotenv = match env_file {
            Some(path) => read_env_file(path)?,
            None => HashMap::new(),
        };
        Self::from_parts(file, |key| {
            dotenv.get(key).cloned().or_else(|| std::env::var(key).ok())
        })
    }

    /// Combine file settings with environment values supplied by `lookup`.
    ///
    /// Blank values count as unset.
    pub fn from_parts(
        file: ConfigFile,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = get(API_KEY_VAR).ok_or_else(|| ConfigError::MissingCredential {
            var: API_KEY_VAR.into(),
        })?;

        let llm = LlmConfig {
            api_key,
            base_url: get(BASE_URL_VAR).unwrap_or(file.base_url),
            model: get(MODEL_VAR).unwrap_or(file.model),
            temperature: file.temperature,
            timeout_secs: file.timeout_secs,
        };
        tracing::debug!(base_url = %llm.base_url, model = %llm.model, "resolved model settings");

        Ok(Self {
            llm,
            max_retries: file.max_retries,
            chunk: ChunkConfig {
                max_words: file.max_words,
            },
            label_policy: file.label_policy,
            label_grouping: file.label_grouping,
            output_json: file.output_json,
            image_dir: file.image_dir,
        })
    }

    pub fn extractor_config(&self) -> ExtractorConfig {
        ExtractorConfig {
            max_retries: self.max_retries,
        }
    }

    pub fn builder_config(&self) -> BuilderConfig {
        BuilderConfig {
            chunk: self.chunk,
            label_policy: self.label_policy,
        }
    }
}

/// Read `KEY=value` pairs from an env file without touching the process
/// environment. Returns an empty map when the file does not exist.
pub fn read_env_file(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    if !path.is_file() {
        tracing::debug!(path = %path.display(), "no env file");
        return Ok(HashMap::new());
    }
    let env_error = |e: dotenvy::Error| ConfigError::EnvFile {
        path: path.display().to_string(),
        message: e.to_string(),
    };
    let mut values = HashMap::new();
    for item in dotenvy::from_path_iter(path).map_err(env_error)? {
        let (key, value) = item.map_err(env_error)?;
        values.insert(key, value);
    }
    Ok(values)
}
