//! Benchmark data loading and narrative construction.
//!
//! A data directory holds:
//!
//! - `events.json` (required): array of `[date, location, actor, activity, description]`
//! - `meta_events.json` (required): array of grouping objects or event tuples
//! - `books/` (optional): book documents, any depth, `*.json`
//! - `graph_answers/` (optional): one answer per `*.json` file

pub mod model;
pub mod story;

use std::path::{Path, PathBuf};

use crate::error::DataLoadError;

pub use self::model::{AnswerContent, Book, Event, GraphAnswer, MetaEvent};
pub use self::story::{AnswerStats, analyze_graph_answers, create_story_text, create_story_text_with_meta};

/// Everything loaded from a data directory.
#[derive(Debug, Clone, Default)]
pub struct LoadedData {
    pub events: Vec<Event>,
    pub meta_events: Vec<MetaEvent>,
    pub books: Vec<Book>,
    pub graph_answers: Vec<GraphAnswer>,
}

/// Loads benchmark inputs from a data directory.
#[derive(Debug, Clone)]
pub struct DataProcessor {
    data_dir: PathBuf,
}

impl DataProcessor {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Load every input. Required files fail fast; optional directories may be absent.
    pub fn load_all_data(&self) -> Result<LoadedData, DataLoadError> {
        let data = LoadedData {
            events: self.load_events()?,
            meta_events: self.load_meta_events()?,
            books: self.load_books()?,
            graph_answers: self.load_graph_answers()?,
        };
        tracing::info!(
            events = data.events.len(),
            meta_events = data.meta_events.len(),
            books = data.books.len(),
            graph_answers = data.graph_answers.len(),
            "loaded benchmark data"
        );
        Ok(data)
    }

    /// Load `events.json`. Records with fewer than five fields are skipped.
    pub fn load_events(&self) -> Result<Vec<Event>, DataLoadError> {
        let path = self.data_dir.join("events.json");
        let records = read_json_array(&path)?;
        let mut events = Vec::with_capacity(records.len());
        for (idx, record) in records.iter().enumerate() {
            match record.as_array().and_then(|fields| Event::from_tuple(fields)) {
                Some(event) => events.push(event),
                None => tracing::warn!(index = idx, record = %record, "skipping event with insufficient data"),
            }
        }
        Ok(events)
    }

    /// Load `meta_events.json`. Unrecognized records are skipped.
    pub fn load_meta_events(&self) -> Result<Vec<MetaEvent>, DataLoadError> {
        let path = self.data_dir.join("meta_events.json");
        let records = read_json_array(&path)?;
        let mut metas = Vec::with_capacity(records.len());
        for (idx, record) in records.iter().enumerate() {
            match MetaEvent::from_value(record) {
                Some(meta) => metas.push(meta),
                None => tracing::warn!(index = idx, record = %record, "skipping unrecognized meta event"),
            }
        }
        Ok(metas)
    }

    /// Load every `*.json` under `books/`, in sorted path order.
    pub fn load_books(&self) -> Result<Vec<Book>, DataLoadError> {
        let dir = self.data_dir.join("books");
        if !dir.is_dir() {
            tracing::debug!(dir = %dir.display(), "no books directory");
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        collect_json_files(&dir, &mut files)?;
        files.sort();

        files
            .into_iter()
            .map(|path| {
                let content = read_json(&path)?;
                let id = path
                    .strip_prefix(&dir)
                    .unwrap_or(&path)
                    .to_string_lossy()
                    .replace('\\', "/");
                Ok(Book { id, content })
            })
            .collect()
    }

    /// Load every `*.json` directly under `graph_answers/`, in sorted name order.
    pub fn load_graph_answers(&self) -> Result<Vec<GraphAnswer>, DataLoadError> {
        let dir = self.data_dir.join("graph_answers");
        if !dir.is_dir() {
            tracing::debug!(dir = %dir.display(), "no graph_answers directory");
            return Ok(Vec::new());
        }

        let mut files: Vec<PathBuf> = read_dir(&dir)?
            .into_iter()
            .filter(|p| p.is_file() && has_json_extension(p))
            .collect();
        files.sort();

        files
            .into_iter()
            .map(|path| {
                let raw = read_to_string(&path)?;
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                Ok(GraphAnswer::parse(name, &raw))
            })
            .collect()
    }
}

/// Read narrative text for a single run from a book file.
///
/// A `*.json` file is read as a book document and flattened with
/// [`Book::text`]; anything else is taken verbatim.
pub fn read_book_text(path: &Path) -> Result<String, DataLoadError> {
    if has_json_extension(path) {
        let book = Book {
            id: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            content: read_json(path)?,
        };
        tracing::info!(book = %book.id, "read book document");
        Ok(book.text())
    } else {
        read_to_string(path)
    }
}

fn read_to_string(path: &Path) -> Result<String, DataLoadError> {
    std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            DataLoadError::NotFound {
                path: path.display().to_string(),
            }
        } else {
            DataLoadError::Io {
                path: path.display().to_string(),
                source: e,
            }
        }
    })
}

fn read_json(path: &Path) -> Result<serde_json::Value, DataLoadError> {
    let content = read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| DataLoadError::Malformed {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

fn read_json_array(path: &Path) -> Result<Vec<serde_json::Value>, DataLoadError> {
    match read_json(path)? {
        serde_json::Value::Array(items) => Ok(items),
        other => Err(DataLoadError::Malformed {
            path: path.display().to_string(),
            message: format!("expected a top-level array, found {}", json_kind(&other)),
        }),
    }
}

fn read_dir(dir: &Path) -> Result<Vec<PathBuf>, DataLoadError> {
    let entries = std::fs::read_dir(dir).map_err(|e| DataLoadError::Io {
        path: dir.display().to_string(),
        source: e,
    })?;
    entries
        .map(|entry| {
            entry.map(|e| e.path()).map_err(|e| DataLoadError::Io {
                path: dir.display().to_string(),
                source: e,
            })
        })
        .collect()
}

fn collect_json_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), DataLoadError> {
    for path in read_dir(dir)? {
        if path.is_dir() {
            collect_json_files(&path, out)?;
        } else if has_json_extension(&path) {
            out.push(path);
        }
    }
    Ok(())
}

fn has_json_extension(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
