//! Input records: events, meta-events, books and graph answers.
//!
//! Raw JSON is converted to these types at load time. Events and the
//! legacy tuple form of meta-events are positional arrays, so they are
//! built from `serde_json::Value` rather than derived.

use serde::Serialize;

/// A single episodic event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub date: String,
    pub location: String,
    pub actor: String,
    pub activity: String,
    pub description: String,
}

impl Event {
    pub fn new(
        date: impl Into<String>,
        location: impl Into<String>,
        actor: impl Into<String>,
        activity: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            date: date.into(),
            location: location.into(),
            actor: actor.into(),
            activity: activity.into(),
            description: description.into(),
        }
    }

    /// Build from a positional record `[date, location, actor, activity, description, ...]`.
    ///
    /// Returns `None` when fewer than five fields are present. Extra fields
    /// are ignored; numbers and booleans are stringified.
    pub fn from_tuple(fields: &[serde_json::Value]) -> Option<Self> {
        if fields.len() < 5 {
            return None;
        }
        let f: Vec<String> = fields[..5].iter().map(field_string).collect::<Option<_>>()?;
        let [date, location, actor, activity, description]: [String; 5] = f.try_into().ok()?;
        Some(Self {
            date,
            location,
            actor,
            activity,
            description,
        })
    }
}

/// A higher-level grouping of events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetaEvent {
    /// Summary label for the group.
    pub summary: String,
    /// Indices into the events list.
    pub event_ids: Vec<usize>,
    /// Present when the meta-event was given in event tuple form.
    pub details: Option<Event>,
}

impl MetaEvent {
    /// Build from either the grouping-object form or the event-tuple form.
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Array(fields) => {
                let event = Event::from_tuple(fields)?;
                Some(Self {
                    summary: format!("{}: {}", event.activity, event.description),
                    event_ids: Vec::new(),
                    details: Some(event),
                })
            }
            serde_json::Value::Object(map) => {
                let summary = ["summary", "label", "name"]
                    .iter()
                    .find_map(|k| map.get(*k).and_then(field_string))?;
                let event_ids = ["event_ids", "events"]
                    .iter()
                    .find_map(|k| map.get(*k).and_then(|v| v.as_array()))
                    .map(|ids| {
                        ids.iter()
                            .filter_map(|id| id.as_u64().map(|n| n as usize))
                            .collect()
                    })
                    .unwrap_or_default();
                Some(Self {
                    summary,
                    event_ids,
                    details: None,
                })
            }
            _ => None,
        }
    }
}

/// A book document, kept as opaque JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct Book {
    /// Path relative to the books directory.
    pub id: String,
    pub content: serde_json::Value,
}

impl Book {
    /// Every non-blank string leaf of the document, joined by blank lines.
    ///
    /// Arrays keep their order; object members are visited in key order.
    pub fn text(&self) -> String {
        let mut parts = Vec::new();
        collect_strings(&self.content, &mut parts);
        parts.join("\n\n")
    }
}

fn collect_strings<'a>(value: &'a serde_json::Value, out: &mut Vec<&'a str>) {
    match value {
        serde_json::Value::String(s) if !s.trim().is_empty() => out.push(s),
        serde_json::Value::Array(items) => items.iter().for_each(|v| collect_strings(v, out)),
        serde_json::Value::Object(map) => map.values().for_each(|v| collect_strings(v, out)),
        _ => {}
    }
}

/// Content of a graph answer file.
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerContent {
    /// A plain answer string.
    Text(String),
    /// A structured QA object.
    Record(serde_json::Value),
}

/// One file from `graph_answers/`.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphAnswer {
    pub file_name: String,
    pub content: AnswerContent,
}

impl GraphAnswer {
    /// Interpret raw file contents: a JSON string, a JSON value, or verbatim text.
    pub fn parse(file_name: impl Into<String>, raw: &str) -> Self {
        let trimmed = raw.trim();
        let content = match serde_json::from_str::<serde_json::Value>(trimmed) {
            Ok(serde_json::Value::String(s)) => AnswerContent::Text(s),
            Ok(value) => AnswerContent::Record(value),
            Err(_) => AnswerContent::Text(trimmed.to_string()),
        };
        Self {
            file_name: file_name.into(),
            content,
        }
    }

    /// Length in characters of the answer as text.
    pub fn len(&self) -> usize {
        match &self.content {
            AnswerContent::Text(s) => s.chars().count(),
            AnswerContent::Record(v) => v.to_string().chars().count(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn field_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        serde_json::Value::Null => Some(String::new()),
        _ => None,
    }
}
