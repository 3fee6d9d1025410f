//! Testing utilities.
//!
//! [`ScriptedBackend`] stands in for the language model so extraction and
//! the full pipeline can be exercised deterministically without network
//! access.

use std::cell::RefCell;
use std::collections::VecDeque;

use crate::extract::llm::{CompletionBackend, LlmError};

/// A completion backend that replays scripted responses in order.
///
/// Once the script runs out every call fails with
/// [`LlmError::RequestFailed`]. All prompts are recorded.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    responses: RefCell<VecDeque<String>>,
    prompts: RefCell<Vec<String>>,
}

impl ScriptedBackend {
    /// Create a backend that answers with `responses`, one per call.
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: RefCell::new(responses.into_iter().map(Into::into).collect()),
            prompts: RefCell::new(Vec::new()),
        }
    }

    /// Number of completion calls made so far.
    pub fn calls(&self) -> usize {
        self.prompts.borrow().len()
    }

    /// Every prompt received, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.borrow().clone()
    }

    /// Responses not yet consumed.
    pub fn remaining(&self) -> usize {
        self.responses.borrow().len()
    }
}

impl CompletionBackend for ScriptedBackend {
    fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        self.prompts.borrow_mut().push(prompt.to_string());
        self.responses
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| LlmError::RequestFailed {
                url: "scripted://".into(),
                message: "script exhausted".into(),
            })
    }
}

/// JSON reply describing a single relationship occurrence.
pub fn relationship_reply(e1: &str, e2: &str, time: &str, relationship: &str, event: &str) -> String {
    serde_json::json!({
        "R": [{
            "E1": e1,
            "E2": e2,
            "R": [{ "time": time, "relationship": relationship, "event": event }]
        }],
        "L": []
    })
    .to_string()
}
