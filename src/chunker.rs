//! Split narrative text into bounded chunks for extraction.
//!
//! Chunks end on sentence boundaries and never exceed `max_words` unless a
//! single sentence is longer than that on its own.

use serde::{Deserialize, Serialize};

/// Configuration for chunking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkConfig {
    /// Maximum words per chunk.
    pub max_words: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self { max_words: 1500 }
    }
}

/// A chunk of source text, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    /// Sequential index within the source.
    pub index: usize,
    pub text: String,
    pub word_count: usize,
}

/// Split `text` into sentence-aligned chunks of at most `config.max_words`.
///
/// Whitespace-only input yields no chunks.
pub fn chunk_text(text: &str, config: &ChunkConfig) -> Vec<TextChunk> {
    let max_words = config.max_words.max(1);
    let mut result = Vec::new();
    let mut current = String::new();
    let mut current_words = 0usize;

    for sentence in split_at_sentences(text) {
        let sw = sentence.split_whitespace().count();
        if current_words + sw > max_words && !current.is_empty() {
            push_chunk(&mut result, &current, current_words);
            current.clear();
            current_words = 0;
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&sentence);
        current_words += sw;
    }

    if !current.is_empty() {
        push_chunk(&mut result, &current, current_words);
    }
    result
}

fn push_chunk(result: &mut Vec<TextChunk>, text: &str, word_count: usize) {
    result.push(TextChunk {
        index: result.len(),
        text: text.trim().to_string(),
        word_count,
    });
}

/// Split text at sentence boundaries (`.`, `!`, `?` followed by whitespace).
fn split_at_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();

    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        current.push(ch);
        let at_boundary = matches!(ch, '.' | '!' | '?')
            && chars.peek().is_some_and(|next| next.is_whitespace());
        if at_boundary {
            let trimmed = current.trim();
            if !trimmed.is_empty() {
                sentences.push(trimmed.to_string());
            }
            current.clear();
        }
    }
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
    sentences
}
