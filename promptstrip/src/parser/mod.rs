//! Component parser: splits a raw prompt into ordered atomic units.
//!
//! A component is one sentence, clause, or list item. Lines are the outer
//! structure; within a line, sentence-ending punctuation (`.` `!` `?` followed
//! by whitespace) marks boundaries. A line that starts with a list marker is
//! kept whole so internal punctuation cannot fragment a single instruction.
//!
//! Parsing is pure and deterministic; the search engine only ever manipulates
//! index sets into the sequence produced here.

use once_cell::sync::Lazy;
use regex::Regex;

/// Marker at the start of a (trimmed) line: `-`, `•`, `*`, or `1.` / `1)`,
/// followed by whitespace or end of line.
static LIST_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[-*•]|\d+[.)])(?:\s|$)").expect("list marker regex"));

/// Sentence boundary: terminal punctuation immediately followed by whitespace.
static SENTENCE_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]\s+").expect("sentence boundary regex"));

/// One atomic unit of the prompt. `index` is the 0-based position in parse
/// order and is what the search engine's active set refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub text: String,
    pub index: usize,
}

/// Splits a line at sentence boundaries, keeping the punctuation attached to
/// the preceding fragment. Boundary whitespace is consumed.
fn split_sentences(line: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    for boundary in SENTENCE_BOUNDARY.find_iter(line) {
        // The punctuation is a single ASCII byte; cut right after it.
        let cut = boundary.start() + 1;
        parts.push(&line[start..cut]);
        start = boundary.end();
    }
    parts.push(&line[start..]);
    parts
}

/// Parses a prompt into ordered components.
///
/// Empty and whitespace-only input yield an empty sequence. Input with no
/// newline and no recognizable sentence punctuation yields a single component
/// equal to the trimmed prompt.
pub fn parse_components(prompt: &str) -> Vec<Component> {
    let mut texts: Vec<String> = Vec::new();

    for line in prompt.split('\n') {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if LIST_MARKER.is_match(line) {
            // Whole list item is one instruction; never split it further.
            texts.push(line.to_string());
            continue;
        }
        for part in split_sentences(line) {
            let part = part.trim();
            if !part.is_empty() {
                texts.push(part.to_string());
            }
        }
    }

    if texts.is_empty() {
        let trimmed = prompt.trim();
        if !trimmed.is_empty() {
            texts.push(trimmed.to_string());
        }
    }

    texts
        .into_iter()
        .enumerate()
        .map(|(index, text)| Component { text, index })
        .collect()
}
