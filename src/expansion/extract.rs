//! Best-effort entity name extraction from free-text queries.
//!
//! Regex cues, list splitting, and filler stripping. This is deliberately
//! shallow: the contract is the function signature, so a real tokenizer
//! or NER stage can replace the internals without touching callers.

use std::sync::LazyLock;

use itertools::Itertools;
use regex::Regex;
use tracing::debug;

use crate::utils::truncate_string;

/// Cue phrases that introduce an entity list, most specific first. The
/// first cue that matches claims the text after it.
static CUE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?:similar\s+to|related\s+to)\s+(?P<list>[a-z0-9+#./,\s-]+)",
        r"\blike\s+(?P<list>[a-z0-9+#./,\s-]+)",
        r"\bexpand\s+(?P<list>[a-z0-9+#./,\s-]+)",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("valid regex"))
    .collect()
});

/// Connectives that end the entity list inside a longer sentence.
static LIST_BOUNDARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:for|in|at|with|near|from|who|that)\b").expect("valid regex")
});

/// Separators between entries of one list.
static LIST_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",|\band\b|\bor\b").expect("valid regex"));

/// Tokens that are never an entity name on their own.
static STOP_WORDS: LazyLock<Vec<&'static str>> =
    LazyLock::new(|| vec!["to", "and", "or", "the", "a", "an"]);

/// Trailing fillers users append to names ("python programming",
/// "data scientist roles").
static FILLER_SUFFIXES: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    vec![
        "skill",
        "skills",
        "title",
        "titles",
        "role",
        "roles",
        "designation",
        "designations",
        "programming",
        "language",
        "technology",
    ]
});

/// Marker prefixing names the caller has flagged as mandatory.
const MANDATORY_MARKER: &str = "★";

/// Pull candidate entity names out of a free-text request.
///
/// When no cue matches (or the matched list boils down to nothing), the
/// most recently added entry of `selected` stands in, mirroring how a
/// search session usually expands its latest filter. An empty return is
/// a valid outcome, not a failure.
pub fn extract_entity_names(text: &str, selected: &[String]) -> Vec<String> {
    let lowered = text.to_lowercase();
    let mut names: Vec<String> = Vec::new();

    for pattern in CUE_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(&lowered) {
            if let Some(list) = caps.name("list") {
                names = split_list(list.as_str());
            }
            break;
        }
    }

    if names.is_empty() {
        if let Some(last) = selected.last() {
            if let Some(cleaned) = clean_entity_phrase(last) {
                names.push(cleaned);
            }
        }
    }

    let names: Vec<String> = names.into_iter().unique().collect();
    debug!(
        query = %truncate_string(text, 80),
        extracted = names.len(),
        "entity name extraction"
    );
    names
}

/// Split a captured list on separators, cleaning each entry.
fn split_list(list: &str) -> Vec<String> {
    let scope = LIST_BOUNDARY.split(list).next().unwrap_or("");
    LIST_SPLIT
        .split(scope)
        .filter_map(clean_entity_phrase)
        .collect()
}

/// Normalize one raw phrase into a candidate name, or nothing.
fn clean_entity_phrase(raw: &str) -> Option<String> {
    let mut text = raw.trim().to_lowercase();
    if let Some(stripped) = text.strip_prefix(MANDATORY_MARKER) {
        text = stripped.trim_start().to_string();
    }
    let text = text.trim_matches(|c: char| c == ',' || c == '.').trim();

    let mut words: Vec<&str> = text.split_whitespace().collect();
    while let Some(last) = words.last() {
        if FILLER_SUFFIXES.iter().any(|suffix| suffix == last) {
            words.pop();
        } else {
            break;
        }
    }
    let cleaned = words.join(" ");
    if cleaned.len() <= 1 || STOP_WORDS.iter().any(|stop| *stop == cleaned) {
        return None;
    }
    Some(cleaned)
}
