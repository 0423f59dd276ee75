//! Keyword extraction from free-text prompts
//!
//! Lowercases the prompt, pulls out identifier-like tokens, drops stop words
//! and duplicates. Trivially short prompts (acknowledgements, "ok", "thanks")
//! yield nothing.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

use super::MIN_PROMPT_CHARS;

/// A letter followed by at least two letters, digits, hyphens or underscores
static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-z][a-z0-9_-]{2,}").unwrap());

/// Words that carry no topical weight: auxiliaries, pronouns, prepositions,
/// generic request verbs and pleasantries
pub static STOP_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    let words = [
        "the", "a", "an", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had",
        "do", "does", "did", "will", "would", "shall", "should", "may", "might", "must", "can",
        "could", "i", "you", "he", "she", "it", "we", "they", "me", "him", "her", "us", "them",
        "my", "your", "his", "its", "our", "their", "this", "that", "these", "those", "what",
        "which", "who", "whom", "to", "of", "in", "for", "on", "with", "at", "by", "from", "as",
        "into", "about", "between", "and", "but", "or", "not", "no", "if", "then", "else", "when",
        "up", "out", "so", "just", "also", "make", "want", "need", "use", "like", "get", "how",
        "please", "let", "fix", "add", "sure", "check", "look", "try", "change", "update",
        "create", "new", "all", "any", "some", "now", "here", "there", "where", "why", "much",
        "many", "each", "every", "own", "same", "other", "going", "back",
        "help", "think", "know", "see", "tell", "show", "run", "thing", "work", "way", "take",
        "question", "yes", "ok", "okay", "thanks", "thank", "hey", "hi", "hello",
    ];
    words.into_iter().collect()
});

/// Extracts an ordered, deduplicated keyword list from a prompt
#[derive(Debug, Clone, Copy)]
pub struct KeywordExtractor {
    min_prompt_chars: usize,
}

impl KeywordExtractor {
    pub fn new() -> Self {
        Self {
            min_prompt_chars: MIN_PROMPT_CHARS,
        }
    }

    /// Extract keywords in order of first appearance.
    ///
    /// Returns an empty list for absent or too-short prompts; never fails.
    pub fn extract(&self, prompt: Option<&str>) -> Vec<String> {
        let prompt = match prompt {
            Some(p) if p.chars().count() >= self.min_prompt_chars => p,
            _ => return Vec::new(),
        };

        let lowered = prompt.to_lowercase();
        let mut seen = HashSet::new();
        let mut keywords = Vec::new();

        for token in TOKEN_PATTERN.find_iter(&lowered).map(|m| m.as_str()) {
            if STOP_WORDS.contains(token) {
                continue;
            }
            if seen.insert(token) {
                keywords.push(token.to_string());
            }
        }

        keywords
    }
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self::new()
    }
}
