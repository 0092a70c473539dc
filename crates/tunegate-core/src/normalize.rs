//! Query normalization and validation.

use crate::error::{Error, Result};

/// Longest accepted query, counted in characters after normalization.
pub const MAX_QUERY_CHARS: usize = 200;

/// Instruction phrases stripped from the front of a query, longest first.
const INSTRUCTION_PREFIXES: &[&str] = &[
    "i want to hear",
    "search for",
    "listen to",
    "find me",
    "put on",
    "play",
    "find",
];

/// Turns free text into the string actually sent to providers.
pub trait QueryNormalizer: Send + Sync {
    fn normalize(&self, raw: &str) -> String;
}

/// Trims, collapses whitespace and drops a leading instruction phrase.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicNormalizer;

impl QueryNormalizer for BasicNormalizer {
    fn normalize(&self, raw: &str) -> String {
        let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
        strip_instruction(&collapsed).to_string()
    }
}

fn strip_instruction(query: &str) -> &str {
    for prefix in INSTRUCTION_PREFIXES {
        let Some(head) = query.get(..prefix.len()) else {
            continue;
        };
        if !head.eq_ignore_ascii_case(prefix) {
            continue;
        }
        let rest = &query[prefix.len()..];
        if rest.starts_with(' ') && !rest.trim_start().is_empty() {
            return rest.trim_start();
        }
    }
    query
}

/// Check a normalized query is something providers can be asked for.
pub fn validate_query(query: &str) -> Result<()> {
    if query.is_empty() {
        return Err(Error::InvalidInput("Query must not be empty".to_string()));
    }
    let chars = query.chars().count();
    if chars > MAX_QUERY_CHARS {
        return Err(Error::InvalidInput(format!(
            "Query is {} characters, maximum is {}",
            chars, MAX_QUERY_CHARS
        )));
    }
    if query.chars().any(char::is_control) {
        return Err(Error::InvalidInput(
            "Query contains control characters".to_string(),
        ));
    }
    Ok(())
}
