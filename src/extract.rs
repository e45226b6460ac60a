//! Fenced code block extraction from model output.
//!
//! Model replies are semi-structured text; the generated source is expected
//! inside a fenced block. The accepted grammar is:
//!
//! ```text
//! block   = fence tag eol body fence
//! fence   = "```" at the start of a line
//! tag     = "javascript" | "js"
//! body    = any lines up to the next closing fence
//! ```
//!
//! The first matching block wins and its body is returned with surrounding
//! whitespace trimmed. Anything else — no fence, an unterminated fence, a
//! different language tag — is "no parsable block", which callers treat as a
//! recovered generation failure.

use std::sync::LazyLock;

use regex::Regex;

static FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?ms)^```(?:javascript|js)[ \t]*\r?\n(.*?)^```").unwrap()
});

/// Extract the first fenced JavaScript block from `text`.
pub fn extract_fenced_block(text: &str) -> Option<String> {
    FENCE_RE
        .captures(text)
        .map(|cap| cap[1].trim().to_string())
}
