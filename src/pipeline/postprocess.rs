//! Post-processing: unwrap Markdown that the model returned inside a fence.
//!
//! Models asked for raw Markdown still often answer with
//! ` ```markdown ... ``` `. The output must be the document itself, not a
//! quoted block, so [`strip`] removes that wrapping and nothing else: no
//! whitespace normalisation, no escaping, no structural checks.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_LEADING_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\A```(?:markdown)?\n").unwrap());

const TRAILING_FENCE: &str = "```";

/// Remove one leading and one trailing code fence.
///
/// - Leading: ` ```markdown\n ` or ` ```\n ` at the very start of the text.
/// - Trailing: ` ``` ` at the very end of the text. The newline before it is
///   kept as part of the content.
///
/// Each marker is removed at most once and only where it sits exactly at
/// the edge of the string. Text without fences is returned unchanged.
pub fn strip(text: &str) -> String {
    let s = match RE_LEADING_FENCE.find(text) {
        Some(m) => &text[m.end()..],
        None => text,
    };
    let s = s.strip_suffix(TRAILING_FENCE).unwrap_or(s);
    s.to_string()
}
