//! Thread splitting: turn one completion into an ordered list of posts.
//!
//! Two rules exist because vendors number their output differently:
//!
//! - [`SplitRule::NumberedBlocks`] splits only where a line starts with
//!   `N.` or `N/` followed by whitespace, so a post spanning several lines
//!   stays whole.
//! - [`SplitRule::Lines`] treats every non-blank line as its own post and
//!   strips a leading `N.` prefix.

use std::sync::LazyLock;

use regex::Regex;

static POST_NUMBER_AHEAD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+[./]\s").expect("valid regex"));
static POST_NUMBER_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+[./]\s*").expect("valid regex"));
static LINE_NUMBER_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s*").expect("valid regex"));

/// How a provider's thread output is cut into posts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SplitRule {
    /// Split before numbered lines only; keeps multi-line posts intact.
    NumberedBlocks,
    /// Split on every non-blank line.
    Lines,
}

/// Split `text` into posts according to `rule`.
///
/// Never returns an empty list for non-blank input: if no segment survives,
/// the trimmed text is returned as a single post.
pub fn split_thread(text: &str, rule: SplitRule) -> Vec<String> {
    let posts = match rule {
        SplitRule::NumberedBlocks => split_numbered_blocks(text),
        SplitRule::Lines => split_lines(text),
    };

    let trimmed = text.trim();
    if posts.is_empty() && !trimmed.is_empty() {
        vec![trimmed.to_string()]
    } else {
        posts
    }
}

fn split_numbered_blocks(text: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut start = 0;

    for (idx, _) in text.match_indices('\n') {
        if POST_NUMBER_AHEAD.is_match(&text[idx + 1..]) {
            segments.push(&text[start..idx]);
            start = idx + 1;
        }
    }
    segments.push(&text[start..]);

    segments
        .into_iter()
        .map(|s| POST_NUMBER_PREFIX.replace(s, "").trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn split_lines(text: &str) -> Vec<String> {
    text.split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(|line| LINE_NUMBER_PREFIX.replace(line, "").trim().to_string())
        .filter(|post| !post.is_empty())
        .collect()
}
