//! Error localization
//!
//!     Picks the single most likely error span from a decoded trace. The
//!     span is inclusive and indexes the input text by char.
//!
//!     The decision runs in three steps:
//!
//!     1. Trailing input. If the furthest successful top-level (depth 0)
//!        attempt ends before the input does, the parse matched only a prefix.
//!        The unmatched tail is the answer and nothing else is considered.
//!     2. Furthest failure. Otherwise the failed attempt with the greatest
//!        end wins; equal ends go to the deeper attempt. No failures means no
//!        error.
//!     3. Token expansion. From the winning end position, widen the span over
//!        the identifier-like token there, or over a little context when the
//!        position is a line break.
//!
//!     A parse that produced a tree only gets step 1: failures recorded on
//!     the way to a successful parse are ordinary backtracking, see
//!     [`locate_trailing`].
//!
//!     Step 3 is a heuristic: it marks the word the engine stopped at, which
//!     is not always the word that is wrong.

use serde::Serialize;

use super::highlight::HighlightRange;
use super::trace::{Attempt, DecodedTrace};

/// Why a span was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ErrorCause {
    /// Top-level rules matched up to `matched_end` and stopped.
    TrailingInput { matched_end: usize },
    /// The furthest-reaching failed attempt.
    FailedRule {
        attempt: Attempt,
        depth: usize,
        end: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ErrorLocation {
    pub span: HighlightRange,
    pub cause: ErrorCause,
}

/// Locate the most likely error span, or `None` when there is nothing to
/// report.
pub fn locate_error(trace: &DecodedTrace, input: &str) -> Option<HighlightRange> {
    locate(trace, input).map(|location| location.span)
}

/// Like [`locate_error`], also reporting which step produced the span.
pub fn locate(trace: &DecodedTrace, input: &str) -> Option<ErrorLocation> {
    if let Some(location) = locate_trailing(trace, input) {
        return Some(location);
    }
    let chars: Vec<char> = input.chars().collect();

    let mut furthest = None;
    for record in trace.failures() {
        furthest = match furthest {
            None => Some(record),
            Some(best)
                if record.end > best.end
                    || (record.end == best.end && record.depth > best.depth) =>
            {
                Some(record)
            }
            keep => keep,
        };
    }
    let failure = furthest?;

    tracing::debug!(
        rule = failure.rule_index(),
        depth = failure.depth,
        end = failure.end,
        "furthest failed attempt"
    );
    Some(ErrorLocation {
        span: expand_token(&chars, failure.end),
        cause: ErrorCause::FailedRule {
            attempt: failure.attempt,
            depth: failure.depth,
            end: failure.end,
        },
    })
}

/// Only the trailing-input check: the unmatched tail when the furthest
/// successful top-level attempt stops short of the input's end.
///
/// This is the whole check for a parse that produced a tree.
pub fn locate_trailing(trace: &DecodedTrace, input: &str) -> Option<ErrorLocation> {
    let input_len = input.chars().count();
    let matched_end = trace
        .iter()
        .filter(|r| r.depth == 0 && r.ok())
        .map(|r| r.end)
        .max()?;
    if matched_end >= input_len {
        return None;
    }

    tracing::debug!(matched_end, input_len, "input continues past top-level match");
    Some(ErrorLocation {
        span: HighlightRange::new(matched_end, input_len - 1),
        cause: ErrorCause::TrailingInput { matched_end },
    })
}

/// Characters that make up identifier-like tokens.
pub fn is_token_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Widen a position into the span worth highlighting.
///
/// Out-of-range positions and single punctuation characters come back as
/// `{pos, pos}`. A line break widens to one char either side (clamped to
/// `[0, len]`). A token char extends forward to the end of its token.
pub fn expand_token(chars: &[char], pos: usize) -> HighlightRange {
    let len = chars.len();
    let Some(&c) = chars.get(pos) else {
        return HighlightRange::point(pos);
    };

    if c == '\n' || c == '\r' {
        return HighlightRange::new(pos.saturating_sub(1), (pos + 1).min(len));
    }
    if !is_token_char(c) {
        return HighlightRange::point(pos);
    }

    let mut end = pos;
    while end + 1 < len && is_token_char(chars[end + 1]) {
        end += 1;
    }
    HighlightRange::new(pos, end)
}
