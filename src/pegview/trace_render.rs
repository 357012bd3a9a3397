//! Trace log rendering
//!
//! Turns a decoded trace into a text log, one line per attempt in the order
//! the engine made them:
//!
//! ```text
//! expr "1+"
//!   num "1"
//!   op "+"
//!   num ""
//! " "
//! ```
//!
//! Input that lies between the end of one attempt and the start of the next
//! is shown as a quoted "gap" line at the previous attempt's depth, so skipped
//! text never disappears from the log.
//!
//! Alongside the text the renderer returns one [`HighlightRange`] per failed
//! attempt. The range covers the rule name on that line (offsets into the
//! rendered log, not the input) so a display can flag which rule failed.

use serde::Serialize;

use super::highlight::HighlightRange;
use super::text::{char_len, char_slice, escape_inline};
use super::trace::{DecodedTrace, RuleTable};

/// Default indentation unit per depth level.
pub const DEFAULT_INDENT: &str = "  ";

/// Rendered trace log plus the rule-name spans of failed attempts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TraceRendering {
    pub text: String,
    pub failures: Vec<HighlightRange>,
}

/// Accumulates output while tracking its length in chars.
struct LogWriter {
    text: String,
    chars: usize,
}

impl LogWriter {
    fn push(&mut self, s: &str) {
        self.chars += char_len(s);
        self.text.push_str(s);
    }
}

/// Render with the default indentation.
pub fn render_trace(input: &str, rules: &RuleTable, trace: &DecodedTrace) -> TraceRendering {
    render_trace_with(input, rules, trace, DEFAULT_INDENT)
}

/// Render a trace log, repeating `indent` once per depth level.
pub fn render_trace_with(
    input: &str,
    rules: &RuleTable,
    trace: &DecodedTrace,
    indent: &str,
) -> TraceRendering {
    let chars: Vec<char> = input.chars().collect();
    let mut out = LogWriter {
        text: String::new(),
        chars: 0,
    };
    let mut failures = Vec::new();

    let mut previous_end: Option<usize> = None;
    let mut previous_depth = 0;

    for record in trace {
        if let Some(prev) = previous_end {
            if record.start > prev {
                let gap = char_slice(&chars, prev, record.start);
                out.push(&indent.repeat(previous_depth));
                out.push(&format!("\"{}\"\n", escape_inline(&gap)));
            }
        }

        out.push(&indent.repeat(record.depth));

        let name = rules.name(record.attempt);
        let name_len = char_len(name);
        if !record.ok() && name_len > 0 {
            failures.push(HighlightRange::new(out.chars, out.chars + name_len - 1));
        }
        out.push(name);

        let matched = char_slice(&chars, record.start, record.end);
        out.push(&format!(" \"{}\"\n", escape_inline(&matched)));

        tracing::trace!(
            rule = name,
            ok = record.ok(),
            depth = record.depth,
            start = record.start,
            end = record.end,
            "trace line"
        );

        previous_end = Some(record.end);
        previous_depth = record.depth;
    }

    TraceRendering {
        text: out.text,
        failures,
    }
}
