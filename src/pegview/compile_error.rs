//! Grammar compile error formatting
//!
//! When the engine cannot compile a grammar it reports a
//! [`GrammarCompileError`]. This module turns that diagnostic into a message
//! and highlight ranges on the grammar source: the offending rule's name at
//! its definition, and the reported line/column as a point.
//!
//! Finding the rule is a text search for the first line that looks like
//! `<name> =` with only whitespace before the name. A grammar that defines the
//! same name twice gets the first definition highlighted.
//!
//! The same line shape drives [`rule_definitions`], which labels every rule
//! name in a grammar whether or not it compiled.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::highlight::{HighlightRange, LabelledRange};
use super::text::{byte_to_char_offset, char_len, line_col_to_offset};

static DEFINITION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*(\w+)[ \t]*=").expect("definition pattern is valid")
});

/// Diagnostic reported when grammar compilation fails. `line` and `column`
/// are 1-based.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrammarCompileError {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fault_rule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
}

/// Message and grammar-source highlights for a compile error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompileErrorReport {
    pub message: String,
    /// Span of the rule name at its definition, when it could be found.
    pub rule_span: Option<HighlightRange>,
    /// Zero-width marker at the reported line/column.
    pub position: Option<HighlightRange>,
}

impl CompileErrorReport {
    /// All highlights, rule span first.
    pub fn highlights(&self) -> Vec<HighlightRange> {
        self.rule_span.into_iter().chain(self.position).collect()
    }
}

/// Build the message and highlights for `error` against `grammar`.
pub fn format_compile_error(grammar: &str, error: &GrammarCompileError) -> CompileErrorReport {
    let mut message = format!("{}: {}", error.kind, error.message);

    if let Some(fault_rule) = &error.fault_rule {
        message.push_str(&format!("\n  while compiling rule '{}'", fault_rule));
    }

    let rule_span = match error.rule.as_deref() {
        Some(rule) if !rule.is_empty() => {
            message.push_str(&format!("\n  in rule '{}'", rule));
            let span = find_rule_definition(grammar, rule);
            if span.is_none() {
                tracing::debug!(rule, "rule definition not found in grammar source");
            }
            span
        }
        _ => None,
    };

    let position = match (error.line, error.column) {
        (Some(line), Some(column)) => {
            message.push_str(&format!("\n  at line {}, column {}", line, column));
            Some(HighlightRange::point(line_col_to_offset(grammar, line, column)))
        }
        _ => None,
    };

    CompileErrorReport {
        message,
        rule_span,
        position,
    }
}

/// Span of `rule`'s name on the first line defining it (`<indent><rule><indent>=`).
pub fn find_rule_definition(grammar: &str, rule: &str) -> Option<HighlightRange> {
    if rule.is_empty() {
        return None;
    }
    let pattern = format!(r"(?m)^[ \t]*({})[ \t]*=", regex::escape(rule));
    let re = Regex::new(&pattern).ok()?;
    let name = re.captures(grammar)?.get(1)?;

    let start = byte_to_char_offset(grammar, name.start());
    Some(HighlightRange::new(start, start + char_len(rule) - 1))
}

/// Every rule definition in `grammar`, in source order, labelled with the
/// rule name. Repeated definitions are all reported.
pub fn rule_definitions(grammar: &str) -> Vec<LabelledRange> {
    DEFINITION
        .captures_iter(grammar)
        .filter_map(|caps| caps.get(1))
        .map(|name| {
            let start = byte_to_char_offset(grammar, name.start());
            let end = start + char_len(name.as_str()) - 1;
            LabelledRange::new(HighlightRange::new(start, end), name.as_str())
        })
        .collect()
}
