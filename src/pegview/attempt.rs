//! Parse-attempt pipeline
//!
//! A [`ParseAttempt`] is everything an engine adapter reports for one parse:
//! the grammar and input texts, the rule table, the flat trace and either a
//! parse tree or a grammar compile error. [`analyze`] runs
//! decode → render/locate once over it and yields a [`Report`]: the
//! [`Outcome`] plus the rule labels for both editors. [`Report::project`]
//! then pushes every highlight set onto the grammar, input and output
//! surfaces.
//!
//! A tree means the engine accepted the input. Failed attempts in its trace
//! are backtracking, so only unmatched trailing input can still turn it into
//! an error.
//!
//! Nothing here is kept between attempts. Each call starts from scratch.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::compile_error::{
    format_compile_error, rule_definitions, CompileErrorReport, GrammarCompileError,
};
use super::config::PegviewConfig;
use super::error::{AttemptError, TraceError};
use super::highlight::{project, project_labelled, HighlightRange, HighlightSurface, LabelledRange};
use super::locator::{locate, locate_trailing, ErrorLocation};
use super::trace::{decode, DecodedTrace, RuleTable};
use super::trace_render::{render_trace_with, TraceRendering};
use super::tree::{render_tree, ParseTreeNode};

/// Engine output for one parse attempt, as JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseAttempt {
    #[serde(default)]
    pub grammar: String,
    #[serde(default)]
    pub input: String,
    #[serde(default)]
    pub rules: Vec<String>,
    #[serde(default)]
    pub trace: Vec<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tree: Option<ParseTreeNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compile_error: Option<GrammarCompileError>,
}

impl ParseAttempt {
    pub fn from_json(json: &str) -> Result<ParseAttempt, AttemptError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<ParseAttempt, AttemptError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn rule_table(&self) -> RuleTable {
        RuleTable::new(self.rules.iter().cloned())
    }
}

/// What one parse attempt amounts to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum Outcome {
    /// The grammar did not compile; there is no tree or trace to show.
    CompileFailed(CompileErrorReport),
    /// A tree and no error to report.
    Parsed { tree: String },
    /// The parse failed or stopped early.
    ///
    /// `tree` is the rendered tree when the engine still produced one.
    /// Without it the trace log is the rendering.
    ParseFailed {
        tree: Option<String>,
        location: Option<ErrorLocation>,
        trace: TraceRendering,
    },
}

impl Outcome {
    /// Text to display in the output pane.
    pub fn rendering(&self) -> &str {
        match self {
            Outcome::CompileFailed(report) => &report.message,
            Outcome::Parsed { tree } => tree,
            Outcome::ParseFailed {
                tree: Some(tree), ..
            } => tree,
            Outcome::ParseFailed { trace, .. } => &trace.text,
        }
    }

    /// Error span on the input text, if one was located.
    pub fn error_span(&self) -> Option<HighlightRange> {
        match self {
            Outcome::ParseFailed {
                location: Some(location),
                ..
            } => Some(location.span),
            _ => None,
        }
    }

    /// Replace this outcome's highlight sets on the three surfaces.
    ///
    /// Sets that do not apply to this outcome are projected empty, which
    /// clears whatever an earlier attempt left behind.
    pub fn project<G, I, O>(&self, config: &PegviewConfig, grammar: &mut G, input: &mut I, output: &mut O)
    where
        G: HighlightSurface + ?Sized,
        I: HighlightSurface + ?Sized,
        O: HighlightSurface + ?Sized,
    {
        let names = &config.highlight;

        let grammar_ranges = match self {
            Outcome::CompileFailed(report) => report.highlights(),
            _ => Vec::new(),
        };
        project(grammar, &grammar_ranges, &names.grammar_set);

        let input_ranges: Vec<HighlightRange> = self.error_span().into_iter().collect();
        project(input, &input_ranges, &names.error_set);

        let output_ranges = match self {
            Outcome::ParseFailed {
                tree: None, trace, ..
            } => trace.failures.clone(),
            _ => Vec::new(),
        };
        project(output, &output_ranges, &names.trace_failure_set);
    }
}

/// Everything derived from one attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub outcome: Outcome,
    /// Rule names at their definitions in the grammar source.
    pub rule_definitions: Vec<LabelledRange>,
    /// Input spans of the rule matches that make up the parse, ordered by
    /// start, outer matches first. Empty unless the engine produced a tree.
    pub rule_matches: Vec<LabelledRange>,
}

impl Report {
    /// Replace every highlight set on the three surfaces: the outcome's own
    /// sets plus the labelled rule sets.
    pub fn project<G, I, O>(&self, config: &PegviewConfig, grammar: &mut G, input: &mut I, output: &mut O)
    where
        G: HighlightSurface + ?Sized,
        I: HighlightSurface + ?Sized,
        O: HighlightSurface + ?Sized,
    {
        self.outcome.project(config, grammar, input, output);
        let names = &config.highlight;
        project_labelled(grammar, &self.rule_definitions, &names.rule_definition_set);
        project_labelled(input, &self.rule_matches, &names.rule_match_set);
    }
}

/// Run the pipeline over one attempt.
///
/// Fails only when the engine's trace breaks its contract.
pub fn analyze(attempt: &ParseAttempt, config: &PegviewConfig) -> Result<Report, TraceError> {
    let rule_definitions = rule_definitions(&attempt.grammar);

    if let Some(error) = &attempt.compile_error {
        tracing::debug!(kind = %error.kind, "grammar failed to compile");
        return Ok(Report {
            outcome: Outcome::CompileFailed(format_compile_error(&attempt.grammar, error)),
            rule_definitions,
            rule_matches: Vec::new(),
        });
    }

    let rules = attempt.rule_table();
    let trace = decode(&attempt.trace, &rules)?;

    let Some(tree) = &attempt.tree else {
        let location = locate(&trace, &attempt.input);
        return Ok(Report {
            outcome: Outcome::ParseFailed {
                tree: None,
                location,
                trace: render_trace_with(&attempt.input, &rules, &trace, &config.trace.indent),
            },
            rule_definitions,
            rule_matches: Vec::new(),
        });
    };

    let rendered = render_tree(tree, config.tree.style);
    let outcome = match locate_trailing(&trace, &attempt.input) {
        None => Outcome::Parsed { tree: rendered },
        Some(location) => Outcome::ParseFailed {
            tree: Some(rendered),
            location: Some(location),
            trace: render_trace_with(&attempt.input, &rules, &trace, &config.trace.indent),
        },
    };
    Ok(Report {
        outcome,
        rule_definitions,
        rule_matches: rule_matches(&trace, &rules),
    })
}

/// Labelled input spans of the surviving, non-empty matches.
fn rule_matches(trace: &DecodedTrace, rules: &RuleTable) -> Vec<LabelledRange> {
    let mut matches: Vec<(usize, LabelledRange)> = trace
        .surviving_successes()
        .into_iter()
        .filter(|record| !record.is_zero_width())
        .map(|record| {
            let range = HighlightRange::new(record.start, record.end - 1);
            (record.depth, LabelledRange::new(range, rules.name(record.attempt)))
        })
        .collect();
    matches.sort_by_key(|(depth, labelled)| (labelled.range.start, *depth));
    matches.into_iter().map(|(_, labelled)| labelled).collect()
}
