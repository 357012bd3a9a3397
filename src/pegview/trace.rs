//! Trace decoding
//!
//!     The parsing engine reports every rule-match attempt as a flat integer
//!     buffer, four integers per attempt: `(rule_ref, depth, start, end)`.
//!     A negative `rule_ref` marks a failed (backtracked) attempt whose rule
//!     index is `-rule_ref - 1`.
//!
//!     This module is the only place that indexes the flat buffer. Everything
//!     downstream works on [`TraceRecord`]s, where the sign convention has
//!     already been turned into [`Attempt::Success`] / [`Attempt::Failure`].
//!
//!     Records keep the order the engine attempted them in.

use serde::Serialize;

use super::error::TraceError;

/// Width of one record in the flat trace buffer.
pub const RECORD_WIDTH: usize = 4;

/// Ordered rule names of one compiled grammar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RuleTable {
    names: Vec<String>,
}

impl RuleTable {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RuleTable {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Name of the rule an attempt refers to.
    ///
    /// Decoded records always carry an index that is valid for the table they
    /// were decoded against.
    pub fn name(&self, attempt: Attempt) -> &str {
        self.get(attempt.rule_index()).unwrap_or("?")
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Outcome of one rule-match attempt, carrying the rule index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "rule", rename_all = "lowercase")]
pub enum Attempt {
    Success(usize),
    Failure(usize),
}

impl Attempt {
    /// Decode the signed rule reference of the wire format.
    ///
    /// `None` when the rule index does not fit in `usize`.
    pub fn from_rule_ref(rule_ref: i64) -> Option<Self> {
        let index = usize::try_from(wire_index(rule_ref)).ok()?;
        Some(if rule_ref >= 0 {
            Attempt::Success(index)
        } else {
            Attempt::Failure(index)
        })
    }

    pub fn rule_index(self) -> usize {
        match self {
            Attempt::Success(index) | Attempt::Failure(index) => index,
        }
    }

    pub fn is_ok(self) -> bool {
        matches!(self, Attempt::Success(_))
    }

    pub fn is_failure(self) -> bool {
        !self.is_ok()
    }
}

/// One decoded attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TraceRecord {
    pub attempt: Attempt,
    pub depth: usize,
    pub start: usize,
    pub end: usize,
}

impl TraceRecord {
    pub fn ok(&self) -> bool {
        self.attempt.is_ok()
    }

    pub fn rule_index(&self) -> usize {
        self.attempt.rule_index()
    }

    pub fn is_zero_width(&self) -> bool {
        self.start == self.end
    }
}

/// A validated, chronologically ordered sequence of trace records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DecodedTrace {
    records: Vec<TraceRecord>,
}

impl DecodedTrace {
    pub fn records(&self) -> &[TraceRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TraceRecord> {
        self.records.iter()
    }

    /// Failed attempts, in trace order.
    pub fn failures(&self) -> impl Iterator<Item = &TraceRecord> {
        self.records.iter().filter(|r| !r.ok())
    }

    /// Successful attempts whose enclosing attempts all succeeded too, in
    /// trace order: the matches that make up the final parse.
    ///
    /// The engine reports a parent right after its children, so walking
    /// backwards meets each parent before anything nested in it.
    pub fn surviving_successes(&self) -> Vec<&TraceRecord> {
        let mut alive: Vec<bool> = Vec::new();
        let mut kept = Vec::new();
        for record in self.records.iter().rev() {
            let parent_alive = match record.depth.checked_sub(1) {
                None => true,
                Some(parent) => alive.get(parent).copied().unwrap_or(true),
            };
            let survives = record.ok() && parent_alive;
            if alive.len() <= record.depth {
                alive.resize(record.depth + 1, true);
            }
            alive[record.depth] = survives;
            if survives {
                kept.push(record);
            }
        }
        kept.reverse();
        kept
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl From<Vec<TraceRecord>> for DecodedTrace {
    fn from(records: Vec<TraceRecord>) -> Self {
        DecodedTrace { records }
    }
}

impl<'a> IntoIterator for &'a DecodedTrace {
    type Item = &'a TraceRecord;
    type IntoIter = std::slice::Iter<'a, TraceRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Decode a flat trace buffer against the grammar's rule table.
///
/// The whole buffer is rejected on the first contract violation: a length
/// that is not a multiple of [`RECORD_WIDTH`], a rule index outside `rules`,
/// a negative depth or offset, or `start > end`.
pub fn decode(history: &[i64], rules: &RuleTable) -> Result<DecodedTrace, TraceError> {
    if history.len() % RECORD_WIDTH != 0 {
        return Err(TraceError::Truncated {
            len: history.len(),
        });
    }

    let mut records = Vec::with_capacity(history.len() / RECORD_WIDTH);
    for (record, chunk) in history.chunks_exact(RECORD_WIDTH).enumerate() {
        let (rule_ref, depth, start, end) = (chunk[0], chunk[1], chunk[2], chunk[3]);

        let attempt = Attempt::from_rule_ref(rule_ref)
            .filter(|attempt| attempt.rule_index() < rules.len())
            .ok_or_else(|| TraceError::UnknownRule {
                record,
                index: wire_index(rule_ref),
                rules: rules.len(),
            })?;

        let depth = non_negative(record, "depth", depth)?;
        let start = non_negative(record, "start", start)?;
        let end = non_negative(record, "end", end)?;
        if start > end {
            return Err(TraceError::InvalidRecord {
                record,
                reason: format!("start {} is past end {}", start, end),
            });
        }

        records.push(TraceRecord {
            attempt,
            depth,
            start,
            end,
        });
    }

    tracing::debug!(
        records = records.len(),
        failures = records.iter().filter(|r| !r.ok()).count(),
        "decoded trace"
    );
    Ok(DecodedTrace { records })
}

/// Rule index carried by a signed rule reference; never negative.
fn wire_index(rule_ref: i64) -> i64 {
    if rule_ref >= 0 {
        rule_ref
    } else {
        -(rule_ref + 1)
    }
}

fn non_negative(record: usize, field: &str, value: i64) -> Result<usize, TraceError> {
    usize::try_from(value).map_err(|_| TraceError::InvalidRecord {
        record,
        reason: format!("{} is negative ({})", field, value),
    })
}
