//! Error types for pegview.
//!
//! Only malformed input is an error here. A failed parse, an incomplete parse
//! or a grammar that does not compile are ordinary outcomes and are modelled as
//! values by the modules that produce them.

use thiserror::Error;

/// Result type alias using pegview's top-level error.
pub type Result<T> = std::result::Result<T, Error>;

/// Upstream engine output that breaks the trace contract.
///
/// These are programming errors in the engine adapter, not user mistakes. The
/// current render is aborted; nothing is recovered from a partially valid trace.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TraceError {
    /// The flat buffer does not hold a whole number of 4-integer records
    #[error("trace buffer length {len} is not a multiple of 4")]
    Truncated { len: usize },

    /// A record names a rule the rule table does not have
    #[error("record {record} refers to rule {index}, but the rule table has {rules} rules")]
    UnknownRule {
        record: usize,
        index: i64,
        rules: usize,
    },

    /// Negative depth or offsets, or a start past the end
    #[error("record {record} is invalid: {reason}")]
    InvalidRecord { record: usize, reason: String },
}

/// Failures while reading a parse attempt produced by an engine adapter.
#[derive(Error, Debug)]
pub enum AttemptError {
    #[error("could not read parse attempt: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed parse attempt JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Trace(#[from] TraceError),
}

/// Failures while loading example fixtures.
#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("could not read fixture {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("fixture is missing the '---' separator before the {section}")]
    MissingSeparator { section: &'static str },

    #[error("fixture has no 'title' field")]
    MissingTitle,

    #[error("line {line}: expected 'key: value' header field, found {text:?}")]
    InvalidField { line: usize, text: String },
}

/// Top-level error for callers that drive the whole tool.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Attempt(#[from] AttemptError),

    #[error(transparent)]
    Fixture(#[from] FixtureError),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl From<TraceError> for Error {
    fn from(err: TraceError) -> Self {
        Error::Attempt(AttemptError::Trace(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trace_errors_name_the_record() {
        let err = TraceError::UnknownRule {
            record: 3,
            index: 9,
            rules: 2,
        };
        assert_eq!(
            err.to_string(),
            "record 3 refers to rule 9, but the rule table has 2 rules"
        );
    }

    #[test]
    fn trace_error_lifts_into_top_level() {
        let err: Error = TraceError::Truncated { len: 7 }.into();
        assert_eq!(err.to_string(), "trace buffer length 7 is not a multiple of 4");
    }
}
