//! # pegview
//!
//! Visualizes what a PEG parsing engine did with a grammar and an input.
//!
//! The engine reports every rule-match attempt as a flat trace, plus a parse
//! tree on success or a diagnostic when the grammar itself does not compile.
//! pegview turns that into text and highlight ranges:
//!
//! - [`trace`](pegview::trace) decodes the flat trace into records
//! - [`tree`](pegview::tree) renders a parse tree
//! - [`trace_render`](pegview::trace_render) renders the attempt log, gaps included
//! - [`locator`](pegview::locator) picks the single most likely error span
//! - [`compile_error`](pegview::compile_error) explains grammar compile errors
//! - [`highlight`](pegview::highlight) projects ranges onto text surfaces as named sets
//!
//! [`attempt`](pegview::attempt) wires these together for one parse attempt.
//! Data flows one way, from the engine's output to the display; nothing here
//! calls back into the engine or keeps state between attempts.

pub mod pegview;

pub use pegview::attempt::{analyze, Outcome, ParseAttempt};
pub use pegview::config::PegviewConfig;
pub use pegview::error::{Error, Result};
