//! Command-line interface for pegview
//! Renders what a PEG engine reported for one parse attempt: the parse tree, the
//! attempt trace with the located error, or a grammar compile error.
//!
//! Usage:
//!   pegview render `<attempt.json>` [--format `<text|json>`]  - Render the outcome of a parse attempt
//!   pegview trace `<attempt.json>`                           - Print the annotated attempt trace
//!   pegview fixture `<file|dir>` [--format `<text|json>`]    - List example fixtures
//!
//! Global options: `--config <path>` layers a TOML file over the defaults,
//! `--tree-style <connectors|bars>` overrides the file's tree style,
//! `--verbose` raises the log level (also controlled by PEGVIEW_LOG / RUST_LOG).

use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::Path;
use tracing_subscriber::EnvFilter;

use pegview::pegview::attempt::{analyze, Outcome, ParseAttempt};
use pegview::pegview::config::{ConfigLayers, PegviewConfig, TreeStyle};
use pegview::pegview::error::AttemptError;
use pegview::pegview::fixture::{load_dir, Fixture};
use pegview::pegview::highlight::{HighlightLayers, HighlightRange};
use pegview::pegview::locator::ErrorCause;
use pegview::pegview::text::{char_len, line_text, offset_to_line_col};
use pegview::pegview::trace::decode;
use pegview::pegview::trace_render::render_trace_with;

fn main() {
    let matches = Command::new("pegview")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A tool for inspecting PEG parse trees, traces and errors")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .help("TOML file layered over the built-in defaults"),
        )
        .arg(
            Arg::new("tree-style")
                .long("tree-style")
                .global(true)
                .value_parser(["connectors", "bars"])
                .help("How tree lines show ancestry (overrides the config file)"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log at debug level unless PEGVIEW_LOG or RUST_LOG is set"),
        )
        .subcommand(
            Command::new("render")
                .about("Render the outcome of a parse attempt")
                .arg(path_arg("Path to the parse attempt JSON"))
                .arg(format_arg()),
        )
        .subcommand(
            Command::new("trace")
                .about("Print the annotated attempt trace")
                .arg(path_arg("Path to the parse attempt JSON")),
        )
        .subcommand(
            Command::new("fixture")
                .about("List example fixtures from a file or directory")
                .arg(path_arg("Fixture file or directory of *.txt fixtures"))
                .arg(format_arg()),
        )
        .get_matches();

    init_logging(matches.get_flag("verbose"));

    if let Err(e) = run(&matches) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn path_arg(help: &'static str) -> Arg {
    Arg::new("path").help(help).required(true).index(1)
}

fn format_arg() -> Arg {
    Arg::new("format")
        .long("format")
        .short('f')
        .help("Output format")
        .value_parser(["text", "json"])
        .default_value("text")
}

/// Log to stderr. PEGVIEW_LOG takes priority over RUST_LOG.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = std::env::var("PEGVIEW_LOG")
        .ok()
        .and_then(|spec| EnvFilter::try_new(spec).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(matches: &ArgMatches) -> pegview::Result<()> {
    let config = load_config(matches)?;

    match matches.subcommand() {
        Some(("render", sub)) => handle_render_command(sub, &config),
        Some(("trace", sub)) => handle_trace_command(sub, &config),
        Some(("fixture", sub)) => handle_fixture_command(sub),
        _ => unreachable!(),
    }
}

fn load_config(matches: &ArgMatches) -> pegview::Result<PegviewConfig> {
    let mut layers = ConfigLayers::new();
    if let Some(path) = matches.get_one::<String>("config") {
        layers = layers.user_file(path);
    }
    match matches.get_one::<String>("tree-style").map(String::as_str) {
        Some("bars") => layers = layers.tree_style(TreeStyle::Bars)?,
        Some(_) => layers = layers.tree_style(TreeStyle::Connectors)?,
        None => {}
    }
    Ok(layers.load()?)
}

fn required_path(matches: &ArgMatches) -> &str {
    matches
        .get_one::<String>("path")
        .map(String::as_str)
        .unwrap_or_default()
}

fn wants_json(matches: &ArgMatches) -> bool {
    matches.get_one::<String>("format").map(String::as_str) == Some("json")
}

/// Handle the render command
fn handle_render_command(matches: &ArgMatches, config: &PegviewConfig) -> pegview::Result<()> {
    let attempt = ParseAttempt::load(required_path(matches))?;
    let report = analyze(&attempt, config)?;

    if wants_json(matches) {
        let json = serde_json::to_string_pretty(&report).map_err(AttemptError::from)?;
        println!("{}", json);
        return Ok(());
    }

    let outcome = &report.outcome;
    let mut grammar = HighlightLayers::new(attempt.grammar.as_str());
    let mut input = HighlightLayers::new(attempt.input.as_str());
    let mut output = HighlightLayers::new(outcome.rendering());
    report.project(config, &mut grammar, &mut input, &mut output);

    match outcome {
        Outcome::CompileFailed(error) => {
            println!("Grammar failed to compile:\n{}", error.message);
            let spans = error.highlights();
            for span in &spans {
                print!("{}", excerpt(grammar.text(), *span));
            }
            note_unprojected(&grammar, &config.highlight.grammar_set, spans.len());
        }
        Outcome::Parsed { tree } => print!("{}", tree),
        Outcome::ParseFailed {
            location, trace, ..
        } => {
            print!("{}", output.text());
            match location {
                Some(location) => {
                    let (line, column) = offset_to_line_col(input.text(), location.span.start);
                    let why = match location.cause {
                        ErrorCause::TrailingInput { .. } => "input continues past the match".to_string(),
                        ErrorCause::FailedRule { attempt: rule, .. } => {
                            format!("rule '{}' failed", attempt.rule_table().name(rule))
                        }
                    };
                    println!("\nError at line {}, column {}: {}", line, column, why);
                    print!("{}", excerpt(input.text(), location.span));
                    note_unprojected(&input, &config.highlight.error_set, 1);
                }
                None => println!("\nParse failed, but no error position could be located"),
            }
            if !trace.failures.is_empty() {
                println!("{} failed attempts in trace", trace.failures.len());
            }
        }
    }
    Ok(())
}

/// Say so when projection dropped some of the `located` spans of `set`: a
/// span covering one position, or lying past the end of the text, has no
/// extent to highlight.
fn note_unprojected(layers: &HighlightLayers, set: &str, located: usize) {
    let kept = layers.get(set).map_or(0, <[HighlightRange]>::len);
    if kept < located {
        println!(
            "note: {} of {} located span(s) have no extent on the text (a single position, or past its end) and are not projected as '{}' highlights",
            located - kept,
            located,
            set
        );
    }
}

/// Handle the trace command
fn handle_trace_command(matches: &ArgMatches, config: &PegviewConfig) -> pegview::Result<()> {
    let attempt = ParseAttempt::load(required_path(matches))?;
    let rules = attempt.rule_table();
    let trace = decode(&attempt.trace, &rules)?;
    let rendering = render_trace_with(&attempt.input, &rules, &trace, &config.trace.indent);

    print!("{}", rendering.text);
    let failed: Vec<&str> = trace.failures().map(|r| rules.name(r.attempt)).collect();
    if !failed.is_empty() {
        println!("\nFailed rules: {}", failed.join(", "));
    }
    Ok(())
}

/// Handle the fixture command
fn handle_fixture_command(matches: &ArgMatches) -> pegview::Result<()> {
    let path = Path::new(required_path(matches));
    let fixtures = if path.is_dir() {
        load_dir(path)?
    } else {
        vec![Fixture::load(path)?]
    };

    if wants_json(matches) {
        let json = serde_json::to_string_pretty(&fixtures).map_err(AttemptError::from)?;
        println!("{}", json);
        return Ok(());
    }

    for fixture in &fixtures {
        let marker = if fixture.highlighted { " *" } else { "" };
        println!("{}{}", fixture.title, marker);
        println!(
            "    grammar: {} lines, input: {} chars",
            fixture.grammar.lines().count(),
            char_len(&fixture.input)
        );
    }
    Ok(())
}

/// Source line of `span.start` with a caret underline, limited to that line.
fn excerpt(text: &str, span: HighlightRange) -> String {
    let (line, column) = offset_to_line_col(text, span.start);
    let source = line_text(text, line);
    let room = char_len(source).saturating_sub(column - 1).max(1);
    let width = (span.end.saturating_sub(span.start) + 1).min(room);

    let gutter = line.to_string();
    format!(
        "{} | {}\n{} | {}{}\n",
        gutter,
        source,
        " ".repeat(gutter.len()),
        " ".repeat(column - 1),
        "^".repeat(width)
    )
}
