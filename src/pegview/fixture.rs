//! Example fixtures
//!
//! Example files pair a grammar with an input for demos and regression tests:
//!
//! ```text
//! title: Arithmetic
//! # comments start with '#'
//! highlighted: true
//! ---
//! sum = num ('+' num)*
//! num = [0-9]+
//! ---
//! 1+2+3
//! ```
//!
//! Header fields come first, one `key: value` per line, then a line starting
//! with `---`, the grammar, another `---` line, and the input. Grammar and
//! input are kept byte-for-byte.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::error::FixtureError;

static FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z0-9_]+):[ \t]*(.*?)[ \t]*$").expect("field pattern is valid")
});

const SEPARATOR: &str = "---";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fixture {
    pub title: String,
    pub highlighted: bool,
    pub grammar: String,
    pub input: String,
    /// Header fields other than `title` and `highlighted`.
    pub fields: BTreeMap<String, String>,
}

impl Fixture {
    pub fn parse(source: &str) -> Result<Fixture, FixtureError> {
        let mut lines = source.split_inclusive('\n').enumerate();

        let mut title = None;
        let mut highlighted = false;
        let mut fields = BTreeMap::new();
        let mut offset = 0;
        let mut separated = false;

        for (index, raw) in lines.by_ref() {
            offset += raw.len();
            let line = raw.trim_end_matches(['\n', '\r']);
            if line.starts_with(SEPARATOR) {
                separated = true;
                break;
            }
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            let caps = FIELD.captures(line).ok_or_else(|| FixtureError::InvalidField {
                line: index + 1,
                text: line.to_string(),
            })?;
            let (key, value) = (&caps[1], caps[2].to_string());
            match key {
                "title" => title = Some(value),
                "highlighted" => highlighted = value == "true",
                _ => {
                    fields.insert(key.to_string(), value);
                }
            }
        }
        if !separated {
            return Err(FixtureError::MissingSeparator { section: "grammar" });
        }

        let grammar_start = offset;
        let mut grammar_end = None;
        for (_, raw) in lines {
            if raw.starts_with(SEPARATOR) {
                grammar_end = Some(offset);
                offset += raw.len();
                break;
            }
            offset += raw.len();
        }
        let grammar_end = grammar_end.ok_or(FixtureError::MissingSeparator { section: "input" })?;

        Ok(Fixture {
            title: title.ok_or(FixtureError::MissingTitle)?,
            highlighted,
            grammar: source[grammar_start..grammar_end].to_string(),
            input: source[offset..].to_string(),
            fields,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Fixture, FixtureError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| FixtureError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Fixture::parse(&source)
    }
}

/// Load every `*.txt` fixture in `dir`, ordered by file name.
pub fn load_dir(dir: impl AsRef<Path>) -> Result<Vec<Fixture>, FixtureError> {
    let dir = dir.as_ref();
    let io_err = |source| FixtureError::Io {
        path: dir.display().to_string(),
        source,
    };

    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "txt") {
            paths.push(path);
        }
    }
    paths.sort();

    tracing::debug!(count = paths.len(), dir = %dir.display(), "loading fixtures");
    paths.iter().map(Fixture::load).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARITHMETIC: &str = "title: Arithmetic\n# a comment\nhighlighted: true\nauthor: me\n---\nsum = num ('+' num)*\nnum = [0-9]+\n---\n1+2+3\n";

    #[test]
    fn parses_header_grammar_and_input() {
        let fixture = Fixture::parse(ARITHMETIC).unwrap();
        assert_eq!(fixture.title, "Arithmetic");
        assert!(fixture.highlighted);
        assert_eq!(fixture.grammar, "sum = num ('+' num)*\nnum = [0-9]+\n");
        assert_eq!(fixture.input, "1+2+3\n");
        assert_eq!(fixture.fields.get("author").map(String::as_str), Some("me"));
    }

    #[test]
    fn highlighted_defaults_to_false() {
        let fixture = Fixture::parse("title: T\n---\ng = 'x'\n---\nx").unwrap();
        assert!(!fixture.highlighted);
        assert_eq!(fixture.input, "x");
    }

    #[test]
    fn input_may_be_empty() {
        let fixture = Fixture::parse("title: T\r\n---\r\ng = 'x'\r\n---\r\n").unwrap();
        assert_eq!(fixture.grammar, "g = 'x'\r\n");
        assert_eq!(fixture.input, "");
    }

    #[test]
    fn missing_separators_are_errors() {
        assert!(matches!(
            Fixture::parse("title: T\n"),
            Err(FixtureError::MissingSeparator { section: "grammar" })
        ));
        assert!(matches!(
            Fixture::parse("title: T\n---\ng = 'x'\n"),
            Err(FixtureError::MissingSeparator { section: "input" })
        ));
    }

    #[test]
    fn title_is_required() {
        assert!(matches!(
            Fixture::parse("---\ng = 'x'\n---\nx"),
            Err(FixtureError::MissingTitle)
        ));
    }

    #[test]
    fn rejects_malformed_header() {
        let err = Fixture::parse("title: T\nnot a field\n---\n---\n").unwrap_err();
        assert!(matches!(err, FixtureError::InvalidField { line: 2, .. }));
    }

    #[test]
    fn loads_directory_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.txt"), "title: B\n---\n---\nb").unwrap();
        fs::write(dir.path().join("a.txt"), "title: A\n---\n---\na").unwrap();
        fs::write(dir.path().join("notes.md"), "ignored").unwrap();

        let fixtures = load_dir(dir.path()).unwrap();
        let titles: Vec<_> = fixtures.iter().map(|f| f.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B"]);
    }
}
