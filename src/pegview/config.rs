//! Configuration loading
//!
//! Every key has a value in `defaults/pegview.default.toml`, which is compiled
//! in. A `--config` file and command-line flags are layered over it with
//! [`ConfigLayers`]; the file only needs the keys it changes.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../../defaults/pegview.default.toml");

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PegviewConfig {
    pub tree: TreeConfig,
    pub trace: TraceConfig,
    pub highlight: HighlightConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TreeConfig {
    pub style: TreeStyle,
}

/// How tree lines show ancestry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TreeStyle {
    #[default]
    Connectors,
    Bars,
}

impl TreeStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            TreeStyle::Connectors => "connectors",
            TreeStyle::Bars => "bars",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TraceConfig {
    pub indent: String,
}

/// Names of the highlight sets produced for each surface.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HighlightConfig {
    pub error_set: String,
    pub trace_failure_set: String,
    pub grammar_set: String,
    /// Input spans of successful rule matches, labelled by rule.
    pub rule_match_set: String,
    /// Rule names at their definitions in the grammar, labelled by rule.
    pub rule_definition_set: String,
}

/// Builds a [`PegviewConfig`] from the embedded defaults, then an optional
/// user file, then command-line settings. Later layers win key by key.
#[derive(Debug, Clone)]
pub struct ConfigLayers {
    builder: ConfigBuilder<DefaultState>,
}

impl ConfigLayers {
    pub fn new() -> Self {
        ConfigLayers {
            builder: Config::builder()
                .add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml)),
        }
    }

    /// Add a user TOML file. It must exist when [`ConfigLayers::load`] runs.
    pub fn user_file(mut self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "layering user config");
        self.builder = self
            .builder
            .add_source(File::from(path).format(FileFormat::Toml).required(true));
        self
    }

    pub fn tree_style(self, style: TreeStyle) -> Result<Self, ConfigError> {
        self.set("tree.style", style.as_str())
    }

    pub fn trace_indent(self, indent: &str) -> Result<Self, ConfigError> {
        self.set("trace.indent", indent)
    }

    /// Override any key by its dotted path, e.g. `highlight.error_set`.
    pub fn set<V: Into<ValueKind>>(mut self, key: &str, value: V) -> Result<Self, ConfigError> {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn load(self) -> Result<PegviewConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for ConfigLayers {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for PegviewConfig {
    fn default() -> Self {
        PegviewConfig {
            tree: TreeConfig {
                style: TreeStyle::Connectors,
            },
            trace: TraceConfig {
                indent: "  ".to_string(),
            },
            highlight: HighlightConfig {
                error_set: "error".to_string(),
                trace_failure_set: "trace-failures".to_string(),
                grammar_set: "grammar-error".to_string(),
                rule_match_set: "rule-matches".to_string(),
                rule_definition_set: "rules".to_string(),
            },
        }
    }
}
