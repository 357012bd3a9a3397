//! Highlight ranges and their projection onto text surfaces
//!
//! A [`HighlightRange`] is an inclusive pair of char offsets into one specific
//! buffer (grammar source, input text or rendered output). Ranges are grouped
//! into named sets; projecting a set onto a surface replaces whatever that
//! surface held under the same name and leaves other sets alone, so an
//! `error` set and a `trace-failures` set can be styled independently.
//!
//! Some sets tag every range with the rule it belongs to ([`LabelledRange`]),
//! e.g. the input span of each matched rule or each rule definition in the
//! grammar, so a display can colour or link ranges by rule name.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::text::char_len;

/// Inclusive char range into a single text buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HighlightRange {
    pub start: usize,
    pub end: usize,
}

impl HighlightRange {
    pub fn new(start: usize, end: usize) -> Self {
        HighlightRange { start, end }
    }

    /// Zero-width marker at a single position.
    pub fn point(offset: usize) -> Self {
        HighlightRange {
            start: offset,
            end: offset,
        }
    }

    /// Clamp to `[0, len)`. `None` when nothing with a positive extent is left.
    pub fn clamp_to(self, len: usize) -> Option<HighlightRange> {
        let last = len.checked_sub(1)?;
        let start = self.start.min(last);
        let end = self.end.min(last);
        (end > start).then_some(HighlightRange { start, end })
    }
}

/// A highlight range tagged with the rule it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LabelledRange {
    pub range: HighlightRange,
    pub label: String,
}

impl LabelledRange {
    pub fn new(range: HighlightRange, label: impl Into<String>) -> Self {
        LabelledRange {
            range,
            label: label.into(),
        }
    }
}

/// Something that displays text and can carry named highlight sets.
pub trait HighlightSurface {
    /// Length of the displayed text, in chars.
    fn text_len(&self) -> usize;

    /// Replace the set called `name` with `ranges`.
    fn replace_highlights(&mut self, name: &str, ranges: Vec<HighlightRange>);

    /// Replace the labelled set called `name` with `ranges`.
    fn replace_labelled(&mut self, name: &str, ranges: Vec<LabelledRange>);
}

/// Project `ranges` onto `surface` as the highlight set `name`.
///
/// Ranges are clamped to the surface text; ranges that collapse are dropped
/// without error. Any previous set with the same name is replaced, even when
/// the new set ends up empty.
pub fn project<S: HighlightSurface + ?Sized>(
    surface: &mut S,
    ranges: &[HighlightRange],
    name: &str,
) {
    let len = surface.text_len();
    let projected: Vec<HighlightRange> = ranges.iter().filter_map(|r| r.clamp_to(len)).collect();
    tracing::trace!(
        set = name,
        given = ranges.len(),
        kept = projected.len(),
        "projecting highlights"
    );
    surface.replace_highlights(name, projected);
}

/// Project labelled ranges as the set `name`, clamping like [`project`].
///
/// Labels survive projection unchanged.
pub fn project_labelled<S: HighlightSurface + ?Sized>(
    surface: &mut S,
    ranges: &[LabelledRange],
    name: &str,
) {
    let len = surface.text_len();
    let projected: Vec<LabelledRange> = ranges
        .iter()
        .filter_map(|r| {
            r.range
                .clamp_to(len)
                .map(|range| LabelledRange::new(range, r.label.clone()))
        })
        .collect();
    tracing::trace!(
        set = name,
        given = ranges.len(),
        kept = projected.len(),
        "projecting labelled highlights"
    );
    surface.replace_labelled(name, projected);
}

/// In-memory surface: a text buffer plus its named highlight sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HighlightLayers {
    text: String,
    #[serde(skip)]
    len: usize,
    sets: BTreeMap<String, Vec<HighlightRange>>,
    labelled: BTreeMap<String, Vec<LabelledRange>>,
}

impl HighlightLayers {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let len = char_len(&text);
        HighlightLayers {
            text,
            len,
            sets: BTreeMap::new(),
            labelled: BTreeMap::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn get(&self, name: &str) -> Option<&[HighlightRange]> {
        self.sets.get(name).map(Vec::as_slice)
    }

    pub fn get_labelled(&self, name: &str) -> Option<&[LabelledRange]> {
        self.labelled.get(name).map(Vec::as_slice)
    }

    /// Remove a set, labelled or not. Returns whether it existed.
    pub fn clear(&mut self, name: &str) -> bool {
        let plain = self.sets.remove(name).is_some();
        let labelled = self.labelled.remove(name).is_some();
        plain || labelled
    }

    /// Names of all registered sets, sorted and deduplicated.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .sets
            .keys()
            .chain(self.labelled.keys())
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Project `ranges` as the set `name`.
    pub fn set(&mut self, name: &str, ranges: &[HighlightRange]) {
        project(self, ranges, name);
    }
}

impl HighlightSurface for HighlightLayers {
    fn text_len(&self) -> usize {
        self.len
    }

    fn replace_highlights(&mut self, name: &str, ranges: Vec<HighlightRange>) {
        self.sets.insert(name.to_string(), ranges);
    }

    fn replace_labelled(&mut self, name: &str, ranges: Vec<LabelledRange>) {
        self.labelled.insert(name.to_string(), ranges);
    }
}
