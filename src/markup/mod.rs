//! Color scanning and rewriting over a single icon's markup.
//!
//! This module finds every color-bearing site in an icon body:
//! - `fill="..."`, `stroke="..."` and `stop-color="..."` attributes, with
//!   either quote style
//! - the same three properties inside inline `style="..."` declarations
//!
//! The extractor and the replacer share this scan, so both agree on what
//! counts as a color occurrence and on their order in the source text.

pub mod extract;
pub mod replace;

pub use extract::{ColorExtraction, ColorSample, extract_colors};
pub use replace::{add_fill, remove_colors, replace_all_colors, replace_color, replace_colors};

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

static COLOR_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:^|[\s<])(fill|stroke|stop-color)\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .expect("color attribute pattern is valid")
});

static STYLE_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:^|[\s<])style\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .expect("style attribute pattern is valid")
});

static STYLE_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|;)\s*(fill|stroke|stop-color)\s*:\s*([^;]*)")
        .expect("style declaration pattern is valid")
});

/// Which property a color occurrence belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Property {
    Fill,
    Stroke,
    StopColor,
}

impl Property {
    fn parse(name: &str) -> Self {
        match name {
            "stroke" => Self::Stroke,
            "stop-color" => Self::StopColor,
            _ => Self::Fill,
        }
    }

    /// Gradient stops paint fills, so only `stroke` counts as a stroke.
    pub(crate) fn is_stroke(self) -> bool {
        self == Self::Stroke
    }
}

/// One color-bearing value in the markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Occurrence {
    pub property: Property,
    /// Byte range of the (trimmed) value inside the markup.
    pub value: Range<usize>,
}

/// Scans `markup` for color occurrences, ordered by position.
pub(crate) fn occurrences(markup: &str) -> Vec<Occurrence> {
    let mut found = Vec::new();

    for caps in COLOR_ATTR.captures_iter(markup) {
        let (Some(name), Some(value)) = (caps.get(1), caps.get(2).or_else(|| caps.get(3))) else {
            continue;
        };
        found.push(Occurrence {
            property: Property::parse(name.as_str()),
            value: trimmed(markup, value.range()),
        });
    }

    for caps in STYLE_ATTR.captures_iter(markup) {
        let Some(style) = caps.get(1).or_else(|| caps.get(2)) else {
            continue;
        };
        for decl in STYLE_DECL.captures_iter(style.as_str()) {
            let (Some(name), Some(value)) = (decl.get(1), decl.get(2)) else {
                continue;
            };
            let start = style.start() + value.start();
            let end = style.start() + value.end();
            found.push(Occurrence {
                property: Property::parse(name.as_str()),
                value: trimmed(markup, start..end),
            });
        }
    }

    found.sort_by_key(|o| o.value.start);
    found
}

/// Shrinks `range` so it excludes surrounding whitespace.
fn trimmed(text: &str, range: Range<usize>) -> Range<usize> {
    let slice = &text[range.clone()];
    let leading = slice.len() - slice.trim_start().len();
    let trailing = slice.len() - slice.trim_end().len();
    if leading == slice.len() {
        return range.start..range.start;
    }
    range.start + leading..range.end - trailing
}

/// Rebuilds `text` with each range replaced. Ranges must be sorted and
/// non-overlapping.
pub(crate) fn splice(text: &str, edits: &[(Range<usize>, String)]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for (range, replacement) in edits {
        out.push_str(&text[cursor..range.start]);
        out.push_str(replacement);
        cursor = range.end;
    }
    out.push_str(&text[cursor..]);
    out
}
