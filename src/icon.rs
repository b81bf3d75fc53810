//! Icon record types.
//!
//! This module provides the in-memory representation of one icon entry as
//! it is stored in a container file, plus the identifier derivation used as
//! the storage key of the module form.

use serde::{Deserialize, Serialize};

/// Bounding box used when a caller does not supply one.
pub const DEFAULT_VIEW_BOX: &str = "0 0 24 24";

/// CSS animation metadata attached to an icon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct Animation {
    /// Animation kind, e.g. `spin` or `pulse`.
    #[serde(rename = "type")]
    pub kind: String,

    /// Duration in seconds.
    pub duration: f64,

    /// Timing function, e.g. `linear`.
    pub timing: String,

    /// Iteration count, e.g. `infinite` or `3`.
    pub iteration: String,

    /// Delay in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<f64>,

    /// Playback direction, e.g. `alternate`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
}

impl Animation {
    /// Creates an animation with no delay and the default direction.
    pub fn new(
        kind: impl Into<String>,
        duration: f64,
        timing: impl Into<String>,
        iteration: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            duration,
            timing: timing.into(),
            iteration: iteration.into(),
            delay: None,
            direction: None,
        }
    }

    pub fn with_delay(mut self, delay: f64) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_direction(mut self, direction: impl Into<String>) -> Self {
        self.direction = Some(direction.into());
        self
    }
}

/// A single icon as stored in a container file.
///
/// The `body` is the inner markup of the icon without the outer `<svg>`
/// wrapper. `view_box` is kept as the literal four-number string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct IconRecord {
    /// Stable, human-chosen name such as `home-outline` or `mdi:home`.
    pub name: String,

    /// Serialized markup fragment.
    pub body: String,

    /// Bounding box, e.g. `0 0 24 24`.
    #[serde(rename = "viewBox", default = "default_view_box")]
    pub view_box: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<Animation>,
}

fn default_view_box() -> String {
    DEFAULT_VIEW_BOX.to_string()
}

impl IconRecord {
    /// Creates a record with the default bounding box.
    pub fn new(name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            body: body.into(),
            view_box: default_view_box(),
            animation: None,
        }
    }

    /// Sets the bounding box.
    pub fn with_view_box(mut self, view_box: impl Into<String>) -> Self {
        self.view_box = view_box.into();
        self
    }

    /// Attaches animation metadata.
    pub fn with_animation(mut self, animation: Animation) -> Self {
        self.animation = Some(animation);
        self
    }

    /// Returns the storage identifier derived from the name.
    pub fn identifier(&self) -> String {
        to_identifier(&self.name)
    }

    /// Wraps the body in a standalone `<svg>` element for previews.
    pub fn to_svg(&self) -> String {
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{}">{}</svg>"#,
            self.view_box, self.body
        )
    }
}

/// Derives the storage identifier for an icon name.
///
/// The name is split on `-`, `:` and any other character that cannot appear
/// in an identifier; the first segment is kept as-is and every following
/// segment gets an upper-cased first letter. A leading digit or a result
/// that is a reserved word is prefixed with `_`.
///
/// ```
/// use icon_forge::to_identifier;
///
/// assert_eq!(to_identifier("home"), "home");
/// assert_eq!(to_identifier("arrow-left-bold"), "arrowLeftBold");
/// assert_eq!(to_identifier("mdi:home-outline"), "mdiHomeOutline");
/// assert_eq!(to_identifier("delete"), "_delete");
/// ```
pub fn to_identifier(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let segments = name
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '$'))
        .filter(|s| !s.is_empty());

    for segment in segments {
        if out.is_empty() {
            out.push_str(segment);
            continue;
        }
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }

    match out.chars().next() {
        None => "_".to_string(),
        Some(c) if c.is_ascii_digit() => format!("_{out}"),
        Some(_) if is_reserved_word(&out) => format!("_{out}"),
        Some(_) => out,
    }
}

/// Words that cannot name a binding in a module, sorted for binary search.
const RESERVED_WORDS: &[&str] = &[
    "arguments",
    "await",
    "break",
    "case",
    "catch",
    "class",
    "const",
    "continue",
    "debugger",
    "default",
    "delete",
    "do",
    "else",
    "enum",
    "eval",
    "export",
    "extends",
    "false",
    "finally",
    "for",
    "function",
    "if",
    "implements",
    "import",
    "in",
    "instanceof",
    "interface",
    "let",
    "new",
    "null",
    "package",
    "private",
    "protected",
    "public",
    "return",
    "static",
    "super",
    "switch",
    "this",
    "throw",
    "true",
    "try",
    "typeof",
    "var",
    "void",
    "while",
    "with",
    "yield",
];

fn is_reserved_word(word: &str) -> bool {
    RESERVED_WORDS.binary_search(&word).is_ok()
}

/// An ordered collection of icon records, as read back from a container.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IconSet {
    pub records: Vec<IconRecord>,
}

impl IconSet {
    pub fn new() -> Self {
        Self { records: Vec::new() }
    }

    pub fn from_records(records: Vec<IconRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Finds a record by its exact name.
    pub fn find(&self, name: &str) -> Option<&IconRecord> {
        self.records.iter().find(|r| r.name == name)
    }

    /// Returns the record names in container order.
    pub fn names(&self) -> Vec<String> {
        self.records.iter().map(|r| r.name.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &IconRecord> {
        self.records.iter()
    }
}

impl IntoIterator for IconSet {
    type Item = IconRecord;
    type IntoIter = std::vec::IntoIter<IconRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a IconSet {
    type Item = &'a IconRecord;
    type IntoIter = std::slice::Iter<'a, IconRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
