//! Sprite-file container.
//!
//! A sprite is a hidden root `<svg>` holding one `<symbol>` per icon, keyed
//! by the `id` attribute. There is no manifest: the symbols themselves are
//! the registry, and each id appears at most once.
//!
//! Scanning walks bytes and only slices at ASCII delimiters, so bodies may
//! hold any UTF-8 text.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use super::{IconStore, Upsert, UpsertKind};
use crate::error::{Error, Result};
use crate::icon::{DEFAULT_VIEW_BOX, IconRecord, IconSet};
use crate::markup::splice;

const ROOT_OPEN: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" style="display: none;">"#;
const ROOT_CLOSE: &str = "</svg>";
const SYMBOL_OPEN: &str = "<symbol";
const SYMBOL_CLOSE: &str = "</symbol";

static ID_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:^|\s)id\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("id pattern is valid")
});

static VIEW_BOX_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:^|\s)viewBox\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .expect("viewBox pattern is valid")
});

/// Store for the sprite-file form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpriteStore {
    strict: bool,
}

impl SpriteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// In strict mode a missing root closing tag is an error instead of a
    /// degraded append.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }
}

impl IconStore for SpriteStore {
    fn create(&self, record: &IconRecord) -> String {
        format!("{ROOT_OPEN}\n  {}\n{ROOT_CLOSE}\n", render_symbol(record))
    }

    fn upsert(&self, content: &str, record: &IconRecord) -> Result<Upsert> {
        if content.trim().is_empty() {
            debug!(name = %record.name, "creating sprite file");
            return Ok(Upsert::new(self.create(record), UpsertKind::Created));
        }

        let doc = SpriteDocument::parse(content)?;
        let element = render_symbol(record);
        let mut matching = doc.symbols.iter().filter(|s| s.id == record.name);

        if let Some(first) = matching.next() {
            debug!(name = %record.name, "replacing symbol");
            let mut edits = vec![(first.span.clone(), element)];
            // Collapse duplicates left by hand edits.
            edits.extend(matching.map(|s| (s.removal.clone(), String::new())));
            return Ok(Upsert::new(splice(content, &edits), UpsertKind::Replaced));
        }

        match doc.root_close {
            Some(close) => {
                debug!(name = %record.name, "inserting symbol");
                let line_start = content[..close].rfind('\n').map_or(0, |i| i + 1);
                let (at, insertion) = if content[line_start..close].trim().is_empty() {
                    (line_start, format!("  {element}\n"))
                } else {
                    (close, format!("\n  {element}\n"))
                };
                Ok(Upsert::new(
                    splice(content, &[(at..at, insertion)]),
                    UpsertKind::Inserted,
                ))
            }
            None if self.strict => Err(Error::ManifestNotFound("root element".to_string())),
            None => {
                warn!(name = %record.name, "sprite root not closed, appending symbol");
                let appended = format!("{}\n{element}\n", content.trim_end());
                Ok(Upsert::new(appended, UpsertKind::AppendedWithoutManifest))
            }
        }
    }

    fn remove(&self, content: &str, name: &str) -> Result<String> {
        let doc = SpriteDocument::parse(content)?;
        let edits: Vec<_> = doc
            .symbols
            .iter()
            .filter(|s| s.id == name)
            .map(|s| (s.removal.clone(), String::new()))
            .collect();

        if edits.is_empty() {
            debug!(%name, "nothing to remove");
            return Ok(content.to_string());
        }
        debug!(%name, "removing symbol");
        Ok(splice(content, &edits))
    }

    fn records(&self, content: &str) -> Result<IconSet> {
        let doc = SpriteDocument::parse(content)?;
        Ok(IconSet::from_records(
            doc.symbols
                .into_iter()
                .map(|s| {
                    IconRecord::new(s.id, &content[s.body])
                        .with_view_box(s.view_box.unwrap_or_else(|| DEFAULT_VIEW_BOX.to_string()))
                })
                .collect(),
        ))
    }

    fn exists(&self, content: &str, name: &str) -> bool {
        match SpriteDocument::parse(content) {
            Ok(doc) => doc.symbols.iter().any(|s| s.id == name),
            Err(err) => {
                warn!(%err, "cannot query malformed sprite file");
                false
            }
        }
    }
}

// ============================================================================
// Document model
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Symbol {
    pub id: String,
    pub view_box: Option<String>,
    /// Inner markup between the open and close tags.
    pub body: Range<usize>,
    /// The whole element.
    pub span: Range<usize>,
    /// The element with its indentation and line break.
    pub removal: Range<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SpriteDocument {
    pub symbols: Vec<Symbol>,
    /// Offset of the last `</svg>` outside comments and symbols, where new
    /// symbols go.
    pub root_close: Option<usize>,
}

impl SpriteDocument {
    pub fn parse(source: &str) -> Result<Self> {
        let mut symbols = Vec::new();
        let mut root_close = None;
        let mut i = 0;

        while i < source.len() {
            let rest = &source.as_bytes()[i..];
            if rest.starts_with(b"<!--") {
                i = comment_end(source, i)?;
                continue;
            }
            if rest.starts_with(ROOT_CLOSE.as_bytes()) {
                root_close = Some(i);
                i += ROOT_CLOSE.len();
                continue;
            }
            if !opens_symbol(source, i) {
                i += 1;
                continue;
            }

            let tag_end = tag_end(source, i)?;
            let attrs = &source[i + SYMBOL_OPEN.len()..tag_end];
            let (body, end) = if source[..tag_end].ends_with('/') {
                (tag_end + 1..tag_end + 1, tag_end + 1)
            } else {
                let (close_start, close_end) = matching_close(source, tag_end + 1, i)?;
                (tag_end + 1..close_start, close_end)
            };

            // Symbols without an id cannot be addressed and are kept as-is.
            if let Some(id) = attribute(&ID_ATTR, attrs) {
                let span = i..end;
                symbols.push(Symbol {
                    id,
                    view_box: attribute(&VIEW_BOX_ATTR, attrs),
                    body,
                    removal: line_range(source, &span),
                    span,
                });
            }
            i = end;
        }

        Ok(Self {
            symbols,
            root_close,
        })
    }
}

fn opens_symbol(source: &str, at: usize) -> bool {
    let bytes = source.as_bytes();
    bytes[at..].starts_with(SYMBOL_OPEN.as_bytes())
        && bytes
            .get(at + SYMBOL_OPEN.len())
            .is_some_and(|b| b.is_ascii_whitespace() || *b == b'>' || *b == b'/')
}

fn comment_end(source: &str, start: usize) -> Result<usize> {
    source[start + 4..]
        .find("-->")
        .map(|i| start + 4 + i + 3)
        .ok_or_else(|| Error::malformed(start, "unterminated comment"))
}

/// Offset of the `>` closing the tag that opens at `start`.
fn tag_end(source: &str, start: usize) -> Result<usize> {
    let bytes = source.as_bytes();
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            quote @ (b'"' | b'\'') => {
                let close = source[i + 1..]
                    .find(quote as char)
                    .ok_or_else(|| Error::malformed(i, "unterminated attribute value"))?;
                i += close + 2;
            }
            b'>' => return Ok(i),
            _ => i += 1,
        }
    }
    Err(Error::malformed(start, "unterminated tag"))
}

/// Finds the `</symbol>` that closes an element whose content starts at
/// `from`. Returns the close tag's start and the offset just past it.
fn matching_close(source: &str, from: usize, open: usize) -> Result<(usize, usize)> {
    let mut depth = 1usize;
    let mut i = from;
    while i < source.len() {
        let rest = &source.as_bytes()[i..];
        if rest.starts_with(b"<!--") {
            i = comment_end(source, i)?;
        } else if opens_symbol(source, i) {
            let end = tag_end(source, i)?;
            if !source[..end].ends_with('/') {
                depth += 1;
            }
            i = end + 1;
        } else if rest.starts_with(SYMBOL_CLOSE.as_bytes()) {
            let end = tag_end(source, i)?;
            depth -= 1;
            if depth == 0 {
                return Ok((i, end + 1));
            }
            i = end + 1;
        } else {
            i += 1;
        }
    }
    Err(Error::malformed(open, "unclosed <symbol> element"))
}

fn attribute(pattern: &Regex, attrs: &str) -> Option<String> {
    let caps = pattern.captures(attrs)?;
    let value = caps.get(1).or_else(|| caps.get(2))?.as_str();
    Some(unescape_xml(value))
}

/// Widens `span` to whole lines when the element sits on its own line.
fn line_range(source: &str, span: &Range<usize>) -> Range<usize> {
    let line_start = source[..span.start].rfind('\n').map_or(0, |i| i + 1);
    if !source[line_start..span.start].trim().is_empty() {
        return span.clone();
    }
    let rest = &source[span.end..];
    let spaces = rest.len() - rest.trim_start_matches([' ', '\t']).len();
    let tail = &rest[spaces..];
    let end = if tail.starts_with("\r\n") {
        span.end + spaces + 2
    } else if tail.starts_with('\n') {
        span.end + spaces + 1
    } else {
        return span.clone();
    };
    line_start..end
}

fn render_symbol(record: &IconRecord) -> String {
    format!(
        r#"<symbol id="{}" viewBox="{}">{}</symbol>"#,
        escape_xml(&record.name),
        escape_xml(&record.view_box),
        record.body
    )
}

fn escape_xml(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn unescape_xml(value: &str) -> String {
    value
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
