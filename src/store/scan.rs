//! Boundary detection for module source.
//!
//! Everything here works on byte offsets. All delimiters are ASCII, so
//! scanning bytes never splits a UTF-8 sequence at a reported boundary.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};

static DECLARATION_HEAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^export\s+(?:const|let|var)\s+([A-Za-z_$][\w$]*)\s*(?::[^=;{]+)?=\s*\{")
        .expect("declaration pattern is valid")
});

/// An `export const <identifier> = { ... };` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Declaration {
    pub identifier: String,
    /// From `export` through the closing `}` and an optional `;`.
    pub span: Range<usize>,
    /// The object literal, `{` through `}` inclusive.
    pub object: Range<usize>,
}

impl Declaration {
    /// Text between `export` and the opening brace, e.g. `export const icons = `.
    pub fn head<'a>(&self, source: &'a str) -> &'a str {
        &source[self.span.start..self.object.start]
    }

    /// True if the declaration ends with `;`.
    pub fn terminated(&self, source: &str) -> bool {
        source[..self.span.end].ends_with(';')
    }
}

/// Returns the offset just past the string literal opening at `start`.
///
/// Handles `'`, `"` and template literals with backslash escapes. Quoted
/// strings may not span lines.
pub(crate) fn skip_literal(source: &str, start: usize) -> Result<usize> {
    let bytes = source.as_bytes();
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return Ok(i + 1),
            b'\n' if quote != b'`' => {
                return Err(Error::malformed(start, "unterminated string literal"));
            }
            _ => i += 1,
        }
    }
    Err(Error::malformed(start, "unterminated string literal"))
}

/// If a comment starts at `start`, returns the offset just past it.
pub(crate) fn skip_comment(source: &str, start: usize) -> Option<Result<usize>> {
    let rest = &source[start..];
    if rest.starts_with("//") {
        let end = rest.find('\n').map_or(source.len(), |i| start + i);
        Some(Ok(end))
    } else if rest.starts_with("/*") {
        Some(
            rest[2..]
                .find("*/")
                .map(|i| start + 2 + i + 2)
                .ok_or_else(|| Error::malformed(start, "unterminated block comment")),
        )
    } else {
        None
    }
}

/// Finds the `}` matching the `{` at `open` by depth counting.
///
/// Braces inside string literals and comments do not count, so bodies with
/// embedded style blocks or stray braces in strings are handled.
pub(crate) fn matching_brace(source: &str, open: usize) -> Result<usize> {
    let bytes = source.as_bytes();
    let mut depth = 0usize;
    let mut i = open;
    while i < bytes.len() {
        match bytes[i] {
            b'\'' | b'"' | b'`' => {
                i = skip_literal(source, i)?;
                continue;
            }
            b'/' => {
                if let Some(end) = skip_comment(source, i) {
                    i = end?;
                    continue;
                }
            }
            b'{' => depth += 1,
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Ok(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    Err(Error::malformed(open, "unbalanced braces"))
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

/// Lists every top-level object-valued export declaration in order.
pub(crate) fn declarations(source: &str) -> Result<Vec<Declaration>> {
    let bytes = source.as_bytes();
    let mut found = Vec::new();
    let mut depth = 0usize;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\'' | b'"' | b'`' => {
                i = skip_literal(source, i)?;
                continue;
            }
            b'/' => {
                if let Some(end) = skip_comment(source, i) {
                    i = end?;
                    continue;
                }
            }
            b'{' => depth += 1,
            b'}' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| Error::malformed(i, "unbalanced braces"))?;
            }
            b'e' if depth == 0 && (i == 0 || !is_ident_byte(bytes[i - 1])) => {
                if let Some(caps) = DECLARATION_HEAD.captures(&source[i..]) {
                    let head_len = caps.get(0).map_or(0, |m| m.end());
                    let identifier = caps.get(1).map_or("", |m| m.as_str()).to_string();
                    let open = i + head_len - 1;
                    let close = matching_brace(source, open)?;

                    let mut end = close + 1;
                    let after = &source[end..];
                    let spaces = after.len() - after.trim_start_matches([' ', '\t']).len();
                    if after[spaces..].starts_with(';') {
                        end += spaces + 1;
                    }

                    found.push(Declaration {
                        identifier,
                        span: i..end,
                        object: open..close + 1,
                    });
                    i = end;
                    continue;
                }
            }
            _ => {}
        }
        i += 1;
    }

    if depth != 0 {
        return Err(Error::malformed(source.len(), "unbalanced braces"));
    }
    Ok(found)
}

/// Extends `span` so that removing it also removes the line break and one
/// blank separator line that follow it.
pub(crate) fn removal_range(source: &str, span: &Range<usize>) -> Range<usize> {
    let mut end = span.end;
    for _ in 0..2 {
        let rest = &source[end..];
        let spaces = rest.len() - rest.trim_start_matches([' ', '\t']).len();
        let rest = &rest[spaces..];
        if rest.starts_with("\r\n") {
            end += spaces + 2;
        } else if rest.starts_with('\n') {
            end += spaces + 1;
        } else {
            break;
        }
    }
    span.start..end
}
