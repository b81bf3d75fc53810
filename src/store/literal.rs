//! A reader and writer for the object-literal subset used by module files.
//!
//! Supported values: single/double-quoted strings, template literals without
//! substitutions, numbers, bare identifiers (`true`, `home`), nested objects
//! and arrays. That covers icon definitions and the manifest; anything else
//! is reported as malformed.

use crate::error::{Error, Result};
use super::scan::{skip_comment, skip_literal};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Value {
    Str(String),
    Num(f64),
    Ident(String),
    Object(Vec<(String, Value)>),
    Array(Vec<Value>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Num(n) => Some(*n),
            Self::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_ident(&self) -> Option<&str> {
        match self {
            Self::Ident(s) => Some(s),
            _ => None,
        }
    }

    /// Strings and identifiers, with numbers rendered back to text.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Str(s) | Self::Ident(s) => Some(s.clone()),
            Self::Num(n) => Some(format_number(*n)),
            _ => None,
        }
    }

    /// Renders the value back to source text.
    pub fn to_source(&self) -> String {
        match self {
            Self::Str(s) => quote(s),
            Self::Num(n) => format_number(*n),
            Self::Ident(s) => s.clone(),
            Self::Object(fields) if fields.is_empty() => "{}".to_string(),
            Self::Object(fields) => {
                let parts: Vec<_> = fields
                    .iter()
                    .map(|(key, value)| format!("{}: {}", quote(key), value.to_source()))
                    .collect();
                format!("{{ {} }}", parts.join(", "))
            }
            Self::Array(items) => {
                let parts: Vec<_> = items.iter().map(Value::to_source).collect();
                format!("[{}]", parts.join(", "))
            }
        }
    }
}

/// Looks up a key in parsed object fields.
pub(crate) fn field<'a>(fields: &'a [(String, Value)], key: &str) -> Option<&'a Value> {
    fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
}

/// Parses the object literal at `source[start..]`.
///
/// Error offsets are absolute within `source`.
pub(crate) fn parse_object(source: &str, start: usize) -> Result<Vec<(String, Value)>> {
    let mut parser = Parser { source, pos: start };
    parser.object()
}

struct Parser<'a> {
    source: &'a str,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<u8> {
        self.source.as_bytes().get(self.pos).copied()
    }

    fn fail<T>(&self, reason: &'static str) -> Result<T> {
        Err(Error::malformed(self.pos, reason))
    }

    fn skip_trivia(&mut self) -> Result<()> {
        loop {
            match self.peek() {
                Some(b) if b.is_ascii_whitespace() => self.pos += 1,
                Some(b'/') => match skip_comment(self.source, self.pos) {
                    Some(end) => self.pos = end?,
                    None => return Ok(()),
                },
                _ => return Ok(()),
            }
        }
    }

    fn eat(&mut self, byte: u8, reason: &'static str) -> Result<()> {
        self.skip_trivia()?;
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            self.fail(reason)
        }
    }

    fn object(&mut self) -> Result<Vec<(String, Value)>> {
        self.eat(b'{', "expected `{`")?;
        let mut fields = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.peek() == Some(b'}') {
                self.pos += 1;
                return Ok(fields);
            }

            let key = match self.peek() {
                Some(b'\'' | b'"' | b'`') => self.string()?,
                Some(b) if is_ident_start(b) => self.ident(),
                _ => return self.fail("expected property key"),
            };

            self.skip_trivia()?;
            let value = if self.peek() == Some(b':') {
                self.pos += 1;
                self.value()?
            } else {
                Value::Ident(key.clone())
            };
            fields.push((key, value));

            self.skip_trivia()?;
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b'}') => {}
                _ => return self.fail("expected `,` or `}`"),
            }
        }
    }

    fn array(&mut self) -> Result<Vec<Value>> {
        self.eat(b'[', "expected `[`")?;
        let mut items = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.peek() == Some(b']') {
                self.pos += 1;
                return Ok(items);
            }
            items.push(self.value()?);
            self.skip_trivia()?;
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b']') => {}
                _ => return self.fail("expected `,` or `]`"),
            }
        }
    }

    fn value(&mut self) -> Result<Value> {
        self.skip_trivia()?;
        match self.peek() {
            Some(b'\'' | b'"' | b'`') => Ok(Value::Str(self.string()?)),
            Some(b'{') => Ok(Value::Object(self.object()?)),
            Some(b'[') => Ok(Value::Array(self.array()?)),
            Some(b) if b.is_ascii_digit() || b == b'-' || b == b'.' || b == b'+' => self.number(),
            Some(b) if is_ident_start(b) => Ok(Value::Ident(self.ident())),
            _ => self.fail("expected value"),
        }
    }

    fn string(&mut self) -> Result<String> {
        let start = self.pos;
        let end = skip_literal(self.source, start)?;
        let raw = &self.source[start + 1..end - 1];
        if self.source.as_bytes()[start] == b'`' && contains_substitution(raw) {
            return Err(Error::malformed(start, "template substitutions are not supported"));
        }
        self.pos = end;
        Ok(unescape(raw))
    }

    fn ident(&mut self) -> String {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_byte) {
            self.pos += 1;
        }
        self.source[start..self.pos].to_string()
    }

    fn number(&mut self) -> Result<Value> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'-' | b'+'))
        {
            self.pos += 1;
        }
        match self.source[start..self.pos].parse() {
            Ok(n) => Ok(Value::Num(n)),
            Err(_) => Err(Error::malformed(start, "invalid number")),
        }
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$'
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

/// True if a template body has an unescaped `${`.
fn contains_substitution(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i + 1 < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'$' if bytes[i + 1] == b'{' => return true,
            _ => i += 1,
        }
    }
    false
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('0') => out.push('\0'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push_str("\\u");
                        out.push_str(&hex);
                    }
                }
            }
            // Line continuation.
            Some('\n') => {}
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

// ============================================================================
// Writing
// ============================================================================

/// Renders a single-quoted string literal.
pub(crate) fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Renders a template literal. Backticks, backslashes and `${` are escaped
/// so markup can never terminate the literal or open a substitution.
pub(crate) fn template(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('`');
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            '`' => out.push_str("\\`"),
            '$' if chars.peek() == Some(&'{') => out.push_str("\\$"),
            _ => out.push(c),
        }
    }
    out.push('`');
    out
}

/// Formats a number the way a JS source file would write it.
pub(crate) fn format_number(value: f64) -> String {
    if value.is_finite() {
        format!("{value}")
    } else {
        "0".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_icon_definition() {
        let src = "{\n  name: 'home',\n  body: `<path d=\"M0 0\"/>`,\n  viewBox: \"0 0 24 24\",\n  animation: { type: 'spin', duration: 1.5, delay: 0 },\n};";
        let fields = parse_object(src, 0).unwrap();
        assert_eq!(field(&fields, "name").and_then(Value::as_str), Some("home"));
        assert_eq!(
            field(&fields, "body").and_then(Value::as_str),
            Some("<path d=\"M0 0\"/>")
        );
        let Some(Value::Object(animation)) = field(&fields, "animation") else {
            panic!("animation should be an object");
        };
        assert_eq!(field(animation, "duration").and_then(Value::as_f64), Some(1.5));
    }

    #[test]
    fn parses_manifest_forms() {
        let src = "{ 'home': home, \"arrow-left\": arrowLeft, star, /* note */ }";
        let fields = parse_object(src, 0).unwrap();
        let pairs: Vec<_> = fields
            .iter()
            .map(|(k, v)| (k.as_str(), v.clone()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("home", Value::Ident("home".into())),
                ("arrow-left", Value::Ident("arrowLeft".into())),
                ("star", Value::Ident("star".into())),
            ]
        );
    }

    #[test]
    fn rejects_substitutions_and_garbage() {
        assert!(parse_object("{ body: `${x}` }", 0).is_err());
        assert!(parse_object("{ name: call() }", 0).is_err());
        assert!(parse_object("{ name 'x' }", 0).is_err());
    }

    #[test]
    fn quote_and_template_roundtrip() {
        let tricky = "it's a \\ `tick` ${not} $ {ok}";
        let quoted = quote(tricky);
        let parsed = parse_object(&format!("{{ a: {quoted} }}"), 0).unwrap();
        assert_eq!(field(&parsed, "a").and_then(Value::as_str), Some(tricky));

        let templated = template(tricky);
        assert!(templated.contains("\\${not}"));
        let parsed = parse_object(&format!("{{ a: {templated} }}"), 0).unwrap();
        assert_eq!(field(&parsed, "a").and_then(Value::as_str), Some(tricky));
    }

    #[test]
    fn values_render_back_to_source() {
        let src = "{ a: 'it\\'s', b: 2.5, c: home, d: { e: [1, 'x'] }, f: {} }";
        let fields = parse_object(src, 0).unwrap();
        let rendered: Vec<_> = fields.iter().map(|(_, v)| v.to_source()).collect();
        assert_eq!(rendered, vec!["'it\\'s'", "2.5", "home", "{ 'e': [1, 'x'] }", "{}"]);

        let reparsed = parse_object(&format!("{{ d: {} }}", rendered[3]), 0).unwrap();
        assert_eq!(field(&reparsed, "d"), field(&fields, "d"));
    }

    #[test]
    fn numbers_format_like_js() {
        assert_eq!(format_number(1.0), "1");
        assert_eq!(format_number(0.25), "0.25");
        assert_eq!(format_number(f64::NAN), "0");
    }
}
