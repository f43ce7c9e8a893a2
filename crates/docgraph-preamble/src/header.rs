//! Header-block parser
//!
//! The header lives in the first `<pre>…</pre>` block of a document:
//!
//! ```text
//! <pre>
//!   BIP: 32
//!   Title: Hierarchical Deterministic Wallets
//!   Author: Pieter Wuille <pieter.wuille@gmail.com>
//!           Second Author <second@example.com>
//!   Status: Final
//! </pre>
//! ```
//!
//! Lines are classified as field starts (two leading spaces, `key: value`),
//! continuations (four leading spaces) or noise, and fed through a two-state
//! machine. Noise never closes an open field.

use crate::error::HeaderError;
use docgraph_record::{is_list_field, FieldValue};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

static PRE_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<pre>(.*?)</pre>").expect("valid header block regex"));

static FIELD_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s{2}(\w+(?:-\w+)*):\s*(.*)$").expect("valid field start regex")
});

const CONTINUATION_INDENT: &str = "    ";

/// Fields extracted from a header block plus the remaining body text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedHeader {
    /// Canonical key → value, in first-seen order
    pub fields: IndexMap<String, FieldValue>,
    /// Document text with the header block removed
    pub body: String,
}

impl ParsedHeader {
    /// Whether `key` was present in the header
    #[inline]
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }
}

/// Line classes recognized inside the header block
#[derive(Debug, PartialEq, Eq)]
enum Line<'a> {
    FieldStart { key: String, value: &'a str },
    Indented(&'a str),
    Other,
}

impl<'a> Line<'a> {
    fn classify(line: &'a str) -> Self {
        if let Some(caps) = FIELD_START.captures(line) {
            let key = caps.get(1).map_or("", |m| m.as_str());
            let value = caps.get(2).map_or("", |m| m.as_str());
            return Self::FieldStart {
                key: canonical_key(key),
                value: value.trim(),
            };
        }
        if line.starts_with(CONTINUATION_INDENT) {
            return Self::Indented(line.trim());
        }
        Self::Other
    }
}

/// Parser state: either no field is open, or one is accumulating lines
#[derive(Debug, PartialEq, Eq)]
enum State {
    Idle,
    Open { key: String, value: String },
}

impl State {
    /// Consume one line, emitting finished fields into `out`
    fn step(self, line: Line<'_>, out: &mut IndexMap<String, FieldValue>) -> Self {
        match (self, line) {
            (state, Line::FieldStart { key, value }) => {
                state.finish(out);
                Self::Open {
                    key,
                    value: value.to_string(),
                }
            }
            (Self::Open { key, mut value }, Line::Indented(text)) => {
                value.push('\n');
                value.push_str(text);
                Self::Open { key, value }
            }
            (state, Line::Indented(_) | Line::Other) => state,
        }
    }

    /// Finalize the open field, if any
    fn finish(self, out: &mut IndexMap<String, FieldValue>) {
        if let Self::Open { key, value } = self {
            store_field(out, key, &value);
        }
    }
}

/// Lower-case and map hyphens to underscores
///
/// `Comments-URI` → `comments_uri`
#[must_use]
pub fn canonical_key(raw: &str) -> String {
    raw.trim().to_lowercase().replace('-', "_")
}

fn store_field(out: &mut IndexMap<String, FieldValue>, key: String, value: &str) {
    if is_list_field(&key) {
        let items = value
            .split('\n')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        match out.get_mut(&key) {
            Some(FieldValue::List(existing)) => existing.extend(items),
            _ => {
                out.insert(key, FieldValue::List(items.collect()));
            }
        }
    } else {
        out.insert(key, FieldValue::Text(value.trim().to_string()));
    }
}

/// Header-block parser
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderParser;

impl HeaderParser {
    /// Create new header parser
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Parse the header block of `text`
    ///
    /// # Errors
    /// [`HeaderError::NoHeaderBlockFound`] if there is no `<pre>` block
    pub fn parse(&self, text: &str) -> Result<ParsedHeader, HeaderError> {
        let block = PRE_BLOCK
            .captures(text)
            .ok_or(HeaderError::NoHeaderBlockFound)?;
        let whole = block.get(0).ok_or(HeaderError::NoHeaderBlockFound)?;
        let inner = block.get(1).map_or("", |m| m.as_str());

        let fields = Self::parse_block(inner);

        let mut body = String::with_capacity(text.len() - whole.len());
        body.push_str(&text[..whole.start()]);
        body.push_str(&text[whole.end()..]);

        Ok(ParsedHeader { fields, body })
    }

    /// Parse the inside of a header block
    #[must_use]
    pub fn parse_block(block: &str) -> IndexMap<String, FieldValue> {
        let mut fields = IndexMap::new();
        let state = block
            .lines()
            .map(Line::classify)
            .fold(State::Idle, |state, line| state.step(line, &mut fields));
        state.finish(&mut fields);
        fields
    }
}
