//! Tag-header classification and attribute extraction.
//!
//! A tag header is the raw text between `<` and `>` of an opening tag. It is
//! classified in one pass into a [`TagHeader`]: the tag form, the name and the
//! declared attributes, all borrowed from the header text. Nothing is written
//! back into the header; the scanner applies the result to the tree.
//!
//! Header grammar, as accepted here:
//!
//! ```text
//! header      := '?' ws* name attributes '?'        (declaration / PI)
//!              | ws* name attributes ('/' | '?')?   (self-closing / PI / normal)
//! attributes  := (ws* key '=' junk* quote value quote)*
//! ```
//!
//! where `junk` is anything that is not a quote and `value` is anything that is
//! not the opening quote character.

use strum_macros::Display;
use thiserror::Error;

/// Name reserved for the document declaration, `<?xml ...?>`.
pub const DECLARATION_NAME: &str = "xml";

/// The form of an opening tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TagKind {
    /// `<?xml ...?>`: carries document metadata, never part of the tree.
    Declaration,
    /// `<?name ...?>` or any header ending in `?`: discarded.
    ProcessingInstruction,
    /// `<name .../>`: attached to the tree, opens no nesting level.
    SelfClosing,
    /// `<name ...>`: attached to the tree and left open.
    Normal,
}

/// An attribute as written in the header, quotes excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawAttribute<'a> {
    /// Text before the `=`.
    pub key: &'a str,
    /// Text between the quotes.
    pub value: &'a str,
}

/// Result of classifying one tag header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagHeader<'a> {
    /// Tag form, decided from the header's first and last characters.
    pub kind: TagKind,
    /// Tag name.
    pub name: &'a str,
    /// Attributes in declaration order.
    pub attributes: Vec<RawAttribute<'a>>,
}

/// Why a header was rejected. Offsets are byte offsets into the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HeaderError {
    /// Empty name, leading punctuation or digit, or reserved `xml` prefix.
    #[error("invalid tag")]
    InvalidTag,

    /// Header starts with `?` but does not end with one.
    #[error("processing instruction not terminated by '?'")]
    MalformedProcessingInstruction,

    /// A key ran into whitespace or the end of the header before `=`.
    #[error("bad key:value format at {offset}")]
    BadAttributeKey {
        /// Where the key starts.
        offset: usize,
    },

    /// A quoted value has no closing quote.
    #[error("bad value format at {offset}")]
    BadAttributeValue {
        /// Where the value starts, just past the opening quote.
        offset: usize,
    },
}

/// Whitespace as the scanner sees it: ASCII space, tab, LF, VT, FF and CR.
#[must_use]
pub const fn is_space(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | 0x0B | 0x0C | b'\r')
}

/// Classify a tag header and extract its name and attributes.
///
/// # Errors
///
/// Returns a [`HeaderError`] for a malformed processing instruction, an
/// invalid or reserved name, or malformed attribute syntax. A key with no
/// quoted value after it simply ends the attribute list.
pub fn classify(header: &str) -> Result<TagHeader<'_>, HeaderError> {
    let bytes = header.as_bytes();
    let last = bytes.last().copied();

    let (kind, name, rest, end) = if bytes.first() == Some(&b'?') {
        if last != Some(b'?') {
            return Err(HeaderError::MalformedProcessingInstruction);
        }
        // A lone "?" is both the opening and the closing marker.
        let end = (bytes.len() - 1).max(1);
        let (name, rest) = read_name(bytes, 1, end);
        let name = &header[name.0..name.1];
        if name.is_empty() {
            return Err(HeaderError::InvalidTag);
        }
        let kind = if name == DECLARATION_NAME {
            TagKind::Declaration
        } else {
            TagKind::ProcessingInstruction
        };
        (kind, name, rest, end)
    } else {
        let (kind, end) = match last {
            Some(b'?') => (TagKind::ProcessingInstruction, bytes.len() - 1),
            Some(b'/') => (TagKind::SelfClosing, bytes.len() - 1),
            _ => (TagKind::Normal, bytes.len()),
        };
        let (name, rest) = read_name(bytes, 0, end);
        let name = &header[name.0..name.1];
        if !is_valid_name(name) {
            return Err(HeaderError::InvalidTag);
        }
        (kind, name, rest, end)
    };

    let attributes = read_attributes(header, rest, end)?;
    Ok(TagHeader {
        kind,
        name,
        attributes,
    })
}

/// Skip whitespace from `pos`, then take the run of non-whitespace bytes.
/// Returns the name span and the position right after it.
fn read_name(bytes: &[u8], mut pos: usize, end: usize) -> ((usize, usize), usize) {
    while pos < end && is_space(bytes[pos]) {
        pos += 1;
    }
    let start = pos;
    while pos < end && !is_space(bytes[pos]) {
        pos += 1;
    }
    ((start, pos), pos)
}

fn is_valid_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    let Some(&first) = bytes.first() else {
        return false;
    };
    if first.is_ascii_punctuation() || first.is_ascii_digit() {
        return false;
    }
    !(bytes.len() >= 3 && bytes[..3].eq_ignore_ascii_case(DECLARATION_NAME.as_bytes()))
}

fn read_attributes(
    header: &str,
    mut pos: usize,
    end: usize,
) -> Result<Vec<RawAttribute<'_>>, HeaderError> {
    let bytes = header.as_bytes();
    let mut attributes = Vec::new();

    loop {
        while pos < end && is_space(bytes[pos]) {
            pos += 1;
        }
        if pos >= end {
            break;
        }

        let key_start = pos;
        while pos < end && bytes[pos] != b'=' && !is_space(bytes[pos]) {
            pos += 1;
        }
        if pos >= end || bytes[pos] != b'=' {
            return Err(HeaderError::BadAttributeKey { offset: key_start });
        }
        let key = &header[key_start..pos];

        while pos < end && bytes[pos] != b'"' && bytes[pos] != b'\'' {
            pos += 1;
        }
        if pos >= end {
            // Key with no quoted value: end of attributes, not an error.
            break;
        }

        let quote = bytes[pos];
        let value_start = pos + 1;
        pos = value_start;
        while pos < end && bytes[pos] != quote {
            pos += 1;
        }
        if pos >= end {
            return Err(HeaderError::BadAttributeValue {
                offset: value_start,
            });
        }

        attributes.push(RawAttribute {
            key,
            value: &header[value_start..pos],
        });
        pos += 1;
    }

    Ok(attributes)
}
