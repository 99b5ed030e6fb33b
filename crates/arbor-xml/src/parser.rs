//! The outer scan loop.
//!
//! The scanner walks the input once, left to right. Text between structural
//! tokens accumulates in the lexeme span; every `<` flushes that span into the
//! innermost open node and then dispatches on the next character:
//!
//! - `</name>` closes the innermost open node,
//! - `<!--...-->` is skipped,
//! - anything else is an opening tag whose header goes to [`classify`].
//!
//! Whitespace directly after any tag's `>` is skipped, so indentation between
//! tags never becomes text.

use std::ops::Range;

use arbor_common::warning::{clear_warnings, warn_once};
use arbor_dom::{Attribute, Document, Node, NodeId};
use tracing::{debug, trace};

use crate::error::{ErrorKind, ParseError, Result};
use crate::header::{HeaderError, TagHeader, TagKind, classify, is_space};

const COMMENT_OPEN: &str = "<!--";
const COMMENT_CLOSE: &str = "-->";

/// Parse a complete text buffer into a [`Document`].
///
/// # Errors
///
/// Returns the first [`ParseError`] encountered; no partial tree is returned.
pub fn parse(input: &str) -> Result<Document> {
    XmlParser::new(input).run()
}

/// Characters read since the last structural token, as a span of the input.
///
/// Text between two `<` is always contiguous in the input, so the span only
/// ever grows at its end and needs no copy or size limit.
#[derive(Debug, Default)]
struct Lexeme {
    span: Option<Range<usize>>,
}

impl Lexeme {
    fn extend(&mut self, run: Range<usize>) {
        match &mut self.span {
            Some(span) => span.end = run.end,
            None => self.span = Some(run),
        }
    }

    fn take(&mut self) -> Option<Range<usize>> {
        self.span.take().filter(|span| !span.is_empty())
    }
}

/// Single-pass parser over one input buffer.
///
/// Holds the document under construction, the innermost open node and the
/// cursor. A parser is consumed by [`run`](Self::run).
pub struct XmlParser<'a> {
    input: &'a str,
    pos: usize,
    lexeme: Lexeme,
    doc: Document,
    /// Innermost open node. Starts at the root, which has no tag and can
    /// therefore never be closed.
    current: NodeId,
    /// Set once any opening tag has been read, pseudo-tags included.
    seen_tag: bool,
}

impl<'a> XmlParser<'a> {
    /// Create a parser for `input`. The root node is allocated here, before
    /// any content is scanned.
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        let doc = Document::new();
        let current = doc.root();
        Self {
            input,
            pos: 0,
            lexeme: Lexeme::default(),
            doc,
            current,
            seen_tag: false,
        }
    }

    /// Run the parser to the end of input.
    ///
    /// # Errors
    ///
    /// Returns the first [`ParseError`] encountered. The partially built tree
    /// is dropped.
    pub fn run(mut self) -> Result<Document> {
        clear_warnings();
        debug!(bytes = self.input.len(), "parsing document");

        if let Err(err) = self.scan() {
            debug!(kind = %err.kind, position = err.position, "parse failed");
            return Err(err);
        }

        debug!(nodes = self.doc.len(), "parsed document");
        Ok(self.doc)
    }

    fn scan(&mut self) -> Result<()> {
        let input = self.input;

        while self.pos < input.len() {
            if input.as_bytes()[self.pos] != b'<' {
                let end = input[self.pos..]
                    .find('<')
                    .map_or(input.len(), |offset| self.pos + offset);
                self.lexeme.extend(self.pos..end);
                self.pos = end;
                continue;
            }

            self.flush_text();

            match input.as_bytes().get(self.pos + 1) {
                Some(b'/') => self.close_tag()?,
                Some(b'!') => self.skip_comment()?,
                _ => self.open_tag()?,
            }

            self.skip_whitespace();
        }

        if let Some(span) = self.lexeme.take() {
            return Err(ParseError::new(
                ErrorKind::TextOutsideElement {
                    text: input[span.clone()].to_owned(),
                },
                span.start,
            ));
        }
        Ok(())
    }

    /// Move pending text into the innermost open node, trailing whitespace
    /// removed.
    fn flush_text(&mut self) {
        let Some(span) = self.lexeme.take() else {
            return;
        };
        let text = self.input[span]
            .trim_end_matches(|c: char| u8::try_from(c).is_ok_and(is_space));
        if text.is_empty() {
            return;
        }

        let Some(node) = self.doc.get_mut(self.current) else {
            return;
        };
        if !node.set_text(text.to_owned()) {
            let tag = node.tag().unwrap_or_default();
            warn_once(
                "XML",
                &format!("<{tag}> has more than one text run; keeping the first"),
            );
        }
    }

    fn close_tag(&mut self) -> Result<()> {
        let input = self.input;
        let start = self.pos;
        let name_start = start + 2;
        let end = self.tag_end(start, name_start)?;
        let name = &input[name_start..end];

        let open = self.doc.get(self.current).and_then(Node::tag);
        if open != Some(name) {
            return Err(ParseError::new(
                ErrorKind::TagMismatch {
                    expected: open.map(str::to_owned),
                    found: name.to_owned(),
                },
                start,
            ));
        }

        trace!(tag = name, "close");
        if let Some(parent) = self.doc.parent(self.current) {
            self.current = parent;
        }
        self.pos = end + 1;
        Ok(())
    }

    fn skip_comment(&mut self) -> Result<()> {
        let start = self.pos;
        let rest = &self.input[start..];
        if !rest.starts_with(COMMENT_OPEN) {
            return Err(ParseError::new(ErrorKind::MalformedComment, start));
        }

        let body_start = start + COMMENT_OPEN.len();
        let body = &self.input[body_start..];
        let nested = body.find(COMMENT_OPEN);
        let Some(close) = body.find(COMMENT_CLOSE) else {
            let position = nested.map_or(self.input.len(), |open| body_start + open);
            return Err(ParseError::new(ErrorKind::MalformedComment, position));
        };
        if let Some(open) = nested
            && open < close
        {
            return Err(ParseError::new(
                ErrorKind::MalformedComment,
                body_start + open,
            ));
        }

        self.pos = body_start + close + COMMENT_CLOSE.len();
        Ok(())
    }

    fn open_tag(&mut self) -> Result<()> {
        let input = self.input;
        let start = self.pos;
        let header_start = start + 1;
        let end = self.tag_end(start, header_start)?;

        let id = self.doc.new_node(self.current);
        let header = &input[header_start..end];
        let parsed = classify(header).map_err(|err| header_error(err, header, start))?;
        self.pos = end + 1;

        trace!(tag = parsed.name, kind = %parsed.kind, "open");
        self.fill_node(id, &parsed);
        let leading = !self.seen_tag;
        self.seen_tag = true;

        match parsed.kind {
            TagKind::Declaration => self.apply_declaration(id, leading),
            TagKind::ProcessingInstruction => {
                let _ = self.doc.discard(id);
            }
            TagKind::SelfClosing => {}
            TagKind::Normal => self.current = id,
        }
        Ok(())
    }

    fn fill_node(&mut self, id: NodeId, parsed: &TagHeader<'_>) {
        let Some(node) = self.doc.get_mut(id) else {
            return;
        };
        let tagged = node.set_tag(parsed.name.to_owned());
        debug_assert!(tagged, "fresh node already tagged");
        for attr in &parsed.attributes {
            if node.get_attr_val(attr.key).is_some() {
                warn_once(
                    "XML",
                    &format!("duplicate attribute '{}' on <{}>", attr.key, parsed.name),
                );
            }
            node.push_attribute(Attribute::new(attr.key.to_owned(), attr.value.to_owned()));
        }
    }

    /// Drop the declaration node, keeping its `version` and `encoding`.
    ///
    /// Only a declaration that comes before every other tag is honoured.
    fn apply_declaration(&mut self, id: NodeId, leading: bool) {
        let Some(mut decl) = self.doc.discard(id) else {
            return;
        };
        if !leading {
            warn_once("XML", "declaration after the first tag ignored");
            return;
        }
        if let Some(version) = decl.take_attr_val("version") {
            self.doc.set_version(version);
        }
        if let Some(encoding) = decl.take_attr_val("encoding") {
            self.doc.set_encoding(encoding);
        }
    }

    /// Position of the first `>` at or after `from`, for the tag whose `<`
    /// is at `start`.
    fn tag_end(&self, start: usize, from: usize) -> Result<usize> {
        self.input
            .get(from..)
            .and_then(|rest| rest.find('>'))
            .map(|offset| from + offset)
            .ok_or_else(|| ParseError::new(ErrorKind::UnterminatedTag, start))
    }

    fn skip_whitespace(&mut self) {
        let bytes = self.input.as_bytes();
        while self.pos < bytes.len() && is_space(bytes[self.pos]) {
            self.pos += 1;
        }
    }
}

/// Turn a header-relative error into a document-level one. `start` is the
/// position of the tag's `<`.
fn header_error(err: HeaderError, header: &str, start: usize) -> ParseError {
    let header_start = start + 1;
    match err {
        HeaderError::InvalidTag => ParseError::new(
            ErrorKind::InvalidTag {
                header: header.to_owned(),
            },
            start,
        ),
        HeaderError::MalformedProcessingInstruction => ParseError::new(
            ErrorKind::MalformedProcessingInstruction {
                header: header.to_owned(),
            },
            start,
        ),
        HeaderError::BadAttributeKey { offset } => {
            ParseError::new(ErrorKind::BadAttributeKey, header_start + offset)
        }
        HeaderError::BadAttributeValue { offset } => {
            ParseError::new(ErrorKind::BadAttributeValue, header_start + offset)
        }
    }
}
