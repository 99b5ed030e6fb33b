//! Single-pass parser for a small XML-like markup language.
//!
//! # Scope
//!
//! This crate implements:
//! - **Scanner** - one left-to-right pass that recognizes opening tags,
//!   closing tags, comments and text runs, tracking nesting through the tree's
//!   parent links
//! - **Tag-header classifier** - decides declaration, processing instruction,
//!   self-closing or normal from the raw header, and extracts the name and
//!   quoted attributes
//! - **Loader** - reads a whole file and parses it
//!
//! The result is an [`arbor_dom::Document`]. A leading `<?xml ...?>`
//! declaration supplies the document's `version` and `encoding`.
//!
//! # Not Supported
//!
//! - Entity references (`&amp;` is kept verbatim)
//! - Namespaces, CDATA sections, DOCTYPE
//! - Unquoted attribute values
//! - Non-UTF-8 input: [`load`] replaces invalid bytes with U+FFFD (with a
//!   warning), so Latin-1 and other single-byte encodings lose their
//!   non-ASCII characters. The declared `encoding` is recorded, never applied.
//!
//! # Example
//!
//! ```
//! let doc = arbor_xml::parse(r#"<?xml version="1.0"?><note to="you">hi</note>"#)?;
//! let note = doc.get_child(doc.root(), 0).unwrap();
//!
//! assert_eq!(doc.version(), Some("1.0"));
//! assert_eq!(doc.get_attr_val(note, "to"), Some("you"));
//! assert_eq!(doc.get(note).unwrap().text(), Some("hi"));
//! # Ok::<(), arbor_xml::ParseError>(())
//! ```

/// Error types.
pub mod error;
/// Tag-header classification.
pub mod header;
/// File loading.
pub mod load;
/// The scan loop.
pub mod parser;

pub use error::{ErrorKind, LoadError, ParseError};
pub use header::{HeaderError, RawAttribute, TagHeader, TagKind, classify};
pub use load::load;
pub use parser::{XmlParser, parse};
