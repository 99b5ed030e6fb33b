//! Reading a document from disk.

use std::borrow::Cow;
use std::fs;
use std::path::Path;

use arbor_common::warning::warn_once;
use arbor_dom::Document;
use tracing::debug;

use crate::error::LoadError;
use crate::parser::parse;

/// Read the whole file at `path` and parse it.
///
/// The input is treated as an ASCII superset. Byte sequences that are not
/// valid UTF-8 are replaced with U+FFFD and a warning is emitted; the declared
/// `encoding` is recorded but never used for decoding.
///
/// # Errors
///
/// Returns [`LoadError::Io`] if the file cannot be read and
/// [`LoadError::Parse`] if its contents do not parse.
pub fn load(path: impl AsRef<Path>) -> Result<Document, LoadError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = bytes.len(), "loaded file");

    let text = String::from_utf8_lossy(&bytes);
    if matches!(text, Cow::Owned(_)) {
        warn_once(
            "XML",
            &format!("{} is not valid UTF-8; invalid bytes replaced", path.display()),
        );
    }

    Ok(parse(&text)?)
}
