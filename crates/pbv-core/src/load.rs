//! # Document Loading
//!
//! Reads a YAML file from disk into a [`Document`] with a size ceiling.
//!
//! The file is opened once; its size is taken from the open handle's
//! metadata and compared against [`LoadOptions::max_file_bytes`] before any
//! content is read. The read itself is capped at the ceiling plus one byte,
//! so a file that grows between the metadata check and the read is still
//! rejected. The handle is dropped on every return path.

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use crate::document::Document;
use crate::error::DocumentLoadError;
use crate::parse::{parse_stream, LintedDocument};

/// Default size ceiling: 10 MiB.
pub const DEFAULT_MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;

/// Options controlling how documents are loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Files larger than this many bytes are rejected without parsing.
    pub max_file_bytes: u64,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
        }
    }
}

/// Load and parse the YAML document at `path`.
///
/// Same as [`load_linted`] without the lint findings.
pub fn load_document(path: &Path, options: &LoadOptions) -> Result<Document, DocumentLoadError> {
    load_linted(path, options).map(|linted| linted.document)
}

/// Load and parse the YAML document at `path`, keeping the boolean-like
/// value findings.
///
/// # Errors
///
/// - [`DocumentLoadError::NotFound`] if the file does not exist.
/// - [`DocumentLoadError::TooLarge`] if the file exceeds the ceiling.
/// - [`DocumentLoadError::Parse`] if the content is not a valid single YAML
///   document.
/// - [`DocumentLoadError::Io`] for any other read failure, including
///   content that is not UTF-8.
pub fn load_linted(
    path: &Path,
    options: &LoadOptions,
) -> Result<LintedDocument, DocumentLoadError> {
    let location = path.display().to_string();
    let limit = options.max_file_bytes;

    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => DocumentLoadError::NotFound {
            path: location.clone(),
        },
        _ => DocumentLoadError::Io {
            path: location.clone(),
            source: e,
        },
    })?;

    let size = file
        .metadata()
        .map_err(|e| DocumentLoadError::Io {
            path: location.clone(),
            source: e,
        })?
        .len();

    if size > limit {
        return Err(DocumentLoadError::TooLarge {
            path: location,
            size,
            limit,
        });
    }

    let mut content = String::with_capacity(usize::try_from(size).unwrap_or(0));
    file.take(limit.saturating_add(1))
        .read_to_string(&mut content)
        .map_err(|e| DocumentLoadError::Io {
            path: location.clone(),
            source: e,
        })?;

    let read = content.len() as u64;
    if read > limit {
        return Err(DocumentLoadError::TooLarge {
            path: location,
            size: read,
            limit,
        });
    }

    tracing::trace!(path = %location, bytes = read, "read document");

    parse_stream(&content)
        .and_then(|stream| stream.into_single())
        .map_err(|source| DocumentLoadError::Parse {
            path: location,
            source,
        })
}
