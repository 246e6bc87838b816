//! # Error Types
//!
//! Errors raised while turning raw text or files into a [`Document`].
//! All errors use `thiserror` for derive-based `Display` and `Error`
//! implementations.
//!
//! [`Document`]: crate::Document

use thiserror::Error;

/// Error converting YAML text into a [`Document`](crate::Document).
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The YAML scanner rejected the input.
    #[error("{0}")]
    Yaml(#[from] yaml_rust2::ScanError),

    /// A mapping key could not be represented as a string.
    #[error("unsupported mapping key: {0}")]
    UnsupportedKey(String),

    /// An alias pointed at a node that encloses it.
    #[error("alias refers to an enclosing node")]
    RecursiveAlias,

    /// A single document was required but the stream held several.
    #[error("expected a single YAML document, found {count}")]
    MultipleDocuments { count: usize },
}

/// Error loading a document from the filesystem.
///
/// Every variant carries the path that was being loaded so the message can
/// be reported on its own.
#[derive(Error, Debug)]
pub enum DocumentLoadError {
    /// The file does not exist.
    #[error("File not found: {path}")]
    NotFound {
        /// Path that was requested.
        path: String,
    },

    /// The file exceeds the configured size ceiling and was not parsed.
    #[error("File {path} is too large to process safely ({size} bytes, limit {limit} bytes)")]
    TooLarge {
        /// Path of the oversized file.
        path: String,
        /// Observed size in bytes.
        size: u64,
        /// Configured ceiling in bytes.
        limit: u64,
    },

    /// The file was read but could not be parsed into a document.
    #[error("Error parsing YAML file: {source}")]
    Parse {
        /// Path of the file.
        path: String,
        /// Underlying conversion error, carrying the raw parser message.
        source: DocumentError,
    },

    /// Any other IO failure while opening or reading the file.
    #[error("Unexpected error reading {path}: {source}")]
    Io {
        /// Path of the file.
        path: String,
        /// Underlying IO error.
        source: std::io::Error,
    },
}

impl DocumentLoadError {
    /// Path of the document this error refers to.
    pub fn path(&self) -> &str {
        match self {
            Self::NotFound { path }
            | Self::TooLarge { path, .. }
            | Self::Parse { path, .. }
            | Self::Io { path, .. } => path,
        }
    }
}
