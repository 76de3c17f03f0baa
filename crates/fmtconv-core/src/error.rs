//! Error types for format resolution, decoding, encoding and file I/O.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::format::Format;

/// A 1-based line/column location inside a decoded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    /// Translate a byte offset into `text` to a line/column pair.
    ///
    /// Offsets past the end are clamped; columns count characters, not bytes.
    pub fn from_offset(text: &str, offset: usize) -> Self {
        let mut offset = offset.min(text.len());
        while !text.is_char_boundary(offset) {
            offset -= 1;
        }
        let before = &text[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let column = before[line_start..].chars().count() + 1;
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Errors that can occur while converting a document.
///
/// Every variant is terminal for the conversion attempt; nothing is retried.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ConvertError {
    /// The path's extension is not one of `.json`, `.xml`, `.yml`, `.yaml`.
    /// Raised before any file is touched.
    #[error("unsupported format {} for {}", display_extension(.extension), .path.display())]
    UnsupportedFormat { path: PathBuf, extension: String },

    /// The input path does not exist.
    #[error("input file not found: {}", .path.display())]
    InputNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The input path exists but could not be read (permissions, directory, ...).
    #[error("cannot read input file {}: {source}", .path.display())]
    InputUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The input text does not conform to its format's grammar.
    #[error("{format} decode error{}: {message}", display_position(.position))]
    Decode {
        format: Format,
        message: String,
        position: Option<Position>,
    },

    /// The value cannot be represented in the target format.
    #[error("{format} encode error: {message}")]
    Encode { format: Format, message: String },

    /// The output path could not be written.
    #[error("cannot write output file {}: {source}", .path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A background conversion ended without reporting a result.
    #[error("conversion worker exited without reporting a result")]
    WorkerDisconnected,
}

impl ConvertError {
    pub(crate) fn decode(format: Format, message: impl Into<String>) -> Self {
        Self::Decode {
            format,
            message: message.into(),
            position: None,
        }
    }

    pub(crate) fn decode_at(
        format: Format,
        message: impl Into<String>,
        position: Option<Position>,
    ) -> Self {
        Self::Decode {
            format,
            message: message.into(),
            position,
        }
    }

    pub(crate) fn encode(format: Format, message: impl Into<String>) -> Self {
        Self::Encode {
            format,
            message: message.into(),
        }
    }
}

fn display_extension(extension: &str) -> String {
    if extension.is_empty() {
        "(no extension)".to_string()
    } else {
        format!("'.{extension}'")
    }
}

fn display_position(position: &Option<Position>) -> String {
    match position {
        Some(pos) => format!(" at {pos}"),
        None => String::new(),
    }
}

/// Convenience alias used throughout fmtconv-core.
pub type Result<T> = std::result::Result<T, ConvertError>;
