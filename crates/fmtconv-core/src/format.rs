//! Format routing: file extension → format → codec.
//!
//! Routing looks only at paths, never at content, so an unsupported extension
//! is rejected before any file is opened.

use std::fmt;
use std::path::Path;

use crate::codec::{Codec, JsonCodec, XmlCodec, YamlCodec};
use crate::error::{ConvertError, Result};
use crate::value::Value;

/// Extensions accepted on either side of a conversion (compared case-insensitively).
pub const SUPPORTED_EXTENSIONS: &[&str] = &[".json", ".xml", ".yml", ".yaml"];

/// A supported document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Json,
    Yaml,
    Xml,
}

/// Lower-cased extension (without the dot) → format.
const EXTENSION_TABLE: &[(&str, Format)] = &[
    ("json", Format::Json),
    ("xml", Format::Xml),
    ("yml", Format::Yaml),
    ("yaml", Format::Yaml),
];

impl Format {
    /// Human-readable format name.
    pub fn name(self) -> &'static str {
        match self {
            Format::Json => "JSON",
            Format::Yaml => "YAML",
            Format::Xml => "XML",
        }
    }

    /// Extensions (with leading dot) that route to this format.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Format::Json => &[".json"],
            Format::Yaml => &[".yml", ".yaml"],
            Format::Xml => &[".xml"],
        }
    }

    /// Look up a format by extension. Case-insensitive; a leading dot is optional.
    pub fn from_extension(extension: &str) -> Option<Format> {
        let extension = extension.strip_prefix('.').unwrap_or(extension);
        EXTENSION_TABLE
            .iter()
            .find(|(ext, _)| ext.eq_ignore_ascii_case(extension))
            .map(|&(_, format)| format)
    }

    /// Determine the format of `path` from its extension.
    ///
    /// # Errors
    /// Returns [`ConvertError::UnsupportedFormat`] if the path has no extension
    /// or one outside [`SUPPORTED_EXTENSIONS`].
    pub fn from_path(path: &Path) -> Result<Format> {
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned())
            .unwrap_or_default();
        Format::from_extension(&extension).ok_or_else(|| ConvertError::UnsupportedFormat {
            path: path.to_path_buf(),
            extension,
        })
    }

    /// Parse `text` as this format.
    pub fn decode(self, text: &str) -> Result<Value> {
        self.codec().decode(text)
    }

    /// Serialize `value` as this format.
    pub fn encode(self, value: &Value) -> Result<String> {
        self.codec().encode(value)
    }

    fn codec(self) -> &'static dyn Codec {
        match self {
            Format::Json => &JsonCodec,
            Format::Yaml => &YamlCodec,
            Format::Xml => &XmlCodec,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Determine the format of `path` from its extension. See [`Format::from_path`].
pub fn resolve_format(path: impl AsRef<Path>) -> Result<Format> {
    Format::from_path(path.as_ref())
}

/// Parse `text` according to `format`.
///
/// # Errors
/// Returns [`ConvertError::Decode`] with the parser's diagnostic if `text` is
/// malformed.
pub fn decode(format: Format, text: &str) -> Result<Value> {
    format.decode(text)
}

/// Serialize `value` according to `format`.
///
/// # Errors
/// Returns [`ConvertError::Encode`] if `value` cannot be represented in `format`.
pub fn encode(format: Format, value: &Value) -> Result<String> {
    format.encode(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_supported_extension_routes_somewhere() {
        for ext in SUPPORTED_EXTENSIONS {
            let format = Format::from_extension(ext).expect("supported extension must resolve");
            assert!(format.extensions().contains(ext));
        }
    }

    #[test]
    fn leading_dot_is_optional() {
        assert_eq!(Format::from_extension(".yaml"), Some(Format::Yaml));
        assert_eq!(Format::from_extension("yaml"), Some(Format::Yaml));
    }

    #[test]
    fn display_uses_format_name() {
        assert_eq!(Format::Xml.to_string(), "XML");
    }
}
