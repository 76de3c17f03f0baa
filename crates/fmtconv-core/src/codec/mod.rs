//! Per-format codecs behind a common [`Codec`] trait.
//!
//! Each codec turns text into a [`Value`] and back. None of them knows which
//! format a value was decoded from.

mod json;
mod xml;
mod yaml;

pub use json::JsonCodec;
pub use xml::{XmlCodec, ATTRIBUTE_PREFIX, ROOT_ELEMENT, TEXT_KEY};
pub use yaml::YamlCodec;

use crate::error::Result;
use crate::format::Format;
use crate::value::Value;

/// Decoder/encoder pair for one format.
pub trait Codec: Sync {
    /// The format this codec reads and writes.
    fn format(&self) -> Format;

    /// Parse `text` into a value.
    fn decode(&self, text: &str) -> Result<Value>;

    /// Serialize `value` into text.
    fn encode(&self, value: &Value) -> Result<String>;
}
