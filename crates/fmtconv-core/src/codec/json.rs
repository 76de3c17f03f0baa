//! JSON codec.
//!
//! Output is indented with four spaces and leaves non-ASCII characters as-is.

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use super::Codec;
use crate::error::{ConvertError, Position, Result};
use crate::format::Format;
use crate::value::Value;

const INDENT: &[u8] = b"    ";

/// JSON via `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn format(&self) -> Format {
        Format::Json
    }

    fn decode(&self, text: &str) -> Result<Value> {
        serde_json::from_str(text).map_err(|err| {
            // serde_json reports line 0 for errors without a location.
            let position = (err.line() > 0).then(|| Position {
                line: err.line(),
                column: err.column(),
            });
            ConvertError::decode_at(Format::Json, strip_location(&err), position)
        })
    }

    fn encode(&self, value: &Value) -> Result<String> {
        // serde_json silently writes NaN and infinities as `null`.
        if value.contains_non_finite() {
            return Err(ConvertError::encode(
                Format::Json,
                "NaN and infinite numbers cannot be represented in JSON",
            ));
        }

        let mut out = Vec::new();
        let mut serializer =
            Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(INDENT));
        value
            .serialize(&mut serializer)
            .map_err(|err| ConvertError::encode(Format::Json, err.to_string()))?;
        String::from_utf8(out).map_err(|err| ConvertError::encode(Format::Json, err.to_string()))
    }
}

/// serde_json appends " at line X column Y" to its messages; the position is
/// carried separately.
fn strip_location(err: &serde_json::Error) -> String {
    let message = err.to_string();
    let suffix = format!(" at line {} column {}", err.line(), err.column());
    match message.strip_suffix(&suffix) {
        Some(stripped) => stripped.to_string(),
        None => message,
    }
}
