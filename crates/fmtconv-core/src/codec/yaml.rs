//! YAML codec.
//!
//! Input is restricted to plain scalars, sequences and mappings: custom tags
//! are rejected instead of being constructed. Merge keys (`<<`) are resolved
//! before the document is lowered into a [`Value`].
//!
//! Plain scalars follow YAML 1.2 core schema rules: only `true`/`false` are
//! booleans and only `null`/`~` are null, so `yes`, `no`, `on` and `off` stay
//! strings. Quote them or use `true`/`false` when a boolean is meant.

use serde_yaml::Value as YamlValue;

use super::Codec;
use crate::error::{ConvertError, Position, Result};
use crate::format::Format;
use crate::value::{Map, Value};

/// YAML via `serde_yaml`.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlCodec;

impl Codec for YamlCodec {
    fn format(&self) -> Format {
        Format::Yaml
    }

    fn decode(&self, text: &str) -> Result<Value> {
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        let mut document: YamlValue = serde_yaml::from_str(text).map_err(parse_error)?;
        document.apply_merge().map_err(parse_error)?;
        lower(document).map_err(|message| ConvertError::decode(Format::Yaml, message))
    }

    fn encode(&self, value: &Value) -> Result<String> {
        serde_yaml::to_string(value)
            .map_err(|err| ConvertError::encode(Format::Yaml, err.to_string()))
    }
}

fn parse_error(err: serde_yaml::Error) -> ConvertError {
    let position = err.location().map(|loc| Position {
        line: loc.line(),
        column: loc.column(),
    });
    let mut message = err.to_string();
    if let Some(pos) = position {
        let suffix = format!(" at line {} column {}", pos.line, pos.column);
        if let Some(stripped) = message.strip_suffix(&suffix) {
            message = stripped.to_string();
        }
    }
    ConvertError::decode_at(Format::Yaml, message, position)
}

/// Convert a parsed YAML tree into a [`Value`].
fn lower(yaml: YamlValue) -> std::result::Result<Value, String> {
    Ok(match yaml {
        YamlValue::Null => Value::Null,
        YamlValue::Bool(b) => Value::Bool(b),
        YamlValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                Value::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        YamlValue::String(s) => Value::String(s),
        YamlValue::Sequence(items) => Value::Sequence(
            items
                .into_iter()
                .map(lower)
                .collect::<std::result::Result<_, _>>()?,
        ),
        YamlValue::Mapping(mapping) => {
            let mut map = Map::with_capacity(mapping.len());
            for (key, value) in mapping {
                map.insert(lower_key(key)?, lower(value)?);
            }
            Value::Mapping(map)
        }
        YamlValue::Tagged(tagged) => {
            return Err(format!(
                "unsupported tag {} (only plain scalars, sequences and mappings are accepted)",
                tagged.tag
            ));
        }
    })
}

/// Scalar keys become their canonical text; compound keys have no string form.
fn lower_key(key: YamlValue) -> std::result::Result<String, String> {
    match key {
        YamlValue::String(s) => Ok(s),
        YamlValue::Bool(b) => Ok(b.to_string()),
        YamlValue::Number(n) => Ok(n.to_string()),
        YamlValue::Null => Ok("null".to_string()),
        YamlValue::Sequence(_) => {
            Err("mapping keys must be scalars, found a sequence".to_string())
        }
        YamlValue::Mapping(_) => {
            Err("mapping keys must be scalars, found a mapping".to_string())
        }
        YamlValue::Tagged(tagged) => Err(format!("unsupported tag {} on mapping key", tagged.tag)),
    }
}
