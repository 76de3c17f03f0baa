//! XML codec.
//!
//! XML documents are folded into mappings with the following convention:
//!
//! - `<a>text</a>` → `{"a": "text"}`, and `<a/>` → `{"a": null}`
//! - attributes become keys prefixed with `@`: `<a id="1"/>` → `{"a": {"@id": "1"}}`
//! - text next to attributes or children goes under `#text`
//! - repeated sibling elements collapse into a sequence:
//!   `<l><i>1</i><i>2</i></l>` → `{"l": {"i": ["1", "2"]}}`
//!
//! Every scalar decodes as a string. Encoding applies the same rules in
//! reverse. A document has exactly one root element, so a value that is not a
//! single-key mapping is wrapped under [`ROOT_ELEMENT`] before it is written.

use std::borrow::Cow;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use super::Codec;
use crate::error::{ConvertError, Position, Result};
use crate::format::Format;
use crate::value::{Map, Value};

/// Key prefix marking an attribute.
pub const ATTRIBUTE_PREFIX: &str = "@";
/// Key holding an element's text when it also has attributes or children.
pub const TEXT_KEY: &str = "#text";
/// Synthetic document element for values that are not a single-key mapping.
pub const ROOT_ELEMENT: &str = "root";

/// XML via `quick-xml`.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlCodec;

impl Codec for XmlCodec {
    fn format(&self) -> Format {
        Format::Xml
    }

    fn decode(&self, text: &str) -> Result<Value> {
        decode_document(text)
    }

    fn encode(&self, value: &Value) -> Result<String> {
        match value.single_entry() {
            Some((name, content)) => encode_document(name, content),
            None => encode_document(ROOT_ELEMENT, value),
        }
    }
}

// ============================================================================
// Decoding
// ============================================================================

/// An element whose end tag has not been seen yet.
#[derive(Debug, Default)]
struct OpenElement {
    name: String,
    attributes: Map,
    children: Map,
    text: String,
}

impl OpenElement {
    fn open(start: &BytesStart<'_>) -> std::result::Result<Self, String> {
        let name = utf8(start.name().as_ref())?.to_string();
        let mut attributes = Map::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|err| err.to_string())?;
            let key = utf8(attr.key.as_ref())?;
            let value = attr.unescape_value().map_err(|err| err.to_string())?;
            attributes.insert(
                format!("{ATTRIBUTE_PREFIX}{key}"),
                Value::String(value.into_owned()),
            );
        }
        Ok(Self {
            name,
            attributes,
            ..Self::default()
        })
    }

    /// Append a child, turning a repeated name into a sequence.
    fn push_child(&mut self, name: String, value: Value) {
        match self.children.get_mut(&name) {
            // Decoded element values are never sequences, so an existing
            // sequence can only come from an earlier repetition.
            Some(Value::Sequence(items)) => items.push(value),
            Some(existing) => {
                let first = std::mem::take(existing);
                *existing = Value::Sequence(vec![first, value]);
            }
            None => {
                self.children.insert(name, value);
            }
        }
    }

    fn close(self) -> (String, Value) {
        let text = self.text.trim();
        let value = if self.attributes.is_empty() && self.children.is_empty() {
            if text.is_empty() {
                Value::Null
            } else {
                Value::String(text.to_string())
            }
        } else {
            let mut map = self.attributes;
            map.extend(self.children);
            if !text.is_empty() {
                map.insert(TEXT_KEY.to_string(), Value::String(text.to_string()));
            }
            Value::Mapping(map)
        };
        (self.name, value)
    }
}

fn decode_document(text: &str) -> Result<Value> {
    // Text may arrive in several events (split by comments, PIs or child
    // elements). It is joined raw and trimmed once when the element closes.
    let mut reader = Reader::from_str(text);
    reader.trim_text(false);

    let mut stack: Vec<OpenElement> = Vec::new();
    let mut root: Option<(String, Value)> = None;

    loop {
        let position = reader.buffer_position();
        let fail = |message: String| {
            ConvertError::decode_at(
                Format::Xml,
                message,
                Some(Position::from_offset(text, position)),
            )
        };

        let event = reader.read_event().map_err(|err| {
            ConvertError::decode_at(
                Format::Xml,
                err.to_string(),
                Some(Position::from_offset(text, reader.buffer_position())),
            )
        })?;

        match event {
            Event::Start(start) => {
                if root.is_some() {
                    return Err(fail("junk after document element".to_string()));
                }
                stack.push(OpenElement::open(&start).map_err(fail)?);
            }
            Event::Empty(start) => {
                if root.is_some() {
                    return Err(fail("junk after document element".to_string()));
                }
                let element = OpenElement::open(&start).map_err(fail)?;
                attach(&mut stack, &mut root, element.close());
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| fail("closing tag without matching opening tag".to_string()))?;
                attach(&mut stack, &mut root, element.close());
            }
            Event::Text(content) => {
                let content = content.unescape().map_err(|err| fail(err.to_string()))?;
                append_text(&mut stack, &content).map_err(fail)?;
            }
            Event::CData(content) => {
                let raw = content.into_inner();
                append_text(&mut stack, utf8(&raw).map_err(fail)?).map_err(fail)?;
            }
            Event::Eof => break,
            // Declaration, comments, processing instructions and DOCTYPE carry no data.
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(ConvertError::decode_at(
            Format::Xml,
            format!("unclosed element <{}>", open.name),
            Some(Position::from_offset(text, text.len())),
        ));
    }

    match root {
        Some((name, value)) => Ok(std::iter::once((name, value)).collect()),
        None => Err(ConvertError::decode_at(
            Format::Xml,
            "no element found",
            Some(Position::from_offset(text, text.len())),
        )),
    }
}

fn attach(stack: &mut [OpenElement], root: &mut Option<(String, Value)>, closed: (String, Value)) {
    match stack.last_mut() {
        Some(parent) => parent.push_child(closed.0, closed.1),
        None => *root = Some(closed),
    }
}

fn append_text(stack: &mut [OpenElement], content: &str) -> std::result::Result<(), String> {
    match stack.last_mut() {
        Some(open) => {
            open.text.push_str(content);
            Ok(())
        }
        None if content.trim().is_empty() => Ok(()),
        None => Err("text outside of the document element".to_string()),
    }
}

fn utf8(bytes: &[u8]) -> std::result::Result<&str, String> {
    std::str::from_utf8(bytes).map_err(|err| err.to_string())
}

// ============================================================================
// Encoding
// ============================================================================

type XmlWriter = Writer<Vec<u8>>;

fn encode_document(name: &str, content: &Value) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b'\t', 1);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
        .map_err(write_error)?;

    match content {
        Value::Sequence(items) => match items.as_slice() {
            [] => {
                return Err(ConvertError::encode(
                    Format::Xml,
                    "document has no root element",
                ));
            }
            [single] => write_element(&mut writer, name, single)?,
            _ => {
                return Err(ConvertError::encode(
                    Format::Xml,
                    format!(
                        "document with multiple roots: <{name}> holds a sequence of {} items",
                        items.len()
                    ),
                ));
            }
        },
        _ => write_element(&mut writer, name, content)?,
    }

    String::from_utf8(writer.into_inner())
        .map_err(|err| ConvertError::encode(Format::Xml, err.to_string()))
}

/// Write `value` as one or more `<name>` elements.
fn write_field(writer: &mut XmlWriter, name: &str, value: &Value) -> Result<()> {
    match value {
        Value::Sequence(items) => {
            for item in items {
                if matches!(item, Value::Sequence(_)) {
                    return Err(ConvertError::encode(
                        Format::Xml,
                        format!("<{name}> holds a sequence inside a sequence"),
                    ));
                }
                write_element(writer, name, item)?;
            }
            Ok(())
        }
        _ => write_element(writer, name, value),
    }
}

/// Write exactly one `<name>` element holding a non-sequence value.
///
/// Attributes come first, then child elements, then the element's own text.
/// Elements with neither text nor children are written self-closing.
fn write_element(writer: &mut XmlWriter, name: &str, value: &Value) -> Result<()> {
    check_name(name)?;
    let mut start = BytesStart::new(name);
    let mut text: Option<Cow<'_, str>> = None;
    let mut children = Vec::new();

    match value {
        Value::Mapping(map) => {
            for (key, child) in map {
                if let Some(attr) = key.strip_prefix(ATTRIBUTE_PREFIX) {
                    check_name(attr)?;
                    require_scalar(child, || format!("attribute '{attr}' on <{name}>"))?;
                    let attr_value = scalar_text(child).unwrap_or_default();
                    start.push_attribute((attr, attr_value.as_ref()));
                } else if key == TEXT_KEY {
                    require_scalar(child, || format!("{TEXT_KEY} of <{name}>"))?;
                    text = scalar_text(child);
                } else {
                    children.push((key.as_str(), child));
                }
            }
        }
        _ => text = scalar_text(value),
    }

    if text.is_none() && children.is_empty() {
        return writer.write_event(Event::Empty(start)).map_err(write_error);
    }

    writer.write_event(Event::Start(start)).map_err(write_error)?;
    for (child_name, child) in children {
        write_field(writer, child_name, child)?;
    }
    if let Some(text) = text {
        writer
            .write_event(Event::Text(BytesText::new(&text)))
            .map_err(write_error)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(write_error)
}

/// Attribute values and element text have no room for nested structure.
fn require_scalar(value: &Value, what: impl FnOnce() -> String) -> Result<()> {
    if matches!(value, Value::Mapping(_) | Value::Sequence(_)) {
        return Err(ConvertError::encode(
            Format::Xml,
            format!("{} must be a scalar, found a {}", what(), value.type_name()),
        ));
    }
    Ok(())
}

/// Text form of a scalar; `None` for null and containers.
fn scalar_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
        Value::Bool(b) => Some(Cow::Borrowed(if *b { "true" } else { "false" })),
        Value::Integer(n) => Some(Cow::Owned(n.to_string())),
        Value::Float(f) => Some(Cow::Owned(float_text(*f))),
        Value::String(s) => Some(Cow::Borrowed(s)),
    }
}

/// Shortest round-trip text with a fraction digit, switching to exponent form
/// (`1e+16`, `1.5e-05`) outside `1e-4..1e16`.
fn float_text(f: f64) -> String {
    if f.is_nan() {
        return "nan".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let magnitude = f.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let scientific = format!("{f:e}");
        return match scientific.split_once('e') {
            Some((mantissa, exponent)) => {
                let (sign, digits) = match exponent.strip_prefix('-') {
                    Some(digits) => ('-', digits),
                    None => ('+', exponent),
                };
                format!("{mantissa}e{sign}{digits:0>2}")
            }
            None => scientific,
        };
    }

    if f.fract() == 0.0 {
        format!("{f:.1}")
    } else {
        f.to_string()
    }
}

/// Reject names that would produce a malformed document.
fn check_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' || first == ':' => chars
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | ':' | '-' | '.')),
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(ConvertError::encode(
            Format::Xml,
            format!("'{name}' is not a valid XML name"),
        ))
    }
}

fn write_error(err: quick_xml::Error) -> ConvertError {
    ConvertError::encode(Format::Xml, err.to_string())
}
