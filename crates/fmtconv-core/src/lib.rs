//! # fmtconv-core
//!
//! Converts structured data files between **JSON**, **YAML** and **XML**.
//!
//! Every conversion goes through a format-agnostic [`Value`] tree: the input
//! file's extension picks a decoder, the output file's extension picks an
//! encoder, and the tree in between carries no memory of where it came from.
//!
//! ## Quick start
//!
//! ```rust
//! use fmtconv_core::{decode, encode, Format};
//!
//! // JSON → YAML, key order preserved
//! let value = decode(Format::Json, r#"{"b": 1, "a": 2}"#).unwrap();
//! let yaml = encode(Format::Yaml, &value).unwrap();
//! assert_eq!(yaml, "b: 1\na: 2\n");
//!
//! // Anything that is not a single-key mapping is wrapped in <root> for XML
//! let xml = encode(Format::Xml, &value).unwrap();
//! assert!(xml.contains("<root>"));
//! ```
//!
//! ## Modules
//!
//! - [`value`]: `Value` intermediate representation
//! - [`format`]: extension → format routing, `decode`/`encode` dispatch
//! - [`codec`]: JSON, YAML and XML codecs behind the `Codec` trait
//! - [`convert`]: file-to-file conversion, `load_file`/`save_file`
//! - [`worker`]: run one conversion on a background thread
//! - [`error`]: error taxonomy for every conversion step

pub mod codec;
pub mod convert;
pub mod error;
pub mod format;
pub mod value;
pub mod worker;

pub use convert::{
    convert, convert_with_progress, load_file, save_file, Conversion, ConversionReport,
    ConvertPhase, ConvertProgress, ConvertProgressCallback,
};
pub use error::{ConvertError, Position};
pub use format::{decode, encode, resolve_format, Format, SUPPORTED_EXTENSIONS};
pub use value::{Map, Value};
pub use worker::{spawn_conversion, spawn_conversion_with, ConversionHandle};
