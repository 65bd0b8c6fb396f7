//! Token-Oriented Object Notation: a compact, line-oriented serialization
//! format whose data model is isomorphic to JSON. TOON exists to shrink
//! the token count of structured data embedded in LLM prompts, mostly by
//! collapsing uniform object arrays into CSV-like tabular blocks and
//! dropping the punctuation JSON repeats on every row.
//!
//! # Examples
//!
//! Encode and decode a [`Value`] tree:
//!
//! ```rust
//! use toon_codec::{from_str, to_string, Value};
//!
//! let value = Value::from(serde_json::json!({
//!     "users": [
//!         {"id": 1, "name": "Alice", "role": "admin"},
//!         {"id": 2, "name": "Bob", "role": "user"}
//!     ]
//! }));
//!
//! let toon = to_string(&value)?;
//! assert_eq!(toon, "users[2]{id,name,role}:\n  1,Alice,admin\n  2,Bob,user");
//! assert_eq!(from_str(&toon)?, value);
//! # Ok::<(), toon_codec::Error>(())
//! ```
//!
//! Straight from JSON text:
//!
//! ```rust
//! use toon_codec::to_string_from_json_str;
//!
//! let toon = to_string_from_json_str(r#"{"name":"Grace Hopper","year":1952}"#)?;
//! assert_eq!(toon, "name: Grace Hopper\nyear: 1952");
//! # Ok::<(), toon_codec::Error>(())
//! ```
//!
//! Custom options:
//!
//! ```rust
//! use toon_codec::{to_string_with_options, Delimiter, EncodeOptions, Value};
//!
//! let options = EncodeOptions::new().with_delimiter(Delimiter::Pipe);
//! let value = Value::from(serde_json::json!({"items": ["a", "b"]}));
//! assert_eq!(to_string_with_options(&value, &options)?, "items[2|]: a|b");
//! # Ok::<(), toon_codec::Error>(())
//! ```
//!
//! Strict decoding is the default; truncated arrays are caught early:
//!
//! ```rust
//! use toon_codec::{from_str, from_str_with_options, DecodeOptions, Error};
//!
//! assert!(matches!(
//!     from_str("items[3]: 1,2"),
//!     Err(Error::CountMismatch { expected: 3, actual: 2, .. })
//! ));
//!
//! let lenient = DecodeOptions::new().with_strict(false);
//! let value = from_str_with_options("items[3]: 1,2", &lenient)?;
//! assert_eq!(value, toon_codec::Value::from(serde_json::json!({"items": [1, 2]})));
//! # Ok::<(), toon_codec::Error>(())
//! ```

pub mod constants;
mod decode;
mod encode;
pub mod error;
mod num;
pub mod options;
mod text;
pub mod value;

use std::io::{Read, Write};

pub use crate::error::{ArrayKind, Error};
pub use crate::options::{DecodeOptions, Delimiter, EncodeOptions, Indent, LengthMarker};
pub use crate::value::{Map, Value};

pub type Result<T> = std::result::Result<T, Error>;

/// Encode a value with default options.
pub fn to_string(value: &Value) -> Result<String> {
    to_string_with_options(value, &EncodeOptions::default())
}

/// Encode a value to TOON text.
pub fn to_string_with_options(value: &Value, options: &EncodeOptions) -> Result<String> {
    encode::encode_value(value, options)
}

/// Decode TOON text with default (strict) options.
pub fn from_str(input: &str) -> Result<Value> {
    from_str_with_options(input, &DecodeOptions::default())
}

/// Decode TOON text to a value.
pub fn from_str_with_options(input: &str, options: &DecodeOptions) -> Result<Value> {
    decode::decode_str(input, options)
}

/// Check a document without keeping the decoded tree.
pub fn validate_str(input: &str) -> Result<()> {
    validate_str_with_options(input, &DecodeOptions::default())
}

pub fn validate_str_with_options(input: &str, options: &DecodeOptions) -> Result<()> {
    decode::decode_str(input, options).map(|_| ())
}

/// `true` when the input decodes cleanly under the given options.
pub fn is_valid(input: &str, options: &DecodeOptions) -> bool {
    decode::decode_str(input, options).is_ok()
}

/// Encode then decode, returning the reconstructed value.
pub fn round_trip(
    value: &Value,
    encode_options: &EncodeOptions,
    decode_options: &DecodeOptions,
) -> Result<Value> {
    let text = to_string_with_options(value, encode_options)?;
    from_str_with_options(&text, decode_options)
}

/// Convert JSON text to TOON with default options.
pub fn to_string_from_json_str(input: &str) -> Result<String> {
    to_string_from_json_str_with_options(input, &EncodeOptions::default())
}

/// Convert JSON text to TOON. Parses through [`serde_json`] and delegates
/// to [`to_string_with_options`]; the grammar is untouched.
pub fn to_string_from_json_str_with_options(
    input: &str,
    options: &EncodeOptions,
) -> Result<String> {
    let json: serde_json::Value = serde_json::from_str(input)
        .map_err(|err| Error::invalid_input(format!("invalid json: {err}")))?;
    to_string_with_options(&Value::from(json), options)
}

/// Convert TOON text to minified JSON text.
pub fn to_json_string(input: &str, options: &DecodeOptions) -> Result<String> {
    let value = from_str_with_options(input, options)?;
    let json: serde_json::Value = value.into();
    serde_json::to_string(&json)
        .map_err(|err| Error::invalid_input(format!("json encode failed: {err}")))
}

/// Encode a value and write the text to `writer`.
pub fn to_writer<W: Write>(mut writer: W, value: &Value, options: &EncodeOptions) -> Result<()> {
    let text = to_string_with_options(value, options)?;
    writer
        .write_all(text.as_bytes())
        .map_err(|err| Error::invalid_input(format!("write failed: {err}")))
}

/// Read all of `reader` and decode it.
pub fn from_reader<R: Read>(mut reader: R, options: &DecodeOptions) -> Result<Value> {
    let mut buf = String::new();
    reader
        .read_to_string(&mut buf)
        .map_err(|err| Error::invalid_input(format!("read failed: {err}")))?;
    from_str_with_options(&buf, options)
}
