mod writer;

use crate::constants::{LIST_MARKER, MAX_DEPTH};
use crate::error::Error;
use crate::num::{append_float, append_int};
use crate::options::{EncodeOptions, LengthMarker};
use crate::text::{append_key, append_string};
use crate::value::{Map, Value};
use crate::Result;

use writer::LineWriter;

pub(crate) fn encode_value(value: &Value, options: &EncodeOptions) -> Result<String> {
    if options.indent.get_spaces() == 0 {
        return Err(Error::invalid_input("indent size must be greater than zero"));
    }
    let mut encoder = Encoder::new(options);
    encoder.encode_root(value)?;
    Ok(encoder.writer.finish())
}

struct Encoder {
    writer: LineWriter,
    delimiter: char,
    length_marker: bool,
}

impl Encoder {
    fn new(options: &EncodeOptions) -> Self {
        Self {
            writer: LineWriter::new(options.indent.get_spaces()),
            delimiter: options.delimiter.as_char(),
            length_marker: matches!(options.length_marker, LengthMarker::Hash),
        }
    }

    fn encode_root(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Object(map) => self.encode_object(map, 0),
            Value::Array(array) => self.encode_array(array, 0, None, ""),
            primitive => {
                let mut line = String::new();
                append_scalar(&mut line, primitive)?;
                self.writer.push_line(0, "", &line);
                Ok(())
            }
        }
    }

    fn encode_object(&mut self, map: &Map, depth: usize) -> Result<()> {
        check_depth(depth)?;
        for (key, value) in map {
            self.encode_entry(key, value, depth)?;
        }
        Ok(())
    }

    fn encode_entry(&mut self, key: &str, value: &Value, depth: usize) -> Result<()> {
        match value {
            Value::Array(array) => self.encode_array(array, depth, Some(key), ""),
            Value::Object(map) => {
                let mut line = String::new();
                append_key(&mut line, key);
                line.push(':');
                self.writer.push_line(depth, "", &line);
                self.encode_object(map, depth + 1)
            }
            primitive => {
                let mut line = String::new();
                append_key(&mut line, key);
                line.push_str(": ");
                append_scalar(&mut line, primitive)?;
                self.writer.push_line(depth, "", &line);
                Ok(())
            }
        }
    }

    /// Emit an array, choosing tabular, inline, or list form. `prefix` is
    /// `"- "` when the header itself sits on a list-item line; children
    /// then move one extra level in to clear the marker.
    fn encode_array(
        &mut self,
        array: &[Value],
        depth: usize,
        key: Option<&str>,
        prefix: &str,
    ) -> Result<()> {
        check_depth(depth)?;
        let nested_in_item = prefix == LIST_MARKER && key.is_some();

        if let Some(fields) = tabular_fields(array) {
            let mut line = String::new();
            self.append_header(&mut line, array.len(), key, Some(&fields));
            self.writer.push_line(depth, prefix, &line);

            let row_depth = depth + if nested_in_item { 2 } else { 1 };
            for item in array {
                let row = item
                    .as_object()
                    .ok_or_else(|| Error::invalid_input("tabular row is not an object"))?;
                line.clear();
                for (column, field) in fields.iter().enumerate() {
                    if column > 0 {
                        line.push(self.delimiter);
                    }
                    match row.get(*field) {
                        Some(value) => append_scalar(&mut line, value)?,
                        None => line.push_str("null"),
                    }
                }
                self.writer.push_line(row_depth, "", &line);
            }
            return Ok(());
        }

        if array.iter().all(Value::is_primitive) {
            let mut line = String::new();
            self.append_header(&mut line, array.len(), key, None);
            if !array.is_empty() {
                line.push(' ');
                for (i, value) in array.iter().enumerate() {
                    if i > 0 {
                        line.push(self.delimiter);
                    }
                    append_scalar(&mut line, value)?;
                }
            }
            self.writer.push_line(depth, prefix, &line);
            return Ok(());
        }

        let mut line = String::new();
        self.append_header(&mut line, array.len(), key, None);
        self.writer.push_line(depth, prefix, &line);
        let item_depth = depth + if nested_in_item { 2 } else { 1 };
        for item in array {
            self.encode_list_item(item, item_depth)?;
        }
        Ok(())
    }

    fn encode_list_item(&mut self, value: &Value, depth: usize) -> Result<()> {
        check_depth(depth)?;
        match value {
            Value::Array(array) => self.encode_array(array, depth, None, LIST_MARKER),
            Value::Object(map) => self.encode_object_item(map, depth),
            primitive => {
                let mut line = String::new();
                append_scalar(&mut line, primitive)?;
                self.writer.push_line(depth, LIST_MARKER, &line);
                Ok(())
            }
        }
    }

    /// An object list element: first field rides the `- ` line, remaining
    /// fields follow one level deeper (visually aligned with the first).
    fn encode_object_item(&mut self, map: &Map, depth: usize) -> Result<()> {
        let mut entries = map.iter();
        let Some((first_key, first_value)) = entries.next() else {
            self.writer.push_line(depth, "-", "");
            return Ok(());
        };

        match first_value {
            Value::Array(array) => {
                self.encode_array(array, depth, Some(first_key), LIST_MARKER)?;
            }
            Value::Object(nested) => {
                let mut line = String::new();
                append_key(&mut line, first_key);
                line.push(':');
                self.writer.push_line(depth, LIST_MARKER, &line);
                self.encode_object(nested, depth + 2)?;
            }
            primitive => {
                let mut line = String::new();
                append_key(&mut line, first_key);
                line.push_str(": ");
                append_scalar(&mut line, primitive)?;
                self.writer.push_line(depth, LIST_MARKER, &line);
            }
        }

        for (key, value) in entries {
            self.encode_entry(key, value, depth + 1)?;
        }
        Ok(())
    }

    fn append_header(
        &self,
        line: &mut String,
        len: usize,
        key: Option<&str>,
        fields: Option<&[&str]>,
    ) {
        if let Some(key) = key {
            append_key(line, key);
        }
        line.push('[');
        if self.length_marker {
            line.push('#');
        }
        append_int(line, len as i64);
        if self.delimiter != ',' {
            line.push(self.delimiter);
        }
        line.push(']');
        if let Some(fields) = fields {
            line.push('{');
            // field names are comma-separated under every delimiter
            for (i, field) in fields.iter().enumerate() {
                if i > 0 {
                    line.push(',');
                }
                append_key(line, field);
            }
            line.push('}');
        }
        line.push(':');
    }
}

/// The tabular uniformity test: every element an object with the first
/// element's key count, containing each of its keys with a primitive value.
fn tabular_fields(array: &[Value]) -> Option<Vec<&str>> {
    let first = array.first()?.as_object()?;
    if first.is_empty() {
        return None;
    }
    let fields: Vec<&str> = first.keys().map(String::as_str).collect();
    for item in array {
        let row = item.as_object()?;
        if row.len() != fields.len() {
            return None;
        }
        for field in &fields {
            if !row.get(*field)?.is_primitive() {
                return None;
            }
        }
    }
    Some(fields)
}

fn append_scalar(line: &mut String, value: &Value) -> Result<()> {
    match value {
        Value::Null => line.push_str("null"),
        Value::Bool(true) => line.push_str("true"),
        Value::Bool(false) => line.push_str("false"),
        Value::Int(i) => append_int(line, *i),
        Value::Float(f) => append_float(line, *f),
        Value::Str(s) => append_string(line, s),
        Value::Array(_) | Value::Object(_) => {
            return Err(Error::invalid_input(
                "non-primitive value in primitive position",
            ))
        }
    }
    Ok(())
}

fn check_depth(depth: usize) -> Result<()> {
    if depth > MAX_DEPTH {
        return Err(Error::depth_exceeded(MAX_DEPTH));
    }
    Ok(())
}
