mod parser;
mod scan;
mod validation;

use smol_str::SmolStr;

use crate::error::{ArrayKind, Error};
use crate::options::DecodeOptions;
use crate::value::{Map, Value};
use crate::Result;

use parser::{
    parse_array_header, parse_key_token, parse_value_token, split_delimited, split_key_value,
    ArrayHeader,
};
use scan::{scan_lines, BlankLineInfo, ParsedLine};
use validation::{validate_array_length, validate_depth};

pub(crate) fn decode_str(input: &str, options: &DecodeOptions) -> Result<Value> {
    let mut decoder = Decoder::new(options);
    decoder.decode_document(input)
}

struct Decoder {
    indent_size: usize,
    strict: bool,
    active_delimiter: char,
    delimiter_stack: Vec<char>,
    blanks: Vec<BlankLineInfo>,
}

struct ParsedArray {
    value: Value,
    next_idx: usize,
}

impl Decoder {
    fn new(options: &DecodeOptions) -> Self {
        Self {
            indent_size: options.indent.get_spaces(),
            strict: options.strict,
            active_delimiter: ',',
            delimiter_stack: Vec::new(),
            blanks: Vec::new(),
        }
    }

    fn push_delimiter(&mut self, delimiter: char) {
        self.delimiter_stack.push(self.active_delimiter);
        self.active_delimiter = delimiter;
    }

    fn pop_delimiter(&mut self) {
        if let Some(previous) = self.delimiter_stack.pop() {
            self.active_delimiter = previous;
        }
    }

    fn decode_document(&mut self, input: &str) -> Result<Value> {
        let scanned = scan_lines(input, self.indent_size, self.strict)?;
        self.blanks = scanned.blanks;
        let lines = scanned.lines;

        if lines.is_empty() {
            return Err(Error::invalid_input("empty or whitespace-only document"));
        }

        let first = &lines[0];
        if let Some(header) = parse_array_header(first.content.trim(), first.number)? {
            if header.key.is_none() {
                if first.depth != 0 {
                    return Err(Error::syntax_at(
                        first.number,
                        "unexpected indentation at document root",
                    ));
                }
                let parsed = self.parse_array_from_header(&header, &lines, 1, 0, first.number)?;
                self.ensure_no_trailing_content(&lines, parsed.next_idx)?;
                return Ok(parsed.value);
            }
        }

        if lines.len() == 1 && split_key_value(lines[0].content.trim(), lines[0].number)?.is_none()
        {
            let line = &lines[0];
            if line.depth != 0 && self.strict {
                return Err(Error::syntax_at(
                    line.number,
                    "unexpected indentation at document root",
                ));
            }
            return parse_value_token(line.content.trim(), line.number);
        }

        let (map, next_idx) = self.parse_object_block(&lines, 0, 0)?;
        self.ensure_no_trailing_content(&lines, next_idx)?;
        Ok(Value::Object(map))
    }

    fn ensure_no_trailing_content(&self, lines: &[ParsedLine], start_idx: usize) -> Result<()> {
        if let Some(line) = lines.get(start_idx) {
            return Err(Error::syntax_at(line.number, "unexpected trailing content"));
        }
        Ok(())
    }

    /// Read key/value fields while lines sit at `base_depth`. Returns the
    /// map and the index of the first line it did not consume.
    fn parse_object_block(
        &mut self,
        lines: &[ParsedLine],
        mut idx: usize,
        base_depth: usize,
    ) -> Result<(Map, usize)> {
        validate_depth(base_depth)?;
        let mut map = Map::new();

        while idx < lines.len() {
            let line = &lines[idx];
            if line.depth < base_depth {
                break;
            }
            if line.depth > base_depth {
                return Err(Error::syntax_at(line.number, "unexpected indentation"));
            }
            let content = line.content.trim();

            if let Some(header) = parse_array_header(content, line.number)? {
                let key = header.key.clone().ok_or_else(|| {
                    Error::syntax_at(line.number, "array header without key in object context")
                })?;
                let parsed =
                    self.parse_array_from_header(&header, lines, idx + 1, base_depth, line.number)?;
                map.insert(key.to_string(), parsed.value);
                idx = parsed.next_idx;
                continue;
            }

            if let Some((key_part, rest)) = split_key_value(content, line.number)? {
                let key = parse_key_token(key_part, line.number)?;
                if rest.trim().is_empty() {
                    let (nested, next_idx) =
                        self.parse_object_block(lines, idx + 1, base_depth + 1)?;
                    map.insert(key.to_string(), Value::Object(nested));
                    idx = next_idx;
                } else {
                    let value = parse_value_token(rest, line.number)?;
                    map.insert(key.to_string(), value);
                    idx += 1;
                }
                continue;
            }

            if self.strict {
                return Err(Error::syntax_at(line.number, "missing colon after key"));
            }
            let key = parse_key_token(content, line.number)?;
            map.insert(key.to_string(), Value::Null);
            idx += 1;
        }

        Ok((map, idx))
    }

    /// Materialize an array from its parsed header. `idx` points at the
    /// line after the header; `base_depth` is the depth the header line
    /// occupies (child rows and items sit deeper).
    fn parse_array_from_header(
        &mut self,
        header: &ArrayHeader,
        lines: &[ParsedLine],
        idx: usize,
        base_depth: usize,
        header_line_no: usize,
    ) -> Result<ParsedArray> {
        validate_depth(base_depth)?;
        let delimiter = header.delimiter.unwrap_or(self.active_delimiter);
        self.push_delimiter(delimiter);
        let result = (|| -> Result<ParsedArray> {
            if let Some(inline) = header.inline.as_deref() {
                let items = self.parse_inline_values(inline, delimiter, header_line_no)?;
                if items.len() > header.length {
                    return Err(Error::count_mismatch(
                        header.length,
                        items.len(),
                        ArrayKind::Inline,
                    ));
                }
                if self.strict {
                    validate_array_length(header.length, items.len(), ArrayKind::Inline)?;
                }
                return Ok(ParsedArray {
                    value: Value::Array(items),
                    next_idx: idx,
                });
            }

            if let Some(fields) = header.fields.as_ref() {
                let (rows, next_idx) = self.parse_tabular_block(
                    lines,
                    idx,
                    base_depth,
                    fields,
                    delimiter,
                    header.length,
                    header_line_no,
                )?;
                if self.strict {
                    validate_array_length(header.length, rows.len(), ArrayKind::Tabular)?;
                }
                return Ok(ParsedArray {
                    value: Value::Array(rows),
                    next_idx,
                });
            }

            if header.length == 0 {
                return Ok(ParsedArray {
                    value: Value::Array(Vec::new()),
                    next_idx: idx,
                });
            }

            let (items, next_idx) =
                self.parse_list_block(lines, idx, base_depth + 1, header.length)?;
            if self.strict {
                validate_array_length(header.length, items.len(), ArrayKind::List)?;
            }
            Ok(ParsedArray {
                value: Value::Array(items),
                next_idx,
            })
        })();
        self.pop_delimiter();
        result
    }

    fn parse_inline_values(
        &self,
        inline: &str,
        delimiter: char,
        line_no: usize,
    ) -> Result<Vec<Value>> {
        let tokens = split_delimited(inline, delimiter, line_no)?;
        let mut values = Vec::with_capacity(tokens.len());
        for token in tokens {
            if token.is_empty() {
                values.push(Value::Str(String::new()));
            } else {
                values.push(parse_value_token(token, line_no)?);
            }
        }
        Ok(values)
    }

    /// Rows of a tabular array. The row depth is taken from the first
    /// candidate line, which also covers tabular blocks opened on a `- `
    /// list-item line (rows two levels below the list depth).
    #[allow(clippy::too_many_arguments)]
    fn parse_tabular_block(
        &mut self,
        lines: &[ParsedLine],
        mut idx: usize,
        base_depth: usize,
        fields: &[SmolStr],
        delimiter: char,
        expected_len: usize,
        header_line_no: usize,
    ) -> Result<(Vec<Value>, usize)> {
        let mut rows = Vec::with_capacity(expected_len);
        let mut row_depth = None;
        let mut last_row_line = header_line_no;

        while idx < lines.len() {
            if !self.strict && rows.len() == expected_len {
                break;
            }
            let line = &lines[idx];
            match row_depth {
                Some(depth) => {
                    if line.depth < depth {
                        break;
                    }
                    if line.depth > depth {
                        return Err(Error::syntax_at(line.number, "unexpected indentation"));
                    }
                }
                None => {
                    if line.depth <= base_depth {
                        break;
                    }
                    row_depth = Some(line.depth);
                }
            }

            let tokens = split_delimited(line.content.trim(), delimiter, line.number)?;
            let mut row = Map::with_capacity(fields.len());
            for (column, field) in fields.iter().enumerate() {
                // extra cells are ignored, missing cells become null
                let value = match tokens.get(column) {
                    Some(token) if token.is_empty() => Value::Str(String::new()),
                    Some(token) => parse_value_token(token, line.number)?,
                    None => Value::Null,
                };
                row.insert(field.to_string(), value);
            }
            rows.push(Value::Object(row));
            last_row_line = line.number;
            idx += 1;
        }

        if self.strict {
            self.ensure_no_blank_between(header_line_no, last_row_line)?;
        }

        Ok((rows, idx))
    }

    fn ensure_no_blank_between(&self, start_line: usize, end_line: usize) -> Result<()> {
        for blank in &self.blanks {
            if blank.number > start_line && blank.number < end_line {
                return Err(Error::blank_line(blank.number));
            }
        }
        Ok(())
    }

    /// Elements of a bulleted list array, one `- ` item per line at
    /// `item_depth`. The marker is optional on decode.
    fn parse_list_block(
        &mut self,
        lines: &[ParsedLine],
        mut idx: usize,
        item_depth: usize,
        expected_len: usize,
    ) -> Result<(Vec<Value>, usize)> {
        validate_depth(item_depth)?;
        let mut items = Vec::with_capacity(expected_len);

        while idx < lines.len() {
            if !self.strict && items.len() == expected_len {
                break;
            }
            let line = &lines[idx];
            if line.depth < item_depth {
                break;
            }
            if line.depth > item_depth {
                return Err(Error::syntax_at(line.number, "unexpected indentation"));
            }
            let content = line.content.trim();
            let item_content = if content == "-" {
                ""
            } else {
                content.strip_prefix("- ").unwrap_or(content)
            };
            let (item, next_idx) =
                self.parse_list_item(item_content, lines, idx + 1, item_depth, line.number)?;
            items.push(item);
            idx = next_idx;
        }

        Ok((items, idx))
    }

    fn parse_list_item(
        &mut self,
        item_content: &str,
        lines: &[ParsedLine],
        idx: usize,
        item_depth: usize,
        line_no: usize,
    ) -> Result<(Value, usize)> {
        if item_content.is_empty() {
            return Ok((Value::Object(Map::new()), idx));
        }

        if let Some(header) = parse_array_header(item_content, line_no)? {
            let key = match header.key.as_ref() {
                None => {
                    let parsed =
                        self.parse_array_from_header(&header, lines, idx, item_depth, line_no)?;
                    return Ok((parsed.value, parsed.next_idx));
                }
                Some(key) => key.clone(),
            };
            // keyed header on the item line: the item is an object whose
            // first field is this array; its rows/items sit one deeper
            // than the remaining fields
            let parsed =
                self.parse_array_from_header(&header, lines, idx, item_depth + 1, line_no)?;
            let mut map = Map::new();
            map.insert(key.to_string(), parsed.value);
            let (extra, next_idx) =
                self.parse_object_block(lines, parsed.next_idx, item_depth + 1)?;
            for (extra_key, extra_value) in extra {
                map.insert(extra_key, extra_value);
            }
            return Ok((Value::Object(map), next_idx));
        }

        if split_key_value(item_content, line_no)?.is_some() {
            return self.parse_object_item(item_content, lines, idx, item_depth, line_no);
        }

        let value = parse_value_token(item_content, line_no)?;
        Ok((value, idx))
    }

    /// An object opened on the list-item line itself: the text after `- `
    /// is its first field, remaining fields follow one level deeper than
    /// the item. Re-parses through the object block with a synthesized
    /// first line.
    fn parse_object_item(
        &mut self,
        first_content: &str,
        lines: &[ParsedLine],
        idx: usize,
        item_depth: usize,
        line_no: usize,
    ) -> Result<(Value, usize)> {
        let field_depth = item_depth + 1;
        let mut combined = Vec::with_capacity(1 + lines.len().saturating_sub(idx));
        combined.push(ParsedLine {
            content: first_content.to_string(),
            indent: field_depth * self.indent_size,
            depth: field_depth,
            number: line_no,
        });
        combined.extend_from_slice(&lines[idx..]);
        let (map, consumed) = self.parse_object_block(&combined, 0, field_depth)?;
        let next_idx = idx + consumed.saturating_sub(1);
        Ok((Value::Object(map), next_idx))
    }
}
