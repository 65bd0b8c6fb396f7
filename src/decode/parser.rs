use memchr::memchr_iter;
use smallvec::SmallVec;
use smol_str::SmolStr;

use crate::decode::validation;
use crate::error::Error;
use crate::num::parse_number_token;
use crate::text::unescape;
use crate::value::Value;
use crate::Result;

/// Token buffer for one split row or inline payload.
pub(crate) type TokenBuf<'a> = SmallVec<[&'a str; 16]>;

/// A parsed array-header line: `key?[#?N delim?]{fields}?: inline?`.
///
/// `delimiter` is `None` when the brackets carry no suffix; the driver
/// then falls back to the context default (comma at the root, the parent
/// array's delimiter inside nested list items).
#[derive(Debug, Clone)]
pub(crate) struct ArrayHeader {
    pub key: Option<SmolStr>,
    pub length: usize,
    pub delimiter: Option<char>,
    /// The `#` is purely visual; nothing downstream depends on it.
    #[allow(dead_code)]
    pub has_length_marker: bool,
    pub fields: Option<Vec<SmolStr>>,
    pub inline: Option<String>,
}

/// Split a line at its first unquoted colon. `Ok(None)` means the line has
/// no colon outside quotes.
pub(crate) fn split_key_value(line: &str, line_no: usize) -> Result<Option<(&str, &str)>> {
    let bytes = line.as_bytes();
    let mut in_quotes = false;
    let mut idx = 0;
    while idx < bytes.len() {
        match bytes[idx] {
            b'\\' if in_quotes => idx += 1,
            b'"' => in_quotes = !in_quotes,
            b':' if !in_quotes => return Ok(Some((&line[..idx], &line[idx + 1..]))),
            _ => {}
        }
        idx += 1;
    }
    if in_quotes {
        return Err(Error::syntax_at(line_no, "unterminated quoted string"));
    }
    Ok(None)
}

/// Recognize an array header. A line qualifies only when an unquoted `[`
/// appears before any unquoted `:`; a malformed bracket interior makes the
/// line "not a header" rather than an error, so the caller can fall back
/// to the key/value production.
pub(crate) fn parse_array_header(line: &str, line_no: usize) -> Result<Option<ArrayHeader>> {
    let bytes = line.as_bytes();
    let mut in_quotes = false;
    let mut bracket_start = None;
    let mut idx = 0;
    while idx < bytes.len() {
        match bytes[idx] {
            b'\\' if in_quotes => idx += 1,
            b'"' => in_quotes = !in_quotes,
            b':' if !in_quotes => return Ok(None),
            b'[' if !in_quotes => {
                bracket_start = Some(idx);
                break;
            }
            _ => {}
        }
        idx += 1;
    }
    if in_quotes {
        return Err(Error::syntax_at(line_no, "unterminated quoted string"));
    }
    let bracket_start = match bracket_start {
        Some(idx) => idx,
        None => return Ok(None),
    };
    let bracket_end = match line[bracket_start + 1..].find(']') {
        Some(offset) => bracket_start + 1 + offset,
        None => return Err(Error::syntax_at(line_no, "unterminated array header")),
    };

    let interior = &line[bracket_start + 1..bracket_end];
    let (length, delimiter, has_length_marker) = match parse_bracket_interior(interior) {
        Some(parsed) => parsed,
        None => return Ok(None),
    };

    let key_part = line[..bracket_start].trim();
    let key = if key_part.is_empty() {
        None
    } else {
        Some(parse_key_token(key_part, line_no)?)
    };

    let mut rest = line[bracket_end + 1..].trim_start();
    let mut fields = None;
    if let Some(after_brace) = rest.strip_prefix('{') {
        let close = find_unquoted(after_brace, b'}', line_no)?
            .ok_or_else(|| Error::syntax_at(line_no, "unterminated field list"))?;
        let mut parsed = Vec::new();
        // field names split on comma no matter which data delimiter is active
        for token in split_delimited(&after_brace[..close], ',', line_no)? {
            if token.is_empty() {
                return Err(Error::syntax_at(line_no, "empty field name"));
            }
            parsed.push(parse_key_token(token, line_no)?);
        }
        validation::validate_field_list(&parsed, line_no)?;
        fields = Some(parsed);
        rest = after_brace[close + 1..].trim_start();
    }

    let colon = rest
        .find(':')
        .ok_or_else(|| Error::syntax_at(line_no, "array header missing ':'"))?;
    if !rest[..colon].trim().is_empty() {
        return Err(Error::syntax_at(line_no, "unexpected text after array header"));
    }
    let inline = rest[colon + 1..].trim();
    let inline = if inline.is_empty() {
        None
    } else {
        Some(inline.to_string())
    };

    Ok(Some(ArrayHeader {
        key,
        length,
        delimiter,
        has_length_marker,
        fields,
        inline,
    }))
}

/// `"#"? digits ("," | "|" | HT)?` — anything else is not a header.
fn parse_bracket_interior(interior: &str) -> Option<(usize, Option<char>, bool)> {
    let (body, has_marker) = match interior.strip_prefix('#') {
        Some(stripped) => (stripped, true),
        None => (interior, false),
    };
    if body.is_empty() {
        return None;
    }
    let digits_end = body
        .as_bytes()
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count();
    if digits_end == 0 {
        return None;
    }
    let length: usize = body[..digits_end].parse().ok()?;
    let suffix = &body[digits_end..];
    let delimiter = match suffix {
        "" => None,
        "," => Some(','),
        "|" => Some('|'),
        "\t" => Some('\t'),
        _ => return None,
    };
    Some((length, delimiter, has_marker))
}

fn find_unquoted(input: &str, target: u8, line_no: usize) -> Result<Option<usize>> {
    let bytes = input.as_bytes();
    let mut in_quotes = false;
    let mut idx = 0;
    while idx < bytes.len() {
        match bytes[idx] {
            b'\\' if in_quotes => idx += 1,
            b'"' => in_quotes = !in_quotes,
            b if b == target && !in_quotes => return Ok(Some(idx)),
            _ => {}
        }
        idx += 1;
    }
    if in_quotes {
        return Err(Error::syntax_at(line_no, "unterminated quoted string"));
    }
    Ok(None)
}

/// Split by the active delimiter, respecting quotes and backslash escapes
/// inside quotes. Tokens come back trimmed.
pub(crate) fn split_delimited<'a>(
    input: &'a str,
    delimiter: char,
    line_no: usize,
) -> Result<TokenBuf<'a>> {
    let mut tokens = TokenBuf::new();
    let bytes = input.as_bytes();
    let delim_byte = delimiter as u8;

    // no quote material: plain byte scan
    if !bytes.contains(&b'"') && !bytes.contains(&b'\\') {
        let mut start = 0;
        for idx in memchr_iter(delim_byte, bytes) {
            tokens.push(input[start..idx].trim());
            start = idx + 1;
        }
        if start < bytes.len() || input.ends_with(delimiter) {
            tokens.push(input[start..].trim());
        }
        return Ok(tokens);
    }

    let mut in_quotes = false;
    let mut start = 0;
    let mut idx = 0;
    while idx < bytes.len() {
        match bytes[idx] {
            b'\\' if in_quotes => idx += 1,
            b'"' => in_quotes = !in_quotes,
            b if b == delim_byte && !in_quotes => {
                tokens.push(input[start..idx].trim());
                start = idx + 1;
            }
            _ => {}
        }
        idx += 1;
    }
    if in_quotes {
        return Err(Error::syntax_at(line_no, "unterminated quoted string"));
    }
    if start < bytes.len() || input.ends_with(delimiter) {
        tokens.push(input[start..].trim());
    }
    Ok(tokens)
}

/// Read a quoted token: the whole (trimmed) token must be one quoted
/// string, with nothing after the closing quote.
pub(crate) fn parse_quoted(token: &str, line_no: usize) -> Result<String> {
    let bytes = token.as_bytes();
    debug_assert!(bytes.first() == Some(&b'"'));
    let mut idx = 1;
    while idx < bytes.len() {
        match bytes[idx] {
            b'\\' => idx += 1,
            b'"' => {
                if !token[idx + 1..].trim().is_empty() {
                    return Err(Error::syntax_at(
                        line_no,
                        "unexpected characters after closing quote",
                    ));
                }
                return Ok(unescape(&token[1..idx]));
            }
            _ => {}
        }
        idx += 1;
    }
    Err(Error::syntax_at(line_no, "unterminated quoted string"))
}

/// A key token: quoted content or the bare text, trimmed.
pub(crate) fn parse_key_token(token: &str, line_no: usize) -> Result<SmolStr> {
    let token = token.trim();
    if token.starts_with('"') {
        Ok(SmolStr::from(parse_quoted(token, line_no)?))
    } else {
        Ok(SmolStr::new(token))
    }
}

/// A primitive token: quoted string, reserved literal, number, or bareword.
pub(crate) fn parse_value_token(token: &str, line_no: usize) -> Result<Value> {
    let token = token.trim();
    if token.is_empty() {
        return Err(Error::syntax_at(line_no, "empty value"));
    }
    if token.starts_with('"') {
        return Ok(Value::Str(parse_quoted(token, line_no)?));
    }
    match token {
        "null" => return Ok(Value::Null),
        "true" => return Ok(Value::Bool(true)),
        "false" => return Ok(Value::Bool(false)),
        _ => {}
    }
    if let Some(number) = parse_number_token(token) {
        return Ok(number);
    }
    Ok(Value::Str(token.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(line: &str) -> Option<ArrayHeader> {
        parse_array_header(line, 1).unwrap()
    }

    #[rstest::rstest]
    fn test_split_key_value() {
        assert_eq!(split_key_value("a: 1", 1).unwrap(), Some(("a", " 1")));
        assert_eq!(split_key_value("a:", 1).unwrap(), Some(("a", "")));
        assert_eq!(split_key_value("no colon", 1).unwrap(), None);
        assert_eq!(
            split_key_value("\"a:b\": c", 1).unwrap(),
            Some(("\"a:b\"", " c"))
        );
        assert!(split_key_value("\"open: 1", 1).is_err());
    }

    #[rstest::rstest]
    fn test_plain_header() {
        let h = header("items[3]: 1,2,3").unwrap();
        assert_eq!(h.key.as_deref(), Some("items"));
        assert_eq!(h.length, 3);
        assert_eq!(h.delimiter, None);
        assert!(!h.has_length_marker);
        assert!(h.fields.is_none());
        assert_eq!(h.inline.as_deref(), Some("1,2,3"));
    }

    #[rstest::rstest]
    fn test_root_header_without_key() {
        let h = header("[2]:").unwrap();
        assert!(h.key.is_none());
        assert_eq!(h.length, 2);
        assert!(h.inline.is_none());
    }

    #[rstest::rstest]
    fn test_delimiter_suffix_and_marker() {
        let h = header("items[3|]: a|b|c").unwrap();
        assert_eq!(h.delimiter, Some('|'));

        let h = header("items[3\t]: a\tb").unwrap();
        assert_eq!(h.delimiter, Some('\t'));

        let h = header("nums[#3]: 1,2,3").unwrap();
        assert!(h.has_length_marker);
        assert_eq!(h.length, 3);

        let h = header("nums[#3|]: 1|2|3").unwrap();
        assert!(h.has_length_marker);
        assert_eq!(h.delimiter, Some('|'));
    }

    #[rstest::rstest]
    fn test_field_list_splits_on_comma_always() {
        let h = header("users[2|]{id,name}:").unwrap();
        let fields = h.fields.unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0], "id");
        assert_eq!(fields[1], "name");
    }

    #[rstest::rstest]
    fn test_quoted_field_names() {
        let h = header("rows[1]{\"a,b\",c}:").unwrap();
        let fields = h.fields.unwrap();
        assert_eq!(fields[0], "a,b");
        assert_eq!(fields[1], "c");
    }

    #[rstest::rstest]
    fn test_quoted_key_header() {
        let h = header("\"my key\"[2]: a,b").unwrap();
        assert_eq!(h.key.as_deref(), Some("my key"));
    }

    #[rstest::rstest]
    fn test_not_a_header() {
        // colon before bracket: key/value production wins
        assert!(header("url: a[1]c").is_none());
        // no digits
        assert!(header("a[]: x").is_none());
        // junk after the suffix
        assert!(header("a[3x]: x").is_none());
        assert!(header("a[3||]: x").is_none());
        // bracket inside quotes
        assert!(header("\"a[3]\": x").is_none());
        assert!(header("plain: value").is_none());
    }

    #[rstest::rstest]
    fn test_malformed_headers_error() {
        assert!(parse_array_header("a[3: x", 1).is_err());
        assert!(parse_array_header("a[2]{id: x", 1).is_err());
        assert!(parse_array_header("a[2]", 1).is_err());
        assert!(parse_array_header("a[2] junk: x", 1).is_err());
        assert!(parse_array_header("a[2]{id,id}:", 1).is_err());
        assert!(parse_array_header("a[2]{}:", 1).is_err());
    }

    #[rstest::rstest]
    fn test_split_delimited() {
        let tokens = split_delimited("1, 2, 3", ',', 1).unwrap();
        assert_eq!(tokens.as_slice(), ["1", "2", "3"]);

        let tokens = split_delimited("a|b|c", '|', 1).unwrap();
        assert_eq!(tokens.as_slice(), ["a", "b", "c"]);

        let tokens = split_delimited("\"a,b\", c", ',', 1).unwrap();
        assert_eq!(tokens.as_slice(), ["\"a,b\"", "c"]);

        let tokens = split_delimited("\"he said \\\"hi, there\\\"\", x", ',', 1).unwrap();
        assert_eq!(tokens.as_slice(), ["\"he said \\\"hi, there\\\"\"", "x"]);

        let tokens = split_delimited("a,,b", ',', 1).unwrap();
        assert_eq!(tokens.as_slice(), ["a", "", "b"]);

        let tokens = split_delimited("a,", ',', 1).unwrap();
        assert_eq!(tokens.as_slice(), ["a", ""]);

        assert!(split_delimited("\"open", ',', 1).is_err());
    }

    #[rstest::rstest]
    fn test_parse_value_token() {
        assert_eq!(parse_value_token("null", 1).unwrap(), Value::Null);
        assert_eq!(parse_value_token("true", 1).unwrap(), Value::Bool(true));
        assert_eq!(parse_value_token("42", 1).unwrap(), Value::Int(42));
        assert_eq!(parse_value_token("4.5", 1).unwrap(), Value::Float(4.5));
        assert_eq!(
            parse_value_token("hello world", 1).unwrap(),
            Value::Str("hello world".to_string())
        );
        assert_eq!(
            parse_value_token("\"null\"", 1).unwrap(),
            Value::Str("null".to_string())
        );
        assert_eq!(
            parse_value_token("\"a\\nb\"", 1).unwrap(),
            Value::Str("a\nb".to_string())
        );
        assert!(parse_value_token("", 1).is_err());
        assert!(parse_value_token("\"open", 1).is_err());
        assert!(parse_value_token("\"done\" extra", 1).is_err());
    }

    #[rstest::rstest]
    fn test_unknown_escape_survives() {
        assert_eq!(
            parse_value_token("\"a\\qb\"", 1).unwrap(),
            Value::Str("a\\qb".to_string())
        );
    }
}
