use memchr::memchr_iter;

use crate::error::Error;
use crate::Result;

/// A non-blank source line with its indentation resolved to a depth.
#[derive(Debug, Clone)]
pub(crate) struct ParsedLine {
    /// Line content with leading indentation removed.
    pub content: String,
    /// Leading indentation in columns.
    pub indent: usize,
    /// `indent / options.indent`.
    pub depth: usize,
    /// 1-based source line number.
    pub number: usize,
}

/// A blank or whitespace-only line, kept out of the structural stream but
/// remembered for strict-mode row-block checks.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BlankLineInfo {
    pub number: usize,
    #[allow(dead_code)]
    pub indent: usize,
    #[allow(dead_code)]
    pub depth: usize,
}

#[derive(Debug)]
pub(crate) struct ScanResult {
    pub lines: Vec<ParsedLine>,
    pub blanks: Vec<BlankLineInfo>,
}

/// Split the input on `\n`, compute depths, and separate blank lines.
/// One trailing `\r` per line is stripped, so CRLF input scans cleanly.
pub(crate) fn scan_lines(input: &str, indent_size: usize, strict: bool) -> Result<ScanResult> {
    if indent_size == 0 {
        return Err(Error::invalid_input("indent size must be greater than zero"));
    }

    let mut result = ScanResult {
        lines: Vec::new(),
        blanks: Vec::new(),
    };
    let bytes = input.as_bytes();
    let mut start = 0;
    let mut number = 1;
    for idx in memchr_iter(b'\n', bytes) {
        scan_one(&input[start..idx], number, indent_size, strict, &mut result)?;
        start = idx + 1;
        number += 1;
    }
    scan_one(&input[start..], number, indent_size, strict, &mut result)?;

    Ok(result)
}

fn scan_one(
    raw: &str,
    number: usize,
    indent_size: usize,
    strict: bool,
    result: &mut ScanResult,
) -> Result<()> {
    let raw = raw.strip_suffix('\r').unwrap_or(raw);

    if raw.bytes().all(|b| b.is_ascii_whitespace()) {
        let indent = raw.len();
        result.blanks.push(BlankLineInfo {
            number,
            indent,
            depth: indent / indent_size,
        });
        return Ok(());
    }

    let mut indent_columns = 0;
    let mut indent_chars = 0;
    for byte in raw.bytes() {
        match byte {
            b' ' => {
                indent_columns += 1;
                indent_chars += 1;
            }
            b'\t' => {
                if strict {
                    return Err(Error::indentation(number, "tab in leading whitespace"));
                }
                indent_columns += indent_size;
                indent_chars += 1;
            }
            _ => break,
        }
    }

    if strict && !indent_columns.is_multiple_of(indent_size) {
        return Err(Error::indentation(
            number,
            format!("indent of {indent_columns} is not a multiple of {indent_size}"),
        ));
    }

    result.lines.push(ParsedLine {
        content: raw[indent_chars..].to_string(),
        indent: indent_columns,
        depth: indent_columns / indent_size,
        number,
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(input: &str) -> ScanResult {
        scan_lines(input, 2, true).unwrap()
    }

    #[rstest::rstest]
    fn test_depths_and_content() {
        let result = scan("a: 1\n  b: 2\n    c: 3");
        assert_eq!(result.lines.len(), 3);
        assert_eq!(result.lines[0].depth, 0);
        assert_eq!(result.lines[1].depth, 1);
        assert_eq!(result.lines[2].depth, 2);
        assert_eq!(result.lines[1].content, "b: 2");
        assert_eq!(result.lines[2].number, 3);
        assert!(result.blanks.is_empty());
    }

    #[rstest::rstest]
    fn test_blank_lines_are_separated() {
        let result = scan("a: 1\n\n   \nb: 2");
        assert_eq!(result.lines.len(), 2);
        assert_eq!(result.blanks.len(), 2);
        assert_eq!(result.blanks[0].number, 2);
        assert_eq!(result.blanks[1].number, 3);
        assert_eq!(result.blanks[1].indent, 3);
        assert_eq!(result.lines[1].number, 4);
    }

    #[rstest::rstest]
    fn test_strict_rejects_tab_indent() {
        let err = scan_lines("a:\n\tb: 1", 2, true).unwrap_err();
        assert_eq!(err, Error::indentation(2, "tab in leading whitespace"));
    }

    #[rstest::rstest]
    fn test_strict_rejects_odd_indent() {
        let err = scan_lines("a:\n   b: 1", 2, true).unwrap_err();
        assert!(matches!(err, Error::Indentation { line: 2, .. }));
    }

    #[rstest::rstest]
    fn test_lenient_floors_depth() {
        let result = scan_lines("a:\n   b: 1", 2, false).unwrap();
        assert_eq!(result.lines[1].depth, 1);

        let result = scan_lines("a:\n\tb: 1", 2, false).unwrap();
        assert_eq!(result.lines[1].depth, 1);
        assert_eq!(result.lines[1].content, "b: 1");
    }

    #[rstest::rstest]
    fn test_crlf_is_tolerated() {
        let result = scan_lines("a: 1\r\n  b: 2\r", 2, true).unwrap();
        assert_eq!(result.lines[0].content, "a: 1");
        assert_eq!(result.lines[1].content, "b: 2");
    }

    #[rstest::rstest]
    fn test_zero_indent_option_rejected() {
        assert!(matches!(
            scan_lines("a: 1", 0, true),
            Err(Error::InvalidInput { .. })
        ));
    }
}
