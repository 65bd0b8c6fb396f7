use crate::constants::DEFAULT_INDENT;

/// Separator used inside tabular rows and inline arrays.
///
/// Comma is the document default; a non-default delimiter is declared
/// per-array as a suffix inside the bracketed length, e.g. `[3|]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Delimiter {
    #[default]
    Comma,
    Pipe,
    Tab,
}

impl Delimiter {
    pub fn as_char(self) -> char {
        match self {
            Delimiter::Comma => ',',
            Delimiter::Pipe => '|',
            Delimiter::Tab => '\t',
        }
    }

    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            ',' => Some(Delimiter::Comma),
            '|' => Some(Delimiter::Pipe),
            '\t' => Some(Delimiter::Tab),
            _ => None,
        }
    }
}

/// Indentation width for nested structures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indent {
    Spaces(usize),
}

impl Indent {
    pub fn spaces(count: usize) -> Self {
        Indent::Spaces(count)
    }

    pub fn get_spaces(&self) -> usize {
        match self {
            Indent::Spaces(count) => *count,
        }
    }
}

impl Default for Indent {
    fn default() -> Self {
        Indent::Spaces(DEFAULT_INDENT)
    }
}

/// Optional `#` prefix on the array length inside brackets, e.g. `[#3]`.
/// Purely visual; the decoder accepts it in either setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LengthMarker {
    #[default]
    Off,
    Hash,
}

/// Options for encoding a [`Value`](crate::Value) to TOON text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EncodeOptions {
    pub indent: Indent,
    pub delimiter: Delimiter,
    pub length_marker: LengthMarker,
}

impl EncodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_indent(mut self, indent: Indent) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_delimiter(mut self, delimiter: Delimiter) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_length_marker(mut self, length_marker: LengthMarker) -> Self {
        self.length_marker = length_marker;
        self
    }
}

/// Options for decoding TOON text to a [`Value`](crate::Value).
///
/// Strict mode is the default: declared array lengths must match exactly,
/// indentation must be clean multiples of `indent`, and blank lines may
/// not interrupt tabular row blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeOptions {
    pub indent: Indent,
    pub strict: bool,
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_indent(mut self, indent: Indent) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            indent: Indent::default(),
            strict: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rstest::rstest]
    fn test_defaults() {
        let encode = EncodeOptions::default();
        assert_eq!(encode.indent.get_spaces(), 2);
        assert_eq!(encode.delimiter, Delimiter::Comma);
        assert_eq!(encode.length_marker, LengthMarker::Off);

        let decode = DecodeOptions::default();
        assert_eq!(decode.indent.get_spaces(), 2);
        assert!(decode.strict);
    }

    #[rstest::rstest]
    fn test_builders() {
        let encode = EncodeOptions::new()
            .with_indent(Indent::spaces(4))
            .with_delimiter(Delimiter::Pipe)
            .with_length_marker(LengthMarker::Hash);
        assert_eq!(encode.indent.get_spaces(), 4);
        assert_eq!(encode.delimiter.as_char(), '|');
        assert_eq!(encode.length_marker, LengthMarker::Hash);

        let decode = DecodeOptions::new().with_strict(false);
        assert!(!decode.strict);
    }

    #[rstest::rstest]
    #[case(',', Some(Delimiter::Comma))]
    #[case('|', Some(Delimiter::Pipe))]
    #[case('\t', Some(Delimiter::Tab))]
    #[case(';', None)]
    fn test_delimiter_from_char(#[case] ch: char, #[case] expected: Option<Delimiter>) {
        assert_eq!(Delimiter::from_char(ch), expected);
    }
}
