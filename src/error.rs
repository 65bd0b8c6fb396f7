use std::fmt;

/// Which array encoding a strict-mode count mismatch was detected in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayKind {
    Inline,
    List,
    Tabular,
}

impl fmt::Display for ArrayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArrayKind::Inline => write!(f, "inline"),
            ArrayKind::List => write!(f, "list"),
            ArrayKind::Tabular => write!(f, "tabular"),
        }
    }
}

/// Every way an encode or decode call can fail.
///
/// Errors are plain values; nothing in the crate uses panics for control
/// flow. Line numbers, where present, are 1-based.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    InvalidInput {
        message: String,
    },
    Syntax {
        message: String,
        line: Option<usize>,
    },
    Indentation {
        message: String,
        line: usize,
    },
    CountMismatch {
        expected: usize,
        actual: usize,
        kind: ArrayKind,
    },
    UnexpectedBlankLine {
        line: usize,
    },
    DepthExceeded {
        limit: usize,
    },
}

impl Error {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Error::InvalidInput {
            message: message.into(),
        }
    }

    pub fn syntax(message: impl Into<String>) -> Self {
        Error::Syntax {
            message: message.into(),
            line: None,
        }
    }

    pub fn syntax_at(line: usize, message: impl Into<String>) -> Self {
        Error::Syntax {
            message: message.into(),
            line: Some(line),
        }
    }

    pub fn indentation(line: usize, message: impl Into<String>) -> Self {
        Error::Indentation {
            message: message.into(),
            line,
        }
    }

    pub fn count_mismatch(expected: usize, actual: usize, kind: ArrayKind) -> Self {
        Error::CountMismatch {
            expected,
            actual,
            kind,
        }
    }

    pub fn blank_line(line: usize) -> Self {
        Error::UnexpectedBlankLine { line }
    }

    pub fn depth_exceeded(limit: usize) -> Self {
        Error::DepthExceeded { limit }
    }

    /// The 1-based source line the error refers to, when one is known.
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::Syntax { line, .. } => *line,
            Error::Indentation { line, .. } | Error::UnexpectedBlankLine { line } => Some(*line),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidInput { message } => write!(f, "invalid input: {message}"),
            Error::Syntax {
                message,
                line: Some(line),
            } => write!(f, "syntax error at line {line}: {message}"),
            Error::Syntax {
                message,
                line: None,
            } => write!(f, "syntax error: {message}"),
            Error::Indentation { message, line } => {
                write!(f, "indentation error at line {line}: {message}")
            }
            Error::CountMismatch {
                expected,
                actual,
                kind,
            } => write!(
                f,
                "{kind} array declared {expected} element(s) but {actual} found"
            ),
            Error::UnexpectedBlankLine { line } => {
                write!(f, "blank line at line {line} inside a row block")
            }
            Error::DepthExceeded { limit } => {
                write!(f, "nesting depth exceeds the limit of {limit}")
            }
        }
    }
}

impl std::error::Error for Error {}
