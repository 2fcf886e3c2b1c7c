use std::error::Error;
use std::fmt;

/// A type alias for results with possible `SyntaxError`s.
pub type Result<T> = ::std::result::Result<T, SyntaxError>;

/// The location and description of syntax errors.
#[derive(Debug)]
pub struct SyntaxError {
    line: usize,
    col: usize,
    kind: Kind,
}

#[derive(Debug)]
enum Kind {
    Unbalanced,
    UnterminatedString,
    BadHash(String),
    BadNumber(String),
    DanglingQuote,
    Unexpected(char),
    Wrapper(Box<dyn Error + Send + Sync>),
}

impl SyntaxError {
    fn new(line: usize, col: usize, kind: Kind) -> SyntaxError {
        SyntaxError { line, col, kind }
    }

    pub fn wrap<E>(line: usize, col: usize, err: E) -> SyntaxError
    where
        E: Into<Box<dyn Error + Send + Sync>>,
    {
        SyntaxError::new(line, col, Kind::Wrapper(err.into()))
    }

    pub fn unbalanced(line: usize, col: usize) -> SyntaxError {
        SyntaxError::new(line, col, Kind::Unbalanced)
    }

    pub fn unterminated_string(line: usize, col: usize) -> SyntaxError {
        SyntaxError::new(line, col, Kind::UnterminatedString)
    }

    pub fn bad_hash<S: Into<String>>(line: usize, col: usize, text: S) -> SyntaxError {
        SyntaxError::new(line, col, Kind::BadHash(text.into()))
    }

    pub fn bad_number<S: Into<String>>(line: usize, col: usize, text: S) -> SyntaxError {
        SyntaxError::new(line, col, Kind::BadNumber(text.into()))
    }

    pub fn dangling_quote(line: usize, col: usize) -> SyntaxError {
        SyntaxError::new(line, col, Kind::DanglingQuote)
    }

    pub fn unexpected(line: usize, col: usize, ch: char) -> SyntaxError {
        SyntaxError::new(line, col, Kind::Unexpected(ch))
    }

    /// Returns the line at which the error occurs.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Returns the column at which the error occurs.
    pub fn col(&self) -> usize {
        self.col
    }
}

impl Error for SyntaxError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        if let Kind::Wrapper(ref e) = self.kind {
            Some(e.as_ref())
        } else {
            None
        }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}: ", self.line, self.col)?;
        match &self.kind {
            Kind::Unbalanced => write!(f, "unbalanced parentheses"),
            Kind::UnterminatedString => write!(f, "unterminated string literal"),
            Kind::BadHash(text) => write!(f, "unrecognized literal: '{}'", text),
            Kind::BadNumber(text) => write!(f, "malformed number: '{}'", text),
            Kind::DanglingQuote => write!(f, "expected expression after quote"),
            Kind::Unexpected(ch) => write!(f, "unexpected character: '{}'", ch),
            Kind::Wrapper(e) => write!(f, "{}", e),
        }
    }
}

impl PartialEq for SyntaxError {
    fn eq(&self, other: &SyntaxError) -> bool {
        self.line == other.line && self.col == other.col
    }
}
