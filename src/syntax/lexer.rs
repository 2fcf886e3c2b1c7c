//! A lexer for Scheme programs.
//!
//! A [`Lexer`] lifts a buffered reader into an iterator over [`Token`]s.
//! Errors may occur at both the I/O and lexing levels. These are handled
//! in-band, meaning that a special token type, `Token::Err`, is reserved for
//! passing errors to the caller. This greatly simplifies error handling logic
//! when iterating over tokens.
//!
//! [`Lexer`]: ./struct.Lexer.html
//! [`Token`]: ./enum.Token.html

use std::fmt;
use std::io::BufRead;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::syntax::error::SyntaxError;
use crate::syntax::namespace::{Name, NameSpace};

/// A lexer for Scheme programs.
///
/// The lexer interface is an iterator over [`Token`]s.
///
/// [`Token`]: ./enum.Token.html
pub struct Lexer<'ns, B: BufRead> {
    reader: B,
    ns: &'ns NameSpace,
    line: usize,
    col: usize,
    skip_space: bool,

    // Two buffers: The first holds each line.
    // The second holds the normalized form of the line.
    buf_line: String,
    buf_norm: String,
}

/// A lexical item of a Scheme program.
///
/// Every `Token` includes its line and column as the first two members. When
/// relevant, the third member gives an interpreted value of the token.
///
/// Lexical errors are given as a `Token::Err` whose value is the error.
#[derive(Debug)]
#[derive(PartialEq)]
pub enum Token {
    Err(SyntaxError),
    Open(usize, usize),
    Close(usize, usize),
    Quote(usize, usize),
    Int(usize, usize, i64),
    Double(usize, usize, f64),
    Str(usize, usize, String),
    Sym(usize, usize, Name),
    Bool(usize, usize, bool),
    Space(usize, usize),
    Comment(usize, usize),
}

// Public API
// --------------------------------------------------

impl<'ns, B: BufRead> Lexer<'ns, B> {
    /// Constructs a new lexer from a buffered reader.
    ///
    /// By default, the lexer is configured to skip space and comment tokens.
    pub fn new(reader: B, ns: &'ns NameSpace) -> Self {
        Lexer {
            reader,
            ns,
            line: 0, // incremented on first line
            col: 1,
            skip_space: true,
            buf_line: String::with_capacity(128),
            buf_norm: String::with_capacity(128),
        }
    }

    /// Toggles whether space and comment tokens are reported.
    pub fn report_space(mut self, yes: bool) -> Self {
        self.skip_space = !yes;
        self
    }

    /// Returns the line of the next token to be emitted by the lexer.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Returns the column of the next token to be emitted by the lexer.
    pub fn col(&self) -> usize {
        self.col
    }
}

impl<'ns, B: BufRead> Iterator for Lexer<'ns, B> {
    type Item = Token;

    /// Extracts the next token from the underlying reader.
    fn next(&mut self) -> Option<Token> {
        // Refill the buffers.
        if self.buf_norm.len() < self.col {
            self.line += 1;
            self.col = 1;
            self.buf_line.clear();
            match self.reader.read_line(&mut self.buf_line) {
                Ok(0) => return None, // Nothing more to read
                Ok(_) => (),          // The buffer is refilled successfully
                Err(e) => return Some(Token::Err(SyntaxError::wrap(self.line, self.col, e))),
            }

            // Perform Unicode normalization.
            // This has security, usability, and performance implications.
            self.buf_norm.clear();
            self.buf_norm.extend(self.buf_line.nfkc());
            if self.buf_norm.is_empty() {
                return self.next();
            }
        }

        // Lex the next token.
        let (tok, len) = self.lex(&self.buf_norm[self.col - 1..]);
        self.col += len;

        // Skip space and comment tokens.
        match tok {
            Token::Space(..) if self.skip_space => self.next(),
            Token::Comment(..) if self.skip_space => self.next(),
            _ => Some(tok),
        }
    }
}

impl Token {
    /// Returns the line number of the start of the token.
    pub fn line(&self) -> usize {
        match *self {
            Token::Err(ref err) => err.line(),
            Token::Open(line, ..) => line,
            Token::Close(line, ..) => line,
            Token::Quote(line, ..) => line,
            Token::Int(line, ..) => line,
            Token::Double(line, ..) => line,
            Token::Str(line, ..) => line,
            Token::Sym(line, ..) => line,
            Token::Bool(line, ..) => line,
            Token::Space(line, ..) => line,
            Token::Comment(line, ..) => line,
        }
    }

    /// Returns the column number of the start of the token.
    pub fn col(&self) -> usize {
        match *self {
            Token::Err(ref err) => err.col(),
            Token::Open(_, col) => col,
            Token::Close(_, col) => col,
            Token::Quote(_, col) => col,
            Token::Int(_, col, ..) => col,
            Token::Double(_, col, ..) => col,
            Token::Str(_, col, ..) => col,
            Token::Sym(_, col, ..) => col,
            Token::Bool(_, col, ..) => col,
            Token::Space(_, col) => col,
            Token::Comment(_, col) => col,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Token::Err(ref err) => write!(f, "{}", err),
            Token::Open(..) => f.write_str("("),
            Token::Close(..) => f.write_str(")"),
            Token::Quote(..) => f.write_str("'"),
            Token::Int(.., val) => write!(f, "{}", val),
            Token::Double(.., val) => write!(f, "{}", val),
            Token::Str(.., ref val) => write!(f, "\"{}\"", val),
            Token::Sym(.., ref val) => write!(f, "{}", val),
            Token::Bool(.., true) => f.write_str("#t"),
            Token::Bool(.., false) => f.write_str("#f"),
            Token::Space(..) => f.write_str("SPACE"),
            Token::Comment(..) => f.write_str("COMMENT"),
        }
    }
}

// Lexing Logic
// --------------------------------------------------

impl<'ns, B: BufRead> Lexer<'ns, B> {
    /// The main switch of the lexer.
    fn lex(&self, line: &str) -> (Token, usize) {
        match line.chars().nth(0).unwrap() {
            '(' => (Token::Open(self.line(), self.col()), 1),
            ')' => (Token::Close(self.line(), self.col()), 1),
            '\'' => (Token::Quote(self.line(), self.col()), 1),
            ';' => self.lex_comment(line),
            '"' => self.lex_string(line),
            '#' => self.lex_hash(line),
            '+' | '-' => self.lex_sign(line),
            ch if ch.is_digit(10) => self.lex_number(line),
            ch if ch.is_whitespace() => self.lex_space(line),
            ch if ch.is_control() => self.lex_space(line),
            _ => self.lex_symbol(line),
        }
    }

    /// Returns the token for the next symbol.
    ///
    /// Symbols start with a letter or one of `!$%&*/:<=>?^_~+-` and continue
    /// with the same alphabet extended by digits and periods.
    ///
    /// The token MUST be at the start of the line.
    fn lex_symbol(&self, line: &str) -> (Token, usize) {
        lazy_static! {
            static ref RE: Regex = {
                let pattern = r"^[A-Za-z!$%&*/:<=>?^_~+-][0-9A-Za-z!$%&*/:<=>?^_~+.-]*";
                Regex::new(pattern).unwrap()
            };
        }

        match RE.find(line) {
            Some(m) => {
                let s = m.as_str();
                let tok = Token::Sym(self.line(), self.col(), self.ns.name(s));
                (tok, s.len())
            }
            None => {
                let ch = line.chars().nth(0).unwrap();
                let err = SyntaxError::unexpected(self.line(), self.col(), ch);
                (Token::Err(err), ch.len_utf8())
            }
        }
    }

    /// Returns the token for a symbol starting with a sign.
    ///
    /// A sign can start both numeric tokens and the `+`/`-` symbols.
    ///
    /// The token MUST be at the start of the line.
    fn lex_sign(&self, line: &str) -> (Token, usize) {
        match line.chars().nth(1) {
            Some(ch) if ch.is_digit(10) => self.lex_number(line),
            _ => self.lex_symbol(line),
        }
    }

    /// Returns the token for a number.
    ///
    /// Integers are an optional sign followed by decimal digits. Doubles
    /// additionally carry a fractional part and may carry an exponent. A
    /// fractional part or exponent makes the token a Double.
    ///
    /// The token MUST be at the start of the line.
    fn lex_number(&self, line: &str) -> (Token, usize) {
        lazy_static! {
            static ref RE: Regex = {
                let pattern = r"^[+-]?\d+(\.\d+)?([eE][+-]?\d+)?";
                Regex::new(pattern).unwrap()
            };
        }

        let m = RE.find(line).unwrap();
        let s = m.as_str();
        let float = s.chars().any(|ch| ch == '.' || ch == 'e' || ch == 'E');
        let tok = if float {
            match s.parse() {
                Ok(x) => Token::Double(self.line(), self.col(), x),
                Err(_) => Token::Err(SyntaxError::bad_number(self.line(), self.col(), s)),
            }
        } else {
            match s.parse() {
                Ok(x) => Token::Int(self.line(), self.col(), x),
                Err(_) => Token::Err(SyntaxError::bad_number(self.line(), self.col(), s)),
            }
        };
        (tok, s.len())
    }

    /// Returns the token for a `#` literal.
    ///
    /// The only such literals are the booleans `#t` and `#f`.
    ///
    /// The token MUST be at the start of the line.
    fn lex_hash(&self, line: &str) -> (Token, usize) {
        lazy_static! {
            static ref RE: Regex = {
                let pattern = r"^#[0-9A-Za-z!$%&*/:<=>?^_~+.-]*";
                Regex::new(pattern).unwrap()
            };
        }

        let m = RE.find(line).unwrap();
        let s = m.as_str();
        let tok = match s {
            "#t" => Token::Bool(self.line(), self.col(), true),
            "#f" => Token::Bool(self.line(), self.col(), false),
            _ => Token::Err(SyntaxError::bad_hash(self.line(), self.col(), s)),
        };
        (tok, s.len())
    }

    /// Returns a token for a string literal enclosed in double quotes.
    ///
    /// Escape sequences are replaced and the token will not include the
    /// surrounding quotes. An error is returned if the quote is unclosed
    /// before the end of the line.
    ///
    /// The token MUST be at the start of the line.
    fn lex_string(&self, line: &str) -> (Token, usize) {
        let mut buf = String::with_capacity(32);
        let mut escape = false;
        let mut len = 1; // the opening quote
        for ch in line.chars().skip(1) {
            len += ch.len_utf8();
            if escape {
                match ch {
                    'n' => buf.push('\n'),
                    'r' => buf.push('\r'),
                    't' => buf.push('\t'),
                    '\\' => buf.push('\\'),
                    ch => buf.push(ch),
                }
                escape = false;
            } else {
                match ch {
                    '\\' => escape = true,
                    '"' => return (Token::Str(self.line(), self.col(), buf), len),
                    ch => buf.push(ch),
                }
            }
        }
        let err = SyntaxError::unterminated_string(self.line(), self.col());
        (Token::Err(err), len)
    }

    /// Returns the next whitespace token.
    ///
    /// This includes characters in the unicode Whitespace and Other
    /// categories, including control characters.
    ///
    /// The token MUST be at the start of the line.
    fn lex_space(&self, line: &str) -> (Token, usize) {
        lazy_static! {
            static ref RE: Regex = {
                let pattern = r"^[\s\p{C}]+";
                Regex::new(pattern).unwrap()
            };
        }

        let m = RE.find(line).unwrap();
        let s = m.as_str();
        let tok = Token::Space(self.line(), self.col());
        (tok, s.len())
    }

    /// Returns a token for a comment.
    ///
    /// Comments start with ';' and extend to the end of the line.
    ///
    /// The token MUST be at the start of the line.
    fn lex_comment(&self, line: &str) -> (Token, usize) {
        lazy_static! {
            static ref RE: Regex = {
                let pattern = r"^;.*";
                Regex::new(pattern).unwrap()
            };
        }

        let m = RE.find(line).unwrap();
        let s = m.as_str();
        let tok = Token::Comment(self.line(), self.col());
        (tok, s.len())
    }
}

// Tests
// --------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn basic() {
        let src = "(define foo 42)\n\
                   ; a comment\n\
                   (+ -1 2.5 1e3 \"hi\" #t #f)\n";
        let ns = NameSpace::new();
        let mut toks = Lexer::new(src.as_bytes(), &ns);
        assert_eq!(toks.next().unwrap(), Token::Open(1, 1));
        assert_eq!(toks.next().unwrap(), Token::Sym(1, 2, ns.name("define")));
        assert_eq!(toks.next().unwrap(), Token::Sym(1, 9, ns.name("foo")));
        assert_eq!(toks.next().unwrap(), Token::Int(1, 13, 42));
        assert_eq!(toks.next().unwrap(), Token::Close(1, 15));
        assert_eq!(toks.next().unwrap(), Token::Open(3, 1));
        assert_eq!(toks.next().unwrap(), Token::Sym(3, 2, ns.name("+")));
        assert_eq!(toks.next().unwrap(), Token::Int(3, 4, -1));
        assert_eq!(toks.next().unwrap(), Token::Double(3, 7, 2.5));
        assert_eq!(toks.next().unwrap(), Token::Double(3, 11, 1e3));
        assert_eq!(toks.next().unwrap(), Token::Str(3, 15, "hi".to_string()));
        assert_eq!(toks.next().unwrap(), Token::Bool(3, 20, true));
        assert_eq!(toks.next().unwrap(), Token::Bool(3, 23, false));
        assert_eq!(toks.next().unwrap(), Token::Close(3, 25));
        assert!(toks.next().is_none());
    }

    #[test]
    fn quote_sugar() {
        let ns = NameSpace::new();
        let mut toks = Lexer::new("'foo".as_bytes(), &ns);
        assert_eq!(toks.next().unwrap(), Token::Quote(1, 1));
        assert_eq!(toks.next().unwrap(), Token::Sym(1, 2, ns.name("foo")));
        assert!(toks.next().is_none());
    }

    #[test]
    fn string_escapes() {
        let ns = NameSpace::new();
        let mut toks = Lexer::new(r#""a\n\t\\\"b""#.as_bytes(), &ns);
        let expected = "a\n\t\\\"b".to_string();
        assert_eq!(toks.next().unwrap(), Token::Str(1, 1, expected));
        assert!(toks.next().is_none());
    }

    #[test]
    fn symbols() {
        let ns = NameSpace::new();
        let src = "<= set! else a->b - +";
        let toks: Vec<Token> = Lexer::new(src.as_bytes(), &ns).collect();
        let texts: Vec<String> = toks.iter().map(|t| t.to_string()).collect();
        assert_eq!(texts, vec!["<=", "set!", "else", "a->b", "-", "+"]);
    }

    #[test]
    fn unterminated_string() {
        let ns = NameSpace::new();
        let mut toks = Lexer::new("\"oops\n".as_bytes(), &ns);
        match toks.next().unwrap() {
            Token::Err(err) => {
                assert_eq!(err.line(), 1);
                assert_eq!(err.col(), 1);
            }
            tok => panic!("expected an error token, got {}", tok),
        }
    }

    #[test]
    fn bad_hash() {
        let ns = NameSpace::new();
        let mut toks = Lexer::new("#true".as_bytes(), &ns);
        match toks.next().unwrap() {
            Token::Err(err) => assert_eq!(format!("{}", err), "1:1: unrecognized literal: '#true'"),
            tok => panic!("expected an error token, got {}", tok),
        }
    }

    #[test]
    fn reports_space_when_asked() {
        let ns = NameSpace::new();
        let mut toks = Lexer::new("a b".as_bytes(), &ns).report_space(true);
        assert_eq!(toks.next().unwrap(), Token::Sym(1, 1, ns.name("a")));
        assert_eq!(toks.next().unwrap(), Token::Space(1, 2));
        assert_eq!(toks.next().unwrap(), Token::Sym(1, 3, ns.name("b")));
    }
}
