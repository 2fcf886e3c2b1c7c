//! A parser for Scheme programs.
//!
//! A parser lifts a buffered reader into an iterator over top-level
//! S-expressions by way of a [`Lexer`] and a [`NameSpace`]. The `NameSpace`
//! is used to assign names to symbols, so the structures produced here
//! compare cheaply inside the evaluator.
//!
//! The algorithm is shift-reduce over an explicit stack: atoms shift, a
//! close paren reduces everything back to the nearest open marker into a
//! proper list. A completed item at depth zero is a top-level form and is
//! yielded immediately. The open markers live in a parser-private sum and
//! never appear in a produced [`Value`].
//!
//! The surface syntax `'x` is sugar for `(quote x)` and is desugared here.
//!
//! [`Lexer`]: ../lexer/struct.Lexer.html
//! [`NameSpace`]: ../namespace/struct.NameSpace.html
//! [`Value`]: ../../repr/enum.Value.html

use std::io::BufRead;

use crate::repr::{cons, list, Value};
use crate::syntax::error::{Result, SyntaxError};
use crate::syntax::lexer::{Lexer, Token};
use crate::syntax::namespace::NameSpace;

/// An iterator over the top-level S-expressions in UTF-8 text.
///
/// Each item is one fully-parsed top-level form. Errors abort the form being
/// built; the caller decides whether to continue (the program driver does
/// not: every error is fatal to the session).
pub struct Parser<'ns, B: BufRead> {
    ns: &'ns NameSpace,
    lexer: Lexer<'ns, B>,
    stack: Vec<Shift>,
    depth: usize,
}

/// The parser's shift-reduce stack alphabet.
///
/// `Open` and `Quote` are marker tokens; they never escape the parser.
enum Shift {
    Open,
    Quote,
    Val(Value),
}

// Public API
// --------------------------------------------------

impl<'ns, B: BufRead> Parser<'ns, B> {
    /// Constructs a new `Parser` from the given reader and namespace.
    pub fn new(reader: B, ns: &'ns NameSpace) -> Parser<'ns, B> {
        Parser {
            ns,
            lexer: Lexer::new(reader, ns),
            stack: Vec::with_capacity(32),
            depth: 0,
        }
    }
}

impl<'ns, B: BufRead> Iterator for Parser<'ns, B> {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Result<Value>> {
        loop {
            match self.lexer.next() {
                None => {
                    if self.depth != 0 {
                        self.stack.clear();
                        self.depth = 0;
                        let err = SyntaxError::unbalanced(self.lexer.line(), self.lexer.col());
                        return Some(Err(err));
                    }
                    if self.stack.pop().is_some() {
                        // Only quote markers can remain at depth zero.
                        let err = SyntaxError::dangling_quote(self.lexer.line(), self.lexer.col());
                        return Some(Err(err));
                    }
                    return None;
                }
                Some(Token::Err(err)) => return Some(Err(err)),
                Some(Token::Open(..)) => {
                    self.depth += 1;
                    self.stack.push(Shift::Open);
                }
                Some(Token::Quote(..)) => self.stack.push(Shift::Quote),
                Some(Token::Close(line, col)) => {
                    if self.depth == 0 {
                        return Some(Err(SyntaxError::unbalanced(line, col)));
                    }
                    if let Err(err) = self.reduce(line, col) {
                        return Some(Err(err));
                    }
                    self.depth -= 1;
                    if let Some(value) = self.complete() {
                        return Some(Ok(value));
                    }
                }
                Some(Token::Int(.., val)) => {
                    self.shift(Value::Int(val));
                    if let Some(value) = self.complete() {
                        return Some(Ok(value));
                    }
                }
                Some(Token::Double(.., val)) => {
                    self.shift(Value::Double(val));
                    if let Some(value) = self.complete() {
                        return Some(Ok(value));
                    }
                }
                Some(Token::Str(.., val)) => {
                    self.shift(Value::string(val));
                    if let Some(value) = self.complete() {
                        return Some(Ok(value));
                    }
                }
                Some(Token::Sym(.., val)) => {
                    self.shift(Value::Sym(val));
                    if let Some(value) = self.complete() {
                        return Some(Ok(value));
                    }
                }
                Some(Token::Bool(.., val)) => {
                    self.shift(Value::Bool(val));
                    if let Some(value) = self.complete() {
                        return Some(Ok(value));
                    }
                }
                Some(Token::Space(..)) | Some(Token::Comment(..)) => (),
            }
        }
    }
}

// Parsing Logic
// --------------------------------------------------

impl<'ns, B: BufRead> Parser<'ns, B> {
    /// Pushes a completed item, wrapping it for every pending quote marker.
    fn shift(&mut self, item: Value) {
        let mut item = item;
        while let Some(Shift::Quote) = self.stack.last() {
            self.stack.pop();
            let quote = Value::Sym(self.ns.name("quote"));
            item = list(vec![quote, item]);
        }
        self.stack.push(Shift::Val(item));
    }

    /// Reduces the stack down to the nearest open marker.
    ///
    /// The popped items form a proper list in their original left-to-right
    /// order; the empty reduction produces Null.
    fn reduce(&mut self, line: usize, col: usize) -> Result<()> {
        let mut out = Value::Null;
        loop {
            match self.stack.pop() {
                Some(Shift::Val(v)) => out = cons(v, out),
                Some(Shift::Open) => break,
                // `('` with no expression before the close paren.
                Some(Shift::Quote) => return Err(SyntaxError::dangling_quote(line, col)),
                None => unreachable!("an open marker exists whenever depth > 0"),
            }
        }
        self.shift(out);
        Ok(())
    }

    /// Takes the finished top-level form off the stack, if there is one.
    fn complete(&mut self) -> Option<Value> {
        if self.depth == 0 && self.stack.len() == 1 {
            if let Some(Shift::Val(value)) = self.stack.pop() {
                return Some(value);
            }
            unreachable!("depth is 0, so the only stack entry is a value");
        }
        None
    }
}

// Tests
// --------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn parse_all(src: &str) -> Result<Vec<Value>> {
        let ns = NameSpace::new();
        Parser::new(src.as_bytes(), &ns).collect()
    }

    fn shapes(src: &str) -> Vec<String> {
        parse_all(src)
            .unwrap()
            .iter()
            .map(|v| v.to_string())
            .collect()
    }

    #[test]
    fn atoms() {
        assert_eq!(shapes("42 -7 2.5 #t #f foo \"hi\""),
                   vec!["42", "-7", "2.5", "#t", "#f", "foo", "\"hi\""]);
    }

    #[test]
    fn nesting() {
        assert_eq!(shapes("(+ 1 (* 2 3))"), vec!["(+ 1 (* 2 3))"]);
        assert_eq!(shapes("()"), vec!["()"]);
        assert_eq!(shapes("(() (()))"), vec!["(() (()))"]);
    }

    #[test]
    fn multiple_toplevel_forms() {
        assert_eq!(shapes("(define x 1)\n(+ x 2)\n"),
                   vec!["(define x 1)", "(+ x 2)"]);
    }

    #[test]
    fn quote_sugar() {
        assert_eq!(shapes("'x"), vec!["(quote x)"]);
        assert_eq!(shapes("''x"), vec!["(quote (quote x))"]);
        assert_eq!(shapes("'(1 2)"), vec!["(quote (1 2))"]);
        assert_eq!(shapes("('a 'b)"), vec!["((quote a) (quote b))"]);
    }

    #[test]
    fn unbalanced_close() {
        let err = parse_all(")").unwrap_err();
        assert_eq!(format!("{}", err), "1:1: unbalanced parentheses");
    }

    #[test]
    fn unbalanced_open() {
        let err = parse_all("(").unwrap_err();
        assert_eq!(format!("{}", err), "2:1: unbalanced parentheses");
    }

    #[test]
    fn unbalanced_nested() {
        assert!(parse_all("(define x (+ 1 2)").is_err());
        assert!(parse_all("(a))").is_err());
    }

    #[test]
    fn dangling_quote() {
        assert!(parse_all("'").is_err());
        assert!(parse_all("(')").is_err());
    }

    #[test]
    fn errors_from_the_lexer_propagate() {
        assert!(parse_all("(car \"oops)").is_err());
        assert!(parse_all("#true").is_err());
    }
}
