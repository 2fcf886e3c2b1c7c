//! The front end: lexing, symbol interning, and parsing.
//!
//! Everything needed to turn UTF-8 text into the nested list [`Value`]s the
//! evaluator consumes. The usual entry point is the [`Parser`], an iterator
//! over top-level forms; the [`Interp`] wraps it together with a seeded
//! top-level frame.
//!
//! [`Value`]: ../repr/enum.Value.html
//! [`Parser`]: ./parser/struct.Parser.html
//! [`Interp`]: ../interp/struct.Interp.html

pub mod lexer;
pub mod namespace;
pub mod parser;
mod error;

pub use self::error::{Result, SyntaxError};
pub use self::lexer::{Lexer, Token};
pub use self::namespace::{Name, NameSpace};
pub use self::parser::Parser;
