//! A tree-walking evaluator for a subset of Scheme.
//!
//! The pipeline is the classic one: a [`Lexer`] lifts a buffered reader into
//! tokens, a [`Parser`] folds the tokens into nested list structure, and an
//! [`Interp`] reduces each top-level form to a [`Value`] under a lexically
//! scoped chain of frames, printing each result.
//!
//! [`Lexer`]: ./syntax/lexer/struct.Lexer.html
//! [`Parser`]: ./syntax/parser/struct.Parser.html
//! [`Interp`]: ./interp/struct.Interp.html
//! [`Value`]: ./repr/enum.Value.html

#[macro_use]
extern crate lazy_static;

pub mod interp;
pub mod repr;
pub mod syntax;
