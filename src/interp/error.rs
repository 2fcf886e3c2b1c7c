use std::error::Error;
use std::fmt;
use std::io;

use crate::syntax::{Name, SyntaxError};

/// A type alias for results with possible `EvalError`s.
pub type Result<T> = ::std::result::Result<T, EvalError>;

/// Everything that can go wrong while evaluating a program.
///
/// Every error is fatal to the interpretation session: the driver prints the
/// diagnostic and exits nonzero. There is no recovery at the top level.
#[derive(Debug)]
pub enum EvalError {
    /// A symbol with no binding in any enclosing frame.
    Unbound(Name),
    /// A value of the wrong shape where a specific one was required.
    Expected(&'static str),
    /// Any divisor equal to zero.
    DivisionByZero,
    /// A procedure or form applied to the wrong number of arguments.
    Arity { expected: String, given: usize },
    /// A malformed special form.
    Form { form: &'static str, detail: &'static str },
    /// The same identifier bound twice in one frame.
    DuplicateBinding(Name),
    /// `define` below the top level.
    DefineNotTopLevel,
    /// An `else` clause followed by further `cond` clauses.
    ElseNotLast,
    /// A variant that is not a legal expression reached the evaluator.
    Unevaluatable,
    /// A parse failure, surfaced through `load`.
    Syntax(SyntaxError),
    /// An I/O failure, from `load` or while printing results.
    Io(io::Error),
}

impl EvalError {
    pub fn arity<E: Into<String>>(expected: E, given: usize) -> EvalError {
        EvalError::Arity {
            expected: expected.into(),
            given,
        }
    }

    pub fn form(form: &'static str, detail: &'static str) -> EvalError {
        EvalError::Form { form, detail }
    }
}

impl Error for EvalError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            EvalError::Syntax(e) => Some(e),
            EvalError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EvalError::Unbound(name) => write!(f, "unbound symbol: {}", name),
            EvalError::Expected(what) => write!(f, "expected {}", what),
            EvalError::DivisionByZero => write!(f, "division by 0"),
            EvalError::Arity { expected, given } => {
                write!(f, "arity mismatch: expected {}, given {}", expected, given)
            }
            EvalError::Form { form, detail } => {
                write!(f, "invalid syntax in '{}': {}", form, detail)
            }
            EvalError::DuplicateBinding(name) => write!(f, "duplicate identifier: {}", name),
            EvalError::DefineNotTopLevel => {
                write!(f, "'define' is only allowed at the top level")
            }
            EvalError::ElseNotLast => write!(f, "'else' must be the last 'cond' clause"),
            EvalError::Unevaluatable => write!(f, "cannot evaluate this expression"),
            EvalError::Syntax(e) => write!(f, "{}", e),
            EvalError::Io(e) => write!(f, "{}", e),
        }
    }
}

impl From<SyntaxError> for EvalError {
    fn from(err: SyntaxError) -> EvalError {
        EvalError::Syntax(err)
    }
}

impl From<io::Error> for EvalError {
    fn from(err: io::Error) -> EvalError {
        EvalError::Io(err)
    }
}
