//! The interpreter: a seeded top-level frame driving the evaluator.
//!
//! An [`Interp`] abstracts the details of wiring a parser, a namespace, and
//! the primitive table together. Each interpreter has a unique
//! [`NameSpace`] and a single top-level frame seeded with the primitive
//! procedures; `load` re-enters the same top-level frame, so loaded
//! definitions are visible to the rest of the program.
//!
//! [`Interp`]: ./struct.Interp.html
//! [`NameSpace`]: ../syntax/namespace/struct.NameSpace.html

pub mod error;
pub mod eval;
pub mod frame;
pub mod primitives;

pub use self::error::{EvalError, Result};

use std::io::{BufRead, Write};

use self::frame::{Frame, FrameRef};
use crate::repr::Value;
use crate::syntax::{NameSpace, Parser};

/// Everything you need to run a Scheme program.
///
/// The primitives are ordinary bindings in the top-level frame, so user code
/// can shadow them, pass them around, and compare them with `eq?` like any
/// other value.
pub struct Interp {
    ns: NameSpace,
    top: FrameRef,
}

impl Interp {
    /// Constructs an interpreter with the primitives installed.
    pub fn new() -> Interp {
        let ns = NameSpace::new();
        let top = Frame::top_level();
        primitives::install(&ns, &top);
        Interp { ns, top }
    }

    /// Access the underlying `NameSpace`.
    pub fn ns(&self) -> &NameSpace {
        &self.ns
    }

    /// Access the top-level frame.
    pub fn top(&self) -> &FrameRef {
        &self.top
    }

    /// Parses a complete program, evaluates each form at the top level, and
    /// returns the results in order.
    ///
    /// The whole program is parsed before anything is evaluated, so a syntax
    /// error anywhere aborts the run before it has any effect.
    pub fn eval_program<B: BufRead>(&self, reader: B) -> Result<Vec<Value>> {
        self.parse(reader)?
            .iter()
            .map(|form| eval::eval(form, &self.top, self))
            .collect()
    }

    /// Evaluates a program for its effect on the top-level frame, discarding
    /// the results. This is what the `load` primitive runs.
    pub fn load<B: BufRead>(&self, reader: B) -> Result<()> {
        for form in self.parse(reader)? {
            eval::eval(&form, &self.top, self)?;
        }
        Ok(())
    }

    /// Evaluates a program, printing each top-level result to `out` followed
    /// by a newline. Void results print nothing, not even the newline.
    ///
    /// Evaluation is interleaved with printing, so the results of earlier
    /// forms appear even when a later form fails.
    pub fn interpret<B: BufRead, W: Write>(&self, reader: B, out: &mut W) -> Result<()> {
        for form in self.parse(reader)? {
            let value = eval::eval(&form, &self.top, self)?;
            if !value.is_void() {
                writeln!(out, "{}", value)?;
            }
        }
        Ok(())
    }

    fn parse<B: BufRead>(&self, reader: B) -> Result<Vec<Value>> {
        let forms: crate::syntax::Result<Vec<Value>> = Parser::new(reader, &self.ns).collect();
        Ok(forms?)
    }
}

impl Default for Interp {
    fn default() -> Interp {
        Interp::new()
    }
}

// Tests
// --------------------------------------------------
