//! The built-in procedures.
//!
//! Primitives are not a separate registry: [`install`] seeds them into the
//! top-level frame as ordinary bindings before user code runs, which keeps
//! `eq?`, shadowing, and `apply` uniform. Every primitive receives a proper
//! list of already-evaluated arguments plus the interpreter context; only
//! `load` uses the context, to re-enter the evaluator against the top-level
//! frame.
//!
//! [`install`]: ./fn.install.html

use std::fs::File;
use std::io::BufReader;
use std::rc::Rc;

use ordered_float::OrderedFloat;

use crate::interp::error::{EvalError, Result};
use crate::interp::eval;
use crate::interp::frame::FrameRef;
use crate::interp::Interp;
use crate::repr::{cons, list, PrimitiveFn, Value};
use crate::syntax::NameSpace;

/// Seeds every primitive into the given (top-level) frame.
pub fn install(ns: &NameSpace, top: &FrameRef) {
    let table: &[(&str, PrimitiveFn)] = &[
        ("+", prim_add),
        ("*", prim_mul),
        ("-", prim_sub),
        ("/", prim_div),
        ("<=", prim_leq),
        ("null?", prim_is_null),
        ("pair?", prim_is_pair),
        ("number?", prim_is_number),
        ("integer?", prim_is_integer),
        ("eq?", prim_is_eq),
        ("car", prim_car),
        ("cdr", prim_cdr),
        ("cons", prim_cons),
        ("apply", prim_apply),
        ("load", prim_load),
    ];
    let mut frame = top.borrow_mut();
    for (name, func) in table {
        frame.bind_or_update_global(ns.name(*name), Value::Primitive(*func));
    }
}

// Numeric helpers
// --------------------------------------------------

/// A number in either representation, for the promotion rules: a result is
/// Integer only while every operand seen so far is an Integer.
#[derive(Clone, Copy)]
enum Num {
    Int(i64),
    Double(f64),
}

impl Num {
    fn as_f64(self) -> f64 {
        match self {
            Num::Int(i) => i as f64,
            Num::Double(d) => d,
        }
    }

    fn into_value(self) -> Value {
        match self {
            Num::Int(i) => Value::Int(i),
            Num::Double(d) => Value::Double(d),
        }
    }
}

fn num(value: &Value) -> Result<Num> {
    match value {
        Value::Int(i) => Ok(Num::Int(*i)),
        Value::Double(d) => Ok(Num::Double(*d)),
        _ => Err(EvalError::Expected("numerical arguments")),
    }
}

// Argument shape helpers
// --------------------------------------------------

fn one(args: &Value) -> Result<&Value> {
    match (args.car(), args.cdr()) {
        (Some(a), Some(Value::Null)) => Ok(a),
        _ => Err(EvalError::arity("1 argument", args.iter().count())),
    }
}

fn two(args: &Value) -> Result<(&Value, &Value)> {
    if args.list_len() == Some(2) {
        match (args.car(), args.cdr().and_then(Value::car)) {
            (Some(a), Some(b)) => return Ok((a, b)),
            _ => (),
        }
    }
    Err(EvalError::arity("2 arguments", args.iter().count()))
}

// Arithmetic
// --------------------------------------------------

fn prim_add(args: Value, _ctx: &Interp) -> Result<Value> {
    let mut acc = Num::Int(0);
    for arg in args.iter() {
        acc = match (acc, num(arg)?) {
            (Num::Int(a), Num::Int(b)) => Num::Int(a.wrapping_add(b)),
            (a, b) => Num::Double(a.as_f64() + b.as_f64()),
        };
    }
    Ok(acc.into_value())
}

fn prim_mul(args: Value, _ctx: &Interp) -> Result<Value> {
    let mut acc = Num::Int(1);
    for arg in args.iter() {
        acc = match (acc, num(arg)?) {
            (Num::Int(a), Num::Int(b)) => Num::Int(a.wrapping_mul(b)),
            (a, b) => Num::Double(a.as_f64() * b.as_f64()),
        };
    }
    Ok(acc.into_value())
}

fn prim_sub(args: Value, _ctx: &Interp) -> Result<Value> {
    let mut elems = args.iter();
    let first = match elems.next() {
        Some(first) => num(first)?,
        None => return Err(EvalError::arity("at least 1 argument", 0)),
    };
    // One argument negates.
    if args.list_len() == Some(1) {
        return Ok(match first {
            Num::Int(i) => Value::Int(i.wrapping_neg()),
            Num::Double(d) => Value::Double(-d),
        });
    }
    let mut acc = first;
    for arg in elems {
        acc = match (acc, num(arg)?) {
            (Num::Int(a), Num::Int(b)) => Num::Int(a.wrapping_sub(b)),
            (a, b) => Num::Double(a.as_f64() - b.as_f64()),
        };
    }
    Ok(acc.into_value())
}

fn prim_div(args: Value, _ctx: &Interp) -> Result<Value> {
    let mut elems = args.iter();
    let first = match elems.next() {
        Some(first) => num(first)?,
        None => return Err(EvalError::arity("at least 1 argument", 0)),
    };
    // One argument takes the reciprocal. An Integer reciprocal stays an
    // Integer, truncating toward zero: (/ 2) is 0.
    if args.list_len() == Some(1) {
        return match first {
            Num::Int(0) => Err(EvalError::DivisionByZero),
            Num::Int(i) => Ok(Value::Int(1 / i)),
            Num::Double(d) if d == 0.0 => Err(EvalError::DivisionByZero),
            Num::Double(d) => Ok(Value::Double(1.0 / d)),
        };
    }
    let mut all_int = matches!(first, Num::Int(..));
    let mut acc = first.as_f64();
    for arg in elems {
        let divisor = num(arg)?;
        if divisor.as_f64() == 0.0 {
            return Err(EvalError::DivisionByZero);
        }
        if let Num::Double(..) = divisor {
            all_int = false;
        }
        acc /= divisor.as_f64();
    }
    // An all-Integer division that comes out exact stays an Integer.
    if all_int && acc.fract() == 0.0 && acc >= i64::MIN as f64 && acc <= i64::MAX as f64 {
        Ok(Value::Int(acc as i64))
    } else {
        Ok(Value::Double(acc))
    }
}

fn prim_leq(args: Value, _ctx: &Interp) -> Result<Value> {
    let mut elems = args.iter();
    let first = match elems.next() {
        Some(first) => num(first)?,
        None => return Err(EvalError::arity("at least 2 arguments", 0)),
    };
    if args.list_len() == Some(1) {
        return Err(EvalError::arity("at least 2 arguments", 1));
    }
    let mut prev = first.as_f64();
    for arg in elems {
        let cur = num(arg)?.as_f64();
        if !(prev <= cur) {
            // The remaining arguments are never examined.
            return Ok(Value::Bool(false));
        }
        prev = cur;
    }
    Ok(Value::Bool(true))
}

// Predicates
// --------------------------------------------------

fn prim_is_null(args: Value, _ctx: &Interp) -> Result<Value> {
    Ok(Value::Bool(one(&args)?.is_null()))
}

fn prim_is_pair(args: Value, _ctx: &Interp) -> Result<Value> {
    Ok(Value::Bool(matches!(one(&args)?, Value::Cons(..))))
}

fn prim_is_number(args: Value, _ctx: &Interp) -> Result<Value> {
    let arg = one(&args)?;
    Ok(Value::Bool(matches!(arg, Value::Int(..) | Value::Double(..))))
}

fn prim_is_integer(args: Value, _ctx: &Interp) -> Result<Value> {
    Ok(Value::Bool(matches!(one(&args)?, Value::Int(..))))
}

/// Structural equality on atoms, identity on pairs and procedures.
fn prim_is_eq(args: Value, _ctx: &Interp) -> Result<Value> {
    let (a, b) = two(&args)?;
    let eq = match (a, b) {
        (Value::Int(x), Value::Int(y)) => x == y,
        (Value::Double(x), Value::Double(y)) => OrderedFloat(*x) == OrderedFloat(*y),
        (Value::Str(x), Value::Str(y)) => x == y,
        (Value::Sym(x), Value::Sym(y)) => x == y,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Null, Value::Null) => true,
        (Value::Cons(x), Value::Cons(y)) => Rc::ptr_eq(x, y),
        (Value::Closure(x), Value::Closure(y)) => Rc::ptr_eq(x, y),
        (Value::Primitive(x), Value::Primitive(y)) => *x == *y,
        _ => false,
    };
    Ok(Value::Bool(eq))
}

// Lists
// --------------------------------------------------

fn prim_car(args: Value, _ctx: &Interp) -> Result<Value> {
    one(&args)?
        .car()
        .cloned()
        .ok_or(EvalError::Expected("non-empty list"))
}

fn prim_cdr(args: Value, _ctx: &Interp) -> Result<Value> {
    one(&args)?
        .cdr()
        .cloned()
        .ok_or(EvalError::Expected("non-empty list"))
}

fn prim_cons(args: Value, _ctx: &Interp) -> Result<Value> {
    let (a, b) = two(&args)?;
    Ok(cons(a.clone(), b.clone()))
}

// Control
// --------------------------------------------------

/// `(apply proc arg... rest)` — the argument prefix is catenated with the
/// final proper list and the procedure is called on the result.
fn prim_apply(args: Value, ctx: &Interp) -> Result<Value> {
    let items: Vec<&Value> = args.iter().collect();
    if items.len() < 2 {
        return Err(EvalError::arity("at least 2 arguments", items.len()));
    }
    let proc = items[0];
    let rest = items[items.len() - 1];
    if rest.list_len().is_none() {
        return Err(EvalError::Expected("a proper list"));
    }
    let mut combined: Vec<Value> = items[1..items.len() - 1]
        .iter()
        .map(|v| (*v).clone())
        .collect();
    combined.extend(rest.iter().cloned());
    eval::apply(proc, list(combined), ctx)
}

/// `(load path)` — tokenize, parse, and evaluate the file's forms in the
/// top-level frame. Results are discarded; errors abort as usual.
fn prim_load(args: Value, ctx: &Interp) -> Result<Value> {
    let path = match one(&args)? {
        Value::Str(path) => path.clone(),
        _ => return Err(EvalError::Expected("a string")),
    };
    let file = File::open(path.as_ref())?;
    ctx.load(BufReader::new(file))?;
    Ok(Value::Void)
}

// Tests
// --------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn results(src: &str) -> Vec<String> {
        let interp = Interp::new();
        let values = interp.eval_program(src.as_bytes()).unwrap();
        values.iter().map(|v| v.to_string()).collect()
    }

    fn last(src: &str) -> String {
        results(src).pop().unwrap()
    }

    fn fails(src: &str) -> EvalError {
        let interp = Interp::new();
        interp.eval_program(src.as_bytes()).unwrap_err()
    }

    #[test]
    fn addition_promotes() {
        assert_eq!(last("(+)"), "0");
        assert_eq!(last("(+ 1 2 3)"), "6");
        assert_eq!(last("(+ 1 2.5)"), "3.5");
        assert_eq!(last("(+ 1.0 2)"), "3.0");
        assert!(matches!(fails("(+ 1 'x)"), EvalError::Expected(..)));
    }

    #[test]
    fn multiplication_promotes() {
        assert_eq!(last("(*)"), "1");
        assert_eq!(last("(* 2 3 4)"), "24");
        assert_eq!(last("(* 2 3.0)"), "6.0");
    }

    #[test]
    fn subtraction_negates_and_folds() {
        assert_eq!(last("(- 5)"), "-5");
        assert_eq!(last("(- 2.5)"), "-2.5");
        assert_eq!(last("(- 10 1 2)"), "7");
        assert_eq!(last("(- 10 0.5)"), "9.5");
        assert!(matches!(fails("(-)"), EvalError::Arity { .. }));
    }

    #[test]
    fn division_exactness() {
        assert_eq!(last("(/ 8 2)"), "4");
        assert_eq!(last("(/ 7 2)"), "3.5");
        assert_eq!(last("(/ 12 2 3)"), "2");
        assert_eq!(last("(/ 4 2.0)"), "2.0");
        // The Integer reciprocal truncates: 1/2 is 0.
        assert_eq!(last("(/ 2)"), "0");
        assert_eq!(last("(/ 1)"), "1");
        assert_eq!(last("(/ 2.0)"), "0.5");
    }

    #[test]
    fn division_by_zero() {
        assert!(matches!(fails("(/ 1 0)"), EvalError::DivisionByZero));
        assert!(matches!(fails("(/ 1 2 0)"), EvalError::DivisionByZero));
        assert!(matches!(fails("(/ 0)"), EvalError::DivisionByZero));
        assert!(matches!(fails("(/ 0.0)"), EvalError::DivisionByZero));
        assert!(matches!(fails("(/ 1 0.0)"), EvalError::DivisionByZero));
    }

    #[test]
    fn leq_chains() {
        assert_eq!(last("(<= 1 2 2 3)"), "#t");
        assert_eq!(last("(<= 1 2 1)"), "#f");
        assert_eq!(last("(<= 1.5 2)"), "#t");
        assert!(matches!(fails("(<= 1)"), EvalError::Arity { .. }));
        assert!(matches!(fails("(<=)"), EvalError::Arity { .. }));
        // A violation returns #f before later arguments are examined.
        assert_eq!(last("(<= 2 1 'x)"), "#f");
        assert!(matches!(fails("(<= 1 'x)"), EvalError::Expected(..)));
    }

    #[test]
    fn type_predicates() {
        assert_eq!(last("(null? '())"), "#t");
        assert_eq!(last("(null? '(1))"), "#f");
        assert_eq!(last("(pair? '(1))"), "#t");
        assert_eq!(last("(pair? '())"), "#f");
        assert_eq!(last("(number? 1)"), "#t");
        assert_eq!(last("(number? 1.5)"), "#t");
        assert_eq!(last("(number? 'x)"), "#f");
        assert_eq!(last("(integer? 1)"), "#t");
        assert_eq!(last("(integer? 1.5)"), "#f");
        assert!(matches!(fails("(null? 1 2)"), EvalError::Arity { .. }));
    }

    #[test]
    fn eq_on_atoms_is_structural() {
        assert_eq!(last("(eq? 1 1)"), "#t");
        assert_eq!(last("(eq? 1 2)"), "#f");
        assert_eq!(last("(eq? 1.5 1.5)"), "#t");
        assert_eq!(last("(eq? 1 1.0)"), "#f");
        assert_eq!(last("(eq? 'a 'a)"), "#t");
        assert_eq!(last("(eq? \"s\" \"s\")"), "#t");
        assert_eq!(last("(eq? #t #t)"), "#t");
        assert_eq!(last("(eq? '() '())"), "#t");
    }

    #[test]
    fn eq_on_pairs_is_identity() {
        assert_eq!(last("(eq? '(1 2) '(1 2))"), "#f");
        assert_eq!(last("(define xs '(1 2)) (eq? xs xs)"), "#t");
        assert_eq!(last("(define f (lambda (x) x)) (eq? f f)"), "#t");
        assert_eq!(last("(eq? (lambda (x) x) (lambda (x) x))"), "#f");
        assert_eq!(last("(eq? car car)"), "#t");
        assert_eq!(last("(eq? car cdr)"), "#f");
    }

    #[test]
    fn car_cdr_contracts() {
        assert_eq!(last("(car '(1 2 3))"), "1");
        assert_eq!(last("(cdr '(1 2 3))"), "(2 3)");
        assert_eq!(last("(car (cdr '(1 2 3)))"), "2");
        let err = fails("(car '())");
        assert_eq!(format!("{}", err), "expected non-empty list");
        assert!(matches!(fails("(cdr 5)"), EvalError::Expected(..)));
    }

    #[test]
    fn cons_builds_pairs() {
        assert_eq!(last("(cons 1 '(2 3))"), "(1 2 3)");
        assert_eq!(last("(cons 1 2)"), "(1 . 2)");
        // Rebuilding from car and cdr reproduces the list.
        assert_eq!(last("(define xs '(1 2 3)) (cons (car xs) (cdr xs))"), "(1 2 3)");
        assert!(matches!(fails("(cons 1)"), EvalError::Arity { .. }));
    }

    #[test]
    fn apply_catenates_in_order() {
        assert_eq!(last("(apply + '(1 2 3 4))"), "10");
        assert_eq!(last("(apply + 1 2 '(3 4))"), "10");
        assert_eq!(last("(apply cons 1 '(2))"), "(1 . 2)");
        // The prefix precedes the tail list.
        assert_eq!(last("(apply - 10 '(1 2))"), "7");
        assert!(matches!(fails("(apply +)"), EvalError::Arity { .. }));
        assert!(matches!(fails("(apply + 1)"), EvalError::Expected(..)));
        assert!(matches!(fails("(apply + (cons 1 2))"), EvalError::Expected(..)));
    }

    #[test]
    fn apply_with_a_user_defined_list() {
        let src = "(define list (lambda args args))\n\
                   (apply + (list 1 2 3 4))";
        assert_eq!(last(src), "10");
    }

    #[test]
    fn load_requires_a_string() {
        assert!(matches!(fails("(load 5)"), EvalError::Expected(..)));
        assert!(matches!(fails("(load \"/no/such/file.scm\")"), EvalError::Io(..)));
    }
}
