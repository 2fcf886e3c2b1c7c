//! The evaluator: `eval`, the special forms, and `apply`.
//!
//! [`eval`] dispatches on the variant of the expression: atoms are
//! self-evaluating, symbols resolve against the frame chain, and a cons cell
//! is either a special form (recognized by its head symbol before anything
//! is evaluated) or a procedure application. Application evaluates the head
//! and every argument left to right, then hands off to [`apply`].
//!
//! Both functions recurse through the host call stack and there is no
//! tail-call elimination, so deeply recursive Scheme programs are bounded by
//! the host stack (a few tens of thousands of frames on common platforms).
//!
//! [`eval`]: ./fn.eval.html
//! [`apply`]: ./fn.apply.html

use std::rc::Rc;

use crate::interp::error::{EvalError, Result};
use crate::interp::frame::{self, Frame, FrameRef};
use crate::interp::Interp;
use crate::repr::{cons, reverse, Closure, Formals, Value};
use crate::syntax::Name;

/// Reduces a single expression to a value under the given frame.
pub fn eval(expr: &Value, frame: &FrameRef, ctx: &Interp) -> Result<Value> {
    match expr {
        Value::Int(..) | Value::Double(..) | Value::Str(..) | Value::Bool(..) => Ok(expr.clone()),
        Value::Sym(name) => {
            frame::lookup(frame, name).ok_or_else(|| EvalError::Unbound(name.clone()))
        }
        Value::Cons(pair) => {
            let head = &pair.car;
            let args = &pair.cdr;
            if let Value::Sym(name) = head {
                match name.as_str() {
                    "quote" => return eval_quote(args),
                    "if" => return eval_if(args, frame, ctx),
                    "and" => return eval_and(args, frame, ctx),
                    "or" => return eval_or(args, frame, ctx),
                    "begin" => return eval_sequence(args, frame, ctx),
                    "cond" => return eval_cond(args, frame, ctx),
                    "let" => return eval_let(args, frame, ctx),
                    "let*" => return eval_letstar(args, frame, ctx),
                    "letrec" => return eval_letrec(args, frame, ctx),
                    "define" => return eval_define(args, frame, ctx),
                    "set!" => return eval_set(args, frame, ctx),
                    "lambda" => return eval_lambda(args, frame),
                    _ => (),
                }
            }
            let callee = eval(head, frame, ctx)?;
            let mut collected = Value::Null;
            let mut elems = args.iter();
            for sub in &mut elems {
                collected = cons(eval(sub, frame, ctx)?, collected);
            }
            if !elems.rest().is_null() {
                return Err(EvalError::Unevaluatable);
            }
            let actuals = reverse(&collected).expect("consed argument lists are proper");
            apply(&callee, actuals, ctx)
        }
        Value::Null | Value::Void | Value::Closure(..) | Value::Primitive(..) => {
            Err(EvalError::Unevaluatable)
        }
    }
}

/// Applies a procedure to a proper list of already-evaluated arguments.
pub fn apply(callee: &Value, args: Value, ctx: &Interp) -> Result<Value> {
    match callee {
        Value::Primitive(func) => func(args, ctx),
        Value::Closure(closure) => {
            let given = match args.list_len() {
                Some(n) => n,
                None => return Err(EvalError::Expected("a proper list of arguments")),
            };
            let call_frame = Frame::child(&closure.frame);
            match &closure.formals {
                Formals::Fixed(names) => {
                    if names.len() != given {
                        return Err(EvalError::arity(names.len().to_string(), given));
                    }
                    let mut f = call_frame.borrow_mut();
                    for (name, actual) in names.iter().zip(args.iter()) {
                        if !f.bind_local(name.clone(), actual.clone()) {
                            return Err(EvalError::DuplicateBinding(name.clone()));
                        }
                    }
                }
                Formals::Variadic(name) => {
                    call_frame.borrow_mut().bind_local(name.clone(), args.clone());
                }
            }
            eval_sequence(&closure.body, &call_frame, ctx)
        }
        _ => Err(EvalError::Expected("a procedure")),
    }
}

/// Evaluates a list of forms in order, returning the last value.
///
/// The empty sequence yields Void; this is exactly `begin`.
fn eval_sequence(body: &Value, frame: &FrameRef, ctx: &Interp) -> Result<Value> {
    let mut result = Value::Void;
    for form in body.iter() {
        result = eval(form, frame, ctx)?;
    }
    Ok(result)
}

// Special forms
// --------------------------------------------------

fn eval_quote(args: &Value) -> Result<Value> {
    match (args.car(), args.cdr()) {
        (Some(datum), Some(Value::Null)) => Ok(datum.clone()),
        _ => Err(EvalError::arity("1 argument", args.iter().count())),
    }
}

fn eval_if(args: &Value, frame: &FrameRef, ctx: &Interp) -> Result<Value> {
    let mut forms = args.iter();
    let (test, conseq) = match (forms.next(), forms.next()) {
        (Some(test), Some(conseq)) => (test, conseq),
        _ => return Err(EvalError::form("if", "expected a test and a consequent")),
    };
    let alt = forms.next();
    if forms.next().is_some() {
        return Err(EvalError::form("if", "expected 2 or 3 arguments"));
    }
    if eval(test, frame, ctx)?.is_false() {
        match alt {
            Some(alt) => eval(alt, frame, ctx),
            None => Ok(Value::Void),
        }
    } else {
        eval(conseq, frame, ctx)
    }
}

fn eval_and(args: &Value, frame: &FrameRef, ctx: &Interp) -> Result<Value> {
    let mut result = Value::Bool(true);
    for form in args.iter() {
        result = eval(form, frame, ctx)?;
        if result.is_false() {
            break;
        }
    }
    Ok(result)
}

fn eval_or(args: &Value, frame: &FrameRef, ctx: &Interp) -> Result<Value> {
    let mut result = Value::Bool(false);
    for form in args.iter() {
        result = eval(form, frame, ctx)?;
        if !result.is_false() {
            break;
        }
    }
    Ok(result)
}

fn eval_cond(args: &Value, frame: &FrameRef, ctx: &Interp) -> Result<Value> {
    let mut clauses = args.iter().peekable();
    while let Some(clause) = clauses.next() {
        let (test, body) = match (clause.car(), clause.cdr()) {
            (Some(test), Some(body)) => (test, body),
            _ => return Err(EvalError::form("cond", "expected a (test body...) clause")),
        };
        if let Value::Sym(name) = test {
            if name.as_str() == "else" {
                if clauses.peek().is_some() {
                    return Err(EvalError::ElseNotLast);
                }
                return eval_clause_body(body, frame, ctx);
            }
        }
        if !eval(test, frame, ctx)?.is_false() {
            return eval_clause_body(body, frame, ctx);
        }
    }
    Ok(Value::Void)
}

fn eval_clause_body(body: &Value, frame: &FrameRef, ctx: &Interp) -> Result<Value> {
    if body.is_null() {
        return Err(EvalError::form("cond", "clause body is empty"));
    }
    eval_sequence(body, frame, ctx)
}

fn eval_let(args: &Value, frame: &FrameRef, ctx: &Interp) -> Result<Value> {
    let (bindings, body) = split_let(args, "let")?;
    let child = Frame::child(frame);
    for binding in bindings.iter() {
        let (name, expr) = split_binding(binding, "let")?;
        // Binding expressions see the enclosing frame, not each other.
        let value = eval(expr, frame, ctx)?;
        if !child.borrow_mut().bind_local(name.clone(), value) {
            return Err(EvalError::DuplicateBinding(name.clone()));
        }
    }
    eval_sequence(body, &child, ctx)
}

fn eval_letstar(args: &Value, frame: &FrameRef, ctx: &Interp) -> Result<Value> {
    let (bindings, body) = split_let(args, "let*")?;
    let mut innermost = Rc::clone(frame);
    for binding in bindings.iter() {
        let (name, expr) = split_binding(binding, "let*")?;
        // Each binding gets its own frame, so it sees all earlier ones.
        let child = Frame::child(&innermost);
        let value = eval(expr, &child, ctx)?;
        child.borrow_mut().bind_local(name.clone(), value);
        innermost = child;
    }
    eval_sequence(body, &innermost, ctx)
}

fn eval_letrec(args: &Value, frame: &FrameRef, ctx: &Interp) -> Result<Value> {
    let (bindings, body) = split_let(args, "letrec")?;
    let child = Frame::child(frame);
    for binding in bindings.iter() {
        let (name, expr) = split_binding(binding, "letrec")?;
        // Binding expressions see the new frame, so closures defined here
        // can refer to every name in the set, enabling mutual recursion.
        let value = eval(expr, &child, ctx)?;
        if !child.borrow_mut().bind_local(name.clone(), value) {
            return Err(EvalError::DuplicateBinding(name.clone()));
        }
    }
    eval_sequence(body, &child, ctx)
}

fn eval_define(args: &Value, frame: &FrameRef, ctx: &Interp) -> Result<Value> {
    if !frame.borrow().is_top_level() {
        return Err(EvalError::DefineNotTopLevel);
    }
    if args.list_len() != Some(2) {
        return Err(EvalError::form("define", "expected an identifier and an expression"));
    }
    match (args.car(), args.cdr().and_then(Value::car)) {
        (Some(Value::Sym(name)), Some(expr)) => {
            let value = eval(expr, frame, ctx)?;
            frame.borrow_mut().bind_or_update_global(name.clone(), value);
            Ok(Value::Void)
        }
        _ => Err(EvalError::form("define", "first argument must be a symbol")),
    }
}

fn eval_set(args: &Value, frame: &FrameRef, ctx: &Interp) -> Result<Value> {
    if args.list_len() != Some(2) {
        return Err(EvalError::form("set!", "expected an identifier and an expression"));
    }
    match (args.car(), args.cdr().and_then(Value::car)) {
        (Some(Value::Sym(name)), Some(expr)) => {
            let value = eval(expr, frame, ctx)?;
            if frame::update_existing(frame, name, &value) {
                Ok(Value::Void)
            } else {
                Err(EvalError::Unbound(name.clone()))
            }
        }
        _ => Err(EvalError::form("set!", "first argument must be a symbol")),
    }
}

fn eval_lambda(args: &Value, frame: &FrameRef) -> Result<Value> {
    let (formals, body) = match (args.car(), args.cdr()) {
        (Some(formals), Some(body)) if !body.is_null() => (formals, body),
        _ => {
            return Err(EvalError::form(
                "lambda",
                "expected a formals list and at least one body form",
            ))
        }
    };
    Ok(Value::Closure(Rc::new(Closure {
        formals: parse_formals(formals)?,
        body: body.clone(),
        frame: Rc::clone(frame),
    })))
}

/// Validates a formals expression: a proper list of distinct symbols, or a
/// single symbol naming the whole argument list.
fn parse_formals(expr: &Value) -> Result<Formals> {
    match expr {
        Value::Sym(name) => Ok(Formals::Variadic(name.clone())),
        Value::Null | Value::Cons(..) => {
            let mut names: Vec<Name> = Vec::new();
            let mut elems = expr.iter();
            for item in &mut elems {
                match item {
                    Value::Sym(name) => {
                        if names.iter().any(|n| n == name) {
                            return Err(EvalError::DuplicateBinding(name.clone()));
                        }
                        names.push(name.clone());
                    }
                    _ => {
                        return Err(EvalError::form(
                            "lambda",
                            "formal parameters must be symbols",
                        ))
                    }
                }
            }
            if !elems.rest().is_null() {
                return Err(EvalError::form("lambda", "formals must be a proper list"));
            }
            Ok(Formals::Fixed(names))
        }
        _ => Err(EvalError::form("lambda", "formal parameters must be symbols")),
    }
}

// Helpers for the let family
// --------------------------------------------------

fn split_let<'a>(args: &'a Value, form: &'static str) -> Result<(&'a Value, &'a Value)> {
    let (bindings, body) = match (args.car(), args.cdr()) {
        (Some(bindings), Some(body)) => (bindings, body),
        _ => return Err(EvalError::form(form, "expected a bindings list and a body")),
    };
    if bindings.list_len().is_none() {
        return Err(EvalError::form(form, "malformed bindings list"));
    }
    if body.is_null() {
        return Err(EvalError::form(form, "empty body"));
    }
    Ok((bindings, body))
}

fn split_binding<'a>(binding: &'a Value, form: &'static str) -> Result<(&'a Name, &'a Value)> {
    if binding.list_len() != Some(2) {
        return Err(EvalError::form(
            form,
            "bindings must be (identifier expression) pairs",
        ));
    }
    match (binding.car(), binding.cdr().and_then(Value::car)) {
        (Some(Value::Sym(name)), Some(expr)) => Ok((name, expr)),
        _ => Err(EvalError::form(form, "binding identifier must be a symbol")),
    }
}

// Tests
// --------------------------------------------------
