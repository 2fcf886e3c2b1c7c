//! Environment frames supporting lexical scope.
//!
//! A [`Frame`] is an ordered list of bindings plus a link to a parent frame;
//! a chain of frames encodes one lexical scope. Frames are created by the
//! `let` family and by procedure application, and the top-level frame is
//! created once and seeded with the primitives.
//!
//! Frames are shared: every closure holds the frame it captured, and child
//! frames hold their parent. Sharing is `Rc<RefCell<...>>` — the interpreter
//! is single-threaded, and `define`/`set!` must mutate a frame in place so
//! that every closure which captured it observes the update.
//!
//! [`Frame`]: ./struct.Frame.html

use std::cell::RefCell;
use std::rc::Rc;

use crate::repr::Value;
use crate::syntax::Name;

/// A shared, mutable frame.
pub type FrameRef = Rc<RefCell<Frame>>;

/// One environment node: bindings plus an optional parent.
pub struct Frame {
    bindings: Vec<(Name, Value)>,
    parent: Option<FrameRef>,
}

impl Frame {
    /// Constructs the top-level frame, which has no parent.
    pub fn top_level() -> FrameRef {
        Rc::new(RefCell::new(Frame {
            bindings: Vec::new(),
            parent: None,
        }))
    }

    /// Constructs an empty frame whose parent is `parent`.
    pub fn child(parent: &FrameRef) -> FrameRef {
        Rc::new(RefCell::new(Frame {
            bindings: Vec::new(),
            parent: Some(Rc::clone(parent)),
        }))
    }

    /// True iff this frame has no parent.
    pub fn is_top_level(&self) -> bool {
        self.parent.is_none()
    }

    /// Searches only this frame's own bindings.
    pub fn is_bound_local(&self, name: &Name) -> bool {
        self.bindings.iter().any(|(n, _)| n == name)
    }

    /// Adds a binding to this frame.
    ///
    /// Returns false without binding if the identifier is already bound
    /// here; the caller reports the duplicate with its own diagnostic.
    pub fn bind_local(&mut self, name: Name, value: Value) -> bool {
        if self.is_bound_local(&name) {
            return false;
        }
        self.bindings.push((name, value));
        true
    }

    /// Adds a binding, overwriting in place if the identifier is already
    /// bound in this frame. This is `define`'s behavior (and how the
    /// primitives are seeded).
    pub fn bind_or_update_global(&mut self, name: Name, value: Value) {
        if let Some(entry) = self.bindings.iter_mut().rev().find(|(n, _)| *n == name) {
            entry.1 = value;
            return;
        }
        self.bindings.push((name, value));
    }
}

/// Resolves a symbol against a frame chain.
///
/// Walks the bindings of `frame` newest-first, then recurses to the parent.
/// Returns `None` when no frame in the chain binds the name.
pub fn lookup(frame: &FrameRef, name: &Name) -> Option<Value> {
    let mut cur = Rc::clone(frame);
    loop {
        let next = {
            let f = cur.borrow();
            if let Some((_, value)) = f.bindings.iter().rev().find(|(n, _)| n == name) {
                return Some(value.clone());
            }
            f.parent.clone()
        };
        match next {
            Some(parent) => cur = parent,
            None => return None,
        }
    }
}

/// Mutates the nearest enclosing binding for a symbol.
///
/// This is `set!`: the binding must already exist. Returns false when no
/// frame in the chain binds the name.
pub fn update_existing(frame: &FrameRef, name: &Name, value: &Value) -> bool {
    let mut cur = Rc::clone(frame);
    loop {
        let next = {
            let mut f = cur.borrow_mut();
            if let Some(entry) = f.bindings.iter_mut().rev().find(|(n, _)| n == name) {
                entry.1 = value.clone();
                return true;
            }
            f.parent.clone()
        };
        match next {
            Some(parent) => cur = parent,
            None => return false,
        }
    }
}

// Tests
// --------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::syntax::NameSpace;

    #[test]
    fn bind_and_lookup() {
        let ns = NameSpace::new();
        let top = Frame::top_level();
        assert!(top.borrow_mut().bind_local(ns.name("x"), Value::Int(1)));
        assert_eq!(format!("{:?}", lookup(&top, &ns.name("x"))), "Some(1)");
        assert!(lookup(&top, &ns.name("y")).is_none());
    }

    #[test]
    fn duplicates_are_refused_locally() {
        let ns = NameSpace::new();
        let top = Frame::top_level();
        assert!(top.borrow_mut().bind_local(ns.name("x"), Value::Int(1)));
        assert!(!top.borrow_mut().bind_local(ns.name("x"), Value::Int(2)));
        assert!(top.borrow().is_bound_local(&ns.name("x")));
    }

    #[test]
    fn child_frames_shadow() {
        let ns = NameSpace::new();
        let top = Frame::top_level();
        top.borrow_mut().bind_local(ns.name("x"), Value::Int(1));
        let child = Frame::child(&top);
        assert!(!child.borrow().is_top_level());
        // Falls through to the parent.
        assert_eq!(format!("{:?}", lookup(&child, &ns.name("x"))), "Some(1)");
        // A local binding shadows it.
        child.borrow_mut().bind_local(ns.name("x"), Value::Int(2));
        assert_eq!(format!("{:?}", lookup(&child, &ns.name("x"))), "Some(2)");
        assert_eq!(format!("{:?}", lookup(&top, &ns.name("x"))), "Some(1)");
    }

    #[test]
    fn update_walks_to_the_nearest_binding() {
        let ns = NameSpace::new();
        let top = Frame::top_level();
        top.borrow_mut().bind_local(ns.name("x"), Value::Int(1));
        let child = Frame::child(&top);
        assert!(update_existing(&child, &ns.name("x"), &Value::Int(9)));
        assert_eq!(format!("{:?}", lookup(&top, &ns.name("x"))), "Some(9)");
        assert!(!update_existing(&child, &ns.name("missing"), &Value::Int(0)));
    }

    #[test]
    fn global_rebinding_overwrites_in_place() {
        let ns = NameSpace::new();
        let top = Frame::top_level();
        top.borrow_mut().bind_or_update_global(ns.name("x"), Value::Int(1));
        top.borrow_mut().bind_or_update_global(ns.name("x"), Value::Int(2));
        assert_eq!(format!("{:?}", lookup(&top, &ns.name("x"))), "Some(2)");
    }

    #[test]
    fn shared_frames_observe_updates() {
        let ns = NameSpace::new();
        let top = Frame::top_level();
        top.borrow_mut().bind_local(ns.name("x"), Value::Int(1));
        let alias = Rc::clone(&top);
        assert!(update_existing(&top, &ns.name("x"), &Value::Int(5)));
        assert_eq!(format!("{:?}", lookup(&alias, &ns.name("x"))), "Some(5)");
    }
}
