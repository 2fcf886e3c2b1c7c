//! Assigns names to symbols.
//!
//! Scheme is a homoiconic language, meaning the syntactic structures which
//! appear in the source code are equivalent to the structures being
//! manipulated by the program. Symbols are compared constantly, both by the
//! evaluator (environment lookup, special-form dispatch) and by user code
//! (`eq?`), so we must use a lightweight representation for them.
//!
//! This lightweight representation is the [`Name`]. A `Name` is a shared
//! string slice whose equality check is a pointer comparison in the common
//! case, falling back to byte equality so that names are equal exactly when
//! their text is equal.
//!
//! To ensure that all equivalent strings are usually represented by the same
//! allocation, we employ a [`NameSpace`]. A `NameSpace` is essentially a
//! string interner. It takes ownership of strings and issues corresponding
//! `Name`s sharing a single allocation per unique spelling.
//!
//! [`NameSpace`]: ./struct.NameSpace.html
//! [`Name`]: ./struct.Name.html

use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

/// Assigns `Name`s to strings.
///
/// Equivalent strings will be assigned `Name`s sharing one allocation.
///
/// A `NameSpace` is effectively a string interner. The interpreter is
/// single-threaded, so interior mutability through a `RefCell` suffices.
pub struct NameSpace {
    strings: RefCell<HashSet<Rc<str>>>,
}

/// A lightweight representation of a symbol's text.
///
/// A `Name` compares equal to another exactly when their text is equal;
/// names issued by the same `NameSpace` hit the pointer-equality fast path.
#[derive(Clone)]
pub struct Name(Rc<str>);

// NameSpace
// --------------------------------------------------

impl NameSpace {
    /// Constructs a new `NameSpace`.
    pub fn new() -> NameSpace {
        NameSpace {
            strings: RefCell::new(HashSet::new()),
        }
    }

    /// Returns a `Name` for the token.
    pub fn name<S>(&self, tok: S) -> Name
    where
        S: Into<String> + AsRef<str>,
    {
        {
            let strings = self.strings.borrow();
            if let Some(s) = strings.get(tok.as_ref()) {
                return Name(s.clone());
            }
        }
        let mut strings = self.strings.borrow_mut();
        let s: Rc<str> = Rc::from(tok.into().into_boxed_str());
        strings.insert(s.clone());
        Name(s)
    }

    /// Returns the number of unique `Name`s issued.
    pub fn len(&self) -> usize {
        self.strings.borrow().len()
    }
}

// Name
// --------------------------------------------------

impl Name {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Name) -> bool {
        Rc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl Eq for Name {}

impl AsRef<str> for Name {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Deref for Name {
    type Target = str;
    fn deref(&self) -> &str {
        self.as_str()
    }
}

impl PartialOrd for Name {
    fn partial_cmp(&self, other: &Name) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Name {
    fn cmp(&self, other: &Name) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

// Tests
// --------------------------------------------------
