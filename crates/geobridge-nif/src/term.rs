//! Host term representation
//!
//! The dynamic values the host runtime passes into and receives from the
//! bridge.
//! - Integer, Float: immediates
//! - Atom: interned-style symbol (Arc<str>), compared by content
//! - Binary: immutable byte sequence (Arc<[u8]>), used for strings
//! - Tuple: fixed-arity sequence (Arc<[Term]>)
//! - Map: small association list, keyed by terms
//! - Resource: collector-tracked reference to a native handle
//!
//! Cloning a term never copies payloads; it bumps a reference count. A
//! `Resource` term keeps its native handle alive for as long as any clone of
//! it exists, which is how the host collector's reachability is modeled.

use crate::registry::ResourceRef;
use std::fmt;
use std::sync::Arc;

/// Dynamic host value
#[derive(Clone, PartialEq)]
pub enum Term {
    /// Integral number
    Integer(i64),
    /// IEEE 754 double
    Float(f64),
    /// Symbol
    Atom(Arc<str>),
    /// Byte sequence (strings travel as UTF-8 binaries)
    Binary(Arc<[u8]>),
    /// Fixed-arity tuple
    Tuple(Arc<[Term]>),
    /// Association list
    Map(TermMap),
    /// Opaque reference to a native handle
    Resource(ResourceRef),
}

impl Term {
    /// Create an atom
    pub fn atom(name: &str) -> Self {
        Term::Atom(Arc::from(name))
    }

    /// Create a binary from raw bytes
    pub fn binary(bytes: &[u8]) -> Self {
        Term::Binary(Arc::from(bytes))
    }

    /// Create a UTF-8 binary from a string
    pub fn string(s: &str) -> Self {
        Term::binary(s.as_bytes())
    }

    /// Create a tuple
    pub fn tuple(elements: Vec<Term>) -> Self {
        Term::Tuple(Arc::from(elements))
    }

    /// `{:ok, value}`
    pub fn ok(value: Term) -> Self {
        Term::tuple(vec![Term::atom("ok"), value])
    }

    /// `{:error, message}`
    pub fn error(message: &str) -> Self {
        Term::tuple(vec![Term::atom("error"), Term::string(message)])
    }

    /// Atom name, if this is an atom
    pub fn as_atom(&self) -> Option<&str> {
        match self {
            Term::Atom(name) => Some(name),
            _ => None,
        }
    }

    /// Bytes, if this is a binary
    pub fn as_binary(&self) -> Option<&[u8]> {
        match self {
            Term::Binary(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Elements, if this is a tuple
    pub fn as_tuple(&self) -> Option<&[Term]> {
        match self {
            Term::Tuple(elements) => Some(elements),
            _ => None,
        }
    }

    /// Type name for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Term::Integer(_) => "integer",
            Term::Float(_) => "float",
            Term::Atom(_) => "atom",
            Term::Binary(_) => "binary",
            Term::Tuple(_) => "tuple",
            Term::Map(_) => "map",
            Term::Resource(_) => "resource",
        }
    }
}

impl fmt::Debug for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Integer(i) => write!(f, "{}", i),
            Term::Float(x) => write!(f, "{:?}", x),
            Term::Atom(name) => write!(f, ":{}", name),
            Term::Binary(bytes) => match std::str::from_utf8(bytes) {
                Ok(s) => write!(f, "{:?}", s),
                Err(_) => write!(f, "<<{} bytes>>", bytes.len()),
            },
            Term::Tuple(elements) => {
                write!(f, "{{")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?}", element)?;
                }
                write!(f, "}}")
            }
            Term::Map(map) => write!(f, "{:?}", map),
            Term::Resource(resource) => write!(f, "{:?}", resource),
        }
    }
}

impl From<f64> for Term {
    fn from(value: f64) -> Self {
        Term::Float(value)
    }
}

impl From<i64> for Term {
    fn from(value: i64) -> Self {
        Term::Integer(value)
    }
}

impl From<i32> for Term {
    fn from(value: i32) -> Self {
        Term::Integer(value as i64)
    }
}

impl From<&str> for Term {
    fn from(value: &str) -> Self {
        Term::string(value)
    }
}

impl From<ResourceRef> for Term {
    fn from(value: ResourceRef) -> Self {
        Term::Resource(value)
    }
}

impl<A: Into<Term>, B: Into<Term>> From<(A, B)> for Term {
    fn from((a, b): (A, B)) -> Self {
        Term::tuple(vec![a.into(), b.into()])
    }
}

impl<A: Into<Term>, B: Into<Term>, C: Into<Term>> From<(A, B, C)> for Term {
    fn from((a, b, c): (A, B, C)) -> Self {
        Term::tuple(vec![a.into(), b.into(), c.into()])
    }
}

/// Immutable association list. Cheap to clone.
///
/// Insertion order is preserved; `put` replaces an existing key in place.
#[derive(Clone, PartialEq, Default)]
pub struct TermMap(Arc<Vec<(Term, Term)>>);

impl TermMap {
    pub fn new() -> Self {
        TermMap(Arc::new(Vec::new()))
    }

    /// Return a map with `key` bound to `value` (copy-on-write)
    pub fn put(mut self, key: Term, value: Term) -> Self {
        let entries = Arc::make_mut(&mut self.0);
        match entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => entries.push((key, value)),
        }
        self
    }

    pub fn get(&self, key: &Term) -> Option<&Term> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Lookup by atom key
    pub fn get_atom(&self, key: &str) -> Option<&Term> {
        self.0
            .iter()
            .find(|(k, _)| k.as_atom() == Some(key))
            .map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Term, Term)> {
        self.0.iter()
    }
}

impl fmt::Debug for TermMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{{")?;
        for (i, (k, v)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:?} => {:?}", k, v)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tuple_from_rust_tuple() {
        let term: Term = (1.5, 2).into();
        assert_eq!(
            term,
            Term::tuple(vec![Term::Float(1.5), Term::Integer(2)])
        );
    }

    #[test]
    fn test_ok_and_error_shapes() {
        let ok = Term::ok(Term::Integer(1));
        assert_eq!(ok.as_tuple().unwrap()[0].as_atom(), Some("ok"));

        let err = Term::error("boom");
        let elements = err.as_tuple().unwrap();
        assert_eq!(elements[0].as_atom(), Some("error"));
        assert_eq!(elements[1].as_binary(), Some(&b"boom"[..]));
    }

    #[test]
    fn test_map_put_replaces_existing_key() {
        let map = TermMap::new()
            .put(Term::atom("a"), Term::Integer(1))
            .put(Term::atom("b"), Term::Integer(2))
            .put(Term::atom("a"), Term::Integer(3));

        assert_eq!(map.len(), 2);
        assert_eq!(map.get_atom("a"), Some(&Term::Integer(3)));
        assert_eq!(map.get(&Term::atom("b")), Some(&Term::Integer(2)));
        assert_eq!(map.get_atom("c"), None);
    }

    #[test]
    fn test_map_clone_is_copy_on_write() {
        let shared = TermMap::new().put(Term::atom("a"), Term::Integer(1));
        let changed = shared.clone().put(Term::atom("a"), Term::Integer(2));

        assert_eq!(shared.get_atom("a"), Some(&Term::Integer(1)));
        assert_eq!(changed.get_atom("a"), Some(&Term::Integer(2)));
    }

    #[test]
    fn test_debug_formatting() {
        let term = Term::tuple(vec![Term::atom("ok"), Term::string("hi"), Term::Float(1.0)]);
        assert_eq!(format!("{:?}", term), "{:ok, \"hi\", 1.0}");
    }
}
