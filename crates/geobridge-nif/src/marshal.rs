//! Marshaling between host terms and native values
//!
//! Every extractor fails with [`NifError::BadArg`] when the term has the
//! wrong shape. Numbers accept floats and integers, floats tried first.

use crate::error::{NifError, NifResult};
use crate::registry::{Handle, ResourceRef, ResourceType};
use crate::term::{Term, TermMap};
use std::ffi::CString;
use std::sync::Arc;

/// Extract a number as f64
pub fn get_number(term: &Term) -> NifResult<f64> {
    match term {
        Term::Float(x) => Ok(*x),
        Term::Integer(i) => Ok(*i as f64),
        other => Err(NifError::badarg(format!(
            "expected a number, got {}",
            other.type_name()
        ))),
    }
}

/// Extract a tuple of exactly `arity` elements
pub fn get_tuple(term: &Term, arity: usize) -> NifResult<&[Term]> {
    match term.as_tuple() {
        Some(elements) if elements.len() == arity => Ok(elements),
        Some(elements) => Err(NifError::badarg(format!(
            "expected a {}-tuple, got a {}-tuple",
            arity,
            elements.len()
        ))),
        None => Err(NifError::badarg(format!(
            "expected a {}-tuple, got {}",
            arity,
            term.type_name()
        ))),
    }
}

/// `{a, b}` of numbers
pub fn get_pair(term: &Term) -> NifResult<(f64, f64)> {
    let elements = get_tuple(term, 2)?;
    Ok((get_number(&elements[0])?, get_number(&elements[1])?))
}

/// `{x, y, z}` of numbers
pub fn get_triple(term: &Term) -> NifResult<(f64, f64, f64)> {
    let elements = get_tuple(term, 3)?;
    Ok((
        get_number(&elements[0])?,
        get_number(&elements[1])?,
        get_number(&elements[2])?,
    ))
}

/// Copy a binary into a NUL-terminated native string
///
/// The host binary is never borrowed past this call. An embedded NUL cannot
/// be represented and is rejected.
pub fn get_cstring(term: &Term) -> NifResult<CString> {
    let bytes = term.as_binary().ok_or_else(|| {
        NifError::badarg(format!("expected a binary, got {}", term.type_name()))
    })?;

    CString::new(bytes.to_vec())
        .map_err(|e| NifError::badarg(format!("binary contains NUL at byte {}", e.nul_position())))
}

/// Look up an atom key in a map term
pub fn get_map_value<'a>(term: &'a Term, key: &str) -> NifResult<&'a Term> {
    let map = get_map(term)?;
    map.get_atom(key)
        .ok_or_else(|| NifError::badarg(format!("map has no key :{}", key)))
}

fn get_map(term: &Term) -> NifResult<&TermMap> {
    match term {
        Term::Map(map) => Ok(map),
        other => Err(NifError::badarg(format!(
            "expected a map, got {}",
            other.type_name()
        ))),
    }
}

/// Extract the typed handle stored under `key` in a handle map
pub fn get_resource<T: Send + Sync + 'static>(
    term: &Term,
    key: &str,
    kind: &Arc<ResourceType>,
) -> NifResult<Handle<T>> {
    match get_map_value(term, key)? {
        Term::Resource(resource) => resource.downcast::<T>(kind).ok_or_else(|| {
            NifError::badarg(format!(
                "expected a {} resource, got {}",
                kind.name(),
                resource.kind().name()
            ))
        }),
        other => Err(NifError::badarg(format!(
            "expected a resource under :{}, got {}",
            key,
            other.type_name()
        ))),
    }
}

/// Build a struct-like handle map: `%{__struct__: tag, key => resource, ...extra}`
pub fn make_handle_map<T: Send + Sync + 'static>(
    tag: &str,
    key: &str,
    handle: Handle<T>,
    extra: Vec<(&str, Term)>,
) -> Term {
    let mut map = TermMap::new()
        .put(Term::atom("__struct__"), Term::atom(tag))
        .put(Term::atom(key), Term::Resource(ResourceRef::new(handle)));
    for (k, v) in extra {
        map = map.put(Term::atom(k), v);
    }
    Term::Map(map)
}

/// `{:ok, value}` or `{:error, message}`
pub fn make_result<E: std::fmt::Display>(result: Result<Term, E>) -> Term {
    match result {
        Ok(value) => Term::ok(value),
        Err(e) => Term::error(&e.to_string()),
    }
}
