//! Shared helpers for bridge integration tests

#![allow(dead_code)]

use geobridge_config::BridgeConfig;
use geobridge_nif::{Bridge, NifResult, ResourceRegistry, Term};
use std::sync::Arc;

/// Load a bridge with default configuration on a fresh registry
pub fn load_bridge() -> Bridge {
    Bridge::load(Arc::new(ResourceRegistry::new()), &BridgeConfig::default())
        .expect("default bridge should load")
}

/// Call and expect an exception-free result
pub fn call(bridge: &Bridge, module: &str, name: &str, args: &[Term]) -> Term {
    bridge
        .call(module, name, args)
        .unwrap_or_else(|e| panic!("{}.{} raised {}", module, name, e))
}

pub fn try_call(bridge: &Bridge, module: &str, name: &str, args: &[Term]) -> NifResult<Term> {
    bridge.call(module, name, args)
}

pub fn float(term: &Term) -> f64 {
    match term {
        Term::Float(x) => *x,
        other => panic!("Expected float, got {:?}", other),
    }
}

pub fn elements(term: &Term, arity: usize) -> Vec<Term> {
    match term.as_tuple() {
        Some(elements) if elements.len() == arity => elements.to_vec(),
        _ => panic!("Expected {}-tuple, got {:?}", arity, term),
    }
}

/// Unwrap `{:ok, value}`
pub fn ok_value(term: &Term) -> Term {
    let pair = elements(term, 2);
    assert_eq!(pair[0].as_atom(), Some("ok"), "Expected {{:ok, _}}, got {:?}", term);
    pair[1].clone()
}

/// Unwrap `{:error, message}`
pub fn error_message(term: &Term) -> String {
    let pair = elements(term, 2);
    assert_eq!(pair[0].as_atom(), Some("error"), "Expected {{:error, _}}, got {:?}", term);
    let bytes = pair[1].as_binary().expect("error message is a binary");
    String::from_utf8(bytes.to_vec()).expect("error message is UTF-8")
}

pub fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "Expected {} within {}, got {}",
        expected,
        tolerance,
        actual
    );
}

pub fn point(a: f64, b: f64) -> Term {
    (a, b).into()
}

pub fn point3(x: f64, y: f64, z: f64) -> Term {
    (x, y, z).into()
}
