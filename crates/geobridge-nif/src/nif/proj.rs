use super::NifFunc;
use crate::error::NifResult;
use crate::lifecycle::Bridge;
use crate::marshal::{get_cstring, get_triple, make_result};
use crate::projection;
use crate::term::Term;

pub(super) const FUNCS: &[NifFunc] = &[
    NifFunc {
        name: "from_def",
        arity: 1,
        fun: from_def,
    },
    NifFunc {
        name: "wgs84",
        arity: 0,
        fun: wgs84,
    },
    NifFunc {
        name: "transform",
        arity: 3,
        fun: transform,
    },
    NifFunc {
        name: "get_def",
        arity: 1,
        fun: get_def,
    },
];

/// `from_def(definition)` -> `{:ok, handle}` | `{:error, message}`
fn from_def(bridge: &Bridge, args: &[Term]) -> NifResult<Term> {
    let definition = get_cstring(&args[0])?;

    let result = projection::construct(bridge.proj_type(), &definition)
        .map(projection::to_term)
        .map_err(|e| e.message());
    Ok(make_result(result))
}

fn wgs84(bridge: &Bridge, _args: &[Term]) -> NifResult<Term> {
    Ok(projection::to_term(bridge.default_projection()?))
}

/// `transform(src, dst, {x, y, z})` -> `{:ok, {x, y, z}}` | `{:error, message}`
fn transform(bridge: &Bridge, args: &[Term]) -> NifResult<Term> {
    let src = projection::from_term(&args[0], bridge.proj_type())?;
    let dst = projection::from_term(&args[1], bridge.proj_type())?;
    let point = get_triple(&args[2])?;

    let result = src
        .get()
        .transform(dst.get(), point)
        .map(Term::from)
        .map_err(|e| e.message());
    Ok(make_result(result))
}

fn get_def(bridge: &Bridge, args: &[Term]) -> NifResult<Term> {
    let handle = projection::from_term(&args[0], bridge.proj_type())?;
    Ok(Term::string(handle.get().definition()))
}
