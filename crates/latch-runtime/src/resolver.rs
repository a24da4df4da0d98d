//! Outward name lookup along an environment chain.

use std::rc::Rc;

use latch_common::limits::MAX_SCOPE_WALK_ITERATIONS;
use tracing::trace;

use crate::environment::Env;
use crate::error::BindingError;

/// Innermost record on the chain starting at `env` that declares `name`.
#[must_use]
pub fn try_resolve(env: &Env, name: &str) -> Option<Env> {
    let mut current = Some(env);
    let mut hops = 0;
    while let Some(record) = current {
        if record.has_binding(name) {
            trace!(binding = name, hops, "resolved");
            return Some(Rc::clone(record));
        }
        hops += 1;
        if hops >= MAX_SCOPE_WALK_ITERATIONS {
            break;
        }
        current = record.outer();
    }
    None
}

/// Like [`try_resolve`], failing with `UnresolvedReference`.
pub fn resolve(env: &Env, name: &str) -> Result<Env, BindingError> {
    try_resolve(env, name).ok_or_else(|| BindingError::UnresolvedReference {
        name: name.to_string(),
    })
}
