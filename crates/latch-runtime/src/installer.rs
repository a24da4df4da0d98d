//! Scope-entry declaration installation.
//!
//! Replays a binder [`ScopeInfo`] against a fresh record before any
//! statement of the scope runs.

use std::rc::Rc;

use latch_binder::{DeclarationKind, ScopeInfo};
use tracing::trace;

use crate::environment::Env;
use crate::error::BindingError;
use crate::value::Value;

/// Create every entry `scope` declares in `env`, in textual order.
///
/// Function declarations are initialized to closures over `env`;
/// parameters take the matching element of `arguments` (or `undefined`).
/// Catch parameters and `for-of` bindings are created here and initialized
/// by the caller.
pub fn install_declarations(
    env: &Env,
    scope: &ScopeInfo,
    arguments: &[Value],
) -> Result<(), BindingError> {
    let mut next_argument = 0;
    for decl in scope.iter() {
        let name = decl.name.as_str();
        match decl.kind {
            DeclarationKind::Let | DeclarationKind::CatchParameter => {
                env.create_mutable_binding(name)?;
            }
            DeclarationKind::Const if decl.has_initializer => {
                env.create_immutable_binding_awaiting_initializer(name)?;
            }
            DeclarationKind::Const => env.create_immutable_binding(name)?,
            DeclarationKind::Function => {
                env.create_mutable_binding(name)?;
                let closure = Value::closure(decl.declaration, env, Some(Rc::from(name)));
                env.initialize_binding(name, closure)?;
            }
            DeclarationKind::Parameter => {
                env.create_mutable_binding(name)?;
                let value = arguments
                    .get(next_argument)
                    .cloned()
                    .unwrap_or(Value::Undefined);
                next_argument += 1;
                env.initialize_binding(name, value)?;
            }
        }
    }
    trace!(
        scope = ?scope.kind,
        bindings = scope.declarations.len(),
        "installed declarations"
    );
    Ok(())
}
