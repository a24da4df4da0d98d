//! Static declaration binder for the latch runtime.
//!
//! The binder is the compile-time half of declaration installation. It walks
//! the AST once and records, for every scope-creating node, the ordered set
//! of names the scope declares. The interpreter replays that table on every
//! scope entry. Duplicate names inside one scope are reported here as
//! diagnostics 2451 and 2300.

mod scopes;
pub use scopes::{Declaration, DeclarationKind, ScopeId, ScopeInfo, ScopeKind};

pub mod state;
mod state_binding;
pub use state::BinderState;

#[cfg(test)]
#[path = "../tests/binder_tests.rs"]
mod binder_tests;
