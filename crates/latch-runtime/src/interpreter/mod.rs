//! Tree-walking evaluator.
//!
//! - `state` - `Interpreter` core: options, scope entry, calls, job queue
//! - `state_statements` - statement execution and completions
//! - `state_expressions` - expression evaluation, references and operators
//! - `builtins` - global record contents and host functions

mod builtins;
pub mod state;
mod state_expressions;
mod state_statements;

pub use state::{Interpreter, RunReport, RuntimeOptions, UncaughtError};
