//! Parser implementation.
//!
//! - `node` - AST node types and the `NodeArena`
//! - `node_arena` - node creation and access helpers
//! - `state` - `ParserState` core: token handling, diagnostics, entry point
//! - `state_statements` - statement and declaration parsing
//! - `state_expressions` - expression parsing (precedence climbing)

pub mod node;
mod node_arena;
pub mod state;
mod state_expressions;
mod state_statements;

#[cfg(test)]
#[path = "../../tests/parser_tests.rs"]
mod parser_tests;
