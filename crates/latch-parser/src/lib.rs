//! Parser and AST types for the latch runtime.
//!
//! The AST lives in a [`NodeArena`]; nodes refer to each other by
//! [`NodeIndex`]. [`ParserState`] drives the scanner and builds the arena,
//! collecting diagnostics instead of stopping at the first error.

pub mod parser;

pub use parser::node::{
    FunctionData, Node, NodeArena, NodeData, NodeFlags, NodeIndex, NodeList, VariableKind,
};
pub use parser::state::ParserState;
