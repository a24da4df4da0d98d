//! Tokenizer for the latch runtime.
//!
//! This crate provides the lexical analysis phase:
//! - `SyntaxKind` - Token types
//! - `ScannerState` - Tokenizer state machine

mod syntax_kind;
pub use syntax_kind::SyntaxKind;

mod scanner;
pub use scanner::ScannerState;

#[cfg(test)]
#[path = "../tests/scanner_tests.rs"]
mod scanner_tests;
