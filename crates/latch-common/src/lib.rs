//! Common types and utilities for the latch runtime.
//!
//! This crate provides foundational types used across all latch crates:
//! - Diagnostics (`Diagnostic`, `DiagnosticCategory`, codes and message templates)
//! - Source spans (`Span`)
//! - Line/column mapping for diagnostics (`LineMap`)
//! - Runtime and front-end limits

// Diagnostic types, codes and templates
pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticRelatedInformation};

// Span - Source location tracking (byte offsets)
pub mod span;
pub use span::Span;

// Centralized limits and thresholds
pub mod limits;

// Line/column lookup for byte offsets
pub mod position;
pub use position::{LineMap, Position};

#[cfg(test)]
#[path = "../tests/diagnostics_tests.rs"]
mod diagnostics_tests;
#[cfg(test)]
#[path = "../tests/position_tests.rs"]
mod position_tests;
