//! Centralized limits and thresholds for the latch runtime.
//!
//! Recursion depths and iteration caps live here so the parser, binder and
//! interpreter agree on them and so the CLI can expose the ones that make
//! sense to tune.

// =============================================================================
// Recursion Depth Limits
// =============================================================================

/// Maximum nesting depth for expressions and statements in the parser.
///
/// Each nested parenthesis, block or unary operator adds a frame to the
/// recursive-descent parser. Past this depth the parser reports
/// `MAXIMUM_NESTING_DEPTH_EXCEEDED` and stops descending.
///
/// ```text
/// const x = ((((((((((((((((((((1))))))))))))))))))));   // fine
/// const y = -(-(-(-(-( /* ... 500 levels ... */ )))));  // rejected
/// ```
pub const MAX_PARSE_DEPTH: u32 = 500;

/// Default maximum depth of nested function calls in the interpreter.
///
/// Exceeding it raises a `RangeError` instead of overflowing the native
/// stack. Configurable through `runtime.maxCallDepth` in `latch.json` or
/// `--max-call-depth`.
///
/// ```text
/// function f() { return f(); }
/// f();   // Uncaught RangeError: Maximum call stack size exceeded
/// ```
pub const DEFAULT_MAX_CALL_DEPTH: u32 = 512;

/// Hard ceiling for a configured call depth. Larger values are clamped.
pub const MAX_CALL_DEPTH_CEILING: u32 = 4_096;

// =============================================================================
// Native Stack
// =============================================================================

/// Remaining native stack below which the interpreter switches to a fresh
/// segment before recursing.
///
/// Calls, statements and expressions all recurse on the host stack, which
/// may be a 2 MiB spawned or test thread.
pub const STACK_RED_ZONE: usize = 128 * 1024;

/// Size of each stack segment allocated when the red zone is reached.
pub const STACK_GROW_SIZE: usize = 4 * 1024 * 1024;

// =============================================================================
// Operation Counts
// =============================================================================

/// Maximum number of outer-record hops while resolving one name.
///
/// Environment chains only point outward and are created one record per
/// scope entry, so a legitimate chain is bounded by lexical nesting. The cap
/// turns a corrupted chain into a resolution failure rather than a hang.
pub const MAX_SCOPE_WALK_ITERATIONS: usize = 10_000;

/// Maximum number of jobs drained after a script completes.
///
/// A job that re-enqueues itself forever would otherwise never let the
/// runtime finish:
///
/// ```text
/// function spin() { queueMicrotask(spin); }
/// spin();
/// ```
pub const MAX_JOB_DRAIN: usize = 100_000;

/// Largest index an element assignment may write.
///
/// Writing past the end of an array fills the gap with `undefined`, so an
/// unchecked `xs[1e12] = 1` would try to allocate the whole gap.
pub const MAX_ARRAY_LENGTH: usize = 1 << 24;
