//! Interpreter state: options, scope entry, calls and the job queue.

use std::collections::VecDeque;
use std::rc::Rc;

use latch_binder::BinderState;
use latch_common::Span;
use latch_common::diagnostics::{Diagnostic, diagnostic_codes};
use latch_common::limits::{
    DEFAULT_MAX_CALL_DEPTH, MAX_CALL_DEPTH_CEILING, MAX_JOB_DRAIN, STACK_GROW_SIZE, STACK_RED_ZONE,
};
use latch_parser::{NodeArena, NodeIndex};
use tracing::{debug, trace, warn};

use crate::environment::{Env, EnvironmentRecord};
use crate::error::{ErrorFamily, RuntimeError};
use crate::installer::install_declarations;
use crate::value::{FunctionValue, Value};

/// Knobs for one run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RuntimeOptions {
    /// Nested calls allowed before a `RangeError`; clamped to
    /// [`MAX_CALL_DEPTH_CEILING`].
    pub max_call_depth: u32,
    /// Run queued jobs after the script completes.
    pub drain_jobs: bool,
    /// Write `print` output to stdout as it happens, in addition to
    /// collecting it in [`RunReport::output`].
    pub echo_output: bool,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        RuntimeOptions {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            drain_jobs: true,
            echo_output: false,
        }
    }
}

/// An error that escaped the script or a job.
#[derive(Clone, Debug)]
pub struct UncaughtError {
    pub error: RuntimeError,
    /// Innermost statement executing when the error was raised.
    pub span: Option<Span>,
}

impl UncaughtError {
    #[must_use]
    pub fn family(&self) -> Option<ErrorFamily> {
        self.error.family()
    }

    /// `Uncaught ReferenceError: ...`
    #[must_use]
    pub fn message(&self) -> String {
        format!("Uncaught {}", self.error.describe())
    }

    /// Render as a diagnostic located at the faulting statement.
    #[must_use]
    pub fn to_diagnostic(&self, file: &str) -> Diagnostic {
        let span = self.span.unwrap_or_default();
        Diagnostic::error(
            file.to_string(),
            span.start,
            span.len(),
            self.message(),
            diagnostic_codes::UNCAUGHT_EXCEPTION,
        )
    }
}

/// Result of [`Interpreter::run`].
#[derive(Debug, Default)]
pub struct RunReport {
    /// Lines written by `print`.
    pub output: Vec<String>,
    /// Uncaught errors from the script and from jobs, in order.
    pub uncaught: Vec<UncaughtError>,
    pub jobs_run: usize,
}

impl RunReport {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.uncaught.is_empty()
    }
}

/// Normal or abrupt statement completion other than an error.
#[derive(Clone, Debug)]
pub(crate) enum Completion {
    Normal,
    Return(Value),
    Break,
    Continue,
}

/// Evaluates one bound program.
pub struct Interpreter<'a> {
    pub(crate) arena: &'a NodeArena,
    pub(crate) binder: &'a BinderState,
    pub(crate) options: RuntimeOptions,
    global: Env,
    pub(crate) call_depth: u32,
    pub(crate) jobs: VecDeque<Value>,
    pub(crate) output: Vec<String>,
    /// Span of the innermost statement of the error in flight.
    pub(crate) fault_span: Option<Span>,
}

impl<'a> Interpreter<'a> {
    #[must_use]
    pub fn new(arena: &'a NodeArena, binder: &'a BinderState, options: RuntimeOptions) -> Self {
        let options = RuntimeOptions {
            max_call_depth: options.max_call_depth.min(MAX_CALL_DEPTH_CEILING),
            ..options
        };
        let global = EnvironmentRecord::new_global();
        super::builtins::install_globals(&global);
        Interpreter {
            arena,
            binder,
            options,
            global,
            call_depth: 0,
            jobs: VecDeque::new(),
            output: Vec::new(),
            fault_span: None,
        }
    }

    /// The record holding host globals; the script record nests inside it.
    #[must_use]
    pub fn global(&self) -> &Env {
        &self.global
    }

    #[must_use]
    pub fn pending_jobs(&self) -> usize {
        self.jobs.len()
    }

    #[must_use]
    pub const fn options(&self) -> &RuntimeOptions {
        &self.options
    }

    /// Run the script, then drain the job queue if enabled.
    #[tracing::instrument(level = "debug", skip(self), fields(root = root.0))]
    pub fn run(&mut self, root: NodeIndex) -> RunReport {
        let mut uncaught = Vec::new();
        if let Err(error) = self.run_script(root) {
            uncaught.push(self.uncaught(error));
        }
        let jobs_run = if self.options.drain_jobs {
            self.drain_jobs(&mut uncaught)
        } else {
            0
        };
        RunReport {
            output: std::mem::take(&mut self.output),
            uncaught,
            jobs_run,
        }
    }

    /// Execute the top-level statements in a fresh script record.
    pub fn run_script(&mut self, root: NodeIndex) -> Result<(), RuntimeError> {
        let global = Rc::clone(&self.global);
        let env = self.enter_scope(root, &global, &[])?;
        let arena = self.arena;
        if let Some(statements) = arena.statements(root) {
            self.exec_statements(statements, &env)?;
        }
        Ok(())
    }

    /// Run queued jobs in FIFO order until the queue is empty. Errors from a
    /// job are recorded and the next job still runs.
    pub fn drain_jobs(&mut self, uncaught: &mut Vec<UncaughtError>) -> usize {
        let mut ran = 0;
        while let Some(job) = self.jobs.pop_front() {
            if ran >= MAX_JOB_DRAIN {
                warn!(limit = MAX_JOB_DRAIN, "job queue limit reached");
                self.jobs.clear();
                uncaught.push(UncaughtError {
                    error: RuntimeError::JobQueueLimit {
                        limit: MAX_JOB_DRAIN,
                    },
                    span: None,
                });
                break;
            }
            ran += 1;
            trace!(remaining = self.jobs.len(), "running job");
            if let Err(error) = self.call_value(&job, &[]) {
                uncaught.push(self.uncaught(error));
            }
        }
        debug!(jobs = ran, "job queue drained");
        ran
    }

    fn uncaught(&mut self, error: RuntimeError) -> UncaughtError {
        debug!(error = %error, "uncaught error");
        UncaughtError {
            error,
            span: self.fault_span.take(),
        }
    }

    /// Fresh record for the scope `node` creates, with its declarations
    /// installed; `outer` itself when the node declares nothing.
    pub(crate) fn enter_scope(
        &self,
        node: NodeIndex,
        outer: &Env,
        arguments: &[Value],
    ) -> Result<Env, RuntimeError> {
        let Some(scope) = self.binder.scope_for_node(node) else {
            return Ok(Rc::clone(outer));
        };
        let env = EnvironmentRecord::new_declarative(outer);
        install_declarations(&env, scope, arguments)?;
        Ok(env)
    }

    // =========================================================================
    // Calls
    // =========================================================================

    /// Call a function value with already-evaluated arguments.
    pub fn call_value(&mut self, callee: &Value, arguments: &[Value]) -> Result<Value, RuntimeError> {
        match callee {
            Value::Native(native) => self.call_native(*native, arguments),
            Value::Function(function) => self.call_closure(function, arguments),
            other => Err(RuntimeError::type_error(format!(
                "{} is not a function",
                other.to_display_string()
            ))),
        }
    }

    #[tracing::instrument(level = "trace", skip(self, function, arguments), fields(function = function.closure().function.0))]
    fn call_closure(
        &mut self,
        function: &FunctionValue,
        arguments: &[Value],
    ) -> Result<Value, RuntimeError> {
        if self.call_depth >= self.options.max_call_depth {
            return Err(RuntimeError::CallDepthExceeded {
                limit: self.options.max_call_depth,
            });
        }
        self.call_depth += 1;
        let result = stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
            self.run_function_body(function, arguments)
        });
        self.call_depth -= 1;
        result
    }

    fn run_function_body(
        &mut self,
        function: &FunctionValue,
        arguments: &[Value],
    ) -> Result<Value, RuntimeError> {
        let arena = self.arena;
        let node = function.closure().function;
        let (Some(func), Some(captured)) = (arena.function(node), function.env()) else {
            return Err(RuntimeError::type_error("callee is not a function"));
        };
        let env = self.enter_scope(node, &captured, arguments)?;
        let Some(statements) = arena.statements(func.body) else {
            return Ok(Value::Undefined);
        };
        match self.exec_statements(statements, &env)? {
            Completion::Return(value) => Ok(value),
            Completion::Normal | Completion::Break | Completion::Continue => Ok(Value::Undefined),
        }
    }
}
