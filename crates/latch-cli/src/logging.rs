//! Diagnostic logging for the `latch` binary.
//!
//! `LATCH_LOG` takes `tracing` filter directives, or one of the shorthands
//! below in place of a directive; `RUST_LOG` is read only when `LATCH_LOG`
//! is unset. Nothing is installed when neither is set. Logs go to stderr so
//! they never interleave with script output.
//!
//! | Shorthand  | Expands to                                                                     |
//! |------------|--------------------------------------------------------------------------------|
//! | `bindings` | `latch_runtime::environment`, `latch_runtime::installer` and `latch_runtime::resolver` at `trace` |
//! | `calls`    | `latch_runtime::interpreter` at `trace`: one span per run and per closure call |
//! | `jobs`     | `latch_runtime::interpreter` at `debug`: queued, drained and uncaught jobs     |
//! | `frontend` | `latch_parser` and `latch_binder` at `debug`                                   |
//!
//! ```bash
//! # Every entry transition, nested under the call that caused it
//! LATCH_LOG=bindings,calls LATCH_LOG_FORMAT=tree latch run script.lt
//!
//! # Write-once commits and rejected writes only
//! LATCH_LOG=latch_runtime::environment=debug latch run script.lt
//! ```
//!
//! `LATCH_LOG_FORMAT` picks `text` (default), `tree` or `json`.

use anyhow::{Context, Result};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

const SHORTHANDS: &[(&str, &str)] = &[
    (
        "bindings",
        "latch_runtime::environment=trace,latch_runtime::installer=trace,latch_runtime::resolver=trace",
    ),
    ("calls", "latch_runtime::interpreter=trace"),
    ("jobs", "latch_runtime::interpreter=debug"),
    ("frontend", "latch_parser=debug,latch_binder=debug"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    /// Indented by span via `tracing-tree`.
    Tree,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    /// Parse a `LATCH_LOG_FORMAT` value; anything unknown is `Text`.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "tree" => LogFormat::Tree,
            "json" => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }
}

/// Replace shorthand names in a comma-separated directive list. Anything
/// that is not a shorthand is passed through untouched.
#[must_use]
pub fn expand_shorthands(value: &str) -> String {
    value
        .split(',')
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(|piece| {
            SHORTHANDS
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(piece))
                .map_or(piece, |&(_, directives)| directives)
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// What to log and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// Expanded `EnvFilter` directives.
    pub directives: String,
    pub format: LogFormat,
}

impl LogSettings {
    /// Settings from the values of `LATCH_LOG`, `RUST_LOG` and
    /// `LATCH_LOG_FORMAT`; `None` when logging is off.
    #[must_use]
    pub fn from_vars(
        latch_log: Option<&str>,
        rust_log: Option<&str>,
        format: Option<&str>,
    ) -> Option<Self> {
        let directives = match latch_log {
            Some(value) => expand_shorthands(value),
            None => rust_log?.trim().to_string(),
        };
        Some(LogSettings {
            directives,
            format: format.map(LogFormat::parse).unwrap_or_default(),
        })
    }

    #[must_use]
    pub fn from_env() -> Option<Self> {
        let var = |name| std::env::var(name).ok();
        Self::from_vars(
            var("LATCH_LOG").as_deref(),
            var("RUST_LOG").as_deref(),
            var("LATCH_LOG_FORMAT").as_deref(),
        )
    }

    /// Unparseable directives are dropped rather than rejected.
    #[must_use]
    pub fn filter(&self) -> EnvFilter {
        EnvFilter::builder().parse_lossy(&self.directives)
    }

    /// Install the global subscriber.
    pub fn init(&self) -> Result<()> {
        let registry = Registry::default().with(self.filter());
        let installed = match self.format {
            LogFormat::Text => registry
                .with(fmt::layer().with_writer(std::io::stderr))
                .try_init(),
            LogFormat::Tree => registry
                .with(
                    tracing_tree::HierarchicalLayer::new(2)
                        .with_writer(std::io::stderr)
                        .with_indent_lines(true)
                        .with_deferred_spans(true)
                        .with_targets(true),
                )
                .try_init(),
            LogFormat::Json => registry
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .try_init(),
        };
        installed.context("failed to install the tracing subscriber")
    }
}
