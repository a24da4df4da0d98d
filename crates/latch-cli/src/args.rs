use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for the latch binary.
#[derive(Parser, Debug)]
#[command(
    name = "latch",
    version,
    about = "Run scripts with write-once const bindings"
)]
pub struct CliArgs {
    /// Path to latch.json or a directory containing it.
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Print the resolved configuration as JSON and exit.
    #[arg(long = "show-config", alias = "showConfig", global = true)]
    pub show_config: bool,

    /// Colorize diagnostics. Defaults to on when stdout is a terminal.
    #[arg(long, global = true, num_args = 0..=1, default_missing_value = "true")]
    pub pretty: Option<bool>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Execute a script, then drain its job queue.
    Run {
        file: PathBuf,

        /// Nested calls allowed before a RangeError.
        #[arg(long = "max-call-depth", alias = "maxCallDepth")]
        max_call_depth: Option<u32>,

        /// Leave queued jobs unrun.
        #[arg(long = "no-jobs")]
        no_jobs: bool,
    },
    /// Scan, parse and bind a script and report diagnostics.
    Check { file: PathBuf },
    /// Print the token stream of a script.
    Tokens { file: PathBuf },
    /// Print the declarations of every scope.
    Ast {
        file: PathBuf,

        /// Emit the scope table as JSON.
        #[arg(long)]
        json: bool,
    },
}

impl Command {
    #[must_use]
    pub fn file(&self) -> &PathBuf {
        match self {
            Command::Run { file, .. }
            | Command::Check { file }
            | Command::Tokens { file }
            | Command::Ast { file, .. } => file,
        }
    }
}
