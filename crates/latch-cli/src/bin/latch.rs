#![allow(clippy::print_stderr)]

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::io::IsTerminal;

use latch_cli::args::{CliArgs, Command};
use latch_cli::config::{
    ShowConfig, apply_cli_overrides, find_config, load_config, resolve_runtime_options,
};
use latch_cli::driver::{self, EXIT_DIAGNOSTICS, EXIT_SUCCESS};
use latch_cli::logging::LogSettings;
use latch_cli::reporter::Reporter;
use latch_runtime::Program;

fn main() -> Result<()> {
    if let Some(logging) = LogSettings::from_env() {
        logging.init()?;
    }

    let args = CliArgs::parse();
    let cwd = std::env::current_dir().context("failed to resolve current directory")?;

    let config_path = find_config(args.config.as_deref(), &cwd);
    let config = config_path.as_deref().map(load_config).transpose()?;
    let mut options =
        resolve_runtime_options(config.as_ref().and_then(|c| c.runtime.as_ref()))?;
    if let Some(command) = &args.command {
        apply_cli_overrides(&mut options, command)?;
    }

    if args.show_config {
        let shown = ShowConfig::new(config_path.as_deref(), &options);
        let json = serde_json::to_string_pretty(&shown).context("failed to serialize config")?;
        println!("{json}");
        return Ok(());
    }

    let Some(command) = args.command else {
        bail!("no command given; run `latch --help`");
    };
    let color = args
        .pretty
        .unwrap_or_else(|| std::io::stdout().is_terminal());
    let mut reporter = Reporter::new(color);

    let code = match &command {
        Command::Run { file, .. } => {
            let result = driver::run(file, options)?;
            reporter.add_source(&result.file, &result.source);
            if !result.diagnostics.is_empty() {
                println!("{}", reporter.render(&result.diagnostics));
            }
            if !options.echo_output {
                for line in &result.output {
                    println!("{line}");
                }
            }
            for uncaught in &result.uncaught {
                eprintln!(
                    "{}",
                    reporter.format_uncaught(&result.file, &uncaught.message, uncaught.start)
                );
            }
            result.exit_code()
        }
        Command::Check { file } => {
            let result = driver::check(file)?;
            reporter.add_source(&result.file, &result.source);
            if !result.diagnostics.is_empty() {
                println!("{}", reporter.render(&result.diagnostics));
            }
            result.exit_code()
        }
        Command::Tokens { file } => {
            let (tokens, diagnostics) = driver::tokens(file)?;
            for token in &tokens {
                println!(
                    "{:>5}..{:<5} {:?} {}",
                    token.start, token.end, token.kind, token.value
                );
            }
            if diagnostics.is_empty() {
                EXIT_SUCCESS
            } else {
                println!("{}", reporter.render(&diagnostics));
                EXIT_DIAGNOSTICS
            }
        }
        Command::Ast { file, json } => {
            let source = driver::read_source(file)?;
            let program = Program::compile(file.display().to_string(), source);
            if *json {
                println!("{}", driver::scopes_json(&program)?);
            } else {
                print!("{}", driver::describe_scopes(&program));
            }
            if program.diagnostics().is_empty() {
                EXIT_SUCCESS
            } else {
                reporter.add_source(program.file_name(), program.source());
                eprintln!("{}", reporter.render(program.diagnostics()));
                EXIT_DIAGNOSTICS
            }
        }
    };

    std::process::exit(code);
}
