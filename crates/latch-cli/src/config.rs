use anyhow::{Context, Result, anyhow, bail};
use latch_common::limits::MAX_CALL_DEPTH_CEILING;
use latch_runtime::RuntimeOptions;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::args::Command;

pub const CONFIG_FILE_NAME: &str = "latch.json";

/// Accepts `true`, `"true"`, `"off"` and friends for boolean options.
fn deserialize_bool_or_string<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        String(String),
    }

    match Option::<BoolOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(BoolOrString::Bool(b)) => Ok(Some(b)),
        Some(BoolOrString::String(s)) => match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(Some(true)),
            "false" | "0" | "no" | "off" => Ok(Some(false)),
            _ => Err(Error::custom(format!(
                "invalid boolean value: '{s}'. Expected true, false, 'true', or 'false'"
            ))),
        },
    }
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LatchConfig {
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(default)]
    pub runtime: Option<RuntimeSection>,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeSection {
    #[serde(default)]
    pub max_call_depth: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub drain_jobs: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub echo_output: Option<bool>,
}

/// What `--show-config` prints.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ShowConfig {
    pub config_file: Option<String>,
    pub runtime: ShowRuntime,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ShowRuntime {
    pub max_call_depth: u32,
    pub drain_jobs: bool,
    pub echo_output: bool,
}

impl ShowConfig {
    #[must_use]
    pub fn new(config_file: Option<&Path>, options: &RuntimeOptions) -> Self {
        ShowConfig {
            config_file: config_file.map(|p| p.display().to_string()),
            runtime: ShowRuntime {
                max_call_depth: options.max_call_depth,
                drain_jobs: options.drain_jobs,
                echo_output: options.echo_output,
            },
        }
    }
}

/// Turn a config `runtime` section into interpreter options. CLI runs echo
/// `print` output unless the config says otherwise.
pub fn resolve_runtime_options(section: Option<&RuntimeSection>) -> Result<RuntimeOptions> {
    let mut resolved = RuntimeOptions {
        echo_output: true,
        ..RuntimeOptions::default()
    };
    let Some(section) = section else {
        return Ok(resolved);
    };

    if let Some(depth) = section.max_call_depth {
        validate_call_depth(depth).context("runtime.maxCallDepth")?;
        resolved.max_call_depth = depth;
    }
    if let Some(drain_jobs) = section.drain_jobs {
        resolved.drain_jobs = drain_jobs;
    }
    if let Some(echo_output) = section.echo_output {
        resolved.echo_output = echo_output;
    }
    Ok(resolved)
}

/// Flags on `latch run` win over the config file.
pub fn apply_cli_overrides(options: &mut RuntimeOptions, command: &Command) -> Result<()> {
    if let Command::Run {
        max_call_depth,
        no_jobs,
        ..
    } = command
    {
        if let Some(depth) = *max_call_depth {
            validate_call_depth(depth).context("--max-call-depth")?;
            options.max_call_depth = depth;
        }
        if *no_jobs {
            options.drain_jobs = false;
        }
    }
    Ok(())
}

pub fn validate_call_depth(depth: u32) -> Result<()> {
    if depth == 0 || depth > MAX_CALL_DEPTH_CEILING {
        bail!("call depth must be between 1 and {MAX_CALL_DEPTH_CEILING}, got {depth}");
    }
    Ok(())
}

/// `--config` as given (a file, or a directory holding `latch.json`), else
/// `latch.json` in `cwd` if it exists.
#[must_use]
pub fn find_config(explicit: Option<&Path>, cwd: &Path) -> Option<PathBuf> {
    match explicit {
        Some(path) if path.is_dir() => Some(path.join(CONFIG_FILE_NAME)),
        Some(path) => Some(path.to_path_buf()),
        None => {
            let default_path = cwd.join(CONFIG_FILE_NAME);
            default_path.exists().then_some(default_path)
        }
    }
}

pub fn parse_config(source: &str) -> Result<LatchConfig> {
    let stripped = strip_jsonc(source);
    let normalized = remove_trailing_commas(&stripped);
    let config = serde_json::from_str(&normalized).context("failed to parse latch.json")?;
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<LatchConfig> {
    let mut visited = HashSet::new();
    load_config_inner(path, &mut visited)
}

fn load_config_inner(path: &Path, visited: &mut HashSet<PathBuf>) -> Result<LatchConfig> {
    let canonical = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    if !visited.insert(canonical.clone()) {
        bail!("config extends cycle detected at {}", canonical.display());
    }

    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    let mut config = parse_config(&source)
        .with_context(|| format!("failed to parse config: {}", path.display()))?;

    if let Some(extends) = config.extends.take() {
        let base_path = resolve_extends_path(path, &extends)?;
        let base_config = load_config_inner(&base_path, visited)?;
        config = merge_configs(base_config, config);
    }

    visited.remove(&canonical);
    Ok(config)
}

fn resolve_extends_path(current_path: &Path, extends: &str) -> Result<PathBuf> {
    let base_dir = current_path
        .parent()
        .ok_or_else(|| anyhow!("config has no parent directory"))?;
    let mut candidate = PathBuf::from(extends);
    if candidate.extension().is_none() {
        candidate.set_extension("json");
    }

    if candidate.is_absolute() {
        Ok(candidate)
    } else {
        Ok(base_dir.join(candidate))
    }
}

fn merge_configs(base: LatchConfig, child: LatchConfig) -> LatchConfig {
    let runtime = match (base.runtime, child.runtime) {
        (Some(base), Some(child)) => Some(RuntimeSection {
            max_call_depth: child.max_call_depth.or(base.max_call_depth),
            drain_jobs: child.drain_jobs.or(base.drain_jobs),
            echo_output: child.echo_output.or(base.echo_output),
        }),
        (base, child) => child.or(base),
    };
    LatchConfig {
        extends: None,
        runtime,
    }
}

fn strip_jsonc(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;
    let mut escape = false;
    let mut in_line_comment = false;
    let mut in_block_comment = false;

    while let Some(ch) = chars.next() {
        if in_line_comment {
            if ch == '\n' {
                in_line_comment = false;
                out.push(ch);
            }
            continue;
        }

        if in_block_comment {
            if ch == '*' {
                if let Some('/') = chars.peek().copied() {
                    chars.next();
                    in_block_comment = false;
                }
            } else if ch == '\n' {
                out.push(ch);
            }
            continue;
        }

        if in_string {
            out.push(ch);
            if escape {
                escape = false;
            } else if ch == '\\' {
                escape = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match (ch, chars.peek().copied()) {
            ('"', _) => {
                in_string = true;
                out.push(ch);
            }
            ('/', Some('/')) => {
                chars.next();
                in_line_comment = true;
            }
            ('/', Some('*')) => {
                chars.next();
                in_block_comment = true;
            }
            _ => out.push(ch),
        }
    }

    out
}

fn remove_trailing_commas(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;
    let mut escape = false;

    while let Some(ch) = chars.next() {
        if in_string {
            out.push(ch);
            if escape {
                escape = false;
            } else if ch == '\\' {
                escape = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        if ch == '"' {
            in_string = true;
        } else if ch == ',' {
            let next = chars.clone().find(|c| !c.is_whitespace());
            if matches!(next, Some('}' | ']')) {
                continue;
            }
        }

        out.push(ch);
    }

    out
}
