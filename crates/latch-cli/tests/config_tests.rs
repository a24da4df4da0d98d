use std::path::{Path, PathBuf};

use latch_common::limits::DEFAULT_MAX_CALL_DEPTH;

use super::args::Command;
use super::config::{
    ShowConfig, apply_cli_overrides, find_config, load_config, parse_config,
    resolve_runtime_options,
};

fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("failed to write test file");
    path
}

#[test]
fn parses_jsonc_with_comments_and_trailing_commas() {
    let input = r#"
    {
      // comment
      "runtime": {
        "maxCallDepth": 64, /* inline */
        "drainJobs": false,
        "echoOutput": "off",
      },
    }
    "#;

    let config = parse_config(input).expect("should parse JSONC");
    let runtime = config.runtime.expect("runtime missing");
    assert_eq!(runtime.max_call_depth, Some(64));
    assert_eq!(runtime.drain_jobs, Some(false));
    assert_eq!(runtime.echo_output, Some(false));
}

#[test]
fn keeps_comment_markers_inside_strings() {
    let config = parse_config(r#"{ "extends": "./base//x,]" }"#).unwrap();
    assert_eq!(config.extends.as_deref(), Some("./base//x,]"));
}

#[test]
fn rejects_bad_boolean_strings() {
    let err = parse_config(r#"{ "runtime": { "drainJobs": "maybe" } }"#).unwrap_err();
    assert!(format!("{err:#}").contains("invalid boolean value"));
}

#[test]
fn resolves_defaults_without_a_section() {
    let options = resolve_runtime_options(None).unwrap();
    assert_eq!(options.max_call_depth, DEFAULT_MAX_CALL_DEPTH);
    assert!(options.drain_jobs);
    assert!(options.echo_output);
}

#[test]
fn rejects_out_of_range_call_depth() {
    let config = parse_config(r#"{ "runtime": { "maxCallDepth": 0 } }"#).unwrap();
    assert!(resolve_runtime_options(config.runtime.as_ref()).is_err());
    let config = parse_config(r#"{ "runtime": { "maxCallDepth": 1000000 } }"#).unwrap();
    assert!(resolve_runtime_options(config.runtime.as_ref()).is_err());
}

#[test]
fn load_config_merges_extends() {
    let dir = tempfile::tempdir().unwrap();
    write_file(
        dir.path(),
        "base.json",
        r#"{ "runtime": { "maxCallDepth": 32, "drainJobs": false } }"#,
    );
    let child = write_file(
        dir.path(),
        "latch.json",
        r#"{ "extends": "./base", "runtime": { "drainJobs": true } }"#,
    );

    let config = load_config(&child).unwrap();
    assert!(config.extends.is_none());
    let runtime = config.runtime.unwrap();
    assert_eq!(runtime.max_call_depth, Some(32));
    assert_eq!(runtime.drain_jobs, Some(true));
}

#[test]
fn load_config_detects_extends_cycles() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_file(dir.path(), "a.json", r#"{ "extends": "./b.json" }"#);
    write_file(dir.path(), "b.json", r#"{ "extends": "./a.json" }"#);

    let err = load_config(&a).unwrap_err();
    assert!(format!("{err:#}").contains("cycle"), "{err:#}");
}

#[test]
fn find_config_prefers_explicit_then_cwd() {
    let dir = tempfile::tempdir().unwrap();
    assert!(find_config(None, dir.path()).is_none());

    let default = write_file(dir.path(), "latch.json", "{}");
    assert_eq!(find_config(None, dir.path()), Some(default.clone()));
    assert_eq!(find_config(Some(dir.path()), Path::new("/")), Some(default));

    let other = dir.path().join("other.json");
    assert_eq!(find_config(Some(&other), dir.path()), Some(other.clone()));
}

#[test]
fn cli_flags_override_config() {
    let config = parse_config(r#"{ "runtime": { "maxCallDepth": 32 } }"#).unwrap();
    let mut options = resolve_runtime_options(config.runtime.as_ref()).unwrap();
    let command = Command::Run {
        file: PathBuf::from("x.lt"),
        max_call_depth: Some(8),
        no_jobs: true,
    };
    apply_cli_overrides(&mut options, &command).unwrap();
    assert_eq!(options.max_call_depth, 8);
    assert!(!options.drain_jobs);
}

#[test]
fn show_config_serializes_camel_case() {
    let options = resolve_runtime_options(None).unwrap();
    let json = serde_json::to_string(&ShowConfig::new(None, &options)).unwrap();
    assert_eq!(
        json,
        format!(
            r#"{{"configFile":null,"runtime":{{"maxCallDepth":{DEFAULT_MAX_CALL_DEPTH},"drainJobs":true,"echoOutput":true}}}}"#
        )
    );
}
