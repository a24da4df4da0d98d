use super::logging::{LogFormat, LogSettings, expand_shorthands};

#[test]
fn test_logging_is_off_without_either_variable() {
    assert_eq!(LogSettings::from_vars(None, None, Some("tree")), None);
}

#[test]
fn test_latch_log_takes_precedence_over_rust_log() {
    let settings = LogSettings::from_vars(Some("warn"), Some("trace"), None).unwrap();
    assert_eq!(settings.directives, "warn");
    assert_eq!(settings.format, LogFormat::Text);

    let fallback = LogSettings::from_vars(None, Some(" debug "), Some("json")).unwrap();
    assert_eq!(fallback.directives, "debug");
    assert_eq!(fallback.format, LogFormat::Json);
}

#[test]
fn test_shorthands_expand_to_runtime_targets() {
    assert_eq!(
        expand_shorthands("bindings"),
        "latch_runtime::environment=trace,latch_runtime::installer=trace,latch_runtime::resolver=trace"
    );
    assert_eq!(
        expand_shorthands("JOBS, latch_parser=warn"),
        "latch_runtime::interpreter=debug,latch_parser=warn"
    );
    assert_eq!(expand_shorthands("frontend,,"), "latch_parser=debug,latch_binder=debug");
}

#[test]
fn test_plain_directives_pass_through() {
    assert_eq!(
        expand_shorthands("latch_runtime::environment=debug"),
        "latch_runtime::environment=debug"
    );
    assert_eq!(expand_shorthands("trace"), "trace");
}

#[test]
fn test_expanded_directives_build_a_filter() {
    let settings = LogSettings::from_vars(Some("calls,bindings"), None, None).unwrap();
    let filter = settings.filter().to_string();
    assert!(filter.contains("latch_runtime::interpreter=trace"), "{filter}");
    assert!(filter.contains("latch_runtime::resolver=trace"), "{filter}");
}

#[test]
fn test_log_format_parsing_defaults_to_text() {
    assert_eq!(LogFormat::parse("tree"), LogFormat::Tree);
    assert_eq!(LogFormat::parse(" JSON "), LogFormat::Json);
    assert_eq!(LogFormat::parse(""), LogFormat::Text);
    assert_eq!(LogFormat::parse("fancy"), LogFormat::Text);
}
