use crate::{ScannerState, SyntaxKind};

fn scan_all(source: &str) -> Vec<(SyntaxKind, String)> {
    let mut scanner = ScannerState::new("test.lt".to_string(), source.to_string());
    let mut tokens = Vec::new();
    loop {
        let kind = scanner.scan();
        if kind == SyntaxKind::EndOfFileToken {
            break;
        }
        tokens.push((kind, scanner.token_value().to_string()));
    }
    tokens
}

fn kinds(source: &str) -> Vec<SyntaxKind> {
    scan_all(source).into_iter().map(|(kind, _)| kind).collect()
}

#[test]
fn test_scan_deferred_const_declaration() {
    assert_eq!(
        kinds("const a, b;"),
        vec![
            SyntaxKind::ConstKeyword,
            SyntaxKind::Identifier,
            SyntaxKind::CommaToken,
            SyntaxKind::Identifier,
            SyntaxKind::SemicolonToken,
        ]
    );
}

#[test]
fn test_scan_operators_longest_match() {
    assert_eq!(
        kinds("a === b !== c == d != e ?? f ++ -- += -= *= /= <= >= && ||"),
        vec![
            SyntaxKind::Identifier,
            SyntaxKind::EqualsEqualsEqualsToken,
            SyntaxKind::Identifier,
            SyntaxKind::ExclamationEqualsEqualsToken,
            SyntaxKind::Identifier,
            SyntaxKind::EqualsEqualsToken,
            SyntaxKind::Identifier,
            SyntaxKind::ExclamationEqualsToken,
            SyntaxKind::Identifier,
            SyntaxKind::QuestionQuestionToken,
            SyntaxKind::Identifier,
            SyntaxKind::PlusPlusToken,
            SyntaxKind::MinusMinusToken,
            SyntaxKind::PlusEqualsToken,
            SyntaxKind::MinusEqualsToken,
            SyntaxKind::AsteriskEqualsToken,
            SyntaxKind::SlashEqualsToken,
            SyntaxKind::LessThanEqualsToken,
            SyntaxKind::GreaterThanEqualsToken,
            SyntaxKind::AmpersandAmpersandToken,
            SyntaxKind::BarBarToken,
        ]
    );
}

#[test]
fn test_scan_string_escapes_and_numbers() {
    let tokens = scan_all(r#"'it\'s' "a\nb" 1.5e3 .25"#);
    assert_eq!(tokens[0], (SyntaxKind::StringLiteral, "it's".to_string()));
    assert_eq!(tokens[1], (SyntaxKind::StringLiteral, "a\nb".to_string()));
    assert_eq!(tokens[2], (SyntaxKind::NumericLiteral, "1.5e3".to_string()));
    assert_eq!(tokens[3], (SyntaxKind::NumericLiteral, ".25".to_string()));
}

#[test]
fn test_scan_skips_comments_and_tracks_line_breaks() {
    let mut scanner = ScannerState::new(
        "test.lt".to_string(),
        "a // trailing\n/* block\n */ b /* inline */ c".to_string(),
    );
    assert_eq!(scanner.scan(), SyntaxKind::Identifier);
    assert!(!scanner.has_preceding_line_break());
    assert_eq!(scanner.scan(), SyntaxKind::Identifier);
    assert_eq!(scanner.token_value(), "b");
    assert!(scanner.has_preceding_line_break());
    assert_eq!(scanner.scan(), SyntaxKind::Identifier);
    assert_eq!(scanner.token_value(), "c");
    assert!(!scanner.has_preceding_line_break());
    assert_eq!(scanner.scan(), SyntaxKind::EndOfFileToken);
}

#[test]
fn test_scan_reports_unterminated_string() {
    let mut scanner = ScannerState::new("test.lt".to_string(), "'open".to_string());
    assert_eq!(scanner.scan(), SyntaxKind::StringLiteral);
    let codes: Vec<u32> = scanner.diagnostics().iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![1002]);
}

#[test]
fn test_scan_reports_invalid_character() {
    let mut scanner = ScannerState::new("test.lt".to_string(), "a # b".to_string());
    scanner.scan();
    assert_eq!(scanner.scan(), SyntaxKind::Unknown);
    assert_eq!(scanner.diagnostics()[0].code, 1127);
    assert_eq!(scanner.scan(), SyntaxKind::Identifier);
}

#[test]
fn test_of_is_an_identifier() {
    assert_eq!(kinds("of"), vec![SyntaxKind::Identifier]);
    assert!(SyntaxKind::TypeOfKeyword.is_keyword());
    assert!(!SyntaxKind::Identifier.is_keyword());
}

#[test]
fn test_save_and_restore_lookahead() {
    let mut scanner = ScannerState::new("test.lt".to_string(), "x = 1".to_string());
    scanner.scan();
    let saved = scanner.save();
    assert_eq!(scanner.scan(), SyntaxKind::EqualsToken);
    scanner.restore(saved);
    assert_eq!(scanner.token(), SyntaxKind::Identifier);
    assert_eq!(scanner.token_value(), "x");
    assert_eq!(scanner.scan(), SyntaxKind::EqualsToken);
}
