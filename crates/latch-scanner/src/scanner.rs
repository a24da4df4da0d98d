//! Scanner state machine.
//!
//! The scanner is pull-based: the parser calls [`ScannerState::scan`] to move
//! to the next token and reads the current token's kind, span and value.
//! Trivia (whitespace and comments) is skipped, but whether a line break was
//! crossed is recorded for automatic semicolon insertion.

use latch_common::diagnostics::{Diagnostic, diagnostic_codes};

use crate::SyntaxKind;

/// Tokenizer over one source file.
pub struct ScannerState {
    file_name: String,
    source: String,
    pos: usize,
    token: SyntaxKind,
    token_start: usize,
    /// Cooked value: identifier text, unescaped string contents, or number text.
    token_value: String,
    has_preceding_line_break: bool,
    diagnostics: Vec<Diagnostic>,
}

impl ScannerState {
    #[must_use]
    pub fn new(file_name: String, source: String) -> Self {
        ScannerState {
            file_name,
            source,
            pos: 0,
            token: SyntaxKind::Unknown,
            token_start: 0,
            token_value: String::new(),
            has_preceding_line_break: false,
            diagnostics: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn token(&self) -> SyntaxKind {
        self.token
    }

    #[inline]
    #[must_use]
    pub fn token_pos(&self) -> u32 {
        self.token_start as u32
    }

    #[inline]
    #[must_use]
    pub fn token_end(&self) -> u32 {
        self.pos as u32
    }

    #[inline]
    #[must_use]
    pub fn token_value(&self) -> &str {
        &self.token_value
    }

    #[inline]
    #[must_use]
    pub fn has_preceding_line_break(&self) -> bool {
        self.has_preceding_line_break
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Snapshot of the scanner position, for one-token lookahead.
    #[must_use]
    pub fn save(&self) -> (usize, SyntaxKind, usize, String, bool) {
        (
            self.pos,
            self.token,
            self.token_start,
            self.token_value.clone(),
            self.has_preceding_line_break,
        )
    }

    pub fn restore(&mut self, saved: (usize, SyntaxKind, usize, String, bool)) {
        let (pos, token, token_start, token_value, line_break) = saved;
        self.pos = pos;
        self.token = token;
        self.token_start = token_start;
        self.token_value = token_value;
        self.has_preceding_line_break = line_break;
    }

    fn error(&mut self, start: usize, length: usize, code: u32, args: &[&str]) {
        self.diagnostics.push(Diagnostic::from_code(
            &self.file_name,
            start as u32,
            length as u32,
            code,
            args,
        ));
    }

    #[inline]
    fn peek_byte(&self, offset: usize) -> Option<u8> {
        self.source.as_bytes().get(self.pos + offset).copied()
    }

    fn peek_char(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    /// Advance to the next token and return its kind.
    pub fn scan(&mut self) -> SyntaxKind {
        self.has_preceding_line_break = false;
        self.token_value.clear();
        self.skip_trivia();
        self.token_start = self.pos;

        let Some(ch) = self.peek_char() else {
            self.token = SyntaxKind::EndOfFileToken;
            return self.token;
        };

        self.token = match ch {
            '{' => self.single(SyntaxKind::OpenBraceToken),
            '}' => self.single(SyntaxKind::CloseBraceToken),
            '(' => self.single(SyntaxKind::OpenParenToken),
            ')' => self.single(SyntaxKind::CloseParenToken),
            '[' => self.single(SyntaxKind::OpenBracketToken),
            ']' => self.single(SyntaxKind::CloseBracketToken),
            ';' => self.single(SyntaxKind::SemicolonToken),
            ',' => self.single(SyntaxKind::CommaToken),
            ':' => self.single(SyntaxKind::ColonToken),
            '%' => self.single(SyntaxKind::PercentToken),
            '.' => {
                if self.peek_byte(1).is_some_and(|b| b.is_ascii_digit()) {
                    self.scan_number()
                } else {
                    self.single(SyntaxKind::DotToken)
                }
            }
            '?' => self.either(b'?', SyntaxKind::QuestionQuestionToken, SyntaxKind::QuestionToken),
            '<' => self.either(b'=', SyntaxKind::LessThanEqualsToken, SyntaxKind::LessThanToken),
            '>' => self.either(
                b'=',
                SyntaxKind::GreaterThanEqualsToken,
                SyntaxKind::GreaterThanToken,
            ),
            '=' => {
                if self.peek_byte(1) == Some(b'=') {
                    self.either_at(
                        2,
                        b'=',
                        SyntaxKind::EqualsEqualsEqualsToken,
                        SyntaxKind::EqualsEqualsToken,
                    )
                } else {
                    self.single(SyntaxKind::EqualsToken)
                }
            }
            '!' => {
                if self.peek_byte(1) == Some(b'=') {
                    self.either_at(
                        2,
                        b'=',
                        SyntaxKind::ExclamationEqualsEqualsToken,
                        SyntaxKind::ExclamationEqualsToken,
                    )
                } else {
                    self.single(SyntaxKind::ExclamationToken)
                }
            }
            '+' => match self.peek_byte(1) {
                Some(b'+') => self.advance_by(2, SyntaxKind::PlusPlusToken),
                Some(b'=') => self.advance_by(2, SyntaxKind::PlusEqualsToken),
                _ => self.single(SyntaxKind::PlusToken),
            },
            '-' => match self.peek_byte(1) {
                Some(b'-') => self.advance_by(2, SyntaxKind::MinusMinusToken),
                Some(b'=') => self.advance_by(2, SyntaxKind::MinusEqualsToken),
                _ => self.single(SyntaxKind::MinusToken),
            },
            '*' => self.either(b'=', SyntaxKind::AsteriskEqualsToken, SyntaxKind::AsteriskToken),
            '/' => self.either(b'=', SyntaxKind::SlashEqualsToken, SyntaxKind::SlashToken),
            '&' if self.peek_byte(1) == Some(b'&') => {
                self.advance_by(2, SyntaxKind::AmpersandAmpersandToken)
            }
            '|' if self.peek_byte(1) == Some(b'|') => {
                self.advance_by(2, SyntaxKind::BarBarToken)
            }
            '"' | '\'' => self.scan_string(ch),
            c if c.is_ascii_digit() => self.scan_number(),
            c if is_identifier_start(c) => self.scan_identifier_or_keyword(),
            c => {
                self.pos += c.len_utf8();
                self.error(
                    self.token_start,
                    c.len_utf8(),
                    diagnostic_codes::INVALID_CHARACTER,
                    &[],
                );
                SyntaxKind::Unknown
            }
        };
        self.token
    }

    #[inline]
    fn single(&mut self, kind: SyntaxKind) -> SyntaxKind {
        self.advance_by(1, kind)
    }

    #[inline]
    fn advance_by(&mut self, len: usize, kind: SyntaxKind) -> SyntaxKind {
        self.pos += len;
        kind
    }

    fn either(&mut self, next: u8, long: SyntaxKind, short: SyntaxKind) -> SyntaxKind {
        self.either_at(1, next, long, short)
    }

    fn either_at(
        &mut self,
        offset: usize,
        next: u8,
        long: SyntaxKind,
        short: SyntaxKind,
    ) -> SyntaxKind {
        if self.peek_byte(offset) == Some(next) {
            self.advance_by(offset + 1, long)
        } else {
            self.advance_by(offset, short)
        }
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek_byte(0) {
                Some(b'\n' | b'\r') => {
                    self.has_preceding_line_break = true;
                    self.pos += 1;
                }
                Some(b' ' | b'\t') => self.pos += 1,
                Some(b'/') if self.peek_byte(1) == Some(b'/') => {
                    let rest = &self.source.as_bytes()[self.pos..];
                    match memchr::memchr(b'\n', rest) {
                        Some(offset) => self.pos += offset,
                        None => self.pos = self.source.len(),
                    }
                }
                Some(b'/') if self.peek_byte(1) == Some(b'*') => {
                    let start = self.pos;
                    let body = &self.source.as_bytes()[self.pos + 2..];
                    match memchr::memmem::find(body, b"*/") {
                        Some(offset) => {
                            if memchr::memchr2(b'\n', b'\r', &body[..offset]).is_some() {
                                self.has_preceding_line_break = true;
                            }
                            self.pos += offset + 4;
                        }
                        None => {
                            self.pos = self.source.len();
                            self.error(
                                start,
                                self.pos - start,
                                diagnostic_codes::ASTERISK_SLASH_EXPECTED,
                                &[],
                            );
                        }
                    }
                }
                Some(_) => {
                    // Non-ASCII whitespace (e.g. U+00A0)
                    match self.peek_char() {
                        Some(c) if c.is_whitespace() && !c.is_ascii() => {
                            if c == '\u{2028}' || c == '\u{2029}' {
                                self.has_preceding_line_break = true;
                            }
                            self.pos += c.len_utf8();
                        }
                        _ => return,
                    }
                }
                None => return,
            }
        }
    }

    fn scan_number(&mut self) -> SyntaxKind {
        let start = self.pos;
        let bytes = self.source.as_bytes();
        let mut end = self.pos;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
        if end < bytes.len() && bytes[end] == b'.' {
            end += 1;
            while end < bytes.len() && bytes[end].is_ascii_digit() {
                end += 1;
            }
        }
        if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
            let mut exp = end + 1;
            if exp < bytes.len() && (bytes[exp] == b'+' || bytes[exp] == b'-') {
                exp += 1;
            }
            if exp < bytes.len() && bytes[exp].is_ascii_digit() {
                end = exp;
                while end < bytes.len() && bytes[end].is_ascii_digit() {
                    end += 1;
                }
            }
        }
        self.pos = end;
        self.token_value.push_str(&self.source[start..end]);
        SyntaxKind::NumericLiteral
    }

    fn scan_string(&mut self, quote: char) -> SyntaxKind {
        let start = self.pos;
        self.pos += 1;
        let mut value = String::new();
        loop {
            let Some(ch) = self.peek_char() else {
                self.error(
                    start,
                    self.pos - start,
                    diagnostic_codes::UNTERMINATED_STRING_LITERAL,
                    &[],
                );
                break;
            };
            if ch == quote {
                self.pos += 1;
                break;
            }
            if ch == '\n' || ch == '\r' {
                self.error(
                    start,
                    self.pos - start,
                    diagnostic_codes::UNTERMINATED_STRING_LITERAL,
                    &[],
                );
                break;
            }
            self.pos += ch.len_utf8();
            if ch == '\\' {
                let Some(escaped) = self.peek_char() else {
                    continue;
                };
                self.pos += escaped.len_utf8();
                value.push(match escaped {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    '0' => '\0',
                    other => other,
                });
            } else {
                value.push(ch);
            }
        }
        self.token_value = value;
        SyntaxKind::StringLiteral
    }

    fn scan_identifier_or_keyword(&mut self) -> SyntaxKind {
        let start = self.pos;
        while let Some(ch) = self.peek_char() {
            if is_identifier_part(ch) {
                self.pos += ch.len_utf8();
            } else {
                break;
            }
        }
        let text = &self.source[start..self.pos];
        self.token_value.push_str(text);
        SyntaxKind::keyword(text).unwrap_or(SyntaxKind::Identifier)
    }
}

#[inline]
fn is_identifier_start(ch: char) -> bool {
    ch == '_' || ch == '$' || ch.is_alphabetic()
}

#[inline]
fn is_identifier_part(ch: char) -> bool {
    is_identifier_start(ch) || ch.is_ascii_digit() || ch.is_numeric()
}
