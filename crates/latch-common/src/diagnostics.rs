//! Diagnostic types and message lookup for the front end.
//!
//! Scanner, parser and binder report problems as [`Diagnostic`]s carrying a
//! numeric code and a message built from a template in
//! [`DIAGNOSTIC_MESSAGES`]. Runtime failures reuse the same codes when they are
//! rendered for an uncaught error.

use serde::Serialize;

// =============================================================================
// Diagnostic Types
// =============================================================================

/// Diagnostic category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DiagnosticCategory {
    Warning = 0,
    Error = 1,
    Suggestion = 2,
    Message = 3,
}

/// Related information for a diagnostic (e.g., "see also" locations).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DiagnosticRelatedInformation {
    pub file: String,
    pub start: u32,
    pub length: u32,
    pub message_text: String,
    pub category: DiagnosticCategory,
    pub code: u32,
}

/// A diagnostic message with optional related information.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub file: String,
    pub start: u32,
    pub length: u32,
    pub message_text: String,
    pub category: DiagnosticCategory,
    pub code: u32,
    /// Related information spans (e.g., where a name was first declared)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub related_information: Vec<DiagnosticRelatedInformation>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    #[must_use]
    pub const fn error(file: String, start: u32, length: u32, message: String, code: u32) -> Self {
        Self {
            file,
            start,
            length,
            message_text: message,
            category: DiagnosticCategory::Error,
            code,
            related_information: Vec::new(),
        }
    }

    /// Create an error diagnostic from a registered code, filling the
    /// template with `args`.
    #[must_use]
    pub fn from_code(file: &str, start: u32, length: u32, code: u32, args: &[&str]) -> Self {
        let template = get_message_template(code).unwrap_or("Unknown diagnostic.");
        let category = get_diagnostic_category(code).unwrap_or(DiagnosticCategory::Error);
        Self {
            file: file.to_string(),
            start,
            length,
            message_text: format_message(template, args),
            category,
            code,
            related_information: Vec::new(),
        }
    }

    /// Add related information to this diagnostic.
    #[must_use]
    pub fn with_related(mut self, file: String, start: u32, length: u32, message: String) -> Self {
        self.related_information.push(DiagnosticRelatedInformation {
            file,
            start,
            length,
            message_text: message,
            category: DiagnosticCategory::Message,
            code: 0,
        });
        self
    }
}

/// Format a diagnostic message by replacing {0}, {1}, etc. with arguments.
#[must_use]
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}

/// A diagnostic message definition with code, category, and message template.
#[derive(Clone, Copy, Debug)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub category: DiagnosticCategory,
    pub message: &'static str,
}

/// Look up a diagnostic message definition by code.
#[must_use]
pub fn get_diagnostic_message(code: u32) -> Option<&'static DiagnosticMessage> {
    DIAGNOSTIC_MESSAGES.iter().find(|m| m.code == code)
}

/// Get the message template for a diagnostic code.
///
/// Returns the template string with `{0}`, `{1}`, etc. placeholders.
/// Use `format_message()` to fill in the placeholders.
#[must_use]
pub fn get_message_template(code: u32) -> Option<&'static str> {
    get_diagnostic_message(code).map(|m| m.message)
}

/// Get the category for a diagnostic code.
#[must_use]
pub fn get_diagnostic_category(code: u32) -> Option<DiagnosticCategory> {
    get_diagnostic_message(code).map(|m| m.category)
}

// =============================================================================
// Message Data
// =============================================================================

pub mod diagnostic_codes {
    pub const UNTERMINATED_STRING_LITERAL: u32 = 1002;
    pub const IDENTIFIER_EXPECTED: u32 = 1003;
    pub const EXPECTED: u32 = 1005;
    pub const ASTERISK_SLASH_EXPECTED: u32 = 1010;
    pub const CONTINUE_OUTSIDE_ITERATION: u32 = 1104;
    pub const BREAK_OUTSIDE_ITERATION: u32 = 1105;
    pub const RETURN_OUTSIDE_FUNCTION: u32 = 1108;
    pub const EXPRESSION_EXPECTED: u32 = 1109;
    pub const INVALID_CHARACTER: u32 = 1127;
    pub const DECLARATION_OR_STATEMENT_EXPECTED: u32 = 1128;
    pub const VARIABLE_DECLARATION_EXPECTED: u32 = 1134;
    pub const DECLARATIONS_MUST_BE_INITIALIZED: u32 = 1155;
    pub const DECLARATIONS_ONLY_INSIDE_A_BLOCK: u32 = 1156;
    pub const DESTRUCTURING_DECLARATION_MUST_HAVE_AN_INITIALIZER: u32 = 1182;
    pub const DUPLICATE_IDENTIFIER: u32 = 2300;
    pub const CANNOT_FIND_NAME: u32 = 2304;
    pub const INVALID_ASSIGNMENT_TARGET: u32 = 2364;
    pub const BLOCK_SCOPED_VARIABLE_USED_BEFORE_ITS_DECLARATION: u32 = 2448;
    pub const CANNOT_REDECLARE_BLOCK_SCOPED_VARIABLE: u32 = 2451;
    pub const CONSTANT_USED_BEFORE_BEING_ASSIGNED: u32 = 2454;
    pub const CANNOT_ASSIGN_TO_BECAUSE_IT_IS_A_CONSTANT: u32 = 2588;
    pub const UNCAUGHT_EXCEPTION: u32 = 9001;
    pub const MAXIMUM_NESTING_DEPTH_EXCEEDED: u32 = 9002;
}

pub mod diagnostic_messages {
    pub const UNTERMINATED_STRING_LITERAL: &str = "Unterminated string literal.";
    pub const IDENTIFIER_EXPECTED: &str = "Identifier expected.";
    pub const EXPECTED: &str = "'{0}' expected.";
    pub const ASTERISK_SLASH_EXPECTED: &str = "'*/' expected.";
    pub const CONTINUE_OUTSIDE_ITERATION: &str =
        "A 'continue' statement can only be used within an enclosing iteration statement.";
    pub const BREAK_OUTSIDE_ITERATION: &str =
        "A 'break' statement can only be used within an enclosing iteration statement.";
    pub const RETURN_OUTSIDE_FUNCTION: &str =
        "A 'return' statement can only be used within a function body.";
    pub const EXPRESSION_EXPECTED: &str = "Expression expected.";
    pub const INVALID_CHARACTER: &str = "Invalid character.";
    pub const DECLARATION_OR_STATEMENT_EXPECTED: &str = "Declaration or statement expected.";
    pub const VARIABLE_DECLARATION_EXPECTED: &str = "Variable declaration expected.";
    pub const DECLARATIONS_MUST_BE_INITIALIZED: &str = "'{0}' declarations must be initialized.";
    pub const DECLARATIONS_ONLY_INSIDE_A_BLOCK: &str =
        "'{0}' declarations can only be declared inside a block.";
    pub const DESTRUCTURING_DECLARATION_MUST_HAVE_AN_INITIALIZER: &str =
        "A destructuring declaration must have an initializer.";
    pub const DUPLICATE_IDENTIFIER: &str = "Duplicate identifier '{0}'.";
    pub const CANNOT_FIND_NAME: &str = "Cannot find name '{0}'.";
    pub const INVALID_ASSIGNMENT_TARGET: &str =
        "The left-hand side of an assignment expression must be a variable or an element access.";
    pub const BLOCK_SCOPED_VARIABLE_USED_BEFORE_ITS_DECLARATION: &str =
        "Block-scoped variable '{0}' used before its declaration.";
    pub const CANNOT_REDECLARE_BLOCK_SCOPED_VARIABLE: &str =
        "Cannot redeclare block-scoped variable '{0}'.";
    pub const CONSTANT_USED_BEFORE_BEING_ASSIGNED: &str =
        "Constant '{0}' is used before being assigned.";
    pub const CANNOT_ASSIGN_TO_BECAUSE_IT_IS_A_CONSTANT: &str =
        "Cannot assign to '{0}' because it is a constant.";
    pub const UNCAUGHT_EXCEPTION: &str = "Uncaught {0}: {1}";
    pub const MAXIMUM_NESTING_DEPTH_EXCEEDED: &str = "Maximum nesting depth exceeded.";
}

macro_rules! messages {
    ($($name:ident),+ $(,)?) => {
        &[$(
            DiagnosticMessage {
                code: diagnostic_codes::$name,
                category: DiagnosticCategory::Error,
                message: diagnostic_messages::$name,
            },
        )+]
    };
}

/// Every registered diagnostic message.
pub static DIAGNOSTIC_MESSAGES: &[DiagnosticMessage] = messages!(
    UNTERMINATED_STRING_LITERAL,
    IDENTIFIER_EXPECTED,
    EXPECTED,
    ASTERISK_SLASH_EXPECTED,
    CONTINUE_OUTSIDE_ITERATION,
    BREAK_OUTSIDE_ITERATION,
    RETURN_OUTSIDE_FUNCTION,
    EXPRESSION_EXPECTED,
    INVALID_CHARACTER,
    DECLARATION_OR_STATEMENT_EXPECTED,
    VARIABLE_DECLARATION_EXPECTED,
    DECLARATIONS_MUST_BE_INITIALIZED,
    DECLARATIONS_ONLY_INSIDE_A_BLOCK,
    DESTRUCTURING_DECLARATION_MUST_HAVE_AN_INITIALIZER,
    DUPLICATE_IDENTIFIER,
    CANNOT_FIND_NAME,
    INVALID_ASSIGNMENT_TARGET,
    BLOCK_SCOPED_VARIABLE_USED_BEFORE_ITS_DECLARATION,
    CANNOT_REDECLARE_BLOCK_SCOPED_VARIABLE,
    CONSTANT_USED_BEFORE_BEING_ASSIGNED,
    CANNOT_ASSIGN_TO_BECAUSE_IT_IS_A_CONSTANT,
    UNCAUGHT_EXCEPTION,
    MAXIMUM_NESTING_DEPTH_EXCEEDED,
);
