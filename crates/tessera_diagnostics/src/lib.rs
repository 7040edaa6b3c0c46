//! tessera_diagnostics: Diagnostic messages and error reporting infrastructure.
//!
//! All diagnostics produced by the scanner and parser are declared in the
//! [`messages`] module. A realized [`Diagnostic`] may carry a suggested
//! [`TextEdit`] or an [`IdMismatch`] record describing a scoped tag whose
//! close id does not match its open id.

use tessera_core::text::{LineAndColumn, Span};
use std::fmt;

/// Diagnostic category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCategory {
    Warning,
    Error,
    Suggestion,
    Message,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCategory::Warning => write!(f, "warning"),
            DiagnosticCategory::Error => write!(f, "error"),
            DiagnosticCategory::Suggestion => write!(f, "suggestion"),
            DiagnosticCategory::Message => write!(f, "message"),
        }
    }
}

/// A diagnostic message template with a code and category.
#[derive(Debug, Clone)]
pub struct DiagnosticMessage {
    /// The diagnostic error code (e.g., 1001, 3002).
    pub code: u32,
    /// The category of this diagnostic.
    pub category: DiagnosticCategory,
    /// The message template string. May contain `{0}`, `{1}`, etc. placeholders.
    pub message: &'static str,
}

/// A structured text replacement offered alongside a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub file: String,
    pub start: LineAndColumn,
    pub end: LineAndColumn,
    pub replacement: String,
}

impl TextEdit {
    /// Replace exactly the text covered by `span`.
    pub fn replace(file: &str, span: Span, replacement: impl Into<String>) -> Self {
        Self {
            file: file.to_string(),
            start: span.start,
            end: span.end,
            replacement: replacement.into(),
        }
    }
}

/// Open/close details of a scoped tag whose ids disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdMismatch {
    pub open_tag: String,
    pub open_id: String,
    pub close_tag: String,
    pub close_id: String,
}

/// A realized diagnostic with location information and resolved message text.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// The file path where this diagnostic occurred, if any.
    pub file: Option<String>,
    /// The source span where this diagnostic occurred, if any.
    pub span: Option<Span>,
    /// The resolved message text.
    pub message_text: String,
    /// The diagnostic error code.
    pub code: u32,
    /// The category.
    pub category: DiagnosticCategory,
    /// A suggested replacement, if one is known.
    pub fix: Option<TextEdit>,
    /// Set for id-mismatch reports.
    pub id_mismatch: Option<IdMismatch>,
}

impl Diagnostic {
    /// Create a new diagnostic without location info (global diagnostic).
    pub fn new(message: &DiagnosticMessage, args: &[&str]) -> Self {
        Self {
            file: None,
            span: None,
            message_text: format_message(message.message, args),
            code: message.code,
            category: message.category,
            fix: None,
            id_mismatch: None,
        }
    }

    /// Create a new diagnostic with file and span info.
    pub fn with_location(
        file: String,
        span: Span,
        message: &DiagnosticMessage,
        args: &[&str],
    ) -> Self {
        Self {
            file: Some(file),
            span: Some(span),
            ..Self::new(message, args)
        }
    }

    /// Attach a suggested fix.
    pub fn with_fix(mut self, fix: TextEdit) -> Self {
        self.fix = Some(fix);
        self
    }

    /// Whether this is an error diagnostic.
    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref file) = self.file {
            write!(f, "{}", file)?;
            if let Some(span) = self.span {
                write!(f, ":{}", span.start)?;
            }
            write!(f, ": ")?;
        }
        write!(f, "{} TSR{}: {}", self.category, self.code, self.message_text)?;
        if let Some(ref fix) = self.fix {
            write!(f, " (replace with '{}')", fix.replacement)?;
        }
        Ok(())
    }
}

/// Format a diagnostic message template by replacing `{0}`, `{1}`, etc. with arguments.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{}}}", i), arg);
    }
    result
}

/// Receiver for everything the front end reports.
///
/// The parser holds a `&mut dyn DiagnosticSink`; nested parsers for embedded
/// text reborrow the same sink, so all reports land in one place in order.
pub trait DiagnosticSink {
    fn add(&mut self, diagnostic: Diagnostic);

    /// Number of error-category diagnostics received so far.
    fn error_count(&self) -> usize;

    fn report(&mut self, file: &str, span: Span, message: &DiagnosticMessage, args: &[&str]) {
        self.add(Diagnostic::with_location(file.to_string(), span, message, args));
    }

    fn report_with_fix(
        &mut self,
        file: &str,
        span: Span,
        message: &DiagnosticMessage,
        args: &[&str],
        fix: TextEdit,
    ) {
        self.add(Diagnostic::with_location(file.to_string(), span, message, args).with_fix(fix));
    }

    fn report_id_mismatch(&mut self, file: &str, span: Span, mismatch: IdMismatch) {
        let mut diagnostic = Diagnostic::with_location(
            file.to_string(),
            span,
            &messages::CLOSING_TAG_0_1_DOES_NOT_MATCH_OPENING_TAG_2_3,
            &[
                &mismatch.close_tag,
                &mismatch.close_id,
                &mismatch.open_tag,
                &mismatch.open_id,
            ],
        );
        diagnostic.id_mismatch = Some(mismatch);
        self.add(diagnostic);
    }
}

/// A collection of diagnostics accumulated during parsing.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticCollection {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollection {
    pub fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
        }
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.category == DiagnosticCategory::Error)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Diagnostics carrying the given code.
    pub fn with_code(&self, code: u32) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.code == code)
    }

    pub fn extend(&mut self, other: DiagnosticCollection) {
        self.diagnostics.extend(other.diagnostics);
    }

    pub fn clear(&mut self) {
        self.diagnostics.clear();
    }

    /// Sort diagnostics by file and position.
    pub fn sort(&mut self) {
        self.diagnostics.sort_by(|a, b| {
            let file_cmp = a.file.cmp(&b.file);
            if file_cmp != std::cmp::Ordering::Equal {
                return file_cmp;
            }
            let a_pos = a.span.map(|s| s.range.pos).unwrap_or(0);
            let b_pos = b.span.map(|s| s.range.pos).unwrap_or(0);
            a_pos.cmp(&b_pos)
        });
    }
}

impl DiagnosticSink for DiagnosticCollection {
    fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.category == DiagnosticCategory::Error)
            .count()
    }
}

// ============================================================================
// Diagnostic Messages
// ============================================================================

pub mod messages {
    use super::*;

    macro_rules! diag {
        ($code:expr, Error, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Error, message: $msg }
        };
        ($code:expr, Warning, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Warning, message: $msg }
        };
        ($code:expr, Suggestion, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Suggestion, message: $msg }
        };
        ($code:expr, Message, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Message, message: $msg }
        };
    }

    // ========================================================================
    // Structural errors (1000-1099)
    // ========================================================================
    pub const _0_EXPECTED: DiagnosticMessage = diag!(1001, Error, "'{0}' expected.");
    pub const UNEXPECTED_TOKEN_0: DiagnosticMessage = diag!(1002, Error, "Unexpected token '{0}'.");
    pub const MISSING_CLOSING_TAG_FOR_0_WITH_ID_1: DiagnosticMessage = diag!(1003, Error, "Missing closing tag for '{0}' with id '{1}'.");
    pub const CLOSING_TAG_0_1_DOES_NOT_MATCH_OPENING_TAG_2_3: DiagnosticMessage = diag!(1004, Error, "Closing tag '{0}' with id '{1}' does not match opening tag '{2}' with id '{3}'.");
    pub const QUANTIFIER_0_REQUIRES_AT_LEAST_ONE_BINDING: DiagnosticMessage = diag!(1005, Error, "Quantifier '{0}' requires at least one binding.");
    pub const EXPRESSION_EXPECTED: DiagnosticMessage = diag!(1006, Error, "Expression expected.");
    pub const STATEMENT_EXPECTED: DiagnosticMessage = diag!(1007, Error, "Statement expected.");
    pub const MAXIMUM_NESTING_DEPTH_EXCEEDED: DiagnosticMessage = diag!(1008, Error, "Maximum nesting depth of {0} exceeded.");
    pub const UNTERMINATED_GENERIC_ARGUMENT_LIST_IN_0: DiagnosticMessage = diag!(1009, Error, "Unterminated generic argument list in '{0}'.");
    pub const UNEXPECTED_CLOSING_ANGLE_IN_0: DiagnosticMessage = diag!(1010, Error, "Unexpected '>' in '{0}'.");
    pub const DECLARATION_EXPECTED: DiagnosticMessage = diag!(1011, Error, "Declaration expected.");
    pub const PATTERN_EXPECTED: DiagnosticMessage = diag!(1012, Error, "Pattern expected.");
    pub const TYPE_EXPECTED: DiagnosticMessage = diag!(1013, Error, "Type expected.");

    // ========================================================================
    // Scanner errors (1100-1199)
    // ========================================================================
    pub const UNTERMINATED_STRING_LITERAL: DiagnosticMessage = diag!(1101, Error, "Unterminated string literal.");
    pub const INVALID_CHARACTER: DiagnosticMessage = diag!(1102, Error, "Invalid character.");

    // ========================================================================
    // Attribute errors (2000-2099)
    // ========================================================================
    pub const MISSING_REQUIRED_ATTRIBUTE_0_ON_1: DiagnosticMessage = diag!(2001, Error, "Missing required attribute '{0}' on '{1}'.");
    pub const STRUCT_CLASS_0_CANNOT_BE_ABSTRACT: DiagnosticMessage = diag!(2002, Error, "Class '{0}' is a struct and cannot be abstract; the 'abstract' modifier was dropped.");
    pub const LEGACY_ATTRIBUTE_FORM_ON_0: DiagnosticMessage = diag!(2003, Warning, "Legacy multi-brace attributes on '{0}'; prefer a single colon-separated block.");
    pub const CHARACTER_LITERAL_MUST_CONTAIN_ONE_CHARACTER_FOUND_0: DiagnosticMessage = diag!(2004, Error, "Character literal must contain exactly one character, found {0}.");
    pub const EMBEDDED_EXPRESSION_0_TREATED_AS_REFERENCE: DiagnosticMessage = diag!(2005, Warning, "Embedded expression '{0}' has trailing content; it is treated as a plain reference.");
    pub const UNKNOWN_COMPARISON_MODE_0: DiagnosticMessage = diag!(2006, Error, "Unknown comparison mode '{0}'. Expected one of: {1}.");
    pub const OPERATION_0_DOES_NOT_SUPPORT_A_COMPARISON_MODE: DiagnosticMessage = diag!(2007, Error, "Operation '{0}' does not support a comparison mode.");

    // ========================================================================
    // Operator errors (3000-3099)
    // ========================================================================
    pub const UNKNOWN_OPERATOR_0_HINT_1: DiagnosticMessage = diag!(3001, Error, "Unknown operator '{0}'. {1}");
    pub const UNKNOWN_OPERATOR_0_DID_YOU_MEAN_1: DiagnosticMessage = diag!(3002, Error, "Unknown operator '{0}'. Did you mean '{1}'?");
    pub const UNKNOWN_OPERATOR_0_VALID_OPERATORS_1: DiagnosticMessage = diag!(3003, Error, "Unknown operator '{0}'. Valid operators are: {1}");
    pub const OPERATOR_0_EXPECTS_1_ARGUMENTS_FOUND_2: DiagnosticMessage = diag!(3004, Error, "Operator '{0}' expects {1} argument(s), found {2}.");

    // ========================================================================
    // Tag errors (4000-4099)
    // ========================================================================
    pub const UNKNOWN_TAG_0_DID_YOU_MEAN_1: DiagnosticMessage = diag!(4001, Error, "Unknown tag '{0}'. Did you mean '{1}'?");
    pub const UNKNOWN_TAG_0_VALID_TAGS_1: DiagnosticMessage = diag!(4002, Error, "Unknown tag '{0}'. Valid tags are: {1}");
    pub const TAG_0_IS_NOT_VALID_HERE: DiagnosticMessage = diag!(4003, Error, "Tag '{0}' is not valid {1}.");
}
