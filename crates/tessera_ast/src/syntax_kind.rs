//! SyntaxKind enum - every token kind of the Tessera notation.

/// The kind of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
pub enum SyntaxKind {
    // ========================================================================
    // Tokens
    // ========================================================================
    Unknown = 0,
    EndOfFileToken = 1,

    // Literals
    IntegerLiteral = 2,
    FloatLiteral = 3,
    StringLiteral = 4,
    CharLiteral = 5,
    Identifier = 6,

    // Punctuation
    OpenBracketToken = 10,
    CloseBracketToken = 11,
    OpenBraceToken = 12,
    CloseBraceToken = 13,
    OpenParenToken = 14,
    CloseParenToken = 15,
    ColonToken = 16,
    CommaToken = 17,
    DotToken = 18,
    DotDotToken = 19,
    SlashToken = 20,
    TildeToken = 21,
    HashToken = 22,
    QuestionToken = 23,
    QuestionQuestionToken = 24,
    ExclamationToken = 25,
    ExclamationEqualsToken = 26,
    AtToken = 27,
    AsteriskToken = 28,
    PlusToken = 29,
    PlusPlusToken = 30,
    MinusToken = 31,
    MinusMinusToken = 32,
    MinusGreaterThanToken = 33,
    PercentToken = 34,
    EqualsToken = 35,
    EqualsEqualsToken = 36,
    EqualsGreaterThanToken = 37,
    LessThanToken = 38,
    LessThanEqualsToken = 39,
    LessThanLessThanToken = 40,
    GreaterThanToken = 41,
    GreaterThanEqualsToken = 42,
    GreaterThanGreaterThanToken = 43,
    AmpersandToken = 44,
    AmpersandAmpersandToken = 45,
    BarToken = 46,
    BarBarToken = 47,
    CaretToken = 48,
}

impl SyntaxKind {
    /// Whether this kind represents a literal token.
    #[inline]
    pub fn is_literal(self) -> bool {
        let v = self as u16;
        v >= SyntaxKind::IntegerLiteral as u16 && v <= SyntaxKind::CharLiteral as u16
    }

    /// Whether this kind represents a punctuation token.
    #[inline]
    pub fn is_punctuation(self) -> bool {
        let v = self as u16;
        v >= SyntaxKind::OpenBracketToken as u16 && v <= SyntaxKind::CaretToken as u16
    }

    /// Punctuation that may stand in operator position of a prefix form.
    pub fn is_operator(self) -> bool {
        matches!(
            self,
            SyntaxKind::QuestionToken
                | SyntaxKind::QuestionQuestionToken
                | SyntaxKind::ExclamationToken
                | SyntaxKind::ExclamationEqualsToken
                | SyntaxKind::AsteriskToken
                | SyntaxKind::PlusToken
                | SyntaxKind::PlusPlusToken
                | SyntaxKind::MinusToken
                | SyntaxKind::MinusMinusToken
                | SyntaxKind::MinusGreaterThanToken
                | SyntaxKind::PercentToken
                | SyntaxKind::SlashToken
                | SyntaxKind::TildeToken
                | SyntaxKind::EqualsEqualsToken
                | SyntaxKind::LessThanToken
                | SyntaxKind::LessThanEqualsToken
                | SyntaxKind::LessThanLessThanToken
                | SyntaxKind::GreaterThanToken
                | SyntaxKind::GreaterThanEqualsToken
                | SyntaxKind::GreaterThanGreaterThanToken
                | SyntaxKind::AmpersandToken
                | SyntaxKind::AmpersandAmpersandToken
                | SyntaxKind::BarToken
                | SyntaxKind::BarBarToken
                | SyntaxKind::CaretToken
                | SyntaxKind::DotDotToken
        )
    }

    pub fn punctuation_text(self) -> Option<&'static str> {
        match self {
            SyntaxKind::OpenBracketToken => Some("["),
            SyntaxKind::CloseBracketToken => Some("]"),
            SyntaxKind::OpenBraceToken => Some("{"),
            SyntaxKind::CloseBraceToken => Some("}"),
            SyntaxKind::OpenParenToken => Some("("),
            SyntaxKind::CloseParenToken => Some(")"),
            SyntaxKind::ColonToken => Some(":"),
            SyntaxKind::CommaToken => Some(","),
            SyntaxKind::DotToken => Some("."),
            SyntaxKind::DotDotToken => Some(".."),
            SyntaxKind::SlashToken => Some("/"),
            SyntaxKind::TildeToken => Some("~"),
            SyntaxKind::HashToken => Some("#"),
            SyntaxKind::QuestionToken => Some("?"),
            SyntaxKind::QuestionQuestionToken => Some("??"),
            SyntaxKind::ExclamationToken => Some("!"),
            SyntaxKind::ExclamationEqualsToken => Some("!="),
            SyntaxKind::AtToken => Some("@"),
            SyntaxKind::AsteriskToken => Some("*"),
            SyntaxKind::PlusToken => Some("+"),
            SyntaxKind::PlusPlusToken => Some("++"),
            SyntaxKind::MinusToken => Some("-"),
            SyntaxKind::MinusMinusToken => Some("--"),
            SyntaxKind::MinusGreaterThanToken => Some("->"),
            SyntaxKind::PercentToken => Some("%"),
            SyntaxKind::EqualsToken => Some("="),
            SyntaxKind::EqualsEqualsToken => Some("=="),
            SyntaxKind::EqualsGreaterThanToken => Some("=>"),
            SyntaxKind::LessThanToken => Some("<"),
            SyntaxKind::LessThanEqualsToken => Some("<="),
            SyntaxKind::LessThanLessThanToken => Some("<<"),
            SyntaxKind::GreaterThanToken => Some(">"),
            SyntaxKind::GreaterThanEqualsToken => Some(">="),
            SyntaxKind::GreaterThanGreaterThanToken => Some(">>"),
            SyntaxKind::AmpersandToken => Some("&"),
            SyntaxKind::AmpersandAmpersandToken => Some("&&"),
            SyntaxKind::BarToken => Some("|"),
            SyntaxKind::BarBarToken => Some("||"),
            SyntaxKind::CaretToken => Some("^"),
            _ => None,
        }
    }

    /// Human-readable text for "expected" diagnostics.
    pub fn describe(self) -> &'static str {
        match self {
            SyntaxKind::Identifier => "identifier",
            SyntaxKind::IntegerLiteral => "integer",
            SyntaxKind::FloatLiteral => "number",
            SyntaxKind::StringLiteral => "string",
            SyntaxKind::CharLiteral => "character",
            SyntaxKind::EndOfFileToken => "end of input",
            SyntaxKind::Unknown => "token",
            other => other.punctuation_text().unwrap_or("token"),
        }
    }
}

impl std::fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}
