//! Parser utility functions.

use bumpalo::Bump;
use tessera_ast::node::LiteralKind;
use tessera_core::text::{LineAndColumn, Span, TextRange};

/// Move a vector into the arena as a slice.
pub(crate) fn alloc_vec_in<T>(arena: &Bump, items: Vec<T>) -> &[T] {
    arena.alloc_slice_fill_iter(items)
}

/// The span of a string literal's contents, without its quotes.
pub(crate) fn inner_span(span: Span) -> Span {
    if span.range.len() < 2 {
        return span;
    }
    Span::new(
        TextRange::new(span.range.pos + 1, span.range.end - 1),
        LineAndColumn::new(span.start.line, span.start.column + 1),
        LineAndColumn::new(span.end.line, span.end.column.saturating_sub(1)),
    )
}

/// Read plain attribute text as a literal: numbers (with `_` separators),
/// `true`, `false` and `null`.
pub(crate) fn literal_from_text(text: &str) -> Option<LiteralKind<'static>> {
    match text {
        "true" => return Some(LiteralKind::Bool(true)),
        "false" => return Some(LiteralKind::Bool(false)),
        "null" => return Some(LiteralKind::Null),
        _ => {}
    }
    let digits = text.replace(['_', ' '], "");
    let unsigned = digits.strip_prefix('-').unwrap_or(&digits);
    if !unsigned.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    if let Ok(value) = digits.parse::<i64>() {
        return Some(LiteralKind::Integer(value));
    }
    digits.parse::<f64>().ok().map(LiteralKind::Float)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_from_text() {
        assert_eq!(literal_from_text("1_000"), Some(LiteralKind::Integer(1000)));
        assert_eq!(literal_from_text("- 3"), Some(LiteralKind::Integer(-3)));
        assert_eq!(literal_from_text("2.5"), Some(LiteralKind::Float(2.5)));
        assert_eq!(literal_from_text("true"), Some(LiteralKind::Bool(true)));
        assert_eq!(literal_from_text("null"), Some(LiteralKind::Null));
        assert_eq!(literal_from_text("count"), None);
        assert_eq!(literal_from_text("-x"), None);
    }
}
