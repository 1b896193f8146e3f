//! Case-insensitive substring matching shared by both search operations.

use sea_orm::sea_query::{Expr, Func, IntoColumnRef, LikeExpr, SimpleExpr};

use crate::errors::ServiceError;

/// Search text as sent, or `Validation("Query parameter required")` when absent or empty.
/// Whitespace is significant.
pub fn normalize_query(raw: Option<&str>) -> Result<String, ServiceError> {
    match raw {
        Some(q) if !q.is_empty() => Ok(q.to_string()),
        _ => Err(ServiceError::Validation("Query parameter required".into())),
    }
}

/// `%needle%` lowercased, with LIKE wildcards in the needle escaped by `\`.
pub fn like_pattern(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len() + 2);
    out.push('%');
    for c in needle.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

/// `LOWER(column) LIKE '%needle%' ESCAPE '\'`
pub fn contains_ci<C: IntoColumnRef>(column: C, needle: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column)))
        .like(LikeExpr::new(like_pattern(needle)).escape('\\'))
}
