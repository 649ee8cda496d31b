//! Shared helpers for template parser snapshot tests.
#![allow(dead_code)]

pub use deck_syntax::{parse_expression, parse_template};

/// Formats a parsed template, or its error, for snapshot testing.
pub fn snapshot_template(source: &str) -> String {
    match parse_template(source) {
        Ok(template) => template.to_string(),
        Err(err) => format!("error: {err}"),
    }
}

/// Formats a parsed expression, or its error, for snapshot testing.
pub fn snapshot_expr(source: &str) -> String {
    match parse_expression(source) {
        Ok(expr) => expr.to_string(),
        Err(err) => format!("error: {err}"),
    }
}
