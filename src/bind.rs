//! Positional parameter binding
//!
//! `?` markers in the statement text are replaced left to right with the
//! arguments rendered as SQL literals. Substitution scans the original text
//! only, so a `?` inside a rendered string literal can never consume a later
//! marker.

use crate::error::{Error, Result};
use crate::row::Value;

/// Substitute the `?` markers in `body` with `args` rendered as literals.
///
/// The k-th marker receives the k-th argument. Fails with
/// [`Error::ArgumentCountMismatch`] before anything is rendered when the
/// counts differ.
pub fn bind_parameters(body: &str, args: &[Value]) -> Result<String> {
    let expected = body.matches('?').count();
    if expected != args.len() {
        return Err(Error::ArgumentCountMismatch {
            expected,
            actual: args.len(),
        });
    }

    let mut out = String::with_capacity(body.len());
    let mut rest = body;
    for arg in args {
        // the count check above guarantees a marker remains
        let index = match rest.find('?') {
            Some(index) => index,
            None => break,
        };
        out.push_str(&rest[..index]);
        out.push_str(&render_literal(arg)?);
        rest = &rest[index + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Render one argument as a SQL literal.
///
/// Byte blobs have no literal rendering in this protocol and are rejected;
/// they only travel server-to-client in row payloads.
fn render_literal(value: &Value) -> Result<String> {
    match value {
        Value::Null => Ok("NULL".to_string()),
        Value::Boolean(true) => Ok("CAST(1 as BOOLEAN)".to_string()),
        Value::Boolean(false) => Ok("CAST(0 as BOOLEAN)".to_string()),
        Value::Integer(i) => Ok(i.to_string()),
        Value::Float(f) => Ok(f.to_string()),
        Value::String(s) | Value::DateTime(s) => Ok(render_string(s)),
        Value::Bytes(_) => Err(Error::BindNotSupported("a byte blob")),
    }
}

/// Render a string literal: CR and LF are stripped, single quotes doubled
fn render_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\r' | '\n' => {}
            '\'' => out.push_str("''"),
            other => out.push(other),
        }
    }
    out.push('\'');
    out
}
