//! Parameter binder property tests

use fourd_rs::bind::bind_parameters;
use fourd_rs::{Error, Value};

#[test]
fn test_tricky_string_keeps_later_markers() {
    // the ? inside the first literal must not consume the second placeholder
    let sql = bind_parameters("SELECT ? , ?", &[Value::String("a?b".into()), Value::Null])
        .unwrap();
    assert_eq!(sql, "SELECT 'a?b' , NULL");
}

#[test]
fn test_kth_marker_receives_kth_argument() {
    let sql = bind_parameters(
        "INSERT INTO t VALUES (?, ?, ?)",
        &[
            Value::String("?x?".into()),
            Value::String("'".into()),
            Value::Integer(3),
        ],
    )
    .unwrap();
    assert_eq!(sql, "INSERT INTO t VALUES ('?x?', '''', 3)");
}

#[test]
fn test_roundtrip_of_quotes_cr_lf_and_question_marks() {
    let original = "it's a ?\r\nvery 'tricky'? string";
    let sql = bind_parameters("SELECT ?", &[Value::String(original.into())]).unwrap();

    // parse the literal back out of the rendered statement
    let literal = sql
        .strip_prefix("SELECT '")
        .and_then(|rest| rest.strip_suffix('\''))
        .unwrap();
    let parsed = literal.replace("''", "'");

    let expected: String = original.chars().filter(|c| !matches!(c, '\r' | '\n')).collect();
    assert_eq!(parsed, expected);
}

#[test]
fn test_boolean_and_null_literals() {
    let sql = bind_parameters(
        "SELECT ?, ?, ?",
        &[Value::Boolean(true), Value::Boolean(false), Value::Null],
    )
    .unwrap();
    assert_eq!(sql, "SELECT CAST(1 as BOOLEAN), CAST(0 as BOOLEAN), NULL");
}

#[test]
fn test_numeric_literals() {
    let sql = bind_parameters("? ?", &[Value::Integer(-42), Value::Float(0.25)]).unwrap();
    assert_eq!(sql, "-42 0.25");
}

#[test]
fn test_byte_blobs_have_no_literal_rendering() {
    // non-UTF-8 bytes must not be coerced through a lossy string cast
    let err = bind_parameters("SELECT ?", &[Value::Bytes(vec![0xC3, 0x28])]).unwrap_err();
    assert!(matches!(err, Error::BindNotSupported(_)));
}

#[test]
fn test_arity_is_checked_first() {
    let err = bind_parameters("SELECT ?, ?", &[Value::Null]).unwrap_err();
    assert!(matches!(
        err,
        Error::ArgumentCountMismatch {
            expected: 2,
            actual: 1
        }
    ));
}
