//! Header-block parsing tests
//!
//! These feed complete captured header blocks to the parser line by line,
//! the way the statement executor consumes them off the wire.

use fourd_rs::{LineOutcome, ResponseHeader, ResultType, SqlType};

fn parse_block(lines: &[&str]) -> ResponseHeader {
    let mut header = ResponseHeader::new();
    for line in lines {
        let outcome = header.consume_line(&format!("{line}\r\n")).unwrap();
        assert_ne!(outcome, LineOutcome::BlockEnd);
    }
    assert_eq!(header.consume_line("\r\n").unwrap(), LineOutcome::BlockEnd);
    header
}

#[test]
fn test_update_count_block() {
    let header = parse_block(&[
        "003 OK",
        "Statement-ID : 1",
        "Command-Count : 1",
        "Result-Type : Update-Count",
        "Row-Count : 7",
    ]);
    assert!(!header.error);
    assert_eq!(header.result_type, Some(ResultType::UpdateCount));
    assert_eq!(header.row_count, 7);
    assert_eq!(header.statement_id, 1);
}

#[test]
fn test_result_set_block() {
    let header = parse_block(&[
        "003 OK",
        "Statement-ID : 2",
        "Result-Type : Result-Set",
        "Row-Count : 120",
        "Row-Count-Sent : 1",
        "Column-Count : 3",
        "Column-Aliases : [id] [name] [born]",
        "Column-Types : VK_LONG VK_STRING VK_TIMESTAMP",
        "Column-Updateability : 3 Y N N",
    ]);
    assert!(header.is_result_set());
    assert_eq!(header.row_count, 120);
    assert_eq!(header.row_count_sent, 1);
    assert_eq!(header.column_count, 3);
    assert_eq!(header.column_names, vec!["id", "name", "born"]);
    assert_eq!(
        header.column_types,
        vec![SqlType::Long, SqlType::String, SqlType::Timestamp]
    );
    assert_eq!(header.column_updateability, vec![true, false, false]);
    assert!(header.has_record_ids());
}

#[test]
fn test_error_block() {
    let header = parse_block(&[
        "003 ERROR",
        "Error-Code : 1301",
        "Error-Component-Code : 13",
        "Error-Description : Syntax problem in the statement",
    ]);
    assert!(header.error);
    assert_eq!(header.error_code, 1301);
    assert_eq!(header.error_component_code, 13);
    assert_eq!(header.error_description, "Syntax problem in the statement");
}

#[test]
fn test_type_tags_tolerate_trailing_whitespace() {
    let mut header = ResponseHeader::new();
    header
        .consume_line("Column-Types : VK_LONG VK_BLOB \r\n")
        .unwrap();
    assert_eq!(header.column_types, vec![SqlType::Long, SqlType::Blob]);
}

#[test]
fn test_unknown_fields_are_forward_compatible() {
    let header = parse_block(&[
        "003 OK",
        "Result-Type : Update-Count",
        "Row-Count : 1",
        "Server-Generation : 14",
        "X-Custom : whatever : with : colons",
    ]);
    assert_eq!(header.row_count, 1);
}

#[test]
fn test_full_type_catalogue() {
    let mut header = ResponseHeader::new();
    header
        .consume_line(
            "Column-Types : VK_BOOLEAN VK_BYTE VK_WORD VK_LONG VK_LONG8 VK_REAL VK_FLOAT VK_STRING VK_BLOB VK_IMAGE VK_TIMESTAMP VK_TIME VK_DURATION\r\n",
        )
        .unwrap();
    assert_eq!(header.column_types.len(), 13);
}
