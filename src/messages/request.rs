//! Outbound request frames
//!
//! Requests are built from structured fields each time they are sent; the
//! second phase of an execute never patches the first phase's bytes.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::constants::{verb, OUTPUT_MODE, PROTOCOL_VERSION};

/// Build the LOGIN request sent once per connection.
///
/// Credentials travel base64-encoded, not encrypted; the targeted server
/// versions have no TLS support.
pub fn login_request(username: &str, password: &str) -> String {
    format!(
        "001 {}\r\nUSER-NAME-BASE64 : {}\r\nUSER-PASSWORD-BASE64 : {}\r\nREPLY-WITH-BASE64-TEXT : N\r\nPROTOCOL-VERSION : {}\r\n\r\n",
        verb::LOGIN,
        STANDARD.encode(username.as_bytes()),
        STANDARD.encode(password.as_bytes()),
        PROTOCOL_VERSION,
    )
}

/// Build an EXECUTE-STATEMENT request.
///
/// The command id is zero-padded to width 3 on the first line. The first
/// page size is `1` for the probe phase and the full row count for the
/// refetch phase.
pub fn execute_request(command_id: u32, sql: &str, first_page_size: u32) -> String {
    format!(
        "{:03} {}\r\nSTATEMENT : {}\r\nOUTPUT-MODE : {}\r\nFIRST-PAGE-SIZE : {}\r\n\r\n",
        command_id,
        verb::EXECUTE_STATEMENT,
        sql,
        OUTPUT_MODE,
        first_page_size,
    )
}

/// Build a CLOSE-STATEMENT request for a server-assigned statement id
pub fn close_statement_request(command_id: u32, statement_id: i64) -> String {
    format!(
        "{:03} {}\r\nSTATEMENT-ID : {}\r\n\r\n",
        command_id,
        verb::CLOSE_STATEMENT,
        statement_id,
    )
}
