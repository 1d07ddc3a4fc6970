//! Request and response framing for the 4D SQL protocol
//!
//! Every exchange starts with an ASCII header block: a first line carrying a
//! three-digit command id and a verb, `Key : Value` lines, and a terminating
//! blank line. Result-set replies append a binary row payload after the
//! block.

pub mod request;
pub mod response;

pub use request::{close_statement_request, execute_request, login_request};
pub use response::{LineOutcome, ResponseHeader};
