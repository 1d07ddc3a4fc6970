//! Network transport for the 4D SQL protocol
//!
//! The protocol runs over a single plaintext TCP stream. Requests and
//! response headers are CRLF-delimited ASCII; result-set replies carry a
//! binary row payload directly after the header block, so the transport
//! exposes both exact-count reads and line reads.

mod tcp;

pub use tcp::TcpTransport;
