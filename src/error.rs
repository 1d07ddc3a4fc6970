//! Error types for the 4D driver
//!
//! This module defines all error types that can occur while talking to a 4D
//! SQL server, from low-level transport failures to server-reported statement
//! errors.

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the 4D driver
#[derive(Error, Debug)]
#[allow(missing_docs)]
pub enum Error {
    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// Failed to allocate or configure the socket
    #[error("failed to create socket: {0}")]
    TransportCreation(io::Error),

    /// TCP connect refused, host unreachable, or DNS failure
    #[error("failed to connect to {addr}: {source}")]
    TransportConnect { addr: String, source: io::Error },

    /// Connection attempt did not complete within the configured deadline
    #[error("connection timeout after {0:?}")]
    ConnectTimeout(Duration),

    /// A read did not complete within the configured deadline
    #[error("read timed out after {0:?}")]
    ReadTimeout(Duration),

    /// Connection closed unexpectedly (disconnect or short read)
    #[error("connection closed unexpectedly")]
    ConnectionClosed,

    /// Operation attempted on a closed connection
    #[error("connection is closed")]
    ConnectionNotReady,

    /// Underlying I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // =========================================================================
    // Server Errors
    // =========================================================================
    /// Server replied ERROR to LOGIN
    #[error("login rejected by server ({code}): {message}")]
    Login { code: i32, message: String },

    /// Server replied ERROR to EXECUTE-STATEMENT
    #[error("statement failed ({code}): {message}")]
    Statement { code: i32, message: String },

    // =========================================================================
    // Decode Errors
    // =========================================================================
    /// Column type tag not in the catalogue
    #[error("column type not supported: {0}")]
    TypeNotSupported(String),

    /// Per-value error marker observed in a row payload
    #[error("column value error from server (code {code})")]
    ColumnValue { code: u64 },

    /// Length or character-set decode failure in a row payload
    #[error("decode error: {0}")]
    Decode(String),

    /// Malformed response header
    #[error("protocol error: {0}")]
    Protocol(String),

    // =========================================================================
    // Bind Errors
    // =========================================================================
    /// Placeholder count does not match the supplied argument count
    #[error("statement has {expected} placeholders but {actual} arguments were supplied")]
    ArgumentCountMismatch { expected: usize, actual: usize },

    /// Argument type has no SQL literal rendering
    #[error("cannot bind {0} as a statement literal")]
    BindNotSupported(&'static str),
}

impl Error {
    /// Create a login error from server-reported code and description.
    ///
    /// The description is stripped of CR/LF before surfacing.
    pub fn login(code: i32, message: &str) -> Self {
        Error::Login {
            code,
            message: strip_crlf(message),
        }
    }

    /// Create a statement error from server-reported code and description.
    ///
    /// The description is stripped of CR/LF before surfacing.
    pub fn statement(code: i32, message: &str) -> Self {
        Error::Statement {
            code,
            message: strip_crlf(message),
        }
    }

    /// Check if this is a connection-level error.
    ///
    /// After any of these the connection must be considered closed.
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Error::TransportCreation(_)
                | Error::TransportConnect { .. }
                | Error::ConnectTimeout(_)
                | Error::ReadTimeout(_)
                | Error::ConnectionClosed
                | Error::Io(_)
        )
    }

    /// Check if this error was reported by the server.
    ///
    /// The connection remains usable for subsequent statements.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Error::Login { .. } | Error::Statement { .. })
    }

    /// Check if an error surfaced from a wire exchange leaves the stream
    /// unusable.
    ///
    /// Decode and protocol failures abandon a reply mid-stream: the
    /// unconsumed remainder of the header block or row payload would be
    /// read by the next exchange as if it were a fresh reply. The only
    /// safe recovery is to close and reconnect, so the driver closes the
    /// connection on any of these in addition to the transport errors.
    pub fn poisons_connection(&self) -> bool {
        self.is_connection_error()
            || matches!(
                self,
                Error::ColumnValue { .. }
                    | Error::Decode(_)
                    | Error::Protocol(_)
                    | Error::TypeNotSupported(_)
            )
    }

    /// Server-reported error code, if any
    pub fn server_code(&self) -> Option<i32> {
        match self {
            Error::Login { code, .. } | Error::Statement { code, .. } => Some(*code),
            _ => None,
        }
    }
}

fn strip_crlf(message: &str) -> String {
    message.replace(['\r', '\n'], "")
}
