//! Response header parsing
//!
//! The server replies with a CRLF-delimited ASCII header block terminated by
//! a blank line. The block announces the reply status (`OK` / `ERROR`) and,
//! for result sets, the column metadata that shapes the binary row payload
//! which follows.

use crate::constants::{ResultType, SqlType};
use crate::error::{Error, Result};
use crate::transport::TcpTransport;

/// Outcome of feeding one header line to the parser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    /// A recognised or ignorable field line
    Consumed,
    /// The reply status line, status `OK`
    StatusOk,
    /// The reply status line, status `ERROR`
    StatusError,
    /// The blank line terminating the block
    BlockEnd,
}

/// Metadata parsed from one response header block.
///
/// Mutable while the block is being consumed, then frozen before row
/// decoding starts.
#[derive(Debug, Default)]
pub struct ResponseHeader {
    /// Server-assigned statement id, used to close the cursor
    pub statement_id: i64,
    /// Informational command counter echoed by the server
    pub command_count: i64,
    /// Whether the statement produced a row count or a result set
    pub result_type: Option<ResultType>,
    /// Total rows the result set will produce
    pub row_count: u32,
    /// Rows included in the current page
    pub row_count_sent: u32,
    /// Number of columns in the result set
    pub column_count: usize,
    /// Column names, in column order
    pub column_names: Vec<String>,
    /// Column type tags, in column order
    pub column_types: Vec<SqlType>,
    /// Per-column updateability flags; any `true` adds a record id prefix
    /// to every row
    pub column_updateability: Vec<bool>,
    /// Whether the reply status was `ERROR`
    pub error: bool,
    /// Server error code
    pub error_code: i32,
    /// Server error component code
    pub error_component_code: i32,
    /// Server error description
    pub error_description: String,
}

impl ResponseHeader {
    /// Create an empty header record
    pub fn new() -> Self {
        Self::default()
    }

    /// Read one full header block from the transport.
    ///
    /// Fails if the block ends without a status line, or if a result set
    /// announces inconsistent column metadata.
    pub async fn read_block(transport: &mut TcpTransport) -> Result<ResponseHeader> {
        let mut header = ResponseHeader::new();
        let mut status_seen = false;
        loop {
            let line = transport.read_line().await?;
            match header.consume_line(&line)? {
                LineOutcome::BlockEnd => break,
                LineOutcome::StatusOk | LineOutcome::StatusError => status_seen = true,
                LineOutcome::Consumed => {}
            }
        }
        if !status_seen {
            return Err(Error::Protocol(
                "header block ended without a status line".to_string(),
            ));
        }
        header.check_columns()?;
        Ok(header)
    }

    /// Feed one CRLF-terminated line to the parser.
    ///
    /// Unrecognised field names are ignored for forward compatibility.
    pub fn consume_line(&mut self, line: &str) -> Result<LineOutcome> {
        let line = line.strip_suffix("\r\n").unwrap_or(line);
        if line.is_empty() {
            return Ok(LineOutcome::BlockEnd);
        }
        if line.contains(" OK") {
            self.error = false;
            return Ok(LineOutcome::StatusOk);
        }
        if line.contains(" ERROR") {
            self.error = true;
            return Ok(LineOutcome::StatusError);
        }

        let Some((name, value)) = line.split_once(':') else {
            return Ok(LineOutcome::Consumed);
        };
        let name = name.trim();
        let value = value.trim();
        match name {
            "Statement-ID" => self.statement_id = parse_int(value)?,
            "Command-Count" => self.command_count = parse_int(value)?,
            "Result-Type" => self.result_type = Some(ResultType::from_header(value)?),
            "Column-Count" => self.column_count = parse_int(value)? as usize,
            "Row-Count" => self.row_count = parse_int(value)? as u32,
            "Row-Count-Sent" => self.row_count_sent = parse_int(value)? as u32,
            "Column-Aliases" => self.column_names = parse_aliases(value),
            "Column-Types" => {
                self.column_types = value
                    .split_whitespace()
                    .map(SqlType::from_tag)
                    .collect::<Result<_>>()?;
            }
            "Column-Updateability" => {
                // first token is a count or label, not a flag
                self.column_updateability = value
                    .split_whitespace()
                    .skip(1)
                    .map(|flag| flag == "Y")
                    .collect();
            }
            "Error-Code" => self.error_code = parse_int(value)? as i32,
            "Error-Component-Code" => self.error_component_code = parse_int(value)? as i32,
            "Error-Description" => self.error_description = value.to_string(),
            _ => {}
        }
        Ok(LineOutcome::Consumed)
    }

    /// Whether the reply announced a result set
    pub fn is_result_set(&self) -> bool {
        self.result_type == Some(ResultType::ResultSet)
    }

    /// Whether rows carry the 5-byte record id prefix (1 skip byte plus
    /// u32 LE id)
    pub fn has_record_ids(&self) -> bool {
        self.column_updateability.iter().any(|flag| *flag)
    }

    fn check_columns(&self) -> Result<()> {
        if !self.is_result_set() || self.error {
            return Ok(());
        }
        if self.column_names.len() != self.column_count
            || self.column_types.len() != self.column_count
            || self.column_updateability.len() != self.column_count
        {
            return Err(Error::Protocol(format!(
                "column metadata mismatch: {} names, {} types, {} flags for {} columns",
                self.column_names.len(),
                self.column_types.len(),
                self.column_updateability.len(),
                self.column_count
            )));
        }
        Ok(())
    }
}

/// Parse a `Column-Aliases` list like ` [id] [name]`: split on `]`, strip
/// the bracket framing, discard the trailing empty fragment.
fn parse_aliases(value: &str) -> Vec<String> {
    value
        .split(']')
        .map(|fragment| fragment.trim().trim_start_matches('[').to_string())
        .filter(|fragment| !fragment.is_empty())
        .collect()
}

fn parse_int(value: &str) -> Result<i64> {
    value
        .parse::<i64>()
        .map_err(|_| Error::Protocol(format!("invalid integer in header: {value:?}")))
}
