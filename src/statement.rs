//! SQL statement execution
//!
//! Every user-visible execute performs a two-phase exchange on the owning
//! connection: a probe with `FIRST-PAGE-SIZE : 1` that reports the result
//! shape, then - for non-empty result sets - a refetch sized to the full row
//! count. The connection is held exclusively from the first byte of the
//! probe to the last byte of the refetch; replies carry no framing tag and
//! are correlated by order alone.

use std::collections::VecDeque;

use tracing::{debug, trace};

use crate::bind::bind_parameters;
use crate::connection::{Connection, ConnectionInner};
use crate::constants::{FetchStyle, ResultType, SqlType};
use crate::error::{Error, Result};
use crate::messages::request::{close_statement_request, execute_request};
use crate::messages::response::ResponseHeader;
use crate::row::{Fetched, Row, RowDecoder, Value};
use crate::transport::TcpTransport;

/// Result of executing a statement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecuteResult {
    /// The statement produced an update count (INSERT, UPDATE, DELETE)
    RowsAffected(u32),
    /// The statement produced an empty result set
    NoRows,
    /// The statement produced a result set, fully materialised
    ResultSet {
        /// Number of rows in the statement's row buffer
        row_count: u32,
    },
}

impl ExecuteResult {
    /// Rows affected, for update-count results
    pub fn rows_affected(&self) -> Option<u32> {
        match self {
            ExecuteResult::RowsAffected(count) => Some(*count),
            _ => None,
        }
    }

    /// Whether the statement produced a (possibly empty) result set
    pub fn is_result_set(&self) -> bool {
        matches!(
            self,
            ExecuteResult::NoRows | ExecuteResult::ResultSet { .. }
        )
    }
}

/// A SQL statement bound to one connection.
///
/// Created by [`Connection::prepare`] or [`Connection::query`]. `?` markers
/// in the statement text are preserved verbatim until bind time. After a
/// successful execute the statement holds the materialised row buffer, which
/// the `fetch_*` methods consume front to back.
///
/// # Example
///
/// ```rust,no_run
/// use fourd_rs::{Connection, Value};
///
/// # async fn example(conn: Connection) -> fourd_rs::Result<()> {
/// let mut stmt = conn.prepare("SELECT id, name FROM people WHERE age > ?").await?;
/// stmt.execute(&[Value::Integer(30)]).await?;
///
/// while let Some(row) = stmt.fetch_row() {
///     println!("{}: {}", row.get_i64(0).unwrap_or(0), row.get_string(1).unwrap_or(""));
/// }
/// stmt.close_cursor().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Statement {
    conn: Connection,
    /// Statement text with `?` markers intact
    text: String,
    /// Command id reserved at prepare time; ad hoc statements draw ids
    /// from the connection at send time
    reserved_id: Option<u32>,
    /// Header of the last completed exchange
    header: Option<ResponseHeader>,
    /// Result of the last execute
    result: Option<ExecuteResult>,
    /// Materialised rows, consumed by the fetch methods
    rows: VecDeque<Row>,
}

impl Statement {
    pub(crate) fn prepared(conn: Connection, sql: &str, reserved_id: u32) -> Self {
        Self {
            conn,
            text: sql.to_string(),
            reserved_id: Some(reserved_id),
            header: None,
            result: None,
            rows: VecDeque::new(),
        }
    }

    pub(crate) fn adhoc(conn: Connection, sql: &str) -> Self {
        Self {
            conn,
            text: sql.to_string(),
            reserved_id: None,
            header: None,
            result: None,
            rows: VecDeque::new(),
        }
    }

    /// Execute the statement with the given arguments.
    ///
    /// Arguments are bound into the statement text before any bytes are
    /// written; a placeholder/argument count mismatch fails immediately.
    /// A server-reported error leaves the connection usable; transport,
    /// decode, and protocol errors abandon the reply mid-stream and close
    /// the connection.
    pub async fn execute(&mut self, args: &[Value]) -> Result<ExecuteResult> {
        let sql = bind_parameters(&self.text, args)?;

        let conn = self.conn.clone();
        let mut inner = conn.lock().await;
        inner.ensure_open()?;

        let result = self.exchange(&mut inner, &sql).await;
        match &result {
            Ok(outcome) => self.result = Some(*outcome),
            Err(e) if e.poisons_connection() => inner.mark_closed(),
            Err(_) => {}
        }
        result
    }

    /// The two-phase execute-then-refetch exchange, run under the
    /// connection lock.
    async fn exchange(
        &mut self,
        inner: &mut ConnectionInner,
        sql: &str,
    ) -> Result<ExecuteResult> {
        let probe_id = match self.reserved_id {
            Some(id) => id,
            None => inner.take_command_id(),
        };
        trace!(command_id = probe_id, "probe phase");
        inner
            .transport
            .send(execute_request(probe_id, sql, 1).as_bytes())
            .await?;

        let probe = ResponseHeader::read_block(&mut inner.transport).await?;
        if probe.error {
            return Err(Error::statement(probe.error_code, &probe.error_description));
        }

        match probe.result_type {
            Some(ResultType::UpdateCount) => {
                let affected = probe.row_count;
                self.header = Some(probe);
                // the row buffer is left untouched by update counts
                Ok(ExecuteResult::RowsAffected(affected))
            }
            Some(ResultType::ResultSet) => {
                if probe.row_count == 0 {
                    self.header = Some(probe);
                    self.rows.clear();
                    return Ok(ExecuteResult::NoRows);
                }

                // drain the probe page to keep the stream in sync
                read_page(&mut inner.transport, &probe).await?;

                let refetch_id = match self.reserved_id {
                    Some(id) => id + 2,
                    None => inner.take_command_id(),
                };
                debug!(
                    command_id = refetch_id,
                    rows = probe.row_count,
                    "refetch phase"
                );
                inner
                    .transport
                    .send(execute_request(refetch_id, sql, probe.row_count).as_bytes())
                    .await?;

                let full = ResponseHeader::read_block(&mut inner.transport).await?;
                if full.error {
                    return Err(Error::statement(full.error_code, &full.error_description));
                }
                let rows = read_page(&mut inner.transport, &full).await?;

                let row_count = full.row_count;
                self.rows = rows.into();
                self.header = Some(full);
                Ok(ExecuteResult::ResultSet { row_count })
            }
            None => Err(Error::Protocol(
                "reply carries no Result-Type".to_string(),
            )),
        }
    }

    /// Close the server-side cursor for the last executed statement.
    ///
    /// A no-op when nothing has been executed yet.
    pub async fn close_cursor(&mut self) -> Result<()> {
        let Some(statement_id) = self.header.as_ref().map(|h| h.statement_id) else {
            return Ok(());
        };

        let mut inner = self.conn.lock().await;
        inner.ensure_open()?;
        let command_id = inner.take_command_id();
        trace!(command_id, statement_id, "closing cursor");
        let result = close_exchange(&mut inner, command_id, statement_id).await;
        if let Err(e) = &result {
            if e.poisons_connection() {
                inner.mark_closed();
            }
        }
        result
    }

    // =========================================================================
    // Fetch API (destructive, front of buffer first)
    // =========================================================================

    /// Remove and return the next row in the requested style
    pub fn fetch(&mut self, style: FetchStyle) -> Option<Fetched> {
        self.rows.pop_front().map(|row| row.project(style))
    }

    /// Remove and return the next row with combined index/name access
    pub fn fetch_row(&mut self) -> Option<Row> {
        self.rows.pop_front()
    }

    /// Remove the next row and return one of its cells
    pub fn fetch_column(&mut self, index: usize) -> Option<Value> {
        self.rows
            .pop_front()
            .and_then(|row| row.into_values().into_iter().nth(index))
    }

    /// Rows still waiting in the buffer
    pub fn rows_remaining(&self) -> usize {
        self.rows.len()
    }

    // =========================================================================
    // Response metadata accessors
    // =========================================================================

    /// Result of the last execute
    pub fn result(&self) -> Option<ExecuteResult> {
        self.result
    }

    /// Result type announced by the server
    pub fn result_type(&self) -> Option<ResultType> {
        self.header.as_ref().and_then(|h| h.result_type)
    }

    /// Total row count announced by the server
    pub fn row_count(&self) -> Option<u32> {
        self.header.as_ref().map(|h| h.row_count)
    }

    /// Server-assigned statement id
    pub fn statement_id(&self) -> Option<i64> {
        self.header.as_ref().map(|h| h.statement_id)
    }

    /// Number of columns in the result set
    pub fn column_count(&self) -> Option<usize> {
        self.header.as_ref().map(|h| h.column_count)
    }

    /// Column names, in column order
    pub fn column_names(&self) -> Option<&[String]> {
        self.header.as_ref().map(|h| h.column_names.as_slice())
    }

    /// Column types, in column order
    pub fn column_types(&self) -> Option<&[SqlType]> {
        self.header.as_ref().map(|h| h.column_types.as_slice())
    }

    /// Server error code from the last exchange
    pub fn error_code(&self) -> Option<i32> {
        self.header.as_ref().map(|h| h.error_code)
    }

    /// Server error description from the last exchange
    pub fn error_description(&self) -> Option<&str> {
        self.header.as_ref().map(|h| h.error_description.as_str())
    }
}

/// Send a CLOSE-STATEMENT frame and consume the short acknowledgement.
async fn close_exchange(
    inner: &mut ConnectionInner,
    command_id: u32,
    statement_id: i64,
) -> Result<()> {
    inner
        .transport
        .send(close_statement_request(command_id, statement_id).as_bytes())
        .await?;
    ResponseHeader::read_block(&mut inner.transport).await?;
    Ok(())
}

/// Decode one page of rows from the transport, honoring the configured
/// read deadline for the whole page.
async fn read_page(transport: &mut TcpTransport, header: &ResponseHeader) -> Result<Vec<Row>> {
    let deadline = transport.read_deadline();
    let decoder = RowDecoder::from_header(header);
    let stream = transport.stream_mut()?;
    let decode = decoder.decode_page(stream, header.row_count_sent);
    match deadline {
        Some(limit) => tokio::time::timeout(limit, decode)
            .await
            .map_err(|_| Error::ReadTimeout(limit))?,
        None => decode.await,
    }
}
