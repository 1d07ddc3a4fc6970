//! 4D SQL server connection
//!
//! This module provides the main `Connection` type for interacting with a 4D
//! database's SQL engine.
//!
//! # Example
//!
//! ```rust,ignore
//! use fourd_rs::{Config, Connection};
//!
//! #[tokio::main]
//! async fn main() -> fourd_rs::Result<()> {
//!     let config = Config::new("localhost", 19812, "admin", "secret");
//!     let conn = Connection::connect(config).await?;
//!
//!     let mut stmt = conn.query("SELECT id, name FROM people").await?;
//!     while let Some(row) = stmt.fetch_row() {
//!         println!("{:?}", row);
//!     }
//!
//!     conn.close().await?;
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, trace};

use crate::config::Config;
use crate::constants::FIRST_COMMAND_ID;
use crate::error::{Error, Result};
use crate::messages::request::login_request;
use crate::messages::response::ResponseHeader;
use crate::statement::Statement;
use crate::transport::TcpTransport;

/// Interior connection state, held behind the connection mutex.
///
/// The mutex guard is held across both phases of every exchange: replies
/// are correlated only by arrival order, so requests on one connection are
/// strictly serialised.
#[derive(Debug)]
pub(crate) struct ConnectionInner {
    pub(crate) transport: TcpTransport,
    /// Next command id to issue; odd, strictly monotone
    command_id: u32,
    closed: bool,
}

impl ConnectionInner {
    /// Take the current command id and advance by one round trip
    pub(crate) fn take_command_id(&mut self) -> u32 {
        let id = self.command_id;
        self.command_id += 2;
        id
    }

    /// Reserve two consecutive command ids for a two-phase execute and
    /// return the first
    pub(crate) fn reserve_command_ids(&mut self) -> u32 {
        let id = self.command_id;
        self.command_id += 4;
        id
    }

    pub(crate) fn ensure_open(&self) -> Result<()> {
        if self.closed {
            Err(Error::ConnectionNotReady)
        } else {
            Ok(())
        }
    }

    pub(crate) fn mark_closed(&mut self) {
        self.closed = true;
    }
}

/// A connection to a 4D SQL server.
///
/// The connection logs in during [`connect`](Connection::connect) and owns
/// the TCP stream exclusively. Statements produced by the same connection
/// share it by serial discipline; the handle is cheap to clone.
///
/// A connection is **not** a unit of concurrency: issuing a statement while
/// another is in flight waits on the connection lock.
#[derive(Clone, Debug)]
pub struct Connection {
    inner: Arc<Mutex<ConnectionInner>>,
}

impl Connection {
    /// Open a TCP stream to the configured server and log in.
    ///
    /// On an `ERROR` reply the socket is closed and the server's code and
    /// description are surfaced as [`Error::Login`].
    pub async fn connect(config: Config) -> Result<Self> {
        let mut transport = TcpTransport::new();
        transport.connect_with_config(&config).await?;
        debug!(host = %config.host, port = config.port, "connected, logging in");

        transport
            .send(login_request(&config.username, config.password()).as_bytes())
            .await?;
        let reply = ResponseHeader::read_block(&mut transport).await?;
        if reply.error {
            let err = Error::login(reply.error_code, &reply.error_description);
            let _ = transport.shutdown().await;
            return Err(err);
        }
        trace!("login accepted");

        Ok(Self {
            inner: Arc::new(Mutex::new(ConnectionInner {
                transport,
                // LOGIN consumed the first id
                command_id: FIRST_COMMAND_ID + 2,
                closed: false,
            })),
        })
    }

    pub(crate) async fn lock(&self) -> MutexGuard<'_, ConnectionInner> {
        self.inner.lock().await
    }

    /// Prepare a statement for later execution.
    ///
    /// Two consecutive command ids are reserved so the two-phase execute
    /// runs with adjacent ids. `?` markers in `sql` are bound at
    /// [`execute`](Statement::execute) time.
    pub async fn prepare(&self, sql: &str) -> Result<Statement> {
        let mut inner = self.lock().await;
        inner.ensure_open()?;
        let reserved_id = inner.reserve_command_ids();
        Ok(Statement::prepared(self.clone(), sql, reserved_id))
    }

    /// Execute `sql` immediately with no arguments and return the executed
    /// statement, ready for fetching.
    pub async fn query(&self, sql: &str) -> Result<Statement> {
        {
            let inner = self.lock().await;
            inner.ensure_open()?;
        }
        let mut stmt = Statement::adhoc(self.clone(), sql);
        stmt.execute(&[]).await?;
        Ok(stmt)
    }

    /// Start a transaction
    pub async fn begin_transaction(&self) -> Result<()> {
        self.query("START").await?;
        Ok(())
    }

    /// Commit the current transaction
    pub async fn commit(&self) -> Result<()> {
        self.query("COMMIT").await?;
        Ok(())
    }

    /// Roll back the current transaction
    pub async fn rollback(&self) -> Result<()> {
        self.query("ROLLBACK").await?;
        Ok(())
    }

    /// Whether the connection has been closed, by [`close`](Connection::close)
    /// or by a transport error
    pub async fn is_closed(&self) -> bool {
        self.lock().await.closed
    }

    /// Shut down the write side and close the socket. Idempotent.
    pub async fn close(&self) -> Result<()> {
        let mut inner = self.lock().await;
        if inner.closed {
            return Ok(());
        }
        debug!("closing connection");
        inner.mark_closed();
        inner.transport.shutdown().await
    }
}
