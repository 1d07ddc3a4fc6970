#![warn(missing_docs)]

//! # fourd-rs
//!
//! A pure Rust driver for the 4D (4th Dimension) database's SQL engine. No
//! native 4D client libraries required.
//!
//! This crate implements the 4D SQL server's line-oriented wire protocol
//! entirely in Rust: login, parameterised statement execution, transactions,
//! and typed result decoding, targeting 4D server versions 11 through 13.
//!
//! ## Features
//!
//! - **Pure Rust** - speaks the wire protocol directly over TCP
//! - **Async/await** - built on Tokio
//! - **Typed results** - the full 4D column type catalogue, including the
//!   server's variable-precision float and UTF-16LE strings
//! - **Positional parameters** - `?` markers with literal escaping
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fourd_rs::{Config, Connection, Value};
//!
//! #[tokio::main]
//! async fn main() -> fourd_rs::Result<()> {
//!     let config = Config::new("localhost", 19812, "admin", "secret");
//!     let conn = Connection::connect(config).await?;
//!
//!     let mut stmt = conn.prepare("SELECT id, name FROM people WHERE age > ?").await?;
//!     stmt.execute(&[Value::Integer(30)]).await?;
//!
//!     while let Some(row) = stmt.fetch_row() {
//!         let id = row.get_i64(0).unwrap_or(0);
//!         let name = row.get_string(1).unwrap_or("");
//!         println!("{}: {}", id, name);
//!     }
//!
//!     conn.close().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Transactions
//!
//! ```rust,no_run
//! use fourd_rs::{Connection, Value};
//!
//! # async fn example(conn: Connection) -> fourd_rs::Result<()> {
//! conn.begin_transaction().await?;
//!
//! let mut stmt = conn.prepare("UPDATE accounts SET balance = ? WHERE id = ?").await?;
//! stmt.execute(&[Value::Float(99.5), Value::Integer(1)]).await?;
//!
//! conn.commit().await?;
//! // or conn.rollback().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Data Types
//!
//! | 4D Type | Rust Type |
//! |---------|-----------|
//! | BOOLEAN | `bool` |
//! | BYTE, WORD, LONG, LONG8, DURATION | `i64` |
//! | REAL, FLOAT | `f64` |
//! | STRING (UTF-16LE on the wire) | `String` |
//! | BLOB, IMAGE | `Vec<u8>` |
//! | TIMESTAMP, TIME | formatted `String` (`DD.MM.YYYY[ HH:MM:SS]`) |
//!
//! ## Concurrency
//!
//! One connection serves one request at a time: replies carry no framing
//! tag and are correlated by arrival order, so the driver serialises all
//! exchanges on an internal lock. For parallel statements, open parallel
//! connections.
//!
//! ## Limitations
//!
//! There is no TLS; the targeted server versions transmit credentials
//! base64-encoded on the plaintext stream. Result sets are materialised in
//! memory in full.

pub mod bind;
pub mod config;
pub mod connection;
pub mod constants;
pub mod error;
pub mod messages;
pub mod row;
pub mod statement;
pub mod transport;
pub mod wire;

// Re-export commonly used types
pub use config::Config;
pub use connection::Connection;
pub use constants::{FetchStyle, ResultType, SqlType};
pub use error::{Error, Result};
pub use messages::{LineOutcome, ResponseHeader};
pub use row::{Fetched, Row, RowDecoder, Value};
pub use statement::{ExecuteResult, Statement};
pub use transport::TcpTransport;
