//! TCP transport implementation

use std::time::Duration;

use bytes::Bytes;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::config::{Config, DEFAULT_CONNECT_TIMEOUT};
use crate::error::{Error, Result};

/// TCP transport for 4D connections.
///
/// One transport is exclusively owned by one connection; replies are
/// correlated only by arrival order, so no request may be issued while
/// another is in flight.
#[derive(Debug)]
pub struct TcpTransport {
    /// The underlying TCP stream
    stream: Option<TcpStream>,
    /// Connection timeout
    connect_timeout: Duration,
    /// Per-read deadline
    read_timeout: Option<Duration>,
}

impl TcpTransport {
    /// Create a new TCP transport (not yet connected)
    pub fn new() -> Self {
        Self {
            stream: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: None,
        }
    }

    /// Set the connection timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Connect to the specified address
    pub async fn connect(&mut self, addr: &str) -> Result<()> {
        let stream = timeout(self.connect_timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| Error::ConnectTimeout(self.connect_timeout))?
            .map_err(|source| Error::TransportConnect {
                addr: addr.to_string(),
                source,
            })?;

        stream.set_nodelay(true).map_err(Error::TransportCreation)?;

        self.stream = Some(stream);
        Ok(())
    }

    /// Connect using a Config
    pub async fn connect_with_config(&mut self, config: &Config) -> Result<()> {
        self.connect_timeout = config.connect_timeout;
        self.read_timeout = config.read_timeout;

        self.connect(&config.socket_addr()).await
    }

    /// The configured per-read deadline
    pub fn read_deadline(&self) -> Option<Duration> {
        self.read_timeout
    }

    /// Get mutable access to the underlying stream
    pub(crate) fn stream_mut(&mut self) -> Result<&mut TcpStream> {
        self.stream.as_mut().ok_or(Error::ConnectionClosed)
    }

    /// Send a request frame
    pub async fn send(&mut self, data: &[u8]) -> Result<()> {
        let stream = self.stream_mut()?;
        stream.write_all(data).await.map_err(Error::Io)?;
        stream.flush().await.map_err(Error::Io)?;
        Ok(())
    }

    /// Read exactly n bytes from the stream.
    ///
    /// Blocks until the full count is received; there is no short-read
    /// success. A disconnect surfaces as [`Error::ConnectionClosed`].
    pub async fn read_exact(&mut self, n: usize) -> Result<Bytes> {
        let deadline = self.read_timeout;
        let stream = self.stream_mut()?;

        let mut buf = vec![0u8; n];
        let read = stream.read_exact(&mut buf);
        match deadline {
            Some(limit) => timeout(limit, read)
                .await
                .map_err(|_| Error::ReadTimeout(limit))?,
            None => read.await,
        }
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                Error::ConnectionClosed
            } else {
                Error::Io(e)
            }
        })?;

        Ok(Bytes::from(buf))
    }

    /// Read a CRLF-terminated line, accumulating single bytes until the
    /// `\r\n` pair is observed. The returned line includes the terminator.
    pub async fn read_line(&mut self) -> Result<String> {
        let mut line = Vec::new();
        loop {
            let byte = self.read_exact(1).await?;
            line.push(byte[0]);
            if line.ends_with(b"\r\n") {
                break;
            }
        }
        String::from_utf8(line).map_err(|_| Error::Protocol("non-ASCII header line".to_string()))
    }

    /// Whether the transport holds an open stream
    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Shut down the write side and drop the stream. Idempotent.
    pub async fn shutdown(&mut self) -> Result<()> {
        if let Some(mut stream) = self.stream.take() {
            stream.shutdown().await.map_err(Error::Io)?;
        }
        Ok(())
    }
}

impl Default for TcpTransport {
    fn default() -> Self {
        Self::new()
    }
}
