//! Connection configuration
//!
//! The 4D SQL server has no connect-string syntax; connections are described
//! by host, port, and credentials. The server port is caller-supplied.

use std::time::Duration;

/// Default connection timeout
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection configuration for a 4D SQL server.
///
/// # Examples
///
/// ```rust
/// use fourd_rs::Config;
/// use std::time::Duration;
///
/// let config = Config::new("localhost", 19812, "admin", "secret")
///     .connect_timeout(Duration::from_secs(30))
///     .read_timeout(Duration::from_secs(60));
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Host to connect to. Non-literal hosts are resolved via DNS.
    pub host: String,
    /// Port to connect to
    pub port: u16,
    /// Username for authentication
    pub username: String,
    /// Password for authentication (transmitted base64-encoded, not encrypted)
    password: String,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Per-read deadline; `None` blocks indefinitely
    pub read_timeout: Option<Duration>,
}

impl Config {
    /// Create a new configuration
    pub fn new(
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            username: username.into(),
            password: password.into(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: None,
        }
    }

    /// Set the connection timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set a deadline for every read on the connection.
    ///
    /// The protocol itself mandates no timeout; an expired deadline is
    /// surfaced as [`Error::ReadTimeout`](crate::Error::ReadTimeout) and
    /// closes the connection.
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    /// The password (kept off the public fields)
    pub fn password(&self) -> &str {
        &self.password
    }

    /// `host:port` string for the TCP connect call
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
