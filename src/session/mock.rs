//! session::mock
//!
//! Scripted connection for deterministic testing.
//!
//! # Design
//!
//! The mock holds a scripted inbound byte stream (lines and raw file
//! bodies) and records everything written to it. Clones share state, so a
//! test keeps one clone for assertions and boxes the other into a
//! [`Session`](super::Session).
//!
//! # Example
//!
//! ```
//! use cvsclient::session::mock::MockConnection;
//! use cvsclient::session::Connection;
//!
//! let mut conn = MockConnection::new().with_lines(["M hello", "ok"]);
//! assert_eq!(conn.read_line().unwrap(), "M hello");
//! assert_eq!(conn.lines_read(), 1);
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use super::{Connection, SessionError};

/// Scripted connection.
#[derive(Debug, Clone, Default)]
pub struct MockConnection {
    inner: Arc<Mutex<MockConnectionInner>>,
}

#[derive(Debug, Default)]
struct MockConnectionInner {
    incoming: VecDeque<u8>,
    sent: Vec<Sent>,
    lines_read: usize,
    flushes: usize,
    fail_on: Option<ConnectionFailOn>,
}

/// Something written to the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Line(String),
    Bytes(Vec<u8>),
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionFailOn {
    /// Fail every write.
    Write,
    /// Time out on the read after this many lines were read.
    ReadAfter(usize),
}

impl MockConnection {
    /// Create a connection with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a response line to the script.
    pub fn with_line(self, line: impl AsRef<str>) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.incoming.extend(line.as_ref().as_bytes());
            inner.incoming.push_back(b'\n');
        }
        self
    }

    /// Append several response lines.
    pub fn with_lines<I, S>(self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        lines.into_iter().fold(self, |conn, line| conn.with_line(line))
    }

    /// Append raw bytes (a file body) to the script.
    pub fn with_bytes(self, bytes: &[u8]) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.incoming.extend(bytes);
        }
        self
    }

    /// Configure a failure.
    pub fn fail_on(self, fail_on: ConnectionFailOn) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.fail_on = Some(fail_on);
        }
        self
    }

    /// Everything written, in order.
    pub fn sent(&self) -> Vec<Sent> {
        let inner = self.inner.lock().unwrap();
        inner.sent.clone()
    }

    /// Lines written, in order.
    pub fn sent_lines(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Line(line) => Some(line),
                Sent::Bytes(_) => None,
            })
            .collect()
    }

    /// Raw bytes written, concatenated.
    pub fn sent_bytes(&self) -> Vec<u8> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Bytes(bytes) => Some(bytes),
                Sent::Line(_) => None,
            })
            .flatten()
            .collect()
    }

    /// Number of lines read so far.
    pub fn lines_read(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.lines_read
    }

    /// Number of flushes.
    pub fn flush_count(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.flushes
    }

    /// Bytes of script not yet consumed.
    pub fn remaining(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.incoming.len()
    }
}

impl Connection for MockConnection {
    fn write_line(&mut self, line: &str) -> Result<(), SessionError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_on == Some(ConnectionFailOn::Write) {
            return Err(SessionError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "injected write failure",
            )));
        }
        inner.sent.push(Sent::Line(line.to_string()));
        Ok(())
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), SessionError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_on == Some(ConnectionFailOn::Write) {
            return Err(SessionError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "injected write failure",
            )));
        }
        inner.sent.push(Sent::Bytes(bytes.to_vec()));
        Ok(())
    }

    fn read_line(&mut self) -> Result<String, SessionError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(ConnectionFailOn::ReadAfter(limit)) = inner.fail_on {
            if inner.lines_read >= limit {
                return Err(SessionError::Timeout);
            }
        }
        let end = inner
            .incoming
            .iter()
            .position(|&b| b == b'\n')
            .ok_or(SessionError::Closed)?;
        let line: Vec<u8> = inner.incoming.drain(..=end).take(end).collect();
        inner.lines_read += 1;
        String::from_utf8(line)
            .map_err(|e| SessionError::Protocol(format!("response line is not UTF-8: {}", e)))
    }

    fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>, SessionError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.incoming.len() < len {
            return Err(SessionError::Closed);
        }
        Ok(inner.incoming.drain(..len).collect())
    }

    fn flush(&mut self) -> Result<(), SessionError> {
        let mut inner = self.inner.lock().unwrap();
        inner.flushes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_lines_then_closed() {
        let mut conn = MockConnection::new().with_lines(["a", "b"]);
        assert_eq!(conn.read_line().unwrap(), "a");
        assert_eq!(conn.read_line().unwrap(), "b");
        assert!(matches!(conn.read_line(), Err(SessionError::Closed)));
        assert_eq!(conn.lines_read(), 2);
    }

    #[test]
    fn bytes_between_lines() {
        let mut conn = MockConnection::new()
            .with_line("3")
            .with_bytes(b"a\nb")
            .with_line("ok");
        assert_eq!(conn.read_line().unwrap(), "3");
        assert_eq!(conn.read_bytes(3).unwrap(), b"a\nb".to_vec());
        assert_eq!(conn.read_line().unwrap(), "ok");
        assert_eq!(conn.remaining(), 0);
    }

    #[test]
    fn records_writes() {
        let mut conn = MockConnection::new();
        let observer = conn.clone();
        conn.write_line("Argument x").unwrap();
        conn.write_bytes(b"data").unwrap();
        assert_eq!(
            observer.sent(),
            vec![
                Sent::Line("Argument x".to_string()),
                Sent::Bytes(b"data".to_vec())
            ]
        );
    }

    #[test]
    fn injected_failures() {
        let mut conn = MockConnection::new()
            .with_lines(["a", "b"])
            .fail_on(ConnectionFailOn::ReadAfter(1));
        assert!(conn.read_line().is_ok());
        assert!(matches!(conn.read_line(), Err(SessionError::Timeout)));

        let mut conn = MockConnection::new().fail_on(ConnectionFailOn::Write);
        assert!(conn.write_line("x").is_err());
    }
}
