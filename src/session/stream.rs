//! session::stream
//!
//! [`Connection`] over a reader/writer pair.
//!
//! The caller owns the transport (a pipe to a `cvs server` process, a
//! socket, an SSH channel) and hands its two halves to
//! [`StreamConnection::new`]. Lines are `\n` terminated; a trailing `\r` is
//! tolerated on input.

use std::io::{BufRead, Read, Write};

use super::{Connection, SessionError};

/// Line framing over any `BufRead` + `Write` pair.
#[derive(Debug)]
pub struct StreamConnection<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> StreamConnection<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Recover the reader and writer.
    pub fn into_parts(self) -> (R, W) {
        (self.reader, self.writer)
    }
}

fn map_read_error(e: std::io::Error) -> SessionError {
    match e.kind() {
        std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock => SessionError::Timeout,
        std::io::ErrorKind::UnexpectedEof => SessionError::Closed,
        _ => SessionError::Io(e),
    }
}

impl<R: BufRead + Send, W: Write + Send> Connection for StreamConnection<R, W> {
    fn write_line(&mut self, line: &str) -> Result<(), SessionError> {
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), SessionError> {
        self.writer.write_all(bytes)?;
        Ok(())
    }

    fn read_line(&mut self) -> Result<String, SessionError> {
        let mut buf = Vec::new();
        let read = self
            .reader
            .read_until(b'\n', &mut buf)
            .map_err(map_read_error)?;
        if read == 0 {
            return Err(SessionError::Closed);
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
        } else {
            return Err(SessionError::Closed);
        }
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
        String::from_utf8(buf)
            .map_err(|e| SessionError::Protocol(format!("response line is not UTF-8: {}", e)))
    }

    fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>, SessionError> {
        // The size comes from the server; grow only with bytes that arrive.
        let mut buf = Vec::new();
        (&mut self.reader)
            .take(len as u64)
            .read_to_end(&mut buf)
            .map_err(map_read_error)?;
        if buf.len() < len {
            return Err(SessionError::Closed);
        }
        Ok(buf)
    }

    fn flush(&mut self) -> Result<(), SessionError> {
        self.writer.flush()?;
        Ok(())
    }
}
