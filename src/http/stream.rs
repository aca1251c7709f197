//! Buffered, line-oriented reads over a raw byte stream.

use bytes::{Buf, BytesMut};
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Capacity of the internal read buffer.
pub const BUFFER_SIZE: usize = 1024;

/// Wraps a connection with a fixed-size read buffer.
///
/// The length of `buffer` is the number of unread bytes and its front is the
/// next unread byte. A refill only happens once every buffered byte has been
/// consumed, so a single raw read never exceeds [`BUFFER_SIZE`].
pub struct BufferedStream<S> {
    inner: S,
    buffer: BytesMut,
    broken: bool,
}

impl<S: AsyncRead + Unpin> BufferedStream<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            buffer: BytesMut::with_capacity(BUFFER_SIZE),
            broken: false,
        }
    }

    /// Number of bytes read from the connection but not yet consumed.
    pub fn unread(&self) -> usize {
        self.buffer.len()
    }

    pub fn get_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    /// Issues one raw read of up to [`BUFFER_SIZE`] bytes.
    ///
    /// Returns `Ok(0)` at end of stream. Interrupted reads are retried. Any
    /// other failure marks the stream as broken and every later call fails.
    pub async fn fill(&mut self) -> io::Result<usize> {
        if self.broken {
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "buffered stream is broken",
            ));
        }

        self.buffer.clear();
        let mut limited = (&mut self.inner).take(BUFFER_SIZE as u64);

        loop {
            match limited.read_buf(&mut self.buffer).await {
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.broken = true;
                    return Err(e);
                }
            }
        }
    }

    /// Returns the next byte, or `None` at end of stream.
    pub async fn read_byte(&mut self) -> io::Result<Option<u8>> {
        if !self.buffer.has_remaining() && self.fill().await? == 0 {
            return Ok(None);
        }
        Ok(Some(self.buffer.get_u8()))
    }

    /// Appends one line to `line`, including its trailing `\n` if one was seen.
    ///
    /// At most `max_length - 1` bytes are collected. Returns `Ok(0)` when the
    /// stream ends before any byte of this call was read. A read error after
    /// some bytes were collected ends the line early; the error surfaces on
    /// the next call.
    pub async fn read_line(&mut self, line: &mut Vec<u8>, max_length: usize) -> io::Result<usize> {
        let mut collected = 0;

        while collected + 1 < max_length {
            let byte = match self.read_byte().await {
                Ok(Some(b)) => b,
                Ok(None) => break,
                Err(e) if collected == 0 => return Err(e),
                Err(_) => break,
            };

            line.push(byte);
            collected += 1;

            if byte == b'\n' {
                break;
            }
        }

        Ok(collected)
    }
}
