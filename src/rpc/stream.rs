//! `std::io` adapters over [`Transport`].
//!
//! The codec reads and writes through `io::Read` / `io::Write`; these
//! adapters bridge that to a transport with a small fixed buffer so a
//! message is handed to the channel in a few large writes instead of one
//! write per JSON token.

use std::borrow::Cow;
use std::io;

use log::warn;

use super::transport::Transport;
use crate::config::RpcConfig;

/// Size of the read-ahead and write-behind buffers.
pub const BUFFER_SIZE: usize = 128;

fn transport_error<E: core::fmt::Debug>(e: E) -> io::Error {
    io::Error::other(format!("transport: {e:?}"))
}

// ── Writer ───────────────────────────────────────────────────

/// Buffers output and hands it to the transport in chunks of at most
/// [`BUFFER_SIZE`] bytes.
pub struct BufferedWriter<T: Transport> {
    transport: T,
    buf: heapless::Vec<u8, BUFFER_SIZE>,
}

impl<T: Transport> BufferedWriter<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            buf: heapless::Vec::new(),
        }
    }

    /// Bytes waiting in the buffer.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Unwrap the transport. Buffered bytes not yet flushed are dropped.
    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Hand the whole buffer to the transport, retrying short writes.
    fn drain(&mut self) -> io::Result<()> {
        while !self.buf.is_empty() {
            let n = self.transport.write(&self.buf).map_err(transport_error)?;
            if n == 0 {
                return Err(io::ErrorKind::WriteZero.into());
            }
            let n = n.min(self.buf.len());
            let remaining = self.buf.len() - n;
            self.buf.copy_within(n.., 0);
            self.buf.truncate(remaining);
        }
        Ok(())
    }
}

impl<T: Transport> io::Write for BufferedWriter<T> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        if data.is_empty() {
            return Ok(0);
        }
        if self.buf.is_full() {
            self.drain()?;
        }
        let n = data.len().min(BUFFER_SIZE - self.buf.len());
        self.buf
            .extend_from_slice(&data[..n])
            .map_err(|_| io::Error::other("write buffer overflow"))?;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.drain()?;
        self.transport.flush().map_err(transport_error)
    }
}

// ── Reader ───────────────────────────────────────────────────

/// Read-ahead buffer over a transport.
///
/// Two ways to pull input:
/// - `io::Read`, for parsers that block until a value is complete. A
///   transport read of 0 bytes is `WouldBlock` while the transport is
///   connected and end of input once it is not.
/// - [`next_frame`](Self::next_frame), which collects one top-level JSON
///   value across as many transport reads as it takes and keeps partial
///   input between calls.
pub struct BufferedReader<T: Transport> {
    transport: T,
    buf: [u8; BUFFER_SIZE],
    pos: usize,
    len: usize,
    frame: FrameScanner,
    frame_limit: usize,
}

impl<T: Transport> BufferedReader<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            buf: [0; BUFFER_SIZE],
            pos: 0,
            len: 0,
            frame: FrameScanner::default(),
            frame_limit: RpcConfig::MAX_MESSAGE_SIZE,
        }
    }

    /// Reject inbound frames longer than `limit` bytes.
    #[must_use]
    pub fn with_frame_limit(mut self, limit: usize) -> Self {
        self.frame_limit = limit;
        self
    }

    /// `true` when buffered bytes remain or the transport has more.
    pub fn available(&self) -> bool {
        self.pos < self.len || self.transport.available()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Bytes of a frame received so far but not yet complete.
    pub fn partial_frame(&self) -> usize {
        self.frame.bytes.len()
    }

    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Next complete top-level JSON value, or `Ok(None)` when the transport
    /// has nothing more right now. A partial frame stays buffered until
    /// the rest arrives.
    ///
    /// A frame over the limit is consumed to its end and then reported as
    /// `InvalidData`. A connection that drops mid-frame is `UnexpectedEof`.
    pub fn next_frame(&mut self) -> io::Result<Option<Vec<u8>>> {
        loop {
            if self.pos == self.len {
                let n = self.transport.read(&mut self.buf).map_err(transport_error)?;
                self.pos = 0;
                self.len = n;
                if n == 0 {
                    if self.transport.is_connected() || !self.frame.is_started() {
                        return Ok(None);
                    }
                    self.frame.reset();
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "connection closed mid-frame",
                    ));
                }
            }

            while self.pos < self.len {
                let byte = self.buf[self.pos];
                self.pos += 1;
                if !self.frame.push(byte, self.frame_limit) {
                    continue;
                }
                if self.frame.oversized {
                    self.frame.reset();
                    warn!("RPC: dropped inbound frame over {} bytes", self.frame_limit);
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        "frame exceeds size limit",
                    ));
                }
                return Ok(Some(self.frame.take()));
            }
        }
    }
}

impl<T: Transport> io::Read for BufferedReader<T> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if out.is_empty() {
            return Ok(0);
        }
        if self.pos == self.len {
            self.len = self.transport.read(&mut self.buf).map_err(transport_error)?;
            self.pos = 0;
            if self.len == 0 && self.transport.is_connected() {
                return Err(io::ErrorKind::WouldBlock.into());
            }
        }
        let n = out.len().min(self.len - self.pos);
        out[..n].copy_from_slice(&self.buf[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

/// Finds the end of one top-level JSON value without parsing it: counts
/// bracket depth outside of strings. A bare scalar ends at whitespace.
#[derive(Debug, Default)]
struct FrameScanner {
    bytes: Vec<u8>,
    depth: u32,
    in_string: bool,
    escaped: bool,
    oversized: bool,
}

impl FrameScanner {
    fn is_started(&self) -> bool {
        !self.bytes.is_empty() || self.oversized
    }

    fn reset(&mut self) {
        self.bytes.clear();
        self.depth = 0;
        self.in_string = false;
        self.escaped = false;
        self.oversized = false;
    }

    fn take(&mut self) -> Vec<u8> {
        let bytes = core::mem::take(&mut self.bytes);
        self.reset();
        bytes
    }

    fn store(&mut self, byte: u8, limit: usize) {
        if self.bytes.len() < limit {
            self.bytes.push(byte);
        } else {
            self.oversized = true;
        }
    }

    /// Consume one byte; `true` when it completes the frame.
    fn push(&mut self, byte: u8, limit: usize) -> bool {
        if self.in_string {
            self.store(byte, limit);
            if self.escaped {
                self.escaped = false;
            } else if byte == b'\\' {
                self.escaped = true;
            } else if byte == b'"' {
                self.in_string = false;
                return self.depth == 0;
            }
            return false;
        }
        if byte.is_ascii_whitespace() {
            if self.depth == 0 {
                // Between frames, or the end of a bare scalar.
                return self.is_started();
            }
            self.store(byte, limit);
            return false;
        }
        self.store(byte, limit);
        match byte {
            b'"' => self.in_string = true,
            b'[' | b'{' => self.depth += 1,
            b']' | b'}' => {
                self.depth = self.depth.saturating_sub(1);
                return self.depth == 0;
            }
            _ => {}
        }
        false
    }
}

// ── In-memory endpoints ──────────────────────────────────────

/// Fixed in-memory input.
#[derive(Debug, Clone, Default)]
pub struct StringReader {
    data: Vec<u8>,
    pos: usize,
}

impl StringReader {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            pos: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn take(&mut self, out: &mut [u8]) -> usize {
        let n = out.len().min(self.remaining());
        out[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        n
    }
}

impl io::Read for StringReader {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        Ok(self.take(out))
    }
}

/// Read-only transport: writes are discarded.
impl Transport for StringReader {
    type Error = core::convert::Infallible;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        Ok(self.take(buf))
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error> {
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn available(&self) -> bool {
        self.remaining() > 0
    }

    /// Fixed input: the stream ends once it is drained.
    fn is_connected(&self) -> bool {
        self.remaining() > 0
    }
}

/// Growable in-memory output.
///
/// As a transport it can simulate a congested channel: with a chunk limit
/// each write accepts at most that many bytes (0 stalls the channel).
#[derive(Debug, Clone, Default)]
pub struct StringWriter {
    data: Vec<u8>,
    chunk_limit: Option<usize>,
    writes: usize,
    flushes: usize,
}

impl StringWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chunk_limit(limit: usize) -> Self {
        Self {
            chunk_limit: Some(limit),
            ..Self::default()
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.data)
    }

    /// Number of transport writes that accepted data.
    pub fn write_count(&self) -> usize {
        self.writes
    }

    pub fn flush_count(&self) -> usize {
        self.flushes
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    fn accept(&mut self, data: &[u8]) -> usize {
        let n = self.chunk_limit.map_or(data.len(), |limit| data.len().min(limit));
        if n > 0 {
            self.data.extend_from_slice(&data[..n]);
            self.writes += 1;
        }
        n
    }
}

impl io::Write for StringWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        Ok(self.accept(data))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flushes += 1;
        Ok(())
    }
}

/// Write-only transport: reads return no data.
impl Transport for StringWriter {
    type Error = core::convert::Infallible;

    fn read(&mut self, _buf: &mut [u8]) -> Result<usize, Self::Error> {
        Ok(0)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error> {
        Ok(self.accept(data))
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.flushes += 1;
        Ok(())
    }

    fn available(&self) -> bool {
        false
    }
}

// ── Size calculator ──────────────────────────────────────────

/// Sink that only counts bytes; used to size a message before sending.
#[derive(Debug, Clone, Copy, Default)]
pub struct SizeCalculator {
    size: usize,
}

impl SizeCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

impl io::Write for SizeCalculator {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.size += data.len();
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
