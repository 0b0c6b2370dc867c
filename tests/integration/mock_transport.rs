//! Mock transport for integration tests.
//!
//! Inbound bytes are queued by the test; outbound bytes are recorded so
//! tests can assert on the exact frames the stack wrote. The channel can be
//! throttled or broken to exercise the adapters' error paths.

use std::collections::VecDeque;

use chargelink::rpc::transport::Transport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockError {
    Disconnected,
}

pub struct MockTransport {
    inbound: VecDeque<u8>,
    pub outbound: Vec<u8>,
    /// Maximum bytes accepted per `write` call.
    pub max_write: usize,
    /// Maximum bytes returned per `read` call.
    pub max_read: usize,
    pub connected: bool,
    /// Reported as the negotiated WebSocket subprotocol.
    pub subprotocol: Option<&'static str>,
    pub writes: usize,
    pub flushes: usize,
}

#[allow(dead_code)]
impl MockTransport {
    pub fn new() -> Self {
        Self {
            inbound: VecDeque::new(),
            outbound: Vec::new(),
            max_write: usize::MAX,
            max_read: usize::MAX,
            connected: true,
            subprotocol: Some("ocpp1.6"),
            writes: 0,
            flushes: 0,
        }
    }

    /// Queue bytes for the stack to read.
    pub fn push_inbound(&mut self, data: &[u8]) {
        self.inbound.extend(data);
    }

    pub fn outbound_text(&self) -> String {
        String::from_utf8_lossy(&self.outbound).into_owned()
    }

    pub fn take_outbound(&mut self) -> String {
        let text = self.outbound_text();
        self.outbound.clear();
        text
    }
}

impl Transport for MockTransport {
    type Error = MockError;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, MockError> {
        if !self.connected {
            return Err(MockError::Disconnected);
        }
        let n = buf.len().min(self.max_read).min(self.inbound.len());
        for (slot, byte) in buf.iter_mut().zip(self.inbound.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, MockError> {
        if !self.connected {
            return Err(MockError::Disconnected);
        }
        let n = data.len().min(self.max_write);
        self.outbound.extend_from_slice(&data[..n]);
        self.writes += 1;
        Ok(n)
    }

    fn flush(&mut self) -> Result<(), MockError> {
        if !self.connected {
            return Err(MockError::Disconnected);
        }
        self.flushes += 1;
        Ok(())
    }

    fn available(&self) -> bool {
        self.connected && !self.inbound.is_empty()
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn subprotocol(&self) -> Option<&str> {
        self.subprotocol
    }
}
