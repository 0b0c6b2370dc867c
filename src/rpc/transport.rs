//! Transport abstraction: the byte channel to the central system.
//!
//! On the charger this is a WebSocket over TLS; on the bench a TCP socket.
//! Both live outside this crate. The stream adapters in
//! [`stream`](super::stream) turn any `Transport` into `std::io` readers
//! and writers, so the codec never sees the channel type.

use crate::config::ProtocolVersion;

/// Byte-oriented channel to the central system.
pub trait Transport {
    type Error: core::fmt::Debug;

    /// Read up to `buf.len()` bytes. `Ok(0)` means nothing is pending right
    /// now, not end of stream.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Offer `data`; returns how many bytes were accepted, which may be
    /// short.
    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error>;

    fn flush(&mut self) -> Result<(), Self::Error>;

    /// Inbound bytes are waiting.
    fn available(&self) -> bool;

    /// Session is up. Transports without a notion of connection stay up.
    fn is_connected(&self) -> bool {
        true
    }

    /// Subprotocol agreed during the WebSocket handshake, if any.
    fn subprotocol(&self) -> Option<&str> {
        None
    }
}

/// Protocol revision the transport negotiated, or `None` when the
/// handshake named nothing this stack speaks.
pub fn negotiated_version<T: Transport + ?Sized>(transport: &T) -> Option<ProtocolVersion> {
    transport
        .subprotocol()
        .and_then(ProtocolVersion::from_subprotocol)
}

impl<T: Transport + ?Sized> Transport for &mut T {
    type Error = T::Error;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, T::Error> {
        (**self).read(buf)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, T::Error> {
        (**self).write(data)
    }

    fn flush(&mut self) -> Result<(), T::Error> {
        (**self).flush()
    }

    fn available(&self) -> bool {
        (**self).available()
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }

    fn subprotocol(&self) -> Option<&str> {
        (**self).subprotocol()
    }
}

/// Stand-in before the central-system session exists: swallows writes,
/// never has input, reports itself disconnected.
pub struct NullTransport;

impl Transport for NullTransport {
    type Error = ();

    fn read(&mut self, _buf: &mut [u8]) -> Result<usize, ()> {
        Ok(0)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, ()> {
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<(), ()> {
        Ok(())
    }

    fn available(&self) -> bool {
        false
    }

    fn is_connected(&self) -> bool {
        false
    }
}
