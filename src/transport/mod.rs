//! Byte-stream transports between the simulator and a controller
//!
//! Every transport is polled: [`Transport::service`] moves bytes between the
//! wire and internal buffers without blocking, [`Transport::read`] drains
//! whatever has arrived and [`Transport::write`] queues a reply.
//!
//! | Transport | Purpose |
//! |-----------|---------|
//! | [`TcpTransport`] | Non-blocking TCP connection to a controller |
//! | [`FakeTransport`] | Scripted input and captured output, no network |

mod fake;
mod tcp;

pub use fake::FakeTransport;
pub use tcp::TcpTransport;

use log::{info, warn};
use std::io;

/// Port the controller listens on by default
pub const DEFAULT_PORT: u16 = 1230;

pub trait Transport {
    /// Takes every byte received since the last call. Empty when nothing has
    /// arrived.
    fn read(&mut self) -> Vec<u8>;

    /// Queues bytes to be sent on a later [`Transport::service`] call.
    fn write(&mut self, bytes: &[u8]);

    /// Does whatever non-blocking I/O is possible right now.
    fn service(&mut self) -> anyhow::Result<()>;

    /// Whether the peer has gone away
    fn is_closed(&self) -> bool {
        false
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn read(&mut self) -> Vec<u8> {
        (**self).read()
    }

    fn write(&mut self, bytes: &[u8]) {
        (**self).write(bytes)
    }

    fn service(&mut self) -> anyhow::Result<()> {
        (**self).service()
    }

    fn is_closed(&self) -> bool {
        (**self).is_closed()
    }
}

/// Connects to a controller at `addr`.
///
/// A refused connection is not an error: the simulator falls back to a
/// [`FakeTransport`] that only sends the handshake, so it can run without a
/// controller attached.
pub fn connect(addr: &str) -> anyhow::Result<Box<dyn Transport>> {
    match TcpTransport::connect(addr) {
        Ok(tcp) => {
            info!("Connected to controller at {}", addr);
            Ok(Box::new(tcp))
        }
        Err(e)
            if e.downcast_ref::<io::Error>()
                .is_some_and(|io| io.kind() == io::ErrorKind::ConnectionRefused) =>
        {
            warn!("Connection to {} refused, running without a controller", addr);
            Ok(Box::new(FakeTransport::with_handshake()))
        }
        Err(e) => Err(e),
    }
}
