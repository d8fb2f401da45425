//! In-memory transport for tests and controller-less runs.

use std::collections::VecDeque;

use super::Transport;
use crate::protocol::HANDSHAKE;

/// Transport with scripted input and captured output.
///
/// Each queued chunk is returned by one [`Transport::read`] call, which
/// lets tests control exactly how the byte stream is split. Writes are
/// recorded one entry per call.
///
/// ```rust
/// use train_sim::transport::{FakeTransport, Transport};
///
/// let mut fake = FakeTransport::with_handshake();
/// fake.push_input(&[0x85]);
///
/// assert_eq!(fake.read(), vec![0x00]);
/// assert_eq!(fake.read(), vec![0x85]);
/// assert!(fake.read().is_empty());
/// ```
#[derive(Debug, Default)]
pub struct FakeTransport {
    input: VecDeque<Vec<u8>>,
    /// Every buffer passed to `write`, in order
    pub writes: Vec<Vec<u8>>,
    /// Number of `service` calls
    pub service_count: usize,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport whose first read is the controller handshake
    pub fn with_handshake() -> Self {
        let mut fake = Self::new();
        fake.push_input(&[HANDSHAKE]);
        fake
    }

    /// Queues one chunk to be returned by a later read
    pub fn push_input(&mut self, bytes: &[u8]) {
        self.input.push_back(bytes.to_vec());
    }

    /// Whether queued input remains
    pub fn has_input(&self) -> bool {
        !self.input.is_empty()
    }
}

impl Transport for FakeTransport {
    fn read(&mut self) -> Vec<u8> {
        self.input.pop_front().unwrap_or_default()
    }

    fn write(&mut self, bytes: &[u8]) {
        self.writes.push(bytes.to_vec());
    }

    fn service(&mut self) -> anyhow::Result<()> {
        self.service_count += 1;
        Ok(())
    }
}
