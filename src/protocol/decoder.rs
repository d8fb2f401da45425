//! Incremental frame decoder
//!
//! Bytes arrive in arbitrary chunks. The decoder keeps whatever has not
//! formed a whole frame yet and hands out complete frames one at a time.

use std::collections::VecDeque;

use log::{debug, warn};
use thiserror::Error;

use super::command::{Command, HANDSHAKE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("unknown command byte {0:#04x}")]
    UnknownCommand(u8),

    #[error("expected handshake byte 0x00, got {0:#04x}")]
    BadHandshake(u8),
}

/// What to do with a byte that starts no known frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownOpcode {
    /// Stop decoding for good
    #[default]
    Fatal,
    /// Drop the byte and try the next one
    SkipByte,
}

#[derive(Debug, Default)]
pub struct CommandDecoder {
    buffer: VecDeque<u8>,
    synced: bool,
    policy: UnknownOpcode,
    failed: Option<ProtocolError>,
}

impl CommandDecoder {
    pub fn new(policy: UnknownOpcode) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Appends received bytes to the pending buffer
    pub fn feed(&mut self, bytes: &[u8]) {
        self.buffer.extend(bytes);
    }

    /// Bytes received but not yet decoded
    pub fn pending(&self) -> Vec<u8> {
        self.buffer.iter().copied().collect()
    }

    /// Whether the handshake byte has been seen
    pub fn is_synced(&self) -> bool {
        self.synced
    }

    /// Takes the next complete frame off the buffer.
    ///
    /// Returns `Ok(None)` when more bytes are needed. A fatal error is sticky:
    /// every later call returns it again.
    pub fn next_command(&mut self) -> Result<Option<Command>, ProtocolError> {
        if let Some(err) = self.failed {
            return Err(err);
        }

        if !self.synced {
            let Some(&first) = self.buffer.front() else {
                return Ok(None);
            };
            if first != HANDSHAKE {
                return Err(self.fail(ProtocolError::BadHandshake(first)));
            }
            self.buffer.pop_front();
            self.synced = true;
            debug!("Controller handshake received");
        }

        loop {
            let Some(&opcode) = self.buffer.front() else {
                return Ok(None);
            };
            let Some(len) = Command::frame_len(opcode) else {
                match self.policy {
                    UnknownOpcode::Fatal => {
                        return Err(self.fail(ProtocolError::UnknownCommand(opcode)))
                    }
                    UnknownOpcode::SkipByte => {
                        warn!("Skipping unknown command byte {:#04x}", opcode);
                        self.buffer.pop_front();
                        continue;
                    }
                }
            };
            if self.buffer.len() < len {
                return Ok(None);
            }

            let frame: Vec<u8> = self.buffer.drain(..len).collect();
            debug!("Got command {:02x?}", frame);
            return match Command::from_frame(&frame) {
                Some(command) => Ok(Some(command)),
                None => Err(self.fail(ProtocolError::UnknownCommand(opcode))),
            };
        }
    }

    fn fail(&mut self, err: ProtocolError) -> ProtocolError {
        self.failed = Some(err);
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waits_for_handshake() {
        let mut decoder = CommandDecoder::default();
        assert_eq!(decoder.next_command(), Ok(None));
        assert!(!decoder.is_synced());

        decoder.feed(&[0x00]);
        assert_eq!(decoder.next_command(), Ok(None));
        assert!(decoder.is_synced());
        assert!(decoder.pending().is_empty());
    }

    #[test]
    fn handshake_is_consumed_once() {
        let mut decoder = CommandDecoder::default();
        decoder.feed(&[0x00, 0x00, 0x07]);
        assert_eq!(
            decoder.next_command(),
            Ok(Some(Command::SetSpeed { train: 7, speed: 0 }))
        );
    }

    #[test]
    fn errors_are_sticky() {
        let mut decoder = CommandDecoder::default();
        decoder.feed(&[0x00, 0x40, 0x20]);
        assert_eq!(
            decoder.next_command(),
            Err(ProtocolError::UnknownCommand(0x40))
        );
        assert_eq!(
            decoder.next_command(),
            Err(ProtocolError::UnknownCommand(0x40))
        );
    }

    #[test]
    fn long_garbage_run_is_skipped() {
        let mut decoder = CommandDecoder::new(UnknownOpcode::SkipByte);
        decoder.feed(&[0x00]);
        decoder.feed(&vec![0xff; 100_000]);
        decoder.feed(&[0x0f, 0x07]);
        assert_eq!(
            decoder.next_command(),
            Ok(Some(Command::ToggleReverse { train: 7 }))
        );
        assert!(decoder.pending().is_empty());
    }

    #[test]
    fn pending_keeps_partial_frame_in_order() {
        let mut decoder = CommandDecoder::default();
        decoder.feed(&[0x00, 0x03, 0x07, 0x21]);
        assert_eq!(
            decoder.next_command(),
            Ok(Some(Command::SetSpeed { train: 7, speed: 3 }))
        );
        assert_eq!(decoder.next_command(), Ok(None));
        assert_eq!(decoder.pending(), vec![0x21]);
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            ProtocolError::UnknownCommand(0x40).to_string(),
            "unknown command byte 0x40"
        );
        assert_eq!(
            ProtocolError::BadHandshake(0x85).to_string(),
            "expected handshake byte 0x00, got 0x85"
        );
    }
}
