//! Tripped-sensor bitmask and its wire encoding
//!
//! Bits are packed MSB first: sensor `n` lives in byte `n / 8` at bit
//! `7 - n % 8`, so byte 0 bit 7 is A1 and byte 9 bit 0 is E16. The layout is
//! what a sensor poll reply carries on the wire.

use super::error::SensorError;
use super::types::SENSOR_COUNT;

/// Size of a serialized sensor report
pub const SENSOR_REPORT_LEN: usize = SENSOR_COUNT / 8;

/// When a tripped bit goes back to zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SensorLatch {
    /// Cleared once it has been reported by a poll
    #[default]
    UntilPolled,
    /// Held until [`SensorTable::clear`] is called
    UntilCleared,
}

#[derive(Debug, Clone, Default)]
pub struct SensorTable {
    bits: [u8; SENSOR_REPORT_LEN],
    latch: SensorLatch,
}

impl SensorTable {
    pub fn new(latch: SensorLatch) -> Self {
        Self {
            bits: [0; SENSOR_REPORT_LEN],
            latch,
        }
    }

    pub fn set_tripped(&mut self, id: usize, tripped: bool) -> Result<(), SensorError> {
        if id >= SENSOR_COUNT {
            return Err(SensorError::OutOfRange(id));
        }
        let bit = 0x80u8 >> (id % 8);
        let byte = &mut self.bits[id / 8];
        if tripped {
            *byte |= bit;
        } else {
            *byte &= !bit;
        }
        Ok(())
    }

    pub fn is_tripped(&self, id: usize) -> bool {
        id < SENSOR_COUNT && self.bits[id / 8] & (0x80 >> (id % 8)) != 0
    }

    pub fn serialize(&self) -> [u8; SENSOR_REPORT_LEN] {
        self.bits
    }

    /// Serializes the table for a poll reply and applies the latch policy.
    pub fn report(&mut self) -> [u8; SENSOR_REPORT_LEN] {
        let report = self.serialize();
        if self.latch == SensorLatch::UntilPolled {
            self.clear();
        }
        report
    }

    pub fn clear(&mut self) {
        self.bits = [0; SENSOR_REPORT_LEN];
    }

    pub fn latch(&self) -> SensorLatch {
        self.latch
    }

    /// Ids of every tripped sensor, lowest first
    pub fn tripped(&self) -> impl Iterator<Item = usize> + '_ {
        (0..SENSOR_COUNT).filter(|&id| self.is_tripped(id))
    }
}
