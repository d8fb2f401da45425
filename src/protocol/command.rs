//! Commands carried by the controller byte protocol

use crate::simulation::TrainId;

/// Speed frames use the notch itself as the opcode
pub const OP_SPEED_MAX: u8 = 14;
pub const OP_REVERSE: u8 = 15;
pub const OP_SOLENOID_OFF: u8 = 0x20;
pub const OP_SWITCH_FIRST: u8 = 0x21;
pub const OP_SWITCH_LAST: u8 = 0x22;
pub const OP_SENSOR_POLL: u8 = 0x85;

/// Sent once by the controller before any command
pub const HANDSHAKE: u8 = 0x00;

/// One decoded frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    SetSpeed { train: TrainId, speed: u8 },
    ToggleReverse { train: TrainId },
    DisableSolenoid,
    Switch { switch: u8, direction: u8 },
    SensorPoll,
}

impl Command {
    /// Number of bytes a frame starting with `opcode` occupies, or `None`
    /// for an opcode outside the protocol.
    pub fn frame_len(opcode: u8) -> Option<usize> {
        match opcode {
            0..=OP_SPEED_MAX | OP_REVERSE => Some(2),
            OP_SOLENOID_OFF | OP_SENSOR_POLL => Some(1),
            OP_SWITCH_FIRST..=OP_SWITCH_LAST => Some(2),
            _ => None,
        }
    }

    /// Decodes a complete frame. `frame` must be exactly
    /// [`Command::frame_len`] bytes long.
    pub fn from_frame(frame: &[u8]) -> Option<Self> {
        match *frame {
            [speed @ 0..=OP_SPEED_MAX, train] => Some(Command::SetSpeed { train, speed }),
            [OP_REVERSE, train] => Some(Command::ToggleReverse { train }),
            [OP_SOLENOID_OFF] => Some(Command::DisableSolenoid),
            [op @ OP_SWITCH_FIRST..=OP_SWITCH_LAST, direction] => Some(Command::Switch {
                switch: op - OP_SWITCH_FIRST,
                direction,
            }),
            [OP_SENSOR_POLL] => Some(Command::SensorPoll),
            _ => None,
        }
    }

    /// Wire encoding, the inverse of [`Command::from_frame`].
    ///
    /// `None` when a field does not fit its opcode range: a speed above
    /// [`OP_SPEED_MAX`] or a switch with no opcode of its own.
    pub fn encode(&self) -> Option<Vec<u8>> {
        let frame = match *self {
            Command::SetSpeed { train, speed } if speed <= OP_SPEED_MAX => vec![speed, train],
            Command::SetSpeed { .. } => return None,
            Command::ToggleReverse { train } => vec![OP_REVERSE, train],
            Command::DisableSolenoid => vec![OP_SOLENOID_OFF],
            Command::Switch { switch, direction } => {
                let op = OP_SWITCH_FIRST.checked_add(switch)?;
                if op > OP_SWITCH_LAST {
                    return None;
                }
                vec![op, direction]
            }
            Command::SensorPoll => vec![OP_SENSOR_POLL],
        };
        Some(frame)
    }
}
