//! Controller byte protocol
//!
//! Frames are one opcode byte optionally followed by one argument byte:
//!
//! | Opcode | Frame | Meaning |
//! |--------|-------|---------|
//! | `0x00..=0x0e` | 2 | set speed of train `byte[1]` to the opcode |
//! | `0x0f` | 2 | toggle reverse of train `byte[1]` |
//! | `0x20` | 1 | disable solenoid |
//! | `0x21..=0x22` | 2 | set switch `opcode - 0x21` to direction `byte[1]` |
//! | `0x85` | 1 | sensor poll, answered with the sensor report |
//!
//! A single `0x00` handshake byte precedes the first frame.

mod command;
mod decoder;

use log::{debug, warn};

pub use command::{
    Command, HANDSHAKE, OP_REVERSE, OP_SENSOR_POLL, OP_SOLENOID_OFF, OP_SPEED_MAX,
    OP_SWITCH_FIRST, OP_SWITCH_LAST,
};
pub use decoder::{CommandDecoder, ProtocolError, UnknownOpcode};

use crate::simulation::{Simulation, SwitchDirection};
use crate::transport::Transport;

/// Decodes every complete frame waiting in `decoder` and applies it.
///
/// Sensor polls are answered on `transport` as they are reached, so a poll
/// sees the effect of every frame before it. Returns the commands applied.
pub fn pump<T: Transport + ?Sized>(
    decoder: &mut CommandDecoder,
    sim: &mut Simulation,
    transport: &mut T,
) -> Result<Vec<Command>, ProtocolError> {
    let mut applied = Vec::new();
    while let Some(command) = decoder.next_command()? {
        dispatch(command, sim, transport);
        applied.push(command);
    }
    Ok(applied)
}

/// Applies one command to the simulation
pub fn dispatch<T: Transport + ?Sized>(command: Command, sim: &mut Simulation, transport: &mut T) {
    match command {
        Command::SetSpeed { train, speed } => {
            debug!("Setting speed of {} to {}", train, speed);
            if !sim.set_speed(train, speed) {
                warn!("Speed command for unknown train {}", train);
            }
        }
        Command::ToggleReverse { train } => {
            debug!("Toggling reverse of {}", train);
            if !sim.toggle_reverse(train) {
                warn!("Reverse command for unknown train {}", train);
            }
        }
        Command::DisableSolenoid => {
            debug!("Disabling solenoid");
        }
        Command::Switch { switch, direction } => match SwitchDirection::from_wire(direction) {
            Some(dir) => {
                debug!("Switch {} set {:?}", switch, dir);
                sim.set_switch(switch, dir);
            }
            None => warn!(
                "Switch {} given unknown direction {:#04x}, ignored",
                switch, direction
            ),
        },
        Command::SensorPoll => {
            let report = sim.sensor_report();
            debug!("Sensor poll, replying {:02x?}", report);
            transport.write(&report);
        }
    }
}
