//! Switch positions for every branch on the layout

use std::collections::HashMap;

use super::types::SwitchDirection;

/// Routing choice per switch number. Switches that were never thrown read
/// as straight.
#[derive(Debug, Clone, Default)]
pub struct SwitchTable {
    positions: HashMap<u8, SwitchDirection>,
}

impl SwitchTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, switch: u8, direction: SwitchDirection) {
        self.positions.insert(switch, direction);
    }

    pub fn get(&self, switch: u8) -> SwitchDirection {
        self.positions.get(&switch).copied().unwrap_or_default()
    }

    /// Number of switches that have been thrown at least once
    pub fn thrown_count(&self) -> usize {
        self.positions.len()
    }
}
