//! Core types for the train simulation

use petgraph::graph::{EdgeIndex, NodeIndex};
use serde::Deserialize;

/// Index of a node in the track arena
pub type NodeId = NodeIndex;

/// Index of an edge in the track arena
pub type EdgeId = EdgeIndex;

/// Train number as it appears on the wire
pub type TrainId = u8;

/// Distance along the track. Offsets and edge lengths are whole
/// micrometers so moving and reversing a cursor never rounds.
pub type Micrometers = i64;

pub const MICROMETERS_PER_MM: Micrometers = 1000;

/// Millimeters to the nearest micrometer
pub fn mm(value: f64) -> Micrometers {
    (value * MICROMETERS_PER_MM as f64).round() as Micrometers
}

pub fn to_mm(value: Micrometers) -> f64 {
    value as f64 / MICROMETERS_PER_MM as f64
}

/// Role of a track node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Sensor,
    Branch,
    Merge,
    Enter,
    Exit,
}

impl NodeKind {
    /// The kind the reverse node must have
    pub fn reverse_kind(self) -> NodeKind {
        match self {
            NodeKind::Sensor => NodeKind::Sensor,
            NodeKind::Branch => NodeKind::Merge,
            NodeKind::Merge => NodeKind::Branch,
            NodeKind::Enter => NodeKind::Exit,
            NodeKind::Exit => NodeKind::Enter,
        }
    }

    /// Number of outgoing edge slots this kind of node fills
    pub fn out_degree(self) -> usize {
        match self {
            NodeKind::Branch => 2,
            NodeKind::Exit => 0,
            NodeKind::Sensor | NodeKind::Merge | NodeKind::Enter => 1,
        }
    }

    /// Whether the node carries a sensor or switch number
    pub fn is_numbered(self) -> bool {
        matches!(self, NodeKind::Sensor | NodeKind::Branch)
    }
}

/// Outgoing edge slot of a node. Non-branch nodes only use `Straight`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwitchDirection {
    #[default]
    Straight,
    Curved,
}

impl SwitchDirection {
    pub fn index(self) -> usize {
        match self {
            SwitchDirection::Straight => 0,
            SwitchDirection::Curved => 1,
        }
    }

    /// Decode the direction byte of a switch frame
    pub fn from_wire(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(SwitchDirection::Straight),
            1 => Some(SwitchDirection::Curved),
            _ => None,
        }
    }
}

/// A 2D position on the layout, in millimeters
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn lerp(&self, other: &Position, t: f64) -> Position {
        Position {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }

    /// Vector from this position to another
    pub fn delta_to(&self, other: &Position) -> Position {
        Position {
            x: other.x - self.x,
            y: other.y - self.y,
        }
    }

    /// Heading angle of the vector from this position to another
    pub fn angle_to(&self, other: &Position) -> f64 {
        let d = self.delta_to(other);
        d.y.atan2(d.x)
    }
}

/// Where a train is and which way it faces, for drawing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainPose {
    pub id: TrainId,
    pub position: Position,
    pub heading: f64,
}

/// Number of sensor banks on the layout (A through E)
pub const SENSOR_BANKS: usize = 5;

/// Sensors per bank
pub const SENSORS_PER_BANK: usize = 16;

/// Total addressable sensors
pub const SENSOR_COUNT: usize = SENSOR_BANKS * SENSORS_PER_BANK;

/// Highest speed notch accepted by the controller
pub const MAX_SPEED_NOTCH: u8 = 14;
