//! Train position simulation
//!
//! This module contains the track model and the per-train movement logic.
//! It knows nothing about the controller protocol or the transport and can
//! be driven directly from tests.

mod cursor;
mod error;
mod sensors;
mod switches;
mod track_graph;
mod track_spec;
mod train;
mod types;
mod world;

pub use cursor::{Advance, PositionCursor};
pub use error::{ConfigError, SensorError, TraversalError};
pub use sensors::{SensorLatch, SensorTable, SENSOR_REPORT_LEN};
pub use switches::SwitchTable;
pub use track_graph::{TrackEdge, TrackGraph, TrackNode};
pub use track_spec::{EdgeSpec, NodeSpec, TrackSpec};
pub use train::{SimTrain, TrainDynamics, DEFAULT_GAIN, DEFAULT_MM_PER_STEP_PER_NOTCH};
pub use types::{
    mm, to_mm, EdgeId, Micrometers, NodeId, NodeKind, Position, SwitchDirection, TrainId,
    TrainPose, MAX_SPEED_NOTCH, MICROMETERS_PER_MM, SENSORS_PER_BANK, SENSOR_BANKS, SENSOR_COUNT,
};
pub use world::{SimConfig, Simulation, DEFAULT_STEP};
