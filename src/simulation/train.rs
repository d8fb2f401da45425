//! Train movement for the simulation

use super::cursor::{Advance, PositionCursor};
use super::error::TraversalError;
use super::switches::SwitchTable;
use super::track_graph::TrackGraph;
use super::types::{mm, TrainId, TrainPose, MAX_SPEED_NOTCH};

/// Fraction of the gap to the commanded velocity closed each step
pub const DEFAULT_GAIN: f64 = 0.05;

/// Velocity per speed notch, in millimeters per simulation step
pub const DEFAULT_MM_PER_STEP_PER_NOTCH: f64 = 0.25;

/// How quickly a train responds to its throttle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainDynamics {
    pub gain: f64,
    pub mm_per_step_per_notch: f64,
}

impl Default for TrainDynamics {
    fn default() -> Self {
        Self {
            gain: DEFAULT_GAIN,
            mm_per_step_per_notch: DEFAULT_MM_PER_STEP_PER_NOTCH,
        }
    }
}

/// A train in the simulation
///
/// `velocity` is measured in the frame the train was spawned facing.
/// `direction` maps that frame onto the cursor, so after a reverse the train
/// keeps rolling the way it was going until the lag brings it round.
#[derive(Debug, Clone)]
pub struct SimTrain {
    pub id: TrainId,
    /// Millimeters per simulation step
    pub velocity: f64,
    /// Commanded speed notch, 0 = stop
    pub target: u8,
    /// +1 or -1
    pub direction: f64,
    pub cursor: PositionCursor,
}

impl SimTrain {
    pub fn new(id: TrainId, cursor: PositionCursor) -> Self {
        Self {
            id,
            velocity: 0.0,
            target: 0,
            direction: 1.0,
            cursor,
        }
    }

    /// Stores the commanded notch. Movement follows on later steps.
    pub fn set_speed(&mut self, notch: u8) {
        self.target = notch.min(MAX_SPEED_NOTCH);
    }

    pub fn toggle_reverse(&mut self, track: &TrackGraph) {
        self.direction = -self.direction;
        self.cursor.reverse_in_place(track);
    }

    /// Runs one fixed simulation step. The distance covered is rounded to
    /// the nearest micrometer before the cursor moves.
    pub fn step(
        &mut self,
        dynamics: &TrainDynamics,
        track: &TrackGraph,
        switches: &SwitchTable,
    ) -> Result<Advance, TraversalError> {
        let commanded = f64::from(self.target) * dynamics.mm_per_step_per_notch * self.direction;
        self.velocity += dynamics.gain * (commanded - self.velocity);
        self.cursor
            .advance(mm(self.velocity * self.direction), track, switches)
    }

    pub fn pose(&self, track: &TrackGraph) -> TrainPose {
        TrainPose {
            id: self.id,
            position: self.cursor.position(track),
            heading: self.cursor.heading(track),
        }
    }
}
