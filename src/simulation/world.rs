//! Main simulation that ties everything together
//!
//! Owns the track, the switch and sensor tables and every train. Wall-clock
//! time handed to [`Simulation::tick`] is consumed in fixed steps so the
//! result does not depend on the caller's frame rate.

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use std::collections::BTreeMap;
use std::time::Duration;

use super::cursor::{Advance, PositionCursor};
use super::error::TraversalError;
use super::sensors::{SensorLatch, SensorTable, SENSOR_REPORT_LEN};
use super::switches::SwitchTable;
use super::track_graph::TrackGraph;
use super::train::{SimTrain, TrainDynamics};
use super::types::{to_mm, EdgeId, Micrometers, SwitchDirection, TrainId, TrainPose};

/// Length of one simulation step
pub const DEFAULT_STEP: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimConfig {
    pub step: Duration,
    pub dynamics: TrainDynamics,
    pub sensor_latch: SensorLatch,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            step: DEFAULT_STEP,
            dynamics: TrainDynamics::default(),
            sensor_latch: SensorLatch::default(),
        }
    }
}

/// The main simulation world
pub struct Simulation {
    pub track: TrackGraph,
    pub switches: SwitchTable,
    pub sensors: SensorTable,
    /// Trains by id, iterated in id order every step
    pub trains: BTreeMap<TrainId, SimTrain>,

    config: SimConfig,

    /// Time received but not yet simulated
    accumulator: Duration,

    /// Simulated time
    pub time: Duration,

    /// Steps run so far
    pub steps: u64,

    /// Optional seeded RNG for reproducible spawns
    rng: Option<StdRng>,
}

impl Simulation {
    fn new_internal(track: TrackGraph, config: SimConfig, rng: Option<StdRng>) -> Self {
        Self {
            track,
            switches: SwitchTable::new(),
            sensors: SensorTable::new(config.sensor_latch),
            trains: BTreeMap::new(),
            config,
            accumulator: Duration::ZERO,
            time: Duration::ZERO,
            steps: 0,
            rng,
        }
    }

    pub fn new(track: TrackGraph, config: SimConfig) -> Self {
        Self::new_internal(track, config, None)
    }

    /// Create a simulation whose random spawns repeat run to run
    pub fn new_with_seed(track: TrackGraph, config: SimConfig, seed: u64) -> Self {
        Self::new_internal(track, config, Some(StdRng::seed_from_u64(seed)))
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Get a random value in the given range, using seeded RNG if available
    fn random_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distr::uniform::SampleUniform,
        R: rand::distr::uniform::SampleRange<T>,
    {
        match &mut self.rng {
            Some(rng) => rng.random_range(range),
            None => rand::rng().random_range(range),
        }
    }

    /// Places a train `offset` along `edge`, replacing any train already
    /// using that id.
    pub fn spawn_train(
        &mut self,
        id: TrainId,
        edge: EdgeId,
        offset: Micrometers,
    ) -> Result<(), TraversalError> {
        let length = self.track.length(edge);
        if !(0..length).contains(&offset) {
            return Err(TraversalError::OffsetOutOfRange { offset, length });
        }
        let train = SimTrain::new(id, PositionCursor::new(edge, offset));
        if self.trains.insert(id, train).is_some() {
            warn!("Train {} respawned, previous state dropped", id);
        }
        debug!(
            "Spawned train {} on edge {} at {:.3} mm",
            id,
            edge.index(),
            to_mm(offset)
        );
        Ok(())
    }

    /// Places a train somewhere random on the track
    pub fn spawn_train_randomly(&mut self, id: TrainId) -> Result<(), TraversalError> {
        let edge = EdgeId::new(self.random_range(0..self.track.edge_count()));
        let offset = self.random_range(0..self.track.length(edge));
        self.spawn_train(id, edge, offset)
    }

    pub fn remove_train(&mut self, id: TrainId) -> Option<SimTrain> {
        self.trains.remove(&id)
    }

    /// Sets the commanded notch of a train. Returns false if there is no
    /// such train.
    pub fn set_speed(&mut self, id: TrainId, notch: u8) -> bool {
        match self.trains.get_mut(&id) {
            Some(train) => {
                train.set_speed(notch);
                true
            }
            None => false,
        }
    }

    /// Turns a train around. Returns false if there is no such train.
    pub fn toggle_reverse(&mut self, id: TrainId) -> bool {
        match self.trains.get_mut(&id) {
            Some(train) => {
                train.toggle_reverse(&self.track);
                true
            }
            None => false,
        }
    }

    pub fn set_switch(&mut self, switch: u8, direction: SwitchDirection) {
        self.switches.set(switch, direction);
    }

    /// Sensor bytes for a poll reply. Clears them under
    /// [`SensorLatch::UntilPolled`].
    pub fn sensor_report(&mut self) -> [u8; SENSOR_REPORT_LEN] {
        self.sensors.report()
    }

    /// Advances the simulation by wall-clock `delta`, running as many whole
    /// steps as fit and carrying the remainder into the next call.
    /// Returns the number of steps run.
    pub fn tick(&mut self, delta: Duration) -> Result<u32, TraversalError> {
        self.accumulator += delta;
        let mut steps = 0;
        while self.accumulator >= self.config.step {
            self.accumulator -= self.config.step;
            self.step()?;
            steps += 1;
        }
        Ok(steps)
    }

    /// Runs exactly one simulation step for every train
    pub fn step(&mut self) -> Result<(), TraversalError> {
        self.time += self.config.step;
        self.steps += 1;

        let mut departed = Vec::new();
        for train in self.trains.values_mut() {
            let Advance {
                tripped,
                left_track,
            } = train.step(&self.config.dynamics, &self.track, &self.switches)?;

            for num in tripped {
                debug!("Train {} tripped sensor {}", train.id, num);
                if let Err(e) = self.sensors.set_tripped(usize::from(num), true) {
                    warn!("Train {} passed unreportable sensor: {}", train.id, e);
                }
            }
            if let Some(node) = left_track {
                departed.push((train.id, node));
            }
        }

        for (id, node) in departed {
            warn!(
                "Train {} ran off the track at {}, removing it",
                id,
                self.track.node(node).name
            );
            self.trains.remove(&id);
        }
        Ok(())
    }

    /// Where every train is, for drawing
    pub fn train_poses(&self) -> Vec<TrainPose> {
        self.trains
            .values()
            .map(|train| train.pose(&self.track))
            .collect()
    }

    /// Log a summary of the world state
    pub fn log_summary(&self) {
        info!("=== Train Simulation Summary ===");
        info!("Time: {:.2}s ({} steps)", self.time.as_secs_f64(), self.steps);
        info!(
            "Nodes: {}, Edges: {}, Switches thrown: {}",
            self.track.node_count(),
            self.track.edge_count(),
            self.switches.thrown_count()
        );
        info!(
            "Tripped sensors: {:?}",
            self.sensors.tripped().collect::<Vec<_>>()
        );
        info!("Trains: {}", self.trains.len());
        for train in self.trains.values() {
            let pose = train.pose(&self.track);
            let from = self.track.source(train.cursor.edge);
            let to = self.track.dest(train.cursor.edge);
            info!(
                "  Train {}: notch={}, velocity={:.3} mm/step, {} -> {} +{:.0}mm, position=({:.1}, {:.1}), heading={:.2}",
                train.id,
                train.target,
                train.velocity * train.direction,
                self.track.node(from).name,
                self.track.node(to).name,
                to_mm(train.cursor.offset),
                pose.position.x,
                pose.position.y,
                pose.heading
            );
        }
    }
}
