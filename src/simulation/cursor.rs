//! Train position along the track
//!
//! A cursor is an edge plus the distance already travelled along it, in
//! whole micrometers. Moving it forward walks edge destinations, moving it
//! backward walks edge sources through the reverse links; at branches the
//! switch table picks the way.

use super::error::TraversalError;
use super::switches::SwitchTable;
use super::track_graph::TrackGraph;
use super::types::{EdgeId, Micrometers, NodeId, NodeKind, Position, SwitchDirection};

/// Result of moving a cursor
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Advance {
    /// Sensor numbers passed, in the order they were passed
    pub tripped: Vec<u8>,
    /// Set when the cursor ran past the end of the modeled track
    pub left_track: Option<NodeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionCursor {
    pub edge: EdgeId,
    pub offset: Micrometers,
}

impl PositionCursor {
    pub fn new(edge: EdgeId, offset: Micrometers) -> Self {
        Self { edge, offset }
    }

    /// Moves the cursor by `amount`, positive along the current edge
    /// direction and negative against it.
    ///
    /// If the cursor runs off an exit (or backward off an entry) the returned
    /// [`Advance::left_track`] names the node and the cursor is parked on
    /// that end of the last edge it could reach: offset 0 backward, or
    /// offset == length forward, which is outside the usual `[0, length)`
    /// range and skips the range check. Such a cursor is finished and
    /// should be dropped.
    pub fn advance(
        &mut self,
        amount: Micrometers,
        track: &TrackGraph,
        switches: &SwitchTable,
    ) -> Result<Advance, TraversalError> {
        let limit = track.edge_count();
        let mut result = Advance::default();
        let mut crossings = 0;

        self.offset = self.offset.saturating_add(amount);

        while self.offset >= track.length(self.edge) {
            crossings += 1;
            if crossings > limit {
                return Err(TraversalError::NonConvergent { amount, limit });
            }

            let node = track.dest(self.edge);
            let Some(next) = next_edge(track, switches, node) else {
                self.offset = track.length(self.edge);
                result.left_track = Some(node);
                return Ok(result);
            };
            if let Some(num) = sensor_num(track, node) {
                result.tripped.push(num);
            }
            self.offset -= track.length(self.edge);
            self.edge = next;
        }

        while self.offset < 0 {
            crossings += 1;
            if crossings > limit {
                return Err(TraversalError::NonConvergent { amount, limit });
            }

            // Passing the source of this edge backward is passing its
            // reverse node forward.
            let node = track.node(track.source(self.edge)).reverse;
            let Some(ahead) = next_edge(track, switches, node) else {
                self.offset = 0;
                result.left_track = Some(node);
                return Ok(result);
            };
            if let Some(num) = sensor_num(track, node) {
                result.tripped.push(num);
            }
            self.edge = track.reverse(ahead);
            self.offset += track.length(self.edge);
        }

        self.check(track)?;
        Ok(result)
    }

    /// Turns the cursor around without moving it.
    ///
    /// A cursor at offset 0 comes out at the very end of the reverse edge
    /// (offset == length). The next advance moves it across the node.
    pub fn reverse_in_place(&mut self, track: &TrackGraph) {
        let length = track.length(self.edge);
        self.edge = track.reverse(self.edge);
        self.offset = length - self.offset;
    }

    pub fn position(&self, track: &TrackGraph) -> Position {
        let (start, end) = self.endpoints(track);
        let t = self.offset as f64 / track.length(self.edge) as f64;
        start.lerp(&end, t)
    }

    /// Vector along the current edge, start to end
    pub fn direction(&self, track: &TrackGraph) -> Position {
        let (start, end) = self.endpoints(track);
        start.delta_to(&end)
    }

    pub fn heading(&self, track: &TrackGraph) -> f64 {
        let (start, end) = self.endpoints(track);
        start.angle_to(&end)
    }

    fn endpoints(&self, track: &TrackGraph) -> (Position, Position) {
        (
            track.node(track.source(self.edge)).position,
            track.node(track.dest(self.edge)).position,
        )
    }

    fn check(&self, track: &TrackGraph) -> Result<(), TraversalError> {
        let length = track.length(self.edge);
        if (0..length).contains(&self.offset) {
            Ok(())
        } else {
            Err(TraversalError::OffsetOutOfRange {
                offset: self.offset,
                length,
            })
        }
    }
}

/// The edge a train takes when it passes `node` going forward
fn next_edge(track: &TrackGraph, switches: &SwitchTable, node: NodeId) -> Option<EdgeId> {
    let info = track.node(node);
    let direction = match (info.kind, info.num) {
        (NodeKind::Branch, Some(num)) => switches.get(num),
        _ => SwitchDirection::Straight,
    };
    track.edge(node, direction)
}

fn sensor_num(track: &TrackGraph, node: NodeId) -> Option<u8> {
    let info = track.node(node);
    match info.kind {
        NodeKind::Sensor => info.num,
        _ => None,
    }
}
