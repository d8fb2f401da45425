//! Error types for track loading and traversal.

use thiserror::Error;

use super::types::{Micrometers, NodeKind};

/// A track description that cannot be turned into a consistent graph.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("track JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("track has no nodes")]
    Empty,

    #[error("{what} {index} refers to missing {target} {reference}")]
    Dangling {
        what: &'static str,
        index: usize,
        target: &'static str,
        reference: usize,
    },

    #[error("node {0} is not the reverse of its reverse node")]
    NodeReverseMismatch(usize),

    #[error("node {node} is a {kind:?} but its reverse is a {reverse_kind:?}")]
    ReverseKindMismatch {
        node: usize,
        kind: NodeKind,
        reverse_kind: NodeKind,
    },

    #[error("node {0} needs a sensor or switch number")]
    MissingNumber(usize),

    #[error("sensor number {num} on node {node} is out of range")]
    SensorOutOfRange { node: usize, num: u8 },

    #[error("sensor number {0} is used by more than one node")]
    DuplicateSensor(u8),

    #[error("edge {edge} has invalid length {length} mm")]
    InvalidLength { edge: usize, length: u32 },

    #[error("edge {0} is not the reverse of its reverse edge")]
    EdgeReverseMismatch(usize),

    #[error("edge {edge} is {length} mm but its reverse is {reverse_length} mm")]
    EdgeLengthMismatch {
        edge: usize,
        length: u32,
        reverse_length: u32,
    },

    #[error("reverse of edge {0} does not join the reverse nodes")]
    EdgeReverseEndpoints(usize),

    #[error("node {node} has two edges in slot {slot}")]
    DuplicateSlot { node: usize, slot: usize },

    #[error("node {node} ({kind:?}) has edges in slots {found:?}")]
    BadSlots {
        node: usize,
        kind: NodeKind,
        found: Vec<usize>,
    },
}

/// A cursor that could not be normalized onto the track.
///
/// Either of these points at corrupt topology or a caller bug; neither is
/// recoverable by clamping.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TraversalError {
    #[error("advance of {amount} um crossed more than {limit} edges")]
    NonConvergent { amount: Micrometers, limit: usize },

    #[error("offset {offset} um is outside edge of length {length} um")]
    OffsetOutOfRange {
        offset: Micrometers,
        length: Micrometers,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SensorError {
    #[error("sensor {0} is out of range")]
    OutOfRange(usize),
}
