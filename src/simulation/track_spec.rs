//! Track description as it is stored on disk
//!
//! Nodes and edges are addressed by their position in the two tables. The
//! description is checked and turned into a [`TrackGraph`] by
//! [`TrackGraph::load`].
//!
//! [`TrackGraph`]: super::TrackGraph
//! [`TrackGraph::load`]: super::TrackGraph::load

use serde::Deserialize;

use super::error::ConfigError;
use super::types::{NodeKind, Position, SwitchDirection};

/// One node row of the track table
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NodeSpec {
    pub name: String,
    pub kind: NodeKind,
    #[serde(default)]
    pub num: Option<u8>,
    /// Index of the node at the same spot facing the other way
    pub reverse: usize,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

/// One edge row of the track table
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EdgeSpec {
    pub src: usize,
    pub dest: usize,
    /// Which outgoing slot of `src` this edge fills
    #[serde(default)]
    pub slot: SwitchDirection,
    pub length_mm: u32,
    /// Index of the edge covering the same track the other way
    pub reverse: usize,
}

/// The whole track table
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TrackSpec {
    pub nodes: Vec<NodeSpec>,
    pub edges: Vec<EdgeSpec>,
}

impl TrackSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Adds a node and its reverse twin at the same spot.
    /// Returns `(forward, reverse)` indices.
    pub fn add_node_pair(
        &mut self,
        (name, num): (&str, Option<u8>),
        (reverse_name, reverse_num): (&str, Option<u8>),
        kind: NodeKind,
        at: Position,
    ) -> (usize, usize) {
        let forward = self.nodes.len();
        let reverse = forward + 1;
        self.nodes.push(NodeSpec {
            name: name.to_string(),
            kind,
            num,
            reverse,
            x: at.x,
            y: at.y,
        });
        self.nodes.push(NodeSpec {
            name: reverse_name.to_string(),
            kind: kind.reverse_kind(),
            num: reverse_num,
            reverse: forward,
            x: at.x,
            y: at.y,
        });
        (forward, reverse)
    }

    /// Lays track from `src` to `dest` along with the matching reverse edge
    /// from `reverse(dest)` to `reverse(src)`.
    /// Returns `(forward, reverse)` edge indices.
    ///
    /// Both nodes must already exist.
    pub fn connect(
        &mut self,
        src: usize,
        slot: SwitchDirection,
        dest: usize,
        reverse_slot: SwitchDirection,
        length_mm: u32,
    ) -> (usize, usize) {
        let forward = self.edges.len();
        let reverse = forward + 1;
        self.edges.push(EdgeSpec {
            src,
            dest,
            slot,
            length_mm,
            reverse,
        });
        self.edges.push(EdgeSpec {
            src: self.nodes[dest].reverse,
            dest: self.nodes[src].reverse,
            slot: reverse_slot,
            length_mm,
            reverse: forward,
        });
        (forward, reverse)
    }

    /// A small oval with one passing siding.
    ///
    /// ```text
    ///            A3/A4 (main, 200 + 400)
    /// A1 -> BR1 <                        > MR2 -> A1   (500)
    ///   300      A5/A6 (siding, 250 + 450)
    /// ```
    ///
    /// Switch 0 (BR1) splits the loop and switch 1 (BR2) splits it again
    /// for trains running the other way. These are the two switches a
    /// controller can address (opcodes 0x21 and 0x22). Sensors are A1..A6
    /// (numbers 0..5).
    pub fn demo_loop() -> Self {
        use NodeKind::*;
        use SwitchDirection::*;

        let mut spec = TrackSpec::new();
        let (a1, _a2) = spec.add_node_pair(
            ("A1", Some(0)),
            ("A2", Some(1)),
            Sensor,
            Position::new(0.0, 0.0),
        );
        let (br1, _mr1) = spec.add_node_pair(
            ("BR1", Some(0)),
            ("MR1", Some(0)),
            Branch,
            Position::new(300.0, 0.0),
        );
        let (a3, _a4) = spec.add_node_pair(
            ("A3", Some(2)),
            ("A4", Some(3)),
            Sensor,
            Position::new(500.0, 0.0),
        );
        let (a5, _a6) = spec.add_node_pair(
            ("A5", Some(4)),
            ("A6", Some(5)),
            Sensor,
            Position::new(500.0, 250.0),
        );
        let (mr2, _br2) = spec.add_node_pair(
            ("MR2", Some(1)),
            ("BR2", Some(1)),
            Merge,
            Position::new(900.0, 0.0),
        );

        spec.connect(a1, Straight, br1, Straight, 300);
        spec.connect(br1, Straight, a3, Straight, 200);
        spec.connect(br1, Curved, a5, Straight, 250);
        spec.connect(a3, Straight, mr2, Straight, 400);
        spec.connect(a5, Straight, mr2, Curved, 450);
        spec.connect(mr2, Straight, a1, Straight, 500);
        spec
    }

    /// A dead-ended stretch: EN1 -> C1 -> EX2, with C2 on the way back.
    pub fn demo_line() -> Self {
        use NodeKind::*;
        use SwitchDirection::*;

        let mut spec = TrackSpec::new();
        let (en1, _ex1) = spec.add_node_pair(
            ("EN1", None),
            ("EX1", None),
            Enter,
            Position::new(0.0, 0.0),
        );
        let (c1, _c2) = spec.add_node_pair(
            ("C1", Some(32)),
            ("C2", Some(33)),
            Sensor,
            Position::new(100.0, 0.0),
        );
        let (_en2, ex2) = spec.add_node_pair(
            ("EN2", None),
            ("EX2", None),
            Enter,
            Position::new(200.0, 0.0),
        );

        spec.connect(en1, Straight, c1, Straight, 100);
        spec.connect(c1, Straight, ex2, Straight, 100);
        spec
    }
}
