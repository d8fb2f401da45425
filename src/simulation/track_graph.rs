//! Track graph for position tracking
//!
//! Nodes and edges live in a petgraph arena and refer to each other only by
//! index, including the reverse links between the two travel directions of
//! the same piece of track.

use log::debug;
use petgraph::graph::DiGraph;
use std::collections::{HashMap, HashSet};

use super::error::ConfigError;
use super::track_spec::TrackSpec;
use super::types::{
    EdgeId, Micrometers, NodeId, NodeKind, Position, SwitchDirection, MICROMETERS_PER_MM,
    SENSOR_COUNT,
};

/// Node data stored in the graph
#[derive(Debug, Clone)]
pub struct TrackNode {
    pub name: String,
    pub kind: NodeKind,
    pub num: Option<u8>,
    /// The node at the same spot facing the other way
    pub reverse: NodeId,
    /// Outgoing edges indexed by [`SwitchDirection::index`]
    pub out: [Option<EdgeId>; 2],
    pub position: Position,
}

/// Edge data stored in the graph
#[derive(Debug, Clone, Copy)]
pub struct TrackEdge {
    pub source: NodeId,
    pub dest: NodeId,
    pub length: Micrometers,
    pub reverse: EdgeId,
}

/// Immutable, validated track topology
#[derive(Debug)]
pub struct TrackGraph {
    graph: DiGraph<TrackNode, TrackEdge>,
    names: HashMap<String, NodeId>,
    sensors: HashMap<u8, NodeId>,
}

impl TrackGraph {
    /// Checks `spec` for consistency and builds the graph from it.
    ///
    /// Node `i` of `spec` becomes `NodeId::new(i)` and edge `j` becomes
    /// `EdgeId::new(j)`.
    pub fn load(spec: &TrackSpec) -> Result<Self, ConfigError> {
        validate(spec)?;

        let mut graph = DiGraph::with_capacity(spec.nodes.len(), spec.edges.len());
        for node in &spec.nodes {
            graph.add_node(TrackNode {
                name: node.name.clone(),
                kind: node.kind,
                num: node.num,
                reverse: NodeId::new(node.reverse),
                out: [None, None],
                position: Position::new(node.x, node.y),
            });
        }
        for edge in &spec.edges {
            let id = graph.add_edge(
                NodeId::new(edge.src),
                NodeId::new(edge.dest),
                TrackEdge {
                    source: NodeId::new(edge.src),
                    dest: NodeId::new(edge.dest),
                    length: Micrometers::from(edge.length_mm) * MICROMETERS_PER_MM,
                    reverse: EdgeId::new(edge.reverse),
                },
            );
            graph[NodeId::new(edge.src)].out[edge.slot.index()] = Some(id);
        }

        let mut names = HashMap::new();
        let mut sensors = HashMap::new();
        for id in graph.node_indices() {
            let node = &graph[id];
            names.insert(node.name.clone(), id);
            if let (NodeKind::Sensor, Some(num)) = (node.kind, node.num) {
                sensors.insert(num, id);
            }
        }

        debug!(
            "Loaded track: {} nodes, {} edges, {} sensors",
            graph.node_count(),
            graph.edge_count(),
            sensors.len()
        );

        Ok(Self {
            graph,
            names,
            sensors,
        })
    }

    pub fn node(&self, id: NodeId) -> &TrackNode {
        &self.graph[id]
    }

    /// Outgoing edge of `node` in slot `direction`, if the node has one there
    pub fn edge(&self, node: NodeId, direction: SwitchDirection) -> Option<EdgeId> {
        self.graph[node].out[direction.index()]
    }

    pub fn reverse(&self, edge: EdgeId) -> EdgeId {
        self.graph[edge].reverse
    }

    pub fn length(&self, edge: EdgeId) -> Micrometers {
        self.graph[edge].length
    }

    pub fn source(&self, edge: EdgeId) -> NodeId {
        self.graph[edge].source
    }

    pub fn dest(&self, edge: EdgeId) -> NodeId {
        self.graph[edge].dest
    }

    pub fn node_by_name(&self, name: &str) -> Option<NodeId> {
        self.names.get(name).copied()
    }

    /// The sensor node reporting as `num`
    pub fn sensor_node(&self, num: u8) -> Option<NodeId> {
        self.sensors.get(&num).copied()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.graph.edge_indices()
    }
}

fn validate(spec: &TrackSpec) -> Result<(), ConfigError> {
    let node_count = spec.nodes.len();
    let edge_count = spec.edges.len();
    if node_count == 0 {
        return Err(ConfigError::Empty);
    }

    for (i, node) in spec.nodes.iter().enumerate() {
        if node.reverse >= node_count {
            return Err(ConfigError::Dangling {
                what: "node",
                index: i,
                target: "node",
                reference: node.reverse,
            });
        }
    }

    let mut sensor_nums = HashSet::new();
    for (i, node) in spec.nodes.iter().enumerate() {
        let reverse = &spec.nodes[node.reverse];
        if reverse.reverse != i || node.reverse == i {
            return Err(ConfigError::NodeReverseMismatch(i));
        }
        if reverse.kind != node.kind.reverse_kind() {
            return Err(ConfigError::ReverseKindMismatch {
                node: i,
                kind: node.kind,
                reverse_kind: reverse.kind,
            });
        }
        match (node.kind.is_numbered(), node.num) {
            (true, None) => return Err(ConfigError::MissingNumber(i)),
            (_, Some(num)) if node.kind == NodeKind::Sensor => {
                if usize::from(num) >= SENSOR_COUNT {
                    return Err(ConfigError::SensorOutOfRange { node: i, num });
                }
                if !sensor_nums.insert(num) {
                    return Err(ConfigError::DuplicateSensor(num));
                }
            }
            _ => {}
        }
    }

    for (i, edge) in spec.edges.iter().enumerate() {
        for (target, reference, bound) in [
            ("node", edge.src, node_count),
            ("node", edge.dest, node_count),
            ("edge", edge.reverse, edge_count),
        ] {
            if reference >= bound {
                return Err(ConfigError::Dangling {
                    what: "edge",
                    index: i,
                    target,
                    reference,
                });
            }
        }
        if edge.length_mm == 0 {
            return Err(ConfigError::InvalidLength {
                edge: i,
                length: edge.length_mm,
            });
        }
    }

    let mut slots: Vec<[bool; 2]> = vec![[false; 2]; node_count];
    for (i, edge) in spec.edges.iter().enumerate() {
        let reverse = &spec.edges[edge.reverse];
        if reverse.reverse != i || edge.reverse == i {
            return Err(ConfigError::EdgeReverseMismatch(i));
        }
        if reverse.length_mm != edge.length_mm {
            return Err(ConfigError::EdgeLengthMismatch {
                edge: i,
                length: edge.length_mm,
                reverse_length: reverse.length_mm,
            });
        }
        if reverse.src != spec.nodes[edge.dest].reverse
            || reverse.dest != spec.nodes[edge.src].reverse
        {
            return Err(ConfigError::EdgeReverseEndpoints(i));
        }

        let taken = &mut slots[edge.src][edge.slot.index()];
        if *taken {
            return Err(ConfigError::DuplicateSlot {
                node: edge.src,
                slot: edge.slot.index(),
            });
        }
        *taken = true;
    }

    for (i, node) in spec.nodes.iter().enumerate() {
        let found: Vec<usize> = (0..2).filter(|&s| slots[i][s]).collect();
        let expected: Vec<usize> = (0..node.kind.out_degree()).collect();
        if found != expected {
            return Err(ConfigError::BadSlots {
                node: i,
                kind: node.kind,
                found,
            });
        }
    }

    Ok(())
}
