//! Cursor movement over the track graph

use train_sim::simulation::{
    mm, EdgeId, PositionCursor, SwitchDirection, SwitchTable, TrackGraph, TrackSpec,
    TraversalError,
};

fn demo_loop() -> TrackGraph {
    TrackGraph::load(&TrackSpec::demo_loop()).expect("demo loop loads")
}

fn demo_line() -> TrackGraph {
    TrackGraph::load(&TrackSpec::demo_line()).expect("demo line loads")
}

/// The edge running from node `from` to node `to`
fn edge(track: &TrackGraph, from: &str, to: &str) -> EdgeId {
    let from = track.node_by_name(from).expect("from node");
    let to = track.node_by_name(to).expect("to node");
    track
        .edges()
        .find(|&e| track.source(e) == from && track.dest(e) == to)
        .expect("edge between nodes")
}

// ============================================================================
// Graph invariants
// ============================================================================

#[test]
fn reverse_is_an_involution_with_equal_length() {
    for track in [demo_loop(), demo_line()] {
        for e in track.edges() {
            let r = track.reverse(e);
            assert_ne!(r, e);
            assert_eq!(track.reverse(r), e);
            assert_eq!(track.length(r), track.length(e));
        }
    }
}

#[test]
fn reverse_edge_joins_reverse_nodes() {
    let track = demo_loop();
    for e in track.edges() {
        let r = track.reverse(e);
        assert_eq!(track.source(r), track.node(track.dest(e)).reverse);
        assert_eq!(track.dest(r), track.node(track.source(e)).reverse);
    }
}

// ============================================================================
// Forward movement
// ============================================================================

#[test]
fn forward_advance_stays_on_edge() {
    let track = demo_loop();
    let switches = SwitchTable::new();
    let start = edge(&track, "A1", "BR1");
    let mut cursor = PositionCursor::new(start, mm(10.0));

    let result = cursor.advance(mm(100.0), &track, &switches).unwrap();
    assert_eq!(cursor, PositionCursor::new(start, mm(110.0)));
    assert!(result.tripped.is_empty());
    assert_eq!(result.left_track, None);
}

#[test]
fn forward_advance_follows_main_line_by_default() {
    let track = demo_loop();
    let switches = SwitchTable::new();
    let mut cursor = PositionCursor::new(edge(&track, "A1", "BR1"), mm(50.0));

    cursor.advance(mm(1234.0), &track, &switches).unwrap();
    // 50 + 1234 - 300 - 200 - 400 = 384 along MR2 -> A1
    assert_eq!(
        cursor,
        PositionCursor::new(edge(&track, "MR2", "A1"), mm(384.0))
    );
}

#[test]
fn curved_switch_takes_siding() {
    let track = demo_loop();
    let mut switches = SwitchTable::new();
    switches.set(0, SwitchDirection::Curved);
    let mut cursor = PositionCursor::new(edge(&track, "A1", "BR1"), mm(299.0));

    cursor.advance(mm(2.0), &track, &switches).unwrap();
    assert_eq!(cursor, PositionCursor::new(edge(&track, "BR1", "A5"), mm(1.0)));
}

#[test]
fn landing_exactly_on_node_starts_next_edge() {
    let track = demo_loop();
    let switches = SwitchTable::new();
    let mut cursor = PositionCursor::new(edge(&track, "A1", "BR1"), mm(100.0));

    cursor.advance(mm(200.0), &track, &switches).unwrap();
    assert_eq!(cursor, PositionCursor::new(edge(&track, "BR1", "A3"), 0));
}

#[test]
fn step_granularity_does_not_change_result() {
    let track = demo_loop();
    let mut switches = SwitchTable::new();
    switches.set(0, SwitchDirection::Curved);
    let start = PositionCursor::new(edge(&track, "A1", "BR1"), mm(50.1));
    let total = mm(1700.25);

    let mut whole = start;
    whole.advance(total, &track, &switches).unwrap();

    for step in [333, mm(7.0), mm(100.0), mm(123.457), mm(425.0), mm(850.0)] {
        let mut chunked = start;
        let mut travelled = 0;
        while travelled < total {
            let amount = step.min(total - travelled);
            chunked.advance(amount, &track, &switches).unwrap();
            travelled += amount;
        }
        assert_eq!(chunked, whole, "step size {}", step);
    }
}

#[test]
fn fractional_steps_add_up_exactly() {
    let track = demo_loop();
    let switches = SwitchTable::new();
    let start = PositionCursor::new(edge(&track, "A1", "BR1"), 0);

    let mut whole = start;
    whole.advance(mm(0.3), &track, &switches).unwrap();

    let mut chunked = start;
    chunked.advance(mm(0.1), &track, &switches).unwrap();
    chunked.advance(mm(0.2), &track, &switches).unwrap();

    assert_eq!(chunked, whole);
    assert_eq!(whole.offset, 300);
}

// ============================================================================
// Backward movement
// ============================================================================

#[test]
fn backward_advance_finds_predecessor_edge() {
    let track = demo_loop();
    let switches = SwitchTable::new();
    let mut cursor = PositionCursor::new(edge(&track, "A3", "MR2"), mm(5.0));

    let result = cursor.advance(mm(-10.0), &track, &switches).unwrap();
    assert_eq!(
        cursor,
        PositionCursor::new(edge(&track, "BR1", "A3"), mm(195.0))
    );
    // Backing over A3 is passing A4 in the other direction.
    assert_eq!(result.tripped, vec![3]);
}

#[test]
fn forward_then_backward_restores_cursor() {
    let track = demo_loop();
    let switches = SwitchTable::new();
    let start = PositionCursor::new(edge(&track, "A3", "MR2"), mm(120.0));

    let mut cursor = start;
    cursor.advance(mm(900.0), &track, &switches).unwrap();
    assert_eq!(
        cursor,
        PositionCursor::new(edge(&track, "A1", "BR1"), mm(120.0))
    );
    cursor.advance(mm(-900.0), &track, &switches).unwrap();
    assert_eq!(cursor, start);
}

#[test]
fn fractional_forward_then_backward_restores_cursor() {
    let track = demo_loop();
    let switches = SwitchTable::new();
    let start = PositionCursor::new(edge(&track, "A1", "BR1"), mm(0.1));

    let mut cursor = start;
    cursor.advance(mm(299.95), &track, &switches).unwrap();
    assert_eq!(cursor, PositionCursor::new(edge(&track, "BR1", "A3"), 50));
    cursor.advance(mm(-299.95), &track, &switches).unwrap();
    assert_eq!(cursor, start);
}

#[test]
fn round_trip_through_siding_with_both_switches_curved() {
    let track = demo_loop();
    let mut switches = SwitchTable::new();
    switches.set(0, SwitchDirection::Curved);
    switches.set(1, SwitchDirection::Curved);
    let start = PositionCursor::new(edge(&track, "MR2", "A1"), mm(480.3));

    for distance in [0.001, 25.0, 320.0, 333.333, 700.0, 1500.0] {
        let distance = mm(distance);
        let mut cursor = start;
        cursor.advance(distance, &track, &switches).unwrap();
        cursor.advance(-distance, &track, &switches).unwrap();
        assert_eq!(cursor, start, "distance {}", distance);
    }
}

// ============================================================================
// Sensors
// ============================================================================

#[test]
fn passing_sensor_node_trips_it() {
    let track = demo_loop();
    let switches = SwitchTable::new();
    let mut cursor = PositionCursor::new(edge(&track, "BR1", "A3"), mm(190.0));

    let result = cursor.advance(mm(20.0), &track, &switches).unwrap();
    assert_eq!(cursor, PositionCursor::new(edge(&track, "A3", "MR2"), mm(10.0)));
    assert_eq!(result.tripped, vec![2]);
}

#[test]
fn passing_branch_trips_nothing() {
    let track = demo_loop();
    let switches = SwitchTable::new();
    let mut cursor = PositionCursor::new(edge(&track, "A1", "BR1"), mm(290.0));

    let result = cursor.advance(mm(20.0), &track, &switches).unwrap();
    assert!(result.tripped.is_empty());
}

#[test]
fn sensors_trip_in_order_passed() {
    let track = demo_loop();
    let switches = SwitchTable::new();
    let mut cursor = PositionCursor::new(edge(&track, "BR1", "A3"), 0);

    let result = cursor.advance(mm(1200.0), &track, &switches).unwrap();
    assert_eq!(result.tripped, vec![2, 0]);
}

// ============================================================================
// Reversing
// ============================================================================

#[test]
fn reverse_in_place_twice_is_identity() {
    let track = demo_loop();
    for e in track.edges() {
        let length = track.length(e);
        for offset in [0, 1, mm(0.1), length / 3, length / 2, length - 1] {
            let start = PositionCursor::new(e, offset);
            let mut cursor = start;
            cursor.reverse_in_place(&track);
            cursor.reverse_in_place(&track);
            assert_eq!(cursor, start);
        }
    }
}

#[test]
fn reverse_in_place_keeps_position() {
    let track = demo_loop();
    let mut cursor = PositionCursor::new(edge(&track, "A1", "BR1"), mm(100.0));
    let before = cursor.position(&track);
    let heading = cursor.direction(&track);

    cursor.reverse_in_place(&track);
    assert_eq!(cursor.edge, edge(&track, "MR1", "A2"));
    assert_eq!(cursor.offset, mm(200.0));

    let after = cursor.position(&track);
    assert!((before.x - after.x).abs() < 1e-9);
    assert!((before.y - after.y).abs() < 1e-9);
    let turned = cursor.direction(&track);
    assert_eq!((turned.x, turned.y), (-heading.x, -heading.y));
}

#[test]
fn reversed_cursor_at_edge_end_moves_on() {
    let track = demo_loop();
    let switches = SwitchTable::new();
    let mut cursor = PositionCursor::new(edge(&track, "BR1", "A3"), 0);
    cursor.reverse_in_place(&track);
    assert_eq!(
        cursor,
        PositionCursor::new(edge(&track, "A4", "MR1"), mm(200.0))
    );

    cursor.advance(0, &track, &switches).unwrap();
    assert_eq!(cursor, PositionCursor::new(edge(&track, "MR1", "A2"), 0));
}

// ============================================================================
// Geometry
// ============================================================================

#[test]
fn position_interpolates_along_edge() {
    let track = demo_loop();
    let cursor = PositionCursor::new(edge(&track, "BR1", "A5"), mm(125.0));
    let pos = cursor.position(&track);
    // BR1 (300, 0) to A5 (500, 250), halfway
    assert!((pos.x - 400.0).abs() < 1e-9);
    assert!((pos.y - 125.0).abs() < 1e-9);

    let dir = cursor.direction(&track);
    assert_eq!((dir.x, dir.y), (200.0, 250.0));
}

// ============================================================================
// End of track and failures
// ============================================================================

#[test]
fn running_past_exit_leaves_track() {
    let track = demo_line();
    let switches = SwitchTable::new();
    let mut cursor = PositionCursor::new(edge(&track, "EN1", "C1"), mm(50.0));

    let result = cursor.advance(mm(200.0), &track, &switches).unwrap();
    assert_eq!(result.tripped, vec![32]);
    assert_eq!(result.left_track, track.node_by_name("EX2"));
    // Parked at the very end of the last edge
    assert_eq!(cursor.edge, edge(&track, "C1", "EX2"));
    assert_eq!(cursor.offset, track.length(cursor.edge));
}

#[test]
fn backing_past_entry_leaves_track() {
    let track = demo_line();
    let switches = SwitchTable::new();
    let mut cursor = PositionCursor::new(edge(&track, "EN1", "C1"), mm(10.0));

    let result = cursor.advance(mm(-20.0), &track, &switches).unwrap();
    assert_eq!(result.left_track, track.node_by_name("EX1"));
    assert_eq!(cursor.offset, 0);
}

#[test]
fn runaway_advance_is_reported() {
    let track = demo_loop();
    let switches = SwitchTable::new();
    let mut cursor = PositionCursor::new(edge(&track, "A1", "BR1"), 0);

    let err = cursor.advance(mm(1.0e6), &track, &switches).unwrap_err();
    assert_eq!(
        err,
        TraversalError::NonConvergent {
            amount: mm(1.0e6),
            limit: track.edge_count()
        }
    );
}

#[test]
fn huge_advance_does_not_overflow() {
    let track = demo_loop();
    let switches = SwitchTable::new();
    let mut cursor = PositionCursor::new(edge(&track, "A1", "BR1"), mm(10.0));

    let err = cursor.advance(i64::MAX, &track, &switches).unwrap_err();
    assert!(matches!(err, TraversalError::NonConvergent { .. }));
}
