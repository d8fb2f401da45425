//! Mock Train Controller Simulator Library
//!
//! Simulates trains moving over a model railway layout and answers the
//! controller byte protocol the way the real track hardware would.
//!
//! - `simulation` - track graph, switch and sensor tables, train movement
//! - `protocol` - incremental command decoder and dispatch
//! - `transport` - polled byte-stream connections to a controller

pub mod protocol;
pub mod simulation;
pub mod transport;
