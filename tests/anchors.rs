#[path = "anchors/gas_ceiling_short_circuit.rs"]
pub mod gas_ceiling_short_circuit;

#[path = "anchors/lane_detach_semantics.rs"]
pub mod lane_detach_semantics;

#[path = "anchors/cooperative_stop.rs"]
pub mod cooperative_stop;
