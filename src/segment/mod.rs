//! Simulation segments
//!
//! - `blueprint` - declarative scenario data (+ RON import)
//! - `catalog` - the built-in scenarios
//! - `builder` - blueprint -> runtime segment expansion

mod blueprint;
mod builder;
mod catalog;

pub use blueprint::{namespaced_id, parse_blueprints, AssetInstance, GhostMarker, SegmentBlueprint};
pub use builder::{
    build_all_segments, build_segment, in_subtree, InstanceBehavior, SegmentError, SegmentRuntimeAsset,
    SimulationSegmentDefinition,
};
pub use catalog::builtin_blueprints;
