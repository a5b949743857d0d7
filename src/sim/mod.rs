//! Simulation object model
//!
//! - `object` - the closed set of scene object kinds
//! - `behavior` - per-tick behaviors and runtime object state

mod behavior;
mod object;

pub use behavior::{AssetBehavior, ObjectState, Tick};
pub use object::{
    Axis, DexelObject, Direction, Plane, RgpXyObject, SimObjectDefinition, SimObjectKind,
    SphereObject, Twirl8Object, TwirlObject, TwirlingAxisObject,
};
