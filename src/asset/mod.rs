//! Asset System
//!
//! An asset is a reusable, parameterized scene-object template plus an
//! optional per-tick behavior.
//!
//! ```text
//! AssetDefinition
//! ├── id: &'static str       ("sphere", "k1p2", ...)
//! ├── label: &'static str
//! ├── defaults: AssetConfig  (typed, one struct per config kind)
//! └── build: fn(instance_id, &AssetConfig) -> AssetBuild
//!     ├── objects: Vec<SimObjectDefinition>   (id == instance_id)
//!     └── behavior: Option<AssetBehavior>
//! ```
//!
//! Instantiation merges caller [`AssetOverrides`] over the defaults, then
//! runs the build function.

mod builtin;
mod config;
mod registry;

pub use config::{
    AssetConfig, AssetOverrides, AxisConfig, AxisOverrides, BladeConfig, BladeOverrides,
    DexelConfig, DexelOverrides, GridConfig, GridOverrides, SphereConfig, SphereOverrides,
    TwirlConfig, TwirlOverrides, MIN_BLADE_SEGMENTS, MIN_BLADE_SIZE, MIN_BLADE_WIDTH,
};
pub use registry::{AssetBuild, AssetDefinition, AssetError, AssetRegistry, BuildFn};
