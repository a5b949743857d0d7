//! Typed asset configuration
//!
//! Each config kind has a defaults struct (every field required) and an
//! overrides struct (every field optional). Merging takes the override where
//! present and the default otherwise, so a caller can only override a field
//! with a value of the field's own type.
//!
//! Overrides deserialize from RON with `#[serde(default)]` and without
//! `deny_unknown_fields`: missing keys keep defaults, unknown keys are ignored.

use serde::{Deserialize, Serialize};
use crate::sim::{Axis, Direction, Plane};
use super::AssetError;

/// Smallest effective blade size (world units)
pub const MIN_BLADE_SIZE: f32 = 0.25;
/// Smallest effective blade width (world units)
pub const MIN_BLADE_WIDTH: f32 = 0.1;
/// Fewest samples per blade lobe
pub const MIN_BLADE_SEGMENTS: u32 = 8;

macro_rules! typed_config {
    ($(#[$meta:meta])* $config:ident / $overrides:ident {
        $($field:ident : $ty:ty),* $(,)?
    }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        pub struct $config {
            $(pub $field: $ty,)*
        }

        /// Partial override of
        #[doc = concat!("[`", stringify!($config), "`]")]
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        #[serde(default)]
        pub struct $overrides {
            $(pub $field: Option<$ty>,)*
        }

        impl $config {
            /// Field-by-field merge, overrides win
            pub fn merged(&self, overrides: &$overrides) -> Self {
                Self {
                    $($field: overrides.$field.clone().unwrap_or_else(|| self.$field.clone()),)*
                }
            }
        }
    };
}

typed_config! {
    SphereConfig / SphereOverrides {
        position: [f32; 3],
        radius: f32,
        color: [u8; 3],
        opacity: f32,
    }
}

typed_config! {
    TwirlConfig / TwirlOverrides {
        position: [f32; 3],
        radius: f32,
        speed: f32,
        direction: Direction,
        plane: Plane,
        color: [u8; 3],
        opacity: f32,
    }
}

typed_config! {
    /// Shared by single twirling axes and axis triads
    AxisConfig / AxisOverrides {
        position: [f32; 3],
        axis: Axis,
        length: f32,
        thickness: f32,
        speed: f32,
        direction: Direction,
        color: [u8; 3],
        opacity: f32,
    }
}

typed_config! {
    GridConfig / GridOverrides {
        position: [f32; 3],
        size: f32,
        divisions: u32,
        color: [u8; 3],
        opacity: f32,
    }
}

typed_config! {
    /// Figure-eight blade. Size and width are post-processed by
    /// [`AssetConfig::merge`], see [`BladeConfig::resolve`].
    BladeConfig / BladeOverrides {
        position: [f32; 3],
        size: f32,
        width: f32,
        segments: u32,
        speed: f32,
        direction: Direction,
        plane: Plane,
        color: [u8; 3],
        opacity: f32,
        show_spokes: bool,
    }
}

typed_config! {
    DexelConfig / DexelOverrides {
        position: [f32; 3],
        size: f32,
        height: f32,
        color: [u8; 3],
        opacity: f32,
        pulse_period: f32,
        pulse_min: f32,
        pulse_max: f32,
    }
}

impl BladeConfig {
    /// Merge with the size/width cross-default and floors applied.
    ///
    /// If only one of size/width is overridden, the other follows it. Both
    /// are then floored, as is the segment count.
    pub fn resolve(&self, overrides: &BladeOverrides) -> Self {
        let mut merged = self.merged(overrides);
        let (size, width) = match (overrides.size, overrides.width) {
            (Some(size), Some(width)) => (size, width),
            (Some(size), None) => (size, size),
            (None, Some(width)) => (width, width),
            (None, None) => (self.size, self.width),
        };
        // f32::max returns the floor for NaN input
        merged.size = size.max(MIN_BLADE_SIZE);
        merged.width = width.max(MIN_BLADE_WIDTH);
        merged.segments = merged.segments.max(MIN_BLADE_SEGMENTS);
        merged
    }
}

impl AxisConfig {
    /// Merge where an overridden axis also brings its own color, unless the
    /// color is overridden too
    pub fn resolve(&self, overrides: &AxisOverrides) -> Self {
        let mut merged = self.merged(overrides);
        if let (Some(axis), None) = (overrides.axis, overrides.color) {
            merged.color = axis.color();
        }
        merged
    }
}

/// Default configuration of an asset definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AssetConfig {
    Sphere(SphereConfig),
    Twirl(TwirlConfig),
    Axis(AxisConfig),
    Grid(GridConfig),
    Blade(BladeConfig),
    Dexel(DexelConfig),
}

/// Caller-supplied partial configuration for one asset instance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum AssetOverrides {
    /// Keep every default
    #[default]
    None,
    Sphere(SphereOverrides),
    Twirl(TwirlOverrides),
    Axis(AxisOverrides),
    Grid(GridOverrides),
    Blade(BladeOverrides),
    Dexel(DexelOverrides),
}

impl AssetConfig {
    pub fn kind_name(&self) -> &'static str {
        match self {
            AssetConfig::Sphere(_) => "Sphere",
            AssetConfig::Twirl(_) => "Twirl",
            AssetConfig::Axis(_) => "Axis",
            AssetConfig::Grid(_) => "Grid",
            AssetConfig::Blade(_) => "Blade",
            AssetConfig::Dexel(_) => "Dexel",
        }
    }

    /// Merge caller overrides over these defaults.
    ///
    /// `asset_id` is only used for the error message when the override kind
    /// doesn't match the defaults.
    pub fn merge(&self, asset_id: &str, overrides: &AssetOverrides) -> Result<AssetConfig, AssetError> {
        let merged = match (self, overrides) {
            (_, AssetOverrides::None) => match self {
                AssetConfig::Blade(d) => AssetConfig::Blade(d.resolve(&BladeOverrides::default())),
                other => other.clone(),
            },
            (AssetConfig::Sphere(d), AssetOverrides::Sphere(o)) => AssetConfig::Sphere(d.merged(o)),
            (AssetConfig::Twirl(d), AssetOverrides::Twirl(o)) => AssetConfig::Twirl(d.merged(o)),
            (AssetConfig::Axis(d), AssetOverrides::Axis(o)) => AssetConfig::Axis(d.resolve(o)),
            (AssetConfig::Grid(d), AssetOverrides::Grid(o)) => AssetConfig::Grid(d.merged(o)),
            (AssetConfig::Blade(d), AssetOverrides::Blade(o)) => AssetConfig::Blade(d.resolve(o)),
            (AssetConfig::Dexel(d), AssetOverrides::Dexel(o)) => AssetConfig::Dexel(d.merged(o)),
            (defaults, overrides) => {
                return Err(AssetError::ConfigMismatch {
                    asset: asset_id.to_string(),
                    expected: defaults.kind_name(),
                    found: overrides.kind_name(),
                });
            }
        };
        Ok(merged)
    }
}

impl AssetOverrides {
    pub fn kind_name(&self) -> &'static str {
        match self {
            AssetOverrides::None => "None",
            AssetOverrides::Sphere(_) => "Sphere",
            AssetOverrides::Twirl(_) => "Twirl",
            AssetOverrides::Axis(_) => "Axis",
            AssetOverrides::Grid(_) => "Grid",
            AssetOverrides::Blade(_) => "Blade",
            AssetOverrides::Dexel(_) => "Dexel",
        }
    }
}
