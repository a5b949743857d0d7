//! Scene Object Definitions
//!
//! The closed set of object kinds the renderer knows how to draw. Every kind
//! carries only the fields that are meaningful for it; shared accessors are
//! exhaustive matches so a new kind fails to compile at every call site until
//! it is handled.

use serde::{Deserialize, Serialize};

/// Rotation sense for spinning objects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Clockwise,
    CounterClockwise,
}

impl Direction {
    /// Multiplier applied to angular speed
    pub fn sign(self) -> f32 {
        match self {
            Direction::Clockwise => -1.0,
            Direction::CounterClockwise => 1.0,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Direction::Clockwise => Direction::CounterClockwise,
            Direction::CounterClockwise => Direction::Clockwise,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Direction::Clockwise => "CW",
            Direction::CounterClockwise => "CCW",
        }
    }
}

/// Plane a flat shape lies in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Plane {
    #[default]
    Xy,
    Xz,
    Yz,
}

impl Plane {
    pub const ALL: [Plane; 3] = [Plane::Xy, Plane::Xz, Plane::Yz];

    pub fn next(self) -> Self {
        match self {
            Plane::Xy => Plane::Xz,
            Plane::Xz => Plane::Yz,
            Plane::Yz => Plane::Xy,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Plane::Xy => "XY",
            Plane::Xz => "XZ",
            Plane::Yz => "YZ",
        }
    }
}

/// World axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Axis {
    X,
    #[default]
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn next(self) -> Self {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::Z,
            Axis::Z => Axis::X,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
        }
    }

    /// Conventional display color (X red, Y green, Z blue)
    pub fn color(self) -> [u8; 3] {
        match self {
            Axis::X => [230, 70, 70],
            Axis::Y => [80, 210, 90],
            Axis::Z => [70, 120, 240],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SphereObject {
    pub id: String,
    pub position: [f32; 3],
    pub radius: f32,
    pub color: [u8; 3],
    pub opacity: f32,
}

/// A ring spinning in a plane, with a bead marking its phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwirlObject {
    pub id: String,
    pub position: [f32; 3],
    pub radius: f32,
    pub speed: f32,
    pub direction: Direction,
    pub plane: Plane,
    pub color: [u8; 3],
    pub opacity: f32,
}

/// An axis arrow spinning about itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwirlingAxisObject {
    pub id: String,
    pub position: [f32; 3],
    pub axis: Axis,
    pub length: f32,
    pub thickness: f32,
    pub speed: f32,
    pub direction: Direction,
    pub color: [u8; 3],
    pub opacity: f32,
}

/// Reference grid plane in XY
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RgpXyObject {
    pub id: String,
    pub position: [f32; 3],
    pub size: f32,
    pub divisions: u32,
    pub color: [u8; 3],
    pub opacity: f32,
}

/// Figure-eight blade (K1P2)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Twirl8Object {
    pub id: String,
    pub position: [f32; 3],
    pub size: f32,
    pub width: f32,
    pub segments: u32,
    pub speed: f32,
    pub direction: Direction,
    pub plane: Plane,
    pub color: [u8; 3],
    pub opacity: f32,
    pub show_spokes: bool,
}

/// Dexel column marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DexelObject {
    pub id: String,
    pub position: [f32; 3],
    pub size: f32,
    pub height: f32,
    pub color: [u8; 3],
    pub opacity: f32,
}

/// Discriminant of [`SimObjectDefinition`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimObjectKind {
    Sphere,
    Twirl,
    TwirlingAxis,
    RgpXy,
    Twirl8,
    Dexel,
}

impl SimObjectKind {
    pub fn label(self) -> &'static str {
        match self {
            SimObjectKind::Sphere => "Sphere",
            SimObjectKind::Twirl => "Twirl",
            SimObjectKind::TwirlingAxis => "Twirling Axis",
            SimObjectKind::RgpXy => "Grid XY",
            SimObjectKind::Twirl8 => "Twirl8",
            SimObjectKind::Dexel => "Dexel",
        }
    }
}

/// A renderable scene object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimObjectDefinition {
    Sphere(SphereObject),
    Twirl(TwirlObject),
    TwirlingAxis(TwirlingAxisObject),
    RgpXy(RgpXyObject),
    Twirl8(Twirl8Object),
    Dexel(DexelObject),
}

impl SimObjectDefinition {
    /// Id of the asset instance that produced this object
    pub fn id(&self) -> &str {
        match self {
            SimObjectDefinition::Sphere(o) => &o.id,
            SimObjectDefinition::Twirl(o) => &o.id,
            SimObjectDefinition::TwirlingAxis(o) => &o.id,
            SimObjectDefinition::RgpXy(o) => &o.id,
            SimObjectDefinition::Twirl8(o) => &o.id,
            SimObjectDefinition::Dexel(o) => &o.id,
        }
    }

    pub fn kind(&self) -> SimObjectKind {
        match self {
            SimObjectDefinition::Sphere(_) => SimObjectKind::Sphere,
            SimObjectDefinition::Twirl(_) => SimObjectKind::Twirl,
            SimObjectDefinition::TwirlingAxis(_) => SimObjectKind::TwirlingAxis,
            SimObjectDefinition::RgpXy(_) => SimObjectKind::RgpXy,
            SimObjectDefinition::Twirl8(_) => SimObjectKind::Twirl8,
            SimObjectDefinition::Dexel(_) => SimObjectKind::Dexel,
        }
    }

    pub fn position(&self) -> [f32; 3] {
        match self {
            SimObjectDefinition::Sphere(o) => o.position,
            SimObjectDefinition::Twirl(o) => o.position,
            SimObjectDefinition::TwirlingAxis(o) => o.position,
            SimObjectDefinition::RgpXy(o) => o.position,
            SimObjectDefinition::Twirl8(o) => o.position,
            SimObjectDefinition::Dexel(o) => o.position,
        }
    }

    pub fn color(&self) -> [u8; 3] {
        match self {
            SimObjectDefinition::Sphere(o) => o.color,
            SimObjectDefinition::Twirl(o) => o.color,
            SimObjectDefinition::TwirlingAxis(o) => o.color,
            SimObjectDefinition::RgpXy(o) => o.color,
            SimObjectDefinition::Twirl8(o) => o.color,
            SimObjectDefinition::Dexel(o) => o.color,
        }
    }

    pub fn opacity(&self) -> f32 {
        match self {
            SimObjectDefinition::Sphere(o) => o.opacity,
            SimObjectDefinition::Twirl(o) => o.opacity,
            SimObjectDefinition::TwirlingAxis(o) => o.opacity,
            SimObjectDefinition::RgpXy(o) => o.opacity,
            SimObjectDefinition::Twirl8(o) => o.opacity,
            SimObjectDefinition::Dexel(o) => o.opacity,
        }
    }

    /// Angular speed and sense, for kinds that spin
    pub fn spin(&self) -> Option<(f32, Direction)> {
        match self {
            SimObjectDefinition::Twirl(o) => Some((o.speed, o.direction)),
            SimObjectDefinition::TwirlingAxis(o) => Some((o.speed, o.direction)),
            SimObjectDefinition::Twirl8(o) => Some((o.speed, o.direction)),
            SimObjectDefinition::Sphere(_)
            | SimObjectDefinition::RgpXy(_)
            | SimObjectDefinition::Dexel(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sphere(id: &str) -> SimObjectDefinition {
        SimObjectDefinition::Sphere(SphereObject {
            id: id.to_string(),
            position: [1.0, 2.0, 3.0],
            radius: 0.5,
            color: [255, 0, 0],
            opacity: 1.0,
        })
    }

    #[test]
    fn test_accessors_follow_variant() {
        let obj = sphere("s1");
        assert_eq!(obj.id(), "s1");
        assert_eq!(obj.kind(), SimObjectKind::Sphere);
        assert_eq!(obj.position(), [1.0, 2.0, 3.0]);
        assert!(obj.spin().is_none());
    }

    #[test]
    fn test_direction_sign_and_toggle() {
        assert_eq!(Direction::Clockwise.sign(), -1.0);
        assert_eq!(Direction::CounterClockwise.sign(), 1.0);
        assert_eq!(Direction::Clockwise.toggled(), Direction::CounterClockwise);
    }

    #[test]
    fn test_enum_cycles_visit_every_value() {
        let mut plane = Plane::Xy;
        for _ in 0..Plane::ALL.len() {
            plane = plane.next();
        }
        assert_eq!(plane, Plane::Xy);

        let mut axis = Axis::X;
        for _ in 0..Axis::ALL.len() {
            axis = axis.next();
        }
        assert_eq!(axis, Axis::X);
    }
}
