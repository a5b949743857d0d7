//! Per-tick behaviors
//!
//! Behaviors are design-time data returned by asset build functions. The app
//! applies them once per simulation tick to the runtime state of every object
//! produced by the owning asset instance.

use std::f32::consts::TAU;

use serde::{Deserialize, Serialize};
use super::SimObjectDefinition;

/// Fixed simulation step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    /// Number of ticks elapsed before this one
    pub index: u64,
    /// Step length in seconds
    pub dt: f32,
}

impl Tick {
    /// Simulation time at the end of this tick
    pub fn time(&self) -> f32 {
        (self.index + 1) as f32 * self.dt
    }
}

/// Mutable animation state for one scene object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectState {
    /// Spin angle in radians, kept in [0, TAU)
    pub angle: f32,
    /// Uniform scale multiplier
    pub scale: f32,
}

impl Default for ObjectState {
    fn default() -> Self {
        Self { angle: 0.0, scale: 1.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AssetBehavior {
    /// Rotate using the object's own speed (radians/second) and direction.
    /// Reading them from the object keeps property edits live.
    Spin,
    /// Oscillate the scale between `min` and `max` over `period` seconds
    Pulse { period: f32, min: f32, max: f32 },
}

impl AssetBehavior {
    pub fn apply(&self, object: &SimObjectDefinition, state: &mut ObjectState, tick: Tick) {
        match self {
            AssetBehavior::Spin => {
                if let Some((speed, direction)) = object.spin() {
                    state.angle = (state.angle + speed * direction.sign() * tick.dt).rem_euclid(TAU);
                }
            }
            AssetBehavior::Pulse { period, min, max } => {
                if *period <= 0.0 {
                    return;
                }
                let phase = (tick.time() / period).fract();
                let t = 0.5 - 0.5 * (phase * TAU).cos();
                state.scale = min + (max - min) * t;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Direction, Plane, TwirlObject, SphereObject};

    fn twirl(speed: f32, direction: Direction) -> SimObjectDefinition {
        SimObjectDefinition::Twirl(TwirlObject {
            id: "t".to_string(),
            position: [0.0; 3],
            radius: 1.0,
            speed,
            direction,
            plane: Plane::Xy,
            color: [255, 255, 255],
            opacity: 1.0,
        })
    }

    #[test]
    fn test_spin_advances_by_speed_and_sign() {
        let obj = twirl(1.0, Direction::CounterClockwise);
        let mut state = ObjectState::default();
        AssetBehavior::Spin.apply(&obj, &mut state, Tick { index: 0, dt: 0.5 });
        assert!((state.angle - 0.5).abs() < 1e-6);

        let obj = twirl(1.0, Direction::Clockwise);
        let mut state = ObjectState::default();
        AssetBehavior::Spin.apply(&obj, &mut state, Tick { index: 0, dt: 0.5 });
        assert!((state.angle - (TAU - 0.5)).abs() < 1e-5);
    }

    #[test]
    fn test_spin_ignores_static_kinds() {
        let obj = SimObjectDefinition::Sphere(SphereObject {
            id: "s".to_string(),
            position: [0.0; 3],
            radius: 1.0,
            color: [0, 0, 0],
            opacity: 1.0,
        });
        let mut state = ObjectState::default();
        AssetBehavior::Spin.apply(&obj, &mut state, Tick { index: 3, dt: 1.0 });
        assert_eq!(state, ObjectState::default());
    }

    #[test]
    fn test_pulse_stays_in_range() {
        let obj = twirl(0.0, Direction::Clockwise);
        let behavior = AssetBehavior::Pulse { period: 2.0, min: 0.5, max: 1.5 };
        let mut state = ObjectState::default();
        for index in 0..200 {
            behavior.apply(&obj, &mut state, Tick { index, dt: 1.0 / 60.0 });
            assert!(state.scale >= 0.5 - 1e-5 && state.scale <= 1.5 + 1e-5);
        }
    }
}
