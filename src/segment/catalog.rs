//! Built-in segment catalog
//!
//! The scenarios shipped with the viewer. Treated as read-only data; edits
//! happen on the built segments, never on these blueprints.

use std::f32::consts::FRAC_PI_4;

use crate::asset::{
    AssetOverrides, AxisOverrides, BladeOverrides, DexelOverrides, GridOverrides, SphereOverrides,
    TwirlOverrides,
};
use crate::sim::{Axis, Direction, Plane};
use super::blueprint::{AssetInstance, GhostMarker, SegmentBlueprint};

/// All built-in blueprints, in display order
pub fn builtin_blueprints() -> Vec<SegmentBlueprint> {
    vec![k1p2_blade(), twirl_orbit(), dexel_field()]
}

fn floor_grid() -> AssetInstance {
    AssetInstance::new("rgp-xy", "floor").with_config(AssetOverrides::Grid(GridOverrides {
        size: Some(12.0),
        divisions: Some(12),
        ..Default::default()
    }))
}

fn sphere_at(id: &str, position: [f32; 3], radius: f32, color: [u8; 3]) -> AssetInstance {
    AssetInstance::new("sphere", id).with_config(AssetOverrides::Sphere(SphereOverrides {
        position: Some(position),
        radius: Some(radius),
        color: Some(color),
        ..Default::default()
    }))
}

/// Figure-eight blade with its hub and the path its tips sweep
fn k1p2_blade() -> SegmentBlueprint {
    let tip_radius = 2.5;
    let mut blueprint = SegmentBlueprint::new("k1p2-blade", "K1P2 Blade")
        .with_asset(floor_grid())
        .with_asset(AssetInstance::new("axis-triad", "axes"))
        .with_asset(
            AssetInstance::new("k1p2", "blade")
                .with_config(AssetOverrides::Blade(BladeOverrides {
                    position: Some([0.0, 0.0, 0.5]),
                    size: Some(tip_radius),
                    width: Some(1.2),
                    segments: Some(64),
                    ..Default::default()
                }))
                .with_child(sphere_at("hub", [0.0, 0.0, 0.5], 0.15, [255, 255, 255])),
        );

    // Tip path, one ghost every 45 degrees
    for i in 0..8 {
        let angle = i as f32 * FRAC_PI_4;
        blueprint = blueprint.with_ghost(GhostMarker::new(
            [tip_radius * angle.cos(), tip_radius * angle.sin(), 0.5],
            [255, 200, 150],
            0.06,
            0.35,
        ));
    }
    blueprint
}

/// Two counter-rotating twirls, each carrying a bead child with the same local id
fn twirl_orbit() -> SegmentBlueprint {
    let twirl = |id: &str, radius: f32, direction: Direction, plane: Plane, color: [u8; 3]| {
        AssetInstance::new("twirl", id)
            .with_config(AssetOverrides::Twirl(TwirlOverrides {
                position: Some([0.0, 0.0, 1.0]),
                radius: Some(radius),
                direction: Some(direction),
                plane: Some(plane),
                color: Some(color),
                ..Default::default()
            }))
            .with_child(sphere_at("bead", [radius, 0.0, 1.0], 0.2, color))
    };

    SegmentBlueprint::new("twirl-orbit", "Twirl Orbit")
        .with_asset(floor_grid())
        .with_asset(twirl("outer", 3.0, Direction::CounterClockwise, Plane::Xy, [120, 200, 255]))
        .with_asset(twirl("inner", 1.5, Direction::Clockwise, Plane::Xz, [255, 120, 200]))
        .with_asset(
            AssetInstance::new("twirling-axis", "spindle").with_config(AssetOverrides::Axis(AxisOverrides {
                axis: Some(Axis::Z),
                color: Some(Axis::Z.color()),
                length: Some(2.5),
                ..Default::default()
            })),
        )
        .with_ghost(GhostMarker::new([0.0, 0.0, 1.0], [255, 255, 255], 0.1, 0.5))
}

/// A 3x3 field of dexel columns, the middle row pulsing
fn dexel_field() -> SegmentBlueprint {
    let mut field = AssetInstance::new("rgp-xy", "field").with_config(AssetOverrides::Grid(GridOverrides {
        size: Some(6.0),
        divisions: Some(6),
        ..Default::default()
    }));

    for row in 0..3 {
        for col in 0..3 {
            let pulsing = row == 1;
            field = field.with_child(
                AssetInstance::new("dexel", format!("d{}{}", row, col)).with_config(AssetOverrides::Dexel(
                    DexelOverrides {
                        position: Some([(col as f32 - 1.0) * 1.5, (row as f32 - 1.0) * 1.5, 0.0]),
                        height: Some(0.5 + 0.5 * (row + col) as f32),
                        pulse_period: pulsing.then_some(1.5 + col as f32 * 0.5),
                        pulse_min: pulsing.then_some(0.6),
                        pulse_max: pulsing.then_some(1.4),
                        ..Default::default()
                    },
                )),
            );
        }
    }

    SegmentBlueprint::new("dexel-field", "Dexel Field")
        .with_asset(field)
        .with_asset(AssetInstance::new("twirling-axis", "marker").with_config(AssetOverrides::Axis(
            AxisOverrides {
                position: Some([3.5, 0.0, 0.0]),
                ..Default::default()
            },
        )))
        .with_ghost(GhostMarker::new([-3.0, -3.0, 0.0], [200, 200, 200], 0.08, 0.4))
        .with_ghost(GhostMarker::new([3.0, 3.0, 0.0], [200, 200, 200], 0.08, 0.4))
}
