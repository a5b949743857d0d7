//! Built-in asset table
//!
//! Every build function here is pure: the output depends only on the
//! instance id and the merged config.

use crate::sim::{
    AssetBehavior, Axis, DexelObject, Direction, Plane, RgpXyObject, SimObjectDefinition,
    SphereObject, Twirl8Object, TwirlObject, TwirlingAxisObject,
};
use super::config::*;
use super::registry::{AssetBuild, AssetDefinition, AssetError};

pub(super) fn definitions() -> Vec<AssetDefinition> {
    vec![
        AssetDefinition {
            id: "sphere",
            label: "Sphere",
            defaults: AssetConfig::Sphere(SphereConfig {
                position: [0.0, 0.0, 0.0],
                radius: 0.5,
                color: [240, 200, 80],
                opacity: 1.0,
            }),
            build: build_sphere,
        },
        AssetDefinition {
            id: "twirl",
            label: "Twirl",
            defaults: AssetConfig::Twirl(TwirlConfig {
                position: [0.0, 0.0, 0.0],
                radius: 2.0,
                speed: 1.0,
                direction: Direction::CounterClockwise,
                plane: Plane::Xy,
                color: [120, 200, 255],
                opacity: 0.9,
            }),
            build: build_twirl,
        },
        AssetDefinition {
            id: "twirling-axis",
            label: "Twirling Axis",
            defaults: AssetConfig::Axis(AxisConfig {
                position: [0.0, 0.0, 0.0],
                axis: Axis::Y,
                length: 2.0,
                thickness: 0.05,
                speed: 0.75,
                direction: Direction::CounterClockwise,
                color: Axis::Y.color(),
                opacity: 1.0,
            }),
            build: build_twirling_axis,
        },
        AssetDefinition {
            id: "axis-triad",
            label: "Axis Triad",
            defaults: AssetConfig::Axis(AxisConfig {
                position: [0.0, 0.0, 0.0],
                axis: Axis::Y,
                length: 1.5,
                thickness: 0.04,
                speed: 0.0,
                direction: Direction::CounterClockwise,
                color: [255, 255, 255],
                opacity: 1.0,
            }),
            build: build_axis_triad,
        },
        AssetDefinition {
            id: "rgp-xy",
            label: "Grid Plane XY",
            defaults: AssetConfig::Grid(GridConfig {
                position: [0.0, 0.0, 0.0],
                size: 10.0,
                divisions: 10,
                color: [90, 90, 100],
                opacity: 0.6,
            }),
            build: build_grid,
        },
        AssetDefinition {
            id: "k1p2",
            label: "K1P2 Blade",
            defaults: AssetConfig::Blade(BladeConfig {
                position: [0.0, 0.0, 0.0],
                size: 2.0,
                width: 0.8,
                segments: 48,
                speed: 0.5,
                direction: Direction::Clockwise,
                plane: Plane::Xy,
                color: [255, 140, 60],
                opacity: 0.85,
                show_spokes: true,
            }),
            build: build_blade,
        },
        AssetDefinition {
            id: "dexel",
            label: "Dexel",
            defaults: AssetConfig::Dexel(DexelConfig {
                position: [0.0, 0.0, 0.0],
                size: 0.2,
                height: 1.0,
                color: [160, 230, 160],
                opacity: 0.8,
                pulse_period: 0.0,
                pulse_min: 1.0,
                pulse_max: 1.0,
            }),
            build: build_dexel,
        },
    ]
}

fn mismatch(asset: &str, expected: &'static str, found: &AssetConfig) -> AssetError {
    AssetError::ConfigMismatch {
        asset: asset.to_string(),
        expected,
        found: found.kind_name(),
    }
}

fn build_sphere(id: &str, config: &AssetConfig) -> Result<AssetBuild, AssetError> {
    let AssetConfig::Sphere(c) = config else {
        return Err(mismatch("sphere", "Sphere", config));
    };
    Ok(AssetBuild {
        objects: vec![SimObjectDefinition::Sphere(SphereObject {
            id: id.to_string(),
            position: c.position,
            radius: c.radius,
            color: c.color,
            opacity: c.opacity,
        })],
        behavior: None,
    })
}

fn build_twirl(id: &str, config: &AssetConfig) -> Result<AssetBuild, AssetError> {
    let AssetConfig::Twirl(c) = config else {
        return Err(mismatch("twirl", "Twirl", config));
    };
    Ok(AssetBuild {
        objects: vec![SimObjectDefinition::Twirl(TwirlObject {
            id: id.to_string(),
            position: c.position,
            radius: c.radius,
            speed: c.speed,
            direction: c.direction,
            plane: c.plane,
            color: c.color,
            opacity: c.opacity,
        })],
        behavior: Some(AssetBehavior::Spin),
    })
}

fn axis_object(id: &str, c: &AxisConfig, axis: Axis, color: [u8; 3]) -> SimObjectDefinition {
    SimObjectDefinition::TwirlingAxis(TwirlingAxisObject {
        id: id.to_string(),
        position: c.position,
        axis,
        length: c.length,
        thickness: c.thickness,
        speed: c.speed,
        direction: c.direction,
        color,
        opacity: c.opacity,
    })
}

fn build_twirling_axis(id: &str, config: &AssetConfig) -> Result<AssetBuild, AssetError> {
    let AssetConfig::Axis(c) = config else {
        return Err(mismatch("twirling-axis", "Axis", config));
    };
    Ok(AssetBuild {
        objects: vec![axis_object(id, c, c.axis, c.color)],
        behavior: Some(AssetBehavior::Spin),
    })
}

/// One object per world axis, colored by axis; `axis` and `color` are ignored.
///
/// Spin is always attached so a speed edited in later takes effect.
fn build_axis_triad(id: &str, config: &AssetConfig) -> Result<AssetBuild, AssetError> {
    let AssetConfig::Axis(c) = config else {
        return Err(mismatch("axis-triad", "Axis", config));
    };
    let objects = Axis::ALL
        .iter()
        .map(|&axis| axis_object(id, c, axis, axis.color()))
        .collect();
    Ok(AssetBuild {
        objects,
        behavior: Some(AssetBehavior::Spin),
    })
}

fn build_grid(id: &str, config: &AssetConfig) -> Result<AssetBuild, AssetError> {
    let AssetConfig::Grid(c) = config else {
        return Err(mismatch("rgp-xy", "Grid", config));
    };
    Ok(AssetBuild {
        objects: vec![SimObjectDefinition::RgpXy(RgpXyObject {
            id: id.to_string(),
            position: c.position,
            size: c.size,
            divisions: c.divisions.max(1),
            color: c.color,
            opacity: c.opacity,
        })],
        behavior: None,
    })
}

fn build_blade(id: &str, config: &AssetConfig) -> Result<AssetBuild, AssetError> {
    let AssetConfig::Blade(c) = config else {
        return Err(mismatch("k1p2", "Blade", config));
    };
    Ok(AssetBuild {
        objects: vec![SimObjectDefinition::Twirl8(Twirl8Object {
            id: id.to_string(),
            position: c.position,
            size: c.size,
            width: c.width,
            segments: c.segments,
            speed: c.speed,
            direction: c.direction,
            plane: c.plane,
            color: c.color,
            opacity: c.opacity,
            show_spokes: c.show_spokes,
        })],
        behavior: Some(AssetBehavior::Spin),
    })
}

fn build_dexel(id: &str, config: &AssetConfig) -> Result<AssetBuild, AssetError> {
    let AssetConfig::Dexel(c) = config else {
        return Err(mismatch("dexel", "Dexel", config));
    };
    let behavior = (c.pulse_period > 0.0).then(|| AssetBehavior::Pulse {
        period: c.pulse_period,
        min: c.pulse_min,
        max: c.pulse_max,
    });
    Ok(AssetBuild {
        objects: vec![SimObjectDefinition::Dexel(DexelObject {
            id: id.to_string(),
            position: c.position,
            size: c.size,
            height: c.height,
            color: c.color,
            opacity: c.opacity,
        })],
        behavior,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_triad_covers_every_axis() {
        let defs = definitions();
        let triad = defs.iter().find(|d| d.id == "axis-triad").unwrap();
        let build = triad.instantiate("axes", &AssetOverrides::None).unwrap();
        let axes: Vec<Axis> = build
            .objects
            .iter()
            .filter_map(|o| match o {
                SimObjectDefinition::TwirlingAxis(a) => Some(a.axis),
                _ => None,
            })
            .collect();
        assert_eq!(axes, Axis::ALL.to_vec());
        // Default speed is zero but the spin binding is still there
        assert_eq!(build.behavior, Some(AssetBehavior::Spin));
    }

    #[test]
    fn test_dexel_pulse_only_with_period() {
        let defs = definitions();
        let dexel = defs.iter().find(|d| d.id == "dexel").unwrap();
        let still = dexel.instantiate("d", &AssetOverrides::None).unwrap();
        assert!(still.behavior.is_none());

        let pulsing = dexel
            .instantiate("d", &AssetOverrides::Dexel(DexelOverrides {
                pulse_period: Some(2.0),
                pulse_min: Some(0.5),
                pulse_max: Some(1.5),
                ..Default::default()
            }))
            .unwrap();
        assert_eq!(
            pulsing.behavior,
            Some(AssetBehavior::Pulse { period: 2.0, min: 0.5, max: 1.5 })
        );
    }

    #[test]
    fn test_build_rejects_foreign_config() {
        let config = AssetConfig::Sphere(SphereConfig {
            position: [0.0; 3],
            radius: 1.0,
            color: [0, 0, 0],
            opacity: 1.0,
        });
        assert!(build_grid("g", &config).is_err());
    }
}
