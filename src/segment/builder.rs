//! Segment Builder
//!
//! Expands blueprints into runtime segments. A build either succeeds for the
//! whole blueprint or fails; there is no partial segment.

use std::collections::HashSet;

use crate::asset::{AssetError, AssetRegistry};
use crate::sim::{AssetBehavior, SimObjectDefinition};
use super::blueprint::{namespaced_id, AssetInstance, GhostMarker, SegmentBlueprint, ID_SEPARATOR};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SegmentError {
    #[error("segment '{segment}': {source}")]
    Asset {
        segment: String,
        #[source]
        source: AssetError,
    },
    #[error("segment '{segment}': instance id '{instance}' is used twice")]
    DuplicateInstance { segment: String, instance: String },
    #[error("segment '{segment}': asset '{asset}' has an empty instance id")]
    EmptyInstanceId { segment: String, asset: String },
    #[error("segment '{segment}': instance id '{instance}' contains the '/' separator")]
    InvalidInstanceId { segment: String, instance: String },
}

/// Which asset produced which instance id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentRuntimeAsset {
    pub asset_id: String,
    pub instance_id: String,
}

/// Per-tick behavior bound to an instance id
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceBehavior {
    pub instance_id: String,
    pub behavior: AssetBehavior,
}

/// A resolved blueprint
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationSegmentDefinition {
    pub id: String,
    pub name: String,
    pub objects: Vec<SimObjectDefinition>,
    pub assets: Vec<SegmentRuntimeAsset>,
    pub ghosts: Vec<GhostMarker>,
    pub behaviors: Vec<InstanceBehavior>,
}

impl SimulationSegmentDefinition {
    /// Objects produced by one instance
    pub fn objects_for<'a>(&'a self, instance_id: &'a str) -> impl Iterator<Item = &'a SimObjectDefinition> + 'a {
        self.objects.iter().filter(move |o| o.id() == instance_id)
    }

    pub fn asset_for(&self, instance_id: &str) -> Option<&SegmentRuntimeAsset> {
        self.assets.iter().find(|a| a.instance_id == instance_id)
    }

    /// Remove an instance and its nested children, with their objects and
    /// behaviors. Returns the number of objects removed.
    pub fn remove_asset(&mut self, instance_id: &str) -> usize {
        let doomed = |id: &str| in_subtree(instance_id, id);

        let before = self.objects.len();
        self.objects.retain(|o| !doomed(o.id()));
        self.assets.retain(|a| !doomed(&a.instance_id));
        self.behaviors.retain(|b| !doomed(&b.instance_id));
        before - self.objects.len()
    }
}

/// Whether `id` is `root` itself or one of its namespaced descendants
pub fn in_subtree(root: &str, id: &str) -> bool {
    id.strip_prefix(root)
        .map_or(false, |rest| rest.is_empty() || rest.starts_with('/'))
}

struct SegmentAccumulator<'a> {
    registry: &'a AssetRegistry,
    segment_id: &'a str,
    seen: HashSet<String>,
    segment: SimulationSegmentDefinition,
}

impl SegmentAccumulator<'_> {
    fn add(&mut self, instance: &AssetInstance, parent: Option<&str>) -> Result<(), SegmentError> {
        if instance.id.is_empty() {
            return Err(SegmentError::EmptyInstanceId {
                segment: self.segment_id.to_string(),
                asset: instance.asset.clone(),
            });
        }
        // A separator in a local id would collide with a nested child's id
        if instance.id.contains(ID_SEPARATOR) {
            return Err(SegmentError::InvalidInstanceId {
                segment: self.segment_id.to_string(),
                instance: instance.id.clone(),
            });
        }

        let instance_id = namespaced_id(parent, &instance.id);
        if !self.seen.insert(instance_id.clone()) {
            return Err(SegmentError::DuplicateInstance {
                segment: self.segment_id.to_string(),
                instance: instance_id,
            });
        }

        let build = self
            .registry
            .instantiate(&instance_id, &instance.asset, &instance.config)
            .map_err(|source| SegmentError::Asset {
                segment: self.segment_id.to_string(),
                source,
            })?;

        self.segment.objects.extend(build.objects);
        self.segment.assets.push(SegmentRuntimeAsset {
            asset_id: instance.asset.clone(),
            instance_id: instance_id.clone(),
        });
        if let Some(behavior) = build.behavior {
            self.segment.behaviors.push(InstanceBehavior {
                instance_id: instance_id.clone(),
                behavior,
            });
        }

        for child in &instance.children {
            self.add(child, Some(&instance_id))?;
        }
        Ok(())
    }
}

/// Build one blueprint
pub fn build_segment(
    registry: &AssetRegistry,
    blueprint: &SegmentBlueprint,
) -> Result<SimulationSegmentDefinition, SegmentError> {
    let mut acc = SegmentAccumulator {
        registry,
        segment_id: &blueprint.id,
        seen: HashSet::new(),
        segment: SimulationSegmentDefinition {
            id: blueprint.id.clone(),
            name: blueprint.name.clone(),
            objects: Vec::new(),
            assets: Vec::new(),
            ghosts: blueprint.ghosts.clone(),
            behaviors: Vec::new(),
        },
    };

    for instance in &blueprint.assets {
        acc.add(instance, None)?;
    }
    Ok(acc.segment)
}

/// Build every blueprint, one segment each, in order
pub fn build_all_segments(
    registry: &AssetRegistry,
    blueprints: &[SegmentBlueprint],
) -> Result<Vec<SimulationSegmentDefinition>, SegmentError> {
    blueprints.iter().map(|bp| build_segment(registry, bp)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::AssetOverrides;
    use crate::segment::builtin_blueprints;

    fn objects_per_instance(registry: &AssetRegistry, instance: &AssetInstance) -> usize {
        let own = registry
            .instantiate("count", &instance.asset, &instance.config)
            .unwrap()
            .objects
            .len();
        own + instance
            .children
            .iter()
            .map(|c| objects_per_instance(registry, c))
            .sum::<usize>()
    }

    #[test]
    fn test_one_segment_per_blueprint_with_matching_counts() {
        let registry = AssetRegistry::builtin();
        let blueprints = builtin_blueprints();
        let segments = build_all_segments(&registry, &blueprints).unwrap();
        assert_eq!(segments.len(), blueprints.len());

        for (segment, blueprint) in segments.iter().zip(&blueprints) {
            assert_eq!(segment.id, blueprint.id);
            let expected_objects: usize = blueprint
                .assets
                .iter()
                .map(|i| objects_per_instance(&registry, i))
                .sum();
            assert_eq!(segment.objects.len(), expected_objects);
            assert_eq!(segment.assets.len(), blueprint.instance_count());
            assert_eq!(segment.ghosts, blueprint.ghosts);
        }
    }

    #[test]
    fn test_children_namespaced_under_parent() {
        let registry = AssetRegistry::builtin();
        let blueprint = SegmentBlueprint::new("ns", "Namespacing")
            .with_asset(AssetInstance::new("twirl", "left").with_child(AssetInstance::new("sphere", "bead")))
            .with_asset(AssetInstance::new("twirl", "right").with_child(AssetInstance::new("sphere", "bead")));
        let segment = build_segment(&registry, &blueprint).unwrap();

        let ids: Vec<&str> = segment.assets.iter().map(|a| a.instance_id.as_str()).collect();
        assert_eq!(ids, vec!["left", "left/bead", "right", "right/bead"]);

        let unique: HashSet<&str> = ids.iter().copied().collect();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn test_builtin_instance_ids_unique() {
        let registry = AssetRegistry::builtin();
        for segment in build_all_segments(&registry, &builtin_blueprints()).unwrap() {
            let unique: HashSet<&str> = segment.assets.iter().map(|a| a.instance_id.as_str()).collect();
            assert_eq!(unique.len(), segment.assets.len(), "{}", segment.id);
        }
    }

    #[test]
    fn test_unregistered_asset_aborts_segment() {
        let registry = AssetRegistry::builtin();
        let blueprint = SegmentBlueprint::new("bad", "Bad")
            .with_asset(AssetInstance::new("sphere", "ok"))
            .with_asset(AssetInstance::new("sphere", "parent").with_child(AssetInstance::new("teapot", "t")));
        let err = build_segment(&registry, &blueprint).unwrap_err();
        assert_eq!(
            err,
            SegmentError::Asset {
                segment: "bad".to_string(),
                source: AssetError::NotRegistered("teapot".to_string()),
            }
        );
    }

    #[test]
    fn test_one_bad_blueprint_fails_the_whole_build() {
        let registry = AssetRegistry::builtin();
        let mut blueprints = builtin_blueprints();
        blueprints.push(SegmentBlueprint::new("bad", "Bad").with_asset(AssetInstance::new("nope", "x")));
        assert!(build_all_segments(&registry, &blueprints).is_err());
    }

    #[test]
    fn test_duplicate_sibling_ids_rejected() {
        let registry = AssetRegistry::builtin();
        let blueprint = SegmentBlueprint::new("dup", "Dup")
            .with_asset(AssetInstance::new("sphere", "a"))
            .with_asset(AssetInstance::new("dexel", "a"));
        assert!(matches!(
            build_segment(&registry, &blueprint),
            Err(SegmentError::DuplicateInstance { .. })
        ));
    }

    #[test]
    fn test_empty_instance_id_rejected() {
        let registry = AssetRegistry::builtin();
        let blueprint = SegmentBlueprint::new("empty", "Empty").with_asset(AssetInstance::new("sphere", ""));
        assert!(matches!(
            build_segment(&registry, &blueprint),
            Err(SegmentError::EmptyInstanceId { .. })
        ));
    }

    #[test]
    fn test_separator_in_local_id_rejected() {
        let registry = AssetRegistry::builtin();
        let blueprint = SegmentBlueprint::new("sep", "Separator")
            .with_asset(AssetInstance::new("twirl", "t").with_child(AssetInstance::new("sphere", "bead")))
            .with_asset(AssetInstance::new("sphere", "t/bead"));
        assert_eq!(
            build_segment(&registry, &blueprint),
            Err(SegmentError::InvalidInstanceId {
                segment: "sep".to_string(),
                instance: "t/bead".to_string(),
            })
        );

        let nested = SegmentBlueprint::new("sep", "Separator")
            .with_asset(AssetInstance::new("twirl", "t").with_child(AssetInstance::new("sphere", "a/b")));
        assert!(matches!(
            build_segment(&registry, &nested),
            Err(SegmentError::InvalidInstanceId { .. })
        ));
    }

    #[test]
    fn test_remove_asset_takes_children_along() {
        let registry = AssetRegistry::builtin();
        let blueprint = SegmentBlueprint::new("rm", "Remove")
            .with_asset(AssetInstance::new("axis-triad", "axes"))
            .with_asset(AssetInstance::new("twirl", "t").with_child(AssetInstance::new("sphere", "bead")))
            .with_asset(AssetInstance::new("twirl", "tt"));
        let mut segment = build_segment(&registry, &blueprint).unwrap();
        assert_eq!(segment.objects_for("axes").count(), 3);

        let removed = segment.remove_asset("t");
        assert_eq!(removed, 2);
        assert!(segment.asset_for("t").is_none());
        assert!(segment.asset_for("t/bead").is_none());
        // Prefix match must respect the separator
        assert!(segment.asset_for("tt").is_some());
        assert!(segment.behaviors.iter().all(|b| b.instance_id != "t"));
    }

    #[test]
    fn test_behaviors_follow_instances() {
        let registry = AssetRegistry::builtin();
        let blueprint = SegmentBlueprint::new("b", "B")
            .with_asset(AssetInstance::new("sphere", "still"))
            .with_asset(AssetInstance::new("k1p2", "blade").with_config(AssetOverrides::None));
        let segment = build_segment(&registry, &blueprint).unwrap();
        assert_eq!(segment.behaviors.len(), 1);
        assert_eq!(segment.behaviors[0].instance_id, "blade");
    }
}
