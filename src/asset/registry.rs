//! Asset Registry
//!
//! Fixed table of asset definitions, assembled once at startup. Resolves an
//! asset id plus caller overrides into scene objects.

use crate::sim::{AssetBehavior, SimObjectDefinition};
use super::config::{AssetConfig, AssetOverrides};
use super::builtin;

/// Error type for asset operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AssetError {
    /// No definition with this id
    #[error("asset '{0}' is not registered")]
    NotRegistered(String),
    /// Overrides (or a build function's input) of the wrong config kind
    #[error("asset '{asset}' expects {expected} config, got {found}")]
    ConfigMismatch {
        asset: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// Output of an asset build function
#[derive(Debug, Clone, PartialEq)]
pub struct AssetBuild {
    /// Scene objects, all carrying the instance id
    pub objects: Vec<SimObjectDefinition>,
    /// Applied every tick to each of `objects`
    pub behavior: Option<AssetBehavior>,
}

/// Pure build function: `(instance_id, merged config) -> objects`
pub type BuildFn = fn(&str, &AssetConfig) -> Result<AssetBuild, AssetError>;

/// A reusable, parameterized scene-object template
#[derive(Debug, Clone)]
pub struct AssetDefinition {
    pub id: &'static str,
    pub label: &'static str,
    pub defaults: AssetConfig,
    pub build: BuildFn,
}

impl AssetDefinition {
    /// Merge overrides over the defaults and run the build function
    pub fn instantiate(&self, instance_id: &str, overrides: &AssetOverrides) -> Result<AssetBuild, AssetError> {
        let config = self.defaults.merge(self.id, overrides)?;
        (self.build)(instance_id, &config)
    }
}

/// Registry of all known asset definitions
#[derive(Debug, Clone)]
pub struct AssetRegistry {
    definitions: Vec<AssetDefinition>,
}

impl AssetRegistry {
    /// Registry with the built-in asset table
    pub fn builtin() -> Self {
        Self::from_definitions(builtin::definitions())
    }

    pub fn from_definitions(definitions: Vec<AssetDefinition>) -> Self {
        Self { definitions }
    }

    /// All registered definitions, in registration order
    pub fn list(&self) -> &[AssetDefinition] {
        &self.definitions
    }

    /// Look up a definition by id
    pub fn get(&self, id: &str) -> Result<&AssetDefinition, AssetError> {
        self.definitions
            .iter()
            .find(|d| d.id == id)
            .ok_or_else(|| AssetError::NotRegistered(id.to_string()))
    }

    #[cfg(test)]
    pub fn contains(&self, id: &str) -> bool {
        self.definitions.iter().any(|d| d.id == id)
    }

    /// Resolve one asset instance into scene objects
    pub fn instantiate(
        &self,
        instance_id: &str,
        asset_id: &str,
        overrides: &AssetOverrides,
    ) -> Result<AssetBuild, AssetError> {
        self.get(asset_id)?.instantiate(instance_id, overrides)
    }
}

impl Default for AssetRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::config::*;
    use crate::sim::SimObjectDefinition;

    #[test]
    fn test_list_has_every_builtin() {
        let registry = AssetRegistry::builtin();
        let ids: Vec<&str> = registry.list().iter().map(|d| d.id).collect();
        for expected in ["sphere", "twirl", "twirling-axis", "axis-triad", "rgp-xy", "k1p2", "dexel"] {
            assert!(ids.contains(&expected), "missing {}", expected);
        }
    }

    #[test]
    fn test_get_unknown_fails() {
        let registry = AssetRegistry::builtin();
        let err = registry.get("teapot").unwrap_err();
        assert_eq!(err, AssetError::NotRegistered("teapot".to_string()));
        assert!(err.to_string().contains("not registered"));
    }

    #[test]
    fn test_instantiate_unknown_fails() {
        let registry = AssetRegistry::builtin();
        assert!(registry.instantiate("a", "teapot", &AssetOverrides::None).is_err());
    }

    #[test]
    fn test_every_asset_builds_objects_with_instance_id() {
        let registry = AssetRegistry::builtin();
        for def in registry.list() {
            let build = registry.instantiate("inst-7", def.id, &AssetOverrides::None).unwrap();
            assert!(!build.objects.is_empty(), "{} built nothing", def.id);
            for obj in &build.objects {
                assert_eq!(obj.id(), "inst-7");
            }
        }
    }

    #[test]
    fn test_instantiate_is_deterministic() {
        let registry = AssetRegistry::builtin();
        for def in registry.list() {
            let a = registry.instantiate("x", def.id, &AssetOverrides::None).unwrap();
            let b = registry.instantiate("x", def.id, &AssetOverrides::None).unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_unset_fields_keep_registered_defaults() {
        let registry = AssetRegistry::builtin();
        let def = registry.get("sphere").unwrap();
        let AssetConfig::Sphere(defaults) = &def.defaults else {
            panic!("sphere defaults should be a sphere config");
        };

        let build = registry
            .instantiate("s", "sphere", &AssetOverrides::Sphere(SphereOverrides {
                radius: Some(4.0),
                ..Default::default()
            }))
            .unwrap();
        let SimObjectDefinition::Sphere(obj) = &build.objects[0] else {
            panic!("expected sphere");
        };
        assert_eq!(obj.radius, 4.0);
        assert_eq!(obj.position, defaults.position);
        assert_eq!(obj.color, defaults.color);
        assert_eq!(obj.opacity, defaults.opacity);
    }

    #[test]
    fn test_dexel_defaults_survive_partial_override() {
        let registry = AssetRegistry::builtin();
        let AssetConfig::Dexel(defaults) = &registry.get("dexel").unwrap().defaults else {
            panic!("dexel defaults should be a dexel config");
        };
        let build = registry
            .instantiate("d", "dexel", &AssetOverrides::Dexel(DexelOverrides {
                color: Some([1, 1, 1]),
                ..Default::default()
            }))
            .unwrap();
        let SimObjectDefinition::Dexel(obj) = &build.objects[0] else {
            panic!("expected dexel");
        };
        assert_eq!(obj.color, [1, 1, 1]);
        assert_eq!(obj.size, defaults.size);
        assert_eq!(obj.height, defaults.height);
        assert_eq!(obj.position, defaults.position);
    }

    #[test]
    fn test_k1p2_derives_size_and_width() {
        let registry = AssetRegistry::builtin();
        let build = registry
            .instantiate("blade", "k1p2", &AssetOverrides::Blade(BladeOverrides {
                width: Some(1.75),
                ..Default::default()
            }))
            .unwrap();
        let SimObjectDefinition::Twirl8(obj) = &build.objects[0] else {
            panic!("expected twirl8");
        };
        assert_eq!(obj.size, 1.75);
        assert_eq!(obj.width, 1.75);
    }

    #[test]
    fn test_wrong_override_kind_is_rejected() {
        let registry = AssetRegistry::builtin();
        let err = registry
            .instantiate("x", "sphere", &AssetOverrides::Grid(GridOverrides::default()))
            .unwrap_err();
        assert!(matches!(err, AssetError::ConfigMismatch { .. }));
    }
}
