//! Application state
//!
//! Owns the built segments, which one is showing, per-object runtime state
//! and the fixed-step simulation clock. The properties panel edits the
//! active segment through [`SceneFacade`].

use crate::asset::AssetRegistry;
use crate::config::ViewerConfig;
use crate::segment::{
    build_all_segments, builtin_blueprints, in_subtree, SegmentBlueprint, SegmentError,
    SimulationSegmentDefinition,
};
use crate::sim::{ObjectState, SimObjectDefinition, Tick};
use crate::ui::properties::{apply_edit, EditError, ObjectEdit};
use crate::ui::{PanelAction, SceneFacade};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Segment(#[from] SegmentError),
    #[cfg(not(target_arch = "wasm32"))]
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),
    #[error("no segments to show")]
    NoSegments,
}

pub struct AppState {
    pub registry: AssetRegistry,
    segments: Vec<SimulationSegmentDefinition>,
    active: usize,
    /// Parallel to the active segment's objects
    states: Vec<ObjectState>,
    selected: Option<usize>,

    tick_dt: f32,
    max_ticks_per_frame: u32,
    tick_index: u64,
    /// Unsimulated time carried between frames
    tick_accumulator: f64,
}

impl AppState {
    pub fn new(
        registry: AssetRegistry,
        segments: Vec<SimulationSegmentDefinition>,
        config: &ViewerConfig,
    ) -> Result<Self, AppError> {
        if segments.is_empty() {
            return Err(AppError::NoSegments);
        }
        let mut app = Self {
            registry,
            segments,
            active: 0,
            states: Vec::new(),
            selected: None,
            tick_dt: config.tick_dt(),
            max_ticks_per_frame: config.max_ticks_per_frame.max(1),
            tick_index: 0,
            tick_accumulator: 0.0,
        };

        let initial = match config.initial_segment.as_deref() {
            Some(id) => app.segment_index(id).unwrap_or_else(|| {
                log::warn!("unknown initial segment '{}', showing '{}'", id, app.segments[0].id);
                0
            }),
            None => 0,
        };
        app.select_segment(initial);
        Ok(app)
    }

    /// Built-in catalog plus any blueprints found in the configured directory
    pub fn load(config: &ViewerConfig) -> Result<Self, AppError> {
        let registry = AssetRegistry::builtin();
        let ids: Vec<&str> = registry.list().iter().map(|d| d.id).collect();
        log::info!("assets: {}", ids.join(", "));
        let blueprints = collect_blueprints(config)?;
        let segments = build_all_segments(&registry, &blueprints)?;
        log::info!("built {} segment(s)", segments.len());
        Self::new(registry, segments, config)
    }

    pub fn segments(&self) -> &[SimulationSegmentDefinition] {
        &self.segments
    }

    pub fn segment_index(&self, id: &str) -> Option<usize> {
        self.segments.iter().position(|s| s.id == id)
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_segment(&self) -> &SimulationSegmentDefinition {
        &self.segments[self.active]
    }

    pub fn states(&self) -> &[ObjectState] {
        &self.states
    }

    pub fn tick_index(&self) -> u64 {
        self.tick_index
    }

    /// Switch segments. Runtime state and selection start fresh.
    pub fn select_segment(&mut self, index: usize) -> bool {
        let Some(segment) = self.segments.get(index) else {
            log::warn!("no segment at index {}", index);
            return false;
        };
        self.active = index;
        self.states = vec![ObjectState::default(); segment.objects.len()];
        self.selected = None;
        self.tick_index = 0;
        self.tick_accumulator = 0.0;
        log::info!("showing segment '{}' ({} objects)", segment.id, segment.objects.len());
        true
    }

    /// Run as many fixed ticks as `frame_dt` covers. Returns ticks run.
    pub fn advance(&mut self, frame_dt: f64) -> u32 {
        let step = self.tick_dt as f64;
        self.tick_accumulator += frame_dt.max(0.0);

        let due = (self.tick_accumulator / step).floor() as u64;
        let ticks = due.min(self.max_ticks_per_frame as u64) as u32;
        if due > ticks as u64 {
            // Too far behind (tab backgrounded, debugger); drop the backlog
            log::debug!("dropping {} simulation ticks", due - ticks as u64);
            self.tick_accumulator = 0.0;
        } else {
            self.tick_accumulator -= ticks as f64 * step;
        }

        for _ in 0..ticks {
            self.step();
        }
        ticks
    }

    /// One-line description of a panel action for the log window. Call
    /// before the action is dispatched.
    pub fn describe(&self, action: &PanelAction) -> Option<(&'static str, String)> {
        match action {
            PanelAction::Select(_) => None,
            PanelAction::Edit(index, edit) => {
                let id = self.objects().get(*index).map_or("?", |o| o.id());
                Some(("edit", format!("{} {:?} = {:?}", id, edit.field, edit.value)))
            }
            PanelAction::Remove(instance) => {
                let segment = self.active_segment();
                let asset = segment
                    .asset_for(instance)
                    .and_then(|a| self.registry.get(&a.asset_id).ok())
                    .map_or("unknown asset", |d| d.label);
                let objects = segment.objects_for(instance).count();
                Some(("scene", format!("removed '{}' ({}, {} object(s))", instance, asset, objects)))
            }
        }
    }

    fn step(&mut self) {
        let tick = Tick { index: self.tick_index, dt: self.tick_dt };
        let segment = &self.segments[self.active];
        for binding in &segment.behaviors {
            for (object, state) in segment.objects.iter().zip(self.states.iter_mut()) {
                if object.id() == binding.instance_id {
                    binding.behavior.apply(object, state, tick);
                }
            }
        }
        self.tick_index += 1;
    }
}

fn collect_blueprints(config: &ViewerConfig) -> Result<Vec<SegmentBlueprint>, AppError> {
    let mut blueprints = builtin_blueprints();
    blueprints.extend(extra_blueprints(config)?);
    Ok(blueprints)
}

#[cfg(not(target_arch = "wasm32"))]
fn extra_blueprints(config: &ViewerConfig) -> Result<Vec<SegmentBlueprint>, AppError> {
    match &config.segments_dir {
        Some(dir) => Ok(crate::config::load_blueprint_dir(dir)?),
        None => Ok(Vec::new()),
    }
}

#[cfg(target_arch = "wasm32")]
fn extra_blueprints(_config: &ViewerConfig) -> Result<Vec<SegmentBlueprint>, AppError> {
    Ok(Vec::new())
}

impl SceneFacade for AppState {
    fn objects(&self) -> &[SimObjectDefinition] {
        &self.segments[self.active].objects
    }

    fn selected(&self) -> Option<usize> {
        self.selected
    }

    fn select(&mut self, index: Option<usize>) {
        self.selected = index.filter(|&i| i < self.states.len());
    }

    fn update_object(&mut self, index: usize, edit: ObjectEdit) -> Result<(), EditError> {
        let object = self.segments[self.active]
            .objects
            .get_mut(index)
            .ok_or(EditError::NoSuchObject(index))?;
        apply_edit(object, edit)
    }

    fn remove_instance(&mut self, instance_id: &str) -> usize {
        let segment = &mut self.segments[self.active];
        let keep: Vec<bool> = segment.objects.iter().map(|o| !in_subtree(instance_id, o.id())).collect();
        let mut flags = keep.iter();
        self.states.retain(|_| flags.next().copied().unwrap_or(true));

        // Selection follows its object to the new index, or clears if it went
        self.selected = self
            .selected
            .filter(|&i| keep.get(i).copied().unwrap_or(false))
            .map(|i| keep[..i].iter().filter(|k| **k).count());
        segment.remove_asset(instance_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::AssetInstance;
    use crate::ui::properties::{Field, FieldValue};

    fn config(tick_rate: u32, max_ticks: u32) -> ViewerConfig {
        ViewerConfig { tick_rate, max_ticks_per_frame: max_ticks, ..Default::default() }
    }

    fn app() -> AppState {
        AppState::load(&config(10, 8)).unwrap()
    }

    #[test]
    fn test_load_builds_builtin_catalog() {
        let app = app();
        assert_eq!(app.segments().len(), builtin_blueprints().len());
        assert_eq!(app.active_index(), 0);
        assert_eq!(app.states().len(), app.objects().len());
    }

    #[test]
    fn test_initial_segment_by_id() {
        let cfg = ViewerConfig { initial_segment: Some("twirl-orbit".into()), ..Default::default() };
        let app = AppState::load(&cfg).unwrap();
        assert_eq!(app.active_segment().id, "twirl-orbit");

        let cfg = ViewerConfig { initial_segment: Some("nope".into()), ..Default::default() };
        assert_eq!(AppState::load(&cfg).unwrap().active_index(), 0);
    }

    #[test]
    fn test_no_segments_is_an_error() {
        let result = AppState::new(AssetRegistry::builtin(), Vec::new(), &ViewerConfig::default());
        assert!(matches!(result, Err(AppError::NoSegments)));
    }

    #[test]
    fn test_accumulator_carries_remainder() {
        let mut app = app();
        assert_eq!(app.advance(0.25), 2);
        assert_eq!(app.advance(0.06), 1);
        assert_eq!(app.advance(0.0), 0);
        assert_eq!(app.tick_index(), 3);
    }

    #[test]
    fn test_backlog_is_capped_and_dropped() {
        let mut app = AppState::load(&config(10, 4)).unwrap();
        assert_eq!(app.advance(100.0), 4);
        assert_eq!(app.advance(0.05), 0);
    }

    #[test]
    fn test_spin_only_touches_owning_instance() {
        let mut app = app();
        let index = app.segment_index("k1p2-blade").unwrap();
        app.select_segment(index);
        app.advance(0.5);

        let objects = app.objects();
        let blade = objects.iter().position(|o| o.id() == "blade").unwrap();
        let hub = objects.iter().position(|o| o.id() == "blade/hub").unwrap();
        assert!(app.states()[blade].angle > 0.0);
        assert_eq!(app.states()[hub], ObjectState::default());
    }

    #[test]
    fn test_triad_speed_edit_starts_spin() {
        let mut app = app();
        let index = app.segment_index("k1p2-blade").unwrap();
        app.select_segment(index);
        let axes: Vec<usize> = (0..app.objects().len()).filter(|&i| app.objects()[i].id() == "axes").collect();
        assert_eq!(axes.len(), 3);

        app.advance(1.0);
        assert!(axes.iter().all(|&i| app.states()[i].angle == 0.0));

        let edit = ObjectEdit { field: Field::Speed, value: FieldValue::Number(3.0) };
        app.update_object(axes[0], edit).unwrap();
        app.advance(1.0);
        assert!(app.states()[axes[0]].angle > 0.0);
        assert_eq!(app.states()[axes[1]].angle, 0.0);
    }

    #[test]
    fn test_segment_switch_resets_state() {
        let mut app = app();
        app.advance(1.0);
        app.select(Some(0));
        assert!(app.select_segment(1));
        assert_eq!(app.tick_index(), 0);
        assert_eq!(app.selected(), None);
        assert!(app.states().iter().all(|s| *s == ObjectState::default()));
        assert!(!app.select_segment(99));
        assert_eq!(app.active_index(), 1);
    }

    #[test]
    fn test_remove_keeps_states_aligned() {
        let blueprint = SegmentBlueprint::new("s", "S")
            .with_asset(AssetInstance::new("sphere", "a"))
            .with_asset(AssetInstance::new("twirl", "t").with_child(AssetInstance::new("sphere", "bead")))
            .with_asset(AssetInstance::new("twirl", "u"));
        let registry = AssetRegistry::builtin();
        let segments = build_all_segments(&registry, &[blueprint]).unwrap();
        let mut app = AppState::new(registry, segments, &config(10, 8)).unwrap();
        app.advance(0.3);
        let u_state = app.states()[3];
        assert!(u_state.angle > 0.0);

        app.select(Some(3));
        assert_eq!(app.remove_instance("t"), 2);
        assert_eq!(app.objects().len(), 2);
        assert_eq!(app.states().len(), 2);
        assert_eq!(app.states()[1], u_state);
        assert_eq!(app.selected(), Some(1));

        app.select(Some(0));
        app.remove_instance("a");
        assert_eq!(app.selected(), None);
    }

    #[test]
    fn test_remove_description_names_asset() {
        let mut app = app();
        let index = app.segment_index("k1p2-blade").unwrap();
        app.select_segment(index);
        let label = app.registry.get("axis-triad").unwrap().label;

        let (category, message) = app.describe(&PanelAction::Remove("axes".to_string())).unwrap();
        assert_eq!(category, "scene");
        assert_eq!(message, format!("removed 'axes' ({}, 3 object(s))", label));

        let (_, unknown) = app.describe(&PanelAction::Remove("ghost".to_string())).unwrap();
        assert_eq!(unknown, "removed 'ghost' (unknown asset, 0 object(s))");
        assert!(app.describe(&PanelAction::Select(Some(0))).is_none());
    }

    #[test]
    fn test_update_object_bounds_checked() {
        let mut app = app();
        let edit = ObjectEdit { field: Field::Opacity, value: FieldValue::Number(0.5) };
        assert_eq!(app.update_object(9999, edit), Err(EditError::NoSuchObject(9999)));
        assert_eq!(app.update_object(0, edit), Ok(()));
        assert_eq!(app.objects()[0].opacity(), 0.5);
    }

    #[test]
    fn test_select_ignores_out_of_range() {
        let mut app = app();
        app.select(Some(9999));
        assert_eq!(app.selected(), None);
    }

    #[test]
    fn test_extra_blueprints_from_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("extra.ron"),
            r#"[(id: "extra", name: "Extra", assets: [(asset: "sphere", id: "s")])]"#,
        )
        .unwrap();
        let cfg = ViewerConfig { segments_dir: Some(dir.path().to_path_buf()), ..Default::default() };
        let app = AppState::load(&cfg).unwrap();
        assert_eq!(app.segments().len(), builtin_blueprints().len() + 1);
        assert!(app.segment_index("extra").is_some());
    }
}
