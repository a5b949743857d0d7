//! Properties panel
//!
//! Lists the active segment's objects and shows editable fields for the
//! selected one. The panel never mutates objects itself: every change goes
//! out as a [`PanelAction`] through [`SceneFacade`], which is where raw input
//! gets clamped.

use macroquad::prelude::*;

use crate::asset::{MIN_BLADE_SEGMENTS, MIN_BLADE_SIZE, MIN_BLADE_WIDTH};
use crate::sim::{Axis, Direction, Plane, SimObjectDefinition, SimObjectKind};
use super::theme::*;
use super::widgets::{draw_label, draw_titled_panel, slider, stepper, text_button};
use super::{Rect, UiContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    PositionX,
    PositionY,
    PositionZ,
    Radius,
    Speed,
    Direction,
    Plane,
    Axis,
    Length,
    Thickness,
    Size,
    Width,
    Segments,
    Divisions,
    Height,
    Opacity,
    ShowSpokes,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    Float { min: f32, max: f32 },
    Integer { min: u32, max: u32 },
    Direction,
    Plane,
    Axis,
    Toggle,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub field: Field,
    pub label: &'static str,
    pub kind: FieldKind,
}

const fn float(field: Field, label: &'static str, min: f32, max: f32) -> FieldSpec {
    FieldSpec { field, label, kind: FieldKind::Float { min, max } }
}

const fn integer(field: Field, label: &'static str, min: u32, max: u32) -> FieldSpec {
    FieldSpec { field, label, kind: FieldKind::Integer { min, max } }
}

const fn choice(field: Field, label: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec { field, label, kind }
}

const POS_X: FieldSpec = float(Field::PositionX, "X", -20.0, 20.0);
const POS_Y: FieldSpec = float(Field::PositionY, "Y", -20.0, 20.0);
const POS_Z: FieldSpec = float(Field::PositionZ, "Z", -20.0, 20.0);
const OPACITY: FieldSpec = float(Field::Opacity, "Opacity", 0.0, 1.0);
const SPEED: FieldSpec = float(Field::Speed, "Speed", 0.0, 10.0);
const DIRECTION: FieldSpec = choice(Field::Direction, "Direction", FieldKind::Direction);
const PLANE: FieldSpec = choice(Field::Plane, "Plane", FieldKind::Plane);

const SPHERE_FIELDS: &[FieldSpec] = &[POS_X, POS_Y, POS_Z, float(Field::Radius, "Radius", 0.05, 10.0), OPACITY];

const TWIRL_FIELDS: &[FieldSpec] = &[
    POS_X, POS_Y, POS_Z,
    float(Field::Radius, "Radius", 0.1, 10.0),
    SPEED, DIRECTION, PLANE, OPACITY,
];

const AXIS_FIELDS: &[FieldSpec] = &[
    POS_X, POS_Y, POS_Z,
    choice(Field::Axis, "Axis", FieldKind::Axis),
    float(Field::Length, "Length", 0.1, 20.0),
    float(Field::Thickness, "Thickness", 0.01, 1.0),
    SPEED, DIRECTION, OPACITY,
];

const GRID_FIELDS: &[FieldSpec] = &[
    POS_X, POS_Y, POS_Z,
    float(Field::Size, "Size", 0.5, 50.0),
    integer(Field::Divisions, "Divisions", 1, 64),
    OPACITY,
];

const BLADE_FIELDS: &[FieldSpec] = &[
    POS_X, POS_Y, POS_Z,
    float(Field::Size, "Size", MIN_BLADE_SIZE, 10.0),
    float(Field::Width, "Width", MIN_BLADE_WIDTH, 10.0),
    integer(Field::Segments, "Segments", MIN_BLADE_SEGMENTS, 512),
    SPEED, DIRECTION, PLANE, OPACITY,
    choice(Field::ShowSpokes, "Spokes", FieldKind::Toggle),
];

const DEXEL_FIELDS: &[FieldSpec] = &[
    POS_X, POS_Y, POS_Z,
    float(Field::Size, "Size", 0.05, 5.0),
    float(Field::Height, "Height", 0.05, 10.0),
    OPACITY,
];

/// Editable fields for an object kind, in display order
pub fn fields_for(kind: SimObjectKind) -> &'static [FieldSpec] {
    match kind {
        SimObjectKind::Sphere => SPHERE_FIELDS,
        SimObjectKind::Twirl => TWIRL_FIELDS,
        SimObjectKind::TwirlingAxis => AXIS_FIELDS,
        SimObjectKind::RgpXy => GRID_FIELDS,
        SimObjectKind::Twirl8 => BLADE_FIELDS,
        SimObjectKind::Dexel => DEXEL_FIELDS,
    }
}

pub fn spec_for(kind: SimObjectKind, field: Field) -> Option<&'static FieldSpec> {
    fields_for(kind).iter().find(|spec| spec.field == field)
}

/// Clamp raw numeric input into the field's range. NaN maps to the
/// minimum; integer fields round to the nearest whole number.
pub fn clamp(kind: FieldKind, raw: f32) -> f32 {
    match kind {
        FieldKind::Float { min, max } => {
            if raw.is_nan() {
                min
            } else {
                raw.clamp(min, max)
            }
        }
        FieldKind::Integer { min, max } => {
            if raw.is_nan() {
                min as f32
            } else {
                raw.round().clamp(min as f32, max as f32)
            }
        }
        FieldKind::Direction | FieldKind::Plane | FieldKind::Axis | FieldKind::Toggle => raw,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    Number(f32),
    Direction(Direction),
    Plane(Plane),
    Axis(Axis),
    Toggle(bool),
}

impl FieldValue {
    /// Next value for enum and toggle fields; numbers are unchanged
    pub fn cycled(self) -> Self {
        match self {
            FieldValue::Number(n) => FieldValue::Number(n),
            FieldValue::Direction(d) => FieldValue::Direction(d.toggled()),
            FieldValue::Plane(p) => FieldValue::Plane(p.next()),
            FieldValue::Axis(a) => FieldValue::Axis(a.next()),
            FieldValue::Toggle(b) => FieldValue::Toggle(!b),
        }
    }

    pub fn display(&self, kind: FieldKind) -> String {
        match (self, kind) {
            (FieldValue::Number(n), FieldKind::Integer { .. }) => format!("{}", n.round() as i64),
            (FieldValue::Number(n), _) => format!("{:.2}", n),
            (FieldValue::Direction(d), _) => d.label().to_string(),
            (FieldValue::Plane(p), _) => p.label().to_string(),
            (FieldValue::Axis(a), _) => a.label().to_string(),
            (FieldValue::Toggle(b), _) => if *b { "on" } else { "off" }.to_string(),
        }
    }
}

/// One field change on one object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectEdit {
    pub field: Field,
    pub value: FieldValue,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EditError {
    #[error("no object at index {0}")]
    NoSuchObject(usize),
    #[error("{kind:?} objects have no {field:?} field")]
    UnknownField { kind: SimObjectKind, field: Field },
    #[error("value {value:?} does not fit field {field:?}")]
    TypeMismatch { field: Field, value: FieldValue },
}

/// Current value of `field`, if the object has it
pub fn read_field(object: &SimObjectDefinition, field: Field) -> Option<FieldValue> {
    use FieldValue as V;
    use SimObjectDefinition as O;

    let position = object.position();
    match field {
        Field::PositionX => return Some(V::Number(position[0])),
        Field::PositionY => return Some(V::Number(position[1])),
        Field::PositionZ => return Some(V::Number(position[2])),
        Field::Opacity => return Some(V::Number(object.opacity())),
        _ => {}
    }

    match (object, field) {
        (O::Sphere(o), Field::Radius) => Some(V::Number(o.radius)),
        (O::Twirl(o), Field::Radius) => Some(V::Number(o.radius)),
        (O::Twirl(o), Field::Speed) => Some(V::Number(o.speed)),
        (O::Twirl(o), Field::Direction) => Some(V::Direction(o.direction)),
        (O::Twirl(o), Field::Plane) => Some(V::Plane(o.plane)),
        (O::TwirlingAxis(o), Field::Axis) => Some(V::Axis(o.axis)),
        (O::TwirlingAxis(o), Field::Length) => Some(V::Number(o.length)),
        (O::TwirlingAxis(o), Field::Thickness) => Some(V::Number(o.thickness)),
        (O::TwirlingAxis(o), Field::Speed) => Some(V::Number(o.speed)),
        (O::TwirlingAxis(o), Field::Direction) => Some(V::Direction(o.direction)),
        (O::RgpXy(o), Field::Size) => Some(V::Number(o.size)),
        (O::RgpXy(o), Field::Divisions) => Some(V::Number(o.divisions as f32)),
        (O::Twirl8(o), Field::Size) => Some(V::Number(o.size)),
        (O::Twirl8(o), Field::Width) => Some(V::Number(o.width)),
        (O::Twirl8(o), Field::Segments) => Some(V::Number(o.segments as f32)),
        (O::Twirl8(o), Field::Speed) => Some(V::Number(o.speed)),
        (O::Twirl8(o), Field::Direction) => Some(V::Direction(o.direction)),
        (O::Twirl8(o), Field::Plane) => Some(V::Plane(o.plane)),
        (O::Twirl8(o), Field::ShowSpokes) => Some(V::Toggle(o.show_spokes)),
        (O::Dexel(o), Field::Size) => Some(V::Number(o.size)),
        (O::Dexel(o), Field::Height) => Some(V::Number(o.height)),
        _ => None,
    }
}

fn position_mut(object: &mut SimObjectDefinition) -> &mut [f32; 3] {
    match object {
        SimObjectDefinition::Sphere(o) => &mut o.position,
        SimObjectDefinition::Twirl(o) => &mut o.position,
        SimObjectDefinition::TwirlingAxis(o) => &mut o.position,
        SimObjectDefinition::RgpXy(o) => &mut o.position,
        SimObjectDefinition::Twirl8(o) => &mut o.position,
        SimObjectDefinition::Dexel(o) => &mut o.position,
    }
}

fn opacity_mut(object: &mut SimObjectDefinition) -> &mut f32 {
    match object {
        SimObjectDefinition::Sphere(o) => &mut o.opacity,
        SimObjectDefinition::Twirl(o) => &mut o.opacity,
        SimObjectDefinition::TwirlingAxis(o) => &mut o.opacity,
        SimObjectDefinition::RgpXy(o) => &mut o.opacity,
        SimObjectDefinition::Twirl8(o) => &mut o.opacity,
        SimObjectDefinition::Dexel(o) => &mut o.opacity,
    }
}

/// Validate and clamp `edit` against the object's field table, then write it
pub fn apply_edit(object: &mut SimObjectDefinition, edit: ObjectEdit) -> Result<(), EditError> {
    use SimObjectDefinition as O;

    let kind = object.kind();
    let spec = spec_for(kind, edit.field).ok_or(EditError::UnknownField { kind, field: edit.field })?;
    let mismatch = EditError::TypeMismatch { field: edit.field, value: edit.value };

    match edit.value {
        FieldValue::Number(raw) => {
            if !matches!(spec.kind, FieldKind::Float { .. } | FieldKind::Integer { .. }) {
                return Err(mismatch);
            }
            let v = clamp(spec.kind, raw);
            match (object, edit.field) {
                (object, Field::PositionX) => position_mut(object)[0] = v,
                (object, Field::PositionY) => position_mut(object)[1] = v,
                (object, Field::PositionZ) => position_mut(object)[2] = v,
                (object, Field::Opacity) => *opacity_mut(object) = v,
                (O::Sphere(o), Field::Radius) => o.radius = v,
                (O::Twirl(o), Field::Radius) => o.radius = v,
                (O::Twirl(o), Field::Speed) => o.speed = v,
                (O::TwirlingAxis(o), Field::Length) => o.length = v,
                (O::TwirlingAxis(o), Field::Thickness) => o.thickness = v,
                (O::TwirlingAxis(o), Field::Speed) => o.speed = v,
                (O::RgpXy(o), Field::Size) => o.size = v,
                (O::RgpXy(o), Field::Divisions) => o.divisions = v as u32,
                (O::Twirl8(o), Field::Size) => o.size = v,
                (O::Twirl8(o), Field::Width) => o.width = v,
                (O::Twirl8(o), Field::Segments) => o.segments = v as u32,
                (O::Twirl8(o), Field::Speed) => o.speed = v,
                (O::Dexel(o), Field::Size) => o.size = v,
                (O::Dexel(o), Field::Height) => o.height = v,
                _ => return Err(mismatch),
            }
        }
        FieldValue::Direction(d) => match object {
            O::Twirl(o) => o.direction = d,
            O::TwirlingAxis(o) => o.direction = d,
            O::Twirl8(o) => o.direction = d,
            _ => return Err(mismatch),
        },
        FieldValue::Plane(p) => match object {
            O::Twirl(o) => o.plane = p,
            O::Twirl8(o) => o.plane = p,
            _ => return Err(mismatch),
        },
        FieldValue::Axis(a) => match object {
            O::TwirlingAxis(o) => o.axis = a,
            _ => return Err(mismatch),
        },
        FieldValue::Toggle(b) => match object {
            O::Twirl8(o) => o.show_spokes = b,
            _ => return Err(mismatch),
        },
    }
    Ok(())
}

/// Mutation API the panel drives
pub trait SceneFacade {
    fn objects(&self) -> &[SimObjectDefinition];
    fn selected(&self) -> Option<usize>;
    fn select(&mut self, index: Option<usize>);
    fn update_object(&mut self, index: usize, edit: ObjectEdit) -> Result<(), EditError>;
    /// Remove an asset instance and its children; returns objects removed
    fn remove_instance(&mut self, instance_id: &str) -> usize;
}

#[derive(Debug, Clone, PartialEq)]
pub enum PanelAction {
    Select(Option<usize>),
    Edit(usize, ObjectEdit),
    Remove(String),
}

/// Dispatch one action, logging rejected edits
pub fn dispatch(scene: &mut dyn SceneFacade, action: PanelAction) {
    match action {
        PanelAction::Select(index) => scene.select(index),
        PanelAction::Edit(index, edit) => {
            if let Err(e) = scene.update_object(index, edit) {
                log::warn!("edit rejected: {}", e);
            }
        }
        PanelAction::Remove(instance_id) => {
            let removed = scene.remove_instance(&instance_id);
            log::info!("removed instance '{}' ({} objects)", instance_id, removed);
            scene.select(None);
        }
    }
}

const LIST_ROWS: usize = 8;

#[derive(Debug, Default)]
pub struct PropertiesPanel {
    list_scroll: usize,
}

impl PropertiesPanel {
    pub fn new() -> Self {
        Self::default()
    }

    fn draw_object_list(
        &mut self,
        ctx: &mut UiContext,
        rect: Rect,
        objects: &[SimObjectDefinition],
        selected: Option<usize>,
        actions: &mut Vec<PanelAction>,
    ) {
        if ctx.mouse.inside(&rect) && ctx.mouse.scroll != 0.0 {
            if ctx.mouse.scroll > 0.0 {
                self.list_scroll = self.list_scroll.saturating_sub(1);
            } else {
                self.list_scroll += 1;
            }
        }
        self.list_scroll = self.list_scroll.min(objects.len().saturating_sub(LIST_ROWS));

        for (row, (index, object)) in rect.rows(ROW_HEIGHT).zip(objects.iter().enumerate().skip(self.list_scroll)) {
            let is_selected = selected == Some(index);
            if is_selected {
                draw_rectangle(row.x, row.y, row.w, row.h, ROW_SELECTED);
            } else if ctx.mouse.inside(&row) {
                draw_rectangle(row.x, row.y, row.w, row.h, BUTTON_HOVER);
            }
            let text = format!("{}  ({})", object.id(), object.kind().label());
            draw_label(Rect::new(row.x + 4.0, row.y, row.w - 8.0, row.h), &text, if is_selected { WHITE } else { TEXT_COLOR });
            if ctx.mouse.clicked(&row) {
                actions.push(PanelAction::Select(if is_selected { None } else { Some(index) }));
            }
        }
    }

    fn draw_fields(
        &mut self,
        ctx: &mut UiContext,
        rect: Rect,
        index: usize,
        object: &SimObjectDefinition,
        actions: &mut Vec<PanelAction>,
    ) {
        let mut rows = rect.rows(ROW_HEIGHT + 4.0);
        for spec in fields_for(object.kind()) {
            let Some(row) = rows.next() else { break };
            let Some(value) = read_field(object, spec.field) else { continue };
            let (label_rect, control) = row.split_h_px(80.0);
            draw_label(label_rect, spec.label, TEXT_DIM);
            let control = Rect::new(control.x, control.y + 2.0, control.w, ROW_HEIGHT);
            let text = value.display(spec.kind);

            let new_value = match (spec.kind, value) {
                (FieldKind::Float { min, max }, FieldValue::Number(n)) => {
                    slider(ctx, control, n, min, max, &text).map(FieldValue::Number)
                }
                (FieldKind::Integer { .. }, FieldValue::Number(n)) => {
                    stepper(ctx, control, n, 1.0, &text).map(FieldValue::Number)
                }
                _ => text_button(ctx, control, &text, false).then(|| value.cycled()),
            };
            if let Some(value) = new_value {
                actions.push(PanelAction::Edit(index, ObjectEdit { field: spec.field, value }));
            }
        }
    }

    /// Draw the panel and collect what the user did this frame
    pub fn draw(&mut self, ctx: &mut UiContext, rect: Rect, scene: &dyn SceneFacade) -> Vec<PanelAction> {
        ctx.block(rect);
        let content = draw_titled_panel(rect, "Properties");
        let mut actions = Vec::new();
        let objects = scene.objects();
        let selected = scene.selected().filter(|&i| i < objects.len());

        let list_rect = content.slice_top(ROW_HEIGHT * LIST_ROWS as f32);
        self.draw_object_list(ctx, list_rect, objects, selected, &mut actions);
        let rest = content.remaining_after_top(list_rect.h + 8.0);

        match selected.map(|i| (i, &objects[i])) {
            Some((index, object)) => {
                let footer_h = ROW_HEIGHT + 8.0;
                let fields_rect = Rect::new(rest.x, rest.y, rest.w, (rest.h - footer_h).max(0.0));
                self.draw_fields(ctx, fields_rect, index, object, &mut actions);

                let button = Rect::new(rest.x, rest.bottom() - ROW_HEIGHT - 2.0, rest.w, ROW_HEIGHT);
                if text_button(ctx, button, &format!("Remove '{}'", object.id()), false) {
                    actions.push(PanelAction::Remove(object.id().to_string()));
                }
            }
            None => draw_label(rest.slice_top(ROW_HEIGHT), "Select an object to edit it", TEXT_DIM),
        }
        actions
    }
}
