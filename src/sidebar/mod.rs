//! Configurator side panel
//!
//! Collapsible sections stacked in one scrolling column on the right of the
//! viewport. Drawing returns the actions the user triggered this frame; the
//! panel itself only keeps layout state (open sections, scroll, the preset
//! name being typed, the color being edited).

pub mod actions;
pub mod status;

pub use actions::{apply_to_state, PanelAction};
pub use status::{draw_status_bar, StatusInfo};

use crate::color::{parse_hex_or_white, to_hex, Hsv};
use crate::config::ConfiguratorConfig;
use crate::state::lights::LightKind;
use crate::state::ConfiguratorState;
use crate::storage::{PresetStore, Recording};
use crate::ui::*;
use crate::ui::Rect;
use macroquad::prelude::*;

/// Quick picks shown under the color sliders
const SWATCHES: [&str; 10] = [
    "#ffffff", "#1d1d1f", "#8e8e93", "#c0392b", "#e67e22", "#f1c40f", "#27ae60", "#2980b9", "#8e44ad", "#f5d5c5",
];

const SECTION_COUNT: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Model,
    Meshes,
    Color,
    Decal,
    Material,
    Lighting,
    Presets,
    Recording,
}

impl Section {
    const ALL: [Section; SECTION_COUNT] = [
        Section::Model,
        Section::Meshes,
        Section::Color,
        Section::Decal,
        Section::Material,
        Section::Lighting,
        Section::Presets,
        Section::Recording,
    ];

    fn title(&self) -> &'static str {
        match self {
            Section::Model => "Model",
            Section::Meshes => "Meshes",
            Section::Color => "Color",
            Section::Decal => "Decal",
            Section::Material => "Material",
            Section::Lighting => "Lighting",
            Section::Presets => "Presets",
            Section::Recording => "Recording",
        }
    }
}

/// Recorder progress as the panel shows it
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecordingStatus {
    Idle,
    Capturing { elapsed: f64, duration: f64 },
    Encoding,
}

/// Everything the panel reads this frame
pub struct SidebarView<'a> {
    pub state: &'a ConfiguratorState,
    pub config: &'a ConfiguratorConfig,
    /// Loaded parts in file order
    pub parts: &'a [String],
    pub presets: &'a PresetStore,
    pub recordings: &'a [Recording],
    pub recording: RecordingStatus,
}

pub struct Sidebar {
    open: [bool; SECTION_COUNT],
    scroll: f32,
    content_height: f32,
    preset_name: TextInputState,
    /// Part and HSV being edited, kept so hue survives grey colors
    editing_color: Option<(String, Hsv)>,
}

impl Default for Sidebar {
    fn default() -> Self {
        Self::new()
    }
}

impl Sidebar {
    pub fn new() -> Self {
        let mut open = [false; SECTION_COUNT];
        for section in [Section::Model, Section::Meshes, Section::Color] {
            open[section as usize] = true;
        }
        Self {
            open,
            scroll: 0.0,
            content_height: 0.0,
            preset_name: TextInputState::default(),
            editing_color: None,
        }
    }

    /// Whether keyboard input belongs to the panel (a text field has focus)
    pub fn wants_keyboard(&self) -> bool {
        self.preset_name.focused
    }

    fn is_open(&self, section: Section) -> bool {
        self.open[section as usize]
    }

    /// Draw the panel into `rect`, returning this frame's actions
    pub fn draw(&mut self, ctx: &mut UiContext, rect: Rect, view: &SidebarView) -> Vec<PanelAction> {
        draw_rectangle(rect.x, rect.y, rect.w, rect.h, BG_COLOR);

        if ctx.mouse.inside(&rect) && ctx.mouse.scroll != 0.0 {
            self.scroll -= ctx.mouse.scroll_notches() * 40.0;
        }
        let max_scroll = (self.content_height - rect.h).max(0.0);
        self.scroll = self.scroll.clamp(0.0, max_scroll);

        let inner = rect.pad(8.0);
        ctx.set_clip(Some(rect));
        let mut col = Column::new(inner, self.scroll);
        let mut actions = Vec::new();

        for section in Section::ALL {
            let header = col.row(ROW_HEIGHT + 4.0);
            if section_header(ctx, header, section.title(), self.is_open(section)) {
                self.open[section as usize] = !self.is_open(section);
            }
            if !self.is_open(section) {
                continue;
            }
            match section {
                Section::Model => draw_model_section(ctx, &mut col, view, &mut actions),
                Section::Meshes => draw_meshes_section(ctx, &mut col, view, &mut actions),
                Section::Color => self.draw_color_section(ctx, &mut col, view, &mut actions),
                Section::Decal => draw_decal_section(ctx, &mut col, view, &mut actions),
                Section::Material => draw_material_section(ctx, &mut col, view, &mut actions),
                Section::Lighting => draw_lighting_section(ctx, &mut col, view, &mut actions),
                Section::Presets => self.draw_presets_section(ctx, &mut col, view, &mut actions),
                Section::Recording => draw_recording_section(ctx, &mut col, view, &mut actions),
            }
            col.space(6.0);
        }

        self.content_height = col.content_height(self.scroll) + 16.0;
        ctx.set_clip(None);
        actions
    }

    fn draw_color_section(
        &mut self,
        ctx: &mut UiContext,
        col: &mut Column,
        view: &SidebarView,
        actions: &mut Vec<PanelAction>,
    ) {
        let state = view.state;
        let Some(part) = state.selected_mesh.clone().filter(|p| state.has_part(p)) else {
            self.editing_color = None;
            label(ctx, col.row(ROW_HEIGHT), "Select a mesh to color it", TEXT_DIM);
            return;
        };
        let hex = state.items.get(&part).cloned().unwrap_or_default();

        // Re-derive HSV only when the color changed from outside
        let hsv = match &self.editing_color {
            Some((editing, hsv)) if *editing == part && to_hex(hsv.to_color()) == hex => *hsv,
            _ => Hsv::from_color(parse_hex_or_white(&hex)),
        };

        let row = col.row(ROW_HEIGHT);
        let (chip, text) = row.split_h_px(ROW_HEIGHT + 4.0);
        if ctx.visible(&chip) {
            draw_rectangle(chip.x + 4.0, chip.y + 2.0, chip.w - 6.0, chip.h - 4.0, parse_hex_or_white(&hex));
        }
        label(ctx, text, &format!("{}  {}", part, hex), TEXT_COLOR);

        let mut edited = hsv;
        if let Some(h) = slider(ctx, col.row(ROW_HEIGHT), "Hue", hsv.h, 0.0, 1.0) {
            edited.h = h.min(0.999);
        }
        if let Some(s) = slider(ctx, col.row(ROW_HEIGHT), "Saturation", hsv.s, 0.0, 1.0) {
            edited.s = s;
        }
        if let Some(v) = slider(ctx, col.row(ROW_HEIGHT), "Value", hsv.v, 0.0, 1.0) {
            edited.v = v;
        }
        if edited != hsv {
            actions.push(PanelAction::SetPartColor {
                part: part.clone(),
                hex: to_hex(edited.to_color()),
            });
        }
        self.editing_color = Some((part.clone(), edited));

        let chips = col.row(ROW_HEIGHT).columns(SWATCHES.len(), 3.0);
        for (chip, swatch_hex) in chips.into_iter().zip(SWATCHES) {
            if swatch(ctx, chip, parse_hex_or_white(swatch_hex), hex == swatch_hex) {
                actions.push(PanelAction::SetPartColor {
                    part: part.clone(),
                    hex: swatch_hex.to_string(),
                });
            }
        }
    }

    fn draw_presets_section(
        &mut self,
        ctx: &mut UiContext,
        col: &mut Column,
        view: &SidebarView,
        actions: &mut Vec<PanelAction>,
    ) {
        let row = col.row(ROW_HEIGHT + 2.0);
        let (field, save) = row.split_h_px(row.w - 64.0);
        let submitted = draw_text_input(ctx, Rect::new(field.x, field.y, field.w - 4.0, field.h), &mut self.preset_name, "Preset name");
        if button(ctx, save, "Save") || submitted {
            actions.push(PanelAction::SavePreset(self.preset_name.take()));
            self.preset_name.focused = false;
        }

        if view.presets.list().is_empty() {
            label(ctx, col.row(ROW_HEIGHT), "No saved presets", TEXT_DIM);
        }
        for preset in view.presets.list() {
            let row = col.row(ROW_HEIGHT);
            let (name, delete) = row.split_h_px(row.w - 24.0);
            let current = view.presets.current() == Some(preset.id);
            if list_item(ctx, name, &preset.name, current) {
                actions.push(PanelAction::LoadPreset(preset.id));
            }
            if button(ctx, delete, "x") {
                actions.push(PanelAction::DeletePreset(preset.id));
            }
        }
    }
}

fn draw_model_section(ctx: &mut UiContext, col: &mut Column, view: &SidebarView, actions: &mut Vec<PanelAction>) {
    let state = view.state;
    for entry in &view.config.models {
        if list_item(ctx, col.row(ROW_HEIGHT), &entry.name, entry.name == state.model.name) {
            actions.push(PanelAction::SelectModel(entry.name.clone()));
        }
    }

    if let Some(auto) = toggle(ctx, col.row(ROW_HEIGHT), "Automatic LOD", state.auto_lod) {
        actions.push(PanelAction::SetAutoLod(auto));
    }

    let tiers: Vec<u8> = state.model.thresholds.tiers().collect();
    let row = col.row(ROW_HEIGHT);
    let (caption, buttons) = row.split_h_px(60.0);
    label(ctx, caption, "Tier", TEXT_DIM);
    for (rect, tier) in buttons.columns(tiers.len(), 3.0).into_iter().zip(tiers) {
        if button_active(ctx, rect, &format!("LOD{}", tier), state.model.lod == tier) {
            actions.push(PanelAction::ForceLod(tier));
        }
    }
}

fn draw_meshes_section(ctx: &mut UiContext, col: &mut Column, view: &SidebarView, actions: &mut Vec<PanelAction>) {
    if view.parts.is_empty() {
        label(ctx, col.row(ROW_HEIGHT), "Loading...", TEXT_DIM);
        return;
    }
    for part in view.parts {
        let selected = view.state.selected_mesh.as_deref() == Some(part.as_str());
        let row = col.row(ROW_HEIGHT);
        let (name, chip) = row.split_h_px(row.w - ROW_HEIGHT);
        if list_item(ctx, name, part, selected) {
            actions.push(PanelAction::FocusPart(part.clone()));
        }
        if let Some(hex) = view.state.items.get(part) {
            if ctx.visible(&chip) {
                draw_rectangle(chip.x + 3.0, chip.y + 3.0, chip.w - 6.0, chip.h - 6.0, parse_hex_or_white(hex));
            }
        }
    }
}

fn draw_decal_section(ctx: &mut UiContext, col: &mut Column, view: &SidebarView, actions: &mut Vec<PanelAction>) {
    let state = view.state;
    let row = col.row(ROW_HEIGHT);
    let target = if state.decal_target.is_empty() { "(none)" } else { state.decal_target.as_str() };
    label(ctx, row, &format!("Target: {}", target), TEXT_COLOR);

    let targets = col.row(ROW_HEIGHT).columns(view.parts.len().max(1), 3.0);
    for (rect, part) in targets.into_iter().zip(view.parts) {
        if button_active(ctx, rect, part, *part == state.decal_target) {
            actions.push(PanelAction::SetDecalTarget(part.clone()));
        }
    }
    if button(ctx, col.row(ROW_HEIGHT), "Import image...") {
        actions.push(PanelAction::ImportDecal);
    }

    if let Some(flipped) = toggle(ctx, col.row(ROW_HEIGHT), "Flip horizontally", state.decal.is_flipped()) {
        actions.push(PanelAction::SetDecalFlipped(flipped));
    }
    if let Some(drag) = toggle(ctx, col.row(ROW_HEIGHT), "Drag to move", state.decal_drag_enabled) {
        actions.push(PanelAction::SetDecalDrag(drag));
    }
    if let Some(orbit) = toggle(ctx, col.row(ROW_HEIGHT), "Camera orbit", state.orbit_enabled) {
        actions.push(PanelAction::SetOrbit(orbit));
    }
    if let Some(float) = toggle(ctx, col.row(ROW_HEIGHT), "Float", state.float_enabled) {
        actions.push(PanelAction::SetFloat(float));
    }

    let mut decal = state.decal.clone();
    let mut changed = false;
    for (axis, name) in ["Pos X", "Pos Y", "Pos Z"].iter().enumerate() {
        if let Some(v) = slider(ctx, col.row(ROW_HEIGHT), name, decal.position[axis], -1.0, 1.0) {
            decal.position[axis] = v;
            changed = true;
        }
    }
    if let Some(v) = slider(ctx, col.row(ROW_HEIGHT), "Rotation", decal.rotation[2], -std::f32::consts::PI, std::f32::consts::PI) {
        decal.rotation[2] = v;
        changed = true;
    }
    if let Some(v) = slider(ctx, col.row(ROW_HEIGHT), "Scale", decal.scale, 0.1, 2.0) {
        decal.set_scale(v);
        changed = true;
    }
    if let Some(v) = slider(ctx, col.row(ROW_HEIGHT), "Opacity", decal.opacity, 0.0, 1.0) {
        decal.set_opacity(v);
        changed = true;
    }
    if let Some(v) = slider(ctx, col.row(ROW_HEIGHT), "Roughness", decal.roughness, 0.0, 1.0) {
        decal.roughness = v;
        changed = true;
    }
    if let Some(v) = slider(ctx, col.row(ROW_HEIGHT), "Offset", decal.height_offset, 0.0, 0.05) {
        decal.height_offset = v;
        changed = true;
    }
    if changed {
        actions.push(PanelAction::SetDecal(decal));
    }
}

fn draw_material_section(ctx: &mut UiContext, col: &mut Column, view: &SidebarView, actions: &mut Vec<PanelAction>) {
    let material = &view.state.material;
    for entry in &view.config.materials {
        let row = col.row(ROW_HEIGHT);
        let (name, chip) = row.split_h_px(row.w - ROW_HEIGHT);
        if list_item(ctx, name, &entry.label, entry.key == material.current) {
            actions.push(PanelAction::SelectMaterial(entry.key.clone()));
        }
        let tint = material.colors.get(&entry.key).map(|s| s.as_str()).unwrap_or(entry.tint.as_str());
        if ctx.visible(&chip) {
            draw_rectangle(chip.x + 3.0, chip.y + 3.0, chip.w - 6.0, chip.h - 6.0, parse_hex_or_white(tint));
        }
    }

    // Tint of the selected preset
    if let Some(tint) = material.colors.get(&material.current) {
        let hsv = Hsv::from_color(parse_hex_or_white(tint));
        if let Some(v) = slider(ctx, col.row(ROW_HEIGHT), "Tint", hsv.v, 0.2, 1.0) {
            let edited = Hsv { v, ..hsv };
            actions.push(PanelAction::SetMaterialTint {
                key: material.current.clone(),
                hex: to_hex(edited.to_color()),
            });
        }
    }

    if let Some(only) = toggle(ctx, col.row(ROW_HEIGHT), "Decal target only", material.apply_to_target_only) {
        actions.push(PanelAction::SetApplyToTargetOnly(only));
    }
    if button(ctx, col.row(ROW_HEIGHT + 2.0), "Apply fabric") {
        actions.push(PanelAction::ApplyMaterial);
    }
}

fn draw_lighting_section(ctx: &mut UiContext, col: &mut Column, view: &SidebarView, actions: &mut Vec<PanelAction>) {
    let state = view.state;
    if let Some(v) = slider(ctx, col.row(ROW_HEIGHT), "Ambient", state.lights.ambient.intensity, 0.0, 2.0) {
        actions.push(PanelAction::SetAmbient(v));
    }
    for (index, light) in state.lights.lights.iter().enumerate() {
        let caption = match light.kind {
            LightKind::Directional => light.name.clone(),
            kind => format!("{} ({})", light.name, kind.label()),
        };
        if let Some(enabled) = toggle(ctx, col.row(ROW_HEIGHT), &caption, light.enabled) {
            actions.push(PanelAction::SetLightEnabled(index, enabled));
        }
        if light.enabled {
            if let Some(v) = slider(ctx, col.row(ROW_HEIGHT), "Intensity", light.intensity, 0.0, 2.0) {
                actions.push(PanelAction::SetLightIntensity(index, v));
            }
        }
    }

    let mut shadows = state.shadows.clone();
    let mut changed = false;
    if let Some(enabled) = toggle(ctx, col.row(ROW_HEIGHT), "Contact shadow", shadows.enabled) {
        shadows.enabled = enabled;
        changed = true;
    }
    if shadows.enabled {
        if let Some(v) = slider(ctx, col.row(ROW_HEIGHT), "Shadow", shadows.opacity, 0.0, 1.0) {
            shadows.opacity = v;
            changed = true;
        }
        if let Some(v) = slider(ctx, col.row(ROW_HEIGHT), "Reach", shadows.far, 0.1, 3.0) {
            shadows.far = v;
            changed = true;
        }
    }
    if changed {
        actions.push(PanelAction::SetShadows(shadows));
    }
}

fn draw_recording_section(ctx: &mut UiContext, col: &mut Column, view: &SidebarView, actions: &mut Vec<PanelAction>) {
    match view.recording {
        RecordingStatus::Idle => {
            if button(ctx, col.row(ROW_HEIGHT + 2.0), "Record turntable") {
                actions.push(PanelAction::StartRecording);
            }
        }
        RecordingStatus::Capturing { elapsed, duration } => {
            if button_active(ctx, col.row(ROW_HEIGHT + 2.0), &format!("Stop ({:.1}s / {:.0}s)", elapsed, duration), true) {
                actions.push(PanelAction::StopRecording);
            }
        }
        RecordingStatus::Encoding => {
            label(ctx, col.row(ROW_HEIGHT), "Encoding...", TEXT_DIM);
        }
    }

    for recording in view.recordings {
        let row = col.row(ROW_HEIGHT);
        let (text, buttons) = row.split_h_px(row.w - 84.0);
        let (export, delete) = buttons.split_h_px(60.0);
        label(
            ctx,
            text,
            &format!("{} ({:.1}s, {}x{})", recording.name, recording.duration_secs(), recording.width, recording.height),
            TEXT_COLOR,
        );
        if button(ctx, export, "Export") {
            actions.push(PanelAction::ExportRecording(recording.id));
        }
        if button(ctx, Rect::new(delete.x + 4.0, delete.y, delete.w - 4.0, delete.h), "x") {
            actions.push(PanelAction::DeleteRecording(recording.id));
        }
    }
}
