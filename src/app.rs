//! Application state and the per-frame loop
//!
//! `App` owns every long-lived piece: the shared state store, the swap
//! controller holding the active model, the camera, the panels and the
//! persistent stores. `frame` runs one tick in a fixed order:
//!
//! 1. input: camera orbit/zoom, then camera distance into the state
//! 2. LOD selection, then the swap controller
//! 3. material rebinding and picking (hover, selection, decal drag)
//! 4. drawing: viewport, panel, status bar
//! 5. panel actions, recorder capture and encode polling

use crate::config::ConfiguratorConfig;
use crate::decal::DecalPlacer;
use crate::lod::LodTracker;
#[cfg(not(target_arch = "wasm32"))]
use crate::material::{decode_map, MapSlot};
use crate::material::{MaterialLibrary, PartMaterial};
use crate::model::FileAssetLoader;
use crate::scene::{draw_scene, float_transform, pick_parts, screen_to_ray, OrbitCamera, PickHit, ResolvedLights, SceneView};
use crate::sidebar::{apply_to_state, draw_status_bar, PanelAction, RecordingStatus, Sidebar, SidebarView, StatusInfo};
use crate::state::{ConfiguratorState, StateStore, SubscriptionId, Topic};
use crate::storage::recordings::CapturedFrame;
use crate::storage::{open_default, KeyValueStore, PresetStore, Recorder, RecordingStore};
use crate::swap::{SwapController, SwapEvent, SwapPhase};
use crate::ui::*;
use crate::ui::Rect;
use macroquad::prelude::*;

/// Wall clock in milliseconds (preset and recording ids)
fn now_ms() -> u64 {
    (macroquad::miniquad::date::now() * 1000.0).max(0.0) as u64
}

pub struct App {
    config: ConfiguratorConfig,
    store: StateStore,
    swap: SwapController,
    loader: FileAssetLoader,
    lod: LodTracker,
    materials: MaterialLibrary,
    material_sub: SubscriptionId,
    lights: ResolvedLights,
    lights_sub: SubscriptionId,
    decal_placer: DecalPlacer,
    decal_texture: Option<Texture2D>,
    camera: OrbitCamera,
    /// Right button went down inside the viewport and is still held
    orbiting: bool,

    kv: Box<dyn KeyValueStore>,
    presets: PresetStore,
    recordings: RecordingStore,
    recorder: Recorder,

    ui_ctx: UiContext,
    sidebar: Sidebar,
    hovered: Option<PickHit>,
    /// Status message, error flag, and the time it disappears
    status: Option<(String, bool, f64)>,
}

impl App {
    /// Returns None when the catalog has no model to start with
    pub fn new(
        config: ConfiguratorConfig,
        loader: FileAssetLoader,
        materials: MaterialLibrary,
        decal_texture: Option<Texture2D>,
    ) -> Option<Self> {
        let state = ConfiguratorState::from_config(&config)?;
        let lod = LodTracker::starting_at(state.model.lod);
        let lights = ResolvedLights::from_rig(&state.lights);
        let mut store = StateStore::new(state);
        let material_sub = store.subscribe(&[Topic::Material]);
        let lights_sub = store.subscribe(&[Topic::Lights]);

        let kv = open_default(config.storage_dir.as_deref());
        let presets = PresetStore::load(kv.as_ref());
        let recordings = RecordingStore::load(kv.as_ref());
        log::info!(
            "{} presets, {} recordings in storage",
            presets.list().len(),
            recordings.list().len()
        );

        Some(Self {
            swap: SwapController::new(config.swap.clone()),
            camera: OrbitCamera::new(&config.camera),
            recorder: Recorder::new(config.recording.duration_secs, config.recording.fps),
            config,
            store,
            loader,
            lod,
            materials,
            material_sub,
            lights,
            lights_sub,
            decal_placer: DecalPlacer::new(),
            decal_texture,
            orbiting: false,
            kv,
            presets,
            recordings,
            ui_ctx: UiContext::new(),
            sidebar: Sidebar::new(),
            hovered: None,
            status: None,
        })
    }

    /// Show a message in the status bar for `secs` seconds
    pub fn set_status(&mut self, message: &str, is_error: bool, secs: f64) {
        self.status = Some((message.to_string(), is_error, get_time() + secs));
    }

    fn current_status(&self, now: f64) -> Option<(String, bool)> {
        self.status
            .as_ref()
            .filter(|(_, _, until)| now < *until)
            .map(|(message, is_error, _)| (message.clone(), *is_error))
    }

    /// Run one frame
    pub fn frame(&mut self) {
        let now = get_time();
        let mouse = MouseState::poll(&self.ui_ctx.mouse);
        self.ui_ctx.begin_frame(mouse);

        let screen = Rect::screen(screen_width(), screen_height());
        let status_rect = screen.slice_bottom(STATUS_BAR_HEIGHT);
        let body = screen.remaining_after_bottom(STATUS_BAR_HEIGHT);
        let panel_rect = body.slice_right(SIDEBAR_WIDTH);
        let viewport = body.remaining_after_right(SIDEBAR_WIDTH);

        self.handle_camera_input(&viewport);
        self.update_lod();
        self.update_swap(now);
        self.refresh_bindings();

        let model_to_world = float_transform(now as f32, self.store.read().float_enabled);
        self.handle_pointer(&viewport, model_to_world);

        clear_background(VIEWPORT_BG);
        self.draw_viewport(&viewport, model_to_world);
        if self.recorder.wants_frame(now) {
            self.capture_frame(now, &viewport);
        }

        let actions = {
            let parts = self.swap.active().map(|m| m.part_names()).unwrap_or_default();
            let view = SidebarView {
                state: self.store.read(),
                config: &self.config,
                parts: &parts,
                presets: &self.presets,
                recordings: self.recordings.list(),
                recording: self.recording_status(now),
            };
            self.sidebar.draw(&mut self.ui_ctx, panel_rect, &view)
        };
        for action in actions {
            self.handle_action(action);
        }
        self.poll_recorder();

        self.draw_status(status_rect, now);
        draw_tooltip(&self.ui_ctx);
    }

    fn handle_camera_input(&mut self, viewport: &Rect) {
        let mouse = self.ui_ctx.mouse;
        let over_viewport = mouse.inside(viewport);

        if !mouse.right_down {
            self.orbiting = false;
        } else if over_viewport && is_mouse_button_pressed(MouseButton::Right) {
            self.orbiting = self.store.read().orbit_enabled;
        }
        if self.orbiting && mouse.dx != 0.0 {
            self.camera.orbit(mouse.dx);
        }
        if over_viewport && mouse.scroll != 0.0 {
            self.camera.zoom(mouse.scroll_notches());
        }
        if !self.sidebar.wants_keyboard() && is_key_pressed(KeyCode::Escape) {
            self.store.mutate(Topic::Selection, |s| {
                s.selected_mesh = None;
                s.outlined_mesh = None;
            });
        }

        let distance = self.camera.distance();
        if (distance - self.store.read().camera_distance).abs() > 1e-4 {
            self.store.mutate(Topic::Camera, |s| s.camera_distance = distance);
        }
    }

    fn update_lod(&mut self) {
        let state = self.store.read();
        let Some(tier) = self.lod.update(
            state.camera_distance,
            &state.model.thresholds,
            state.lod_override(),
        ) else {
            return;
        };
        if tier != state.model.lod {
            log::info!("LOD {} -> {} at {:.1}", state.model.lod, tier, state.camera_distance);
            self.store.mutate(Topic::Lod, |s| s.model.lod = tier);
        }
    }

    fn update_swap(&mut self, now: f64) {
        for event in self.swap.update(now, &mut self.store, &self.loader) {
            match event {
                SwapEvent::Failed { error } => {
                    log::error!("Model swap failed: {}", error);
                    self.set_status(&format!("Load failed: {}", error), true, 5.0);
                }
                SwapEvent::Installed { path, parts } => {
                    let kib = self.swap.active().map_or(0, |m| m.byte_size() / 1024);
                    log::debug!("Installed {} ({} KiB) with parts {:?}", path, kib, parts);
                    self.hovered = None;
                }
                SwapEvent::Disposed { path } => log::debug!("Disposed {}", path),
                SwapEvent::Restored { path } => log::debug!("Selection restored on {}", path),
                SwapEvent::Stale { path } => log::debug!(
                    "Discarded stale load of {} ({} still running)",
                    path,
                    self.swap.orphan_count()
                ),
            }
        }
    }

    /// Follow material assignments and light edits made since last frame
    fn refresh_bindings(&mut self) {
        if self.store.has_pending(self.lights_sub) {
            self.store.drain(self.lights_sub);
            self.lights = ResolvedLights::from_rig(&self.store.read().lights);
        }
        if self.store.drain(self.material_sub).is_empty() {
            return;
        }
        let Some(model) = self.swap.active_mut() else {
            return;
        };
        let assigned = &self.store.read().material.assigned;
        for part in model.parts_mut() {
            let wanted = assigned.get(part.name()).cloned();
            if part.material.preset == wanted {
                continue;
            }
            part.material = match wanted {
                Some(key) => {
                    if !self.materials.contains(&key) {
                        log::warn!("No maps loaded for material '{}'", key);
                    }
                    self.materials.material_for(&key)
                }
                None => PartMaterial::default(),
            };
            log::debug!(
                "{} now wears {:?} ({} maps)",
                part.name(),
                part.material.preset,
                part.material.bound_maps()
            );
        }
    }

    fn pick(&self, viewport: &Rect, model_to_world: Mat4) -> Option<PickHit> {
        let model = self.swap.active()?;
        let mouse = self.ui_ctx.mouse;
        let local = vec2(mouse.x - viewport.x, mouse.y - viewport.y);
        let view_proj = self.camera.view_proj(viewport.w / viewport.h.max(1.0));
        let ray = screen_to_ray(local, vec2(viewport.w, viewport.h), view_proj)?;
        pick_parts(&ray, model.parts(), model_to_world)
    }

    fn handle_pointer(&mut self, viewport: &Rect, model_to_world: Mat4) {
        let mouse = self.ui_ctx.mouse;
        let over_viewport = mouse.inside(viewport) && self.ui_ctx.dragging.is_none();
        let moved = mouse.dx != 0.0 || mouse.dy != 0.0;

        // The model may be floating, so pick every frame even without movement
        self.hovered = if over_viewport {
            self.pick(viewport, model_to_world)
        } else {
            None
        };
        let hit_part = self.hovered.as_ref().map(|hit| hit.part.clone());

        if over_viewport && mouse.left_pressed {
            self.decal_placer.pointer_down(hit_part.as_deref(), &self.store);
            self.store.mutate(Topic::Selection, |s| {
                s.selected_mesh = hit_part.clone();
                s.outlined_mesh = hit_part.clone();
            });
        }

        if self.decal_placer.is_dragging() && moved {
            if let Some(hit) = &self.hovered {
                if hit.part == self.store.read().decal_target {
                    self.decal_placer
                        .pointer_move(hit.world_point, model_to_world, &mut self.store);
                }
            }
        }

        if mouse.left_released || !mouse.left_down {
            self.decal_placer.pointer_up();
        }

        if let Some(hit) = &self.hovered {
            if !self.decal_placer.is_dragging() {
                self.ui_ctx.set_tooltip(&hit.part, mouse.x, mouse.y);
            }
        }
    }

    fn draw_viewport(&self, viewport: &Rect, model_to_world: Mat4) {
        let Some(model) = self.swap.active() else {
            let text = match self.swap.phase() {
                SwapPhase::Idle => "No model",
                phase => phase.label(),
            };
            let dims = measure_text(text, None, FONT_SIZE_HEADER as u16, 1.0);
            draw_text(
                text,
                viewport.x + (viewport.w - dims.width) * 0.5,
                viewport.center_y(),
                FONT_SIZE_HEADER,
                TEXT_DIM,
            );
            return;
        };
        if viewport.w < 1.0 || viewport.h < 1.0 {
            return;
        }

        // GL viewports are in physical pixels with the origin at the bottom left
        let dpi = screen_dpi_scale();
        let mut camera = self.camera.camera_3d(viewport.w / viewport.h);
        camera.viewport = Some((
            (viewport.x * dpi) as i32,
            ((screen_height() - viewport.bottom()) * dpi) as i32,
            (viewport.w * dpi) as i32,
            (viewport.h * dpi) as i32,
        ));
        set_camera(&camera);

        let view = SceneView {
            model_to_world,
            eye: self.camera.position(),
            hovered: self.hovered.as_ref().map(|hit| hit.part.as_str()),
            decal_texture: self.decal_texture.as_ref(),
        };
        draw_scene(model, self.store.read(), &self.lights, &view);

        set_default_camera();
    }

    /// Grab the viewport for the recorder (before panels are drawn on top)
    fn capture_frame(&mut self, now: f64, viewport: &Rect) {
        let image = get_screen_data();
        let (width, height) = (image.width as u32, image.height as u32);
        let scale = width as f32 / screen_width().max(1.0);
        let region = (
            (viewport.x * scale) as u32,
            (viewport.y * scale) as u32,
            (viewport.w * scale) as u32,
            (viewport.h * scale) as u32,
        );
        let max_width = self.config.recording.max_width;
        match CapturedFrame::from_framebuffer(width, height, image.bytes, Some(region), max_width) {
            Some(frame) => self.recorder.push_frame(now, frame),
            None => log::warn!("Skipped a {}x{} frame that could not be captured", width, height),
        }
    }

    fn recording_status(&self, now: f64) -> RecordingStatus {
        if self.recorder.is_capturing() {
            RecordingStatus::Capturing {
                elapsed: self.recorder.elapsed(now),
                duration: self.recorder.duration(),
            }
        } else if self.recorder.is_busy() {
            RecordingStatus::Encoding
        } else {
            RecordingStatus::Idle
        }
    }

    fn handle_action(&mut self, action: PanelAction) {
        match action {
            PanelAction::SavePreset(name) => {
                let settings = self.store.read().settings();
                match self.presets.save_preset(self.kv.as_mut(), &name, settings, now_ms()) {
                    Ok(id) => {
                        let saved = self.presets.get(id).map(|p| p.name.clone()).unwrap_or(name);
                        self.set_status(&format!("Saved preset '{}'", saved), false, 3.0);
                    }
                    Err(e) => self.set_status(&format!("Save failed: {}", e), true, 5.0),
                }
            }
            PanelAction::LoadPreset(id) => {
                if self.presets.load_preset(id, &mut self.store) {
                    let name = self.presets.get(id).map(|p| p.name.clone()).unwrap_or_default();
                    self.set_status(&format!("Loaded preset '{}'", name), false, 3.0);
                }
            }
            PanelAction::DeletePreset(id) => match self.presets.delete_preset(self.kv.as_mut(), id) {
                Ok(true) => self.set_status("Preset deleted", false, 2.0),
                Ok(false) => {}
                Err(e) => self.set_status(&format!("Delete failed: {}", e), true, 5.0),
            },
            PanelAction::StartRecording => {
                if let Err(e) = self.recorder.start(get_time()) {
                    self.set_status(&e.to_string(), true, 3.0);
                }
            }
            PanelAction::StopRecording => {
                if let Err(e) = self.recorder.stop() {
                    self.set_status(&e.to_string(), true, 3.0);
                }
            }
            PanelAction::ImportDecal => self.import_decal(),
            PanelAction::ExportRecording(id) => self.export_recording(id),
            PanelAction::DeleteRecording(id) => match self.recordings.delete(self.kv.as_mut(), id) {
                Ok(true) => self.set_status("Recording deleted", false, 2.0),
                Ok(false) => {}
                Err(e) => self.set_status(&format!("Delete failed: {}", e), true, 5.0),
            },
            action => {
                let switches_model = matches!(action, PanelAction::SelectModel(_));
                if apply_to_state(&action, &mut self.store, &self.config) && switches_model {
                    // The new model's tier came from the current distance already
                    self.lod.reset(Some(self.store.read().model.lod));
                }
            }
        }
    }

    fn poll_recorder(&mut self) {
        let Some(result) = self.recorder.poll() else {
            return;
        };
        let added = result.and_then(|clip| self.recordings.add(self.kv.as_mut(), clip, now_ms()));
        match added {
            Ok(id) => {
                let name = self.recordings.get(id).map(|r| r.name.clone()).unwrap_or_default();
                self.set_status(&format!("{} saved", name), false, 3.0);
            }
            Err(e) => {
                log::error!("Recording failed: {}", e);
                self.set_status(&format!("Recording failed: {}", e), true, 5.0);
            }
        }
    }

    /// File name and GIF bytes of a stored clip
    fn clip_for_export(&mut self, id: u64) -> Option<(String, Vec<u8>)> {
        let recording = self.recordings.get(id)?;
        let file_name = format!("{}.gif", recording.name.replace(' ', "_").to_lowercase());
        match recording.gif_bytes() {
            Ok(bytes) => Some((file_name, bytes)),
            Err(e) => {
                self.set_status(&format!("Export failed: {}", e), true, 5.0);
                None
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn export_recording(&mut self, id: u64) {
        let Some((file_name, bytes)) = self.clip_for_export(id) else {
            return;
        };
        let dialog = rfd::FileDialog::new()
            .add_filter("GIF Animation", &["gif"])
            .set_file_name(&file_name);

        if let Some(save_path) = dialog.save_file() {
            match std::fs::write(&save_path, bytes) {
                Ok(()) => self.set_status(&format!("Exported {}", save_path.display()), false, 3.0),
                Err(e) => self.set_status(&format!("Export failed: {}", e), true, 5.0),
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn import_decal(&mut self) {
        let dialog = rfd::FileDialog::new().add_filter("Image", &["png", "jpg", "jpeg", "bmp"]);
        let Some(path) = dialog.pick_file() else {
            return;
        };
        let decoded = std::fs::read(&path)
            .map_err(|e| e.to_string())
            .and_then(|bytes| decode_map(MapSlot::BaseColor, &bytes).map_err(|e| e.to_string()));
        match decoded {
            Ok(map) => {
                let texture = Texture2D::from_rgba8(map.width, map.height, &map.rgba);
                texture.set_filter(FilterMode::Linear);
                self.decal_texture = Some(texture);
                log::info!("Decal image {} ({}x{})", path.display(), map.width, map.height);
                self.set_status("Decal image replaced", false, 2.0);
            }
            Err(e) => self.set_status(&format!("Import failed: {}", e), true, 5.0),
        }
    }

    #[cfg(target_arch = "wasm32")]
    fn import_decal(&mut self) {
        self.set_status("Import is only available in the desktop build", true, 3.0);
    }

    #[cfg(target_arch = "wasm32")]
    fn export_recording(&mut self, id: u64) {
        let Some((file_name, bytes)) = self.clip_for_export(id) else {
            return;
        };
        crate::storage::trigger_download(&file_name, &bytes);
        self.set_status(&format!("Downloaded {}", file_name), false, 3.0);
    }

    fn draw_status(&self, rect: Rect, now: f64) {
        let state = self.store.read();
        let info = StatusInfo {
            fps: get_fps(),
            model: state.model.name.clone(),
            tier: state.model.lod,
            distance: state.camera_distance,
            phase: self.swap.phase().label(),
            triangles: self.swap.active().map_or(0, |m| m.triangle_count()),
            message: self.current_status(now),
        };
        draw_status_bar(rect, &info);
    }
}
