//! Model Swap Controller
//!
//! Explicit state machine for replacing the active garment model when the
//! quality tier or the catalog model changes:
//!
//! ```text
//! Idle -> Unloading -> Loading -> Restoring -> Idle
//!                         |
//!                         +-> Idle (load failed or timed out)
//! ```
//!
//! - Unloading captures the selection triple and disposes the active model
//!   before the next load is issued, so repeated swaps never hold two models.
//! - Loading polls the pending asset each frame. The scene keeps rendering
//!   (nothing, since the old model is gone) while it waits.
//! - Restoring installs the model, rebuilds per-part state, then after a short
//!   settling delay re-applies the captured selection.
//!
//! A request that arrives mid-transition supersedes it. Each transition has a
//! generation number; a superseded load is parked as an orphan and when it
//! finishes its result is dropped and reported as stale, never installed.

pub mod selection;

pub use selection::SelectionSnapshot;

use crate::async_ops::TaskPoll;
use crate::config::SwapConfig;
use crate::model::{AssetLoader, LoadedModel, ModelLoadError, PendingModel};
use crate::state::{StateStore, Topic};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapPhase {
    Idle,
    Unloading,
    Loading,
    Restoring,
}

impl SwapPhase {
    pub fn label(&self) -> &'static str {
        match self {
            SwapPhase::Idle => "Idle",
            SwapPhase::Unloading => "Unloading",
            SwapPhase::Loading => "Loading",
            SwapPhase::Restoring => "Restoring",
        }
    }
}

/// What a swap asks for: an asset path and the catalog model it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapRequest {
    pub path: String,
    pub model: String,
}

/// Something that happened during `update`
#[derive(Debug, Clone, PartialEq)]
pub enum SwapEvent {
    /// The previous model was released
    Disposed { path: String },
    /// A new model became the active one
    Installed { path: String, parts: Vec<String> },
    /// Selection re-applied; the controller is idle again
    Restored { path: String },
    Failed { error: ModelLoadError },
    /// A superseded load finished and was discarded
    Stale { path: String },
}

enum Stage {
    Unloading,
    Loading { pending: PendingModel, started: f64 },
    Restoring { since: f64, parts: Vec<String> },
}

struct Transition {
    generation: u64,
    request: SwapRequest,
    /// Whether per-part colors survive (same model, different tier)
    keep_part_state: bool,
    snapshot: Option<SelectionSnapshot>,
    stage: Stage,
}

/// A load that was superseded while in flight
struct Orphan {
    generation: u64,
    path: String,
    pending: PendingModel,
    started: f64,
}

pub struct SwapController {
    active: Option<LoadedModel>,
    /// Model the active resource (or the last attempt) belongs to
    current: Option<SwapRequest>,
    transition: Option<Transition>,
    orphans: Vec<Orphan>,
    /// Last path that failed; not retried until something else is requested
    failed: Option<String>,
    generation: u64,
    config: SwapConfig,
}

impl SwapController {
    pub fn new(config: SwapConfig) -> Self {
        Self {
            active: None,
            current: None,
            transition: None,
            orphans: Vec::new(),
            failed: None,
            generation: 0,
            config,
        }
    }

    pub fn phase(&self) -> SwapPhase {
        match &self.transition {
            None => SwapPhase::Idle,
            Some(t) => match t.stage {
                Stage::Unloading => SwapPhase::Unloading,
                Stage::Loading { .. } => SwapPhase::Loading,
                Stage::Restoring { .. } => SwapPhase::Restoring,
            },
        }
    }

    pub fn active(&self) -> Option<&LoadedModel> {
        self.active.as_ref()
    }

    pub fn active_mut(&mut self) -> Option<&mut LoadedModel> {
        self.active.as_mut()
    }

    /// Path the controller is heading to (in-flight target or active model)
    pub fn target_path(&self) -> Option<&str> {
        match &self.transition {
            Some(t) => Some(&t.request.path),
            None => self.active.as_ref().map(|m| m.path()),
        }
    }

    /// Superseded loads still running
    pub fn orphan_count(&self) -> usize {
        self.orphans.len()
    }

    /// Ask for a model; returns false when already there or heading there
    pub fn request(&mut self, request: SwapRequest) -> bool {
        if self.target_path() == Some(request.path.as_str()) {
            return false;
        }
        self.failed = None;

        let mut keep_part_state = self
            .current
            .as_ref()
            .map_or(false, |c| c.model == request.model);

        // Supersede: park the in-flight load and carry the earliest snapshot
        let mut snapshot = None;
        if let Some(previous) = self.transition.take() {
            log::info!(
                "Swap to {} superseded by {}",
                previous.request.path,
                request.path
            );
            snapshot = previous.snapshot;
            match previous.stage {
                // Part state still belongs to the model before the superseded one
                Stage::Unloading => keep_part_state &= previous.keep_part_state,
                Stage::Loading { pending, started } => {
                    keep_part_state &= previous.keep_part_state;
                    self.orphans.push(Orphan {
                        generation: previous.generation,
                        path: previous.request.path,
                        pending,
                        started,
                    });
                }
                Stage::Restoring { .. } => {}
            }
        }

        self.generation += 1;
        self.current = Some(request.clone());
        self.transition = Some(Transition {
            generation: self.generation,
            request,
            keep_part_state,
            snapshot,
            stage: Stage::Unloading,
        });
        true
    }

    /// Request whatever the shared state says should be showing
    pub fn sync(&mut self, store: &StateStore) -> bool {
        let state = store.read();
        let Some(path) = state.model.path() else {
            return false;
        };
        if self.failed.as_deref() == Some(path) || self.target_path() == Some(path) {
            return false;
        }
        self.request(SwapRequest {
            path: path.to_string(),
            model: state.model.name.clone(),
        })
    }

    /// Advance one frame
    pub fn update(
        &mut self,
        now: f64,
        store: &mut StateStore,
        loader: &dyn AssetLoader,
    ) -> Vec<SwapEvent> {
        let mut events = Vec::new();
        self.sync(store);
        self.reap_orphans(now, &mut events);

        let Some(mut transition) = self.transition.take() else {
            return events;
        };

        if let Stage::Unloading = transition.stage {
            if transition.snapshot.is_none() {
                transition.snapshot = Some(SelectionSnapshot::capture(store.read()));
            }
            if let Some(mut old) = self.active.take() {
                if old.dispose() {
                    events.push(SwapEvent::Disposed {
                        path: old.path().to_string(),
                    });
                }
            }
            log::info!(
                "Loading {} (generation {})",
                transition.request.path,
                transition.generation
            );
            transition.stage = Stage::Loading {
                pending: loader.load(&transition.request.path),
                started: now,
            };
        }

        self.transition = match transition.stage {
            Stage::Unloading => Some(transition),
            Stage::Loading {
                mut pending,
                started,
            } => match pending.poll() {
                TaskPoll::Pending if now - started > self.config.load_timeout_secs => {
                    let error = ModelLoadError::Timeout {
                        path: transition.request.path.clone(),
                        secs: self.config.load_timeout_secs,
                    };
                    self.fail(error, store, &mut events);
                    // Keep polling it so a late result is disposed instead of leaked
                    self.orphans.push(Orphan {
                        generation: transition.generation,
                        path: transition.request.path,
                        pending,
                        started: now,
                    });
                    None
                }
                TaskPoll::Pending => {
                    transition.stage = Stage::Loading { pending, started };
                    Some(transition)
                }
                TaskPoll::Ready(Ok(geometry)) => {
                    let model = LoadedModel::new(&transition.request.path, geometry);
                    let parts = model.part_names();
                    log::info!(
                        "Installed {} ({} parts, {} triangles) in {:.2}s",
                        model.path(),
                        parts.len(),
                        model.triangle_count(),
                        now - started
                    );
                    Self::install(
                        transition.keep_part_state,
                        transition.snapshot.as_ref(),
                        &parts,
                        store,
                    );
                    self.active = Some(model);
                    events.push(SwapEvent::Installed {
                        path: transition.request.path.clone(),
                        parts: parts.clone(),
                    });
                    transition.stage = Stage::Restoring { since: now, parts };
                    Some(transition)
                }
                TaskPoll::Ready(Err(error)) => {
                    self.fail(error, store, &mut events);
                    None
                }
                TaskPoll::Lost => {
                    let error = ModelLoadError::Cancelled {
                        path: transition.request.path.clone(),
                    };
                    self.fail(error, store, &mut events);
                    None
                }
            },
            Stage::Restoring { since, ref parts } => {
                if now - since >= self.config.restore_delay_secs {
                    let snapshot = transition.snapshot.clone().unwrap_or_default();
                    store.mutate(Topic::Selection, |s| snapshot.restore(s, parts));
                    events.push(SwapEvent::Restored {
                        path: transition.request.path.clone(),
                    });
                    None
                } else {
                    Some(transition)
                }
            }
        };

        events
    }

    /// Rebuild per-part state for a freshly installed model in one write
    fn install(
        keep: bool,
        snapshot: Option<&SelectionSnapshot>,
        parts: &[String],
        store: &mut StateStore,
    ) {
        let target = snapshot
            .map(|s| s.install_target(parts))
            .unwrap_or_else(|| parts.first().cloned().unwrap_or_default());
        store.mutate_all(&[Topic::Items, Topic::Selection, Topic::Material], |s| {
            s.rebuild_items(parts, keep);
            s.rebuild_assignments(parts, keep);
            s.decal_target = target;
            s.drop_missing_selection();
        });
    }

    /// Load failed: no model, empty part state, back to idle
    fn fail(&mut self, error: ModelLoadError, store: &mut StateStore, events: &mut Vec<SwapEvent>) {
        log::error!("Model load failed: {}", error);
        self.failed = Some(error.path().to_string());
        store.mutate_all(&[Topic::Items, Topic::Selection], |s| {
            s.items.clear();
            s.drop_missing_selection();
        });
        events.push(SwapEvent::Failed { error });
    }

    /// Poll superseded loads; anything that finishes is discarded
    fn reap_orphans(&mut self, now: f64, events: &mut Vec<SwapEvent>) {
        let timeout = self.config.load_timeout_secs;
        self.orphans.retain_mut(|orphan| {
            let finished = match orphan.pending.poll() {
                TaskPoll::Pending => now - orphan.started > timeout,
                TaskPoll::Ready(Ok(geometry)) => {
                    let mut stale = LoadedModel::new(&orphan.path, geometry);
                    stale.dispose();
                    true
                }
                TaskPoll::Ready(Err(_)) | TaskPoll::Lost => true,
            };
            if finished {
                log::debug!(
                    "Discarded stale load of {} (generation {})",
                    orphan.path,
                    orphan.generation
                );
                events.push(SwapEvent::Stale {
                    path: orphan.path.clone(),
                });
            }
            !finished
        });
    }

    /// Dispose everything the controller owns
    pub fn teardown(&mut self) {
        if let Some(mut model) = self.active.take() {
            model.dispose();
        }
        self.transition = None;
        self.orphans.clear();
        self.current = None;
    }
}

impl Drop for SwapController {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::async_ops::{Task, TaskCompleter};
    use crate::config::ConfiguratorConfig;
    use crate::model::obj::{parse_obj, ModelGeometry};
    use crate::state::ConfiguratorState;
    use std::cell::RefCell;

    type Completer = TaskCompleter<Result<ModelGeometry, ModelLoadError>>;

    /// Loader whose loads finish only when the test says so
    #[derive(Default)]
    struct ManualLoader {
        pending: RefCell<Vec<(String, Completer)>>,
        requested: RefCell<Vec<String>>,
    }

    impl ManualLoader {
        fn finish(&self, path: &str, result: Result<ModelGeometry, ModelLoadError>) {
            let mut pending = self.pending.borrow_mut();
            let index = pending
                .iter()
                .position(|(p, _)| p == path)
                .expect("no pending load for path");
            let (_, completer) = pending.remove(index);
            completer.complete(result);
        }

        fn finish_with_parts(&self, path: &str, parts: &[&str]) {
            self.finish(path, Ok(geometry(parts)));
        }
    }

    impl AssetLoader for ManualLoader {
        fn load(&self, path: &str) -> PendingModel {
            let (completer, task) = Task::completer();
            self.pending.borrow_mut().push((path.to_string(), completer));
            self.requested.borrow_mut().push(path.to_string());
            task
        }
    }

    fn geometry(parts: &[&str]) -> ModelGeometry {
        let mut text = String::from("v 0 0 0\nv 1 0 0\nv 0 1 0\n");
        for part in parts {
            text.push_str(&format!("o {}\nf 1 2 3\n", part));
        }
        parse_obj(&text).unwrap()
    }

    const LOD0: &str = "assets/models/hoodie_lod0.obj";
    const LOD1: &str = "assets/models/hoodie_lod1.obj";
    const LOD3: &str = "assets/models/hoodie_lod3.obj";

    fn setup() -> (SwapController, StateStore, ManualLoader) {
        let config = ConfiguratorConfig::default();
        let store = StateStore::new(ConfiguratorState::from_config(&config).unwrap());
        (
            SwapController::new(config.swap.clone()),
            store,
            ManualLoader::default(),
        )
    }

    fn set_lod(store: &mut StateStore, tier: u8) {
        store.mutate(Topic::Lod, |s| s.model.lod = tier);
    }

    /// Load LOD0 with the given parts and let it settle
    fn settle_initial(
        swap: &mut SwapController,
        store: &mut StateStore,
        loader: &ManualLoader,
        parts: &[&str],
    ) -> f64 {
        swap.update(0.0, store, loader);
        loader.finish_with_parts(LOD0, parts);
        swap.update(0.1, store, loader);
        swap.update(0.2, store, loader);
        assert_eq!(swap.phase(), SwapPhase::Idle);
        0.2
    }

    #[test]
    fn test_full_transition_sequence() {
        let (mut swap, mut store, loader) = setup();
        assert_eq!(swap.phase(), SwapPhase::Idle);

        let events = swap.update(0.0, &mut store, &loader);
        assert!(events.is_empty());
        assert_eq!(swap.phase(), SwapPhase::Loading);
        assert_eq!(*loader.requested.borrow(), vec![LOD0.to_string()]);

        // Still pending: nothing changes
        swap.update(0.05, &mut store, &loader);
        assert_eq!(swap.phase(), SwapPhase::Loading);
        assert!(swap.active().is_none());

        loader.finish_with_parts(LOD0, &["body", "hood", "pocket"]);
        let events = swap.update(0.1, &mut store, &loader);
        assert!(matches!(&events[..], [SwapEvent::Installed { path, parts }]
            if path == LOD0 && parts.len() == 3));
        assert_eq!(swap.phase(), SwapPhase::Restoring);
        assert_eq!(store.read().decal_target, "body");
        assert_eq!(store.read().items.len(), 3);
        assert!(store.read().items.values().all(|c| c == "#ffffff"));

        // Settling delay not yet elapsed
        assert!(swap.update(0.12, &mut store, &loader).is_empty());
        let events = swap.update(0.2, &mut store, &loader);
        assert_eq!(events, vec![SwapEvent::Restored { path: LOD0.into() }]);
        assert_eq!(swap.phase(), SwapPhase::Idle);
        assert_eq!(swap.active().map(|m| m.path()), Some(LOD0));
    }

    #[test]
    fn test_lod_change_disposes_before_loading() {
        let (mut swap, mut store, loader) = setup();
        let t = settle_initial(&mut swap, &mut store, &loader, &["body", "hood"]);

        set_lod(&mut store, 1);
        let events = swap.update(t + 0.1, &mut store, &loader);
        assert_eq!(events, vec![SwapEvent::Disposed { path: LOD0.into() }]);
        assert!(swap.active().is_none());
        assert_eq!(swap.phase(), SwapPhase::Loading);
        assert_eq!(loader.requested.borrow().last().map(|s| s.as_str()), Some(LOD1));
    }

    #[test]
    fn test_superseding_swap_installs_only_latest() {
        let (mut swap, mut store, loader) = setup();
        swap.update(0.0, &mut store, &loader);
        assert_eq!(swap.phase(), SwapPhase::Loading);

        // Second trigger while the first is still loading
        set_lod(&mut store, 3);
        swap.update(0.1, &mut store, &loader);
        assert_eq!(swap.orphan_count(), 1);
        assert_eq!(swap.target_path(), Some(LOD3));

        loader.finish_with_parts(LOD3, &["body", "hood"]);
        let events = swap.update(0.2, &mut store, &loader);
        assert!(matches!(&events[..], [SwapEvent::Installed { path, .. }] if path == LOD3));

        // The first load lands late and must not be installed
        loader.finish_with_parts(LOD0, &["body", "hood", "pocket"]);
        let events = swap.update(0.3, &mut store, &loader);
        assert!(events.contains(&SwapEvent::Stale { path: LOD0.into() }));
        assert!(!events
            .iter()
            .any(|e| matches!(e, SwapEvent::Installed { .. })));
        assert_eq!(swap.orphan_count(), 0);
        assert_eq!(swap.active().map(|m| m.path()), Some(LOD3));
        assert_eq!(store.read().items.len(), 2);
        assert_eq!(swap.phase(), SwapPhase::Idle);
    }

    #[test]
    fn test_stale_completion_before_latest_is_noop() {
        let (mut swap, mut store, loader) = setup();
        swap.update(0.0, &mut store, &loader);
        set_lod(&mut store, 1);
        swap.update(0.1, &mut store, &loader);

        loader.finish_with_parts(LOD0, &["body"]);
        let events = swap.update(0.2, &mut store, &loader);
        assert_eq!(events, vec![SwapEvent::Stale { path: LOD0.into() }]);
        assert!(swap.active().is_none());
        assert!(store.read().items.is_empty());
        assert_eq!(swap.phase(), SwapPhase::Loading);
    }

    #[test]
    fn test_selection_survives_lod_swap() {
        let (mut swap, mut store, loader) = setup();
        let t = settle_initial(&mut swap, &mut store, &loader, &["body", "hood", "pocket"]);
        store.mutate(Topic::Selection, |s| s.focus_part("hood"));
        store.mutate(Topic::Items, |s| s.set_part_color("hood", "#123456".into()));

        set_lod(&mut store, 1);
        swap.update(t + 0.1, &mut store, &loader);
        loader.finish_with_parts(LOD1, &["body", "hood", "pocket"]);
        swap.update(t + 0.2, &mut store, &loader);
        assert_eq!(store.read().decal_target, "hood");
        swap.update(t + 0.3, &mut store, &loader);

        let state = store.read();
        assert_eq!(state.decal_target, "hood");
        assert_eq!(state.selected_mesh.as_deref(), Some("hood"));
        assert_eq!(state.outlined_mesh.as_deref(), Some("hood"));
        assert_eq!(state.items["hood"], "#123456");
    }

    #[test]
    fn test_missing_target_falls_back_to_first_part() {
        let (mut swap, mut store, loader) = setup();
        let t = settle_initial(&mut swap, &mut store, &loader, &["body", "hood", "pocket"]);
        store.mutate(Topic::Selection, |s| s.focus_part("pocket"));

        set_lod(&mut store, 3);
        swap.update(t + 0.1, &mut store, &loader);
        loader.finish_with_parts(LOD3, &["hood", "body"]);
        swap.update(t + 0.2, &mut store, &loader);
        swap.update(t + 0.3, &mut store, &loader);

        let state = store.read();
        assert_eq!(state.decal_target, "hood");
        assert_eq!(state.selected_mesh, None);
        assert_eq!(state.outlined_mesh, None);
    }

    #[test]
    fn test_model_switch_resets_colors() {
        let config = ConfiguratorConfig::default();
        let (mut swap, mut store, loader) = setup();
        let t = settle_initial(&mut swap, &mut store, &loader, &["body", "hood"]);
        store.mutate(Topic::Items, |s| s.set_part_color("body", "#ff0000".into()));

        let crew = config.model("Crewneck").unwrap();
        store.mutate(Topic::Model, |s| s.switch_model(crew));
        swap.update(t + 0.1, &mut store, &loader);
        loader.finish_with_parts("assets/models/crewneck_lod0.obj", &["body", "collar"]);
        swap.update(t + 0.2, &mut store, &loader);

        assert_eq!(store.read().items["body"], "#ffffff");
        assert_eq!(store.read().items.len(), 2);
    }

    #[test]
    fn test_model_switch_superseded_by_lod_still_resets_colors() {
        let config = ConfiguratorConfig::default();
        let (mut swap, mut store, loader) = setup();
        let t = settle_initial(&mut swap, &mut store, &loader, &["body", "hood"]);
        store.mutate(Topic::Items, |s| s.set_part_color("body", "#ff0000".into()));
        store.mutate(Topic::Material, |s| {
            s.material.assigned.insert("body".into(), "denim".into());
        });

        let crew = config.model("Crewneck").unwrap();
        store.mutate(Topic::Model, |s| s.switch_model(crew));
        swap.update(t + 0.1, &mut store, &loader);
        assert_eq!(swap.phase(), SwapPhase::Loading);

        // Tier change lands while the crewneck is still loading
        set_lod(&mut store, 1);
        swap.update(t + 0.2, &mut store, &loader);
        assert_eq!(swap.target_path(), Some("assets/models/crewneck_lod1.obj"));

        loader.finish_with_parts("assets/models/crewneck_lod1.obj", &["body", "collar"]);
        swap.update(t + 0.3, &mut store, &loader);

        let state = store.read();
        assert_eq!(state.items["body"], "#ffffff");
        assert_eq!(state.items["collar"], "#ffffff");
        assert_ne!(state.material.current, "denim");
        assert_eq!(state.material.assigned["body"], state.material.current);
    }

    #[test]
    fn test_lod_changes_superseding_each_other_keep_colors() {
        let (mut swap, mut store, loader) = setup();
        let t = settle_initial(&mut swap, &mut store, &loader, &["body", "hood"]);
        store.mutate(Topic::Items, |s| s.set_part_color("body", "#ff0000".into()));

        set_lod(&mut store, 1);
        swap.update(t + 0.1, &mut store, &loader);
        set_lod(&mut store, 3);
        swap.update(t + 0.2, &mut store, &loader);
        loader.finish_with_parts(LOD3, &["body", "hood"]);
        swap.update(t + 0.3, &mut store, &loader);

        assert_eq!(store.read().items["body"], "#ff0000");
    }

    #[test]
    fn test_failed_load_returns_to_idle_and_waits() {
        let (mut swap, mut store, loader) = setup();
        let t = settle_initial(&mut swap, &mut store, &loader, &["body"]);

        set_lod(&mut store, 1);
        swap.update(t + 0.1, &mut store, &loader);
        loader.finish(
            LOD1,
            Err(ModelLoadError::Io {
                path: LOD1.into(),
                reason: "404".into(),
            }),
        );
        let events = swap.update(t + 0.2, &mut store, &loader);
        assert!(matches!(&events[..], [SwapEvent::Failed { .. }]));
        assert_eq!(swap.phase(), SwapPhase::Idle);
        assert!(swap.active().is_none());
        assert!(store.read().items.is_empty());
        assert!(store.read().decal_target.is_empty());

        // No retry loop on the failed path
        swap.update(t + 0.3, &mut store, &loader);
        assert_eq!(swap.phase(), SwapPhase::Idle);
        assert_eq!(loader.requested.borrow().len(), 2);

        // The next trigger recovers
        set_lod(&mut store, 0);
        swap.update(t + 0.4, &mut store, &loader);
        loader.finish_with_parts(LOD0, &["body"]);
        swap.update(t + 0.5, &mut store, &loader);
        assert_eq!(swap.active().map(|m| m.path()), Some(LOD0));
    }

    #[test]
    fn test_hung_load_times_out() {
        let (mut swap, mut store, loader) = setup();
        swap.update(0.0, &mut store, &loader);
        swap.update(5.0, &mut store, &loader);
        assert_eq!(swap.phase(), SwapPhase::Loading);

        let events = swap.update(10.5, &mut store, &loader);
        assert!(matches!(
            &events[..],
            [SwapEvent::Failed {
                error: ModelLoadError::Timeout { .. }
            }]
        ));
        assert_eq!(swap.phase(), SwapPhase::Idle);
        assert_eq!(swap.orphan_count(), 1);

        // The hung load finally answers and is thrown away
        loader.finish_with_parts(LOD0, &["body"]);
        let events = swap.update(11.0, &mut store, &loader);
        assert_eq!(events, vec![SwapEvent::Stale { path: LOD0.into() }]);
        assert_eq!(swap.orphan_count(), 0);
        assert!(swap.active().is_none());
    }

    #[test]
    fn test_request_same_path_is_ignored() {
        let (mut swap, mut store, loader) = setup();
        settle_initial(&mut swap, &mut store, &loader, &["body"]);
        let again = SwapRequest {
            path: LOD0.into(),
            model: "Hoodie".into(),
        };
        assert!(!swap.request(again));
        assert_eq!(swap.phase(), SwapPhase::Idle);
    }

    #[test]
    fn test_teardown_disposes_everything() {
        let (mut swap, mut store, loader) = setup();
        let t = settle_initial(&mut swap, &mut store, &loader, &["body"]);
        set_lod(&mut store, 1);
        swap.update(t + 0.1, &mut store, &loader);
        set_lod(&mut store, 2);
        swap.update(t + 0.2, &mut store, &loader);
        assert_eq!(swap.orphan_count(), 1);

        swap.teardown();
        assert!(swap.active().is_none());
        assert_eq!(swap.orphan_count(), 0);
        assert_eq!(swap.phase(), SwapPhase::Idle);
        swap.teardown();
    }
}
