//! drape: a 3D garment configurator
//!
//! Pick a garment, recolor its parts, place a decal, dress it in fabric
//! presets and light it. The model follows the camera through levels of
//! detail, swapping whole meshes as the viewer moves in and out.

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod app;
mod async_ops;
mod color;
mod config;
mod decal;
mod lod;
mod material;
mod model;
mod scene;
mod sidebar;
mod state;
mod storage;
mod swap;
mod ui;

use app::App;
use macroquad::prelude::*;
use material::MaterialLibrary;
use model::FileAssetLoader;

fn window_conf() -> Conf {
    Conf {
        window_title: format!("drape v{}", VERSION),
        window_width: 1600,
        window_height: 900,
        window_resizable: true,
        high_dpi: true,
        // Start windowed on all platforms (WASM: browser handles sizing)
        #[cfg(not(target_arch = "wasm32"))]
        fullscreen: false,
        sample_count: 4,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    // Initialize crash logging FIRST (before any other code)
    #[cfg(not(target_arch = "wasm32"))]
    crashlog::setup!(crashlog::cargo_metadata!().capitalized(), false);

    #[cfg(not(target_arch = "wasm32"))]
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = config::load_config().await;

    // The web build cannot read files on demand, so every tier is fetched up front
    #[cfg(target_arch = "wasm32")]
    let loader = FileAssetLoader::preload(&config.all_model_paths()).await;
    #[cfg(not(target_arch = "wasm32"))]
    let loader = FileAssetLoader::new();

    let materials = MaterialLibrary::load(&config.materials).await;

    let decal_texture = match load_texture(&config.decal_image).await {
        Ok(texture) => {
            texture.set_filter(FilterMode::Linear);
            Some(texture)
        }
        Err(e) => {
            log::warn!("Decal image {} not loaded: {}", config.decal_image, e);
            None
        }
    };

    let Some(mut app) = App::new(config, loader, materials, decal_texture) else {
        log::error!("The model catalog is empty, nothing to show");
        return;
    };

    log::info!("=== drape v{} ===", VERSION);

    loop {
        app.frame();
        next_frame().await;
    }
}
