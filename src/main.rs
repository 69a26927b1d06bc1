//! Aberred Frame demo entry point.
//!
//! Opens a raylib window, plays a couple of flipbook clips and shows them
//! through the debug overlay:
//! - **raylib** for windowing and the rlgl draw path
//! - **bevy_ecs** for entities, resources and the update schedule
//!
//! # Main Loop
//!
//! 1. Load `config.ini`, define clips (from the configured JSON sheet, or
//!    built-in demo clips)
//! 2. Allocate the debug-draw context on the raylib device
//! 3. Each frame: advance time, run the schedule (animation, overlay),
//!    then flush the debug batch inside the drawing scope
//! 4. Release GPU resources before the window closes
//!
//! # Running
//!
//! ```sh
//! cargo run --release --features raylib -- --atlas assets/font.png
//! ```
//!
//! F11 toggles the overlay.

// Do not create console on Windows
#![cfg_attr(target_os = "windows", windows_subsystem = "windows")]

use std::path::PathBuf;

use aberredframe::components::flipbook::Flipbook;
use aberredframe::components::sprite::Sprite;
use aberredframe::events::flipbook::FlipbookFinished;
use aberredframe::gfx::glyphs::AtlasImage;
use aberredframe::gfx::raylib_device::RaylibDevice;
use aberredframe::resources::animationstore::{AnimationStore, Frame};
use aberredframe::resources::debugdraw::DebugDraw;
use aberredframe::resources::debugmode::DebugMode;
use aberredframe::resources::frameconfig::FrameConfig;
use aberredframe::resources::screensize::ScreenSize;
use aberredframe::resources::worldtime::WorldTime;
use aberredframe::systems::animation::animation;
use aberredframe::systems::debugdraw::debug_overlay;
use aberredframe::systems::time::update_world_time;
use bevy_ecs::observer::{Observer, On};
use bevy_ecs::prelude::*;
use clap::Parser;
use log::{info, warn};
use raylib::prelude::*;

/// Aberred Frame: flipbook animation and debug draw demo
#[derive(Parser)]
#[command(version, about = "Flipbook animation and debug-draw demo")]
struct Cli {
    /// INI configuration file.
    #[arg(long, value_name = "PATH", default_value = "./config.ini")]
    config: PathBuf,

    /// Glyph atlas image; overrides the config file.
    #[arg(long, value_name = "PATH")]
    atlas: Option<PathBuf>,
}

fn strip(tex_key: &str, row: f32, count: usize) -> Vec<Frame> {
    (0..count)
        .map(|i| Frame::new(tex_key, i as f32 * 16.0, row * 16.0, 16.0, 16.0))
        .collect()
}

fn on_flipbook_finished(trigger: On<FlipbookFinished>) {
    info!("{:?} finished clip '{}'", trigger.entity, trigger.clip);
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = FrameConfig::with_path(&cli.config);
    if let Err(e) = config.load_from_file() {
        warn!("{}; using defaults", e);
    }
    if cli.atlas.is_some() {
        config.atlas_path = cli.atlas;
    }

    // --------------- Raylib window ---------------
    let (mut rl, thread) = raylib::init()
        .size(config.window_width as i32, config.window_height as i32)
        .resizable()
        .title("Aberred Frame")
        .build();
    rl.set_target_fps(config.target_fps);

    // --------------- ECS world + resources ---------------
    let mut world = World::new();
    world.insert_resource(WorldTime::default());
    world.insert_resource(ScreenSize {
        w: rl.get_screen_width() as f32,
        h: rl.get_screen_height() as f32,
    });
    if config.debug_enabled {
        world.insert_resource(DebugMode {});
    }

    let mut store = AnimationStore::new();
    if let Some(path) = &config.clips_path {
        if let Err(e) = store.load_from_file(&path.to_string_lossy()) {
            warn!("Failed to load clips from {}: {}", path.display(), e);
        }
    }
    if store.resolve("walk").is_none() {
        store.define_clip("walk", &strip("hero", 0.0, 4), true);
    }
    if store.resolve("wave").is_none() {
        store.define_clip("wave", &strip("hero", 1.0, 6), false);
    }
    world.insert_resource(store);

    let atlas = AtlasImage::load_or_blank(config.atlas_path.as_deref());
    let dbg = DebugDraw::new(RaylibDevice::new(), &config.debug_draw_settings(), &atlas);
    world.insert_non_send_resource(dbg);
    world.insert_resource(config);

    world.spawn((Flipbook::new("walk", 0.1), Sprite::new(16.0, 16.0)));
    world.spawn((Flipbook::new("wave", 0.25), Sprite::new(16.0, 16.0)));
    world.spawn(Observer::new(on_flipbook_finished));
    world.flush();

    let mut update = Schedule::default();
    update.add_systems(animation);
    update.add_systems(debug_overlay::<RaylibDevice>.after(animation));

    update
        .initialize(&mut world)
        .expect("Failed to initialize schedule");

    // --------------- Main loop ---------------
    while !rl.window_should_close() {
        if rl.is_key_pressed(KeyboardKey::KEY_F11) {
            if world.contains_resource::<DebugMode>() {
                world.remove_resource::<DebugMode>();
            } else {
                world.insert_resource(DebugMode {});
            }
        }

        let dt = rl.get_frame_time();
        update_world_time(&mut world, dt);

        let (w, h) = (rl.get_screen_width() as f32, rl.get_screen_height() as f32);
        {
            let mut screen = world.resource_mut::<ScreenSize>();
            if screen.w != w || screen.h != h {
                *screen = ScreenSize { w, h };
            }
        }

        update.run(&mut world);

        world.clear_trackers(); // Clear changed components for next frame

        let mut d = rl.begin_drawing(&thread);
        d.clear_background(Color::DARKGRAY);
        world
            .non_send_resource_mut::<DebugDraw<RaylibDevice>>()
            .next_frame();
    }

    // GL objects must go before the window does
    world
        .non_send_resource_mut::<DebugDraw<RaylibDevice>>()
        .shutdown();
}
