//! Engine configuration resource.
//!
//! Settings loaded from an INI configuration file. Provides defaults for safe
//! startup and methods to load/save configuration.
//!
//! # Configuration File Format
//!
//! ```ini
//! [window]
//! width = 640
//! height = 360
//! target_fps = 60
//!
//! [animation]
//! clips = ./assets/clips.json
//!
//! [debugdraw]
//! enabled = true
//! capacity = 2048
//! atlas = ./assets/font.png
//! anchor_x = 10
//! anchor_y = 339
//! ```

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::info;
use std::path::PathBuf;

use crate::resources::debugdraw::{DEFAULT_CAPACITY, DebugDrawSettings};

/// Default safe values for startup
const DEFAULT_WINDOW_WIDTH: u32 = 640;
const DEFAULT_WINDOW_HEIGHT: u32 = 360;
const DEFAULT_TARGET_FPS: u32 = 60;
const DEFAULT_CONFIG_PATH: &str = "./config.ini";

/// Engine configuration resource.
#[derive(Resource, Debug, Clone)]
pub struct FrameConfig {
    /// Window width in pixels.
    pub window_width: u32,
    /// Window height in pixels.
    pub window_height: u32,
    /// Target frames per second.
    pub target_fps: u32,
    /// JSON clip sheet loaded into the animation store at startup.
    pub clips_path: Option<PathBuf>,
    /// Start with debug drawing on.
    pub debug_enabled: bool,
    /// Vertex pool size of the debug-draw buffer.
    pub debug_capacity: usize,
    /// Glyph atlas image. Missing or unreadable atlases give blank text.
    pub atlas_path: Option<PathBuf>,
    /// Fixed pen anchor; both coordinates must be set to take effect.
    pub anchor_x: Option<f32>,
    pub anchor_y: Option<f32>,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            window_width: DEFAULT_WINDOW_WIDTH,
            window_height: DEFAULT_WINDOW_HEIGHT,
            target_fps: DEFAULT_TARGET_FPS,
            clips_path: None,
            debug_enabled: true,
            debug_capacity: DEFAULT_CAPACITY,
            atlas_path: None,
            anchor_x: None,
            anchor_y: None,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current (default) values.
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(&mut self) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| format!("Failed to load config file: {}", e))?;
        self.apply(&config);

        info!(
            "Loaded config: {}x{} window, fps={}, debug draw={} ({} vertices)",
            self.window_width,
            self.window_height,
            self.target_fps,
            self.debug_enabled,
            self.debug_capacity
        );

        Ok(())
    }

    /// Load configuration from INI text.
    pub fn load_from_str(&mut self, text: &str) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .read(text.to_string())
            .map_err(|e| format!("Failed to parse config: {}", e))?;
        self.apply(&config);
        Ok(())
    }

    fn apply(&mut self, config: &Ini) {
        // [window] section
        if let Some(width) = config.getuint("window", "width").ok().flatten() {
            self.window_width = width as u32;
        }
        if let Some(height) = config.getuint("window", "height").ok().flatten() {
            self.window_height = height as u32;
        }
        if let Some(fps) = config.getuint("window", "target_fps").ok().flatten() {
            self.target_fps = fps as u32;
        }

        // [animation] section
        if let Some(clips) = config.get("animation", "clips") {
            self.clips_path = Some(PathBuf::from(clips));
        }

        // [debugdraw] section
        if let Some(enabled) = config.getbool("debugdraw", "enabled").ok().flatten() {
            self.debug_enabled = enabled;
        }
        if let Some(capacity) = config.getuint("debugdraw", "capacity").ok().flatten() {
            self.debug_capacity = capacity as usize;
        }
        if let Some(atlas) = config.get("debugdraw", "atlas") {
            self.atlas_path = Some(PathBuf::from(atlas));
        }
        if let Some(x) = config.getfloat("debugdraw", "anchor_x").ok().flatten() {
            self.anchor_x = Some(x as f32);
        }
        if let Some(y) = config.getfloat("debugdraw", "anchor_y").ok().flatten() {
            self.anchor_y = Some(y as f32);
        }
    }

    /// Save configuration to the INI file.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> Result<(), String> {
        let mut config = Ini::new();

        // [window] section
        config.set("window", "width", Some(self.window_width.to_string()));
        config.set("window", "height", Some(self.window_height.to_string()));
        config.set("window", "target_fps", Some(self.target_fps.to_string()));

        // [animation] section
        if let Some(clips) = &self.clips_path {
            config.set("animation", "clips", Some(clips.display().to_string()));
        }

        // [debugdraw] section
        config.set("debugdraw", "enabled", Some(self.debug_enabled.to_string()));
        config.set("debugdraw", "capacity", Some(self.debug_capacity.to_string()));
        if let Some(atlas) = &self.atlas_path {
            config.set("debugdraw", "atlas", Some(atlas.display().to_string()));
        }
        if let (Some(x), Some(y)) = (self.anchor_x, self.anchor_y) {
            config.set("debugdraw", "anchor_x", Some(x.to_string()));
            config.set("debugdraw", "anchor_y", Some(y.to_string()));
        }

        config
            .write(&self.config_path)
            .map_err(|e| format!("Failed to save config file: {}", e))?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }

    /// Debug-draw init parameters for the configured window.
    pub fn debug_draw_settings(&self) -> DebugDrawSettings {
        DebugDrawSettings {
            capacity: self.debug_capacity,
            screen_width: self.window_width as f32,
            screen_height: self.window_height as f32,
            anchor: self.anchor_x.zip(self.anchor_y),
        }
    }
}
