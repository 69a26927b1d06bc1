//! ECS resources made available to systems.
//!
//! Overview
//! - `animationstore` – shared frame array and flipbook clips
//! - `debugdraw` – immediate-mode debug-draw context (non-send)
//! - `debugmode` – presence toggles the debug overlay
//! - `frameconfig` – INI-backed engine configuration
//! - `screensize` – current drawing area in pixels
//! - `worldtime` – simulation time and delta
pub mod animationstore;
pub mod debugdraw;
pub mod debugmode;
pub mod frameconfig;
pub mod screensize;
pub mod worldtime;
