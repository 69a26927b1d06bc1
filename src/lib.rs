//! Aberred Frame library.
//!
//! The frame-rendering core of the engine: flipbook sprite animation driven
//! through bevy_ecs, and an immediate-mode debug-draw batch that packs text
//! and rectangles into one vertex buffer for a [`gfx::device::GpuDevice`].
//!
//! Exposed as a library for the demo binary and for integration tests.

pub mod components;
pub mod events;
pub mod gfx;
pub mod resources;
pub mod systems;
