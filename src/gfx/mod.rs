//! GPU-facing building blocks of the debug renderer.
//!
//! - [`device`] – the [`GpuDevice`](device::GpuDevice) trait, handles and draw calls
//! - [`glyphs`] – fixed-cell font atlas and glyph UV lookup
//! - [`quadbuffer`] – vertex pool, static index pattern and draw cursor
//! - [`recording`] – headless in-memory device
//! - `raylib_device` – rlgl backend (feature `raylib`)

pub mod device;
pub mod glyphs;
pub mod quadbuffer;
#[cfg(feature = "raylib")]
pub mod raylib_device;
pub mod recording;
