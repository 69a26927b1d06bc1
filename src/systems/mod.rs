//! Engine systems.
//!
//! Submodules overview
//! - [`animation`] – advance flipbooks and push the resolved frame onto sprites
//! - [`debugdraw`] – queue the debug overlay and flush the debug batch
//! - [`time`] – update simulation time and delta

pub mod animation;
pub mod debugdraw;
pub mod time;
