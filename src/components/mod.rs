//! ECS components for entities.
//!
//! Submodules overview:
//! - [`flipbook`] – per-entity playback state of a flipbook clip
//! - [`sprite`] – 2D sprite rendering component holding the displayed frame

pub mod flipbook;
pub mod sprite;
