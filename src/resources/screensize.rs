//! Screen size resource.
//!
//! Current drawing area in pixels. The debug overlay compares it against the
//! viewport of [`DebugDraw`](crate::resources::debugdraw::DebugDraw) and
//! re-projects when the window is resized.

use bevy_ecs::prelude::Resource;

/// Current screen size in pixels.
#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct ScreenSize {
    /// Width in pixels.
    pub w: f32,
    /// Height in pixels.
    pub h: f32,
}
