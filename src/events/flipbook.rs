//! Flipbook playback events.
//!
//! When a one-shot clip (`loop = false`) reaches its last frame, the
//! animation system triggers a [`FlipbookFinished`] event. Looping clips
//! never emit it.
//!
//! # Example
//!
//! ```ignore
//! commands.add_observer(|trigger: On<FlipbookFinished>, mut commands: Commands| {
//!     if trigger.clip == "die" {
//!         commands.entity(trigger.entity).despawn();
//!     }
//! });
//! ```

use bevy_ecs::prelude::*;

/// Event emitted once when a non-looping clip stops on its last frame.
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct FlipbookFinished {
    /// The entity whose flipbook finished.
    pub entity: Entity,
    /// Key of the clip that finished.
    pub clip: String,
}
