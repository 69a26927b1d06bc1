//! Animation systems.
//!
//! - [`animation`] advances every flipbook by the frame delta and pushes the
//!   resolved frame onto the entity's [`Sprite`].
//!
//! # Animation Flow
//!
//! 1. Clips are defined in [`AnimationStore`] (one shared frame array, clips are ranges)
//! 2. Entities carry a [`Flipbook`] pointing to a clip key, plus a [`Sprite`]
//! 3. The `animation` system accumulates time, steps the cursor at most once
//!    per tick, and writes `frames[clip.start + cursor mod len]` to the sprite
//! 4. One-shot clips clamp on their last frame and trigger [`FlipbookFinished`]
//!
//! # Related
//!
//! - [`crate::components::flipbook::Flipbook`] – per-entity playback state
//! - [`crate::resources::animationstore::AnimationStore`] – clip definitions

use bevy_ecs::prelude::*;
use log::debug;

use crate::components::flipbook::Flipbook;
use crate::components::sprite::Sprite;
use crate::events::flipbook::FlipbookFinished;
use crate::resources::animationstore::AnimationStore;
use crate::resources::worldtime::WorldTime;

/// Advance flipbook playback and update the sprite frame.
///
/// Contract
/// - Reads [`WorldTime`] for the scaled delta.
/// - Looks up clip data from [`AnimationStore`].
/// - Mutates [`Flipbook`] state and [`Sprite`] frame.
/// - Entities whose clip is unknown or empty are skipped.
pub fn animation(
    mut query: Query<(Entity, &mut Flipbook, &mut Sprite)>,
    animation_store: Res<AnimationStore>,
    time: Res<WorldTime>,
    mut commands: Commands,
) {
    for (entity, mut flipbook, mut sprite) in query.iter_mut() {
        let Some(step) = animation_store.tick_flipbook(&mut flipbook, time.delta) else {
            debug!(
                "entity {:?}: no frames for clip '{}', skipping",
                entity, flipbook.clip_key
            );
            continue;
        };

        // sprite is marked changed only when the shown frame differs
        if sprite.frame.as_ref() != Some(&step.frame) {
            sprite.set_frame(step.frame);
        }

        if step.finished {
            commands.trigger(FlipbookFinished {
                entity,
                clip: flipbook.clip_key.clone(),
            });
        }
    }
}
