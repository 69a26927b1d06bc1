use bevy_ecs::prelude::Component;

use crate::resources::animationstore::Frame;

/// Sprite is identified by the frame it currently shows and its size in world units.
/// The frame selects both the texture and the sub-region of it to draw; the
/// animation system rewrites it every tick for entities with a
/// [`Flipbook`](crate::components::flipbook::Flipbook).
#[derive(Component, Clone, Debug, Default)]
pub struct Sprite {
    pub frame: Option<Frame>,
    pub width: f32,
    pub height: f32,
}

impl Sprite {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    pub fn set_frame(&mut self, frame: Frame) {
        self.frame = Some(frame);
    }
}
