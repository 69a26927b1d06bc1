use bevy_ecs::prelude::Component;

/// Default seconds per frame for new flipbooks.
pub const DEFAULT_FRAME_RATE: f32 = 0.1;

/// Per-entity playback state of a flipbook clip.
///
/// `frame_index` is an unbounded cursor; it is reduced against the clip's
/// length only when the frame is resolved, see
/// [`AnimationClip::frame_offset`](crate::resources::animationstore::AnimationClip::frame_offset).
#[derive(Debug, Clone, Component)]
pub struct Flipbook {
    /// Key of the clip in [`AnimationStore`](crate::resources::animationstore::AnimationStore).
    pub clip_key: String,
    pub frame_index: usize,
    pub elapsed_time: f32,
    pub running: bool,
    /// Seconds each frame stays on screen.
    pub rate: f32,
    /// Set once a one-shot clip has reached its last frame.
    pub finished: bool,
}

impl Flipbook {
    pub fn new(clip_key: impl Into<String>, rate: f32) -> Self {
        Self {
            clip_key: clip_key.into(),
            frame_index: 0,
            elapsed_time: 0.0,
            running: true,
            rate,
            finished: false,
        }
    }

    /// Switch to another clip and restart from its first frame.
    pub fn play(&mut self, clip_key: impl Into<String>) {
        self.clip_key = clip_key.into();
        self.frame_index = 0;
        self.elapsed_time = 0.0;
        self.running = true;
        self.finished = false;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Continue from the current frame. A finished one-shot clip replays
    /// from its first frame instead.
    pub fn resume(&mut self) {
        if self.finished {
            self.frame_index = 0;
            self.elapsed_time = 0.0;
            self.finished = false;
        }
        self.running = true;
    }

    pub fn with_rate(mut self, rate: f32) -> Self {
        self.rate = rate;
        self
    }

    pub fn paused(mut self) -> Self {
        self.running = false;
        self
    }
}

impl Default for Flipbook {
    fn default() -> Self {
        Self::new("", DEFAULT_FRAME_RATE)
    }
}
