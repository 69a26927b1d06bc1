//! Animation resource registry.
//!
//! All frames of every clip live in one shared, append-only array. A clip is
//! just a named `start..start + len` range into it, so defining a clip never
//! moves or invalidates the frames of clips defined before it. There is no
//! removal: dropping a single clip would shift the ranges of every clip after
//! it. Reload the whole store instead.
//!
//! Systems look up a clip by its string key and resolve a playback cursor to
//! the [`Frame`] that should be shown.

use std::ops::Range;
use std::sync::Arc;

use bevy_ecs::prelude::Resource;
use log::{debug, info};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::components::flipbook::Flipbook;

/// One frame of a flipbook: a sub-region of a texture.
///
/// The store never looks inside a frame; it only copies and indexes it.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Texture key owned by the graphics layer.
    pub tex_key: Arc<str>,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Frame {
    pub fn new(tex_key: impl Into<Arc<str>>, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            tex_key: tex_key.into(),
            x,
            y,
            width,
            height,
        }
    }
}

/// A named, contiguous range of frames in the shared frame array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationClip {
    pub name: String,
    pub start: usize,
    pub len: usize,
    /// When false the clip stops on its last frame instead of wrapping.
    pub looped: bool,
}

impl AnimationClip {
    /// Range of this clip inside [`AnimationStore::frames`].
    pub fn range(&self) -> Range<usize> {
        self.start..self.start + self.len
    }

    /// Map an unbounded playback cursor to an offset inside the clip.
    ///
    /// Looping clips wrap with modulo, one-shot clips clamp on the last frame.
    /// Returns `None` for empty clips.
    pub fn frame_offset(&self, cursor: usize) -> Option<usize> {
        if self.len == 0 {
            return None;
        }
        if self.looped {
            Some(cursor % self.len)
        } else {
            Some(cursor.min(self.len - 1))
        }
    }
}

/// Outcome of a single playback step, see [`AnimationStore::tick_flipbook`].
#[derive(Debug, Clone, PartialEq)]
pub struct FlipbookStep {
    /// Frame that should be displayed after the step.
    pub frame: Frame,
    /// Set once, on the step where a one-shot clip reaches its last frame.
    pub finished: bool,
}

/// Central registry of flipbook clips keyed by string IDs.
#[derive(Resource, Debug, Default)]
pub struct AnimationStore {
    frames: Vec<Frame>,
    clips: Vec<AnimationClip>,
    names: FxHashMap<String, usize>,
}

impl AnimationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `frames` to the shared array and record a clip spanning them.
    ///
    /// Redefining an existing name points it at the new clip; the old frames
    /// stay in the array. Empty clips are accepted but never display anything.
    pub fn define_clip(&mut self, name: impl Into<String>, frames: &[Frame], looped: bool) {
        let name = name.into();
        let start = self.frames.len();
        self.frames.extend_from_slice(frames);
        self.clips.push(AnimationClip {
            name: name.clone(),
            start,
            len: frames.len(),
            looped,
        });
        if self.names.insert(name.clone(), self.clips.len() - 1).is_some() {
            debug!("animation clip '{}' redefined", name);
        }
    }

    /// Look up a clip and the slice of frames it spans.
    pub fn resolve(&self, name: &str) -> Option<(&AnimationClip, &[Frame])> {
        let clip = self.clips.get(*self.names.get(name)?)?;
        Some((clip, &self.frames[clip.range()]))
    }

    /// Frame shown by clip `name` at playback `cursor`.
    pub fn frame_at(&self, name: &str, cursor: usize) -> Option<&Frame> {
        let (clip, frames) = self.resolve(name)?;
        frames.get(clip.frame_offset(cursor)?)
    }

    /// Advance one playback record by `dt` seconds and resolve its frame.
    ///
    /// At most one frame is stepped per call, however large `dt` is.
    /// Returns `None` when the clip is unknown or empty; the record is left
    /// untouched in that case.
    pub fn tick_flipbook(&self, flipbook: &mut Flipbook, dt: f32) -> Option<FlipbookStep> {
        let (clip, frames) = self.resolve(&flipbook.clip_key)?;
        clip.frame_offset(flipbook.frame_index)?;

        if flipbook.running {
            flipbook.elapsed_time += dt;
            if flipbook.elapsed_time >= flipbook.rate {
                flipbook.frame_index += 1;
                flipbook.elapsed_time = 0.0;
            }
        }

        let mut finished = false;
        if !clip.looped && flipbook.frame_index >= clip.len - 1 {
            flipbook.frame_index = clip.len - 1;
            if flipbook.running {
                flipbook.running = false;
                finished = !flipbook.finished;
                flipbook.finished = true;
            }
        }

        let offset = clip.frame_offset(flipbook.frame_index)?;
        Some(FlipbookStep {
            frame: frames[offset].clone(),
            finished,
        })
    }

    /// Names of all reachable clips, in definition order.
    pub fn clip_names(&self) -> impl Iterator<Item = &str> {
        self.clips
            .iter()
            .enumerate()
            .filter(|(i, clip)| self.names.get(&clip.name) == Some(i))
            .map(|(_, clip)| clip.name.as_str())
    }

    /// Number of defined clips, counting shadowed redefinitions.
    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Total number of frames in the shared array.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Drop every clip and frame.
    pub fn clear(&mut self) {
        self.frames.clear();
        self.clips.clear();
        self.names.clear();
    }

    /// Define every clip found in a JSON clip sheet, see [`ClipSheet`].
    pub fn load_from_file(&mut self, path: &str) -> Result<usize, Box<dyn std::error::Error>> {
        let file_content = std::fs::read_to_string(path)?;
        let sheet: ClipSheet = serde_json::from_str(&file_content)?;
        let count = self.load_sheet(&sheet);
        info!("Loaded {} animation clips from {}", count, path);
        Ok(count)
    }

    /// Define every clip of an already parsed sheet.
    pub fn load_sheet(&mut self, sheet: &ClipSheet) -> usize {
        for def in &sheet.clips {
            let frames: Vec<Frame> = def
                .frames
                .iter()
                .map(|f| Frame::new(def.tex_key.as_str(), f.x, f.y, f.w, f.h))
                .collect();
            self.define_clip(def.name.clone(), &frames, def.looped);
        }
        sheet.clips.len()
    }
}

/// JSON description of a set of clips.
///
/// ```json
/// { "clips": [
///     { "name": "walk", "tex_key": "hero", "loop": true,
///       "frames": [ { "x": 0, "y": 0, "w": 16, "h": 16 } ] }
/// ] }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipSheet {
    pub clips: Vec<ClipDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipDef {
    pub name: String,
    pub tex_key: String,
    #[serde(rename = "loop", default)]
    pub looped: bool,
    pub frames: Vec<FrameRect>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FrameRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}
