//! Debug overlay systems.
//!
//! - [`debug_overlay`] queues the FPS counter and one line per flipbook
//!   while [`DebugMode`] is present, and keeps the debug viewport in sync
//!   with [`ScreenSize`].
//! - [`debug_draw_next_frame`] uploads and submits the batch. Hosts that
//!   need the flush inside their own drawing scope call
//!   [`DebugDraw::next_frame`] directly instead.

use bevy_ecs::prelude::*;

use crate::components::flipbook::Flipbook;
use crate::components::sprite::Sprite;
use crate::gfx::device::GpuDevice;
use crate::gfx::quadbuffer::{LINE_STEP, pack_rgba};
use crate::resources::debugdraw::DebugDraw;
use crate::resources::debugmode::DebugMode;
use crate::resources::screensize::ScreenSize;
use crate::resources::worldtime::WorldTime;

const PANEL_WIDTH: f32 = 260.0;

/// Queue the debug overlay for this frame.
pub fn debug_overlay<D: GpuDevice + 'static>(
    mut dbg: NonSendMut<DebugDraw<D>>,
    debug_mode: Option<Res<DebugMode>>,
    screen: Res<ScreenSize>,
    time: Res<WorldTime>,
    query: Query<(Entity, &Flipbook, &Sprite)>,
) {
    if screen.is_changed() {
        dbg.set_viewport(screen.w, screen.h);
    }
    if debug_mode.is_none() {
        return;
    }

    let fps = if time.delta > 0.0 {
        (1.0 / time.delta).round() as u32
    } else {
        0
    };
    dbg.draw_fps(fps);

    let mut lines = 0;
    dbg.color(pack_rgba(0xEE, 0xEE, 0xEE, 0xFF));
    for (entity, flipbook, sprite) in query.iter() {
        let tex = sprite.frame.as_ref().map_or("-", |f| &*f.tex_key);
        let state = if flipbook.finished {
            " (finished)"
        } else if flipbook.running {
            ""
        } else {
            " (stopped)"
        };
        dbg.draw_str(&format!(
            "{:?} {} #{} {}{}",
            entity, flipbook.clip_key, flipbook.frame_index, tex, state
        ));
        dbg.line_return();
        lines += 1;
    }

    if lines > 0 {
        // frame the listing; the pen now sits one line below the last entry
        let height = lines as f32 * LINE_STEP;
        dbg.color(pack_rgba(0x40, 0xC0, 0x40, 0xFF));
        dbg.draw_border(-4.0, LINE_STEP - 2.0, PANEL_WIDTH, height + 2.0, 1.0);
    }
}

/// Flush the debug batch for this frame.
pub fn debug_draw_next_frame<D: GpuDevice + 'static>(mut dbg: NonSendMut<DebugDraw<D>>) {
    dbg.next_frame();
}
