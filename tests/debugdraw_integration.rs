//! Debug-draw integration tests.
//!
//! Exercises `DebugDraw` on the headless `RecordingDevice`, both directly
//! and through the overlay systems in a bevy `World`.

use std::cell::RefCell;
use std::rc::Rc;

use bevy_ecs::prelude::*;

use aberredframe::components::flipbook::Flipbook;
use aberredframe::components::sprite::Sprite;
use aberredframe::gfx::device::{
    BufferHandle, DrawCall, GpuDevice, GpuError, ShaderHandle, TextureHandle, state,
};
use aberredframe::gfx::glyphs::AtlasImage;
use aberredframe::gfx::quadbuffer::{QUAD_INDICES, Vertex, VERTEX_STRIDE};
use aberredframe::gfx::recording::RecordingDevice;
use aberredframe::resources::animationstore::{AnimationStore, Frame};
use aberredframe::resources::debugdraw::{DebugDraw, DebugDrawSettings, Z_ORDER};
use aberredframe::resources::debugmode::DebugMode;
use aberredframe::resources::screensize::ScreenSize;
use aberredframe::resources::worldtime::WorldTime;
use aberredframe::systems::animation::animation;
use aberredframe::systems::debugdraw::{debug_draw_next_frame, debug_overlay};
use aberredframe::systems::time::update_world_time;

fn settings(capacity: usize) -> DebugDrawSettings {
    DebugDrawSettings {
        capacity,
        screen_width: 640.0,
        screen_height: 360.0,
        anchor: None,
    }
}

fn new_dbg(capacity: usize) -> DebugDraw<RecordingDevice> {
    DebugDraw::new(
        RecordingDevice::new(),
        &settings(capacity),
        &AtlasImage::blank(16, 6),
    )
}

/// Vertices currently stored in the device's only vertex buffer.
fn uploaded(dev: &RecordingDevice) -> Vec<Vertex> {
    let bytes = dev.vertex_buffers.values().next().unwrap();
    bytes
        .chunks_exact(VERTEX_STRIDE)
        .map(bytemuck::pod_read_unaligned)
        .collect()
}

#[test]
fn quad_and_index_counts_follow_draw_calls() {
    let mut dbg = new_dbg(2048);
    dbg.draw_rect(0.0, 0.0, 10.0, 10.0);
    dbg.draw_str("hello");
    dbg.draw_rect(5.0, 5.0, 1.0, 1.0);

    let n = 1 + 5 + 1;
    assert_eq!(dbg.buffer().write_position(), 4 * n);
    dbg.next_frame();

    let draw = *dbg.device().last_draw().unwrap();
    assert_eq!(draw.vertex_count as usize, 4 * n);
    assert_eq!(draw.index_count as usize, 6 * n);
    assert_eq!(draw.z_order, Z_ORDER);
    assert_ne!(draw.state & state::BLEND_ALPHA_NON_PREMULTIPLIED, 0);
}

#[test]
fn static_index_buffer_matches_pattern() {
    let dbg = new_dbg(2048);
    let indices = dbg.device().index_buffers.values().next().unwrap();
    assert_eq!(indices.len(), 2048 * 6 / 4);
    for (quad, chunk) in indices.chunks(6).enumerate() {
        for (k, index) in chunk.iter().enumerate() {
            assert_eq!(*index as usize, QUAD_INDICES[k] as usize + 4 * quad);
        }
    }
}

#[test]
fn upload_covers_only_dirty_range() {
    let mut dbg = new_dbg(2048);
    dbg.draw_rect(0.0, 0.0, 10.0, 10.0);
    dbg.draw_rect(0.0, 0.0, 10.0, 10.0);
    dbg.next_frame();

    let (_, offset, len) = dbg.device().uploads[0];
    assert_eq!(offset, 0);
    assert_eq!(len, 8 * VERTEX_STRIDE);
}

#[test]
fn empty_frame_submits_nothing() {
    let mut dbg = new_dbg(64);
    dbg.next_frame();
    assert!(dbg.device().draws.is_empty());
    assert!(dbg.device().uploads.is_empty());
}

#[test]
fn next_frame_resets_cursor_regardless_of_volume() {
    let mut dbg = new_dbg(64);
    let anchor = dbg.buffer().anchor();
    for _ in 0..30 {
        dbg.draw_str("overflowing");
    }
    dbg.move_to(300.0, 3.0);
    dbg.next_frame();

    assert_eq!(dbg.buffer().write_position(), 0);
    assert_eq!(dbg.buffer().pen(), anchor);

    dbg.draw_rect(0.0, 0.0, 1.0, 1.0);
    dbg.new_frame();
    assert_eq!(dbg.buffer().write_position(), 0);
    assert_eq!(dbg.buffer().pen(), anchor);
}

#[test]
fn overflow_keeps_previous_content() {
    let mut dbg = new_dbg(8);
    dbg.move_to(1.0, 1.0);
    dbg.draw_rect(0.0, 0.0, 2.0, 2.0);
    dbg.draw_str("no room");
    dbg.draw_rect(10.0, 10.0, 2.0, 2.0);
    assert_eq!(dbg.dropped_quads(), 7);
    dbg.next_frame();

    let verts = uploaded(dbg.device());
    assert_eq!((verts[1].x, verts[1].y), (1.0, 1.0));
    assert_eq!((verts[5].x, verts[5].y), (11.0, 11.0));
    assert_eq!(dbg.device().last_draw().unwrap().index_count, 12);
}

#[test]
fn frames_overwrite_previous_vertices() {
    let mut dbg = new_dbg(64);
    dbg.move_to(0.0, 0.0);
    dbg.draw_rect(0.0, 0.0, 4.0, 4.0);
    dbg.draw_rect(0.0, 0.0, 4.0, 4.0);
    dbg.next_frame();

    dbg.move_to(0.0, 0.0);
    dbg.draw_rect(100.0, 100.0, 4.0, 4.0);
    dbg.next_frame();

    let draw = *dbg.device().last_draw().unwrap();
    assert_eq!(draw.vertex_count, 4);
    assert_eq!(uploaded(dbg.device())[1].x, 100.0);
}

#[test]
fn viewport_updates_projection_and_anchor() {
    let mut dbg = new_dbg(64);
    dbg.set_viewport(800.0, 600.0);

    let (_, projection) = *dbg.device().projections.last().unwrap();
    // orthographic (0..800, 0..600): x scale 2/w, y scale 2/h
    assert!((projection[0] - 2.0 / 800.0).abs() < 1e-7);
    assert!((projection[5] - 2.0 / 600.0).abs() < 1e-7);
    assert!((projection[12] + 1.0).abs() < 1e-6);
    assert_eq!(dbg.buffer().anchor(), (10.0, 600.0 - 21.0));
}

#[test]
fn fixed_anchor_survives_viewport_change() {
    let mut s = settings(64);
    s.anchor = Some((3.0, 4.0));
    let mut dbg = DebugDraw::new(RecordingDevice::new(), &s, &AtlasImage::blank(16, 6));
    dbg.set_viewport(1024.0, 768.0);
    dbg.next_frame();
    assert_eq!(dbg.buffer().pen(), (3.0, 4.0));
}

fn overlay_world() -> (World, Schedule) {
    let mut store = AnimationStore::new();
    let frames: Vec<Frame> = (0..4)
        .map(|i| Frame::new("hero", i as f32 * 16.0, 0.0, 16.0, 16.0))
        .collect();
    store.define_clip("walk", &frames, true);

    let mut world = World::new();
    world.insert_resource(WorldTime::default());
    world.insert_resource(ScreenSize { w: 640.0, h: 360.0 });
    world.insert_resource(store);
    world.insert_non_send_resource(new_dbg(2048));
    world.spawn((Flipbook::new("walk", 0.1), Sprite::new(16.0, 16.0)));

    let mut schedule = Schedule::default();
    schedule.add_systems(animation);
    schedule.add_systems(debug_overlay::<RecordingDevice>.after(animation));
    schedule.add_systems(debug_draw_next_frame::<RecordingDevice>.after(debug_overlay::<RecordingDevice>));
    (world, schedule)
}

#[test]
fn overlay_draws_only_in_debug_mode() {
    let (mut world, mut schedule) = overlay_world();

    update_world_time(&mut world, 0.016);
    schedule.run(&mut world);
    assert!(
        world
            .non_send_resource::<DebugDraw<RecordingDevice>>()
            .device()
            .draws
            .is_empty()
    );

    world.insert_resource(DebugMode {});
    update_world_time(&mut world, 0.016);
    schedule.run(&mut world);

    let dbg = world.non_send_resource::<DebugDraw<RecordingDevice>>();
    let draw = *dbg.device().last_draw().unwrap();
    // "63 FPS" plus one listing line plus a four-strip border
    assert!(draw.vertex_count as usize > 4 * ("63 FPS".len() + 4));
    assert_eq!(dbg.device().draws.len(), 1);
    assert_eq!(dbg.buffer().write_position(), 0);
}

#[test]
fn overlay_follows_screen_resize() {
    let (mut world, mut schedule) = overlay_world();
    update_world_time(&mut world, 0.016);
    schedule.run(&mut world);

    world.insert_resource(ScreenSize { w: 1280.0, h: 720.0 });
    update_world_time(&mut world, 0.016);
    schedule.run(&mut world);

    let dbg = world.non_send_resource::<DebugDraw<RecordingDevice>>();
    let (_, projection) = *dbg.device().projections.last().unwrap();
    assert!((projection[5] - 2.0 / 720.0).abs() < 1e-7);
    assert_eq!(dbg.buffer().anchor(), (10.0, 720.0 - 21.0));
}

#[test]
fn shutdown_releases_everything() {
    let mut dbg = new_dbg(64);
    dbg.draw_rect(0.0, 0.0, 1.0, 1.0);
    dbg.next_frame();
    dbg.shutdown();
    assert_eq!(dbg.device().live_resources(), 0);
    assert_eq!(dbg.device().destroyed.len(), 4);
}

/// Device whose recorded state outlives the `DebugDraw` that owns it.
#[derive(Clone, Default)]
struct SharedDevice(Rc<RefCell<RecordingDevice>>);

impl GpuDevice for SharedDevice {
    fn alloc_shader(&mut self, vsh: &str, fsh: &str) -> Result<ShaderHandle, GpuError> {
        self.0.borrow_mut().alloc_shader(vsh, fsh)
    }

    fn alloc_index_buffer(&mut self, indices: &[u16]) -> Result<BufferHandle, GpuError> {
        self.0.borrow_mut().alloc_index_buffer(indices)
    }

    fn alloc_vertex_buffer(
        &mut self,
        size: usize,
        stride: usize,
    ) -> Result<BufferHandle, GpuError> {
        self.0.borrow_mut().alloc_vertex_buffer(size, stride)
    }

    fn alloc_texture(&mut self, image: &AtlasImage) -> Result<TextureHandle, GpuError> {
        self.0.borrow_mut().alloc_texture(image)
    }

    fn update_vertex_buffer(
        &mut self,
        buffer: BufferHandle,
        offset: usize,
        data: &[u8],
    ) -> Result<(), GpuError> {
        self.0.borrow_mut().update_vertex_buffer(buffer, offset, data)
    }

    fn set_projection(&mut self, program: ShaderHandle, projection: &[f32; 16]) {
        self.0.borrow_mut().set_projection(program, projection)
    }

    fn submit(&mut self, draw: &DrawCall) {
        self.0.borrow_mut().submit(draw)
    }

    fn destroy_buffer(&mut self, buffer: BufferHandle) {
        self.0.borrow_mut().destroy_buffer(buffer)
    }

    fn destroy_texture(&mut self, texture: TextureHandle) {
        self.0.borrow_mut().destroy_texture(texture)
    }

    fn destroy_shader(&mut self, program: ShaderHandle) {
        self.0.borrow_mut().destroy_shader(program)
    }
}

#[test]
fn drop_releases_everything() {
    let device = SharedDevice::default();
    let mut dbg = DebugDraw::new(device.clone(), &settings(64), &AtlasImage::blank(16, 6));
    dbg.draw_rect(0.0, 0.0, 1.0, 1.0);
    dbg.next_frame();
    assert_eq!(device.0.borrow().live_resources(), 4);

    drop(dbg);
    assert_eq!(device.0.borrow().live_resources(), 0);
    assert_eq!(device.0.borrow().destroyed.len(), 4);
}

#[test]
fn drop_after_shutdown_releases_once() {
    let device = SharedDevice::default();
    let mut dbg = DebugDraw::new(device.clone(), &settings(64), &AtlasImage::blank(16, 6));
    dbg.shutdown();
    drop(dbg);
    assert_eq!(device.0.borrow().destroyed.len(), 4);
}
