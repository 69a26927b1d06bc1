//! Immediate-mode debug drawing.
//!
//! [`DebugDraw`] batches rectangles, borders and text into one
//! [`QuadBuffer`], uploads only the vertices written this frame and submits
//! a single indexed draw above everything else. The index buffer is built
//! and uploaded once at init and never touched again.
//!
//! Typical frame:
//!
//! ```ignore
//! dbg.move_to(20.0, 200.0);
//! dbg.color(0xFF0000FF);
//! dbg.draw_border(0.0, 0.0, 64.0, 64.0, 2.0);
//! dbg.draw_str("player");
//! dbg.next_frame();
//! ```
//!
//! If any GPU allocation fails at init the error is logged and every call
//! becomes a no-op. Hosts that cannot run without debug output use
//! [`DebugDraw::try_new`] instead.
//!
//! Note: This is a non-send resource because the device is tied to the
//! thread owning the graphics context.

use glam::Mat4;
use log::{error, info, warn};

use crate::gfx::device::{
    BufferHandle, DrawCall, GpuDevice, GpuError, ShaderHandle, TextureHandle, state,
};
use crate::gfx::glyphs::AtlasImage;
use crate::gfx::quadbuffer::{
    DebugDrawError, LINE_STEP, QuadBuffer, VERTEX_STRIDE, build_indices, normalize_capacity,
};

/// Largest z-order; debug quads are drawn after all other content.
pub const Z_ORDER: i32 = 0xFFFF >> 1;
/// 2048 vertices, 512 quads.
pub const DEFAULT_CAPACITY: usize = 2048;
/// Left margin of the default pen anchor and of the FPS counter.
pub const MARGIN: f32 = 10.0;
const FPS_COLOR: u32 = 0xFF12_1212;

pub const VERTEX_SHADER: &str = r#"#version 330
in vec3 vertexPosition;
in vec2 vertexTexCoord;
in vec4 vertexColor;
uniform mat4 mvp;
out vec2 fragTexCoord;
out vec4 fragColor;
void main() {
    fragTexCoord = vertexTexCoord;
    fragColor = vertexColor;
    gl_Position = mvp * vec4(vertexPosition.xy, 0.0, 1.0);
}
"#;

/// Texture coordinates with `u > 1` are solid fill.
pub const FRAGMENT_SHADER: &str = r#"#version 330
in vec2 fragTexCoord;
in vec4 fragColor;
uniform sampler2D texture0;
out vec4 finalColor;
void main() {
    if (fragTexCoord.x > 1.5) {
        finalColor = fragColor;
    } else {
        finalColor = vec4(fragColor.rgb, fragColor.a * texture(texture0, fragTexCoord).a);
    }
}
"#;

/// Init parameters, usually built from
/// [`FrameConfig::debug_draw_settings`](crate::resources::frameconfig::FrameConfig::debug_draw_settings).
#[derive(Debug, Clone, PartialEq)]
pub struct DebugDrawSettings {
    /// Vertex pool size; rounded down to whole quads.
    pub capacity: usize,
    pub screen_width: f32,
    pub screen_height: f32,
    /// Fixed pen anchor. `None` keeps it a line and a half below the top-left
    /// corner of the screen.
    pub anchor: Option<(f32, f32)>,
}

impl Default for DebugDrawSettings {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            screen_width: 640.0,
            screen_height: 360.0,
            anchor: None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct GpuResources {
    program: ShaderHandle,
    index_buffer: BufferHandle,
    vertex_buffer: BufferHandle,
    texture: TextureHandle,
}

impl GpuResources {
    /// Allocate everything or nothing.
    fn allocate<D: GpuDevice>(
        device: &mut D,
        capacity: usize,
        atlas: &AtlasImage,
    ) -> Result<Self, GpuError> {
        let program = device.alloc_shader(VERTEX_SHADER, FRAGMENT_SHADER)?;

        let index_buffer = match device.alloc_index_buffer(&build_indices(capacity)) {
            Ok(ib) => ib,
            Err(e) => {
                device.destroy_shader(program);
                return Err(e);
            }
        };

        let vertex_buffer =
            match device.alloc_vertex_buffer(capacity * VERTEX_STRIDE, VERTEX_STRIDE) {
                Ok(vb) => vb,
                Err(e) => {
                    device.destroy_buffer(index_buffer);
                    device.destroy_shader(program);
                    return Err(e);
                }
            };

        let texture = match device.alloc_texture(atlas) {
            Ok(tex) => tex,
            Err(e) => {
                device.destroy_buffer(vertex_buffer);
                device.destroy_buffer(index_buffer);
                device.destroy_shader(program);
                return Err(e);
            }
        };

        Ok(Self {
            program,
            index_buffer,
            vertex_buffer,
            texture,
        })
    }

    fn release<D: GpuDevice>(self, device: &mut D) {
        device.destroy_texture(self.texture);
        device.destroy_buffer(self.vertex_buffer);
        device.destroy_buffer(self.index_buffer);
        device.destroy_shader(self.program);
    }
}

/// Debug-draw context: owns the device, the GPU handles and the quad batch.
pub struct DebugDraw<D: GpuDevice> {
    device: D,
    gpu: Option<GpuResources>,
    buffer: QuadBuffer,
    screen: (f32, f32),
    anchor: Option<(f32, f32)>,
    state: u64,
    dropped_quads: usize,
}

impl<D: GpuDevice> DebugDraw<D> {
    /// Allocate GPU resources; on failure log the error and stay disabled.
    pub fn new(device: D, settings: &DebugDrawSettings, atlas: &AtlasImage) -> Self {
        let mut dbg = Self::disabled(device, settings);
        match GpuResources::allocate(&mut dbg.device, dbg.buffer.capacity(), atlas) {
            Ok(gpu) => {
                dbg.gpu = Some(gpu);
                dbg.set_viewport(settings.screen_width, settings.screen_height);
            }
            Err(e) => error!("Debug draw disabled: {}", e),
        }
        dbg
    }

    /// Like [`new`](Self::new) but hands allocation errors to the caller.
    pub fn try_new(
        mut device: D,
        settings: &DebugDrawSettings,
        atlas: &AtlasImage,
    ) -> Result<Self, GpuError> {
        let capacity = normalize_capacity(settings.capacity);
        let gpu = GpuResources::allocate(&mut device, capacity, atlas)?;
        let mut dbg = Self::disabled(device, settings);
        dbg.gpu = Some(gpu);
        dbg.set_viewport(settings.screen_width, settings.screen_height);
        Ok(dbg)
    }

    fn disabled(device: D, settings: &DebugDrawSettings) -> Self {
        let mut dbg = Self {
            device,
            gpu: None,
            buffer: QuadBuffer::new(settings.capacity),
            screen: (settings.screen_width, settings.screen_height),
            anchor: settings.anchor,
            state: state::BLEND_ALPHA_NON_PREMULTIPLIED | state::CULL_NONE,
            dropped_quads: 0,
        };
        dbg.apply_anchor();
        dbg.buffer.new_frame();
        dbg
    }

    pub fn is_enabled(&self) -> bool {
        self.gpu.is_some()
    }

    pub fn buffer(&self) -> &QuadBuffer {
        &self.buffer
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// Quads rejected this frame because the pool was full.
    pub fn dropped_quads(&self) -> usize {
        self.dropped_quads
    }

    fn apply_anchor(&mut self) {
        let anchor = self
            .anchor
            .unwrap_or((MARGIN, self.screen.1 - LINE_STEP * 1.5));
        self.buffer.set_anchor(anchor.0, anchor.1);
    }

    /// Resize the drawing area; the projection maps `(0, 0)..(w, h)` with
    /// y pointing up.
    pub fn set_viewport(&mut self, w: f32, h: f32) {
        self.screen = (w, h);
        self.apply_anchor();
        let Some(gpu) = self.gpu else {
            return;
        };
        let projection = Mat4::orthographic_rh_gl(0.0, w, 0.0, h, -1.0, 1.0).to_cols_array();
        self.device.set_projection(gpu.program, &projection);
        info!("debug draw viewport {}x{}", w, h);
    }

    pub fn move_to(&mut self, x: f32, y: f32) {
        self.buffer.set_cursor(x, y);
    }

    pub fn line_return(&mut self) {
        self.buffer.line_return();
    }

    /// Set the color of following draws, `0xAABBGGRR`.
    pub fn color(&mut self, rgba: u32) {
        self.buffer.set_color(rgba);
    }

    fn record(&mut self, quads: usize, result: Result<(), DebugDrawError>) {
        if let Err(e) = result {
            if self.dropped_quads == 0 {
                warn!("{}; dropping draws until next frame", e);
            }
            self.dropped_quads += quads;
        }
    }

    pub fn draw_rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        if !self.is_enabled() {
            return;
        }
        let result = self.buffer.rect(x, y, w, h);
        self.record(1, result);
    }

    pub fn draw_border(&mut self, x: f32, y: f32, w: f32, h: f32, thickness: f32) {
        if !self.is_enabled() {
            return;
        }
        let result = self.buffer.border(x, y, w, h, thickness);
        self.record(4, result);
    }

    pub fn draw_str(&mut self, text: &str) {
        self.draw_str_scaled(text, 1.0);
    }

    pub fn draw_str_scaled(&mut self, text: &str, scale: f32) {
        if !self.is_enabled() {
            return;
        }
        let result = self.buffer.string(text, scale);
        self.record(text.chars().count(), result);
    }

    /// Frame counter in the bottom-left corner. Pen and color are preserved.
    pub fn draw_fps(&mut self, fps: u32) {
        let pen = self.buffer.pen();
        let color = self.buffer.color();

        self.buffer.set_cursor(MARGIN, MARGIN);
        self.buffer.set_color(FPS_COLOR);
        self.draw_str(&format!("{} FPS", fps));

        self.buffer.set_cursor(pen.0, pen.1);
        self.buffer.set_color(color);
    }

    /// Start a frame from scratch: rewind the pool, pen to the anchor,
    /// default color.
    pub fn new_frame(&mut self) {
        self.buffer.new_frame();
        self.dropped_quads = 0;
    }

    /// Upload the vertices written this frame, submit one draw and rewind.
    pub fn next_frame(&mut self) {
        if let Some(gpu) = self.gpu {
            self.flush(gpu);
        }
        self.buffer.reset();
        self.dropped_quads = 0;
    }

    fn flush(&mut self, gpu: GpuResources) {
        let written = self.buffer.write_position();
        if written == 0 {
            return;
        }
        if let Err(e) =
            self.device
                .update_vertex_buffer(gpu.vertex_buffer, 0, self.buffer.dirty_bytes())
        {
            error!("debug draw upload failed: {}", e);
            return;
        }
        self.device.submit(&DrawCall {
            program: gpu.program,
            texture: gpu.texture,
            vertex_buffer: gpu.vertex_buffer,
            vertex_count: written as u32,
            index_buffer: gpu.index_buffer,
            index_count: self.buffer.index_count() as u32,
            state: self.state,
            z_order: Z_ORDER,
        });
    }

    /// Release GPU resources. Further calls are no-ops.
    pub fn shutdown(&mut self) {
        if let Some(gpu) = self.gpu.take() {
            gpu.release(&mut self.device);
            info!("debug draw shut down");
        }
    }
}

impl<D: GpuDevice> Drop for DebugDraw<D> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
