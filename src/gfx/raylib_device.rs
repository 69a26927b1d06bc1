//! [`GpuDevice`] on top of raylib's rlgl layer.
//!
//! Buffers stay on the CPU side and are streamed through rlgl's batch at
//! submit time, walking the index buffer triangle by triangle. Shaders and
//! textures are real GL objects.
//!
//! Must only be used from the thread that created the raylib window, between
//! `BeginDrawing` and `EndDrawing` for [`GpuDevice::submit`].

use std::ffi::CString;

use log::warn;
use raylib::ffi;
use rustc_hash::FxHashMap;

use crate::gfx::device::{
    BufferHandle, DrawCall, GpuDevice, GpuError, ShaderHandle, TextureHandle, state,
};
use crate::gfx::glyphs::AtlasImage;
use crate::gfx::quadbuffer::{VERTEX_STRIDE, Vertex};

// rlgl.h
const RL_MODELVIEW: i32 = 0x1700;
const RL_PROJECTION: i32 = 0x1701;
const RL_TRIANGLES: i32 = 0x0004;

#[derive(Default)]
pub struct RaylibDevice {
    next_id: u32,
    shaders: FxHashMap<u32, ffi::Shader>,
    textures: FxHashMap<u32, ffi::Texture2D>,
    index_buffers: FxHashMap<u32, Vec<u16>>,
    vertex_buffers: FxHashMap<u32, Vec<Vertex>>,
    projections: FxHashMap<u32, [f32; 16]>,
}

impl RaylibDevice {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

impl GpuDevice for RaylibDevice {
    fn alloc_shader(&mut self, vsh: &str, fsh: &str) -> Result<ShaderHandle, GpuError> {
        let vs = CString::new(vsh).map_err(|e| GpuError::allocation("shader", e.to_string()))?;
        let fs = CString::new(fsh).map_err(|e| GpuError::allocation("shader", e.to_string()))?;
        let shader = unsafe { ffi::LoadShaderFromMemory(vs.as_ptr(), fs.as_ptr()) };
        // raylib falls back to its default shader when compilation fails
        if shader.id == unsafe { ffi::rlGetShaderIdDefault() } {
            return Err(GpuError::allocation("shader", "compile or link error"));
        }
        let id = self.next();
        self.shaders.insert(id, shader);
        Ok(ShaderHandle(id))
    }

    fn alloc_index_buffer(&mut self, indices: &[u16]) -> Result<BufferHandle, GpuError> {
        let id = self.next();
        self.index_buffers.insert(id, indices.to_vec());
        Ok(BufferHandle(id))
    }

    fn alloc_vertex_buffer(
        &mut self,
        size: usize,
        stride: usize,
    ) -> Result<BufferHandle, GpuError> {
        if stride != VERTEX_STRIDE {
            return Err(GpuError::allocation(
                "vertex buffer",
                format!("unsupported stride {}", stride),
            ));
        }
        let id = self.next();
        self.vertex_buffers
            .insert(id, vec![Vertex::default(); size / stride]);
        Ok(BufferHandle(id))
    }

    fn alloc_texture(&mut self, image: &AtlasImage) -> Result<TextureHandle, GpuError> {
        let mut pixels = image.pixels.clone();
        let img = ffi::Image {
            data: pixels.as_mut_ptr().cast(),
            width: image.width as i32,
            height: image.height as i32,
            mipmaps: 1,
            format: ffi::PixelFormat::PIXELFORMAT_UNCOMPRESSED_R8G8B8A8 as i32,
        };
        // the pixels are copied to the GPU; `pixels` can drop afterwards
        let texture = unsafe { ffi::LoadTextureFromImage(img) };
        if texture.id == 0 {
            return Err(GpuError::allocation("texture", "upload failed"));
        }
        let id = self.next();
        self.textures.insert(id, texture);
        Ok(TextureHandle(id))
    }

    fn update_vertex_buffer(
        &mut self,
        buffer: BufferHandle,
        offset: usize,
        data: &[u8],
    ) -> Result<(), GpuError> {
        let storage = self
            .vertex_buffers
            .get_mut(&buffer.0)
            .ok_or(GpuError::UnknownHandle {
                what: "vertex buffer",
                id: buffer.0,
            })?;
        let first = offset / VERTEX_STRIDE;
        let count = data.len() / VERTEX_STRIDE;
        if first + count > storage.len() {
            return Err(GpuError::allocation(
                "vertex upload",
                format!("{} vertices past end of buffer", first + count - storage.len()),
            ));
        }
        for (slot, bytes) in storage[first..first + count]
            .iter_mut()
            .zip(data.chunks_exact(VERTEX_STRIDE))
        {
            *slot = bytemuck::pod_read_unaligned(bytes);
        }
        Ok(())
    }

    fn set_projection(&mut self, program: ShaderHandle, projection: &[f32; 16]) {
        self.projections.insert(program.0, *projection);
    }

    fn submit(&mut self, draw: &DrawCall) {
        let (Some(shader), Some(texture), Some(vertices), Some(indices)) = (
            self.shaders.get(&draw.program.0),
            self.textures.get(&draw.texture.0),
            self.vertex_buffers.get(&draw.vertex_buffer.0),
            self.index_buffers.get(&draw.index_buffer.0),
        ) else {
            warn!("draw call references released resources, skipped");
            return;
        };
        let projection = self.projections.get(&draw.program.0);
        let count = (draw.index_count as usize).min(indices.len());

        unsafe {
            ffi::rlDrawRenderBatchActive();
            if let Some(projection) = projection {
                ffi::rlMatrixMode(RL_PROJECTION);
                ffi::rlPushMatrix();
                ffi::rlLoadIdentity();
                ffi::rlMultMatrixf(projection.as_ptr());
                ffi::rlMatrixMode(RL_MODELVIEW);
                ffi::rlPushMatrix();
                ffi::rlLoadIdentity();
            }
            if draw.state & state::CULL_NONE != 0 {
                ffi::rlDisableBackfaceCulling();
            }
            if draw.state & state::BLEND_ALPHA_NON_PREMULTIPLIED != 0 {
                ffi::BeginBlendMode(ffi::BlendMode::BLEND_ALPHA as i32);
            }
            ffi::BeginShaderMode(*shader);
            ffi::rlSetTexture(texture.id);
            ffi::rlBegin(RL_TRIANGLES);
            for &index in &indices[..count] {
                let Some(v) = vertices.get(index as usize) else {
                    continue;
                };
                let [r, g, b, a] = v.rgba.to_le_bytes();
                ffi::rlColor4ub(r, g, b, a);
                ffi::rlTexCoord2f(v.u, v.v);
                ffi::rlVertex2f(v.x, v.y);
            }
            ffi::rlEnd();
            ffi::rlSetTexture(0);
            ffi::EndShaderMode();
            if draw.state & state::BLEND_ALPHA_NON_PREMULTIPLIED != 0 {
                ffi::EndBlendMode();
            }
            if draw.state & state::CULL_NONE != 0 {
                ffi::rlEnableBackfaceCulling();
            }
            if projection.is_some() {
                ffi::rlDrawRenderBatchActive();
                ffi::rlMatrixMode(RL_PROJECTION);
                ffi::rlPopMatrix();
                ffi::rlMatrixMode(RL_MODELVIEW);
                ffi::rlPopMatrix();
            }
        }
    }

    fn destroy_buffer(&mut self, buffer: BufferHandle) {
        self.index_buffers.remove(&buffer.0);
        self.vertex_buffers.remove(&buffer.0);
    }

    fn destroy_texture(&mut self, texture: TextureHandle) {
        if let Some(tex) = self.textures.remove(&texture.0) {
            unsafe { ffi::UnloadTexture(tex) };
        }
    }

    fn destroy_shader(&mut self, program: ShaderHandle) {
        self.projections.remove(&program.0);
        if let Some(shader) = self.shaders.remove(&program.0) {
            unsafe { ffi::UnloadShader(shader) };
        }
    }
}
