//! Headless [`GpuDevice`] that keeps every resource in memory.
//!
//! Used by tests and by hosts running without a window. Uploaded bytes,
//! submitted draws and destroyed handles are all kept so they can be
//! inspected after the fact.

use rustc_hash::FxHashMap;

use crate::gfx::device::{
    BufferHandle, DrawCall, GpuDevice, GpuError, ShaderHandle, TextureHandle,
};
use crate::gfx::glyphs::AtlasImage;

/// Which allocation kinds should fail, for exercising error paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailOn {
    pub shader: bool,
    pub index_buffer: bool,
    pub vertex_buffer: bool,
    pub texture: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destroyed {
    Buffer(BufferHandle),
    Texture(TextureHandle),
    Shader(ShaderHandle),
}

#[derive(Debug, Default)]
pub struct RecordingDevice {
    next_id: u32,
    pub fail_on: FailOn,
    pub index_buffers: FxHashMap<u32, Vec<u16>>,
    pub vertex_buffers: FxHashMap<u32, Vec<u8>>,
    pub textures: FxHashMap<u32, AtlasImage>,
    pub shaders: FxHashMap<u32, (String, String)>,
    pub projections: Vec<(ShaderHandle, [f32; 16])>,
    /// `(buffer, offset, len)` of every vertex upload.
    pub uploads: Vec<(BufferHandle, usize, usize)>,
    pub draws: Vec<DrawCall>,
    pub destroyed: Vec<Destroyed>,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(fail_on: FailOn) -> Self {
        Self {
            fail_on,
            ..Self::default()
        }
    }

    fn next(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    /// Last submitted draw, if any.
    pub fn last_draw(&self) -> Option<&DrawCall> {
        self.draws.last()
    }

    /// Number of live (allocated and not destroyed) resources.
    pub fn live_resources(&self) -> usize {
        self.index_buffers.len() + self.vertex_buffers.len() + self.textures.len() + self.shaders.len()
    }
}

impl GpuDevice for RecordingDevice {
    fn alloc_shader(&mut self, vsh: &str, fsh: &str) -> Result<ShaderHandle, GpuError> {
        if self.fail_on.shader {
            return Err(GpuError::allocation("shader", "compile error"));
        }
        let id = self.next();
        self.shaders.insert(id, (vsh.to_string(), fsh.to_string()));
        Ok(ShaderHandle(id))
    }

    fn alloc_index_buffer(&mut self, indices: &[u16]) -> Result<BufferHandle, GpuError> {
        if self.fail_on.index_buffer {
            return Err(GpuError::allocation("index buffer", "out of memory"));
        }
        let id = self.next();
        self.index_buffers.insert(id, indices.to_vec());
        Ok(BufferHandle(id))
    }

    fn alloc_vertex_buffer(
        &mut self,
        size: usize,
        _stride: usize,
    ) -> Result<BufferHandle, GpuError> {
        if self.fail_on.vertex_buffer {
            return Err(GpuError::allocation("vertex buffer", "out of memory"));
        }
        let id = self.next();
        self.vertex_buffers.insert(id, vec![0; size]);
        Ok(BufferHandle(id))
    }

    fn alloc_texture(&mut self, image: &AtlasImage) -> Result<TextureHandle, GpuError> {
        if self.fail_on.texture {
            return Err(GpuError::allocation("texture", "unsupported format"));
        }
        let id = self.next();
        self.textures.insert(id, image.clone());
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
        let end = offset + data.len();
        if end > storage.len() {
            return Err(GpuError::allocation(
                "vertex upload",
                format!("{} bytes past end of {} byte buffer", end, storage.len()),
            ));
        }
        storage[offset..end].copy_from_slice(data);
        self.uploads.push((buffer, offset, data.len()));
        Ok(())
    }

    fn set_projection(&mut self, program: ShaderHandle, projection: &[f32; 16]) {
        self.projections.push((program, *projection));
    }

    fn submit(&mut self, draw: &DrawCall) {
        self.draws.push(*draw);
    }

    fn destroy_buffer(&mut self, buffer: BufferHandle) {
        self.index_buffers.remove(&buffer.0);
        self.vertex_buffers.remove(&buffer.0);
        self.destroyed.push(Destroyed::Buffer(buffer));
    }

    fn destroy_texture(&mut self, texture: TextureHandle) {
        self.textures.remove(&texture.0);
        self.destroyed.push(Destroyed::Texture(texture));
    }

    fn destroy_shader(&mut self, program: ShaderHandle) {
        self.shaders.remove(&program.0);
        self.destroyed.push(Destroyed::Shader(program));
    }
}
