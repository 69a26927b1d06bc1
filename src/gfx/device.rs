//! GPU resource interface.
//!
//! The debug renderer never talks to a graphics API directly. It allocates
//! buffers, textures and a shader program through a [`GpuDevice`], updates
//! the vertex buffer once per frame and submits a single [`DrawCall`].
//! Handles are plain ids owned by whoever allocated them and must be
//! destroyed exactly once.

use thiserror::Error;

use crate::gfx::glyphs::AtlasImage;

/// Errors reported by a [`GpuDevice`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GpuError {
    #[error("failed to allocate {what}: {reason}")]
    Allocation { what: &'static str, reason: String },
    #[error("unknown {what} handle {id}")]
    UnknownHandle { what: &'static str, id: u32 },
}

impl GpuError {
    pub fn allocation(what: &'static str, reason: impl Into<String>) -> Self {
        GpuError::Allocation {
            what,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// Render-state bits attached to a draw call.
pub mod state {
    /// Standard `src_alpha, one_minus_src_alpha` blending.
    pub const BLEND_ALPHA_NON_PREMULTIPLIED: u64 = 0x0000_0000_0000_0001;
    /// Both faces are drawn; no culling.
    pub const CULL_NONE: u64 = 0x0000_0000_0000_0010;
}

/// One indexed draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCall {
    pub program: ShaderHandle,
    pub texture: TextureHandle,
    pub vertex_buffer: BufferHandle,
    /// Vertices of `vertex_buffer` that hold live data this frame.
    pub vertex_count: u32,
    pub index_buffer: BufferHandle,
    pub index_count: u32,
    /// Bitmask of [`state`] flags.
    pub state: u64,
    /// Sort key; larger values are drawn later.
    pub z_order: i32,
}

/// Black-box GPU allocator and submitter.
pub trait GpuDevice {
    /// Compile and link a shader program from vertex and fragment sources.
    fn alloc_shader(&mut self, vsh: &str, fsh: &str) -> Result<ShaderHandle, GpuError>;

    /// Upload an immutable index buffer.
    fn alloc_index_buffer(&mut self, indices: &[u16]) -> Result<BufferHandle, GpuError>;

    /// Reserve a dynamic vertex buffer of `size` bytes with the given stride.
    fn alloc_vertex_buffer(&mut self, size: usize, stride: usize)
    -> Result<BufferHandle, GpuError>;

    /// Upload an RGBA8 image as a texture.
    fn alloc_texture(&mut self, image: &AtlasImage) -> Result<TextureHandle, GpuError>;

    /// Overwrite `data.len()` bytes of a vertex buffer starting at byte `offset`.
    fn update_vertex_buffer(
        &mut self,
        buffer: BufferHandle,
        offset: usize,
        data: &[u8],
    ) -> Result<(), GpuError>;

    /// Set the projection uniform (column-major 4x4) of a program.
    fn set_projection(&mut self, program: ShaderHandle, projection: &[f32; 16]);

    fn submit(&mut self, draw: &DrawCall);

    fn destroy_buffer(&mut self, buffer: BufferHandle);

    fn destroy_texture(&mut self, texture: TextureHandle);

    fn destroy_shader(&mut self, program: ShaderHandle);
}
