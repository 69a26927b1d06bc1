//! CPU side of the debug-draw batch.
//!
//! Every primitive is a quad: four vertices written into a fixed pool and
//! six indices taken from a static pattern built once for the whole pool.
//! Quad vertices are always laid out as
//!
//! ```text
//!  3-------0
//!  |       |
//!  |       |
//!  1-------2
//! ```
//!
//! and drawn as triangles `3,1,2` and `3,2,0`, offset by 4 per quad.

use bytemuck::{Pod, Zeroable};
use thiserror::Error;

use crate::gfx::glyphs::{GLYPH_HEIGHT, GLYPH_WIDTH, glyph_region};

/// Index pattern of quad 0.
pub const QUAD_INDICES: [u16; 6] = [3, 1, 2, 3, 2, 0];
/// Largest pool addressable with 16-bit indices.
pub const MAX_VERTICES: usize = u16::MAX as usize + 1;
/// Texture coordinate marking a vertex as solid fill.
pub const SOLID_UV: (f32, f32) = (2.0, 0.0);
/// Vertical distance moved by [`QuadBuffer::line_return`].
pub const LINE_STEP: f32 = 14.0;
/// Opaque white, `0xAABBGGRR`.
pub const DEFAULT_COLOR: u32 = 0xFFFF_FFFF;

/// Position, texture coordinate and packed color.
///
/// `rgba` is read by the GPU as four normalized bytes in memory order
/// R, G, B, A, i.e. `0xAABBGGRR` on little-endian hosts.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub x: f32,
    pub y: f32,
    pub u: f32,
    pub v: f32,
    pub rgba: u32,
}

/// Size of one [`Vertex`] in bytes.
pub const VERTEX_STRIDE: usize = std::mem::size_of::<Vertex>();

/// Pack color channels into the vertex color layout.
pub fn pack_rgba(r: u8, g: u8, b: u8, a: u8) -> u32 {
    u32::from_le_bytes([r, g, b, a])
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DebugDrawError {
    #[error("debug draw buffer full: {requested} vertices requested, {available} of {capacity} left")]
    Overflow {
        requested: usize,
        available: usize,
        capacity: usize,
    },
}

/// Build the static index pattern for `capacity` vertices.
pub fn build_indices(capacity: usize) -> Vec<u16> {
    let quads = capacity / 4;
    let mut indices = Vec::with_capacity(quads * 6);
    for quad in 0..quads {
        let base = (quad * 4) as u16;
        indices.extend(QUAD_INDICES.iter().map(|i| i + base));
    }
    indices
}

/// Round a requested pool size to whole quads that 16-bit indices can address.
pub fn normalize_capacity(requested: usize) -> usize {
    requested.min(MAX_VERTICES) / 4 * 4
}

/// Vertex pool plus the cursor state of the current frame.
#[derive(Debug, Clone)]
pub struct QuadBuffer {
    vertices: Vec<Vertex>,
    pos: usize,
    pen_x: f32,
    pen_y: f32,
    color: u32,
    anchor: (f32, f32),
}

impl QuadBuffer {
    /// `capacity` is rounded down to whole quads, see [`normalize_capacity`].
    pub fn new(capacity: usize) -> Self {
        Self {
            vertices: vec![Vertex::default(); normalize_capacity(capacity)],
            pos: 0,
            pen_x: 0.0,
            pen_y: 0.0,
            color: DEFAULT_COLOR,
            anchor: (0.0, 0.0),
        }
    }

    pub fn capacity(&self) -> usize {
        self.vertices.len()
    }

    /// Vertices written so far this frame.
    pub fn write_position(&self) -> usize {
        self.pos
    }

    pub fn quad_count(&self) -> usize {
        self.pos / 4
    }

    /// Indices needed to draw everything written this frame.
    pub fn index_count(&self) -> usize {
        self.pos * 6 / 4
    }

    pub fn pen(&self) -> (f32, f32) {
        (self.pen_x, self.pen_y)
    }

    pub fn color(&self) -> u32 {
        self.color
    }

    pub fn anchor(&self) -> (f32, f32) {
        self.anchor
    }

    /// Where the pen returns on every reset.
    pub fn set_anchor(&mut self, x: f32, y: f32) {
        self.anchor = (x, y);
    }

    pub fn set_cursor(&mut self, x: f32, y: f32) {
        self.pen_x = x;
        self.pen_y = y;
    }

    pub fn set_color(&mut self, rgba: u32) {
        self.color = rgba;
    }

    /// Move the pen down one text line.
    pub fn line_return(&mut self) {
        self.pen_y -= LINE_STEP;
    }

    /// The dirty range: vertices written since the last reset.
    pub fn dirty_vertices(&self) -> &[Vertex] {
        &self.vertices[..self.pos]
    }

    pub fn dirty_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.dirty_vertices())
    }

    fn reserve(&self, vertices: usize) -> Result<(), DebugDrawError> {
        let available = self.capacity() - self.pos;
        if vertices > available {
            return Err(DebugDrawError::Overflow {
                requested: vertices,
                available,
                capacity: self.capacity(),
            });
        }
        Ok(())
    }

    /// Write one quad at pen-relative `(x, y)`. Caller has reserved room.
    fn push_quad(&mut self, x: f32, y: f32, w: f32, h: f32, uv: [(f32, f32); 4]) {
        let (x, y) = (self.pen_x + x, self.pen_y + y);
        let corners = [(x + w, y + h), (x, y), (x + w, y), (x, y + h)];
        let color = self.color;
        let quad = &mut self.vertices[self.pos..self.pos + 4];
        for (vertex, ((px, py), (u, v))) in quad.iter_mut().zip(corners.into_iter().zip(uv)) {
            *vertex = Vertex {
                x: px,
                y: py,
                u,
                v,
                rgba: color,
            };
        }
        self.pos += 4;
    }

    /// Solid rectangle relative to the pen.
    pub fn rect(&mut self, x: f32, y: f32, w: f32, h: f32) -> Result<(), DebugDrawError> {
        self.reserve(4)?;
        self.push_quad(x, y, w, h, [SOLID_UV; 4]);
        Ok(())
    }

    /// Hollow rectangle: top, bottom, left and right strips `thickness` wide.
    pub fn border(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        thickness: f32,
    ) -> Result<(), DebugDrawError> {
        self.reserve(16)?;
        self.push_quad(x, y, w, thickness, [SOLID_UV; 4]);
        self.push_quad(x, y + h - thickness, w, thickness, [SOLID_UV; 4]);
        self.push_quad(x, y, thickness, h, [SOLID_UV; 4]);
        self.push_quad(x + w - thickness, y, thickness, h, [SOLID_UV; 4]);
        Ok(())
    }

    /// One textured quad per character, starting at the pen and advancing
    /// right by `GLYPH_WIDTH * scale`. The pen itself does not move.
    ///
    /// The whole string is rejected if it does not fit.
    pub fn string(&mut self, text: &str, scale: f32) -> Result<(), DebugDrawError> {
        self.reserve(text.chars().count() * 4)?;

        let (w, h) = (GLYPH_WIDTH * scale, GLYPH_HEIGHT * scale);
        let mut x = 0.0;
        for c in text.chars() {
            let r = glyph_region(c);
            // screen-top corners (0, 3) sample the image-top edge of the cell
            self.push_quad(
                x,
                0.0,
                w,
                h,
                [
                    (r.right, r.top),
                    (r.left, r.bottom),
                    (r.right, r.bottom),
                    (r.left, r.top),
                ],
            );
            x += w;
        }
        Ok(())
    }

    /// Rewind to the start of the pool and put the pen back on the anchor.
    pub fn reset(&mut self) {
        self.pos = 0;
        (self.pen_x, self.pen_y) = self.anchor;
    }

    /// [`reset`](Self::reset) and restore the default color.
    pub fn new_frame(&mut self) {
        self.reset();
        self.color = DEFAULT_COLOR;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(quad: &[Vertex]) -> (f32, f32, f32, f32) {
        let min_x = quad.iter().map(|v| v.x).fold(f32::MAX, f32::min);
        let min_y = quad.iter().map(|v| v.y).fold(f32::MAX, f32::min);
        let max_x = quad.iter().map(|v| v.x).fold(f32::MIN, f32::max);
        let max_y = quad.iter().map(|v| v.y).fold(f32::MIN, f32::max);
        (min_x, min_y, max_x - min_x, max_y - min_y)
    }

    #[test]
    fn index_pattern_offsets_by_four() {
        let indices = build_indices(2048);
        assert_eq!(indices.len(), 3072);
        for (quad, chunk) in indices.chunks(6).enumerate() {
            let expected: Vec<u16> = QUAD_INDICES.iter().map(|i| i + 4 * quad as u16).collect();
            assert_eq!(chunk, expected.as_slice());
        }
    }

    #[test]
    fn full_pool_fits_u16() {
        let indices = build_indices(MAX_VERTICES);
        assert_eq!(*indices.iter().max().unwrap(), u16::MAX);
        assert_eq!(normalize_capacity(1_000_000), MAX_VERTICES);
        assert_eq!(normalize_capacity(2050), 2048);
    }

    #[test]
    fn vertex_is_twenty_bytes() {
        assert_eq!(VERTEX_STRIDE, 20);
    }

    #[test]
    fn pack_rgba_is_little_endian() {
        assert_eq!(pack_rgba(0x12, 0x34, 0x56, 0xFF), 0xFF56_3412);
    }

    #[test]
    fn rect_layout_and_sentinel_uv() {
        let mut buf = QuadBuffer::new(16);
        buf.set_cursor(100.0, 50.0);
        buf.set_color(0xFF00_00FF);
        buf.rect(1.0, 2.0, 10.0, 20.0).unwrap();

        let q = buf.dirty_vertices();
        assert_eq!((q[0].x, q[0].y), (111.0, 72.0));
        assert_eq!((q[1].x, q[1].y), (101.0, 52.0));
        assert_eq!((q[2].x, q[2].y), (111.0, 52.0));
        assert_eq!((q[3].x, q[3].y), (101.0, 72.0));
        assert!(q.iter().all(|v| (v.u, v.v) == SOLID_UV));
        assert!(q.iter().all(|v| v.rgba == 0xFF00_00FF));
    }

    #[test]
    fn border_is_four_strips() {
        let mut buf = QuadBuffer::new(64);
        buf.border(0.0, 0.0, 100.0, 50.0, 2.0).unwrap();
        assert_eq!(buf.write_position(), 16);

        let strips: Vec<_> = buf.dirty_vertices().chunks(4).map(bounds).collect();
        assert_eq!(
            strips,
            vec![
                (0.0, 0.0, 100.0, 2.0),
                (0.0, 48.0, 100.0, 2.0),
                (0.0, 0.0, 2.0, 50.0),
                (98.0, 0.0, 2.0, 50.0),
            ]
        );
    }

    #[test]
    fn glyph_quad_is_upright() {
        let mut buf = QuadBuffer::new(16);
        buf.string("A", 2.0).unwrap();

        let r = glyph_region('A');
        let q = buf.dirty_vertices();
        // y points up on screen while v grows down the image
        assert!(q[0].y > q[1].y);
        assert!(r.top < r.bottom);
        assert_eq!((q[0].u, q[0].v), (r.right, r.top));
        assert_eq!((q[1].u, q[1].v), (r.left, r.bottom));
        assert_eq!((q[2].u, q[2].v), (r.right, r.bottom));
        assert_eq!((q[3].u, q[3].v), (r.left, r.top));
        assert_eq!(bounds(q), (0.0, 0.0, GLYPH_WIDTH * 2.0, GLYPH_HEIGHT * 2.0));
    }

    #[test]
    fn string_advances_per_glyph() {
        let mut buf = QuadBuffer::new(64);
        buf.set_cursor(10.0, 10.0);
        buf.string("abc", 1.0).unwrap();

        assert_eq!(buf.write_position(), 12);
        assert_eq!(buf.index_count(), 18);
        let lefts: Vec<f32> = buf.dirty_vertices().chunks(4).map(|q| q[1].x).collect();
        assert_eq!(lefts, vec![10.0, 18.0, 26.0]);
        assert_eq!(buf.pen(), (10.0, 10.0));
    }

    #[test]
    fn overflow_rejects_without_writing() {
        let mut buf = QuadBuffer::new(8);
        buf.rect(0.0, 0.0, 1.0, 1.0).unwrap();
        let before = buf.dirty_vertices().to_vec();

        let err = buf.string("xy", 1.0).unwrap_err();
        assert_eq!(
            err,
            DebugDrawError::Overflow {
                requested: 8,
                available: 4,
                capacity: 8
            }
        );
        assert_eq!(buf.dirty_vertices(), before.as_slice());

        assert!(buf.border(0.0, 0.0, 5.0, 5.0, 1.0).is_err());
        buf.rect(0.0, 0.0, 2.0, 2.0).unwrap();
        assert!(buf.rect(0.0, 0.0, 2.0, 2.0).is_err());
        assert_eq!(buf.write_position(), 8);
    }

    #[test]
    fn reset_returns_to_anchor() {
        let mut buf = QuadBuffer::new(32);
        buf.set_anchor(10.0, 279.0);
        buf.set_cursor(1.0, 1.0);
        buf.set_color(0x1234_5678);
        buf.rect(0.0, 0.0, 1.0, 1.0).unwrap();
        buf.line_return();

        buf.reset();
        assert_eq!(buf.write_position(), 0);
        assert_eq!(buf.pen(), (10.0, 279.0));
        assert_eq!(buf.color(), 0x1234_5678);

        buf.new_frame();
        assert_eq!(buf.color(), DEFAULT_COLOR);
    }
}
