//! Interleaved vertex format for GPU upload.
//!
//! [`GpuVertex`] packs position, normal and UV into one 32-byte record so a
//! [`CaveMesh`] can be uploaded as a single vertex buffer.

use crate::cave_mesh::CaveMesh;

/// A single interleaved vertex.
///
/// Layout (32 bytes total):
///   - `[0..12]`  position `[f32; 3]`
///   - `[12..24]` normal `[f32; 3]`
///   - `[24..32]` uv `[f32; 2]`
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

static_assertions::assert_eq_size!(GpuVertex, [u8; 32]);

impl CaveMesh {
    /// Interleave the attribute buffers.
    pub fn to_gpu_vertices(&self) -> Vec<GpuVertex> {
        self.positions
            .iter()
            .zip(&self.normals)
            .zip(&self.uvs)
            .map(|((p, n), uv)| GpuVertex {
                position: p.to_array(),
                normal: n.to_array(),
                uv: uv.to_array(),
            })
            .collect()
    }

    /// Raw vertex bytes ready for a vertex buffer.
    pub fn vertex_bytes(&self) -> Vec<u8> {
        bytemuck::cast_slice(&self.to_gpu_vertices()).to_vec()
    }

    /// Raw index bytes, 16-bit when the vertex count allows it.
    pub fn index_bytes(&self) -> Vec<u8> {
        if self.requires_u32_indices() {
            bytemuck::cast_slice(&self.indices).to_vec()
        } else {
            let narrow: Vec<u16> = self.indices.iter().map(|&i| i as u16).collect();
            bytemuck::cast_slice(&narrow).to_vec()
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::{Vec2, Vec3};

    use super::*;

    #[test]
    fn test_interleave_preserves_attributes() {
        let mut mesh = CaveMesh::new();
        mesh.push_vertex(Vec3::new(1.0, 2.0, 3.0), -Vec3::X, Vec2::new(0.25, 0.5));
        let verts = mesh.to_gpu_vertices();
        assert_eq!(verts.len(), 1);
        assert_eq!(verts[0].position, [1.0, 2.0, 3.0]);
        assert_eq!(verts[0].normal, [-1.0, 0.0, 0.0]);
        assert_eq!(verts[0].uv, [0.25, 0.5]);
    }

    #[test]
    fn test_byte_sizes() {
        let mut mesh = CaveMesh::new();
        for _ in 0..3 {
            mesh.push_vertex(Vec3::ZERO, Vec3::Y, Vec2::ZERO);
        }
        mesh.push_triangle(0, 1, 2);
        assert_eq!(mesh.vertex_bytes().len(), 3 * 32);
        assert_eq!(mesh.index_bytes().len(), 3 * 2, "small meshes use u16 indices");
    }
}
