//! Destination for finished mesh buffers.
//!
//! A renderer, physics collider or exporter implements [`MeshSink`] to receive
//! the generated geometry without the generators knowing about it.

use glam::{Vec2, Vec3};

use crate::cave_mesh::CaveMesh;

/// Opaque consumer of mesh buffers.
pub trait MeshSink {
    /// Receives one complete mesh. Any previous contents are replaced.
    fn submit(&mut self, positions: &[Vec3], normals: &[Vec3], uvs: &[Vec2], indices: &[u32]);
}

impl MeshSink for CaveMesh {
    fn submit(&mut self, positions: &[Vec3], normals: &[Vec3], uvs: &[Vec2], indices: &[u32]) {
        self.clear();
        self.positions.extend_from_slice(positions);
        self.normals.extend_from_slice(normals);
        self.uvs.extend_from_slice(uvs);
        self.indices.extend_from_slice(indices);
    }
}
