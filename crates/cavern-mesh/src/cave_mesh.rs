//! Cave mesh data structure holding the parallel vertex attribute buffers and
//! triangle indices produced by the ring sweeps.

use glam::{Vec2, Vec3};

use crate::aabb::Aabb;
use crate::sink::MeshSink;

/// Meshes with more vertices than this need 32-bit indices on 16-bit index APIs.
pub const U16_INDEX_LIMIT: usize = 65_000;

/// The mesh output of a generation pass.
///
/// Attribute buffers are parallel: `positions[i]`, `normals[i]` and `uvs[i]`
/// describe the same vertex. Normals are unit length and face the inside of
/// the cave.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CaveMesh {
    /// Vertex positions.
    pub positions: Vec<Vec3>,
    /// Per-vertex normals.
    pub normals: Vec<Vec3>,
    /// Texture coordinates: (angle fraction, depth fraction).
    pub uvs: Vec<Vec2>,
    /// Index buffer (triangles, 3 indices per triangle).
    pub indices: Vec<u32>,
}

impl CaveMesh {
    /// Creates an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty mesh with reserved capacity.
    pub fn with_capacity(vertices: usize, indices: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertices),
            normals: Vec::with_capacity(vertices),
            uvs: Vec::with_capacity(vertices),
            indices: Vec::with_capacity(indices),
        }
    }

    /// Appends one vertex and returns its index.
    pub fn push_vertex(&mut self, position: Vec3, normal: Vec3, uv: Vec2) -> u32 {
        let index = self.positions.len() as u32;
        self.positions.push(position);
        self.normals.push(normal);
        self.uvs.push(uv);
        index
    }

    /// Appends one triangle.
    pub fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    /// Appends the two triangles of the quad between two adjacent rings.
    ///
    /// `a`/`b` are consecutive vertices on the upper ring and `c`/`d` the
    /// matching vertices on the lower ring. Winding is chosen so the quad is
    /// visible from inside the tube.
    pub fn push_inward_quad(&mut self, a: u32, b: u32, c: u32, d: u32) {
        self.indices.extend_from_slice(&[a, c, b, b, c, d]);
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Returns the number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Returns `true` if the mesh contains no vertices.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Removes all vertices and indices, keeping allocations.
    pub fn clear(&mut self) {
        self.positions.clear();
        self.normals.clear();
        self.uvs.clear();
        self.indices.clear();
    }

    /// Appends another mesh, rebasing its indices onto this mesh's vertices.
    pub fn append(&mut self, other: &CaveMesh) {
        let base = self.positions.len() as u32;
        self.positions.extend_from_slice(&other.positions);
        self.normals.extend_from_slice(&other.normals);
        self.uvs.extend_from_slice(&other.uvs);
        self.indices.extend(other.indices.iter().map(|&i| i + base));
    }

    /// Merges several meshes into one, in order.
    pub fn merged<'a>(meshes: impl IntoIterator<Item = &'a CaveMesh>) -> CaveMesh {
        let mut out = CaveMesh::new();
        for mesh in meshes {
            out.append(mesh);
        }
        out
    }

    /// Bounding box of all vertex positions, `None` for an empty mesh.
    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(self.positions.iter().copied())
    }

    /// Returns `true` if every index addresses an existing vertex and the
    /// index count is a multiple of three.
    pub fn indices_in_bounds(&self) -> bool {
        let count = self.positions.len() as u32;
        self.indices.len() % 3 == 0 && self.indices.iter().all(|&i| i < count)
    }

    /// Returns `true` if the attribute buffers have matching lengths.
    pub fn attributes_consistent(&self) -> bool {
        self.normals.len() == self.positions.len() && self.uvs.len() == self.positions.len()
    }

    /// Whether a 16-bit index buffer would be too small for this mesh.
    pub fn requires_u32_indices(&self) -> bool {
        self.positions.len() > U16_INDEX_LIMIT
    }

    /// Pushes the buffers into a sink.
    pub fn submit_to(&self, sink: &mut dyn MeshSink) {
        sink.submit(&self.positions, &self.normals, &self.uvs, &self.indices);
    }
}
