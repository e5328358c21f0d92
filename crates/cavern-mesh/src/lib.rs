//! Mesh buffer types for procedurally generated caves: vertex/index buffers, bounds,
//! mesh sinks and a GPU-ready interleaved vertex format.

pub mod aabb;
pub mod cave_mesh;
pub mod gpu_vertex;
pub mod sink;

pub use aabb::Aabb;
pub use cave_mesh::{CaveMesh, U16_INDEX_LIMIT};
pub use gpu_vertex::GpuVertex;
pub use sink::MeshSink;
