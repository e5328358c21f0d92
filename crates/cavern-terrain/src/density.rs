//! Scalar density fields and the bounds-checked sampler read by surface
//! extractors.
//!
//! Values are occupancy: 1.0 is solid rock, 0.0 is air. Any coordinate outside
//! the field reads as air.

use crate::automata::VoxelGrid;

/// Read access to a 3D density field.
pub trait DensitySource {
    /// Density at integer coordinates, 0.0 outside the field.
    fn value(&self, x: i32, y: i32, z: i32) -> f32;

    /// Field dimensions along x, y and z.
    fn bounds(&self) -> [usize; 3];
}

/// Immutable 3D array of densities, x-major.
#[derive(Clone, Debug, PartialEq)]
pub struct DensityField {
    dims: [usize; 3],
    values: Vec<f32>,
}

impl DensityField {
    /// Build a field from raw values. Returns `None` if the value count does
    /// not match the dimensions.
    pub fn from_values(dims: [usize; 3], values: Vec<f32>) -> Option<Self> {
        (dims[0] * dims[1] * dims[2] == values.len()).then_some(Self { dims, values })
    }

    /// Convert a voxel grid 1:1: solid cells become 1.0, empty cells 0.0.
    pub fn from_grid(grid: &VoxelGrid) -> Self {
        let values = grid
            .cells()
            .iter()
            .map(|&solid| if solid { 1.0 } else { 0.0 })
            .collect();
        Self {
            dims: grid.dims(),
            values,
        }
    }

    fn index(&self, x: i32, y: i32, z: i32) -> Option<usize> {
        let [sx, sy, sz] = self.dims;
        if x < 0 || y < 0 || z < 0 {
            return None;
        }
        let (x, y, z) = (x as usize, y as usize, z as usize);
        (x < sx && y < sy && z < sz).then(|| (x * sy + y) * sz + z)
    }

    /// Raw values, x-major.
    pub fn values(&self) -> &[f32] {
        &self.values
    }
}

impl DensitySource for DensityField {
    fn value(&self, x: i32, y: i32, z: i32) -> f32 {
        self.index(x, y, z).map_or(0.0, |i| self.values[i])
    }

    fn bounds(&self) -> [usize; 3] {
        self.dims
    }
}

/// Density lookup that may not have a field yet.
///
/// Reads before [`DensitySampler::set_field`] behave like an empty field.
#[derive(Clone, Debug, Default)]
pub struct DensitySampler {
    field: Option<DensityField>,
}

impl DensitySampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the field produced by a generation pass, replacing any previous one.
    pub fn set_field(&mut self, field: DensityField) {
        self.field = Some(field);
    }

    pub fn field(&self) -> Option<&DensityField> {
        self.field.as_ref()
    }
}

impl DensitySource for DensitySampler {
    fn value(&self, x: i32, y: i32, z: i32) -> f32 {
        self.field.as_ref().map_or(0.0, |f| f.value(x, y, z))
    }

    fn bounds(&self) -> [usize; 3] {
        self.field.as_ref().map_or([0, 0, 0], DensitySource::bounds)
    }
}
