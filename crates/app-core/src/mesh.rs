use glam::{Mat4, Vec3};

/// Identifier for a mesh registered with the deformation engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeshId(pub(crate) u32);

#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    #[error("mesh has no vertices")]
    EmptyGeometry,
    #[error("index count {0} is not a multiple of 3")]
    IndicesNotTriangles(usize),
    #[error("index {index} out of bounds for {vertex_count} vertices")]
    IndexOutOfBounds { index: u32, vertex_count: usize },
}

/// One deformable surface tracked by the engine.
///
/// `rest` is captured at registration and never mutated afterwards; `current`
/// is what the renderer draws. The velocity buffer exists only once a release
/// has happened and is zeroed whenever the mesh is at rest. All three buffers
/// always hold exactly `vertex_count` entries.
pub struct DeformableMesh {
    pub(crate) rest: Vec<Vec3>,
    pub(crate) current: Vec<Vec3>,
    pub(crate) velocities: Option<Vec<Vec3>>,
    pub(crate) indices: Vec<u32>,
    pub(crate) transform: Mat4,
    pub(crate) inverse: Mat4,
    pub(crate) returning: bool,
    pub(crate) return_ticks: u32,
    pub(crate) dirty: bool,
}

impl DeformableMesh {
    pub(crate) fn new(
        positions: Vec<Vec3>,
        indices: Vec<u32>,
        transform: Mat4,
    ) -> Result<Self, MeshError> {
        if positions.is_empty() {
            return Err(MeshError::EmptyGeometry);
        }
        if indices.len() % 3 != 0 {
            return Err(MeshError::IndicesNotTriangles(indices.len()));
        }
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= positions.len()) {
            return Err(MeshError::IndexOutOfBounds {
                index,
                vertex_count: positions.len(),
            });
        }
        let current = positions.clone();
        Ok(Self {
            rest: positions,
            current,
            velocities: None,
            indices,
            inverse: transform.inverse(),
            transform,
            returning: false,
            return_ticks: 0,
            dirty: true,
        })
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.rest.len()
    }

    /// Live vertex positions as a flat `[x, y, z, ...]` slice for GPU upload.
    #[inline]
    pub fn positions(&self) -> &[f32] {
        bytemuck::cast_slice(&self.current)
    }

    #[inline]
    pub fn rest_positions(&self) -> &[f32] {
        bytemuck::cast_slice(&self.rest)
    }

    /// Per-vertex return velocities, flat; `None` until the first release.
    #[inline]
    pub fn velocities(&self) -> Option<&[f32]> {
        self.velocities.as_deref().map(bytemuck::cast_slice)
    }

    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    #[inline]
    pub fn transform(&self) -> Mat4 {
        self.transform
    }

    #[inline]
    pub fn is_returning(&self) -> bool {
        self.returning
    }

    pub(crate) fn set_transform(&mut self, transform: Mat4) {
        self.transform = transform;
        self.inverse = transform.inverse();
    }
}
