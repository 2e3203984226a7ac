use crate::SkeletonKey;
use crate::bounds::BoundingBox;

/// How a mesh's vertices are assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MeshTopology {
    #[default]
    Triangles,
    /// Line segments, strips and loops. Nodes carrying these are "curves".
    Lines,
}

/// Parametric geometry a mesh was generated from, when known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveShape {
    Box,
    Cone,
    Plane,
    Sphere,
}

/// Mesh component attached to a node.
///
/// The pipeline never touches vertex data directly; it only needs topology,
/// vertex count and the local-space bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub topology: MeshTopology,
    pub vertex_count: usize,
    /// Bounds in the owning node's local space.
    pub bounds: BoundingBox,
    /// Primitive the mesh was generated from. Only in-memory sources fill
    /// this in; the glTF loader leaves it `None`.
    pub shape: Option<PrimitiveShape>,
    /// Skeleton driving this mesh, if it is skinned.
    pub skin: Option<SkeletonKey>,
}

impl Mesh {
    #[must_use]
    pub fn new(vertex_count: usize, bounds: BoundingBox) -> Self {
        Self {
            topology: MeshTopology::Triangles,
            vertex_count,
            bounds,
            shape: None,
            skin: None,
        }
    }

    #[must_use]
    pub fn lines(vertex_count: usize, bounds: BoundingBox) -> Self {
        Self { topology: MeshTopology::Lines, ..Self::new(vertex_count, bounds) }
    }

    #[must_use]
    pub fn with_shape(mut self, shape: PrimitiveShape) -> Self {
        self.shape = Some(shape);
        self
    }

    #[inline]
    #[must_use]
    pub fn is_curve(&self) -> bool {
        self.topology == MeshTopology::Lines
    }

    #[inline]
    #[must_use]
    pub fn is_skinned(&self) -> bool {
        self.skin.is_some()
    }
}
