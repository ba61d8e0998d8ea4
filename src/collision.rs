//! Static collision geometry for the physics engine.

use crate::errors::CollisionError;
use crate::float_types::Real;
use crate::float_types::parry3d::shape::TriMesh;
use crate::mesh::triangle::Triangle;
use nalgebra::Point3;

/// Convert a triangle list to a Parry `TriMesh`.
/// Each triangle gets its own three vertices; nothing is welded.
///
/// ## Errors
/// [`CollisionError::Empty`] for an empty list, or Parry's `TriMeshBuilderError`.
pub fn build_trimesh(triangles: &[Triangle]) -> Result<TriMesh, CollisionError> {
    if triangles.is_empty() {
        return Err(CollisionError::Empty);
    }

    let mut vertices: Vec<Point3<Real>> = Vec::with_capacity(triangles.len() * 3);
    let mut indices: Vec<[u32; 3]> = Vec::with_capacity(triangles.len());
    for tri in triangles {
        let base = vertices.len() as u32;
        vertices.extend(tri.vertices.iter().map(|v| v.pos));
        indices.push([base, base + 1, base + 2]);
    }

    Ok(TriMesh::new(vertices, indices)?)
}
