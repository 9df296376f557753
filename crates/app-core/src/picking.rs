//! Ray construction and intersection queries for pointer picking.

use glam::{Mat4, Vec3};

use crate::mesh::{DeformableMesh, MeshId};

/// World-space ray used for surface picking.
#[derive(Clone, Copy, Debug)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    /// Intersect with the plane through `point` whose unit normal is `normal`.
    ///
    /// Returns the hit point, or `None` when the ray is parallel to the plane
    /// or the plane lies behind the ray origin.
    pub fn intersect_plane(&self, normal: Vec3, point: Vec3) -> Option<Vec3> {
        let denom = normal.dot(self.dir);
        if denom.abs() < 1e-6 {
            return None;
        }
        let t = normal.dot(point - self.origin) / denom;
        (t >= 0.0).then(|| self.origin + self.dir * t)
    }

    /// Map the ray into another space. The direction is deliberately left
    /// unnormalized so parameter values stay comparable after scaling.
    #[inline]
    pub(crate) fn transformed(&self, m: Mat4) -> Ray {
        Ray {
            origin: m.transform_point3(self.origin),
            dir: m.transform_vector3(self.dir),
        }
    }
}

/// Result of resolving a pointer ray against the registered meshes.
#[derive(Clone, Copy, Debug)]
pub struct SurfaceHit {
    pub mesh: MeshId,
    /// World-space contact point on the surface.
    pub point: Vec3,
    /// World-space distance from the ray origin, used to order hits.
    pub distance: f32,
}

/// Möller–Trumbore ray/triangle intersection.
///
/// Returns the ray parameter `t` of the hit, or `None` on a miss. Backfaces
/// count as hits; degenerate triangles and grazing rays do not.
#[inline]
pub fn ray_triangle(origin: Vec3, dir: Vec3, a: Vec3, b: Vec3, c: Vec3) -> Option<f32> {
    let edge1 = b - a;
    let edge2 = c - a;
    let pvec = dir.cross(edge2);
    let det = edge1.dot(pvec);
    if det.abs() < 1e-8 {
        return None;
    }
    let inv_det = 1.0 / det;
    let tvec = origin - a;
    let u = tvec.dot(pvec) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let qvec = tvec.cross(edge1);
    let v = dir.dot(qvec) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let t = edge2.dot(qvec) * inv_det;
    (t >= 0.0).then_some(t)
}

/// Nearest intersection of a world-space ray with one mesh.
///
/// The ray is mapped into mesh-local space so the vertex buffer is tested
/// untransformed; the hit is mapped back and returned as a world-space point
/// with its distance from the ray origin. Tests the live (deformed) surface.
pub fn raycast_mesh(ray: &Ray, mesh: &DeformableMesh) -> Option<(Vec3, f32)> {
    let local = ray.transformed(mesh.inverse);
    let mut best: Option<f32> = None;
    for tri in mesh.indices.chunks_exact(3) {
        let a = mesh.current[tri[0] as usize];
        let b = mesh.current[tri[1] as usize];
        let c = mesh.current[tri[2] as usize];
        if let Some(t) = ray_triangle(local.origin, local.dir, a, b, c) {
            if best.map_or(true, |bt| t < bt) {
                best = Some(t);
            }
        }
    }
    best.map(|t| {
        let world = mesh.transform.transform_point3(local.origin + local.dir * t);
        (world, (world - ray.origin).length())
    })
}
