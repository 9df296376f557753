//! Camera description shared between the core and the web frontend.
//!
//! These types intentionally avoid referencing platform-specific APIs and are
//! suitable for use on both native and web targets. The frontend uses them to
//! build render matrices; the picking code uses them to unproject pointer
//! coordinates into world-space rays.

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::picking::Ray;

/// Simple right-handed camera description with perspective projection.
#[derive(Clone, Debug)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera {
    /// Compute the clip-space projection matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy_radians, self.aspect, self.znear, self.zfar)
    }

    /// Compute the view matrix that transforms world to view space.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    /// Unit vector from the eye toward the look target.
    #[inline]
    pub fn view_direction(&self) -> Vec3 {
        (self.target - self.eye).normalize()
    }

    /// Compute a world-space ray through a normalized-device coordinate.
    ///
    /// `ndc` is in the usual [-1, 1] range with +y up. The ray originates at
    /// the eye and passes through the far-plane unprojection of the pointer.
    pub fn ray_through(&self, ndc: Vec2) -> Ray {
        let inv = (self.projection_matrix() * self.view_matrix()).inverse();
        let p_far = inv * Vec4::new(ndc.x, ndc.y, 1.0, 1.0);
        let far: Vec3 = p_far.truncate() / p_far.w;
        Ray {
            origin: self.eye,
            dir: (far - self.eye).normalize(),
        }
    }
}
