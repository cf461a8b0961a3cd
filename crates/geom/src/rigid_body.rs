use glam::{DMat3, DVec3};

use crate::Tracked;

/// Pose of a rigid body: center of mass and body-to-world rotation.
///
/// `rotation` should stay orthonormal; the integrators that write it
/// re-orthonormalise after every step.
#[derive(Debug, Clone)]
pub struct RigidBody3D {
    center: Tracked<DVec3>,
    rotation: Tracked<DMat3>,
}

impl RigidBody3D {
    pub fn new(center: DVec3, rotation: DMat3) -> Self {
        Self {
            center: Tracked::new(center),
            rotation: Tracked::new(rotation),
        }
    }

    pub fn center(&self) -> DVec3 {
        *self.center.get()
    }

    pub fn rotation(&self) -> DMat3 {
        *self.rotation.get()
    }

    pub fn set_center(&mut self, center: DVec3) {
        self.center.set(center);
    }

    pub fn set_rotation(&mut self, rotation: DMat3) {
        self.rotation.set(rotation);
    }

    /// Map a body-frame offset to world coordinates.
    pub fn to_world(&self, body_point: DVec3) -> DVec3 {
        self.center() + self.rotation() * body_point
    }

    /// Whether center or rotation changed since the last [`RigidBody3D::mark_clean`].
    pub fn is_stale(&self) -> bool {
        self.center.is_stale() || self.rotation.is_stale()
    }

    pub fn mark_clean(&mut self) {
        self.center.mark_clean();
        self.rotation.mark_clean();
    }
}

impl Default for RigidBody3D {
    fn default() -> Self {
        Self::new(DVec3::ZERO, DMat3::IDENTITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pose_is_identity() {
        let body = RigidBody3D::default();
        assert_eq!(body.center(), DVec3::ZERO);
        assert_eq!(body.rotation(), DMat3::IDENTITY);
        assert!(body.is_stale());
    }

    #[test]
    fn center_write_marks_stale() {
        let mut body = RigidBody3D::default();
        body.mark_clean();
        body.set_center(DVec3::X);
        assert!(body.is_stale());
    }

    #[test]
    fn rotation_write_marks_stale() {
        let mut body = RigidBody3D::default();
        body.mark_clean();
        body.set_rotation(DMat3::from_rotation_y(0.3));
        assert!(body.is_stale());
        body.mark_clean();
        assert!(!body.is_stale());
    }

    #[test]
    fn to_world_rotates_then_translates() {
        let body = RigidBody3D::new(
            DVec3::new(1.0, 0.0, 0.0),
            DMat3::from_rotation_z(std::f64::consts::FRAC_PI_2),
        );
        let p = body.to_world(DVec3::X);
        assert!(p.abs_diff_eq(DVec3::new(1.0, 1.0, 0.0), 1e-12));
    }
}
