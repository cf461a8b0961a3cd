use glam::{DMat3, DVec3};

use crate::{MeshLike, RigidBody3D, Tracked};

/// Corner signs of the unit cube, in vertex order.
#[rustfmt::skip]
pub const CUBE_REF_VERTICES: [[f64; 3]; 8] = [
    [ 1.0,  1.0,  1.0], [-1.0,  1.0,  1.0], [-1.0, -1.0,  1.0], [ 1.0, -1.0,  1.0],
    [ 1.0, -1.0, -1.0], [ 1.0,  1.0, -1.0], [-1.0,  1.0, -1.0], [-1.0, -1.0, -1.0],
];

/// Twelve triangles covering the six faces.
#[rustfmt::skip]
pub const CUBE_INDICES: [u32; 36] = [
    0, 1, 2,  0, 2, 3,   0, 3, 4,  0, 4, 5,   0, 5, 6,  0, 6, 1,
    1, 6, 7,  1, 7, 2,   7, 4, 3,  7, 3, 2,   4, 7, 6,  4, 6, 5,
];

/// One RGB colour per corner.
#[rustfmt::skip]
pub const CUBE_COLOURS: [f32; 24] = [
    1.0, 0.0, 0.0,
    1.0, 1.0, 0.0,
    0.0, 1.0, 0.0,
    0.0, 0.0, 1.0,
    0.0, 1.0, 1.0,
    1.0, 0.0, 1.0,
    0.0, 0.0, 0.0,
    1.0, 1.0, 1.0,
];

/// A box-shaped rigid body.
///
/// World vertices are `center + R * ref_vertex` and are recomputed lazily:
/// writing center or rotation only drops the cache, the next read rebuilds it.
#[derive(Debug, Clone)]
pub struct Cube3D {
    body: RigidBody3D,
    lengths: DVec3,
    ref_vertices: [DVec3; 8],
    vertices: [DVec3; 8],
    vertices_up_to_date: bool,
    colours: Tracked<Vec<f32>>,
}

impl Cube3D {
    pub fn new(center: DVec3, rotation: DMat3, lengths: DVec3) -> Self {
        let ref_vertices = CUBE_REF_VERTICES.map(|s| DVec3::from_array(s) * 0.5 * lengths);
        let mut cube = Self {
            body: RigidBody3D::new(center, rotation),
            lengths,
            ref_vertices,
            vertices: [DVec3::ZERO; 8],
            vertices_up_to_date: false,
            colours: Tracked::new(CUBE_COLOURS.to_vec()),
        };
        cube.update_vertices();
        cube
    }

    pub fn body(&self) -> &RigidBody3D {
        &self.body
    }

    pub fn center(&self) -> DVec3 {
        self.body.center()
    }

    pub fn rotation(&self) -> DMat3 {
        self.body.rotation()
    }

    pub fn lengths(&self) -> DVec3 {
        self.lengths
    }

    /// Body-frame corners, already scaled by half the edge lengths.
    pub fn ref_vertices(&self) -> &[DVec3; 8] {
        &self.ref_vertices
    }

    pub fn set_center(&mut self, center: DVec3) {
        self.body.set_center(center);
        self.vertices_up_to_date = false;
    }

    pub fn set_rotation(&mut self, rotation: DMat3) {
        self.body.set_rotation(rotation);
        self.vertices_up_to_date = false;
    }

    pub fn vertices_up_to_date(&self) -> bool {
        self.vertices_up_to_date
    }

    /// World-space corners, recomputed first if the pose changed.
    pub fn vertices(&mut self) -> &[DVec3; 8] {
        if !self.vertices_up_to_date {
            self.update_vertices();
        }
        &self.vertices
    }

    pub fn set_colours(&mut self, colours: [f32; 24]) {
        self.colours.set(colours.to_vec());
    }

    fn update_vertices(&mut self) {
        let center = self.body.center();
        let rotation = self.body.rotation();
        self.vertices = self.ref_vertices.map(|v| center + rotation * v);
        self.vertices_up_to_date = true;
        tracing::trace!(?center, "cube vertices recomputed");
    }
}

impl Default for Cube3D {
    fn default() -> Self {
        Self::new(DVec3::ZERO, DMat3::IDENTITY, DVec3::ONE)
    }
}

impl MeshLike for Cube3D {
    fn vertex_count(&self) -> usize {
        8
    }

    fn indices(&self) -> &[u32] {
        &CUBE_INDICES
    }

    fn colours(&self) -> &[f32] {
        self.colours.get()
    }

    fn positions_f32(&mut self) -> Vec<f32> {
        self.vertices()
            .iter()
            .flat_map(|v| v.as_vec3().to_array())
            .collect()
    }

    fn positions_stale(&self) -> bool {
        self.body.is_stale()
    }

    fn colours_stale(&self) -> bool {
        self.colours.is_stale()
    }

    fn mark_positions_clean(&mut self) {
        self.body.mark_clean();
    }

    fn mark_colours_clean(&mut self) {
        self.colours.mark_clean();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_pose_gives_scaled_corner_signs() {
        let mut cube = Cube3D::new(DVec3::ZERO, DMat3::IDENTITY, DVec3::new(2.0, 4.0, 6.0));
        let half = DVec3::new(1.0, 2.0, 3.0);
        for (v, signs) in cube.vertices().iter().zip(CUBE_REF_VERTICES) {
            assert_eq!(*v, DVec3::from_array(signs) * half);
        }
    }

    #[test]
    fn vertices_follow_center() {
        let mut cube = Cube3D::default();
        cube.set_center(DVec3::new(10.0, 0.0, 0.0));
        assert!(!cube.vertices_up_to_date());
        let v0 = cube.vertices()[0];
        assert!(cube.vertices_up_to_date());
        assert_eq!(v0, DVec3::new(10.5, 0.5, 0.5));
    }

    #[test]
    fn vertices_follow_rotation() {
        let mut cube = Cube3D::default();
        let r = DMat3::from_rotation_z(std::f64::consts::FRAC_PI_2);
        cube.set_rotation(r);
        // (0.5, 0.5, 0.5) rotated a quarter turn about z
        assert!(cube.vertices()[0].abs_diff_eq(DVec3::new(-0.5, 0.5, 0.5), 1e-12));
    }

    #[test]
    fn pose_write_marks_positions_stale_only() {
        let mut cube = Cube3D::default();
        cube.mark_positions_clean();
        cube.mark_colours_clean();
        cube.set_rotation(DMat3::from_rotation_x(0.1));
        assert!(cube.positions_stale());
        assert!(!cube.colours_stale());

        let flat = cube.positions_f32();
        assert_eq!(flat.len(), 24);
        cube.mark_positions_clean();
        assert!(!cube.positions_stale());
    }

    #[test]
    fn colour_write_marks_colours_stale_only() {
        let mut cube = Cube3D::default();
        cube.mark_positions_clean();
        cube.mark_colours_clean();
        cube.set_colours([0.2; 24]);
        assert!(cube.colours_stale());
        assert!(!cube.positions_stale());
    }

    #[test]
    fn indices_reference_valid_corners() {
        let cube = Cube3D::default();
        assert_eq!(cube.indices().len(), 36);
        assert!(cube.indices().iter().all(|&i| i < 8));
    }
}
