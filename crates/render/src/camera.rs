use std::f32::consts::{FRAC_PI_2, PI};

use glam::{Mat4, Vec2, Vec3};
use simteach_input::Action;

/// Closest the camera may get to its target.
pub const DISTANCE_MIN: f32 = 1e-3;
/// Zoom gain per scroll notch, relative to the window height.
pub const ZOOM_SPEED: f32 = 50.0;
/// Pan gain per pixel of drag, relative to the distance.
pub const TRANSLATE_SPEED: f32 = 2e-3;

/// A camera driven by input actions.
///
/// Matrices follow OpenGL clip conventions (depth in `[-1, 1]`); GPU backends
/// with a `[0, 1]` depth range remap after projection.
pub trait CameraController {
    /// Apply an input action. Actions a camera does not handle are ignored.
    fn apply(&mut self, action: &Action);

    fn view_matrix(&self) -> Mat4;

    fn projection_matrix(&self, window_size: Vec2) -> Mat4;

    /// Distance from the eye to the target.
    fn distance(&self) -> f32;

    /// Eye position in world space.
    fn eye(&self) -> Vec3;

    /// Point the camera looks at.
    fn target(&self) -> Vec3;

    fn view_projection(&self, window_size: Vec2) -> Mat4 {
        self.projection_matrix(window_size) * self.view_matrix()
    }
}

/// Fixed-aperture projection scaled by the camera distance.
///
/// Near and far planes sit at `0.01 d` and `100 d` so the depth precision
/// follows zoom. The x axis is divided by the aspect ratio.
pub fn projection_matrix(distance: f32, window_size: Vec2) -> Mat4 {
    let z_near = 0.01 * distance;
    let z_far = 100.0 * distance;
    let aspect = if window_size.y > 0.0 {
        window_size.x / window_size.y
    } else {
        1.0
    };
    let z_e = (z_near + z_far) / (z_near - z_far);
    let z_n = 2.0 * z_far * z_near / (z_near - z_far);
    from_rows([
        [1.0 / aspect, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, z_e, z_n],
        [0.0, 0.0, -1.0, 0.0],
    ])
}

fn from_rows(rows: [[f32; 4]; 4]) -> Mat4 {
    Mat4::from_cols_array_2d(&rows).transpose()
}

fn zoomed(distance: f32, delta: f32, window_height: f32) -> f32 {
    (distance * (1.0 - ZOOM_SPEED * delta / window_height)).max(DISTANCE_MIN)
}

/// Camera in the xy plane looking down -z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanCamera {
    pub pos: Vec2,
    distance: f32,
}

impl PanCamera {
    pub fn new(distance: f32) -> Self {
        Self {
            pos: Vec2::ZERO,
            distance: distance.max(DISTANCE_MIN),
        }
    }

    pub fn translate(&mut self, from: Vec2, to: Vec2) {
        self.pos += TRANSLATE_SPEED * (to - from) * self.distance;
    }

    pub fn zoom(&mut self, delta: f32, window_height: f32) {
        self.distance = zoomed(self.distance, delta, window_height);
    }
}

impl Default for PanCamera {
    fn default() -> Self {
        Self::new(2.0)
    }
}

impl CameraController for PanCamera {
    fn apply(&mut self, action: &Action) {
        match *action {
            Action::Translate { from, to } => self.translate(from, to),
            Action::Zoom {
                delta,
                window_height,
            } => self.zoom(delta, window_height),
            _ => {}
        }
    }

    fn view_matrix(&self) -> Mat4 {
        Mat4::from_translation(Vec3::new(self.pos.x, self.pos.y, -self.distance))
    }

    fn projection_matrix(&self, window_size: Vec2) -> Mat4 {
        projection_matrix(self.distance, window_size)
    }

    fn distance(&self) -> f32 {
        self.distance
    }

    fn eye(&self) -> Vec3 {
        Vec3::new(-self.pos.x, -self.pos.y, self.distance)
    }

    fn target(&self) -> Vec3 {
        Vec3::new(-self.pos.x, -self.pos.y, 0.0)
    }
}

/// Camera on a sphere around `center`, parameterised by azimuth and polar
/// angles, with a pan offset in the view plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    pub center: Vec3,
    distance: f32,
    pub azimuth: f32,
    pub polar: f32,
    /// Pan offset along the camera's (U, V) axes.
    pub local_pos: Vec2,
}

impl OrbitCamera {
    pub fn new(center: Vec3, distance: f32, azimuth: f32, polar: f32) -> Self {
        Self {
            center,
            distance: distance.max(DISTANCE_MIN),
            azimuth,
            polar,
            local_pos: Vec2::ZERO,
        }
    }

    /// Camera at `distance` looking down the z axis.
    pub fn looking_down(distance: f32) -> Self {
        Self::new(Vec3::ZERO, distance, -FRAC_PI_2, FRAC_PI_2)
    }

    pub fn orbit(&mut self, du: f32, dv: f32) {
        self.azimuth += du;
        self.polar += dv;
    }

    pub fn translate(&mut self, from: Vec2, to: Vec2) {
        self.local_pos += TRANSLATE_SPEED * (to - from) * self.distance;
    }

    pub fn zoom(&mut self, delta: f32, window_height: f32) {
        self.distance = zoomed(self.distance, delta, window_height);
    }

    pub fn look_at_x(&mut self) {
        self.set_angles(0.0, 0.0);
    }

    pub fn look_at_y(&mut self) {
        self.set_angles(FRAC_PI_2, 0.0);
    }

    pub fn look_at_z(&mut self) {
        self.set_angles(-FRAC_PI_2, FRAC_PI_2);
    }

    /// Turn both angles by half a revolution. The pan offset is kept.
    pub fn look_at_minus(&mut self) {
        self.azimuth += PI;
        self.polar += PI;
        tracing::debug!(azimuth = self.azimuth, polar = self.polar, "camera turned");
    }

    fn set_angles(&mut self, azimuth: f32, polar: f32) {
        self.azimuth = azimuth;
        self.polar = polar;
        self.local_pos = Vec2::ZERO;
        tracing::debug!(azimuth, polar, "camera preset");
    }

    /// Camera frame `(U, V, N)`: right, up, and backwards (from center to eye).
    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        let (sin_a, cos_a) = self.azimuth.sin_cos();
        let (sin_p, cos_p) = self.polar.sin_cos();
        let u = Vec3::new(-sin_a, cos_a, 0.0);
        let v = Vec3::new(-cos_a * sin_p, -sin_p * sin_a, cos_p);
        let n = Vec3::new(cos_p * cos_a, cos_p * sin_a, sin_p);
        (u, v, n)
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::looking_down(2.0)
    }
}

impl CameraController for OrbitCamera {
    fn apply(&mut self, action: &Action) {
        match *action {
            Action::Translate { from, to } => self.translate(from, to),
            Action::Orbit { du, dv } => self.orbit(du, dv),
            Action::Zoom {
                delta,
                window_height,
            } => self.zoom(delta, window_height),
            Action::LookAtX => self.look_at_x(),
            Action::LookAtY => self.look_at_y(),
            Action::LookAtZ => self.look_at_z(),
            Action::LookAtMinus => self.look_at_minus(),
            _ => {}
        }
    }

    fn view_matrix(&self) -> Mat4 {
        let (u, v, n) = self.basis();
        let eye = self.eye();
        from_rows([
            [u.x, u.y, u.z, -u.dot(eye)],
            [v.x, v.y, v.z, -v.dot(eye)],
            [n.x, n.y, n.z, -n.dot(eye)],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    fn projection_matrix(&self, window_size: Vec2) -> Mat4 {
        projection_matrix(self.distance, window_size)
    }

    fn distance(&self) -> f32 {
        self.distance
    }

    fn eye(&self) -> Vec3 {
        let (u, v, n) = self.basis();
        self.center + self.distance * n - (self.local_pos.x * u + self.local_pos.y * v)
    }

    fn target(&self) -> Vec3 {
        let (u, v, _) = self.basis();
        self.center - (self.local_pos.x * u + self.local_pos.y * v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn zoom_scales_distance() {
        let mut cam = OrbitCamera::default();
        cam.apply(&Action::Zoom {
            delta: 1.0,
            window_height: 100.0,
        });
        assert_eq!(cam.distance(), 1.0);
        cam.apply(&Action::Zoom {
            delta: -1.0,
            window_height: 100.0,
        });
        assert_eq!(cam.distance(), 1.5);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut cam = PanCamera::new(2.0);
        cam.zoom(10.0, 100.0);
        assert_eq!(cam.distance(), DISTANCE_MIN);
        assert_eq!(PanCamera::new(0.0).distance(), DISTANCE_MIN);
    }

    #[test]
    fn pan_translation_scales_with_distance() {
        let mut cam = PanCamera::new(2.0);
        cam.apply(&Action::Translate {
            from: Vec2::ZERO,
            to: Vec2::new(10.0, -5.0),
        });
        assert!(cam.pos.abs_diff_eq(Vec2::new(0.04, -0.02), 1e-6));
    }

    #[test]
    fn pan_view_is_a_translation() {
        let mut cam = PanCamera::new(3.0);
        cam.pos = Vec2::new(1.0, -2.0);
        let p = cam.view_matrix() * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert_eq!(p, Vec4::new(1.0, -2.0, -3.0, 1.0));
    }

    #[test]
    fn pan_camera_ignores_orbit() {
        let mut cam = PanCamera::default();
        let before = cam;
        cam.apply(&Action::Orbit { du: 1.0, dv: 1.0 });
        cam.apply(&Action::LookAtX);
        assert_eq!(cam, before);
    }

    #[test]
    fn default_orbit_looks_down_z() {
        let cam = OrbitCamera::default();
        assert!(cam.eye().abs_diff_eq(Vec3::new(0.0, 0.0, 2.0), 1e-6));
        let p = cam.view_matrix() * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert!(p.abs_diff_eq(Vec4::new(0.0, 0.0, -2.0, 1.0), 1e-6));
    }

    #[test]
    fn basis_is_orthonormal() {
        let mut cam = OrbitCamera::default();
        cam.orbit(0.7, -0.3);
        let (u, v, n) = cam.basis();
        for (a, b) in [(u, v), (v, n), (u, n)] {
            assert!(a.dot(b).abs() < 1e-6);
        }
        for axis in [u, v, n] {
            assert!((axis.length() - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn view_maps_eye_to_origin() {
        let mut cam = OrbitCamera::new(Vec3::new(1.0, 2.0, 3.0), 5.0, 0.4, 0.9);
        cam.local_pos = Vec2::new(0.3, -0.1);
        let p = cam.view_matrix() * cam.eye().extend(1.0);
        assert!(p.abs_diff_eq(Vec4::new(0.0, 0.0, 0.0, 1.0), 1e-5));
        // target sits straight ahead, along -N
        let t = cam.view_matrix() * cam.target().extend(1.0);
        assert!(t.abs_diff_eq(Vec4::new(0.0, 0.0, -5.0, 1.0), 1e-5));
    }

    #[test]
    fn look_at_presets_reset_offset() {
        let mut cam = OrbitCamera::default();
        cam.local_pos = Vec2::new(1.0, 1.0);
        cam.apply(&Action::LookAtX);
        assert_eq!((cam.azimuth, cam.polar), (0.0, 0.0));
        assert_eq!(cam.local_pos, Vec2::ZERO);
        assert!(cam.eye().abs_diff_eq(Vec3::new(2.0, 0.0, 0.0), 1e-6));

        cam.apply(&Action::LookAtY);
        assert!(cam.eye().abs_diff_eq(Vec3::new(0.0, 2.0, 0.0), 1e-6));

        cam.apply(&Action::LookAtZ);
        assert!(cam.eye().abs_diff_eq(Vec3::new(0.0, 0.0, 2.0), 1e-6));
    }

    #[test]
    fn look_at_minus_turns_both_angles() {
        let mut cam = OrbitCamera::default();
        cam.look_at_x();
        cam.look_at_minus();
        assert!((cam.azimuth - PI).abs() < 1e-6);
        assert!((cam.polar - PI).abs() < 1e-6);
        // on the equator the eye stays put and the frame turns upside down
        assert!(cam.eye().abs_diff_eq(Vec3::new(2.0, 0.0, 0.0), 1e-5));
        let (u, v, _) = cam.basis();
        assert!(u.abs_diff_eq(Vec3::new(0.0, -1.0, 0.0), 1e-5));
        assert!(v.abs_diff_eq(Vec3::new(0.0, 0.0, -1.0), 1e-5));
    }

    #[test]
    fn projection_divides_x_by_aspect() {
        let proj = projection_matrix(2.0, Vec2::new(800.0, 400.0));
        assert_eq!(proj.x_axis.x, 0.5);
        assert_eq!(proj.y_axis.y, 1.0);
        assert_eq!(proj.z_axis.w, -1.0);
        assert_eq!(proj.w_axis.w, 0.0);
        // a point on the near plane lands at clip depth -1
        let near = proj * Vec4::new(0.0, 0.0, -0.02, 1.0);
        assert!((near.z / near.w + 1.0).abs() < 1e-4);
    }

    #[test]
    fn zero_height_window_does_not_divide_by_zero() {
        let proj = projection_matrix(1.0, Vec2::new(100.0, 0.0));
        assert!(proj.is_finite());
    }
}
