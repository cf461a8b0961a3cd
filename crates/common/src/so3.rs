use glam::{DMat3, DVec3};

/// Below this rotation angle the exponential map falls back to its
/// second-order series.
const SMALL_ANGLE: f64 = 1e-8;

/// Skew-symmetric cross-product matrix of `w`.
///
/// `skew(w) * v == w.cross(v)` for every `v`. Row layout:
/// `[[0, -wz, wy], [wz, 0, -wx], [-wy, wx, 0]]`.
pub fn skew(w: DVec3) -> DMat3 {
    DMat3::from_cols(
        DVec3::new(0.0, w.z, -w.y),
        DVec3::new(-w.z, 0.0, w.x),
        DVec3::new(w.y, -w.x, 0.0),
    )
}

/// Exponential map from a rotation vector to a rotation matrix.
///
/// `exp(w)` is the rotation by `|w|` radians about `w / |w|` (Rodrigues).
/// A zero vector maps to exactly [`DMat3::IDENTITY`].
pub fn exp(w: DVec3) -> DMat3 {
    let s = skew(w);
    let s2 = s * s;
    let angle = w.length();
    if angle < SMALL_ANGLE {
        return DMat3::IDENTITY + s + s2 * 0.5;
    }
    let a = angle.sin() / angle;
    let b = (1.0 - angle.cos()) / (angle * angle);
    DMat3::IDENTITY + s * a + s2 * b
}

/// Project a nearly-orthonormal matrix back onto SO(3) (Gram-Schmidt on the
/// columns, third column rebuilt from the cross product).
pub fn orthonormalize(m: DMat3) -> DMat3 {
    let x = m.x_axis.normalize();
    let y = (m.y_axis - x * x.dot(m.y_axis)).normalize();
    let z = x.cross(y);
    DMat3::from_cols(x, y, z)
}

/// Largest absolute entry of `mᵀm - I`. Zero for an exact rotation.
pub fn orthonormality_error(m: DMat3) -> f64 {
    let d = m.transpose() * m - DMat3::IDENTITY;
    d.to_cols_array()
        .iter()
        .fold(0.0_f64, |acc, v| acc.max(v.abs()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skew_matches_cross_product() {
        let w = DVec3::new(0.3, -1.2, 2.0);
        let v = DVec3::new(-4.0, 0.5, 1.5);
        let lhs = skew(w) * v;
        assert!(lhs.abs_diff_eq(w.cross(v), 1e-12));
    }

    #[test]
    fn skew_is_antisymmetric() {
        let s = skew(DVec3::new(1.0, 2.0, 3.0));
        assert!((s + s.transpose()).abs_diff_eq(DMat3::ZERO, 0.0));
    }

    #[test]
    fn exp_of_zero_is_identity() {
        assert_eq!(exp(DVec3::ZERO), DMat3::IDENTITY);
    }

    #[test]
    fn exp_matches_axis_angle() {
        let axis = DVec3::new(1.0, 2.0, -0.5).normalize();
        let angle = 0.7;
        let r = exp(axis * angle);
        assert!(r.abs_diff_eq(DMat3::from_axis_angle(axis, angle), 1e-12));
    }

    #[test]
    fn exp_small_angle_is_orthonormal() {
        let r = exp(DVec3::new(1e-10, -2e-10, 5e-11));
        assert!(orthonormality_error(r) < 1e-15);
    }

    #[test]
    fn exp_is_a_rotation() {
        let r = exp(DVec3::new(2.0, -1.0, 3.0));
        assert!(orthonormality_error(r) < 1e-12);
        assert!((r.determinant() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn orthonormalize_fixes_drift() {
        let r = DMat3::from_rotation_z(0.4);
        let noise = DMat3::from_cols_array(&[
            1e-6, 0.0, 2e-6, //
            0.0, -1e-6, 0.0, //
            0.0, 0.0, 3e-6,
        ]);
        let drifted = r + noise;
        assert!(orthonormality_error(drifted) > 1e-7);
        let fixed = orthonormalize(drifted);
        assert!(orthonormality_error(fixed) < 1e-14);
        assert!(fixed.abs_diff_eq(r, 1e-5));
    }

    #[test]
    fn orthonormalize_keeps_identity() {
        assert_eq!(orthonormalize(DMat3::IDENTITY), DMat3::IDENTITY);
    }
}
