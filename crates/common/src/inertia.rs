use glam::{DMat3, DVec3};

/// Inertia contribution of a point mass `m` at body-frame offset `p`.
///
/// ```text
/// [[ m(y²+z²), -mxy,      -mxz     ],
///  [ -mxy,      m(x²+z²), -myz     ],
///  [ -mxz,     -myz,       m(x²+y²)]]
/// ```
pub fn point_inertia(p: DVec3, m: f64) -> DMat3 {
    let (x, y, z) = (p.x, p.y, p.z);
    let ixy = m * x * y;
    let ixz = m * x * z;
    let iyz = m * y * z;
    // Symmetric, so column-major and row-major layouts coincide.
    DMat3::from_cols(
        DVec3::new(m * (y * y + z * z), -ixy, -ixz),
        DVec3::new(-ixy, m * (x * x + z * z), -iyz),
        DVec3::new(-ixz, -iyz, m * (x * x + y * y)),
    )
}

/// Inertia tensor of a set of point masses given as `(offset, mass)` pairs.
pub fn inertia_tensor(points: impl IntoIterator<Item = (DVec3, f64)>) -> DMat3 {
    points
        .into_iter()
        .fold(DMat3::ZERO, |acc, (p, m)| acc + point_inertia(p, m))
}
