//! Shared math for the dynamics crates: SO(3) helpers and point-mass inertia.
//!
//! # Conventions
//! - Rotation matrices map body-frame vectors to world-frame vectors.
//! - Angular velocities handed to [`so3::exp`] are body-frame vectors.
//! - All physics math is `f64`; GPU-facing code converts at the boundary.

pub mod inertia;
pub mod so3;

pub use inertia::{inertia_tensor, point_inertia};
