//! Geometry containers: generic meshes, rigid bodies and cubes.
//!
//! Containers are passive. Dynamic systems write into them; renderers read
//! them through [`MeshLike`] and clear the stale flags once they have
//! re-uploaded.
//!
//! # Invariants
//! - Every write to positions, colours, center or rotation marks the matching
//!   consumer buffer stale.
//! - Buffer lengths are fixed at construction; writes that change them fail.

mod cube;
mod mesh;
mod rigid_body;
mod tracked;

pub use cube::{CUBE_COLOURS, CUBE_INDICES, CUBE_REF_VERTICES, Cube3D};
pub use mesh::Mesh3D;
pub use rigid_body::RigidBody3D;
pub use tracked::Tracked;

/// Errors from geometry construction and writes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeometryError {
    #[error("wrong {buffer} buffer size: expected {expected}, got {actual}")]
    WrongBufferSize {
        buffer: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("positions buffer length {0} is not a multiple of 3")]
    PositionsNotTriplets(usize),
    #[error("index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },
}

/// Contract shared by every geometry a renderer can draw.
///
/// Consumers check the stale flags, re-read the data they need, then mark the
/// buffer clean. Reading positions may recompute derived vertices, hence
/// `&mut self`.
pub trait MeshLike {
    /// Number of vertices.
    fn vertex_count(&self) -> usize;

    /// Primitive indices into the vertex array.
    fn indices(&self) -> &[u32];

    /// Flat per-vertex RGB colours.
    fn colours(&self) -> &[f32];

    /// Flat xyz world positions, narrowed to `f32` for upload.
    fn positions_f32(&mut self) -> Vec<f32>;

    /// Whether positions changed since the last [`MeshLike::mark_positions_clean`].
    fn positions_stale(&self) -> bool;

    /// Whether colours changed since the last [`MeshLike::mark_colours_clean`].
    fn colours_stale(&self) -> bool;

    fn mark_positions_clean(&mut self);

    fn mark_colours_clean(&mut self);
}
