//! wgpu render backend.
//!
//! One [`ShaderProgram`] holds a pipeline per [`Primitive`]; each drawable
//! geometry gets a [`MeshRenderable`] that owns its GPU buffers and
//! re-uploads only what the geometry marks stale.
//!
//! # Invariants
//! - Rendering never steps the simulation; it only reads geometry and clears
//!   stale flags after uploading.
//! - Camera matrices arrive in OpenGL clip space and are remapped to wgpu depth
//!   here.
//! - GPU buffers are released when their renderable drops.

mod gpu;
mod program;
mod renderable;
mod shaders;

pub use gpu::{CLEAR_COLOUR, DEPTH_FORMAT, FrameTargets, OPENGL_TO_WGPU_MATRIX};
pub use program::{Primitive, ShaderProgram};
pub use renderable::{MeshRenderable, PendingUploads};

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("mesh has no vertices or no indices")]
    EmptyMesh,
    #[error("vertex count changed from {expected} to {actual}; GPU buffers are fixed-size")]
    VertexCountChanged { expected: usize, actual: usize },
}
