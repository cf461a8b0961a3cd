//! Rendering adapter: cameras and a renderer-agnostic interface.
//!
//! # Invariants
//! - Renderers read simulation state; they never step or mutate it.
//! - Camera matrices are pure functions of camera state and window size.
//!
//! The GPU backend lives in `simteach-render-wgpu`; [`DebugTextRenderer`]
//! implements the same trait for headless output and tests.

mod camera;
mod renderer;

pub use camera::{
    CameraController, DISTANCE_MIN, OrbitCamera, PanCamera, TRANSLATE_SPEED, ZOOM_SPEED,
    projection_matrix,
};
pub use renderer::{DebugTextRenderer, RenderView, Renderer};
