use std::fmt::Write as _;

use glam::{Vec2, Vec3};
use simteach_kernel::{Simulation, Telemetry};

use crate::CameraController;

/// Camera/view snapshot for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderView {
    /// Camera position in world space.
    pub eye: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    pub distance: f32,
    /// Drawable size in pixels.
    pub window_size: Vec2,
}

impl RenderView {
    pub fn from_camera(camera: &dyn CameraController, window_size: Vec2) -> Self {
        Self {
            eye: camera.eye(),
            target: camera.target(),
            distance: camera.distance(),
            window_size,
        }
    }
}

impl Default for RenderView {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, 2.0),
            target: Vec3::ZERO,
            distance: 2.0,
            window_size: Vec2::new(800.0, 600.0),
        }
    }
}

/// Renderer-agnostic interface.
///
/// The renderer reads simulation state and a view, then produces output. It
/// never steps the simulation.
pub trait Renderer {
    type Output;

    fn render(&self, sim: &Simulation, view: &RenderView) -> Self::Output;
}

/// Plain-text renderer for the CLI, logs and tests.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, sim: &Simulation, view: &RenderView) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "=== Simulation (tick={}, halted={}) ===",
            sim.tick(),
            sim.is_halted()
        );
        let _ = writeln!(out, "Systems: {}", sim.system_count());
        let _ = writeln!(
            out,
            "Camera: eye=({:.2}, {:.2}, {:.2}) target=({:.2}, {:.2}, {:.2}) distance={:.3}",
            view.eye.x, view.eye.y, view.eye.z, view.target.x, view.target.y, view.target.z,
            view.distance
        );

        for system in sim.systems() {
            let shape = system.shape();
            let _ = write!(
                out,
                "  [{}] vertices={} indices={}",
                system.name(),
                shape.vertex_count(),
                shape.indices().len()
            );
            match system.telemetry() {
                Telemetry::Pendulum(p) => {
                    let _ = writeln!(
                        out,
                        " theta={:.4} theta_dot={:.4} meca={:.6}",
                        p.theta, p.theta_dot, p.mechanical
                    );
                }
                Telemetry::RigidBody(r) => {
                    let _ = writeln!(
                        out,
                        " omega=({:.4}, {:.4}, {:.4}) kinetic={:.6} |Jw|={:.6}",
                        r.omega[0], r.omega[1], r.omega[2], r.kinetic, r.angular_momentum
                    );
                }
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OrbitCamera;
    use simteach_kernel::{SceneConfig, SceneKind};

    #[test]
    fn empty_simulation() {
        let sim = Simulation::new();
        let output = DebugTextRenderer::new().render(&sim, &RenderView::default());
        assert!(output.contains("tick=0"));
        assert!(output.contains("Systems: 0"));
    }

    #[test]
    fn pendulum_scene_lists_rod() {
        let mut sim = SceneConfig::default().build(SceneKind::Pendulum).unwrap();
        sim.step().unwrap();
        let output = DebugTextRenderer::new().render(&sim, &RenderView::default());
        assert!(output.contains("tick=1"));
        assert!(output.contains("[pendulum] vertices=2 indices=2"));
        assert!(output.contains("meca="));
    }

    #[test]
    fn cube_scene_reports_momentum() {
        let sim = SceneConfig::default().build(SceneKind::Cube).unwrap();
        let output = DebugTextRenderer::new().render(&sim, &RenderView::default());
        assert!(output.contains("[spinning_cube] vertices=8 indices=36"));
        assert!(output.contains("|Jw|="));
    }

    #[test]
    fn view_from_camera() {
        let camera = OrbitCamera::looking_down(5.0);
        let view = RenderView::from_camera(&camera, Vec2::new(640.0, 480.0));
        assert!(view.eye.abs_diff_eq(Vec3::new(0.0, 0.0, 5.0), 1e-5));
        assert_eq!(view.distance, 5.0);
        assert_eq!(view.window_size, Vec2::new(640.0, 480.0));
    }
}
