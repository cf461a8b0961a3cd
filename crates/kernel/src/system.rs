use serde::Serialize;
use simteach_geom::{GeometryError, MeshLike};

/// Errors raised while building or stepping a dynamic system.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IntegrationError {
    #[error("inertia tensor is singular (determinant {determinant})")]
    SingularInertia { determinant: f64 },
    #[error("{system}: non-finite {quantity} after step")]
    NonFinite {
        system: &'static str,
        quantity: &'static str,
    },
    #[error("geometry write failed: {0}")]
    Geometry(#[from] GeometryError),
}

/// Diagnostics of the pendulum after a step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PendulumTelemetry {
    pub theta: f64,
    pub theta_dot: f64,
    pub kinetic: f64,
    pub potential: f64,
    pub mechanical: f64,
}

/// Diagnostics of a spinning rigid body after a step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RigidBodyTelemetry {
    /// Body-frame angular velocity.
    pub omega: [f64; 3],
    /// Body-frame angular acceleration over the last step.
    pub angular_acceleration: [f64; 3],
    /// Rotational kinetic energy `0.5 ωᵀJω`.
    pub kinetic: f64,
    /// Magnitude of the body-frame angular momentum `|Jω|`.
    pub angular_momentum: f64,
    /// Largest entry of `RᵀR - I`.
    pub orthonormality_error: f64,
}

/// Per-step diagnostics published by a dynamic system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Telemetry {
    Pendulum(PendulumTelemetry),
    RigidBody(RigidBodyTelemetry),
}

impl Telemetry {
    /// Total energy tracked by the system: mechanical for the pendulum,
    /// rotational kinetic for rigid bodies.
    pub fn energy(&self) -> f64 {
        match self {
            Self::Pendulum(p) => p.mechanical,
            Self::RigidBody(r) => r.kinetic,
        }
    }
}

/// Consumer of per-step telemetry, invoked by the driving loop.
pub trait TelemetrySink {
    fn consume(&mut self, tick: u64, system: &str, telemetry: &Telemetry);
}

/// A model that owns its integration state and advances one step at a time,
/// writing the result into the geometry it owns.
pub trait DynamicSystem {
    /// Stable name used in logs and telemetry.
    fn name(&self) -> &'static str;

    /// Advance by one fixed time step.
    ///
    /// On error the system keeps its pre-step state.
    fn step(&mut self) -> Result<(), IntegrationError>;

    /// Diagnostics for the current state.
    fn telemetry(&self) -> Telemetry;

    /// Geometry written by [`DynamicSystem::step`].
    fn shape(&self) -> &dyn MeshLike;

    fn shape_mut(&mut self) -> &mut dyn MeshLike;
}
