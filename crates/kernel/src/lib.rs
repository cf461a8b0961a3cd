//! Simulation kernel: dynamic systems, stepping, telemetry hand-off, scene setup.
//!
//! # Invariants
//! - A system's `step()` is a pure state transition plus a write into the
//!   geometry it owns; it never samples, logs per-sample data or plots.
//! - Telemetry flows out through [`TelemetrySink`]s driven by the caller.
//! - A failed step leaves the failing system in its pre-step state and halts
//!   the [`Simulation`] until it is resumed.

pub mod angular;
pub mod config;
pub mod pendulum;
pub mod simulation;
pub mod spinning_cube;
pub mod spinning_square;
pub mod system;

pub use angular::{AngularIntegrator, AngularState};
pub use config::{ConfigError, CubeConfig, PendulumConfig, SceneConfig, SceneKind, SquareConfig};
pub use pendulum::PendulumDynamicSystem;
pub use simulation::{EVENT_LOG_CAPACITY, SimEvent, Simulation, SimulationError};
pub use spinning_cube::SpinningCubeDynamicSystem;
pub use spinning_square::SpinningSquareDynamicSystem;
pub use system::{
    DynamicSystem, IntegrationError, PendulumTelemetry, RigidBodyTelemetry, Telemetry,
    TelemetrySink,
};
