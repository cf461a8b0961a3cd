use glam::DVec3;
use simteach_geom::{Mesh3D, MeshLike};

use crate::{DynamicSystem, IntegrationError, PendulumConfig, PendulumTelemetry, Telemetry};

/// Planar pendulum advanced with explicit (forward) Euler.
///
/// Both updates read the pre-step state:
/// ```text
/// theta'    = theta + h * theta_dot
/// theta_dot' = theta_dot + h * (-g / l) * sin(theta)
/// ```
/// No stability control: the mechanical energy drifts, and watching it drift
/// is the point of the exercise.
#[derive(Debug, Clone)]
pub struct PendulumDynamicSystem {
    gravity: f64,
    length: f64,
    mass: f64,
    h: f64,
    theta: f64,
    theta_dot: f64,
    energy: PendulumTelemetry,
    rod: Mesh3D,
}

impl PendulumDynamicSystem {
    pub fn new(config: &PendulumConfig) -> Self {
        let mut system = Self {
            gravity: config.gravity,
            length: config.length,
            mass: config.mass,
            h: config.h,
            theta: config.theta,
            theta_dot: config.theta_dot,
            energy: PendulumTelemetry {
                theta: 0.0,
                theta_dot: 0.0,
                kinetic: 0.0,
                potential: 0.0,
                mechanical: 0.0,
            },
            rod: Mesh3D::rod(config.length),
        };
        system.energy = system.diagnostics();
        system
    }

    pub fn theta(&self) -> f64 {
        self.theta
    }

    pub fn theta_dot(&self) -> f64 {
        self.theta_dot
    }

    pub fn rod(&self) -> &Mesh3D {
        &self.rod
    }

    /// Position of the free end for the current angle.
    pub fn bob_position(&self) -> DVec3 {
        DVec3::new(
            self.length * self.theta.sin(),
            -self.length * self.theta.cos(),
            0.0,
        )
    }

    fn diagnostics(&self) -> PendulumTelemetry {
        let kinetic = 0.5 * self.mass * (self.length * self.theta_dot).powi(2);
        let potential = self.mass * self.gravity * (-self.length * self.theta.cos());
        PendulumTelemetry {
            theta: self.theta,
            theta_dot: self.theta_dot,
            kinetic,
            potential,
            mechanical: kinetic + potential,
        }
    }
}

impl DynamicSystem for PendulumDynamicSystem {
    fn name(&self) -> &'static str {
        "pendulum"
    }

    fn step(&mut self) -> Result<(), IntegrationError> {
        let theta = self.theta + self.h * self.theta_dot;
        let theta_dot = self.theta_dot + self.h * -(self.gravity / self.length) * self.theta.sin();
        let offender = if !theta.is_finite() {
            Some("theta")
        } else if !theta_dot.is_finite() {
            Some("theta_dot")
        } else {
            None
        };
        if let Some(quantity) = offender {
            return Err(IntegrationError::NonFinite {
                system: "pendulum",
                quantity,
            });
        }

        // The rod shows the state at the start of the step.
        self.rod.set_vertex(0, self.bob_position())?;
        self.theta = theta;
        self.theta_dot = theta_dot;
        self.energy = self.diagnostics();
        Ok(())
    }

    fn telemetry(&self) -> Telemetry {
        Telemetry::Pendulum(self.energy)
    }

    fn shape(&self) -> &dyn MeshLike {
        &self.rod
    }

    fn shape_mut(&mut self) -> &mut dyn MeshLike {
        &mut self.rod
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_6;

    fn pendulum(theta: f64, theta_dot: f64, h: f64) -> PendulumDynamicSystem {
        PendulumDynamicSystem::new(&PendulumConfig {
            theta,
            theta_dot,
            h,
            ..PendulumConfig::default()
        })
    }

    fn mechanical(p: &PendulumDynamicSystem) -> f64 {
        p.telemetry().energy()
    }

    fn max_drift(mut p: PendulumDynamicSystem, steps: usize) -> f64 {
        let start = mechanical(&p);
        let mut worst = 0.0_f64;
        for _ in 0..steps {
            p.step().unwrap();
            worst = worst.max((mechanical(&p) - start).abs());
        }
        worst
    }

    #[test]
    fn rest_is_a_fixed_point() {
        let mut p = pendulum(0.0, 0.0, 0.01);
        for _ in 0..10_000 {
            p.step().unwrap();
        }
        assert_eq!(p.theta(), 0.0);
        assert_eq!(p.theta_dot(), 0.0);
    }

    #[test]
    fn single_step_matches_forward_euler() {
        let mut p = pendulum(FRAC_PI_6, 0.2, 0.01);
        p.step().unwrap();
        let expected_theta = FRAC_PI_6 + 0.01 * 0.2;
        let expected_dot = 0.2 + 0.01 * -(9.81 / 0.5) * FRAC_PI_6.sin();
        assert_eq!(p.theta(), expected_theta);
        assert_eq!(p.theta_dot(), expected_dot);
    }

    #[test]
    fn energy_diagnostics_after_step() {
        let mut p = pendulum(FRAC_PI_6, 0.0, 0.01);
        p.step().unwrap();
        let Telemetry::Pendulum(t) = p.telemetry() else {
            panic!("pendulum publishes pendulum telemetry");
        };
        let kinetic = 0.5 * 1.0 * (0.5 * p.theta_dot()).powi(2);
        let potential = 1.0 * 9.81 * (-0.5 * p.theta().cos());
        assert_eq!(t.kinetic, kinetic);
        assert_eq!(t.potential, potential);
        assert_eq!(t.mechanical, kinetic + potential);
    }

    #[test]
    fn initial_energy_is_potential_only() {
        let p = pendulum(FRAC_PI_6, 0.0, 0.01);
        let expected = -9.81 * 0.5 * FRAC_PI_6.cos();
        assert!((mechanical(&p) - expected).abs() < 1e-12);
    }

    #[test]
    fn drift_is_bounded_for_reference_step() {
        let drift = max_drift(pendulum(FRAC_PI_6, 0.0, 0.01), 1000);
        assert!(drift > 0.0);
        assert!(drift < 3.5, "drift {drift}");
    }

    #[test]
    fn drift_shrinks_with_step_size() {
        let coarse = max_drift(pendulum(FRAC_PI_6, 0.0, 0.01), 1000);
        let fine = max_drift(pendulum(FRAC_PI_6, 0.0, 0.001), 1000);
        assert!(fine < 0.05, "fine drift {fine}");
        assert!(fine < coarse);
    }

    #[test]
    fn rod_shows_state_at_start_of_step() {
        let mut p = pendulum(FRAC_PI_6, 0.0, 0.01);
        p.shape_mut().mark_positions_clean();
        let before = p.bob_position();
        p.step().unwrap();
        assert_eq!(p.rod().vertex(0), Some(before));
        assert_eq!(p.rod().vertex(1), Some(DVec3::ZERO));
        assert!(p.shape().positions_stale());
    }

    #[test]
    fn overflow_is_reported_and_state_kept() {
        let mut p = pendulum(0.0, f64::MAX, 10.0);
        p.shape_mut().mark_positions_clean();
        let theta_before = p.theta();
        let rod_before = p.rod().vertex(0);
        let err = p.step().unwrap_err();
        assert!(matches!(
            err,
            IntegrationError::NonFinite {
                system: "pendulum",
                quantity: "theta"
            }
        ));
        assert_eq!(p.theta(), theta_before);
        assert_eq!(p.rod().vertex(0), rod_before);
        assert!(!p.shape().positions_stale());
    }

    #[test]
    fn angular_velocity_overflow_is_named() {
        let mut p = PendulumDynamicSystem::new(&PendulumConfig {
            theta: 0.5,
            theta_dot: 0.0,
            gravity: 1e308,
            length: 1e-10,
            h: 0.01,
            ..PendulumConfig::default()
        });
        p.shape_mut().mark_positions_clean();
        let rod_before = p.rod().vertex(0);
        let err = p.step().unwrap_err();
        assert!(matches!(
            err,
            IntegrationError::NonFinite {
                system: "pendulum",
                quantity: "theta_dot"
            }
        ));
        assert_eq!(p.theta(), 0.5);
        assert_eq!(p.theta_dot(), 0.0);
        assert_eq!(p.rod().vertex(0), rod_before);
        assert!(!p.shape().positions_stale());
    }
}
