//! Semi-implicit exponential-map integrator for rigid-body rotation.
//!
//! One step with body-frame angular velocity `ω`, world-frame torque `τ` and
//! time step `h`:
//! ```text
//! ω' = J⁻¹ · exp(-h S(ω)) · (J ω + h Rᵀ τ)
//! a  = (ω' - ω) / h
//! R' = orthonormalize(R · exp(h S(ω')))
//! ```
//!
//! # Invariants
//! - `J` is checked for invertibility once, at construction; `J⁻¹` is cached.
//! - Under zero torque `|Jω|` changes only by roundoff: the momentum update is
//!   a pure rotation.
//! - `R` is re-orthonormalised after every step.

use glam::{DMat3, DVec3};
use simteach_common::{inertia_tensor, so3};

use crate::{IntegrationError, RigidBodyTelemetry};

/// Relative determinant below which an inertia tensor counts as singular.
const SINGULAR_TOLERANCE: f64 = 1e-12;

/// Orientation and rates of a rigid body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngularState {
    /// Body to world rotation.
    pub rotation: DMat3,
    /// Body-frame angular velocity.
    pub omega: DVec3,
    /// Body-frame angular acceleration over the last step.
    pub alpha: DVec3,
}

impl AngularState {
    pub fn new(rotation: DMat3, omega: DVec3) -> Self {
        Self {
            rotation,
            omega,
            alpha: DVec3::ZERO,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.rotation.is_finite() && self.omega.is_finite() && self.alpha.is_finite()
    }

    /// Name of the first non-finite component, if any.
    pub(crate) fn non_finite_quantity(&self) -> Option<&'static str> {
        if !self.omega.is_finite() {
            Some("angular velocity")
        } else if !self.alpha.is_finite() {
            Some("angular acceleration")
        } else if !self.rotation.is_finite() {
            Some("rotation")
        } else {
            None
        }
    }
}

impl Default for AngularState {
    fn default() -> Self {
        Self::new(DMat3::IDENTITY, DVec3::ZERO)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngularIntegrator {
    inertia: DMat3,
    inertia_inv: DMat3,
    dt: f64,
}

impl AngularIntegrator {
    /// Fails with [`IntegrationError::SingularInertia`] if `inertia` is not
    /// invertible (or not finite).
    pub fn new(inertia: DMat3, dt: f64) -> Result<Self, IntegrationError> {
        let determinant = inertia.determinant();
        let scale = inertia
            .to_cols_array()
            .iter()
            .fold(0.0_f64, |acc, v| acc.max(v.abs()));
        let singular = !determinant.is_finite()
            || scale == 0.0
            || determinant.abs() <= SINGULAR_TOLERANCE * scale.powi(3);
        if singular {
            tracing::warn!(determinant, "rejecting singular inertia tensor");
            return Err(IntegrationError::SingularInertia { determinant });
        }
        Ok(Self {
            inertia,
            inertia_inv: inertia.inverse(),
            dt,
        })
    }

    /// Integrator for a body made of point masses at body-frame offsets.
    pub fn from_point_masses(
        points: impl IntoIterator<Item = (DVec3, f64)>,
        dt: f64,
    ) -> Result<Self, IntegrationError> {
        Self::new(inertia_tensor(points), dt)
    }

    pub fn inertia(&self) -> DMat3 {
        self.inertia
    }

    pub fn inertia_inv(&self) -> DMat3 {
        self.inertia_inv
    }

    /// Advance `state` by one step under the world-frame `torque`.
    ///
    /// The result is not checked for finiteness; callers decide whether to
    /// commit it.
    pub fn step(&self, state: &AngularState, torque: DVec3) -> AngularState {
        let h = self.dt;
        let momentum = self.inertia * state.omega + h * (state.rotation.transpose() * torque);
        let omega = self.inertia_inv * (so3::exp(-h * state.omega) * momentum);
        let alpha = (omega - state.omega) / h;
        let rotation = so3::orthonormalize(state.rotation * so3::exp(h * omega));
        AngularState {
            rotation,
            omega,
            alpha,
        }
    }

    /// Rotational kinetic energy `0.5 ωᵀJω`.
    pub fn kinetic_energy(&self, omega: DVec3) -> f64 {
        0.5 * omega.dot(self.inertia * omega)
    }

    /// Body-frame angular momentum `Jω`.
    pub fn angular_momentum(&self, omega: DVec3) -> DVec3 {
        self.inertia * omega
    }

    pub fn telemetry(&self, state: &AngularState) -> RigidBodyTelemetry {
        RigidBodyTelemetry {
            omega: state.omega.to_array(),
            angular_acceleration: state.alpha.to_array(),
            kinetic: self.kinetic_energy(state.omega),
            angular_momentum: self.angular_momentum(state.omega).length(),
            orthonormality_error: so3::orthonormality_error(state.rotation),
        }
    }
}
