use glam::{DMat3, DVec3};
use simteach_geom::{Cube3D, MeshLike};

use crate::{
    AngularIntegrator, AngularState, CubeConfig, DynamicSystem, IntegrationError, Telemetry,
};

/// A box modelled as eight equal corner masses, driven by the same rotation
/// integrator as the square.
///
/// Only the rotation is written each step; [`Cube3D`] rebuilds its vertices
/// when they are next read.
#[derive(Debug, Clone)]
pub struct SpinningCubeDynamicSystem {
    integrator: AngularIntegrator,
    state: AngularState,
    torque: DVec3,
    cube: Cube3D,
}

impl SpinningCubeDynamicSystem {
    pub fn new(config: &CubeConfig) -> Result<Self, IntegrationError> {
        let cube = Cube3D::new(config.center, DMat3::IDENTITY, config.lengths);
        let corner_mass = config.mass / cube.ref_vertices().len() as f64;
        let integrator = AngularIntegrator::from_point_masses(
            cube.ref_vertices().iter().map(|&p| (p, corner_mass)),
            config.dt,
        )?;
        tracing::debug!(inertia = ?integrator.inertia(), "spinning cube ready");
        Ok(Self {
            integrator,
            state: AngularState::new(DMat3::IDENTITY, config.omega),
            torque: config.torque,
            cube,
        })
    }

    pub fn state(&self) -> &AngularState {
        &self.state
    }

    pub fn integrator(&self) -> &AngularIntegrator {
        &self.integrator
    }

    pub fn cube(&self) -> &Cube3D {
        &self.cube
    }

    pub fn cube_mut(&mut self) -> &mut Cube3D {
        &mut self.cube
    }

    pub fn set_torque(&mut self, torque: DVec3) {
        self.torque = torque;
    }
}

impl DynamicSystem for SpinningCubeDynamicSystem {
    fn name(&self) -> &'static str {
        "spinning_cube"
    }

    fn step(&mut self) -> Result<(), IntegrationError> {
        let next = self.integrator.step(&self.state, self.torque);
        if let Some(quantity) = next.non_finite_quantity() {
            return Err(IntegrationError::NonFinite {
                system: self.name(),
                quantity,
            });
        }
        self.cube.set_rotation(next.rotation);
        self.state = next;
        Ok(())
    }

    fn telemetry(&self) -> Telemetry {
        Telemetry::RigidBody(self.integrator.telemetry(&self.state))
    }

    fn shape(&self) -> &dyn MeshLike {
        &self.cube
    }

    fn shape_mut(&mut self) -> &mut dyn MeshLike {
        &mut self.cube
    }
}
