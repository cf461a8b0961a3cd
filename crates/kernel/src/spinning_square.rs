use glam::{DMat3, DVec3};
use simteach_geom::{Mesh3D, MeshLike, RigidBody3D};

use crate::{
    AngularIntegrator, AngularState, DynamicSystem, IntegrationError, SquareConfig, Telemetry,
};

/// Four equal point masses at the corners of a square, spinning freely in 3D.
///
/// Every step writes the world-space corners into the owned [`Mesh3D`].
#[derive(Debug, Clone)]
pub struct SpinningSquareDynamicSystem {
    integrator: AngularIntegrator,
    state: AngularState,
    torque: DVec3,
    body: RigidBody3D,
    /// Body-frame corner offsets, in mesh vertex order.
    corners: Vec<DVec3>,
    mesh: Mesh3D,
}

impl SpinningSquareDynamicSystem {
    pub fn new(config: &SquareConfig) -> Result<Self, IntegrationError> {
        let mut mesh = Mesh3D::square(config.side);
        let corners: Vec<DVec3> = (0..mesh.vertex_count()).filter_map(|i| mesh.vertex(i)).collect();
        let corner_mass = config.mass / corners.len() as f64;
        let integrator = AngularIntegrator::from_point_masses(
            corners.iter().map(|&p| (p, corner_mass)),
            config.dt,
        )?;

        let body = RigidBody3D::new(config.center, DMat3::IDENTITY);
        let world: Vec<DVec3> = corners.iter().map(|&p| body.to_world(p)).collect();
        mesh.set_vertices(&world)?;

        tracing::debug!(inertia = ?integrator.inertia(), "spinning square ready");
        Ok(Self {
            integrator,
            state: AngularState::new(DMat3::IDENTITY, config.omega),
            torque: config.torque,
            body,
            corners,
            mesh,
        })
    }

    pub fn state(&self) -> &AngularState {
        &self.state
    }

    pub fn integrator(&self) -> &AngularIntegrator {
        &self.integrator
    }

    pub fn body(&self) -> &RigidBody3D {
        &self.body
    }

    pub fn mesh(&self) -> &Mesh3D {
        &self.mesh
    }

    pub fn set_torque(&mut self, torque: DVec3) {
        self.torque = torque;
    }
}

impl DynamicSystem for SpinningSquareDynamicSystem {
    fn name(&self) -> &'static str {
        "spinning_square"
    }

    fn step(&mut self) -> Result<(), IntegrationError> {
        let next = self.integrator.step(&self.state, self.torque);
        if let Some(quantity) = next.non_finite_quantity() {
            return Err(IntegrationError::NonFinite {
                system: self.name(),
                quantity,
            });
        }

        let mut body = self.body.clone();
        body.set_rotation(next.rotation);
        let world: Vec<DVec3> = self.corners.iter().map(|&p| body.to_world(p)).collect();
        self.mesh.set_vertices(&world)?;

        self.body = body;
        self.state = next;
        Ok(())
    }

    fn telemetry(&self) -> Telemetry {
        Telemetry::RigidBody(self.integrator.telemetry(&self.state))
    }

    fn shape(&self) -> &dyn MeshLike {
        &self.mesh
    }

    fn shape_mut(&mut self) -> &mut dyn MeshLike {
        &mut self.mesh
    }
}
