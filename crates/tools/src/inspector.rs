use simteach_kernel::{Simulation, Telemetry};

/// Read-only queries against a running simulation, for debug output and the
/// desktop side panel.
pub struct SimulationInspector;

impl SimulationInspector {
    pub fn summary(sim: &Simulation) -> SimulationSummary {
        SimulationSummary {
            tick: sim.tick(),
            halted: sim.is_halted(),
            system_count: sim.system_count(),
            pending_events: sim.events().len(),
        }
    }

    /// Details of the system at `index`, in stepping order.
    pub fn inspect_system(sim: &Simulation, index: usize) -> Option<SystemInfo> {
        sim.systems().get(index).map(|system| {
            let shape = system.shape();
            SystemInfo {
                name: system.name(),
                vertex_count: shape.vertex_count(),
                index_count: shape.indices().len(),
                telemetry: system.telemetry(),
            }
        })
    }

    pub fn list_systems(sim: &Simulation) -> Vec<&'static str> {
        sim.systems().iter().map(|s| s.name()).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationSummary {
    pub tick: u64,
    pub halted: bool,
    pub system_count: usize,
    pub pending_events: usize,
}

impl std::fmt::Display for SimulationSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Simulation: tick={} halted={} systems={} pending_events={}",
            self.tick, self.halted, self.system_count, self.pending_events
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SystemInfo {
    pub name: &'static str,
    pub vertex_count: usize,
    pub index_count: usize,
    pub telemetry: Telemetry,
}

impl std::fmt::Display for SystemInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] vertices={} indices={} ",
            self.name, self.vertex_count, self.index_count
        )?;
        match &self.telemetry {
            Telemetry::Pendulum(p) => write!(
                f,
                "theta={:.4} theta_dot={:.4} E={:.6}",
                p.theta, p.theta_dot, p.mechanical
            ),
            Telemetry::RigidBody(r) => write!(
                f,
                "w=({:.3}, {:.3}, {:.3}) T={:.6} |Jw|={:.6}",
                r.omega[0], r.omega[1], r.omega[2], r.kinetic, r.angular_momentum
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simteach_kernel::{SceneConfig, SceneKind};

    #[test]
    fn summary_empty_simulation() {
        let sim = Simulation::new();
        let summary = SimulationInspector::summary(&sim);
        assert_eq!(summary.tick, 0);
        assert_eq!(summary.system_count, 0);
        assert!(!summary.halted);
    }

    #[test]
    fn summary_after_steps() {
        let mut sim = SceneConfig::default().build(SceneKind::Square).unwrap();
        sim.step().unwrap();
        sim.step().unwrap();

        let summary = SimulationInspector::summary(&sim);
        assert_eq!(summary.tick, 2);
        assert_eq!(summary.system_count, 1);
        assert_eq!(summary.pending_events, 2);
        assert!(summary.to_string().contains("tick=2"));
    }

    #[test]
    fn inspect_pendulum() {
        let sim = SceneConfig::default().build(SceneKind::Pendulum).unwrap();
        let info = SimulationInspector::inspect_system(&sim, 0).unwrap();
        assert_eq!(info.name, "pendulum");
        assert_eq!(info.vertex_count, 2);
        assert!(matches!(info.telemetry, Telemetry::Pendulum(_)));
        assert!(info.to_string().starts_with("[pendulum] vertices=2"));
    }

    #[test]
    fn inspect_cube() {
        let sim = SceneConfig::default().build(SceneKind::Cube).unwrap();
        let info = SimulationInspector::inspect_system(&sim, 0).unwrap();
        assert_eq!(info.name, "spinning_cube");
        assert_eq!(info.vertex_count, 8);
        assert_eq!(info.index_count, 36);
        assert!(info.to_string().contains("|Jw|="));
    }

    #[test]
    fn inspect_missing_index() {
        let sim = Simulation::new();
        assert!(SimulationInspector::inspect_system(&sim, 0).is_none());
    }

    #[test]
    fn list_systems_in_order() {
        let sim = SceneConfig::default().build(SceneKind::Cube).unwrap();
        assert_eq!(SimulationInspector::list_systems(&sim), vec!["spinning_cube"]);
    }
}
