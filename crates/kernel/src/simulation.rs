use std::collections::VecDeque;

use serde::Serialize;

use crate::{DynamicSystem, IntegrationError, TelemetrySink};

/// Events kept by [`Simulation::events`]; older ones are dropped first.
pub const EVENT_LOG_CAPACITY: usize = 1024;

/// A record produced by every change to the simulation's run state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SimEvent {
    /// All systems advanced; `tick` is the new tick count.
    Stepped { tick: u64 },
    /// A system failed to step and the simulation halted.
    Faulted {
        tick: u64,
        system: &'static str,
        error: String,
    },
    /// Stepping was re-enabled after a fault.
    Resumed { tick: u64 },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimulationError {
    #[error("simulation halted at tick {tick}; call resume() to continue")]
    Halted { tick: u64 },
    #[error("{system} failed at tick {tick}: {source}")]
    Step {
        system: &'static str,
        tick: u64,
        #[source]
        source: IntegrationError,
    },
}

/// Owns the dynamic systems of a scene and advances them in lockstep.
///
/// The driving loop (window or CLI) calls [`Simulation::step`] once per fixed
/// tick. A failed step halts the simulation until [`Simulation::resume`].
#[derive(Default)]
pub struct Simulation {
    systems: Vec<Box<dyn DynamicSystem>>,
    tick: u64,
    halted: bool,
    /// Most recent run-state changes, at most [`EVENT_LOG_CAPACITY`].
    event_log: VecDeque<SimEvent>,
}

impl Simulation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a system. Systems step in insertion order.
    pub fn add_system(&mut self, system: Box<dyn DynamicSystem>) {
        tracing::info!(system = system.name(), "system added");
        self.systems.push(system);
    }

    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    pub fn systems(&self) -> &[Box<dyn DynamicSystem>] {
        &self.systems
    }

    pub fn systems_mut(&mut self) -> &mut [Box<dyn DynamicSystem>] {
        &mut self.systems
    }

    /// Number of completed steps.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Clear a halt left by a failed step. No-op when running.
    pub fn resume(&mut self) {
        if self.halted {
            self.halted = false;
            record(&mut self.event_log, SimEvent::Resumed { tick: self.tick });
            tracing::info!(tick = self.tick, "simulation resumed");
        }
    }

    /// Advance every system by one step.
    ///
    /// On failure the failing system keeps its pre-step state, systems that
    /// already stepped this tick keep their new state, the tick counter does
    /// not advance and the simulation halts.
    pub fn step(&mut self) -> Result<(), SimulationError> {
        if self.halted {
            return Err(SimulationError::Halted { tick: self.tick });
        }
        let span = tracing::debug_span!("simulation_step", tick = self.tick);
        let _guard = span.enter();

        for system in &mut self.systems {
            if let Err(source) = system.step() {
                let name = system.name();
                tracing::error!(system = name, tick = self.tick, error = %source, "step failed, halting");
                self.halted = true;
                let event = SimEvent::Faulted {
                    tick: self.tick,
                    system: name,
                    error: source.to_string(),
                };
                record(&mut self.event_log, event);
                return Err(SimulationError::Step {
                    system: name,
                    tick: self.tick,
                    source,
                });
            }
        }

        self.tick += 1;
        record(&mut self.event_log, SimEvent::Stepped { tick: self.tick });
        Ok(())
    }

    /// Step, then hand every system's telemetry to `sink`.
    pub fn step_with(&mut self, sink: &mut dyn TelemetrySink) -> Result<(), SimulationError> {
        self.step()?;
        self.publish(sink);
        Ok(())
    }

    /// Push the current telemetry of every system into `sink` without stepping.
    pub fn publish(&self, sink: &mut dyn TelemetrySink) {
        for system in &self.systems {
            sink.consume(self.tick, system.name(), &system.telemetry());
        }
    }

    /// Run `steps` steps, feeding telemetry to `sink` after each. Stops at the
    /// first failure.
    pub fn run(&mut self, steps: u64, sink: &mut dyn TelemetrySink) -> Result<(), SimulationError> {
        for _ in 0..steps {
            self.step_with(sink)?;
        }
        tracing::debug!(tick = self.tick, steps, "run complete");
        Ok(())
    }

    /// Read-only access to the event log, oldest first.
    pub fn events(&self) -> &VecDeque<SimEvent> {
        &self.event_log
    }

    /// Drain and return the event log.
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        self.event_log.drain(..).collect()
    }
}

fn record(log: &mut VecDeque<SimEvent>, event: SimEvent) {
    if log.len() == EVENT_LOG_CAPACITY {
        log.pop_front();
    }
    log.push_back(event);
}
