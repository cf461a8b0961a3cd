//! Developer tooling: simulation inspector, trace recording, energy drift
//! monitoring and plotting.
//!
//! # Invariants
//! - Tools only read a [`simteach_kernel::Simulation`]; they never step it.
//! - Sampling and plotting happen here, never inside a dynamic system.

pub mod energy;
pub mod inspector;
pub mod plot;
pub mod trace;

pub use energy::{EnergyDrift, EnergyMonitor};
pub use inspector::{SimulationInspector, SimulationSummary, SystemInfo};
pub use plot::PlotSink;
pub use trace::{Channel, DEFAULT_CAPACITY, Trace, TraceRecorder};

/// Errors raised by the tools.
#[derive(Debug, thiserror::Error)]
pub enum ToolsError {
    #[error("trace has no samples")]
    EmptyTrace,
    #[error("gnuplot error: {0}")]
    Plot(String),
}
