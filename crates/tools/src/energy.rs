//! Energy drift monitoring.
//!
//! The first sample seen for a system is its baseline; publish the initial
//! state (`Simulation::publish`) before stepping to anchor it at tick 0.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use simteach_kernel::{Telemetry, TelemetrySink};

/// Drift of one system's energy against its baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnergyDrift {
    pub baseline: f64,
    pub latest: f64,
    /// Largest `|E - E₀|` seen so far.
    pub max_abs_drift: f64,
    pub samples: u64,
}

impl EnergyDrift {
    fn new(baseline: f64) -> Self {
        Self {
            baseline,
            latest: baseline,
            max_abs_drift: 0.0,
            samples: 1,
        }
    }

    pub fn abs_drift(&self) -> f64 {
        (self.latest - self.baseline).abs()
    }

    /// `|E - E₀| / |E₀|`, or the absolute drift when the baseline is ~0.
    pub fn relative_drift(&self) -> f64 {
        if self.baseline.abs() > 1e-12 {
            self.abs_drift() / self.baseline.abs()
        } else {
            self.abs_drift()
        }
    }
}

impl fmt::Display for EnergyDrift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "E0={:.6} E={:.6} drift={:.3e} max_drift={:.3e} ({} samples)",
            self.baseline,
            self.latest,
            self.abs_drift(),
            self.max_abs_drift,
            self.samples
        )
    }
}

/// Telemetry sink tracking energy drift per system.
#[derive(Debug, Clone, Default)]
pub struct EnergyMonitor {
    drifts: BTreeMap<String, EnergyDrift>,
}

impl EnergyMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drift(&self, system: &str) -> Option<&EnergyDrift> {
        self.drifts.get(system)
    }

    /// All tracked systems in name order.
    pub fn drifts(&self) -> impl Iterator<Item = (&str, &EnergyDrift)> {
        self.drifts.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Whether any system's largest absolute drift exceeds `tolerance`.
    pub fn is_violated(&self, tolerance: f64) -> bool {
        self.drifts.values().any(|d| d.max_abs_drift > tolerance)
    }

    pub fn reset(&mut self) {
        self.drifts.clear();
    }
}

impl TelemetrySink for EnergyMonitor {
    fn consume(&mut self, tick: u64, system: &str, telemetry: &Telemetry) {
        let energy = telemetry.energy();
        match self.drifts.get_mut(system) {
            Some(d) => {
                d.latest = energy;
                d.samples += 1;
                d.max_abs_drift = d.max_abs_drift.max(d.abs_drift());
            }
            None => {
                tracing::debug!(system, tick, baseline = energy, "energy baseline recorded");
                self.drifts.insert(system.to_string(), EnergyDrift::new(energy));
            }
        }
    }
}
