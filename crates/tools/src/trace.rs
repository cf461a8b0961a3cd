use serde::Serialize;
use simteach_kernel::{Telemetry, TelemetrySink};

/// Samples kept by a recorder built with [`TraceRecorder::default`].
pub const DEFAULT_CAPACITY: usize = 1000;

/// A scalar read out of a telemetry snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Theta,
    ThetaDot,
    Kinetic,
    Potential,
    /// Mechanical energy for the pendulum, kinetic for rigid bodies.
    Energy,
    AngularMomentum,
    OrthonormalityError,
}

impl Channel {
    /// The channel's value, or `None` if this kind of telemetry lacks it.
    pub fn sample(self, telemetry: &Telemetry) -> Option<f64> {
        match (self, telemetry) {
            (Self::Energy, t) => Some(t.energy()),
            (Self::Theta, Telemetry::Pendulum(p)) => Some(p.theta),
            (Self::ThetaDot, Telemetry::Pendulum(p)) => Some(p.theta_dot),
            (Self::Kinetic, Telemetry::Pendulum(p)) => Some(p.kinetic),
            (Self::Kinetic, Telemetry::RigidBody(r)) => Some(r.kinetic),
            (Self::Potential, Telemetry::Pendulum(p)) => Some(p.potential),
            (Self::AngularMomentum, Telemetry::RigidBody(r)) => Some(r.angular_momentum),
            (Self::OrthonormalityError, Telemetry::RigidBody(r)) => Some(r.orthonormality_error),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Theta => "theta (rad)",
            Self::ThetaDot => "theta_dot (rad/s)",
            Self::Kinetic => "kinetic energy (J)",
            Self::Potential => "potential energy (J)",
            Self::Energy => "energy (J)",
            Self::AngularMomentum => "|J omega|",
            Self::OrthonormalityError => "max |R^T R - I|",
        }
    }
}

/// A completed recording.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    pub system: String,
    pub channel: Channel,
    /// Tick of each sample.
    pub ticks: Vec<u64>,
    pub values: Vec<f64>,
}

/// Bounded history of one channel with a one-shot trigger.
///
/// Samples accumulate until `capacity` is reached; the recorder then fires
/// once (see [`TraceRecorder::take_fired`]) and ignores everything after.
/// A capacity of zero is raised to one. Buffers grow with the samples.
#[derive(Debug, Clone)]
pub struct TraceRecorder {
    channel: Channel,
    capacity: usize,
    /// Only samples from this system are kept; `None` takes the first one seen.
    system: Option<String>,
    ticks: Vec<u64>,
    values: Vec<f64>,
    fired: bool,
    taken: bool,
}

impl TraceRecorder {
    pub fn new(channel: Channel, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let reserve = capacity.min(DEFAULT_CAPACITY);
        Self {
            channel,
            capacity,
            system: None,
            ticks: Vec::with_capacity(reserve),
            values: Vec::with_capacity(reserve),
            fired: false,
            taken: false,
        }
    }

    /// Restrict recording to the system called `name`.
    pub fn for_system(mut self, name: impl Into<String>) -> Self {
        self.system = Some(name.into());
        self
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.values.len() >= self.capacity
    }

    /// Whether the trigger has fired (whether or not it was taken).
    pub fn has_fired(&self) -> bool {
        self.fired
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// The full trace, exactly once, after the recorder fills up.
    pub fn take_fired(&mut self) -> Option<Trace> {
        if !self.fired || self.taken {
            return None;
        }
        self.taken = true;
        Some(Trace {
            system: self.system.clone().unwrap_or_default(),
            channel: self.channel,
            ticks: self.ticks.clone(),
            values: self.values.clone(),
        })
    }

    /// Start a new recording; the trigger is re-armed.
    pub fn reset(&mut self) {
        self.ticks.clear();
        self.values.clear();
        self.fired = false;
        self.taken = false;
    }
}

impl Default for TraceRecorder {
    fn default() -> Self {
        Self::new(Channel::Theta, DEFAULT_CAPACITY)
    }
}

impl TelemetrySink for TraceRecorder {
    fn consume(&mut self, tick: u64, system: &str, telemetry: &Telemetry) {
        if self.is_full() {
            return;
        }
        let Some(value) = self.channel.sample(telemetry) else {
            return;
        };
        match &self.system {
            Some(name) if name != system => return,
            Some(_) => {}
            None => self.system = Some(system.to_string()),
        }
        self.ticks.push(tick);
        self.values.push(value);
        if self.is_full() {
            self.fired = true;
            tracing::info!(
                system,
                channel = ?self.channel,
                samples = self.values.len(),
                "trace recorder fired"
            );
        }
    }
}
