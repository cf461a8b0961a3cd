use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use glam::Vec2;
use serde::Serialize;
use simteach_kernel::{PendulumConfig, SceneConfig, SceneKind, Telemetry, TelemetrySink};
use simteach_render::{DebugTextRenderer, OrbitCamera, RenderView, Renderer};
use simteach_tools::{Channel, EnergyMonitor, PlotSink, SimulationInspector, TraceRecorder};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "simteach-cli", about = "Run the teaching simulations without a window")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and the available scenes
    Info,
    /// Step a scene and report its final state and energy drift
    Run {
        /// Scene to build: pendulum, square or cube
        #[arg(short, long, default_value = "pendulum")]
        scene: SceneKind,
        /// Number of steps to simulate
        #[arg(short = 'n', long, default_value = "1000")]
        steps: u64,
        /// YAML scene configuration
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Write one JSON telemetry record per system and step to stdout
        #[arg(long)]
        json: bool,
    },
    /// Measure pendulum energy drift for a given step size
    Energy {
        #[arg(short = 'n', long, default_value = "1000")]
        steps: u64,
        /// Time step, seconds
        #[arg(long, default_value = "0.01")]
        h: f64,
        /// Plot theta with gnuplot once the run completes
        #[arg(long)]
        plot: bool,
    },
}

/// One line of `run --json` output.
#[derive(Serialize)]
struct Sample<'a> {
    tick: u64,
    system: &'a str,
    telemetry: &'a Telemetry,
}

/// Writes telemetry as JSON lines, keeping the first write error.
struct JsonLines<W: Write> {
    out: W,
    error: Option<io::Error>,
}

impl<W: Write> JsonLines<W> {
    fn new(out: W) -> Self {
        Self { out, error: None }
    }

    fn finish(mut self) -> io::Result<()> {
        match self.error.take() {
            Some(e) => Err(e),
            None => self.out.flush(),
        }
    }
}

impl<W: Write> TelemetrySink for JsonLines<W> {
    fn consume(&mut self, tick: u64, system: &str, telemetry: &Telemetry) {
        if self.error.is_some() {
            return;
        }
        let sample = Sample {
            tick,
            system,
            telemetry,
        };
        let written = serde_json::to_writer(&mut self.out, &sample)
            .map_err(io::Error::from)
            .and_then(|()| self.out.write_all(b"\n"));
        if let Err(e) = written {
            self.error = Some(e);
        }
    }
}

/// Forwards every sample to each inner sink in turn.
struct Fanout<'a> {
    sinks: Vec<&'a mut dyn TelemetrySink>,
}

impl TelemetrySink for Fanout<'_> {
    fn consume(&mut self, tick: u64, system: &str, telemetry: &Telemetry) {
        for sink in &mut self.sinks {
            sink.consume(tick, system, telemetry);
        }
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<SceneConfig> {
    match path {
        Some(path) => SceneConfig::load(path)
            .with_context(|| format!("failed to load scene configuration {}", path.display())),
        None => Ok(SceneConfig::default()),
    }
}

fn print_drift(monitor: &EnergyMonitor) {
    for (system, drift) in monitor.drifts() {
        println!("  [{system}] {drift} relative={:.3e}", drift.relative_drift());
    }
}

fn run(scene: SceneKind, steps: u64, config: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let config = load_config(config)?;
    let mut sim = config.build(scene)?;
    let mut monitor = EnergyMonitor::new();
    sim.publish(&mut monitor);

    if json {
        let mut lines = JsonLines::new(io::stdout().lock());
        sim.publish(&mut lines);
        let outcome = {
            let mut fanout = Fanout {
                sinks: vec![&mut monitor as &mut dyn TelemetrySink, &mut lines],
            };
            sim.run(steps, &mut fanout)
        };
        lines.finish().context("failed to write telemetry")?;
        for (system, drift) in monitor.drifts() {
            tracing::info!(system, %drift, "energy drift");
        }
        outcome?;
        return Ok(());
    }

    let outcome = sim.run(steps, &mut monitor);
    let camera = OrbitCamera::looking_down(scene.camera_distance());
    let view = RenderView::from_camera(&camera, Vec2::new(800.0, 600.0));
    print!("{}", DebugTextRenderer::new().render(&sim, &view));
    println!("Energy drift:");
    print_drift(&monitor);
    outcome?;
    Ok(())
}

fn energy(steps: u64, h: f64, plot: bool) -> anyhow::Result<()> {
    let config = SceneConfig {
        pendulum: PendulumConfig {
            h,
            ..PendulumConfig::default()
        },
        ..SceneConfig::default()
    };
    config.validate()?;

    let mut sim = config.build(SceneKind::Pendulum)?;
    let mut monitor = EnergyMonitor::new();
    sim.publish(&mut monitor);
    let capacity = usize::try_from(steps).unwrap_or(usize::MAX);
    let mut recorder = TraceRecorder::new(Channel::Theta, capacity);
    {
        let mut fanout = Fanout {
            sinks: vec![&mut monitor as &mut dyn TelemetrySink, &mut recorder],
        };
        sim.run(steps, &mut fanout)?;
    }

    println!("Pendulum energy drift: h={h} steps={steps}");
    print_drift(&monitor);

    if plot {
        match recorder.take_fired() {
            Some(trace) => PlotSink::new("Pendulum").show(&trace)?,
            None => tracing::warn!(samples = recorder.len(), "no complete trace to plot"),
        }
    }
    Ok(())
}

fn info() -> anyhow::Result<()> {
    println!("simteach-cli v{}", env!("CARGO_PKG_VERSION"));
    let config = SceneConfig::default();
    for kind in SceneKind::ALL {
        let sim = config.build(kind)?;
        for index in 0..sim.system_count() {
            if let Some(system) = SimulationInspector::inspect_system(&sim, index) {
                println!("{kind}: {system}");
            }
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Commands::Info => info(),
        Commands::Run {
            scene,
            steps,
            config,
            json,
        } => run(scene, steps, config.as_deref(), json),
        Commands::Energy { steps, h, plot } => energy(steps, h, plot),
    }
}
