//! Scene configuration.
//!
//! Every field is optional in the YAML file; missing fields take the classroom
//! defaults below.
//!
//! ```yaml
//! pendulum:
//!   length: 1.0
//!   theta: 0.3
//! square:
//!   omega: [0.0, 0.0, 2.0]
//! ```

use std::f64::consts::FRAC_PI_6;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::{
    IntegrationError, PendulumDynamicSystem, Simulation, SpinningCubeDynamicSystem,
    SpinningSquareDynamicSystem,
};

/// Errors from loading or validating a scene configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Simple pendulum integrated with explicit Euler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PendulumConfig {
    pub gravity: f64,
    pub length: f64,
    pub mass: f64,
    /// Initial angle from the downward vertical, radians.
    pub theta: f64,
    /// Initial angular velocity, radians per second.
    pub theta_dot: f64,
    /// Time step, seconds.
    pub h: f64,
}

impl Default for PendulumConfig {
    fn default() -> Self {
        Self {
            gravity: 9.81,
            length: 0.5,
            mass: 1.0,
            theta: FRAC_PI_6,
            theta_dot: 0.0,
            h: 0.01,
        }
    }
}

/// Square of four equal point masses spinning in 3D.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SquareConfig {
    pub side: f64,
    /// Total mass, split evenly over the corners.
    pub mass: f64,
    pub dt: f64,
    /// Initial body-frame angular velocity.
    pub omega: DVec3,
    /// Constant world-frame torque.
    pub torque: DVec3,
    pub center: DVec3,
}

impl Default for SquareConfig {
    fn default() -> Self {
        Self {
            side: 10.0,
            mass: 10.0,
            dt: 0.01,
            omega: DVec3::new(0.0, 0.0, 1.0),
            torque: DVec3::ZERO,
            center: DVec3::ZERO,
        }
    }
}

/// Box spinning about a perturbed intermediate axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CubeConfig {
    pub lengths: DVec3,
    /// Total mass, split evenly over the eight corners.
    pub mass: f64,
    pub dt: f64,
    pub omega: DVec3,
    pub torque: DVec3,
    pub center: DVec3,
}

impl Default for CubeConfig {
    fn default() -> Self {
        Self {
            lengths: DVec3::new(1.0, 2.0, 3.0),
            mass: 1.0,
            dt: 0.01,
            omega: DVec3::new(0.05, 4.0, 0.05),
            torque: DVec3::ZERO,
            center: DVec3::ZERO,
        }
    }
}

/// Parameters for every scene the apps can build.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub pendulum: PendulumConfig,
    pub square: SquareConfig,
    pub cube: CubeConfig,
}

impl SceneConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&text)?;
        tracing::info!(path = %path.display(), "scene configuration loaded");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.pendulum;
        positive("pendulum.length", p.length)?;
        positive("pendulum.mass", p.mass)?;
        positive("pendulum.h", p.h)?;
        finite("pendulum.gravity", p.gravity)?;
        finite("pendulum.theta", p.theta)?;
        finite("pendulum.theta_dot", p.theta_dot)?;

        let s = &self.square;
        positive("square.side", s.side)?;
        positive("square.mass", s.mass)?;
        positive("square.dt", s.dt)?;
        finite_vec("square.omega", s.omega)?;
        finite_vec("square.torque", s.torque)?;
        finite_vec("square.center", s.center)?;

        let c = &self.cube;
        positive("cube.lengths.x", c.lengths.x)?;
        positive("cube.lengths.y", c.lengths.y)?;
        positive("cube.lengths.z", c.lengths.z)?;
        positive("cube.mass", c.mass)?;
        positive("cube.dt", c.dt)?;
        finite_vec("cube.omega", c.omega)?;
        finite_vec("cube.torque", c.torque)?;
        finite_vec("cube.center", c.center)?;
        Ok(())
    }

    /// Build a simulation holding the single system named by `kind`.
    pub fn build(&self, kind: SceneKind) -> Result<Simulation, IntegrationError> {
        let mut sim = Simulation::new();
        match kind {
            SceneKind::Pendulum => {
                sim.add_system(Box::new(PendulumDynamicSystem::new(&self.pendulum)));
            }
            SceneKind::Square => {
                sim.add_system(Box::new(SpinningSquareDynamicSystem::new(&self.square)?));
            }
            SceneKind::Cube => {
                sim.add_system(Box::new(SpinningCubeDynamicSystem::new(&self.cube)?));
            }
        }
        tracing::info!(scene = %kind, "scene built");
        Ok(sim)
    }
}

fn positive(field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{field} must be positive, got {value}")))
    }
}

fn finite(field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{field} must be finite")))
    }
}

fn finite_vec(field: &str, value: DVec3) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{field} must be finite")))
    }
}

/// Which demonstration to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneKind {
    Pendulum,
    Square,
    Cube,
}

impl SceneKind {
    pub const ALL: [SceneKind; 3] = [Self::Pendulum, Self::Square, Self::Cube];

    /// Camera distance that frames the default scene.
    pub fn camera_distance(self) -> f32 {
        match self {
            Self::Pendulum => 2.0,
            Self::Square => 15.0,
            Self::Cube => 8.0,
        }
    }
}

impl fmt::Display for SceneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pendulum => "pendulum",
            Self::Square => "square",
            Self::Cube => "cube",
        };
        f.write_str(name)
    }
}

impl FromStr for SceneKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pendulum" => Ok(Self::Pendulum),
            "square" => Ok(Self::Square),
            "cube" => Ok(Self::Cube),
            other => Err(format!(
                "unknown scene '{other}' (expected pendulum, square or cube)"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_document_gives_defaults() {
        let config = SceneConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, SceneConfig::default());
        assert_eq!(config.pendulum.h, 0.01);
        assert_eq!(config.square.side, 10.0);
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let yaml = "pendulum:\n  length: 1.5\nsquare:\n  omega: [0.0, 1.0, 0.0]\n";
        let config = SceneConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.pendulum.length, 1.5);
        assert_eq!(config.pendulum.gravity, 9.81);
        assert_eq!(config.square.omega, DVec3::new(0.0, 1.0, 0.0));
        assert_eq!(config.square.mass, 10.0);
    }

    #[test]
    fn non_positive_step_is_rejected() {
        let err = SceneConfig::from_yaml_str("pendulum:\n  h: 0.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ref m) if m.contains("pendulum.h")));
    }

    #[test]
    fn malformed_yaml_is_rejected() {
        let err = SceneConfig::from_yaml_str("pendulum: [1, 2").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "cube:\n  mass: 2.0").unwrap();
        let config = SceneConfig::load(file.path()).unwrap();
        assert_eq!(config.cube.mass, 2.0);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SceneConfig::load(dir.path().join("missing.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn scene_kind_round_trips_through_str() {
        for kind in SceneKind::ALL {
            assert_eq!(kind.to_string().parse::<SceneKind>().unwrap(), kind);
        }
        assert!("torus".parse::<SceneKind>().is_err());
    }

    #[test]
    fn build_each_scene() {
        let config = SceneConfig::default();
        for kind in SceneKind::ALL {
            let sim = config.build(kind).unwrap();
            assert_eq!(sim.system_count(), 1);
        }
    }
}
