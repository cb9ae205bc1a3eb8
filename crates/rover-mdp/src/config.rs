use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{Action, MarsRover, MdpError, TensorMode, TransitionModel};

const DEFAULT_ROVER_CONFIG_YAML: &str = include_str!("../config/rover.default.yaml");

/// Construction options for a [`MarsRover`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoverConfig {
    /// `[left, right]` probability of executing the requested move, per state.
    pub transition_probabilities: Vec<[f64; Action::COUNT]>,
    /// Reward for arriving at each state.
    pub rewards: Vec<f64>,
    /// Steps per episode before truncation.
    pub horizon: usize,
    /// Position the rover is placed at on reset.
    pub start: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Which outcomes the precomputed transition tensor contains.
    pub tensor_mode: TensorMode,
}

impl Default for RoverConfig {
    fn default() -> Self {
        RoverConfig {
            transition_probabilities: vec![[1.0, 1.0]; 5],
            rewards: vec![1.0, 0.0, 0.0, 0.0, 10.0],
            horizon: 10,
            start: 2,
            seed: None,
            tensor_mode: TensorMode::Complete,
        }
    }
}

impl RoverConfig {
    /// Parse a rover config from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, MdpError> {
        let config: RoverConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a rover config from a YAML file path.
    pub fn from_yaml_path(path: impl AsRef<Path>) -> Result<Self, MdpError> {
        let yaml = fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// Return the default YAML config included with this crate.
    pub fn default_yaml() -> &'static str {
        DEFAULT_ROVER_CONFIG_YAML
    }

    /// Parse the default YAML config included with this crate.
    pub fn from_default_yaml() -> Result<Self, MdpError> {
        Self::from_yaml_str(Self::default_yaml())
    }

    /// Replace the seed, keeping everything else.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check shapes and ranges without building a rover.
    pub fn validate(&self) -> Result<(), MdpError> {
        self.build_model()?;
        if self.horizon == 0 {
            return Err(MdpError::ZeroHorizon);
        }
        if self.start >= self.transition_probabilities.len() {
            return Err(MdpError::StartOutOfRange {
                start: self.start,
                states: self.transition_probabilities.len(),
            });
        }
        Ok(())
    }

    fn build_model(&self) -> Result<TransitionModel, MdpError> {
        TransitionModel::new(self.transition_probabilities.clone(), self.rewards.clone())
    }

    /// Validate and construct the rover.
    pub fn build(&self) -> Result<MarsRover, MdpError> {
        let rover = MarsRover::new(self.build_model()?, self.horizon, self.start, self.seed)?;
        Ok(rover.with_tensor_mode(self.tensor_mode))
    }
}
