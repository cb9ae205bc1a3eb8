use std::{fs, path::Path};

use crate::{MarsRover, MdpError, RoverConfig};

/// Load a rover config from YAML on disk.
pub fn load_yaml(path: impl AsRef<Path>) -> Result<RoverConfig, MdpError> {
    RoverConfig::from_yaml_path(path)
}

/// Load a config from a YAML file and build the rover.
pub fn rover_from_yaml(path: impl AsRef<Path>) -> Result<MarsRover, MdpError> {
    let config = load_yaml(path)?;
    config.build()
}

/// Serialize and write a rover config to YAML.
pub fn save_yaml(path: impl AsRef<Path>, config: &RoverConfig) -> Result<(), MdpError> {
    let yaml = serde_yaml::to_string(config)?;
    fs::write(path, yaml)?;
    Ok(())
}
