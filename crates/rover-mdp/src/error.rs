use thiserror::Error;

#[derive(Debug, Error)]
/// Error type for rover configuration, construction, and stepping.
pub enum MdpError {
    #[error("failed to read YAML file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{action} is not a valid action (needs to be 0 or 1)")]
    InvalidAction { action: i128 },

    #[error("state space must contain at least one position")]
    EmptyStateSpace,

    #[error("rewards has {rewards} entries but the transition table has {states} states")]
    ShapeMismatch { states: usize, rewards: usize },

    #[error("invalid probability for state {state}, action {action}: {value}")]
    InvalidProbability {
        state: usize,
        action: usize,
        value: f64,
    },

    #[error("invalid reward for state {state}: {value}")]
    InvalidReward { state: usize, value: f64 },

    #[error("horizon must be greater than 0")]
    ZeroHorizon,

    #[error("start position {start} is outside of the {states} available states")]
    StartOutOfRange { start: usize, states: usize },
}
