use std::fmt;

use crate::episode::ids::ActionId;

/// Error type for action selection and episode evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum PolicyError {
    /// No action values were supplied to the policy.
    EmptyActionValues,
    /// Exploration rate outside `[0, 1]`.
    InvalidEpsilon { epsilon: f64 },
    /// Attempted to sample from an empty probability vector.
    EmptyDistribution,
    /// A probability vector with negative, non-finite or zero total mass.
    InvalidDistribution,
    /// Discount factor that is negative or not finite.
    InvalidGamma { gamma: f64 },
    /// Policy returned an action outside `[0, num_actions)`.
    InvalidPolicyAction {
        action_id: ActionId,
        num_actions: usize,
    },
}

impl fmt::Display for PolicyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyError::EmptyActionValues => write!(f, "no action values to choose from"),
            PolicyError::InvalidEpsilon { epsilon } => {
                write!(f, "epsilon must be within [0, 1], got {epsilon}")
            }
            PolicyError::EmptyDistribution => write!(f, "cannot sample from an empty distribution"),
            PolicyError::InvalidDistribution => write!(
                f,
                "probabilities must be finite, non-negative and carry positive mass"
            ),
            PolicyError::InvalidGamma { gamma } => {
                write!(f, "gamma must be finite and >= 0, got {gamma}")
            }
            PolicyError::InvalidPolicyAction {
                action_id,
                num_actions,
            } => write!(
                f,
                "policy selected invalid action {} with {} actions available",
                action_id.index(),
                num_actions
            ),
        }
    }
}

impl std::error::Error for PolicyError {}
