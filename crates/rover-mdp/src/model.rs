use serde::{Deserialize, Serialize};

use crate::{Action, MdpError, TransitionTensor};

/// Which outcomes are written into a transition tensor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TensorMode {
    /// Only `T[s, a, next(s, a)] = P[s, a]`; the slip branch is left at zero.
    IntendedOnly,
    /// Both branches, so every `(s, a)` row is a probability distribution.
    #[default]
    Complete,
}

#[derive(Debug, Clone, PartialEq)]
/// Validated slip probabilities and arrival rewards of a 1-D rover world.
pub struct TransitionModel {
    probabilities: Vec<[f64; Action::COUNT]>,
    rewards: Vec<f64>,
}

impl TransitionModel {
    /// Validate shapes and values of `P` and `R`.
    pub fn new(
        probabilities: Vec<[f64; Action::COUNT]>,
        rewards: Vec<f64>,
    ) -> Result<Self, MdpError> {
        if probabilities.is_empty() {
            return Err(MdpError::EmptyStateSpace);
        }
        if rewards.len() != probabilities.len() {
            return Err(MdpError::ShapeMismatch {
                states: probabilities.len(),
                rewards: rewards.len(),
            });
        }

        for (state, row) in probabilities.iter().enumerate() {
            for (action, value) in row.iter().enumerate() {
                if value.is_nan() || !(0.0..=1.0).contains(value) {
                    return Err(MdpError::InvalidProbability {
                        state,
                        action,
                        value: *value,
                    });
                }
            }
        }

        for (state, value) in rewards.iter().enumerate() {
            if !value.is_finite() {
                return Err(MdpError::InvalidReward {
                    state,
                    value: *value,
                });
            }
        }

        Ok(Self {
            probabilities,
            rewards,
        })
    }

    /// Return the number of positions.
    pub fn state_count(&self) -> usize {
        self.probabilities.len()
    }

    /// The `P` table, one `[left, right]` row per state.
    pub fn probabilities(&self) -> &[[f64; Action::COUNT]] {
        &self.probabilities
    }

    /// The `R` table indexed by arrival state.
    pub fn rewards(&self) -> &[f64] {
        &self.rewards
    }

    /// Probability that `action` is executed as requested in `state`.
    ///
    /// `state` must be below `state_count()`.
    pub fn follow_probability(&self, state: usize, action: Action) -> f64 {
        self.probabilities[state][action.index()]
    }

    /// Deterministic movement: shift by the action's delta and clamp to the track.
    pub fn next_state(&self, state: usize, action: Action) -> usize {
        state
            .saturating_add_signed(action.delta())
            .min(self.state_count() - 1)
    }

    /// Reward of the deterministic arrival state for every `(s, a)`.
    pub fn reward_per_action(&self) -> Vec<[f64; Action::COUNT]> {
        (0..self.state_count())
            .map(|state| Action::ALL.map(|action| self.rewards[self.next_state(state, action)]))
            .collect()
    }

    /// Build the `|S| x |A| x |S|` transition tensor.
    pub fn transition_tensor(&self, mode: TensorMode) -> TransitionTensor {
        let mut tensor = TransitionTensor::zeros(self.state_count());

        for (state, row) in self.probabilities.iter().enumerate() {
            for action in Action::ALL {
                let follow = row[action.index()];
                tensor.add(state, action, self.next_state(state, action), follow);

                if mode == TensorMode::Complete {
                    let slipped = self.next_state(state, action.flipped());
                    tensor.add(state, action, slipped, 1.0 - follow);
                }
            }
        }

        tensor
    }
}
