use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::episode::{error::PolicyError, ids::ActionId};

fn check_epsilon(epsilon: f64) -> Result<(), PolicyError> {
    if epsilon.is_nan() || !(0.0..=1.0).contains(&epsilon) {
        return Err(PolicyError::InvalidEpsilon { epsilon });
    }
    Ok(())
}

/// Return the first action with the highest value.
pub fn greedy_action(q_values: &[f64]) -> Result<ActionId, PolicyError> {
    if q_values.is_empty() {
        return Err(PolicyError::EmptyActionValues);
    }

    let mut best = 0;
    for (idx, value) in q_values.iter().enumerate().skip(1) {
        if *value > q_values[best] {
            best = idx;
        }
    }
    Ok(ActionId::from(best))
}

/// Build the epsilon-greedy action distribution for one state.
///
/// Every action receives `epsilon / |A|`; the greedy action additionally
/// receives `1 - epsilon`, so the result always sums to one.
pub fn epsilon_greedy_distribution(q_values: &[f64], epsilon: f64) -> Result<Vec<f64>, PolicyError> {
    check_epsilon(epsilon)?;
    let greedy = greedy_action(q_values)?;

    let mut probabilities = vec![epsilon / q_values.len() as f64; q_values.len()];
    probabilities[greedy.index()] += 1.0 - epsilon;
    Ok(probabilities)
}

/// Pick an action from `probabilities` using a uniform sample in `[0, 1)`.
///
/// The vector does not need to be normalized. Rounding at the upper end falls
/// back to the last action that carries mass.
pub fn choose_action(probabilities: &[f64], sample: f64) -> Result<ActionId, PolicyError> {
    if probabilities.is_empty() {
        return Err(PolicyError::EmptyDistribution);
    }
    if probabilities.iter().any(|p| !p.is_finite() || *p < 0.0) {
        return Err(PolicyError::InvalidDistribution);
    }

    let total: f64 = probabilities.iter().sum();
    if total <= 0.0 {
        return Err(PolicyError::InvalidDistribution);
    }

    let threshold = sample.clamp(0.0, 1.0) * total;
    let mut cumulative = 0.0_f64;
    for (idx, p) in probabilities.iter().enumerate() {
        cumulative += p;
        if *p > 0.0 && threshold < cumulative {
            return Ok(ActionId::from(idx));
        }
    }

    let last = probabilities
        .iter()
        .rposition(|p| *p > 0.0)
        .ok_or(PolicyError::InvalidDistribution)?;
    Ok(ActionId::from(last))
}

/// Epsilon-greedy action selection with its own seeded generator.
#[derive(Debug, Clone)]
pub struct EpsilonGreedyPolicy {
    epsilon: f64,
    rng: ChaCha8Rng,
}

impl EpsilonGreedyPolicy {
    /// Create a policy; without a seed the generator is seeded from entropy.
    pub fn new(epsilon: f64, seed: Option<u64>) -> Result<Self, PolicyError> {
        check_epsilon(epsilon)?;
        let seed = seed.unwrap_or_else(rand::random);
        Ok(Self {
            epsilon,
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Action distribution this policy samples from for the given values.
    pub fn probabilities(&self, q_values: &[f64]) -> Result<Vec<f64>, PolicyError> {
        epsilon_greedy_distribution(q_values, self.epsilon)
    }

    /// Select an action. In evaluation mode exploration is turned off.
    pub fn select(&mut self, q_values: &[f64], evaluate: bool) -> Result<ActionId, PolicyError> {
        if evaluate {
            return greedy_action(q_values);
        }
        let probabilities = self.probabilities(q_values)?;
        let sample = self.rng.gen_range(0.0..1.0);
        let action = choose_action(&probabilities, sample)?;
        tracing::trace!(action = action.index(), sample, "epsilon-greedy selection");
        Ok(action)
    }
}
