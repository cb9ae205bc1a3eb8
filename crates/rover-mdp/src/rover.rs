use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rover_core::{Environment, Info, Step};

use crate::{Action, MdpError, TensorMode, TransitionModel, TransitionTensor};

#[derive(Debug, Clone)]
/// A rover on a 1-D track of positions `0..n`.
///
/// Every step the requested move is executed with probability `P[pos, a]`;
/// otherwise the opposite move is substituted. Movement is clamped at both
/// ends of the track and the reward is read from the arrival position.
/// Episodes never terminate, they are truncated after `horizon` steps.
pub struct MarsRover {
    model: TransitionModel,
    tensor_mode: TensorMode,
    transition_matrix: TransitionTensor,
    horizon: usize,
    start: usize,
    seed: Option<u64>,
    position: usize,
    current_steps: usize,
    rng: ChaCha8Rng,
}

impl MarsRover {
    /// Create a rover over a validated model.
    ///
    /// Without a seed the generator is seeded from the process entropy source.
    pub fn new(
        model: TransitionModel,
        horizon: usize,
        start: usize,
        seed: Option<u64>,
    ) -> Result<Self, MdpError> {
        if horizon == 0 {
            return Err(MdpError::ZeroHorizon);
        }
        let states = model.state_count();
        if start >= states {
            return Err(MdpError::StartOutOfRange { start, states });
        }

        let transition_matrix = model.transition_tensor(TensorMode::Complete);
        let rng_seed = seed.unwrap_or_else(rand::random);
        tracing::debug!(states, horizon, start, ?seed, "created mars rover");

        Ok(Self {
            model,
            tensor_mode: TensorMode::Complete,
            transition_matrix,
            horizon,
            start,
            seed,
            position: start,
            current_steps: 0,
            rng: ChaCha8Rng::seed_from_u64(rng_seed),
        })
    }

    /// Start a new episode at the fixed start position.
    ///
    /// `seed` and `options` are accepted for interface compatibility only; the
    /// generator keeps its stream across episodes.
    pub fn reset(&mut self, seed: Option<u64>, options: Option<&Info>) -> (usize, Info) {
        if seed.is_some() || options.is_some_and(|o| !o.is_empty()) {
            tracing::debug!(?seed, "reset ignores seed and options");
        }
        self.current_steps = 0;
        self.position = self.start;
        (self.position, Info::new())
    }

    /// Execute `action` (0 = left, 1 = right).
    ///
    /// Invalid actions are rejected before any state is touched.
    pub fn step(&mut self, action: usize) -> Result<Step<usize>, MdpError> {
        let requested = Action::try_from(action)?;
        self.current_steps += 1;

        let follow = self.model.follow_probability(self.position, requested);
        let sample: f64 = self.rng.gen_range(0.0..1.0);
        let executed = if sample < follow {
            requested
        } else {
            requested.flipped()
        };

        let from = self.position;
        self.position = self.model.next_state(from, executed);
        let reward = self.model.rewards()[self.position];
        let truncated = self.current_steps >= self.horizon;

        tracing::trace!(
            from,
            to = self.position,
            ?requested,
            ?executed,
            reward,
            step = self.current_steps,
            truncated,
            "rover step"
        );

        Ok(Step {
            observation: self.position,
            reward,
            terminated: false,
            truncated,
            info: Info::new(),
        })
    }

    /// Reward of the deterministic arrival state for every `(s, a)`.
    pub fn reward_per_action(&self) -> Vec<[f64; Action::COUNT]> {
        self.model.reward_per_action()
    }

    /// Switch the precomputed transition tensor to `mode`.
    pub fn with_tensor_mode(mut self, mode: TensorMode) -> Self {
        if mode != self.tensor_mode {
            self.transition_matrix = self.model.transition_tensor(mode);
            self.tensor_mode = mode;
        }
        self
    }

    /// Mode of the tensor returned by `transition_matrix`.
    pub fn tensor_mode(&self) -> TensorMode {
        self.tensor_mode
    }

    /// Transition tensor precomputed at construction, complete by default.
    pub fn transition_matrix(&self) -> &TransitionTensor {
        &self.transition_matrix
    }

    /// Build the transition tensor in the requested mode.
    pub fn transition_matrix_with(&self, mode: TensorMode) -> TransitionTensor {
        if mode == self.tensor_mode {
            self.transition_matrix.clone()
        } else {
            self.model.transition_tensor(mode)
        }
    }

    /// Borrow the underlying transition model.
    pub fn model(&self) -> &TransitionModel {
        &self.model
    }

    pub fn transition_probabilities(&self) -> &[[f64; Action::COUNT]] {
        self.model.probabilities()
    }

    pub fn rewards(&self) -> &[f64] {
        self.model.rewards()
    }

    pub fn state_count(&self) -> usize {
        self.model.state_count()
    }

    pub fn action_count(&self) -> usize {
        Action::COUNT
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    pub fn start(&self) -> usize {
        self.start
    }

    /// Seed supplied at construction, if any.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn current_steps(&self) -> usize {
        self.current_steps
    }
}

impl Environment for MarsRover {
    type Observation = usize;
    type Error = MdpError;

    fn reset(&mut self, seed: Option<u64>, options: Option<&Info>) -> (usize, Info) {
        MarsRover::reset(self, seed, options)
    }

    fn step(&mut self, action: usize) -> Result<Step<usize>, MdpError> {
        MarsRover::step(self, action)
    }

    fn action_count(&self) -> usize {
        Action::COUNT
    }
}
