use crate::episode::{
    env::Environment,
    error::PolicyError,
    ids::ActionId,
    policy::greedy_action,
};

/// Controls how step rewards are aggregated into an episode return.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReturnType {
    /// Sum raw rewards until the episode ends or the step limit is hit.
    EpisodicUndiscounted,
    /// Sum discounted rewards using `gamma`.
    #[default]
    Discounted,
    /// Sum rewards but clamp to a strict fixed step horizon.
    FixedHorizon,
}

/// Rollout parameters controlling return shape and stopping criteria.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RolloutParams {
    pub return_type: ReturnType,
    pub gamma: f64,
    pub max_steps: usize,
    pub fixed_horizon_steps: usize,
}

impl Default for RolloutParams {
    fn default() -> Self {
        RolloutParams {
            return_type: ReturnType::Discounted,
            gamma: 1.0,
            max_steps: 1_000,
            fixed_horizon_steps: 10,
        }
    }
}

impl RolloutParams {
    /// Resolve the actual step limit for the current return mode.
    pub fn step_limit(&self) -> usize {
        match self.return_type {
            ReturnType::FixedHorizon => self.max_steps.min(self.fixed_horizon_steps),
            ReturnType::Discounted | ReturnType::EpisodicUndiscounted => self.max_steps,
        }
    }

    /// Reject a discount factor that would make returns meaningless.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if !self.gamma.is_finite() || self.gamma < 0.0 {
            return Err(PolicyError::InvalidGamma { gamma: self.gamma });
        }
        Ok(())
    }
}

/// Summary of one evaluated episode.
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeStats<O> {
    pub total_return: f64,
    pub length: usize,
    pub final_observation: O,
    pub terminated: bool,
    pub truncated: bool,
}

/// Reset `env` and play one episode with `policy`.
///
/// The policy receives the current observation and the number of actions and
/// returns the action to take. The episode ends on termination, truncation, or
/// once the step limit of `params` is reached. Invalid `params` are rejected
/// before the environment is reset.
pub fn rollout<Env, FPolicy, E>(
    env: &mut Env,
    mut policy: FPolicy,
    params: RolloutParams,
) -> Result<EpisodeStats<Env::Observation>, E>
where
    Env: Environment,
    FPolicy: FnMut(&Env::Observation, usize) -> Result<ActionId, E>,
    E: From<PolicyError> + From<Env::Error>,
{
    params.validate()?;
    let (mut observation, _info) = env.reset(None, None);
    let mut stats = EpisodeStats {
        total_return: 0.0,
        length: 0,
        final_observation: observation.clone(),
        terminated: false,
        truncated: false,
    };
    let mut discount = 1.0;

    for _ in 0..params.step_limit() {
        let action_count = env.action_count();
        if action_count == 0 {
            break;
        }

        let action_id = policy(&observation, action_count)?;
        if action_id.index() >= action_count {
            return Err(PolicyError::InvalidPolicyAction {
                action_id,
                num_actions: action_count,
            }
            .into());
        }
        let step = env.step(action_id.index())?;

        match params.return_type {
            ReturnType::Discounted => {
                stats.total_return += discount * step.reward;
                discount *= params.gamma;
            }
            ReturnType::EpisodicUndiscounted | ReturnType::FixedHorizon => {
                stats.total_return += step.reward;
            }
        }

        stats.length += 1;
        stats.terminated = step.terminated;
        stats.truncated = step.truncated;
        observation = step.observation;

        if stats.terminated || stats.truncated {
            break;
        }
    }

    tracing::debug!(
        length = stats.length,
        total_return = stats.total_return,
        truncated = stats.truncated,
        "episode finished"
    );
    stats.final_observation = observation;
    Ok(stats)
}

/// Evaluate a tabular action-value function greedily on `env`.
///
/// `q_values(observation)` must return one value per action.
pub fn greedy_rollout<Env, FQ, E>(
    env: &mut Env,
    mut q_values: FQ,
    params: RolloutParams,
) -> Result<EpisodeStats<Env::Observation>, E>
where
    Env: Environment,
    FQ: FnMut(&Env::Observation) -> Vec<f64>,
    E: From<PolicyError> + From<Env::Error>,
{
    rollout(
        env,
        |observation: &Env::Observation, _num_actions| {
            Ok(greedy_action(&q_values(observation))?)
        },
        params,
    )
}
